//! Crate-wide error type. Every fallible operation in this crate eventually
//! surfaces a [`D2sError`]; lower-level module errors convert into it via
//! `From`, following the teacher's `AudError`/`SpsError` convention of
//! threading errors upward rather than collapsing them into strings.

use std::fmt;

use crate::attributes::AttributesError;
use crate::bitstream::BitStreamError;
use crate::item::ItemError;
use crate::item_list::ItemListError;
use crate::magical_properties::MagicalPropertiesError;

/// Where in the file format a magic-bytes check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicSite {
    SaveFileHeader,
    Attributes,
    ItemList,
    Mercenary,
    Golem,
}

impl fmt::Display for MagicSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MagicSite::SaveFileHeader => "save file header",
            MagicSite::Attributes => "attributes block",
            MagicSite::ItemList => "item list",
            MagicSite::Mercenary => "mercenary magic",
            MagicSite::Golem => "golem magic",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug)]
pub enum D2sError {
    /// A magic-bytes check failed at the named site.
    BadMagic {
        site: MagicSite,
        expected: Vec<u8>,
        found: Vec<u8>,
    },
    BitStream(BitStreamError),
    Attributes(AttributesError),
    MagicalProperties(MagicalPropertiesError),
    Item(ItemError),
    ItemList(ItemListError),
    /// The stored checksum did not match the recomputed one (strict policy only).
    ChecksumMismatch { expected: i32, found: i32 },
    /// `encode_save(decode_save(F))` did not reproduce `F` byte-for-byte.
    RoundTripMismatch {
        offset: usize,
        original_byte: u8,
        produced_byte: u8,
    },
    /// The input buffer was too short to contain even the fixed save header.
    TooShort { expected: usize, found: usize },
}

impl fmt::Display for D2sError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            D2sError::BadMagic {
                site,
                expected,
                found,
            } => write!(
                f,
                "bad magic at {}: expected {:02x?}, found {:02x?}",
                site, expected, found
            ),
            D2sError::BitStream(e) => write!(f, "{}", e),
            D2sError::Attributes(e) => write!(f, "{}", e),
            D2sError::MagicalProperties(e) => write!(f, "{}", e),
            D2sError::Item(e) => write!(f, "{}", e),
            D2sError::ItemList(e) => write!(f, "{}", e),
            D2sError::ChecksumMismatch { expected, found } => write!(
                f,
                "checksum mismatch: file declares {}, computed {}",
                found, expected
            ),
            D2sError::RoundTripMismatch {
                offset,
                original_byte,
                produced_byte,
            } => write!(
                f,
                "round-trip mismatch at offset {}: original {:#04x}, produced {:#04x}",
                offset, original_byte, produced_byte
            ),
            D2sError::TooShort { expected, found } => write!(
                f,
                "buffer too short: expected at least {} bytes, found {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for D2sError {}

impl From<BitStreamError> for D2sError {
    fn from(e: BitStreamError) -> Self {
        D2sError::BitStream(e)
    }
}
impl From<AttributesError> for D2sError {
    fn from(e: AttributesError) -> Self {
        D2sError::Attributes(e)
    }
}
impl From<MagicalPropertiesError> for D2sError {
    fn from(e: MagicalPropertiesError) -> Self {
        D2sError::MagicalProperties(e)
    }
}
impl From<ItemError> for D2sError {
    fn from(e: ItemError) -> Self {
        D2sError::Item(e)
    }
}
impl From<ItemListError> for D2sError {
    fn from(e: ItemListError) -> Self {
        D2sError::ItemList(e)
    }
}
