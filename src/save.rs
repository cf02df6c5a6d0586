//! The save file container (`spec.md` §4.7): fixed-layout header framing,
//! the bit-packed attribute/item regions, optional mercenary/golem
//! trailers, and the post-encode length/checksum patch.

use std::fmt;

use crate::attributes::Attributes;
use crate::bitstream::{BitReader, BitWriter};
use crate::checksum;
use crate::error::{D2sError, MagicSite};
use crate::item_list::ItemList;

pub const MAGIC: [u8; 4] = *b"\x55\xaa\x55\xaa";
const MERC_MAGIC: [u8; 2] = *b"jf";
const GOLEM_MAGIC: [u8; 2] = *b"kf";

/// Byte offset at which the bit-packed region (attributes onward) begins.
const BIT_REGION_OFFSET: usize = 765;

/// How strictly [`decode_save`] treats a checksum mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Reject the file with [`D2sError::ChecksumMismatch`].
    Strict,
    /// Decode anyway; the caller may inspect the mismatch via `log::warn!`.
    Advisory,
    /// Skip verification entirely.
    Ignore,
}

#[derive(Debug)]
pub enum SaveError {
    BitStream(crate::bitstream::BitStreamError),
    Attributes(crate::attributes::AttributesError),
    ItemList(crate::item_list::ItemListError),
    TooShort { expected: usize, found: usize },
    BadMagic { site: MagicSite, expected: Vec<u8>, found: Vec<u8> },
    ChecksumMismatch { expected: i32, found: i32 },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::BitStream(e) => write!(f, "{}", e),
            SaveError::Attributes(e) => write!(f, "{}", e),
            SaveError::ItemList(e) => write!(f, "{}", e),
            SaveError::TooShort { expected, found } => {
                write!(f, "save file too short: expected at least {} bytes, found {}", expected, found)
            }
            SaveError::BadMagic { site, expected, found } => {
                write!(f, "bad magic at {}: expected {:02x?}, found {:02x?}", site, expected, found)
            }
            SaveError::ChecksumMismatch { expected, found } => {
                write!(f, "checksum mismatch: file declares {}, computed {}", found, expected)
            }
        }
    }
}
impl std::error::Error for SaveError {}

impl From<SaveError> for D2sError {
    fn from(e: SaveError) -> Self {
        match e {
            SaveError::BitStream(e) => D2sError::BitStream(e),
            SaveError::Attributes(e) => D2sError::Attributes(e),
            SaveError::ItemList(e) => D2sError::ItemList(e),
            SaveError::TooShort { expected, found } => D2sError::TooShort { expected, found },
            SaveError::BadMagic { site, expected, found } => D2sError::BadMagic { site, expected, found },
            SaveError::ChecksumMismatch { expected, found } => D2sError::ChecksumMismatch { expected, found },
        }
    }
}

fn u16le(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}
fn u32le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// The fully decoded contents of a `.d2s` save file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFile {
    pub file_version: u32,
    pub active_weapon: u32,
    /// Raw 16-byte NUL-padded name field, preserved verbatim.
    pub char_name: [u8; 16],
    pub char_status: u8,
    pub char_progression: u8,
    pub char_class: i8,
    pub char_level: i8,
    pub last_played: u32,
    pub assigned_skills: [u8; 64],
    pub lmb_skill: u32,
    pub rmb_skill: u32,
    pub lmb_skill_swap: u32,
    pub rmb_skill_swap: u32,
    pub char_menu_appearance: [u8; 32],
    pub difficulty: [u8; 3],
    pub map_id: u32,
    pub merc_dead: u16,
    pub merc_id: u32,
    pub merc_name_id: u16,
    pub merc_type: u16,
    pub merc_exp: u32,
    pub quests: [u8; 298],
    pub waypoints: [u8; 81],
    pub npc_intros: [u8; 51],
    pub attributes: Attributes,
    pub char_skills: [u8; 32],
    pub items: ItemList,
    pub corpse: ItemList,
    pub merc_items: Option<ItemList>,
    pub has_golem: Option<u8>,
    /// Any bytes past the recognized structure, preserved verbatim.
    pub trailer: Vec<u8>,
}

impl SaveFile {
    /// Decodes a save file, verifying the checksum per `policy`.
    pub fn decode(data: &[u8], policy: ChecksumPolicy) -> Result<SaveFile, D2sError> {
        decode_save(data, policy)
    }

    /// As [`SaveFile::decode`], but additionally rejects a file that does
    /// not re-encode back to the exact bytes it was decoded from.
    pub fn decode_verified(data: &[u8], policy: ChecksumPolicy) -> Result<SaveFile, D2sError> {
        decode_save_verified(data, policy)
    }

    /// Encodes this model back to bytes, patching `file_size` and `checksum`.
    pub fn encode(&self) -> Vec<u8> {
        encode_save(self)
    }

    /// Resets the in-game ability to respecialize via Akara, for every
    /// difficulty whose quest byte is nonzero. Idempotent (P5).
    pub fn reset_akara(&mut self) {
        reset_akara(self);
    }

    /// Resets the Hephasto/Guardian quest flags for Hell difficulty.
    /// Idempotent (P5).
    pub fn reset_hephaesto(&mut self) {
        reset_hephaesto(self);
    }
}

fn bad_magic(site: MagicSite, expected: &[u8], found: &[u8]) -> SaveError {
    SaveError::BadMagic { site, expected: expected.to_vec(), found: found.to_vec() }
}

/// Decodes a raw `.d2s` buffer into a [`SaveFile`].
pub fn decode_save(data: &[u8], policy: ChecksumPolicy) -> Result<SaveFile, D2sError> {
    if data.len() < BIT_REGION_OFFSET {
        return Err(SaveError::TooShort { expected: BIT_REGION_OFFSET, found: data.len() }.into());
    }

    if data[0..4] != MAGIC {
        return Err(bad_magic(MagicSite::SaveFileHeader, &MAGIC, &data[0..4]).into());
    }

    if let ChecksumPolicy::Strict | ChecksumPolicy::Advisory = policy {
        let mut zeroed = data.to_vec();
        for b in &mut zeroed[checksum::CHECKSUM_OFFSET..checksum::CHECKSUM_OFFSET + 4] {
            *b = 0;
        }
        let computed = checksum::create_checksum(&zeroed);
        let stored = checksum::stored_checksum(data);
        if computed != stored {
            if policy == ChecksumPolicy::Strict {
                return Err(SaveError::ChecksumMismatch { expected: computed, found: stored }.into());
            }
            log::warn!("save file checksum mismatch: stored {}, computed {}", stored, computed);
        }
    }

    let file_version = u32le(&data[4..8]);
    let active_weapon = u32le(&data[16..20]);

    let mut char_name = [0u8; 16];
    char_name.copy_from_slice(&data[20..36]);

    let char_status = data[36];
    let char_progression = data[37];
    let char_class = data[40] as i8;
    let char_level = data[43] as i8;
    let last_played = u32le(&data[48..52]);

    let mut assigned_skills = [0u8; 64];
    assigned_skills.copy_from_slice(&data[56..120]);

    let lmb_skill = u32le(&data[120..124]);
    let rmb_skill = u32le(&data[124..128]);
    let lmb_skill_swap = u32le(&data[128..132]);
    let rmb_skill_swap = u32le(&data[132..136]);

    let mut char_menu_appearance = [0u8; 32];
    char_menu_appearance.copy_from_slice(&data[136..168]);

    let mut difficulty = [0u8; 3];
    difficulty.copy_from_slice(&data[168..171]);
    let map_id = u32le(&data[171..175]);

    let merc_dead = u16le(&data[177..179]);
    let merc_id = u32le(&data[179..183]);
    let merc_name_id = u16le(&data[183..185]);
    let merc_type = u16le(&data[185..187]);
    let merc_exp = u32le(&data[187..191]);

    let mut quests = [0u8; 298];
    quests.copy_from_slice(&data[335..633]);

    let mut waypoints = [0u8; 81];
    waypoints.copy_from_slice(&data[633..714]);

    let mut npc_intros = [0u8; 51];
    npc_intros.copy_from_slice(&data[714..765]);

    let mut r = BitReader::new(&data[BIT_REGION_OFFSET..]);

    let attributes = Attributes::read(&mut r).map_err(SaveError::Attributes)?;

    let mut char_skills = [0u8; 32];
    char_skills.copy_from_slice(&r.read_bytes(32).map_err(SaveError::BitStream)?);

    let items = ItemList::decode_from(&mut r).map_err(SaveError::ItemList)?;
    let corpse = ItemList::decode_from(&mut r).map_err(SaveError::ItemList)?;

    let merc_magic_bytes = r.read_bytes(2).map_err(SaveError::BitStream)?;
    if merc_magic_bytes != MERC_MAGIC {
        return Err(bad_magic(MagicSite::Mercenary, &MERC_MAGIC, &merc_magic_bytes).into());
    }
    let merc_items = if merc_id != 0 {
        Some(ItemList::decode_from(&mut r).map_err(SaveError::ItemList)?)
    } else {
        None
    };

    let remaining = r.peek_remaining();
    let (has_golem, trailer) = if remaining.len() >= 2 && remaining[0..2] == GOLEM_MAGIC {
        r.read_bytes(2).map_err(SaveError::BitStream)?;
        let byte = r.read_bits(8).map_err(SaveError::BitStream)? as u8;
        (Some(byte), r.peek_remaining().to_vec())
    } else {
        (None, remaining.to_vec())
    };

    Ok(SaveFile {
        file_version,
        active_weapon,
        char_name,
        char_status,
        char_progression,
        char_class,
        char_level,
        last_played,
        assigned_skills,
        lmb_skill,
        rmb_skill,
        lmb_skill_swap,
        rmb_skill_swap,
        char_menu_appearance,
        difficulty,
        map_id,
        merc_dead,
        merc_id,
        merc_name_id,
        merc_type,
        merc_exp,
        quests,
        waypoints,
        npc_intros,
        attributes,
        char_skills,
        items,
        corpse,
        merc_items,
        has_golem,
        trailer,
    })
}

/// Encodes a [`SaveFile`] back to bytes, patching `file_size` (offset 8) and
/// `checksum` (offset 12) as the final two steps (P6).
pub fn encode_save(save: &SaveFile) -> Vec<u8> {
    let mut header = Vec::with_capacity(BIT_REGION_OFFSET);
    header.extend_from_slice(&MAGIC);
    header.extend_from_slice(&save.file_version.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes()); // file_size, patched below
    header.extend_from_slice(&0i32.to_le_bytes()); // checksum, patched below
    header.extend_from_slice(&save.active_weapon.to_le_bytes());
    header.extend_from_slice(&save.char_name);
    header.push(save.char_status);
    header.push(save.char_progression);
    header.extend_from_slice(&0u16.to_le_bytes());
    header.push(save.char_class as u8);
    header.extend_from_slice(&7696u16.to_le_bytes());
    header.push(save.char_level as u8);
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&save.last_played.to_le_bytes());
    header.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    header.extend_from_slice(&save.assigned_skills);
    header.extend_from_slice(&save.lmb_skill.to_le_bytes());
    header.extend_from_slice(&save.rmb_skill.to_le_bytes());
    header.extend_from_slice(&save.lmb_skill_swap.to_le_bytes());
    header.extend_from_slice(&save.rmb_skill_swap.to_le_bytes());
    header.extend_from_slice(&save.char_menu_appearance);
    header.extend_from_slice(&save.difficulty);
    header.extend_from_slice(&save.map_id.to_le_bytes());
    header.extend_from_slice(&0u16.to_le_bytes());
    header.extend_from_slice(&save.merc_dead.to_le_bytes());
    header.extend_from_slice(&save.merc_id.to_le_bytes());
    header.extend_from_slice(&save.merc_name_id.to_le_bytes());
    header.extend_from_slice(&save.merc_type.to_le_bytes());
    header.extend_from_slice(&save.merc_exp.to_le_bytes());
    header.extend_from_slice(&[0u8; 144]);
    header.extend_from_slice(&save.quests);
    header.extend_from_slice(&save.waypoints);
    header.extend_from_slice(&save.npc_intros);
    debug_assert_eq!(header.len(), BIT_REGION_OFFSET);

    let mut w = BitWriter::new();
    save.attributes.write(&mut w).expect("encoding an in-memory Attributes cannot fail");
    w.write_bytes(&save.char_skills).expect("byte write cannot fail");
    save.items.encode_into(&mut w).expect("encoding an in-memory ItemList cannot fail");
    save.corpse.encode_into(&mut w).expect("encoding an in-memory ItemList cannot fail");
    w.write_bytes(&MERC_MAGIC).expect("byte write cannot fail");
    if let Some(merc_items) = &save.merc_items {
        merc_items.encode_into(&mut w).expect("encoding an in-memory ItemList cannot fail");
    }
    if let Some(byte) = save.has_golem {
        w.write_bytes(&GOLEM_MAGIC).expect("byte write cannot fail");
        w.write_bytes(&[byte]).expect("byte write cannot fail");
    }
    w.write_bytes(&save.trailer).expect("byte write cannot fail");

    let mut out = header;
    out.extend_from_slice(&w.finish());

    let len = out.len() as u32;
    out[8..12].copy_from_slice(&len.to_le_bytes());

    checksum::patch_checksum(out)
}

/// Decodes `data`, then re-encodes the result and compares it byte-for-byte
/// against `data`. A mismatch means `decode_save`/`encode_save` lost or
/// reordered information (e.g. attributes or items written in a non-
/// canonical order in the source file) and is reported via
/// [`D2sError::RoundTripMismatch`] at the first differing offset, so a
/// caller can refuse to overwrite the original save with the re-encode.
pub fn decode_save_verified(data: &[u8], policy: ChecksumPolicy) -> Result<SaveFile, D2sError> {
    let save = decode_save(data, policy)?;
    let reencoded = save.encode();

    for (offset, (&original_byte, &produced_byte)) in data.iter().zip(reencoded.iter()).enumerate() {
        if original_byte != produced_byte {
            return Err(D2sError::RoundTripMismatch { offset, original_byte, produced_byte });
        }
    }
    if data.len() != reencoded.len() {
        let offset = data.len().min(reencoded.len());
        return Err(D2sError::RoundTripMismatch {
            offset,
            original_byte: data.get(offset).copied().unwrap_or(0),
            produced_byte: reencoded.get(offset).copied().unwrap_or(0),
        });
    }

    Ok(save)
}

/// Flips the reset bits in `quests` for whichever of Normal/Nightmare/Hell
/// the character has already used Akara's respecialization in.
pub fn reset_akara(save: &mut SaveFile) {
    for offset in [92usize, 188, 284] {
        let byte = &mut save.quests[offset];
        if *byte == 0 {
            continue;
        }
        *byte |= 0x02;
        *byte &= !0x01;
    }
}

/// Flips the Hephasto/Guardian reset bits in `quests`, Hell difficulty only.
pub fn reset_hephaesto(save: &mut SaveFile) {
    let first = save.quests[256];
    if first == 0 {
        return;
    }
    save.quests[256] |= 0x08;
    save.quests[257] &= !(0x20 | 0x10);
}
