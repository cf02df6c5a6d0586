//! Codec for Diablo II (expansion) single-player character save files
//! (`.d2s`), plus the shared item/item-list machinery reused by the
//! standalone shared-stash (`.d2i`) format.
//!
//! The format is a fixed-layout plain-byte header followed by a
//! continuous bit-packed region (attributes, skills, items, mercenary
//! and golem trailers) read and written LSB-first within each byte;
//! see [`bitstream`] for the framing this crate builds on.

pub mod attributes;
pub mod bitstream;
pub mod checksum;
pub mod error;
pub mod item;
pub mod item_list;
pub mod magical_properties;
pub mod save;
pub mod tables;

pub use attributes::{Attributes, Stat};
pub use error::{D2sError, MagicSite};
pub use item::{Item, ItemError, Quality};
pub use item_list::{ItemList, ItemListError};
pub use magical_properties::{MagicalProperties, MagicalProperty};
pub use save::{
    decode_save, decode_save_verified, encode_save, reset_akara, reset_hephaesto, ChecksumPolicy,
    SaveFile,
};
