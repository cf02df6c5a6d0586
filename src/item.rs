//! The polymorphic item record (`spec.md` §4.5), the single largest piece
//! of the codec. A fixed 111-bit header is always present; everything past
//! it is gated by the `simple` flag, the item's `quality`, and a handful of
//! structural predicates (`has_defense`, `has_durability`, `has_quantity`,
//! tome-ness) looked up from [`crate::tables`].

use std::fmt;

use crate::bitstream::{BitReader, BitStreamError, BitWriter};
use crate::magical_properties::{MagicalProperties, MagicalPropertiesError};
use crate::tables::{self, ItemTypeFlags};

const MAGIC: [u8; 2] = *b"\x4a\x4d"; // "JM"
const RUNEWORD_CONSTANT: u32 = 5;

#[derive(Debug)]
pub enum ItemError {
    BadMagic { expected: [u8; 2], found: [u8; 2] },
    BitStream(BitStreamError),
    MagicalProperties(MagicalPropertiesError),
    /// A 4-bit quality value outside the eight recognized quality classes.
    InvalidQuality(u32),
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemError::BadMagic { expected, found } => write!(
                f,
                "bad item magic: expected {:02x?}, found {:02x?}",
                expected, found
            ),
            ItemError::BitStream(e) => write!(f, "{}", e),
            ItemError::MagicalProperties(e) => write!(f, "{}", e),
            ItemError::InvalidQuality(q) => write!(f, "invalid item quality {}", q),
        }
    }
}
impl std::error::Error for ItemError {}
impl From<BitStreamError> for ItemError {
    fn from(e: BitStreamError) -> Self {
        ItemError::BitStream(e)
    }
}
impl From<MagicalPropertiesError> for ItemError {
    fn from(e: MagicalPropertiesError) -> Self {
        ItemError::MagicalProperties(e)
    }
}

/// Where an item's `parent` field places it.
pub const ITEM_STORED: u32 = 0;
pub const ITEM_EQUIPPED: u32 = 1;
pub const ITEM_BELT: u32 = 2;
pub const ITEM_SOCKETED: u32 = 6;

/// Where an item's `stored` field places it, when `parent == ITEM_STORED`.
pub const STORED_INVENTORY: u32 = 1;
pub const STORED_CUBE: u32 = 4;
pub const STORED_STASH: u32 = 5;

/// Item rarity class, driving which naming fields the extended body carries.
///
/// `spec.md` §9 gives a contradictory table for the numeric values (both
/// `Low=1`/`High=7` and `Unique=7` appear); this uses the canonical
/// real-format values, cross-checked against the mutually exclusive
/// `is_*_quality` dispatch in the original reference implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Low = 1,
    Normal = 2,
    High = 3,
    Magic = 4,
    Set = 5,
    Rare = 6,
    Unique = 7,
    Crafted = 8,
}

impl TryFrom<u32> for Quality {
    type Error = ItemError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Quality::Low,
            2 => Quality::Normal,
            3 => Quality::High,
            4 => Quality::Magic,
            5 => Quality::Set,
            6 => Quality::Rare,
            7 => Quality::Unique,
            8 => Quality::Crafted,
            other => return Err(ItemError::InvalidQuality(other)),
        })
    }
}

/// A `(has_prefix, id)` / `(has_suffix, id)` pair for rare/crafted naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AffixSlot {
    pub id: Option<u32>,
}

/// Quality-dependent naming fields, one variant per `Quality`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityInfo {
    Low { quality_info: u32 },
    Normal,
    High { quality_info: u32 },
    Magic { name_id_first: u32, name_id_last: u32 },
    Set { name_id_first: u32 },
    Rare {
        name_id_first: u32,
        name_id_last: u32,
        prefixes: [AffixSlot; 3],
        suffixes: [AffixSlot; 3],
    },
    Unique { name_id_first: u32 },
    Crafted {
        name_id_first: u32,
        name_id_last: u32,
        prefixes: [AffixSlot; 3],
        suffixes: [AffixSlot; 3],
    },
}

fn read_affixes(r: &mut BitReader) -> Result<([AffixSlot; 3], [AffixSlot; 3]), ItemError> {
    let mut prefixes = [AffixSlot::default(); 3];
    let mut suffixes = [AffixSlot::default(); 3];
    for i in 0..3 {
        prefixes[i].id = if r.read_bit()? { Some(r.read_bits(11)?) } else { None };
        suffixes[i].id = if r.read_bit()? { Some(r.read_bits(11)?) } else { None };
    }
    Ok((prefixes, suffixes))
}

fn write_affixes(w: &mut BitWriter, prefixes: &[AffixSlot; 3], suffixes: &[AffixSlot; 3]) -> Result<(), ItemError> {
    for i in 0..3 {
        match prefixes[i].id {
            Some(id) => {
                w.write_bit(true)?;
                w.write_bits(id, 11)?;
            }
            None => w.write_bit(false)?,
        }
        match suffixes[i].id {
            Some(id) => {
                w.write_bit(true)?;
                w.write_bits(id, 11)?;
            }
            None => w.write_bit(false)?,
        }
    }
    Ok(())
}

impl QualityInfo {
    fn read(r: &mut BitReader, quality: Quality) -> Result<QualityInfo, ItemError> {
        Ok(match quality {
            Quality::Low => QualityInfo::Low { quality_info: r.read_bits(3)? },
            Quality::Normal => QualityInfo::Normal,
            Quality::High => QualityInfo::High { quality_info: r.read_bits(3)? },
            Quality::Magic => QualityInfo::Magic {
                name_id_first: r.read_bits(11)?,
                name_id_last: r.read_bits(11)?,
            },
            Quality::Set => QualityInfo::Set { name_id_first: r.read_bits(12)? },
            Quality::Rare => {
                let name_id_first = r.read_bits(8)?;
                let name_id_last = r.read_bits(8)?;
                let (prefixes, suffixes) = read_affixes(r)?;
                QualityInfo::Rare { name_id_first, name_id_last, prefixes, suffixes }
            }
            Quality::Unique => QualityInfo::Unique { name_id_first: r.read_bits(12)? },
            Quality::Crafted => {
                let name_id_first = r.read_bits(8)?;
                let name_id_last = r.read_bits(8)?;
                let (prefixes, suffixes) = read_affixes(r)?;
                QualityInfo::Crafted { name_id_first, name_id_last, prefixes, suffixes }
            }
        })
    }

    fn write(&self, w: &mut BitWriter) -> Result<(), ItemError> {
        match self {
            QualityInfo::Low { quality_info } | QualityInfo::High { quality_info } => {
                w.write_bits(*quality_info, 3)?;
            }
            QualityInfo::Normal => {}
            QualityInfo::Magic { name_id_first, name_id_last } => {
                w.write_bits(*name_id_first, 11)?;
                w.write_bits(*name_id_last, 11)?;
            }
            QualityInfo::Set { name_id_first } => {
                w.write_bits(*name_id_first, 12)?;
            }
            QualityInfo::Rare { name_id_first, name_id_last, prefixes, suffixes }
            | QualityInfo::Crafted { name_id_first, name_id_last, prefixes, suffixes } => {
                w.write_bits(*name_id_first, 8)?;
                w.write_bits(*name_id_last, 8)?;
                write_affixes(w, prefixes, suffixes)?;
            }
            QualityInfo::Unique { name_id_first } => {
                w.write_bits(*name_id_first, 12)?;
            }
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        match self {
            QualityInfo::Low { .. } => Quality::Low,
            QualityInfo::Normal => Quality::Normal,
            QualityInfo::High { .. } => Quality::High,
            QualityInfo::Magic { .. } => Quality::Magic,
            QualityInfo::Set { .. } => Quality::Set,
            QualityInfo::Rare { .. } => Quality::Rare,
            QualityInfo::Unique { .. } => Quality::Unique,
            QualityInfo::Crafted { .. } => Quality::Crafted,
        }
    }
}

/// Durability, present when the item's code classifies as armor, shield, or
/// weapon. `current`/`timestamp_bit` are absent when `max == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durability {
    pub max: u32,
    pub current: Option<u32>,
}

/// Fields present only on non-`simple` items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedItem {
    pub id: u32,
    pub level: u32,
    pub pic_id: Option<u32>,
    pub class_info: Option<u32>,
    pub naming: QualityInfo,
    /// `(runeword_id, trailing constant)`. The constant is "always 5" per
    /// the original author's own uncertainty (`spec.md` §9); preserved
    /// verbatim rather than normalized so a divergent save is round-tripped,
    /// not silently corrected.
    pub runeword: Option<(u32, u32)>,
    pub personalized_name: Option<String>,
    pub tome_info: Option<u32>,
    /// Undocumented single bit read unconditionally after naming/personalization/tome.
    pub unusual_bit: bool,
    pub defense: Option<u32>,
    pub durability: Option<Durability>,
    pub quantity: Option<u32>,
    /// Total socket capacity (distinct from `Item::sockets_filled`, the
    /// number of children actually present). Present iff `Item::socketed`.
    pub socket_count: Option<u32>,
    pub magical_props: MagicalProperties,
    pub set_props: Vec<MagicalProperties>,
    pub runeword_props: Option<MagicalProperties>,
}

/// A single item record, fixed header plus (for non-simple items) the
/// extended body, plus owned socketed children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub quest_item: bool,
    pub identified: bool,
    pub autofill: bool,
    pub socketed: bool,
    pub new: bool,
    pub autoequip: u32,
    pub ear: bool,
    pub starter: bool,
    pub simple: bool,
    pub ethereal: bool,
    pub personalized: bool,
    pub runeword: bool,
    /// Opaque 15-bit field of unknown substructure; round-tripped verbatim.
    pub unknown: u32,
    pub parent: u32,
    pub equipped: u32,
    pub x: u32,
    pub y: u32,
    pub stored: u32,
    pub code: [u8; 3],
    pub sockets_filled: u32,
    pub extended: Option<ExtendedItem>,
    pub children: Vec<Item>,
}

impl Item {
    fn type_flags(&self) -> ItemTypeFlags {
        tables::item_type_flags(self.code)
    }

    pub fn is_rune(&self) -> bool {
        tables::is_rune(self.code)
    }
    pub fn is_gem(&self) -> bool {
        tables::is_gem(self.code)
    }
    pub fn is_tome(&self) -> bool {
        tables::is_tome(self.code)
    }
    pub fn has_defense(&self) -> bool {
        self.type_flags().intersects(ItemTypeFlags::ARMOR | ItemTypeFlags::SHIELD)
    }
    pub fn has_durability(&self) -> bool {
        self.type_flags()
            .intersects(ItemTypeFlags::ARMOR | ItemTypeFlags::SHIELD | ItemTypeFlags::WEAPON)
    }
    pub fn has_quantity(&self) -> bool {
        tables::has_quantity(self.code)
    }

    /// Moves the item to a location not covered by `move_to_*`; clears `equipped`.
    pub fn move_to(&mut self, parent: u32, stored: u32, x: u32, y: u32) {
        self.parent = parent;
        self.equipped = 0;
        self.x = x;
        self.y = y;
        self.stored = stored;
    }

    pub fn move_to_inventory(&mut self, x: u32, y: u32) {
        self.move_to(ITEM_STORED, STORED_INVENTORY, x, y);
    }

    pub fn move_to_cube(&mut self, x: u32, y: u32) {
        self.move_to(ITEM_STORED, STORED_CUBE, x, y);
    }

    pub fn move_to_stash(&mut self, x: u32, y: u32) {
        self.move_to(ITEM_STORED, STORED_STASH, x, y);
    }

    /// Personalizes the item with `name`, clearing `simple` (an item cannot
    /// be both simple and personalized).
    ///
    /// Panics if the item has no extended body (a still-`simple` item):
    /// callers must populate `extended` before personalizing.
    pub fn personalize(&mut self, name: impl Into<String>) {
        self.simple = false;
        self.personalized = true;
        self.extended
            .as_mut()
            .expect("personalize requires an item with an extended body")
            .personalized_name = Some(name.into());
    }

    pub fn decode(r: &mut BitReader) -> Result<Item, ItemError> {
        let found = [r.read_bits(8)? as u8, r.read_bits(8)? as u8];
        if found != MAGIC {
            return Err(ItemError::BadMagic { expected: MAGIC, found });
        }

        let quest_item = r.read_bit()?;
        r.read_bits(3)?;
        let identified = r.read_bit()?;
        r.read_bits(5)?;
        let autofill = r.read_bit()?;
        let socketed = r.read_bit()?;
        r.read_bit()?;
        let new = r.read_bit()?;
        let autoequip = r.read_bits(2)?;
        let ear = r.read_bit()?;
        let starter = r.read_bit()?;
        r.read_bits(3)?;
        let simple = r.read_bit()?;
        let ethereal = r.read_bit()?;
        r.read_bit()?; // reserved, always 1
        let personalized = r.read_bit()?;
        r.read_bit()?;
        let runeword = r.read_bit()?;
        let unknown = r.read_bits(15)?;
        let parent = r.read_bits(3)?;
        let equipped = r.read_bits(4)?;
        let x = r.read_bits(4)?;
        let y = r.read_bits(3)?;
        r.read_bit()?;
        let stored = r.read_bits(3)?;
        let code = [r.read_bits(8)? as u8, r.read_bits(8)? as u8, r.read_bits(8)? as u8];
        r.read_bits(8)?; // terminator, 0x20 space
        let sockets_filled = r.read_bits(3)?;

        let mut item = Item {
            quest_item,
            identified,
            autofill,
            socketed,
            new,
            autoequip,
            ear,
            starter,
            simple,
            ethereal,
            personalized,
            runeword,
            unknown,
            parent,
            equipped,
            x,
            y,
            stored,
            code,
            sockets_filled,
            extended: None,
            children: Vec::new(),
        };

        if simple {
            r.align_to_byte()?;
            return Ok(item);
        }

        item.extended = Some(ExtendedItem::decode(r, &item)?);
        r.align_to_byte()?;

        if item.socketed {
            for _ in 0..item.sockets_filled {
                item.children.push(Item::decode(r)?);
            }
        }

        Ok(item)
    }

    pub fn encode(&self, w: &mut BitWriter) -> Result<(), ItemError> {
        w.write_bytes(&MAGIC)?;

        w.write_bit(self.quest_item)?;
        w.write_bits(0, 3)?;
        w.write_bit(self.identified)?;
        w.write_bits(0, 5)?;
        w.write_bit(self.autofill)?;
        w.write_bit(self.socketed)?;
        w.write_bit(false)?;
        w.write_bit(self.new)?;
        w.write_bits(self.autoequip, 2)?;
        w.write_bit(self.ear)?;
        w.write_bit(self.starter)?;
        w.write_bits(0, 3)?;
        w.write_bit(self.simple)?;
        w.write_bit(self.ethereal)?;
        w.write_bit(true)?;
        w.write_bit(self.personalized)?;
        w.write_bit(false)?;
        w.write_bit(self.runeword)?;
        w.write_bits(self.unknown, 15)?;
        w.write_bits(self.parent, 3)?;
        w.write_bits(self.equipped, 4)?;
        w.write_bits(self.x, 4)?;
        w.write_bits(self.y, 3)?;
        w.write_bit(false)?;
        w.write_bits(self.stored, 3)?;
        for b in self.code {
            w.write_bits(b as u32, 8)?;
        }
        w.write_bits(0x20, 8)?;
        w.write_bits(self.sockets_filled, 3)?;

        if self.simple {
            w.end_byte()?;
            return Ok(());
        }

        let ext = self
            .extended
            .as_ref()
            .expect("non-simple item must carry an extended body");
        ext.encode(w, self)?;

        w.end_byte()?;

        for child in &self.children {
            child.encode(w)?;
        }

        Ok(())
    }
}

impl ExtendedItem {
    fn decode(r: &mut BitReader, item: &Item) -> Result<ExtendedItem, ItemError> {
        let id = r.read_bits(32)?;
        let level = r.read_bits(7)?;
        let quality_raw = r.read_bits(4)?;
        let quality = Quality::try_from(quality_raw)?;

        let multipic = r.read_bit()?;
        let pic_id = if multipic { Some(r.read_bits(3)?) } else { None };

        let class_specific = r.read_bit()?;
        let class_info = if class_specific { Some(r.read_bits(11)?) } else { None };

        let naming = QualityInfo::read(r, quality)?;

        let runeword = if item.runeword {
            let runeword_id = r.read_bits(12)?;
            let constant = r.read_bits(4)?;
            Some((runeword_id, constant))
        } else {
            None
        };

        let personalized_name = if item.personalized {
            let mut name = String::new();
            loop {
                let c = r.read_bits(7)?;
                if c == 0 {
                    break;
                }
                name.push(c as u8 as char);
            }
            Some(name)
        } else {
            None
        };

        let tome_info = if item.is_tome() { Some(r.read_bits(5)?) } else { None };

        let unusual_bit = r.read_bit()?;

        let defense = if item.has_defense() { Some(r.read_bits(11)?) } else { None };

        let durability = if item.has_durability() {
            let max = r.read_bits(8)?;
            let current = if max > 0 {
                let current = r.read_bits(8)?;
                r.read_bit()?;
                Some(current)
            } else {
                None
            };
            Some(Durability { max, current })
        } else {
            None
        };

        let quantity = if item.has_quantity() { Some(r.read_bits(9)?) } else { None };

        let socket_count = if item.socketed { Some(r.read_bits(4)?) } else { None };

        let set_prop_count_id = if quality == Quality::Set { Some(r.read_bits(5)?) } else { None };

        let magical_props = MagicalProperties::read(r)?;

        let set_props = if let Some(mask) = set_prop_count_id {
            let count = tables::set_list_count(mask);
            let mut lists = Vec::with_capacity(count as usize);
            for _ in 0..count {
                lists.push(MagicalProperties::read(r)?);
            }
            lists
        } else {
            Vec::new()
        };

        let runeword_props = if item.runeword { Some(MagicalProperties::read(r)?) } else { None };

        Ok(ExtendedItem {
            id,
            level,
            pic_id,
            class_info,
            naming,
            runeword,
            personalized_name,
            tome_info,
            unusual_bit,
            defense,
            durability,
            quantity,
            socket_count,
            magical_props,
            set_props,
            runeword_props,
        })
    }

    fn encode(&self, w: &mut BitWriter, item: &Item) -> Result<(), ItemError> {
        w.write_bits(self.id, 32)?;
        w.write_bits(self.level, 7)?;
        w.write_bits(self.naming.quality() as u32, 4)?;

        match self.pic_id {
            Some(pic_id) => {
                w.write_bit(true)?;
                w.write_bits(pic_id, 3)?;
            }
            None => w.write_bit(false)?,
        }
        match self.class_info {
            Some(class_info) => {
                w.write_bit(true)?;
                w.write_bits(class_info, 11)?;
            }
            None => w.write_bit(false)?,
        }

        self.naming.write(w)?;

        if let Some((runeword_id, constant)) = self.runeword {
            w.write_bits(runeword_id, 12)?;
            w.write_bits(constant, 4)?;
        }

        if let Some(name) = &self.personalized_name {
            for c in name.chars() {
                w.write_bits(c as u32, 7)?;
            }
            w.write_bits(0, 7)?;
        }

        if let Some(tome_info) = self.tome_info {
            w.write_bits(tome_info, 5)?;
        }

        w.write_bit(self.unusual_bit)?;

        if let Some(defense) = self.defense {
            w.write_bits(defense, 11)?;
        }

        if let Some(durability) = &self.durability {
            w.write_bits(durability.max, 8)?;
            if let Some(current) = durability.current {
                w.write_bits(current, 8)?;
                w.write_bit(false)?;
            }
        }

        if let Some(quantity) = self.quantity {
            w.write_bits(quantity, 9)?;
        }

        if let Some(socket_count) = self.socket_count {
            w.write_bits(socket_count, 4)?;
        }

        if let QualityInfo::Set { .. } = &self.naming {
            let mask = self
                .set_props
                .len()
                .try_into()
                .expect("set property count fits in 5 bits");
            w.write_bits(mask, 5)?;
        }

        self.magical_props.write(w)?;

        for props in &self.set_props {
            props.write(w)?;
        }

        if let Some(runeword_props) = &self.runeword_props {
            runeword_props.write(w)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn simple_rune() -> Item {
        Item {
            quest_item: false,
            identified: true,
            autofill: false,
            socketed: false,
            new: false,
            autoequip: 0,
            ear: false,
            starter: false,
            simple: true,
            ethereal: false,
            personalized: false,
            runeword: false,
            unknown: 0,
            parent: ITEM_STORED,
            equipped: 0,
            x: 0,
            y: 0,
            stored: STORED_INVENTORY,
            code: *b"r01",
            sockets_filled: 0,
            extended: None,
            children: Vec::new(),
        }
    }

    fn round_trip(item: &Item) -> Item {
        let mut w = BitWriter::new();
        item.encode(&mut w).unwrap();
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        Item::decode(&mut r).unwrap()
    }

    /// Scenario 2 from `spec.md` §8: a simple El rune.
    #[test]
    fn simple_item_round_trips_and_is_fourteen_bytes() {
        let item = simple_rune();
        let mut w = BitWriter::new();
        item.encode(&mut w).unwrap();
        let bytes = w.finish();
        assert_eq!(bytes.len(), 14);
        assert!(item.is_rune());
        assert_eq!(round_trip(&item), item);
    }

    #[test]
    fn normal_quality_item_with_durability_round_trips() {
        let item = Item {
            code: *b"cap",
            simple: false,
            sockets_filled: 0,
            socketed: false,
            extended: Some(ExtendedItem {
                id: 0xDEAD_BEEF,
                level: 10,
                pic_id: None,
                class_info: None,
                naming: QualityInfo::Normal,
                runeword: None,
                personalized_name: None,
                tome_info: None,
                unusual_bit: false,
                defense: Some(12),
                durability: Some(Durability { max: 20, current: Some(18) }),
                quantity: None,
                socket_count: None,
                magical_props: MagicalProperties::default(),
                set_props: Vec::new(),
                runeword_props: None,
            }),
            ..simple_rune()
        };
        let round_tripped = round_trip(&item);
        assert_eq!(round_tripped, item);
        assert!(item.has_defense());
        assert!(item.has_durability());
    }

    #[test]
    fn personalized_unique_item_round_trips() {
        let mut item = Item {
            code: *b"swo",
            simple: false,
            personalized: true,
            extended: Some(ExtendedItem {
                id: 7,
                level: 30,
                pic_id: None,
                class_info: None,
                naming: QualityInfo::Unique { name_id_first: 42 },
                runeword: None,
                personalized_name: Some("Deckard".to_string()),
                tome_info: None,
                unusual_bit: true,
                defense: None,
                durability: Some(Durability { max: 40, current: Some(40) }),
                quantity: None,
                socket_count: None,
                magical_props: MagicalProperties::default(),
                set_props: Vec::new(),
                runeword_props: None,
            }),
            ..simple_rune()
        };
        item.personalize("Deckard");
        assert_eq!(round_trip(&item), item);
    }

    #[test]
    fn socketed_item_round_trips_with_children() {
        let mut socket = simple_rune();
        socket.parent = ITEM_SOCKETED;

        let item = Item {
            code: *b"swo",
            simple: false,
            socketed: true,
            sockets_filled: 1,
            extended: Some(ExtendedItem {
                id: 99,
                level: 15,
                pic_id: None,
                class_info: None,
                naming: QualityInfo::Normal,
                runeword: None,
                personalized_name: None,
                tome_info: None,
                unusual_bit: false,
                defense: None,
                durability: Some(Durability { max: 30, current: Some(30) }),
                quantity: None,
                socket_count: Some(1),
                magical_props: MagicalProperties::default(),
                set_props: Vec::new(),
                runeword_props: None,
            }),
            children: vec![socket],
            ..simple_rune()
        };
        let round_tripped = round_trip(&item);
        assert_eq!(round_tripped, item);
        assert_eq!(round_tripped.children.len(), 1);
        assert_eq!(round_tripped.children[0].parent, ITEM_SOCKETED);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut w = BitWriter::new();
        w.write_bytes(b"XX").unwrap();
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        assert!(matches!(
            Item::decode(&mut r),
            Err(ItemError::BadMagic { found: [b'X', b'X'], .. })
        ));
    }
}
