//! Item-list containers (`spec.md` §4.6): an ordered sequence of top-level
//! [`Item`]s, optionally preceded by an opaque 12-byte corpse preamble. Used
//! both for a save's inventory/corpse sections and standalone as the
//! `.d2i` shared-stash format (`spec.md` §6).

use std::fmt;

use crate::bitstream::{BitReader, BitStreamError, BitWriter};
use crate::item::{Item, ItemError, ITEM_SOCKETED};

const MAGIC: [u8; 2] = *b"JM";
const CORPSE_PREAMBLE_LEN: usize = 12;

#[derive(Debug)]
pub enum ItemListError {
    BadMagic { expected: [u8; 2], found: [u8; 2] },
    BitStream(BitStreamError),
    Item(ItemError),
}

impl fmt::Display for ItemListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemListError::BadMagic { expected, found } => write!(
                f,
                "bad item list magic: expected {:02x?}, found {:02x?}",
                expected, found
            ),
            ItemListError::BitStream(e) => write!(f, "{}", e),
            ItemListError::Item(e) => write!(f, "{}", e),
        }
    }
}
impl std::error::Error for ItemListError {}
impl From<BitStreamError> for ItemListError {
    fn from(e: BitStreamError) -> Self {
        ItemListError::BitStream(e)
    }
}
impl From<ItemError> for ItemListError {
    fn from(e: ItemError) -> Self {
        ItemListError::Item(e)
    }
}

/// An ordered sequence of top-level items (socketed children live under
/// their parent's `Item::children`, not in this list).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemList {
    pub items: Vec<Item>,
    /// Present (and preserved verbatim) when this list represents a
    /// character's corpse; `spec.md` §4.6 treats its 12 bytes as opaque.
    pub corpse_preamble: Option<[u8; CORPSE_PREAMBLE_LEN]>,
}

impl ItemList {
    fn read_header_and_items(r: &mut BitReader) -> Result<Vec<Item>, ItemListError> {
        let found = [r.read_bits(8)? as u8, r.read_bits(8)? as u8];
        if found != MAGIC {
            return Err(ItemListError::BadMagic { expected: MAGIC, found });
        }
        let count = r.read_bits(16)?;

        let mut items = Vec::new();
        let mut read = 0u16;
        while read < count as u16 {
            let item = Item::decode(r)?;
            if item.parent != ITEM_SOCKETED {
                read += 1;
            }
            items.push(item);
        }
        Ok(items)
    }

    pub fn decode(data: &[u8]) -> Result<ItemList, ItemListError> {
        let mut r = BitReader::new(data);
        Self::decode_from(&mut r)
    }

    pub fn decode_from(r: &mut BitReader) -> Result<ItemList, ItemListError> {
        let first = [r.read_bits(8)? as u8, r.read_bits(8)? as u8];
        if first != MAGIC {
            return Err(ItemListError::BadMagic { expected: MAGIC, found: first });
        }
        let outer_count = r.read_bits(16)?;

        if outer_count == 1 {
            let mut preamble = [0u8; CORPSE_PREAMBLE_LEN];
            for b in &mut preamble {
                *b = r.read_bits(8)? as u8;
            }
            let items = Self::read_header_and_items(r)?;
            return Ok(ItemList { items, corpse_preamble: Some(preamble) });
        }

        let mut items = Vec::new();
        let mut read = 0u16;
        while read < outer_count as u16 {
            let item = Item::decode(r)?;
            if item.parent != ITEM_SOCKETED {
                read += 1;
            }
            items.push(item);
        }
        Ok(ItemList { items, corpse_preamble: None })
    }

    fn top_level_count(&self) -> u16 {
        self.items
            .iter()
            .filter(|i| i.parent != ITEM_SOCKETED)
            .count()
            .try_into()
            .expect("item list count fits in u16")
    }

    pub fn encode(&self) -> Result<Vec<u8>, ItemListError> {
        let mut w = BitWriter::new();
        self.encode_into(&mut w)?;
        Ok(w.finish())
    }

    pub fn encode_into(&self, w: &mut BitWriter) -> Result<(), ItemListError> {
        if let Some(preamble) = &self.corpse_preamble {
            w.write_bytes(&MAGIC)?;
            w.write_bits(1, 16)?;
            w.write_bytes(preamble)?;
        }

        w.write_bytes(&MAGIC)?;
        w.write_bits(self.top_level_count() as u32, 16)?;
        for item in &self.items {
            item.encode(w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use hex_literal::hex;

    use super::*;
    use crate::item::{STORED_INVENTORY, ITEM_STORED};

    fn rune() -> Item {
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

    /// Scenario 1 from `spec.md` §8: an empty stash.
    #[test]
    fn empty_list_encodes_to_the_bare_magic_and_zero_count() {
        let list = ItemList::default();
        let encoded = list.encode().unwrap();
        assert_eq!(encoded, hex!("4a4d 0000"));
        assert_eq!(ItemList::decode(&encoded).unwrap(), list);
    }

    #[test]
    fn list_of_simple_items_round_trips() {
        let list = ItemList { items: vec![rune(), rune()], corpse_preamble: None };
        let encoded = list.encode().unwrap();
        assert_eq!(ItemList::decode(&encoded).unwrap(), list);
    }

    #[test]
    fn corpse_preamble_round_trips_verbatim() {
        let preamble: [u8; 12] = [1, 0, 0x7c, 0, 0xf8, 2, 0xb4, 0x16, 0, 0, 0x5a, 0x11];
        let list = ItemList {
            items: vec![rune()],
            corpse_preamble: Some(preamble),
        };
        let encoded = list.encode().unwrap();
        let decoded = ItemList::decode(&encoded).unwrap();
        assert_eq!(decoded.corpse_preamble, Some(preamble));
        assert_eq!(decoded.items, list.items);
    }

    #[test]
    fn socketed_children_do_not_count_toward_the_header_count() {
        let mut socket = rune();
        socket.parent = ITEM_SOCKETED;

        let mut host = rune();
        host.simple = false;
        host.socketed = true;
        host.sockets_filled = 1;
        host.code = *b"swo";
        host.extended = Some(crate::item::ExtendedItem {
            id: 1,
            level: 1,
            pic_id: None,
            class_info: None,
            naming: crate::item::QualityInfo::Normal,
            runeword: None,
            personalized_name: None,
            tome_info: None,
            unusual_bit: false,
            defense: None,
            durability: Some(crate::item::Durability { max: 10, current: Some(10) }),
            quantity: None,
            socket_count: Some(1),
            magical_props: crate::magical_properties::MagicalProperties::default(),
            set_props: Vec::new(),
            runeword_props: None,
        });
        host.children = vec![socket];

        let list = ItemList { items: vec![host], corpse_preamble: None };
        let encoded = list.encode().unwrap();
        // header count must be 1 (the socket is nested, not counted)
        assert_eq!(u16::from_le_bytes([encoded[2], encoded[3]]), 1);
        assert_eq!(ItemList::decode(&encoded).unwrap(), list);
    }

    #[test]
    fn bad_magic_is_rejected() {
        assert!(matches!(
            ItemList::decode(&[b'X', b'X', 0, 0]),
            Err(ItemListError::BadMagic { .. })
        ));
    }
}
