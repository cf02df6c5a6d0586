//! Item-code classification tables (`spec.md` §4.5 / §1 Non-goals).
//!
//! The real game drives these classifications from `weapons.txt`,
//! `armor.txt`, and `misc.txt` data files, keyed by a three-character item
//! code (e.g. `"rin"`, `"r01"`, `"jew"`). `spec.md` places the descriptive
//! name tables themselves out of scope and treats item codes as opaque
//! three-byte strings; what the codec still needs from that data, though, is
//! a handful of *structural* predicates: whether an item code carries a
//! quantity count, a defense rating, or durability, and whether it is a
//! rune/gem/tome, for the purposes of the convenience helpers on [`crate::item::Item`].
//! Those predicates are reproduced here as small, explicit code sets rather
//! than parsed from opaque data, matching the original's `Items.py`
//! `RUNES`/`GEMS`/`TOMES` membership-test style.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Rune codes `"r01"`..`"r33"`.
fn rune_codes() -> &'static HashSet<[u8; 3]> {
    static RUNES: OnceLock<HashSet<[u8; 3]>> = OnceLock::new();
    RUNES.get_or_init(|| {
        (1..=33)
            .map(|n| {
                let s = format!("r{:02}", n);
                let b = s.as_bytes();
                [b[0], b[1], b[2]]
            })
            .collect()
    })
}

const GEM_CODES: &[&[u8; 3]] = &[
    b"gcv", b"gfv", b"gsv", b"gzv", b"gpv", // chipped
    b"gcy", b"gfy", b"gsy", b"gzy", b"gpy", // flawed
    b"gcb", b"gfb", b"gsb", b"gzb", b"gpb", // (standard)
    b"gcg", b"gfg", b"gsg", b"gzg", b"gpg", // flawless
    b"gcr", b"gfr", b"gsr", b"gzr", b"gpr", // perfect
    b"gcw", b"gfw", b"gsw", b"gzw", b"gpw",
];

const TOME_CODES: &[&[u8; 3]] = &[b"tbk", b"ibk"]; // Tome of Town Portal / Identify

const QUANTITY_CODES: &[&[u8; 3]] = &[
    b"tbk", b"ibk", b"key", b"aqv", b"gid", b"ruq", b"pk1", b"pk2", b"pk3",
];

/// Whether `code` is one of the 33 rune items.
pub fn is_rune(code: [u8; 3]) -> bool {
    rune_codes().contains(&code)
}

/// Whether `code` is one of the gem items (any of the five types/qualities).
pub fn is_gem(code: [u8; 3]) -> bool {
    GEM_CODES.iter().any(|c| **c == code)
}

/// Whether `code` names a stackable tome (Town Portal / Identify scroll tome).
pub fn is_tome(code: [u8; 3]) -> bool {
    TOME_CODES.iter().any(|c| **c == code)
}

/// Whether items of `code` carry an extended `quantity` field instead of
/// durability (stackables: tomes, keys, Horadric Cube reagents, potions).
pub fn has_quantity(code: [u8; 3]) -> bool {
    QUANTITY_CODES.iter().any(|c| **c == code)
}

bitflags::bitflags! {
    /// Which of the three equipment classes an item code belongs to, if any.
    /// Drives whether the extended item body carries `defense` and/or
    /// `durability` fields; see `spec.md` §4.5.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ItemTypeFlags: u8 {
        const ARMOR = 0b001;
        const SHIELD = 0b010;
        const WEAPON = 0b100;
    }
}

const ARMOR_CODES: &[&[u8; 3]] = &[
    b"cap", b"skp", b"hlm", b"crn", b"msk", // helms
    b"qui", b"lea", b"hla", b"stu", b"rng", b"scl", b"chn", b"brs", b"spl", b"plt", // body armor
    b"lgl", b"vgl", b"mgl", b"tgl", b"ltg", b"hvg", // gloves
    b"lbt", b"vbt", b"mbt", b"tbt", b"lbo", b"hbo", // boots
    b"lbl", b"vbl", b"mbl", b"tbl", // belts
];

const SHIELD_CODES: &[&[u8; 3]] = &[
    b"buc", b"sml", b"kit", b"tow", b"gts", b"spk", b"lrg", b"rnd",
];

const WEAPON_CODES: &[&[u8; 3]] = &[
    b"hax", b"axe", b"2ha", b"wax", // axes
    b"dgr", b"dir", b"kri", b"bld", // daggers
    b"swo", b"scm", b"sbr", b"flc", b"crs", b"bsd", b"lsd", b"wsd", b"2hs", // swords
    b"mac", b"mst", b"fla", b"whm", b"mau", b"gma", // maces
    b"ssp", b"spe", b"pik", b"bar", b"vou", b"gis", b"hal", // spears/polearms
    b"clb", b"scp", b"gsc", b"wnd", // staves/wands
    b"sst", b"lst", b"cst", b"bst", // staves
    b"sbw", b"hbw", b"lbw", b"cbw", // bows
    b"lxb", b"mxb", b"hxb", // crossbows
];

/// Classifies an item code into zero or more of armor/shield/weapon.
///
/// Representative subset of the real `weapons.txt`/`armor.txt` tables (out of
/// scope per `spec.md` §1); unrecognized codes classify as none of the
/// three, which is correct for jewelry, quest items, runes, and gems.
pub fn item_type_flags(code: [u8; 3]) -> ItemTypeFlags {
    let mut flags = ItemTypeFlags::empty();
    if ARMOR_CODES.iter().any(|c| **c == code) {
        flags |= ItemTypeFlags::ARMOR;
    }
    if SHIELD_CODES.iter().any(|c| **c == code) {
        flags |= ItemTypeFlags::SHIELD;
    }
    if WEAPON_CODES.iter().any(|c| **c == code) {
        flags |= ItemTypeFlags::WEAPON;
    }
    flags
}

/// The number of set-bonus property lists present for a Set item, derived
/// from the 5-bit "which lists are present" mask read from the item body.
///
/// The original's `SET_LIST_MAP` looks like an arbitrary lookup table but is
/// exactly the population count (number of set bits) of the mask: each bit
/// independently gates one list.
pub fn set_list_count(mask: u32) -> u32 {
    (mask & 0b1_1111).count_ones()
}
