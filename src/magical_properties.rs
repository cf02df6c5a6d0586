//! Magical property lists (`spec.md` §4.4): tagged, bit-packed modifier
//! records attached to items, set bonuses, and runewords.
//!
//! The real game ships on the order of 250 property definitions, sourced
//! from a data file rather than source code. `spec.md` §1 places "static
//! lookup tables for... magical-property descriptions" out of scope; the
//! table below is a representative subset covering the properties this
//! crate's own tests exercise, not an exhaustive transcription of the game
//! data. Any flag absent from the table is, per `spec.md` §4.4, a hard
//! decode error rather than a silently-skipped field (the table is the
//! sole source of truth for both decode and encode).

use std::fmt;

use crate::bitstream::{BitReader, BitStreamError, BitWriter};

const SENTINEL: u32 = 0x1FF;

#[derive(Debug)]
pub enum MagicalPropertiesError {
    BitStream(BitStreamError),
    /// A 9-bit flag had no entry in the static property table.
    UnknownProperty(u32),
}

impl fmt::Display for MagicalPropertiesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MagicalPropertiesError::BitStream(e) => write!(f, "{}", e),
            MagicalPropertiesError::UnknownProperty(flag) => {
                write!(f, "unknown magical property flag {}", flag)
            }
        }
    }
}
impl std::error::Error for MagicalPropertiesError {}
impl From<BitStreamError> for MagicalPropertiesError {
    fn from(e: BitStreamError) -> Self {
        MagicalPropertiesError::BitStream(e)
    }
}

/// The decoded shape of a single property flag: per-field bit widths, an
/// optional bias applied uniformly to every field, and a human-readable
/// template (unused by the codec itself; kept for parity with the dictionary
/// the original ships, per `spec.md` §4.4).
struct PropertyDef {
    flag: u32,
    widths: &'static [u32],
    bias: Option<i32>,
    template: &'static str,
}

/// Representative subset of the real property table. See module docs.
const TABLE: &[PropertyDef] = &[
    PropertyDef { flag: 0, widths: &[8], bias: Some(32), template: "+{} to Strength" },
    PropertyDef { flag: 1, widths: &[8], bias: Some(32), template: "+{} to Energy" },
    PropertyDef { flag: 2, widths: &[8], bias: Some(32), template: "+{} to Dexterity" },
    PropertyDef { flag: 3, widths: &[8], bias: Some(32), template: "+{} to Vitality" },
    PropertyDef { flag: 7, widths: &[11], bias: None, template: "+{} to Life" },
    PropertyDef { flag: 9, widths: &[11], bias: None, template: "+{} to Mana" },
    PropertyDef { flag: 16, widths: &[9], bias: Some(256), template: "+{}% Enhanced Defense" },
    PropertyDef { flag: 17, widths: &[9], bias: Some(256), template: "+{}% Enhanced Damage" },
    PropertyDef { flag: 20, widths: &[10], bias: None, template: "+{} to Attack Rating" },
    PropertyDef { flag: 31, widths: &[1], bias: None, template: "Indestructible" },
    PropertyDef { flag: 39, widths: &[8], bias: Some(50), template: "+{} to Life after each Kill" },
    PropertyDef { flag: 45, widths: &[8], bias: Some(50), template: "Fire Resist +{}%" },
    PropertyDef { flag: 46, widths: &[8], bias: Some(50), template: "Cold Resist +{}%" },
    PropertyDef { flag: 47, widths: &[8], bias: Some(50), template: "Lightning Resist +{}%" },
    PropertyDef { flag: 48, widths: &[8], bias: Some(50), template: "Poison Resist +{}%" },
    PropertyDef { flag: 83, widths: &[3, 6], bias: None, template: "+{1} to {0} Skill Levels" },
    PropertyDef { flag: 84, widths: &[3, 6], bias: None, template: "+{1} to {0} Skill Levels" },
    PropertyDef { flag: 94, widths: &[9], bias: Some(256), template: "Replenish Quantity {}" },
    PropertyDef { flag: 188, widths: &[3, 6], bias: None, template: "+{1} to {0} Skills (class-only)" },
];

fn def_for(flag: u32) -> Option<&'static PropertyDef> {
    TABLE.iter().find(|d| d.flag == flag)
}

/// A single decoded modifier record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicalProperty {
    pub flag: u32,
    /// Logical (bias-adjusted) field values, in table order.
    pub values: Vec<i64>,
}

impl MagicalProperty {
    fn read(r: &mut BitReader, flag: u32) -> Result<MagicalProperty, MagicalPropertiesError> {
        let def = def_for(flag).ok_or(MagicalPropertiesError::UnknownProperty(flag))?;
        let mut values = Vec::with_capacity(def.widths.len());
        for &width in def.widths {
            let raw = r.read_bits(width)? as i64;
            let value = match def.bias {
                Some(bias) => raw - bias as i64,
                None => raw,
            };
            values.push(value);
        }
        Ok(MagicalProperty { flag, values })
    }

    fn write(&self, w: &mut BitWriter) -> Result<(), MagicalPropertiesError> {
        let def = def_for(self.flag).ok_or(MagicalPropertiesError::UnknownProperty(self.flag))?;
        w.write_bits(self.flag, 9)?;
        for (i, &width) in def.widths.iter().enumerate() {
            let logical = self.values[i];
            let raw = match def.bias {
                Some(bias) => logical + bias as i64,
                None => logical,
            };
            w.write_bits(raw as u32, width)?;
        }
        Ok(())
    }

    /// The display template for this property's flag, for a consumer-side renderer.
    pub fn template(&self) -> &'static str {
        def_for(self.flag).map(|d| d.template).unwrap_or("")
    }
}

/// A sentinel-terminated list of [`MagicalProperty`] records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MagicalProperties(pub Vec<MagicalProperty>);

impl MagicalProperties {
    pub fn read(r: &mut BitReader) -> Result<MagicalProperties, MagicalPropertiesError> {
        let mut props = Vec::new();
        loop {
            let flag = r.read_bits(9)?;
            if flag == SENTINEL {
                break;
            }
            props.push(MagicalProperty::read(r, flag)?);
        }
        Ok(MagicalProperties(props))
    }

    pub fn write(&self, w: &mut BitWriter) -> Result<(), MagicalPropertiesError> {
        for prop in &self.0 {
            prop.write(w)?;
        }
        w.write_bits(SENTINEL, 9)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(props: &MagicalProperties) -> MagicalProperties {
        let mut w = BitWriter::new();
        props.write(&mut w).unwrap();
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        MagicalProperties::read(&mut r).unwrap()
    }

    #[test]
    fn empty_list_is_just_the_sentinel() {
        let props = MagicalProperties::default();
        let mut w = BitWriter::new();
        props.write(&mut w).unwrap();
        let bytes = w.finish();
        // 9 sentinel bits -> 2 padded bytes.
        assert_eq!(bytes.len(), 2);
        assert_eq!(round_trip(&props), props);
    }

    #[test]
    fn single_biased_property_round_trips() {
        let props = MagicalProperties(vec![MagicalProperty {
            flag: 0,
            values: vec![10],
        }]);
        assert_eq!(round_trip(&props), props);
    }

    #[test]
    fn multi_field_property_round_trips() {
        let props = MagicalProperties(vec![MagicalProperty {
            flag: 83,
            values: vec![2, 5],
        }]);
        assert_eq!(round_trip(&props), props);
    }

    #[test]
    fn list_of_several_properties_round_trips_in_order() {
        let props = MagicalProperties(vec![
            MagicalProperty { flag: 7, values: vec![45] },
            MagicalProperty { flag: 45, values: vec![20] },
            MagicalProperty { flag: 31, values: vec![1] },
        ]);
        assert_eq!(round_trip(&props), props);
    }

    #[test]
    fn unknown_flag_is_a_hard_error() {
        let mut w = BitWriter::new();
        w.write_bits(511 - 1, 9).unwrap(); // 510: not in TABLE, not the sentinel
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        assert!(matches!(
            MagicalProperties::read(&mut r),
            Err(MagicalPropertiesError::UnknownProperty(510))
        ));
    }
}
