//! Character attribute block (`spec.md` §4.3): a tagged, bit-packed,
//! sentinel-terminated list of the character's 16 numeric stats.

use std::fmt;

use crate::bitstream::{BitReader, BitStreamError, BitWriter};

pub const MAGIC: &[u8; 2] = b"gf";
const SENTINEL: u32 = 0x1FF;

#[derive(Debug)]
pub enum AttributesError {
    BitStream(BitStreamError),
    /// A 9-bit flag did not match any of the 16 known attributes, nor the sentinel.
    UnknownAttribute(u32),
}

impl fmt::Display for AttributesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributesError::BitStream(e) => write!(f, "{}", e),
            AttributesError::UnknownAttribute(flag) => {
                write!(f, "unknown attribute flag {}", flag)
            }
        }
    }
}
impl std::error::Error for AttributesError {}
impl From<BitStreamError> for AttributesError {
    fn from(e: BitStreamError) -> Self {
        AttributesError::BitStream(e)
    }
}

/// One of the 16 named character stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Stat {
    Strength,
    Energy,
    Dexterity,
    Vitality,
    StatPoints,
    SkillPoints,
    LifeCurrent,
    LifeMax,
    ManaCurrent,
    ManaMax,
    StaminaCurrent,
    StaminaMax,
    Level,
    Experience,
    Gold,
    GoldStash,
}

struct StatSpec {
    flag: u32,
    stat: Stat,
    bits: u32,
    /// Present only for the six fixed-point life/mana/stamina fields.
    divisor: Option<u32>,
}

const SPEC: [StatSpec; 16] = [
    StatSpec { flag: 0, stat: Stat::Strength, bits: 10, divisor: None },
    StatSpec { flag: 1, stat: Stat::Energy, bits: 10, divisor: None },
    StatSpec { flag: 2, stat: Stat::Dexterity, bits: 10, divisor: None },
    StatSpec { flag: 3, stat: Stat::Vitality, bits: 10, divisor: None },
    StatSpec { flag: 4, stat: Stat::StatPoints, bits: 10, divisor: None },
    StatSpec { flag: 5, stat: Stat::SkillPoints, bits: 8, divisor: None },
    StatSpec { flag: 6, stat: Stat::LifeCurrent, bits: 21, divisor: Some(256) },
    StatSpec { flag: 7, stat: Stat::LifeMax, bits: 21, divisor: Some(256) },
    StatSpec { flag: 8, stat: Stat::ManaCurrent, bits: 21, divisor: Some(256) },
    StatSpec { flag: 9, stat: Stat::ManaMax, bits: 21, divisor: Some(256) },
    StatSpec { flag: 10, stat: Stat::StaminaCurrent, bits: 21, divisor: Some(256) },
    StatSpec { flag: 11, stat: Stat::StaminaMax, bits: 21, divisor: Some(256) },
    StatSpec { flag: 12, stat: Stat::Level, bits: 7, divisor: None },
    StatSpec { flag: 13, stat: Stat::Experience, bits: 32, divisor: None },
    StatSpec { flag: 14, stat: Stat::Gold, bits: 25, divisor: None },
    StatSpec { flag: 15, stat: Stat::GoldStash, bits: 25, divisor: None },
];

fn spec_for(stat: Stat) -> &'static StatSpec {
    SPEC.iter().find(|s| s.stat == stat).expect("every Stat has a SPEC entry")
}

/// Mapping from each of the 16 stats to its raw (pre-division) stored value.
///
/// The fixed-point fields (life/mana/stamina) are kept as their raw 21-bit
/// integers end-to-end, per `spec.md` §9 ("store them as raw ... integers
/// internally"); use the `*_display` accessors to divide by 256 for
/// presentation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes {
    values: [u32; 16],
}

impl Attributes {
    fn index(stat: Stat) -> usize {
        SPEC.iter().position(|s| s.stat == stat).unwrap()
    }

    pub fn get(&self, stat: Stat) -> u32 {
        self.values[Self::index(stat)]
    }

    pub fn set(&mut self, stat: Stat, value: u32) {
        self.values[Self::index(stat)] = value;
    }

    /// Divides a fixed-point stat by its implicit divisor of 256 for display.
    /// Panics if `stat` is not one of the six fixed-point fields.
    pub fn display_value(&self, stat: Stat) -> f64 {
        let spec = spec_for(stat);
        let divisor = spec.divisor.expect("display_value only applies to fixed-point stats") as f64;
        self.get(stat) as f64 / divisor
    }

    /// Reads the attribute block from a shared bit reader already positioned
    /// at its start. Used both standalone ([`Attributes::decode`]) and as
    /// one step of a save file's larger bit-packed region.
    pub fn read(r: &mut BitReader) -> Result<Attributes, AttributesError> {
        let found = [r.read_bits(8)? as u8, r.read_bits(8)? as u8];
        if found != *MAGIC {
            return Err(AttributesError::BitStream(BitStreamError::Exhausted));
        }
        let mut attrs = Attributes::default();
        loop {
            let flag = r.read_bits(9)?;
            if flag == SENTINEL {
                break;
            }
            let spec = SPEC
                .iter()
                .find(|s| s.flag == flag)
                .ok_or(AttributesError::UnknownAttribute(flag))?;
            let value = r.read_bits(spec.bits)?;
            attrs.values[Self::index(spec.stat)] = value;
        }
        r.align_to_byte()?;
        Ok(attrs)
    }

    /// Writes the attribute block (magic, records, sentinel, byte padding)
    /// to a shared bit writer.
    pub fn write(&self, w: &mut BitWriter) -> Result<(), AttributesError> {
        w.write_bytes(MAGIC)?;
        for spec in SPEC.iter() {
            let raw = self.values[Self::index(spec.stat)];
            if raw == 0 {
                continue;
            }
            w.write_bits(spec.flag, 9)?;
            w.write_bits(raw, spec.bits)?;
        }
        w.write_bits(SENTINEL, 9)?;
        w.end_byte()?;
        Ok(())
    }

    pub fn decode(data: &[u8]) -> Result<(Attributes, usize), AttributesError> {
        let mut r = BitReader::new(data);
        let attrs = Self::read(&mut r)?;
        Ok((attrs, r.bytes_consumed()))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = BitWriter::new();
        self.write(&mut w).expect("encoding an in-memory Attributes cannot fail");
        w.finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Scenario 3 from `spec.md` §8: strength=50, level=12, all else zero.
    #[test]
    fn encodes_documented_scenario() {
        let mut attrs = Attributes::default();
        attrs.set(Stat::Strength, 50);
        attrs.set(Stat::Level, 12);

        let encoded = attrs.encode();
        assert_eq!(&encoded[..2], b"gf");

        let (decoded, len) = Attributes::decode(&encoded).unwrap();
        assert_eq!(len, encoded.len());
        assert_eq!(decoded.get(Stat::Strength), 50);
        assert_eq!(decoded.get(Stat::Level), 12);
        for stat in [
            Stat::Energy,
            Stat::Dexterity,
            Stat::Vitality,
            Stat::StatPoints,
            Stat::SkillPoints,
            Stat::LifeCurrent,
            Stat::LifeMax,
            Stat::ManaCurrent,
            Stat::ManaMax,
            Stat::StaminaCurrent,
            Stat::StaminaMax,
            Stat::Experience,
            Stat::Gold,
            Stat::GoldStash,
        ] {
            assert_eq!(decoded.get(stat), 0);
        }
    }

    /// P3: `encode(decode(A)) == A` for every nonzero attribute combination we construct.
    #[test]
    fn round_trips_all_nonzero_combinations() {
        let mut attrs = Attributes::default();
        attrs.set(Stat::Strength, 100);
        attrs.set(Stat::LifeCurrent, 256 * 40);
        attrs.set(Stat::LifeMax, 256 * 50);
        attrs.set(Stat::Experience, 123_456_789);
        attrs.set(Stat::GoldStash, 2_500_000);

        let encoded = attrs.encode();
        let (decoded, _) = Attributes::decode(&encoded).unwrap();
        assert_eq!(decoded, attrs);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn fixed_point_display_divides_by_256() {
        let mut attrs = Attributes::default();
        attrs.set(Stat::LifeMax, 256 * 77 + 128);
        assert!((attrs.display_value(Stat::LifeMax) - 77.5).abs() < 1e-9);
    }

    #[test]
    fn unknown_attribute_flag_is_rejected() {
        // 200 has no SPEC entry and is not the 0x1FF sentinel.
        let mut w = BitWriter::new();
        w.write_bits(200, 9).unwrap();
        let mut bad = b"gf".to_vec();
        bad.extend(w.finish());
        assert!(matches!(
            Attributes::decode(&bad),
            Err(AttributesError::UnknownAttribute(200))
        ));
    }

    #[test]
    fn empty_magic_mismatch_is_an_error() {
        assert!(Attributes::decode(&[0, 0, 0]).is_err());
    }
}
