//! Bit-granular reader/writer over an in-memory byte buffer.
//!
//! Diablo II save files pack fields in a "least-significant-bit-first"
//! orientation: each source byte's bits are consumed LSB first, and earlier
//! read bits hold the lower-order weight in the decoded integer. This is
//! exactly [`bitstream_io`]'s `LittleEndian` bit order, so rather than
//! hand-rolling the byte/value double reversal the original Python
//! implementation uses, this module canonicalizes on that single orientation
//! and lets the underlying crate do the work at the byte-source/byte-sink
//! boundary.

use bitstream_io::read::BitRead as _;
use bitstream_io::write::BitWrite as _;
use bitstream_io::LittleEndian;
use std::fmt;

/// Errors raised while reading or writing a bit stream.
#[derive(Debug)]
pub enum BitStreamError {
    /// A read ran past the end of the underlying buffer.
    Exhausted,
    /// A bit width outside `1..=32` was requested for an integer read/write.
    InvalidBitWidth(u32),
}

impl fmt::Display for BitStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitStreamError::Exhausted => write!(f, "bit stream exhausted"),
            BitStreamError::InvalidBitWidth(n) => {
                write!(f, "invalid bit width {} (must be 1..=32)", n)
            }
        }
    }
}

impl std::error::Error for BitStreamError {}

fn io_err_to_bitstream(e: std::io::Error) -> BitStreamError {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => BitStreamError::Exhausted,
        _ => BitStreamError::Exhausted,
    }
}

/// Reads bit-packed fields from a byte slice, LSB-first within each byte.
pub struct BitReader<'a> {
    inner: bitstream_io::read::BitReader<&'a [u8], LittleEndian>,
    data: &'a [u8],
    bits_read: u64,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            inner: bitstream_io::read::BitReader::new(data),
            data,
            bits_read: 0,
        }
    }

    /// Reads `n` bits (`1..=32`) and returns them as an unsigned integer.
    pub fn read_bits(&mut self, n: u32) -> Result<u32, BitStreamError> {
        if n == 0 || n > 32 {
            return Err(BitStreamError::InvalidBitWidth(n));
        }
        let v: u32 = self.inner.read_var(n).map_err(io_err_to_bitstream)?;
        self.bits_read += n as u64;
        Ok(v)
    }

    /// Reads a single bit as a `bool`.
    pub fn read_bit(&mut self) -> Result<bool, BitStreamError> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Reads `n` bytes, each recovered in its original on-wire value.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, BitStreamError> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.read_bits(8)? as u8);
        }
        Ok(out)
    }

    /// Number of unread bits remaining before the next byte boundary.
    pub fn remaining_in_byte(&self) -> u32 {
        (8 - (self.bits_read % 8)) as u32 % 8
    }

    /// Discards any unread bits in the current byte.
    pub fn align_to_byte(&mut self) -> Result<(), BitStreamError> {
        let remaining = self.remaining_in_byte();
        if remaining > 0 {
            self.read_bits(remaining)?;
        }
        Ok(())
    }

    /// Total bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// Total whole bytes consumed so far. Only meaningful once byte-aligned.
    pub fn bytes_consumed(&self) -> usize {
        (self.bits_read / 8) as usize
    }

    /// The unread tail of the original buffer, without consuming it.
    /// Only meaningful when called at a byte-aligned position.
    pub fn peek_remaining(&self) -> &'a [u8] {
        &self.data[self.bytes_consumed()..]
    }
}

/// Writes bit-packed fields to an in-memory buffer, LSB-first within each byte.
pub struct BitWriter {
    inner: bitstream_io::write::BitWriter<Vec<u8>, LittleEndian>,
    bits_written: u64,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            inner: bitstream_io::write::BitWriter::new(Vec::new()),
            bits_written: 0,
        }
    }

    /// Appends the low `n` bits (`1..=32`) of `value`.
    pub fn write_bits(&mut self, value: u32, n: u32) -> Result<(), BitStreamError> {
        if n == 0 || n > 32 {
            return Err(BitStreamError::InvalidBitWidth(n));
        }
        self.inner
            .write_var(n, value)
            .map_err(io_err_to_bitstream)?;
        self.bits_written += n as u64;
        Ok(())
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<(), BitStreamError> {
        self.write_bits(bit as u32, 1)
    }

    /// Appends each byte verbatim, in its on-wire orientation.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BitStreamError> {
        for b in bytes {
            self.write_bits(*b as u32, 8)?;
        }
        Ok(())
    }

    /// Pads the current byte with zero bits up to the next byte boundary.
    pub fn end_byte(&mut self) -> Result<(), BitStreamError> {
        let remainder = (self.bits_written % 8) as u32;
        if remainder != 0 {
            self.write_bits(0, 8 - remainder)?;
        }
        Ok(())
    }

    /// Flushes any partial byte (zero-padded) and returns the accumulated bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.end_byte().expect("padding write cannot fail");
        self.inner.byte_align().expect("in-memory writer is infallible");
        self.inner.into_writer()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// P7: for every width and representable value, write-then-read round-trips.
    #[test]
    fn bit_width_round_trip() {
        for n in 1..=32u32 {
            let max = if n == 32 { u32::MAX } else { (1u32 << n) - 1 };
            for value in [0, 1, max / 2, max] {
                let mut w = BitWriter::new();
                w.write_bits(value, n).unwrap();
                let bytes = w.finish();
                let mut r = BitReader::new(&bytes);
                assert_eq!(r.read_bits(n).unwrap(), value, "width {} value {}", n, value);
            }
        }
    }

    #[test]
    fn mixed_width_sequence_round_trips() {
        let mut w = BitWriter::new();
        w.write_bits(0b101, 3).unwrap();
        w.write_bits(0x1FF, 9).unwrap();
        w.write_bits(12345, 21).unwrap();
        w.write_bit(true).unwrap();
        let bytes = w.finish();

        let mut r = BitReader::new(&bytes);
        assert_eq!(r.read_bits(3).unwrap(), 0b101);
        assert_eq!(r.read_bits(9).unwrap(), 0x1FF);
        assert_eq!(r.read_bits(21).unwrap(), 12345);
        assert!(r.read_bit().unwrap());
    }

    #[test]
    fn bytes_round_trip_regardless_of_bit_alignment() {
        let mut w = BitWriter::new();
        w.write_bits(0b101, 3).unwrap();
        w.write_bytes(b"r01").unwrap();
        let bytes = w.finish();

        let mut r = BitReader::new(&bytes);
        assert_eq!(r.read_bits(3).unwrap(), 0b101);
        assert_eq!(r.read_bytes(3).unwrap(), b"r01");
    }

    #[test]
    fn peek_remaining_does_not_consume() {
        let mut r = BitReader::new(b"abcd");
        assert_eq!(r.read_bytes(2).unwrap(), b"ab");
        assert_eq!(r.peek_remaining(), b"cd");
        assert_eq!(r.read_bytes(2).unwrap(), b"cd");
    }

    #[test]
    fn remaining_in_byte_tracks_position() {
        let mut r = BitReader::new(&[0xFF, 0xFF]);
        assert_eq!(r.remaining_in_byte(), 0);
        r.read_bits(3).unwrap();
        assert_eq!(r.remaining_in_byte(), 5);
        r.align_to_byte().unwrap();
        assert_eq!(r.remaining_in_byte(), 0);
    }

    #[test]
    fn exhaustion_is_fatal() {
        let mut r = BitReader::new(&[0xFF]);
        assert!(r.read_bits(9).is_err());
    }

    #[test]
    fn invalid_bit_width_rejected() {
        let mut w = BitWriter::new();
        assert!(matches!(
            w.write_bits(0, 0),
            Err(BitStreamError::InvalidBitWidth(0))
        ));
        assert!(matches!(
            w.write_bits(0, 33),
            Err(BitStreamError::InvalidBitWidth(33))
        ));
    }
}
