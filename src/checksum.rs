//! File-level checksum, as used by the save-file trailer patch (`spec.md` §4.2).

/// Offset of the 4-byte little-endian checksum slot within a save file.
pub const CHECKSUM_OFFSET: usize = 12;
const CHECKSUM_LEN: usize = 4;

/// Computes the rolling 32-bit checksum over `data`, as if the 4 bytes at
/// [`CHECKSUM_OFFSET`] were zero (the caller is expected to have already
/// zeroed them, or to use [`patch_checksum`] which does this for them).
pub fn create_checksum(data: &[u8]) -> i32 {
    let mut acc: i32 = 0;
    for &b in data {
        let carry = if acc < 0 { 1 } else { 0 };
        acc = acc.wrapping_shl(1).wrapping_add(b as i32).wrapping_add(carry);
    }
    acc
}

/// Returns `data` with bytes `[CHECKSUM_OFFSET..CHECKSUM_OFFSET+4]` rewritten
/// to the little-endian checksum of the whole buffer (computed with that slot
/// zeroed). This is the final step of `encode_save`.
pub fn patch_checksum(mut data: Vec<u8>) -> Vec<u8> {
    for b in &mut data[CHECKSUM_OFFSET..CHECKSUM_OFFSET + CHECKSUM_LEN] {
        *b = 0;
    }
    let checksum = create_checksum(&data);
    data[CHECKSUM_OFFSET..CHECKSUM_OFFSET + CHECKSUM_LEN].copy_from_slice(&checksum.to_le_bytes());
    data
}

/// Reads the little-endian checksum currently stored in `data`.
pub fn stored_checksum(data: &[u8]) -> i32 {
    let mut buf = [0u8; CHECKSUM_LEN];
    buf.copy_from_slice(&data[CHECKSUM_OFFSET..CHECKSUM_OFFSET + CHECKSUM_LEN]);
    i32::from_le_bytes(buf)
}
