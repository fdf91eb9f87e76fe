//! Address Helpers.
//!
//! Small pieces of address arithmetic shared by the memory, heap and engine:
//! 1. **Byte Lanes:** Selecting the byte an address occupies inside its aligned word.
//! 2. **Alignment:** Rounding sizes and addresses up to a power-of-two boundary.

/// Number of bytes in a word (the unit byte lanes are measured against).
const WORD_BYTES: u64 = 4;

/// Bits in one byte lane.
const LANE_BITS: u64 = 8;

/// Mask selecting the lowest byte lane of a word.
const LANE_MASK: u32 = 0xFF;

/// Computes the mask selecting the byte lane `addr` occupies within its
/// containing 4-byte-aligned word.
///
/// Addresses congruent to 0, 1, 2 and 3 modulo 4 produce `0x0000_00FF`,
/// `0x0000_FF00`, `0x00FF_0000` and `0xFF00_0000` respectively.
///
/// # Arguments
///
/// * `addr` - Any byte address.
///
/// # Returns
///
/// The 32-bit lane mask.
#[inline]
pub const fn word_offset_mask(addr: u64) -> u32 {
    LANE_MASK << ((addr % WORD_BYTES) * LANE_BITS)
}

/// Rounds `val` up to the next multiple of `align`.
///
/// # Arguments
///
/// * `val` - The value to round.
/// * `align` - A non-zero power of two.
///
/// # Returns
///
/// The rounded value, or `None` if rounding overflows `u64`.
#[inline]
pub const fn align_up(val: u64, align: u64) -> Option<u64> {
    let mask = align - 1;
    match val.checked_add(mask) {
        Some(v) => Some(v & !mask),
        None => None,
    }
}

/// Checks whether an access of `size` bytes at `addr` is naturally aligned.
///
/// Byte accesses (and zero-sized ones) are always aligned.
#[inline]
pub const fn is_aligned(addr: u64, size: u64) -> bool {
    if size <= 1 {
        return true;
    }
    addr & (size - 1) == 0
}
