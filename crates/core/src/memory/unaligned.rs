//! Unaligned memory access handling.
//!
//! Multi-byte accesses that are not naturally aligned (or that would straddle a
//! page) are split into single-byte reads/writes and reassembled in little-endian
//! order. Addresses wrap at the top of the address space.

use crate::common::Xlen;

/// Splits a load into `size` byte reads and reassembles the result in little-endian order.
///
/// # Arguments
///
/// * `addr` - The byte address of the access.
/// * `size` - The number of bytes to read (1, 2, 4, or 8).
/// * `xlen` - Address width used to wrap `addr + i`.
/// * `read_byte` - A closure that reads a single byte from the given address.
///
/// # Returns
///
/// The reassembled value in little-endian byte order.
pub fn split_load<F>(addr: u64, size: u64, xlen: Xlen, mut read_byte: F) -> u64
where
    F: FnMut(u64) -> u8,
{
    (0..size).fold(0, |acc, i| {
        let byte = u64::from(read_byte(xlen.mask(addr.wrapping_add(i))));
        acc | (byte << (i * 8))
    })
}

/// Splits a store into `size` byte writes, least significant byte first.
///
/// # Arguments
///
/// * `addr` - The byte address of the access.
/// * `size` - The number of bytes to write (1, 2, 4, or 8).
/// * `val` - The value to store (little-endian).
/// * `xlen` - Address width used to wrap `addr + i`.
/// * `write_byte` - A closure that writes a single byte to the given address.
pub fn split_store<F>(addr: u64, size: u64, val: u64, xlen: Xlen, mut write_byte: F)
where
    F: FnMut(u64, u8),
{
    for i in 0..size {
        let byte = ((val >> (i * 8)) & 0xFF) as u8;
        write_byte(xlen.mask(addr.wrapping_add(i)), byte);
    }
}
