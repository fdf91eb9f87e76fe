//! Heap Block Headers.
//!
//! Every block starts with a header of four `XLEN`-wide words stored in simulated
//! memory, followed immediately by the payload:
//!
//! | offset | field                                   |
//! |--------|-----------------------------------------|
//! | 0      | payload size in bytes                   |
//! | W      | state (0 = free, 1 = allocated)         |
//! | 2W     | address of the next header (0 = none)   |
//! | 3W     | address of the previous header (0 = none) |
//!
//! The allocator only ever holds header addresses; the header contents are
//! read and written through [`Memory`] on every use.

use serde::Serialize;

use crate::common::{HeapError, Xlen};
use crate::memory::Memory;

/// State word of a free block.
const STATE_FREE: u64 = 0;
/// State word of an allocated block.
const STATE_ALLOCATED: u64 = 1;

/// In-register copy of one block header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    /// Address of the header itself.
    pub addr: u64,
    /// Payload size in bytes (a multiple of the word size).
    pub size: u64,
    /// `true` when the block is on the free list.
    pub free: bool,
    /// Next header in address order, or 0.
    pub next: u64,
    /// Previous header in address order, or 0.
    pub prev: u64,
}

impl BlockHeader {
    /// Reads the header stored at `addr`.
    ///
    /// # Arguments
    ///
    /// * `mem` - The memory holding the header.
    /// * `addr` - Header address.
    ///
    /// # Returns
    ///
    /// The decoded header, or `HeapError::Corrupted` if the state word is neither
    /// free nor allocated.
    pub fn read(mem: &Memory, addr: u64) -> Result<Self, HeapError> {
        let w = mem.xlen().bytes();
        let size = mem.load_xword(addr)?;
        let state = mem.load_xword(addr.wrapping_add(w))?;
        let next = mem.load_xword(addr.wrapping_add(2 * w))?;
        let prev = mem.load_xword(addr.wrapping_add(3 * w))?;
        let free = match state {
            STATE_FREE => true,
            STATE_ALLOCATED => false,
            _ => return Err(HeapError::Corrupted { addr }),
        };
        Ok(Self {
            addr,
            size,
            free,
            next,
            prev,
        })
    }

    /// Writes all four header words back to memory.
    pub fn write(&self, mem: &mut Memory) -> Result<(), HeapError> {
        let w = mem.xlen().bytes();
        let state = if self.free {
            STATE_FREE
        } else {
            STATE_ALLOCATED
        };
        mem.store_xword(self.addr, self.size)?;
        mem.store_xword(self.addr.wrapping_add(w), state)?;
        mem.store_xword(self.addr.wrapping_add(2 * w), self.next)?;
        mem.store_xword(self.addr.wrapping_add(3 * w), self.prev)?;
        Ok(())
    }

    /// Overwrites only the `prev` link of the header at `addr`.
    pub fn write_prev(mem: &mut Memory, addr: u64, prev: u64) -> Result<(), HeapError> {
        let w = mem.xlen().bytes();
        mem.store_xword(addr.wrapping_add(3 * w), prev)?;
        Ok(())
    }

    /// Overwrites only the `next` link of the header at `addr`.
    pub fn write_next(mem: &mut Memory, addr: u64, next: u64) -> Result<(), HeapError> {
        let w = mem.xlen().bytes();
        mem.store_xword(addr.wrapping_add(2 * w), next)?;
        Ok(())
    }

    /// Size of a header in bytes for the given width.
    #[inline]
    pub const fn header_size(xlen: Xlen) -> u64 {
        crate::common::constants::HEADER_WORDS * xlen.bytes()
    }

    /// First payload byte.
    #[inline]
    pub fn payload(&self, xlen: Xlen) -> u64 {
        self.addr + Self::header_size(xlen)
    }

    /// One past the last payload byte.
    #[inline]
    pub fn end(&self, xlen: Xlen) -> u64 {
        self.payload(xlen) + self.size
    }

    /// Public summary of this block.
    pub fn info(&self, xlen: Xlen) -> BlockInfo {
        BlockInfo {
            header: self.addr,
            payload: self.payload(xlen),
            size: self.size,
            free: self.free,
        }
    }
}

/// One entry of [`Heap::blocks`](super::Heap::blocks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    /// Header address.
    pub header: u64,
    /// Payload address (what `malloc` returned).
    pub payload: u64,
    /// Payload size in bytes.
    pub size: u64,
    /// Whether the block is free.
    pub free: bool,
}
