//! Simulated Memory.
//!
//! This module implements the byte-addressable store shared by the engine and the
//! heap allocator. It provides:
//! 1. **Sparse Storage:** 4 KiB pages allocated on first write; unmapped bytes read as zero.
//! 2. **Width Accessors:** Byte, half-word, word and long accessors in little-endian order.
//! 3. **Alignment Policy:** Optional rejection of multi-byte accesses that are not
//!    naturally aligned, checked before any byte is touched.
//!
//! Loads are zero-extended into the returned integer; sign extension belongs to the
//! load instructions, not to this layer.

/// Byte-splitting helpers for unaligned accesses.
pub mod unaligned;

use rustc_hash::FxHashMap;

use crate::common::addr::is_aligned;
use crate::common::{MemoryError, Xlen};
use unaligned::{split_load, split_store};

/// log2 of the page size.
const PAGE_SHIFT: u64 = 12;

/// Size of one backing page in bytes.
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

/// Mask selecting the offset inside a page.
const PAGE_OFFSET_MASK: u64 = (PAGE_SIZE as u64) - 1;

/// Sparse little-endian memory covering the full `XLEN` address space.
#[derive(Clone, Debug)]
pub struct Memory {
    pages: FxHashMap<u64, Box<[u8; PAGE_SIZE]>>,
    xlen: Xlen,
    aligned: bool,
}

impl Memory {
    /// Creates an empty memory.
    ///
    /// # Arguments
    ///
    /// * `xlen` - Address width; every address is truncated to it.
    /// * `aligned_addresses` - When `true`, misaligned multi-byte accesses fail.
    pub fn new(xlen: Xlen, aligned_addresses: bool) -> Self {
        Self {
            pages: FxHashMap::default(),
            xlen,
            aligned: aligned_addresses,
        }
    }

    /// Returns the address width.
    pub fn xlen(&self) -> Xlen {
        self.xlen
    }

    /// Returns whether alignment enforcement is enabled.
    pub fn aligned_addresses(&self) -> bool {
        self.aligned
    }

    /// Enables or disables alignment enforcement.
    pub fn set_aligned_addresses(&mut self, aligned: bool) {
        self.aligned = aligned;
    }

    /// Number of pages that have been written to.
    pub fn mapped_pages(&self) -> usize {
        self.pages.len()
    }

    /// Drops every page, returning all addresses to zero.
    pub fn clear(&mut self) {
        self.pages.clear();
    }

    /// Reads one byte. Never fails.
    #[inline]
    pub fn load_byte(&self, addr: u64) -> u8 {
        let addr = self.xlen.mask(addr);
        self.pages
            .get(&(addr >> PAGE_SHIFT))
            .map_or(0, |page| page[(addr & PAGE_OFFSET_MASK) as usize])
    }

    /// Writes one byte. Never fails.
    #[inline]
    pub fn store_byte(&mut self, addr: u64, val: u8) {
        let addr = self.xlen.mask(addr);
        let page = self
            .pages
            .entry(addr >> PAGE_SHIFT)
            .or_insert_with(|| Box::new([0; PAGE_SIZE]));
        page[(addr & PAGE_OFFSET_MASK) as usize] = val;
    }

    /// Resets one byte to zero without touching its neighbours.
    ///
    /// Pages that were never written stay unmapped.
    pub fn remove_byte(&mut self, addr: u64) {
        let addr = self.xlen.mask(addr);
        if let Some(page) = self.pages.get_mut(&(addr >> PAGE_SHIFT)) {
            page[(addr & PAGE_OFFSET_MASK) as usize] = 0;
        }
    }

    /// Reads a little-endian half-word.
    pub fn load_half_word(&self, addr: u64) -> Result<u16, MemoryError> {
        self.load(addr, 2).map(|v| v as u16)
    }

    /// Writes a little-endian half-word.
    pub fn store_half_word(&mut self, addr: u64, val: u16) -> Result<(), MemoryError> {
        self.store(addr, 2, u64::from(val))
    }

    /// Reads a little-endian word.
    pub fn load_word(&self, addr: u64) -> Result<u32, MemoryError> {
        self.load(addr, 4).map(|v| v as u32)
    }

    /// Writes a little-endian word.
    pub fn store_word(&mut self, addr: u64, val: u32) -> Result<(), MemoryError> {
        self.store(addr, 4, u64::from(val))
    }

    /// Reads a little-endian doubleword.
    ///
    /// Available on both widths; the RV32 engine never issues it, but the allocator
    /// and test harnesses may.
    pub fn load_long(&self, addr: u64) -> Result<u64, MemoryError> {
        self.load(addr, 8)
    }

    /// Writes a little-endian doubleword.
    pub fn store_long(&mut self, addr: u64, val: u64) -> Result<(), MemoryError> {
        self.store(addr, 8, val)
    }

    /// Reads an `XLEN`-wide word (4 bytes on RV32, 8 on RV64).
    pub fn load_xword(&self, addr: u64) -> Result<u64, MemoryError> {
        self.load(addr, self.xlen.bytes())
    }

    /// Writes an `XLEN`-wide word; `val` is truncated to the width.
    pub fn store_xword(&mut self, addr: u64, val: u64) -> Result<(), MemoryError> {
        self.store(addr, self.xlen.bytes(), val)
    }

    /// Generic little-endian load of `size` bytes (1, 2, 4 or 8).
    ///
    /// # Arguments
    ///
    /// * `addr` - Byte address of the first (least significant) byte.
    /// * `size` - Access width in bytes.
    ///
    /// # Returns
    ///
    /// The zero-extended value, or `MemoryError::Misaligned` when alignment is
    /// enforced and `addr` is not a multiple of `size`.
    pub fn load(&self, addr: u64, size: u64) -> Result<u64, MemoryError> {
        let addr = self.xlen.mask(addr);
        self.check_alignment(addr, size)?;

        let offset = (addr & PAGE_OFFSET_MASK) as usize;
        if offset + size as usize <= PAGE_SIZE {
            let Some(page) = self.pages.get(&(addr >> PAGE_SHIFT)) else {
                return Ok(0);
            };
            let bytes = &page[offset..offset + size as usize];
            return Ok(bytes
                .iter()
                .rev()
                .fold(0, |acc, &b| (acc << 8) | u64::from(b)));
        }
        Ok(split_load(addr, size, self.xlen, |a| self.load_byte(a)))
    }

    /// Generic little-endian store of the low `size` bytes of `val`.
    ///
    /// The alignment check runs first; a rejected store writes nothing.
    pub fn store(&mut self, addr: u64, size: u64, val: u64) -> Result<(), MemoryError> {
        let addr = self.xlen.mask(addr);
        self.check_alignment(addr, size)?;
        let xlen = self.xlen;
        split_store(addr, size, val, xlen, |a, b| self.store_byte(a, b));
        Ok(())
    }

    /// Copies `len` bytes starting at `addr` into a vector.
    pub fn load_bytes(&self, addr: u64, len: u64) -> Vec<u8> {
        let mut out = vec![0; len as usize];
        self.read_into(addr, &mut out);
        out
    }

    /// Writes `bytes` starting at `addr`.
    pub fn store_bytes(&mut self, addr: u64, bytes: &[u8]) {
        self.write_from(addr, bytes);
    }

    /// Sets `len` bytes starting at `addr` to zero.
    ///
    /// Pages covered completely are dropped rather than filled.
    pub fn zero(&mut self, addr: u64, len: u64) {
        let mut addr = self.xlen.mask(addr);
        let mut left = len;
        while left > 0 {
            let offset = (addr & PAGE_OFFSET_MASK) as usize;
            let n = left.min((PAGE_SIZE - offset) as u64);
            let key = addr >> PAGE_SHIFT;
            if n == PAGE_SIZE as u64 {
                let _ = self.pages.remove(&key);
            } else if let Some(page) = self.pages.get_mut(&key) {
                page[offset..offset + n as usize].fill(0);
            }
            addr = self.xlen.mask(addr.wrapping_add(n));
            left -= n;
        }
    }

    /// Copies `len` bytes from `src` to `dst`; the ranges may overlap.
    ///
    /// Works in page-sized chunks, walking backwards when `dst` lies inside the source.
    pub fn copy(&mut self, dst: u64, src: u64, len: u64) {
        let mut buf = [0u8; PAGE_SIZE];
        let backward = dst > src && dst - src < len;
        let mut done = 0;
        while done < len {
            let n = (len - done).min(PAGE_SIZE as u64);
            let off = if backward { len - done - n } else { done };
            let chunk = &mut buf[..n as usize];
            self.read_into(src.wrapping_add(off), chunk);
            self.write_from(dst.wrapping_add(off), chunk);
            done += n;
        }
    }

    /// Fills `buf` from memory starting at `addr`, one page slice at a time.
    fn read_into(&self, addr: u64, buf: &mut [u8]) {
        let mut addr = self.xlen.mask(addr);
        let mut done = 0;
        while done < buf.len() {
            let offset = (addr & PAGE_OFFSET_MASK) as usize;
            let n = (PAGE_SIZE - offset).min(buf.len() - done);
            let dst = &mut buf[done..done + n];
            match self.pages.get(&(addr >> PAGE_SHIFT)) {
                Some(page) => dst.copy_from_slice(&page[offset..offset + n]),
                None => dst.fill(0),
            }
            done += n;
            addr = self.xlen.mask(addr.wrapping_add(n as u64));
        }
    }

    /// Writes `bytes` starting at `addr`, one page slice at a time.
    ///
    /// All-zero slices aimed at unmapped pages are skipped.
    fn write_from(&mut self, addr: u64, bytes: &[u8]) {
        let mut addr = self.xlen.mask(addr);
        let mut done = 0;
        while done < bytes.len() {
            let offset = (addr & PAGE_OFFSET_MASK) as usize;
            let n = (PAGE_SIZE - offset).min(bytes.len() - done);
            let src = &bytes[done..done + n];
            let key = addr >> PAGE_SHIFT;
            if let Some(page) = self.pages.get_mut(&key) {
                page[offset..offset + n].copy_from_slice(src);
            } else if src.iter().any(|&b| b != 0) {
                let page = self.pages.entry(key).or_insert_with(|| Box::new([0; PAGE_SIZE]));
                page[offset..offset + n].copy_from_slice(src);
            }
            done += n;
            addr = self.xlen.mask(addr.wrapping_add(n as u64));
        }
    }

    fn check_alignment(&self, addr: u64, size: u64) -> Result<(), MemoryError> {
        if self.aligned && !is_aligned(addr, size) {
            return Err(MemoryError::Misaligned { addr, width: size });
        }
        Ok(())
    }
}
