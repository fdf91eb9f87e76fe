//! Free-List Heap Allocator.
//!
//! This module implements the allocator behind the allocator environment call. It provides:
//! 1. **First-Fit Allocation:** Scans blocks in address order and takes the first free
//!    block that is large enough, splitting off the unused suffix.
//! 2. **Heap Extension:** Carves new blocks at the high-water mark when nothing fits.
//! 3. **Coalescing:** Merges a freed block with physically adjacent free neighbours.
//! 4. **Reallocation:** Resizes in place when possible, otherwise moves the payload.
//!
//! All metadata lives in simulated memory (see [`block`]); the allocator itself only
//! holds addresses. Running out of space is reported by returning [`NULL`], never as an
//! error. Errors are reserved for contract violations and corrupted metadata.

/// Block header layout and introspection records.
pub mod block;

use tracing::{debug, warn};

use crate::common::constants::NULL;
use crate::common::{HeapError, Xlen, align_up};
use crate::memory::Memory;
pub use block::{BlockHeader, BlockInfo};

/// Heap allocator state.
///
/// Owned by one simulator; two simulators never share a heap.
#[derive(Clone, Debug)]
pub struct Heap {
    xlen: Xlen,
    base: u64,
    limit: u64,
    brk: u64,
    head: u64,
    tail: u64,
    active: u64,
    always_calloc: bool,
}

impl Heap {
    /// Creates an empty heap spanning `[base, limit)`.
    ///
    /// # Arguments
    ///
    /// * `xlen` - Word width; sets the header size and size alignment.
    /// * `base` - First address the heap may use; must be non-zero and word aligned.
    /// * `limit` - Exclusive upper bound for the high-water mark.
    /// * `always_calloc` - Zero-fill every allocation.
    pub fn new(xlen: Xlen, base: u64, limit: u64, always_calloc: bool) -> Self {
        Self {
            xlen,
            base,
            limit,
            brk: base,
            head: NULL,
            tail: NULL,
            active: 0,
            always_calloc,
        }
    }

    /// Returns the heap to its freshly constructed state.
    ///
    /// Memory is not touched; callers clear it separately.
    pub fn reset(&mut self) {
        self.brk = self.base;
        self.head = NULL;
        self.tail = NULL;
        self.active = 0;
    }

    /// First heap address.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Exclusive upper bound of the heap window.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Current high-water mark.
    pub fn brk(&self) -> u64 {
        self.brk
    }

    /// Bytes occupied by one block header.
    pub fn header_size(&self) -> u64 {
        BlockHeader::header_size(self.xlen)
    }

    /// Whether every allocation is zero-filled.
    pub fn always_calloc(&self) -> bool {
        self.always_calloc
    }

    /// Enables or disables zero-filling of every allocation.
    pub fn set_always_calloc(&mut self, on: bool) {
        self.always_calloc = on;
    }

    /// Number of live allocations.
    pub fn num_active_blocks(&self) -> u64 {
        self.active
    }

    /// Allocates `size` bytes.
    ///
    /// # Returns
    ///
    /// The payload address, or [`NULL`] when `size` is zero or no space is left.
    pub fn malloc(&mut self, mem: &mut Memory, size: u64) -> Result<u64, HeapError> {
        let zero = self.always_calloc;
        self.allocate(mem, size, zero)
    }

    /// Allocates `size` zero-filled bytes.
    pub fn calloc(&mut self, mem: &mut Memory, size: u64) -> Result<u64, HeapError> {
        self.allocate(mem, size, true)
    }

    /// Releases the allocation whose payload starts at `ptr`.
    ///
    /// Freeing [`NULL`] does nothing. Any other address that is not the payload of a
    /// live allocation (including a second free of the same pointer) is rejected with
    /// `HeapError::InvalidPointer` and leaves every block untouched.
    pub fn free(&mut self, mem: &mut Memory, ptr: u64) -> Result<(), HeapError> {
        if ptr == NULL {
            return Ok(());
        }
        let mut block = self.find_allocated(mem, ptr)?;
        block.free = true;
        block.write(mem)?;
        self.active -= 1;
        debug!(ptr = %format!("{ptr:#x}"), size = block.size, "heap free");

        let block = self.coalesce_next(mem, block)?;
        let _ = self.coalesce_prev(mem, block)?;
        Ok(())
    }

    /// Resizes the allocation at `ptr` to `size` bytes.
    ///
    /// * `ptr == NULL` behaves as `malloc(size)`.
    /// * `size == 0` is unsatisfiable: the result is [`NULL`] and `ptr` stays live.
    /// * Shrinking, absorbing an adjacent free block, or growing a block that ends at
    ///   the high-water mark keep the address.
    /// * Otherwise the payload moves; the old block is freed after the copy.
    ///
    /// When the request cannot be satisfied the result is [`NULL`] and the original
    /// allocation is left exactly as it was.
    pub fn realloc(&mut self, mem: &mut Memory, ptr: u64, size: u64) -> Result<u64, HeapError> {
        if ptr == NULL {
            return self.malloc(mem, size);
        }
        let mut block = self.find_allocated(mem, ptr)?;
        if size == 0 {
            debug!(ptr = %format!("{ptr:#x}"), "heap realloc: zero size, block kept");
            return Ok(NULL);
        }
        let Some(need) = self.round_size(size) else {
            debug!(ptr = %format!("{ptr:#x}"), size, "heap realloc: request too large");
            return Ok(NULL);
        };
        let old_size = block.size;

        if need <= block.size {
            self.split(mem, &mut block, need)?;
            debug!(ptr = %format!("{ptr:#x}"), size = need, "heap realloc: shrunk in place");
            return Ok(ptr);
        }

        if block.next != NULL && block.next == block.end(self.xlen) {
            let next = self.read(mem, block.next)?;
            let combined = block.size + self.header_size() + next.size;
            if next.free && combined >= need {
                self.unlink(mem, &next)?;
                block.size = combined;
                block.next = next.next;
                self.split(mem, &mut block, need)?;
                self.zero_grown(mem, ptr, old_size, need);
                debug!(ptr = %format!("{ptr:#x}"), size = need, "heap realloc: absorbed next block");
                return Ok(ptr);
            }
        }

        if block.addr == self.tail && block.end(self.xlen) == self.brk {
            if let Some(end) = ptr.checked_add(need).filter(|&end| end <= self.limit) {
                self.brk = end;
                block.size = need;
                block.write(mem)?;
                self.zero_grown(mem, ptr, old_size, need);
                debug!(ptr = %format!("{ptr:#x}"), size = need, "heap realloc: grew tail block");
                return Ok(ptr);
            }
        }

        let zero = self.always_calloc;
        let new_ptr = self.allocate(mem, need, zero)?;
        if new_ptr == NULL {
            debug!(ptr = %format!("{ptr:#x}"), size, "heap realloc: out of space");
            return Ok(NULL);
        }
        mem.copy(new_ptr, ptr, old_size.min(need));
        self.free(mem, ptr)?;
        debug!(
            from = %format!("{ptr:#x}"),
            to = %format!("{new_ptr:#x}"),
            size = need,
            "heap realloc: moved"
        );
        Ok(new_ptr)
    }

    /// Grows the high-water mark by `incr` bytes without creating a block.
    ///
    /// # Returns
    ///
    /// The previous high-water mark, or all-ones (`-1` as an `XLEN` value) when `incr`
    /// is negative or the heap window is exhausted.
    pub fn sbrk(&mut self, incr: i64) -> u64 {
        let failed = self.xlen.mask(u64::MAX);
        let Ok(incr) = u64::try_from(incr) else {
            return failed;
        };
        match self.brk.checked_add(incr).filter(|&end| end <= self.limit) {
            Some(end) => {
                let old = self.brk;
                self.brk = end;
                old
            }
            None => failed,
        }
    }

    /// Walks the block list in address order.
    ///
    /// # Returns
    ///
    /// One entry per block, or `HeapError::Corrupted` if a header links outside the
    /// heap window or the list does not terminate.
    pub fn blocks(&self, mem: &Memory) -> Result<Vec<BlockInfo>, HeapError> {
        let mut out = Vec::new();
        let mut addr = self.head;
        while addr != NULL {
            let block = self.read(mem, addr)?;
            out.push(block.info(self.xlen));
            if out.len() as u64 > self.max_blocks() {
                return Err(HeapError::Corrupted { addr });
            }
            addr = block.next;
        }
        Ok(out)
    }

    fn allocate(&mut self, mem: &mut Memory, size: u64, zero: bool) -> Result<u64, HeapError> {
        if size == 0 {
            return Ok(NULL);
        }
        let Some(need) = self.round_size(size) else {
            debug!(size, "heap allocate: request too large");
            return Ok(NULL);
        };

        let mut addr = self.head;
        let mut visited = 0;
        while addr != NULL {
            let mut block = self.read(mem, addr)?;
            if block.free && block.size >= need {
                block.free = false;
                self.split(mem, &mut block, need)?;
                return Ok(self.hand_out(mem, &block, zero));
            }
            visited += 1;
            if visited > self.max_blocks() {
                return Err(HeapError::Corrupted { addr });
            }
            addr = block.next;
        }

        match self.extend(mem, need)? {
            Some(block) => Ok(self.hand_out(mem, &block, zero)),
            None => {
                debug!(size, brk = %format!("{:#x}", self.brk), "heap allocate: out of space");
                Ok(NULL)
            }
        }
    }

    /// Creates a new allocated block at the high-water mark.
    ///
    /// A free tail block that ends at the mark is grown instead, so the list never
    /// holds a free block directly followed by fresh space.
    fn extend(&mut self, mem: &mut Memory, need: u64) -> Result<Option<BlockHeader>, HeapError> {
        let w = self.xlen.bytes();
        if self.tail != NULL {
            let mut tail = self.read(mem, self.tail)?;
            if tail.free && tail.end(self.xlen) == self.brk {
                let Some(end) = tail.payload(self.xlen).checked_add(need) else {
                    return Ok(None);
                };
                if end > self.limit {
                    return Ok(None);
                }
                self.brk = end;
                tail.size = need;
                tail.free = false;
                tail.write(mem)?;
                return Ok(Some(tail));
            }
        }

        let Some(start) = align_up(self.brk, w) else {
            return Ok(None);
        };
        let Some(end) = start
            .checked_add(self.header_size())
            .and_then(|payload| payload.checked_add(need))
        else {
            return Ok(None);
        };
        if end > self.limit {
            return Ok(None);
        }

        let block = BlockHeader {
            addr: start,
            size: need,
            free: false,
            next: NULL,
            prev: self.tail,
        };
        block.write(mem)?;
        if self.tail == NULL {
            self.head = start;
        } else {
            BlockHeader::write_next(mem, self.tail, start)?;
        }
        self.tail = start;
        self.brk = end;
        Ok(Some(block))
    }

    /// Marks `block` live, zero-fills it if asked, and returns its payload.
    fn hand_out(&mut self, mem: &mut Memory, block: &BlockHeader, zero: bool) -> u64 {
        let payload = block.payload(self.xlen);
        if zero {
            mem.zero(payload, block.size);
        }
        self.active += 1;
        debug!(
            ptr = %format!("{payload:#x}"),
            size = block.size,
            active = self.active,
            "heap allocate"
        );
        payload
    }

    /// Shrinks `block` to `need` bytes, turning the excess into a free block when it
    /// can hold more than a header. Writes `block` back in every case.
    fn split(&mut self, mem: &mut Memory, block: &mut BlockHeader, need: u64) -> Result<(), HeapError> {
        let h = self.header_size();
        if block.size - need <= h {
            block.write(mem)?;
            return Ok(());
        }
        let rest = BlockHeader {
            addr: block.payload(self.xlen) + need,
            size: block.size - need - h,
            free: true,
            next: block.next,
            prev: block.addr,
        };
        block.size = need;
        block.next = rest.addr;
        rest.write(mem)?;
        block.write(mem)?;
        if rest.next == NULL {
            self.tail = rest.addr;
        } else {
            BlockHeader::write_prev(mem, rest.next, rest.addr)?;
        }
        debug!(
            at = %format!("{:#x}", rest.addr),
            size = rest.size,
            "heap split"
        );
        let _ = self.coalesce_next(mem, rest)?;
        Ok(())
    }

    /// Merges `block` with the following block when that block is free and adjacent.
    fn coalesce_next(&mut self, mem: &mut Memory, mut block: BlockHeader) -> Result<BlockHeader, HeapError> {
        if !block.free || block.next == NULL || block.next != block.end(self.xlen) {
            return Ok(block);
        }
        let next = self.read(mem, block.next)?;
        if !next.free {
            return Ok(block);
        }
        self.unlink(mem, &next)?;
        block.size += self.header_size() + next.size;
        block.next = next.next;
        block.write(mem)?;
        debug!(at = %format!("{:#x}", block.addr), size = block.size, "heap coalesce");
        Ok(block)
    }

    /// Merges `block` into the preceding block when that block is free and adjacent.
    fn coalesce_prev(&mut self, mem: &mut Memory, block: BlockHeader) -> Result<BlockHeader, HeapError> {
        if block.prev == NULL {
            return Ok(block);
        }
        let prev = self.read(mem, block.prev)?;
        if !prev.free || prev.end(self.xlen) != block.addr {
            return Ok(block);
        }
        self.coalesce_next(mem, prev)
    }

    /// Removes `block` from the list by linking its neighbours to each other.
    fn unlink(&mut self, mem: &mut Memory, block: &BlockHeader) -> Result<(), HeapError> {
        if block.prev == NULL {
            self.head = block.next;
        } else {
            BlockHeader::write_next(mem, block.prev, block.next)?;
        }
        if block.next == NULL {
            self.tail = block.prev;
        } else {
            BlockHeader::write_prev(mem, block.next, block.prev)?;
        }
        Ok(())
    }

    /// Finds the live block whose payload starts at `ptr`.
    fn find_allocated(&self, mem: &Memory, ptr: u64) -> Result<BlockHeader, HeapError> {
        let h = self.header_size();
        let in_window = self.base.checked_add(h).is_some_and(|lo| ptr >= lo) && ptr < self.brk;
        if in_window {
            let mut addr = self.head;
            let mut visited = 0;
            while addr != NULL && addr.checked_add(h).is_some_and(|payload| payload <= ptr) {
                let block = self.read(mem, addr)?;
                if block.payload(self.xlen) == ptr {
                    if block.free {
                        break;
                    }
                    return Ok(block);
                }
                visited += 1;
                if visited > self.max_blocks() {
                    return Err(HeapError::Corrupted { addr });
                }
                addr = block.next;
            }
        }
        warn!(ptr = %format!("{ptr:#x}"), "heap: pointer is not a live allocation");
        Err(HeapError::InvalidPointer { addr: ptr })
    }

    /// Reads and validates the header at `addr`.
    fn read(&self, mem: &Memory, addr: u64) -> Result<BlockHeader, HeapError> {
        if !self.in_heap(addr) {
            return Err(HeapError::Corrupted { addr });
        }
        let block = BlockHeader::read(mem, addr)?;
        let links_ok = [block.next, block.prev]
            .iter()
            .all(|&link| link == NULL || self.in_heap(link));
        let fits = addr
            .checked_add(self.header_size())
            .and_then(|payload| payload.checked_add(block.size))
            .is_some_and(|end| end <= self.brk);
        if !links_ok || !fits {
            warn!(at = %format!("{addr:#x}"), "heap: corrupted block header");
            return Err(HeapError::Corrupted { addr });
        }
        Ok(block)
    }

    fn in_heap(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.brk
    }

    /// Upper bound on the number of blocks the current window can hold.
    fn max_blocks(&self) -> u64 {
        (self.brk - self.base) / self.header_size() + 1
    }

    /// Rounds a request up to the word size, rejecting sizes the window cannot hold.
    fn round_size(&self, size: u64) -> Option<u64> {
        align_up(size, self.xlen.bytes()).filter(|&need| need <= self.limit - self.base)
    }

    fn zero_grown(&self, mem: &mut Memory, ptr: u64, old_size: u64, new_size: u64) {
        if self.always_calloc && new_size > old_size {
            mem.zero(ptr + old_size, new_size - old_size);
        }
    }
}
