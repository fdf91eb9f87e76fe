//! Heap allocator tests.
//!
//! Drives `Heap` directly against a `Memory`, checking addresses, block layout via
//! `blocks()`, and the error contract for bad pointers and damaged metadata.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvexec_core::Heap;
use rvexec_core::common::constants::NULL;
use rvexec_core::common::{HeapError, Xlen};
use rvexec_core::heap::BlockInfo;
use rvexec_core::memory::Memory;

const BASE: u64 = 0x1000_8000;
const LIMIT: u64 = 0x4000_0000;

struct Fixture {
    mem: Memory,
    heap: Heap,
}

impl Fixture {
    fn new(xlen: Xlen) -> Self {
        Self {
            mem: Memory::new(xlen, true),
            heap: Heap::new(xlen, BASE, LIMIT, false),
        }
    }

    fn rv32() -> Self {
        Self::new(Xlen::Rv32)
    }

    fn bounded(limit: u64) -> Self {
        Self {
            mem: Memory::new(Xlen::Rv32, true),
            heap: Heap::new(Xlen::Rv32, BASE, limit, false),
        }
    }

    fn malloc(&mut self, size: u64) -> u64 {
        self.heap.malloc(&mut self.mem, size).unwrap()
    }

    fn calloc(&mut self, size: u64) -> u64 {
        self.heap.calloc(&mut self.mem, size).unwrap()
    }

    fn free(&mut self, ptr: u64) {
        self.heap.free(&mut self.mem, ptr).unwrap();
    }

    fn realloc(&mut self, ptr: u64, size: u64) -> u64 {
        self.heap.realloc(&mut self.mem, ptr, size).unwrap()
    }

    fn blocks(&self) -> Vec<BlockInfo> {
        self.heap.blocks(&self.mem).unwrap()
    }

    fn layout(&self) -> Vec<(u64, bool)> {
        self.blocks().iter().map(|b| (b.size, b.free)).collect()
    }

    fn h(&self) -> u64 {
        self.heap.header_size()
    }
}

#[test]
fn header_is_four_words() {
    assert_eq!(Fixture::new(Xlen::Rv32).h(), 16);
    assert_eq!(Fixture::new(Xlen::Rv64).h(), 32);
}

#[test]
fn first_allocation_sits_after_one_header() {
    let mut f = Fixture::rv32();
    let p = f.malloc(10);
    assert_eq!(p, BASE + 16);
    assert_eq!(f.heap.num_active_blocks(), 1);
    assert_eq!(f.layout(), vec![(12, false)]);
    assert_eq!(f.heap.brk(), BASE + 16 + 12);
}

#[test]
fn zero_size_returns_null() {
    let mut f = Fixture::rv32();
    assert_eq!(f.malloc(0), NULL);
    assert_eq!(f.calloc(0), NULL);
    assert_eq!(f.heap.num_active_blocks(), 0);
    assert!(f.blocks().is_empty());
}

#[rstest]
#[case(Xlen::Rv32, 1, 4)]
#[case(Xlen::Rv32, 5, 8)]
#[case(Xlen::Rv32, 8, 8)]
#[case(Xlen::Rv64, 1, 8)]
#[case(Xlen::Rv64, 9, 16)]
fn sizes_round_up_to_the_word(#[case] xlen: Xlen, #[case] request: u64, #[case] rounded: u64) {
    let mut f = Fixture::new(xlen);
    let _ = f.malloc(request);
    assert_eq!(f.blocks()[0].size, rounded);
}

#[test]
fn payloads_are_word_aligned() {
    let mut f = Fixture::new(Xlen::Rv64);
    for size in [1, 3, 7, 13, 24, 5] {
        let p = f.malloc(size);
        assert_eq!(p % 8, 0, "payload {p:#x} for size {size}");
    }
}

#[test]
fn malloc_free_tracks_active_count() {
    let mut f = Fixture::rv32();
    let a = f.malloc(16);
    let b = f.malloc(32);
    let c = f.malloc(8);
    assert_eq!(f.heap.num_active_blocks(), 3);
    f.free(b);
    assert_eq!(f.heap.num_active_blocks(), 2);
    f.free(a);
    f.free(c);
    assert_eq!(f.heap.num_active_blocks(), 0);
}

#[test]
fn free_null_is_a_no_op() {
    let mut f = Fixture::rv32();
    let _ = f.malloc(8);
    f.free(NULL);
    assert_eq!(f.heap.num_active_blocks(), 1);
}

#[test]
fn first_fit_reuses_freed_block() {
    let mut f = Fixture::rv32();
    let p = f.malloc(100);
    let q = f.malloc(100);
    f.free(p);
    let r = f.malloc(40);
    assert_eq!(r, p);
    assert!(r < q);
}

#[test]
fn big_block_is_split_for_small_requests() {
    let mut f = Fixture::rv32();
    let p = f.malloc(100);
    f.free(p);
    let q = f.malloc(8);
    let s = f.malloc(8);
    assert_eq!(q, p);
    assert_eq!(s, q + 8 + f.h());
    assert_eq!(f.layout(), vec![(8, false), (8, false), (100 - 16 - 2 * 16, true)]);
}

#[test]
fn remainder_no_larger_than_a_header_is_not_split() {
    let mut f = Fixture::rv32();
    let p = f.malloc(32);
    let _guard = f.malloc(4);
    f.free(p);
    // 32 - 16 leaves exactly one header's worth; the whole block is handed out.
    let q = f.malloc(16);
    assert_eq!(q, p);
    assert_eq!(f.layout(), vec![(32, false), (4, false)]);
}

#[test]
fn split_then_free_coalesces_back() {
    let mut f = Fixture::rv32();
    let p = f.malloc(100);
    let _guard = f.malloc(4);
    f.free(p);
    let q = f.malloc(40);
    assert_eq!(f.layout(), vec![(40, false), (44, true), (4, false)]);
    f.free(q);
    assert_eq!(f.layout(), vec![(100, true), (4, false)]);
}

#[test]
fn freeing_the_middle_merges_three_blocks() {
    let mut f = Fixture::rv32();
    let a = f.malloc(16);
    let b = f.malloc(16);
    let c = f.malloc(16);
    let _guard = f.malloc(16);
    f.free(a);
    f.free(c);
    assert_eq!(
        f.layout(),
        vec![(16, true), (16, false), (16, true), (16, false)]
    );
    f.free(b);
    assert_eq!(f.layout(), vec![(16 * 3 + 2 * 16, true), (16, false)]);
}

#[test]
fn no_two_adjacent_blocks_are_both_free() {
    let mut f = Fixture::rv32();
    let ptrs: Vec<u64> = (1..=8).map(|i| f.malloc(i * 4)).collect();
    for &p in ptrs.iter().step_by(2) {
        f.free(p);
    }
    for &p in ptrs.iter().skip(1).step_by(2) {
        f.free(p);
    }
    let blocks = f.blocks();
    for pair in blocks.windows(2) {
        assert!(!(pair[0].free && pair[1].free), "{blocks:?}");
    }
    assert_eq!(blocks.len(), 1);
}

#[test]
fn blocks_are_contiguous() {
    let mut f = Fixture::rv32();
    for size in [4, 12, 40, 8] {
        let _ = f.malloc(size);
    }
    let blocks = f.blocks();
    assert_eq!(blocks[0].header, BASE);
    for pair in blocks.windows(2) {
        assert_eq!(pair[0].payload + pair[0].size, pair[1].header);
        assert_eq!(pair[0].payload, pair[0].header + 16);
    }
    let last = blocks.last().unwrap();
    assert_eq!(last.payload + last.size, f.heap.brk());
}

#[test]
fn free_tail_block_grows_instead_of_new_block() {
    let mut f = Fixture::rv32();
    let a = f.malloc(8);
    let b = f.malloc(8);
    f.free(b);
    let c = f.malloc(64);
    assert_eq!(c, b);
    assert_eq!(f.layout(), vec![(8, false), (64, false)]);
    assert_eq!(f.heap.brk(), c + 64);
    f.free(a);
}

#[test]
fn calloc_zero_fills_reused_memory() {
    let mut f = Fixture::rv32();
    let p = f.malloc(16);
    f.mem.store_word(p, 0xFFFF_FFFF).unwrap();
    f.mem.store_word(p + 12, 0xFFFF_FFFF).unwrap();
    f.free(p);
    let q = f.calloc(16);
    assert_eq!(q, p);
    assert_eq!(f.mem.load_bytes(q, 16), vec![0; 16]);
}

#[test]
fn malloc_does_not_clear_by_default() {
    let mut f = Fixture::rv32();
    let p = f.malloc(8);
    f.mem.store_word(p, 0xDEAD_BEEF).unwrap();
    f.free(p);
    let q = f.malloc(8);
    assert_eq!(f.mem.load_word(q), Ok(0xDEAD_BEEF));
}

#[test]
fn always_calloc_zero_fills_malloc() {
    let mut f = Fixture::rv32();
    f.heap.set_always_calloc(true);
    assert!(f.heap.always_calloc());
    let p = f.malloc(8);
    f.mem.store_word(p, 0xDEAD_BEEF).unwrap();
    f.free(p);
    let q = f.malloc(8);
    assert_eq!(f.mem.load_word(q), Ok(0));
}

#[test]
fn exhausted_heap_returns_null() {
    let mut f = Fixture::bounded(BASE + 64);
    assert_eq!(f.malloc(100), NULL);
    let p = f.malloc(48);
    assert_eq!(p, BASE + 16);
    assert_eq!(f.heap.brk(), BASE + 64);
    assert_eq!(f.malloc(4), NULL);
    assert_eq!(f.heap.num_active_blocks(), 1);
}

#[test]
fn huge_requests_return_null() {
    let mut f = Fixture::rv32();
    assert_eq!(f.malloc(u64::MAX), NULL);
    assert_eq!(f.malloc(0xFFFF_FFFF), NULL);
    assert_eq!(f.heap.num_active_blocks(), 0);
    assert_eq!(f.heap.brk(), BASE);
}

#[test]
fn invalid_pointer_is_rejected() {
    let mut f = Fixture::rv32();
    let p = f.malloc(16);
    for bad in [p + 4, p - 16, BASE, 0x1234, f.heap.brk() + 16] {
        assert_eq!(
            f.heap.free(&mut f.mem, bad),
            Err(HeapError::InvalidPointer { addr: bad })
        );
    }
    assert_eq!(f.heap.num_active_blocks(), 1);
}

#[test]
fn double_free_is_rejected() {
    let mut f = Fixture::rv32();
    let p = f.malloc(16);
    let _guard = f.malloc(16);
    f.free(p);
    assert_eq!(
        f.heap.free(&mut f.mem, p),
        Err(HeapError::InvalidPointer { addr: p })
    );
    assert_eq!(f.heap.num_active_blocks(), 1);
}

#[test]
fn realloc_null_acts_as_malloc() {
    let mut f = Fixture::rv32();
    let p = f.realloc(NULL, 12);
    assert_eq!(p, BASE + 16);
    assert_eq!(f.heap.num_active_blocks(), 1);
}

#[test]
fn realloc_to_zero_keeps_the_block() {
    let mut f = Fixture::rv32();
    let p = f.malloc(16);
    f.mem.store_word(p, 0xDEAD_BEEF).unwrap();
    f.mem.store_word(p + 12, 0x0BAD_F00D).unwrap();
    let before = f.layout();

    assert_eq!(f.realloc(p, 0), NULL);
    assert_eq!(f.heap.num_active_blocks(), 1);
    assert_eq!(f.layout(), before);
    assert_eq!(f.mem.load_word(p), Ok(0xDEAD_BEEF));
    assert_eq!(f.mem.load_word(p + 12), Ok(0x0BAD_F00D));

    f.free(p);
    assert_eq!(f.heap.num_active_blocks(), 0);
}

#[test]
fn realloc_shrinks_in_place() {
    let mut f = Fixture::rv32();
    let p = f.malloc(64);
    let _guard = f.malloc(4);
    assert_eq!(f.realloc(p, 8), p);
    assert_eq!(f.layout(), vec![(8, false), (40, true), (4, false)]);
}

#[test]
fn realloc_absorbs_free_neighbour() {
    let mut f = Fixture::rv32();
    let a = f.malloc(16);
    let b = f.malloc(16);
    let _c = f.malloc(16);
    f.mem.store_word(a, 0x1111_2222).unwrap();
    f.free(b);
    assert_eq!(f.realloc(a, 24), a);
    assert_eq!(f.layout(), vec![(24, false), (8, true), (16, false)]);
    assert_eq!(f.mem.load_word(a), Ok(0x1111_2222));
}

#[test]
fn realloc_grows_tail_block_at_brk() {
    let mut f = Fixture::rv32();
    let a = f.malloc(16);
    assert_eq!(f.realloc(a, 64), a);
    assert_eq!(f.heap.brk(), a + 64);
    assert_eq!(f.layout(), vec![(64, false)]);
}

#[test]
fn realloc_moves_and_preserves_contents() {
    let mut f = Fixture::rv32();
    let a = f.malloc(16);
    let b = f.malloc(16);
    for i in 0..4 {
        f.mem.store_word(a + i * 4, 0xA0 + i as u32).unwrap();
    }
    let moved = f.realloc(a, 64);
    assert_eq!(moved, b + 16 + 16);
    for i in 0..4 {
        assert_eq!(f.mem.load_word(moved + i * 4), Ok(0xA0 + i as u32));
    }
    assert_eq!(f.layout(), vec![(16, true), (16, false), (64, false)]);
    assert_eq!(f.heap.num_active_blocks(), 2);
}

#[test]
fn unsatisfiable_realloc_leaves_original_intact() {
    let mut f = Fixture::rv32();
    let a = f.malloc(16);
    f.mem.store_word(a, 0xCAFE_F00D).unwrap();
    let before = f.blocks();
    assert_eq!(f.realloc(a, 0xFFFF_FFFF), NULL);
    assert_eq!(f.blocks(), before);
    assert_eq!(f.mem.load_word(a), Ok(0xCAFE_F00D));
    assert_eq!(f.heap.num_active_blocks(), 1);
}

#[test]
fn realloc_out_of_window_returns_null() {
    let mut f = Fixture::bounded(BASE + 96);
    let a = f.malloc(16);
    let _b = f.malloc(16);
    assert_eq!(f.realloc(a, 48), NULL);
    assert_eq!(f.layout(), vec![(16, false), (16, false)]);
}

#[test]
fn realloc_of_freed_pointer_is_rejected() {
    let mut f = Fixture::rv32();
    let a = f.malloc(16);
    let _b = f.malloc(16);
    f.free(a);
    assert_eq!(
        f.heap.realloc(&mut f.mem, a, 32),
        Err(HeapError::InvalidPointer { addr: a })
    );
}

#[test]
fn sbrk_moves_the_mark() {
    let mut f = Fixture::rv32();
    assert_eq!(f.heap.sbrk(0), BASE);
    assert_eq!(f.heap.sbrk(3), BASE);
    assert_eq!(f.heap.brk(), BASE + 3);
    let p = f.malloc(4);
    assert_eq!(p, BASE + 4 + 16);
}

#[test]
fn sbrk_failure_is_all_ones() {
    let mut f = Fixture::rv32();
    assert_eq!(f.heap.sbrk(-4), 0xFFFF_FFFF);
    assert_eq!(f.heap.sbrk(i64::MAX), 0xFFFF_FFFF);
    assert_eq!(f.heap.brk(), BASE);

    let mut f = Fixture::new(Xlen::Rv64);
    assert_eq!(f.heap.sbrk(-4), u64::MAX);
}

#[test]
fn overwritten_link_is_reported_as_corruption() {
    let mut f = Fixture::rv32();
    let a = f.malloc(16);
    let _b = f.malloc(16);
    let header = a - 16;
    f.mem.store_word(header + 8, 0xDEAD_0000).unwrap();
    assert!(matches!(
        f.heap.blocks(&f.mem),
        Err(HeapError::Corrupted { .. })
    ));
    assert!(matches!(
        f.heap.malloc(&mut f.mem, 64),
        Err(HeapError::Corrupted { .. })
    ));
}

#[test]
fn garbage_state_word_is_reported_as_corruption() {
    let mut f = Fixture::rv32();
    let a = f.malloc(16);
    f.mem.store_word(a - 16 + 4, 7).unwrap();
    assert_eq!(
        f.heap.blocks(&f.mem),
        Err(HeapError::Corrupted { addr: a - 16 })
    );
}

#[test]
fn reset_forgets_every_block() {
    let mut f = Fixture::rv32();
    let _ = f.malloc(16);
    f.heap.reset();
    assert_eq!(f.heap.brk(), BASE);
    assert_eq!(f.heap.num_active_blocks(), 0);
    assert!(f.blocks().is_empty());
}

#[test]
fn rv64_headers_use_doublewords() {
    let mut f = Fixture::new(Xlen::Rv64);
    let a = f.malloc(8);
    let b = f.malloc(8);
    assert_eq!(a, BASE + 32);
    assert_eq!(b, a + 8 + 32);
    assert_eq!(f.mem.load_long(BASE + 16), Ok(b - 32));
    assert_eq!(f.mem.load_long(b - 32 + 24), Ok(BASE));
}

#[test]
fn window_at_the_top_of_the_address_space_does_not_overflow() {
    let top = u64::MAX - 15;
    let mut f = Fixture {
        mem: Memory::new(Xlen::Rv64, true),
        heap: Heap::new(Xlen::Rv64, top, u64::MAX, false),
    };
    assert_eq!(f.malloc(8), NULL);
    assert_eq!(
        f.heap.free(&mut f.mem, 0x100),
        Err(HeapError::InvalidPointer { addr: 0x100 })
    );
}
