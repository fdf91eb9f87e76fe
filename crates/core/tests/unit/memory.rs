//! Memory accessor tests.
//!
//! Little-endian composition, sub-width views, the alignment policy, byte removal
//! and page-boundary behaviour.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use rvexec_core::common::{MemoryError, Xlen};
use rvexec_core::memory::{Memory, PAGE_SIZE};

fn unaligned() -> Memory {
    Memory::new(Xlen::Rv64, false)
}

fn aligned() -> Memory {
    Memory::new(Xlen::Rv64, true)
}

#[test]
fn unmapped_memory_reads_zero() {
    let mem = unaligned();
    assert_eq!(mem.load_byte(0x1234), 0);
    assert_eq!(mem.load_word(0x8000_0000), Ok(0));
    assert_eq!(mem.load_long(0xFFFF_0000), Ok(0));
    assert_eq!(mem.mapped_pages(), 0);
}

#[test]
fn word_is_little_endian() {
    let mut mem = unaligned();
    mem.store_word(0x100, 0x1234_5678).unwrap();
    assert_eq!(mem.load_bytes(0x100, 4), vec![0x78, 0x56, 0x34, 0x12]);
    assert_eq!(mem.load_half_word(0x100), Ok(0x5678));
    assert_eq!(mem.load_half_word(0x102), Ok(0x1234));
    assert_eq!(mem.load_byte(0x103), 0x12);
}

#[test]
fn long_splits_into_words() {
    let mut mem = unaligned();
    mem.store_long(0x200, 0x0123_4567_89AB_CDEF).unwrap();
    assert_eq!(mem.load_word(0x200), Ok(0x89AB_CDEF));
    assert_eq!(mem.load_word(0x204), Ok(0x0123_4567));
    assert_eq!(mem.load_long(0x200), Ok(0x0123_4567_89AB_CDEF));
}

#[test]
fn byte_store_updates_one_lane() {
    let mut mem = unaligned();
    mem.store_word(0x40, 0xAABB_CCDD).unwrap();
    mem.store_byte(0x41, 0x11);
    assert_eq!(mem.load_word(0x40), Ok(0xAABB_11DD));
}

#[test]
fn loads_zero_extend() {
    let mut mem = unaligned();
    mem.store_byte(0x10, 0xFF);
    mem.store_half_word(0x12, 0x8000).unwrap();
    assert_eq!(u64::from(mem.load_byte(0x10)), 0xFF);
    assert_eq!(mem.load(0x12, 2), Ok(0x8000));
}

#[test]
fn remove_byte_zeroes_exactly_one_lane() {
    let mut mem = unaligned();
    mem.store_word(0x1000, 0xDEAD_BEEF).unwrap();
    mem.remove_byte(0x1001);
    assert_eq!(mem.load_word(0x1000), Ok(0xDEAD_00EF));
    assert_eq!(mem.load_byte(0x1000), 0xEF);
    assert_eq!(mem.load_byte(0x1002), 0xAD);
}

#[test]
fn remove_byte_on_unmapped_memory_is_harmless() {
    let mut mem = unaligned();
    mem.remove_byte(0x5000);
    assert_eq!(mem.load_byte(0x5000), 0);
    assert_eq!(mem.mapped_pages(), 0);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn misaligned_word_rejected_when_enforced(#[case] offset: u64) {
    let mut mem = aligned();
    let addr = 0x100 + offset;
    assert_eq!(
        mem.store_word(addr, 0xFFFF_FFFF),
        Err(MemoryError::Misaligned { addr, width: 4 })
    );
    assert_eq!(mem.load_word(addr), Err(MemoryError::Misaligned { addr, width: 4 }));
}

#[rstest]
#[case(2, 1)]
#[case(4, 2)]
#[case(8, 4)]
#[case(8, 6)]
fn misaligned_accesses_rejected_by_width(#[case] width: u64, #[case] offset: u64) {
    let mut mem = aligned();
    let addr = 0x2000 + offset;
    assert_eq!(
        mem.store(addr, width, 0),
        Err(MemoryError::Misaligned { addr, width })
    );
    assert_eq!(mem.load(addr, width), Err(MemoryError::Misaligned { addr, width }));
}

#[test]
fn rejected_store_writes_nothing() {
    let mut mem = aligned();
    mem.store_word(0x100, 0x1111_1111).unwrap();
    assert!(mem.store_word(0x101, 0xFFFF_FFFF).is_err());
    assert_eq!(mem.load_word(0x100), Ok(0x1111_1111));
    assert_eq!(mem.load_word(0x104), Ok(0));
}

#[test]
fn byte_accesses_never_fail_alignment() {
    let mut mem = aligned();
    for addr in 0x300..0x308 {
        mem.store_byte(addr, addr as u8);
    }
    assert_eq!(mem.load_long(0x300), Ok(0x0706_0504_0302_0100));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn misaligned_word_round_trips_when_not_enforced(#[case] offset: u64) {
    let mut mem = unaligned();
    let addr = 0x100 + offset;
    mem.store_word(addr, 0xCAFE_BABE).unwrap();
    assert_eq!(mem.load_word(addr), Ok(0xCAFE_BABE));
    assert_eq!(mem.load_byte(addr), 0xBE);
    assert_eq!(mem.load_byte(addr + 3), 0xCA);
}

#[test]
fn access_spanning_a_page_boundary() {
    let mut mem = unaligned();
    let addr = PAGE_SIZE as u64 - 3;
    mem.store_long(addr, 0x1122_3344_5566_7788).unwrap();
    assert_eq!(mem.load_long(addr), Ok(0x1122_3344_5566_7788));
    assert_eq!(mem.load_byte(PAGE_SIZE as u64), 0x55);
    assert_eq!(mem.mapped_pages(), 2);
}

#[test]
fn rv32_addresses_wrap() {
    let mut mem = Memory::new(Xlen::Rv32, false);
    mem.store_word(0xFFFF_FFFE, 0xAABB_CCDD).unwrap();
    assert_eq!(mem.load_byte(0xFFFF_FFFE), 0xDD);
    assert_eq!(mem.load_byte(0xFFFF_FFFF), 0xCC);
    assert_eq!(mem.load_byte(0), 0xBB);
    assert_eq!(mem.load_byte(1), 0xAA);
    assert_eq!(mem.load_byte(0x1_0000_0000), 0xBB);
}

#[test]
fn copy_and_zero_helpers() {
    let mut mem = unaligned();
    mem.store_bytes(0x400, &[1, 2, 3, 4, 5]);
    mem.copy(0x402, 0x400, 5);
    assert_eq!(mem.load_bytes(0x400, 7), vec![1, 2, 1, 2, 3, 4, 5]);
    mem.zero(0x401, 3);
    assert_eq!(mem.load_bytes(0x400, 7), vec![1, 0, 0, 0, 3, 4, 5]);
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 + 1).collect()
}

#[test]
fn copy_spans_pages_in_both_directions() {
    let page = PAGE_SIZE as u64;
    let len = 3 * PAGE_SIZE + 17;
    let data = pattern(len);

    let mut mem = unaligned();
    mem.store_bytes(page - 5, &data);
    mem.copy(page + 100, page - 5, len as u64);
    assert_eq!(mem.load_bytes(page + 100, len as u64), data);
    assert_eq!(mem.load_bytes(page - 5, 105), data[..105].to_vec());

    let mut mem = unaligned();
    mem.store_bytes(page + 100, &data);
    mem.copy(page - 5, page + 100, len as u64);
    assert_eq!(mem.load_bytes(page - 5, len as u64), data);
}

#[test]
fn copy_from_unmapped_memory_clears_the_destination() {
    let mut mem = unaligned();
    mem.store_bytes(0x2000, &[0xFF; 8]);
    mem.copy(0x2002, 0x9_0000, 4);
    assert_eq!(
        mem.load_bytes(0x2000, 8),
        vec![0xFF, 0xFF, 0, 0, 0, 0, 0xFF, 0xFF]
    );
}

#[test]
fn zero_drops_whole_pages_and_trims_partial_ones() {
    let page = PAGE_SIZE as u64;
    let mut mem = unaligned();
    mem.store_bytes(0, &vec![0xAA; 4 * PAGE_SIZE]);
    assert_eq!(mem.mapped_pages(), 4);

    mem.zero(page - 2, 2 * page + 4);
    assert_eq!(mem.mapped_pages(), 2);
    assert_eq!(mem.load_byte(page - 3), 0xAA);
    assert_eq!(mem.load_byte(page - 2), 0);
    assert_eq!(mem.load_word(2 * page), Ok(0));
    assert_eq!(mem.load_byte(3 * page + 1), 0);
    assert_eq!(mem.load_byte(3 * page + 2), 0xAA);
}

#[test]
fn zeroing_a_large_unmapped_range_maps_nothing() {
    let mut mem = unaligned();
    mem.zero(0x1000_0000, 0x3000_0000);
    assert_eq!(mem.mapped_pages(), 0);
}

#[test]
fn clear_drops_every_page() {
    let mut mem = unaligned();
    mem.store_word(0x10, 1).unwrap();
    mem.store_word(0x10_0000, 1).unwrap();
    mem.clear();
    assert_eq!(mem.mapped_pages(), 0);
    assert_eq!(mem.load_word(0x10), Ok(0));
}

proptest! {
    #[test]
    fn stored_values_load_back(addr in 0u64..0x10_0000, value: u64, width in prop::sample::select(vec![1u64, 2, 4, 8])) {
        let mut mem = unaligned();
        mem.store(addr, width, value).unwrap();
        let mask = if width == 8 { u64::MAX } else { (1u64 << (width * 8)) - 1 };
        prop_assert_eq!(mem.load(addr, width).unwrap(), value & mask);
    }

    #[test]
    fn narrower_loads_see_little_endian_slices(addr in 0u64..0x10_0000, value: u64, offset in 0u64..8) {
        let mut mem = unaligned();
        mem.store_long(addr, value).unwrap();
        prop_assert_eq!(u64::from(mem.load_byte(addr + offset)), (value >> (offset * 8)) & 0xFF);
        if offset <= 6 {
            prop_assert_eq!(u64::from(mem.load_half_word(addr + offset).unwrap()), (value >> (offset * 8)) & 0xFFFF);
        }
        if offset <= 4 {
            prop_assert_eq!(u64::from(mem.load_word(addr + offset).unwrap()), (value >> (offset * 8)) & 0xFFFF_FFFF);
        }
    }

    #[test]
    fn aligned_mode_accepts_exactly_aligned_addresses(addr in 0u64..0x10_0000, width in prop::sample::select(vec![2u64, 4, 8])) {
        let mut mem = aligned();
        let result = mem.store(addr, width, 0xFF);
        prop_assert_eq!(result.is_ok(), addr % width == 0);
    }
}
