//! Address helper tests.

use rstest::rstest;
use rvexec_core::common::addr::is_aligned;
use rvexec_core::common::{align_up, word_offset_mask};

#[rstest]
#[case(0, 0x0000_00FF)]
#[case(1, 0x0000_FF00)]
#[case(2, 0x00FF_0000)]
#[case(3, 0xFF00_0000)]
#[case(0x1000_0004, 0x0000_00FF)]
#[case(0x1000_0007, 0xFF00_0000)]
#[case(0xFFFF_FFFE, 0x00FF_0000)]
fn word_offset_mask_selects_byte_lane(#[case] addr: u64, #[case] mask: u32) {
    assert_eq!(word_offset_mask(addr), mask);
}

#[test]
fn word_offset_mask_isolates_stored_byte() {
    let word: u32 = 0xDEAD_BEEF;
    let lanes: Vec<u32> = (0..4).map(|a| (word & word_offset_mask(a)) >> (a * 8)).collect();
    assert_eq!(lanes, vec![0xEF, 0xBE, 0xAD, 0xDE]);
}

#[rstest]
#[case(0, 4, 0)]
#[case(1, 4, 4)]
#[case(4, 4, 4)]
#[case(5, 8, 8)]
#[case(17, 8, 24)]
fn align_up_rounds_to_boundary(#[case] val: u64, #[case] align: u64, #[case] expected: u64) {
    assert_eq!(align_up(val, align), Some(expected));
}

#[test]
fn align_up_reports_overflow() {
    assert_eq!(align_up(u64::MAX, 8), None);
}

#[test]
fn byte_accesses_are_always_aligned() {
    assert!(is_aligned(3, 1));
    assert!(is_aligned(6, 2));
    assert!(!is_aligned(6, 4));
    assert!(!is_aligned(12, 8));
    assert!(is_aligned(16, 8));
}
