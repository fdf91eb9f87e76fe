//! ALU logical and comparison operations.

use crate::core::signals::AluOp;

/// Executes a bitwise or set-less-than operation.
///
/// In the 32-bit form comparisons look only at the low 32 bits and the bitwise
/// result is sign-extended from bit 31. Returns `0` for operations outside this category.
pub fn execute(op: AluOp, a: u64, b: u64, is32: bool) -> u64 {
    let (sa, sb, ua, ub) = if is32 {
        (
            i64::from(a as i32),
            i64::from(b as i32),
            u64::from(a as u32),
            u64::from(b as u32),
        )
    } else {
        (a as i64, b as i64, a, b)
    };
    let widen = |v: u64| if is32 { v as i32 as i64 as u64 } else { v };
    match op {
        AluOp::Or => widen(a | b),
        AluOp::And => widen(a & b),
        AluOp::Xor => widen(a ^ b),
        AluOp::Slt => u64::from(sa < sb),
        AluOp::Sltu => u64::from(ua < ub),
        _ => 0,
    }
}
