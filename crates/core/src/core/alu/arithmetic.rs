//! ALU arithmetic operations.
//!
//! Addition, subtraction and the M-extension multiply/divide family. Division by zero
//! and signed overflow never trap: `x / 0` is all ones, `x % 0` is `x`, and
//! `MIN / -1` is `MIN` with remainder 0.

use crate::core::signals::AluOp;

/// Sign-extends the low 32 bits of `v` to 64 bits.
#[inline]
const fn sext32(v: u32) -> u64 {
    v as i32 as i64 as u64
}

/// Executes an integer arithmetic operation.
///
/// Returns `0` for operations outside this category.
pub fn execute(op: AluOp, a: u64, b: u64, is32: bool) -> u64 {
    if is32 {
        execute32(op, a as u32, b as u32)
    } else {
        execute64(op, a, b)
    }
}

fn execute32(op: AluOp, a: u32, b: u32) -> u64 {
    let (sa, sb) = (a as i32, b as i32);
    match op {
        AluOp::Add => sext32(a.wrapping_add(b)),
        AluOp::Sub => sext32(a.wrapping_sub(b)),
        AluOp::Mul => sext32(a.wrapping_mul(b)),
        AluOp::Mulh => sext32(((i64::from(sa) * i64::from(sb)) >> 32) as u32),
        AluOp::Mulhsu => sext32(((i64::from(sa) * i64::from(b)) >> 32) as u32),
        AluOp::Mulhu => sext32(((u64::from(a) * u64::from(b)) >> 32) as u32),
        AluOp::Div => match sb {
            0 => u64::MAX,
            _ => sext32(sa.wrapping_div(sb) as u32),
        },
        AluOp::Divu => match b {
            0 => u64::MAX,
            _ => sext32(a / b),
        },
        AluOp::Rem => match sb {
            0 => sext32(a),
            _ => sext32(sa.wrapping_rem(sb) as u32),
        },
        AluOp::Remu => match b {
            0 => sext32(a),
            _ => sext32(a % b),
        },
        _ => 0,
    }
}

fn execute64(op: AluOp, a: u64, b: u64) -> u64 {
    let (sa, sb) = (a as i64, b as i64);
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Mulh => ((i128::from(sa) * i128::from(sb)) >> 64) as u64,
        AluOp::Mulhsu => ((i128::from(sa) * i128::from(b)) >> 64) as u64,
        AluOp::Mulhu => ((u128::from(a) * u128::from(b)) >> 64) as u64,
        AluOp::Div => match sb {
            0 => u64::MAX,
            _ => sa.wrapping_div(sb) as u64,
        },
        AluOp::Divu => a.checked_div(b).unwrap_or(u64::MAX),
        AluOp::Rem => match sb {
            0 => a,
            _ => sa.wrapping_rem(sb) as u64,
        },
        AluOp::Remu => a.checked_rem(b).unwrap_or(a),
        _ => 0,
    }
}
