//! ALU shift operations.
//!
//! Shift amounts use the low 5 bits of `b` in the 32-bit form and the low 6 bits otherwise.

use crate::core::signals::AluOp;

/// Executes a shift.
///
/// Returns `0` for operations outside this category.
pub fn execute(op: AluOp, a: u64, b: u64, is32: bool) -> u64 {
    if is32 {
        let shamt = (b & 0x1F) as u32;
        let v = a as u32;
        let r = match op {
            AluOp::Sll => v << shamt,
            AluOp::Srl => v >> shamt,
            AluOp::Sra => ((v as i32) >> shamt) as u32,
            _ => return 0,
        };
        r as i32 as i64 as u64
    } else {
        let shamt = (b & 0x3F) as u32;
        match op {
            AluOp::Sll => a << shamt,
            AluOp::Srl => a >> shamt,
            AluOp::Sra => ((a as i64) >> shamt) as u64,
            _ => 0,
        }
    }
}
