//! Branch comparator.

use crate::common::Xlen;
use crate::core::signals::BranchOp;

/// Evaluates a branch condition on two register values of width `xlen`.
///
/// # Arguments
///
/// * `op` - The condition.
/// * `a` - Value of `rs1`.
/// * `b` - Value of `rs2`.
/// * `xlen` - Width used for signed comparisons.
///
/// # Returns
///
/// `true` when the branch is taken.
pub fn taken(op: BranchOp, a: u64, b: u64, xlen: Xlen) -> bool {
    let (a, b) = (xlen.mask(a), xlen.mask(b));
    match op {
        BranchOp::Eq => a == b,
        BranchOp::Ne => a != b,
        BranchOp::Lt => xlen.sext(a) < xlen.sext(b),
        BranchOp::Ge => xlen.sext(a) >= xlen.sext(b),
        BranchOp::Ltu => a < b,
        BranchOp::Geu => a >= b,
    }
}
