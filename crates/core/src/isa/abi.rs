//! RISC-V Application Binary Interface (ABI) register constants.
//!
//! Register indices used by the calling convention and the environment-call
//! interface, plus the ABI names used in dumps and disassembly.

/// Register x0 (zero register, always zero).
pub const REG_ZERO: usize = 0;
/// Register x1 (return address, ra).
pub const REG_RA: usize = 1;
/// Register x2 (stack pointer, sp).
pub const REG_SP: usize = 2;
/// Register x3 (global pointer, gp).
pub const REG_GP: usize = 3;
/// Register x5 (temporary, t0).
pub const REG_T0: usize = 5;
/// Register x6 (temporary, t1).
pub const REG_T1: usize = 6;
/// Register x8 (saved register / frame pointer, s0).
pub const REG_S0: usize = 8;
/// Register x9 (saved register, s1).
pub const REG_S1: usize = 9;
/// Register x10 (environment call id / return value, a0).
pub const REG_A0: usize = 10;
/// Register x11 (first environment call argument, a1).
pub const REG_A1: usize = 11;
/// Register x12 (second environment call argument, a2).
pub const REG_A2: usize = 12;
/// Register x16 (allocator operation selector, a6).
pub const REG_A6: usize = 16;
/// Register x17 (a7).
pub const REG_A7: usize = 17;
/// Register x18 (saved register, s2).
pub const REG_S2: usize = 18;
/// Register x19 (saved register, s3).
pub const REG_S3: usize = 19;
/// Register x27 (saved register, s11).
pub const REG_S11: usize = 27;

/// ABI register names for x0–x31.
const REG_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Returns the ABI name for an integer register index, or `"x??"` when out of range.
#[inline]
pub fn name(idx: usize) -> &'static str {
    REG_NAMES.get(idx).copied().unwrap_or("x??")
}
