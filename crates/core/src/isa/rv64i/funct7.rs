//! RISC-V Base Integer (I) Function Codes (funct7).
//!
//! Bits 31-25 of R-type encodings; bit 5 selects the alternate operation.

/// Default operation (ADD, SRL, ...).
pub const DEFAULT: u32 = 0b0000000;

/// Alternate operation for ADD_SUB: subtract.
pub const SUB: u32 = 0b0100000;

/// Alternate operation for SRL_SRA: arithmetic shift.
pub const SRA: u32 = 0b0100000;
