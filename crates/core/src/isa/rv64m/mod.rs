//! RISC-V Multiply/Divide Extension (M).
//!
//! Shares `OP_REG`/`OP_REG_32` with the base set; selected by `funct7 == M_EXTENSION`.

/// Function code 3 definitions for multiply/divide operations.
pub mod funct3;

/// Multiply/divide extension selector.
pub mod opcodes;
