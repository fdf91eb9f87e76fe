//! Execution Core.
//!
//! The pieces the engine combines for every instruction:
//! 1. **Signals:** The control record describing what an instruction does.
//! 2. **Control Decode:** Turning a [`Decoded`](crate::isa::instruction::Decoded)
//!    instruction into signals, rejecting encodings the engine does not implement.
//! 3. **Execution Units:** The integer ALU and the branch comparator.

/// Integer arithmetic logic unit.
pub mod alu;

/// Conditional branch comparison.
pub mod branch;

/// Instruction-to-signal decode.
pub mod control;

/// Control signals and operation selectors.
pub mod signals;
