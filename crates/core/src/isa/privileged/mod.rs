//! System Instruction Definitions.
//!
//! The core executes no privileged state beyond the two environment instructions;
//! CSR access and trap returns decode as illegal.

/// System instruction opcodes (ECALL, EBREAK).
pub mod opcodes;
