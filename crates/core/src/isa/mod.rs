//! Instruction Set Architecture (ISA) Definitions.
//!
//! Opcodes, function codes, field extraction and decoding logic, organized
//! by RISC-V extension.
//!
//! # Extensions
//!
//! * `rv64i`: Base Integer Instruction Set (RV32I and the RV64I additions).
//! * `rv64m`: Standard Extension for Integer Multiplication and Division.
//! * `privileged`: The system opcode (ECALL, EBREAK).

/// Application Binary Interface (ABI) register indices and names.
pub mod abi;

/// Immediate decoding for all base instruction formats.
pub mod decode;

/// Instruction disassembler for trace output and diagnostics.
pub mod disasm;

/// Instruction field extraction and the decoded-instruction record.
pub mod instruction;

/// System instruction encodings.
pub mod privileged;

/// Base integer instruction set.
pub mod rv64i;

/// Integer multiply/divide extension.
pub mod rv64m;
