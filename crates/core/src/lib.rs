//! Instruction-level RISC-V simulator core.
//!
//! This crate implements the execution core of an RV32/RV64 simulator with the following:
//! 1. **Memory:** A sparse, byte-addressable store with configurable alignment enforcement.
//! 2. **Heap:** A first-fit free-list allocator whose block headers live inside simulated memory.
//! 3. **ISA:** Decoding and disassembly for the RV32I/RV64I base set and the M extension.
//! 4. **Core:** Control-signal decode and the integer ALU.
//! 5. **Simulation:** Program images, environment calls, breakpoints, and the stepping engine.

/// Common types and constants (address helpers, register width, errors, registers).
pub mod common;
/// Simulator configuration (defaults, width selection, memory layout).
pub mod config;
/// Control-signal decode and integer execution units.
pub mod core;
/// Free-list heap allocator operating on simulated memory.
pub mod heap;
/// Instruction set (decode, instruction fields, ABI, RV64I/M, privileged, disassembly).
pub mod isa;
/// Sparse byte-addressable memory.
pub mod memory;
/// Program images, loaders, environment calls and the execution engine.
pub mod sim;
/// Execution statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Heap allocator driven by the allocator environment call.
pub use crate::heap::Heap;
/// Simulated memory.
pub use crate::memory::Memory;
/// Linked program image consumed by the engine.
pub use crate::sim::Program;
/// Main engine type; owns registers, memory and the allocator.
pub use crate::sim::Simulator;
