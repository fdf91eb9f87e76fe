//! Simulation: program images, loading, environment calls and the engine.
//!
//! This module ties the core together. It provides:
//! 1. **Program Images:** The immutable [`Program`] a run executes.
//! 2. **Loading:** Flat binaries and RISC-V ELF executables.
//! 3. **Environment Calls:** Exit, sbrk and the allocator convention.
//! 4. **Execution:** The [`Simulator`] with stepping, breakpoints and reset.

/// Environment-call dispatch.
pub mod ecall;

/// Flat-binary and ELF loaders.
pub mod loader;

/// Program image.
pub mod program;

/// The execution engine.
pub mod simulator;

pub use program::Program;
pub use simulator::{RunState, Simulator};
