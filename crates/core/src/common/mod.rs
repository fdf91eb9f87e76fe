//! Common utilities and types used throughout the simulator core.
//!
//! This module provides the building blocks shared by memory, heap and engine:
//! 1. **Address Helpers:** Byte-lane masks and alignment arithmetic.
//! 2. **Register Width:** The `Xlen` selector for RV32 and RV64 state.
//! 3. **Constants:** Default memory map, environment call ids and allocator layout.
//! 4. **Error Handling:** Memory, heap, engine, loader and configuration errors.
//! 5. **Register Management:** The general-purpose register file.

/// Address arithmetic helpers.
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for every layer of the core.
pub mod error;

/// Register file implementation.
pub mod reg;

/// Register and address width selection.
pub mod xlen;

pub use addr::{align_up, word_offset_mask};
pub use error::{ConfigError, HeapError, LoadError, MemoryError, SimError};
pub use reg::RegisterFile;
pub use xlen::Xlen;
