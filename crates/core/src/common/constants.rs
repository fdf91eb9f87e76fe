//! Global Simulator Constants.
//!
//! This module defines constants used across the simulator core. It includes:
//! 1. **Instruction Constants:** Instruction width and the opcode mask.
//! 2. **Environment Calls:** Service ids selected through `a0` and allocator ops selected through `a6`.
//! 3. **Allocator Constants:** The NULL address and the block header layout.

/// Size of a standard (32-bit) RISC-V instruction in bytes.
pub const INSTRUCTION_SIZE: u64 = 4;

/// Bit mask for extracting the opcode field from a RISC-V instruction.
pub const OPCODE_MASK: u32 = 0x7F;

/// Environment call id: bump the heap high-water mark by `a1` bytes.
pub const ECALL_SBRK: u64 = 9;

/// Environment call id: terminate with exit code 0.
pub const ECALL_EXIT: u64 = 10;

/// Environment call id: terminate with the exit code held in `a1`.
pub const ECALL_EXIT2: u64 = 17;

/// Environment call id reserved for allocator requests; `a6` selects the operation.
pub const ECALL_ALLOC: u64 = 0x3CC;

/// Allocator operation: `a0 = malloc(a1)`.
pub const ALLOC_MALLOC: u64 = 1;

/// Allocator operation: `a0 = calloc(a1)`.
pub const ALLOC_CALLOC: u64 = 2;

/// Allocator operation: `a0 = realloc(a1, a2)`.
pub const ALLOC_REALLOC: u64 = 3;

/// Allocator operation: `free(a1)`.
pub const ALLOC_FREE: u64 = 4;

/// Allocator operation: `a0 = number of live allocations`.
pub const ALLOC_ACTIVE_COUNT: u64 = 5;

/// The NULL address returned by failed allocations.
pub const NULL: u64 = 0;

/// Number of `XLEN`-wide words in a heap block header (size, state, next, prev).
pub const HEADER_WORDS: u64 = 4;
