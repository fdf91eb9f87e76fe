//! Error Definitions.
//!
//! This module defines the error types reported by each layer of the core. It provides:
//! 1. **Memory Errors:** Alignment violations raised before an access is applied.
//! 2. **Heap Errors:** Allocator contract violations and corrupted in-memory metadata.
//! 3. **Engine Errors:** Decode failures, bad control transfers, unknown services and step limits.
//! 4. **Loader and Configuration Errors:** Problems building a program image or a config.
//!
//! Allocation failure is not an error: the allocator reports it by returning the NULL address.

use thiserror::Error;

/// Errors raised by [`Memory`](crate::memory::Memory) accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// A multi-byte access whose address is not a multiple of its width while
    /// alignment enforcement is enabled. Nothing was read or written.
    #[error("misaligned {width}-byte access at {addr:#x}")]
    Misaligned {
        /// The faulting address.
        addr: u64,
        /// The access width in bytes.
        width: u64,
    },
}

/// Errors raised by the [`Heap`](crate::heap::Heap) allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum HeapError {
    /// A metadata access failed.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// `free`/`realloc` received an address that is not the payload of a live allocation.
    #[error("invalid heap pointer {addr:#x}")]
    InvalidPointer {
        /// The offending address.
        addr: u64,
    },

    /// A block header links outside the heap window; the program overwrote allocator metadata.
    #[error("corrupted heap metadata at {addr:#x}")]
    Corrupted {
        /// Address of the header holding the bad link.
        addr: u64,
    },
}

/// Errors surfaced by [`Simulator`](crate::sim::Simulator) stepping.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// A load or store violated the alignment policy; the instruction did not retire.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// An allocator request violated the heap contract.
    #[error(transparent)]
    Heap(#[from] HeapError),

    /// The fetched word is not an instruction this engine implements.
    #[error("illegal instruction {inst:#010x} at pc {pc:#x}")]
    IllegalInstruction {
        /// Address of the instruction.
        pc: u64,
        /// The raw encoding.
        inst: u32,
    },

    /// A control transfer produced a target that is not 4-byte aligned.
    #[error("instruction address misaligned: {target:#x} (from pc {pc:#x})")]
    InstructionAddressMisaligned {
        /// Address of the jump or branch.
        pc: u64,
        /// The misaligned target.
        target: u64,
    },

    /// `ecall` was executed with a service id the core does not provide.
    #[error("unknown environment call {id} at pc {pc:#x}")]
    UnknownEnvironmentCall {
        /// Address of the `ecall`.
        pc: u64,
        /// The id found in `a0` (or `a6` for allocator requests).
        id: u64,
    },

    /// The optional step guard tripped before the program halted.
    #[error("step limit of {limit} exceeded at pc {pc:#x}")]
    StepLimitExceeded {
        /// The configured limit.
        limit: u64,
        /// Program counter when the guard tripped.
        pc: u64,
    },
}

/// Errors raised while building a [`Program`](crate::sim::Program) from bytes or files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image could not be read from disk.
    #[error("could not read image: {0}")]
    Io(#[from] std::io::Error),

    /// The ELF container is malformed.
    #[error("malformed ELF image: {0}")]
    Elf(#[from] object::Error),

    /// The ELF image is not a little-endian RISC-V executable.
    #[error("unsupported ELF image: {0}")]
    Unsupported(&'static str),

    /// The text segment length is not a multiple of the instruction size.
    #[error("text segment of {len} bytes is not a whole number of instructions")]
    MisalignedText {
        /// Length of the text bytes.
        len: usize,
    },

    /// The image contains no executable code.
    #[error("image has no text segment")]
    NoText,
}

/// Errors raised while building or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be deserialized.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration deserialized but describes an impossible layout.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
