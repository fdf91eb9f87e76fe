//! Configuration system for the simulator core.
//!
//! This module defines the structures used to parameterize a run. It provides:
//! 1. **Defaults:** The conventional memory map (text at 0, static data at `0x1000_0000`,
//!    heap from `0x1000_8000`, stack growing down from `0x7FFF_FFF0`).
//! 2. **Structures:** General, memory and heap sections, each deserializable on its own.
//! 3. **Validation:** Rejection of layouts the allocator or the register width cannot hold.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built from `Config::default()`.

use serde::Deserialize;

use crate::common::{ConfigError, Xlen};
use crate::heap::BlockHeader;

/// Default configuration constants.
mod defaults {
    /// Base address of the text segment.
    pub const TEXT_BASE: u64 = 0x0000_0000;

    /// Base address of the static data segment.
    pub const DATA_BASE: u64 = 0x1000_0000;

    /// First address handed to the allocator.
    pub const HEAP_BASE: u64 = 0x1000_8000;

    /// Exclusive upper bound of the heap.
    pub const HEAP_LIMIT: u64 = 0x4000_0000;

    /// Initial stack pointer.
    pub const STACK_POINTER: u64 = 0x7FFF_FFF0;

    /// Initial global pointer.
    pub const GLOBAL_POINTER: u64 = 0x1000_8000;
}

/// Root configuration for a simulator run.
///
/// # Examples
///
/// ```
/// use rvexec_core::config::Config;
/// use rvexec_core::common::Xlen;
///
/// let json = r#"{
///     "general": { "xlen": "Rv64", "max_steps": 10000 },
///     "memory": { "aligned_addresses": true },
///     "heap": { "always_calloc": true }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.general.xlen, Xlen::Rv64);
/// assert_eq!(config.general.max_steps, Some(10000));
/// assert!(config.memory.aligned_addresses);
/// assert_eq!(config.memory.heap_base, 0x1000_8000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory map and alignment policy
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Allocator settings
    #[serde(default)]
    pub heap: HeapConfig,
}

impl Config {
    /// Parses and validates a JSON configuration document.
    ///
    /// Missing sections and fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the memory layout is usable.
    ///
    /// The heap base must be non-zero (0 is the NULL address) and word aligned, the
    /// heap limit must lie above it with room for at least one block header, and every
    /// address must fit in the register width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let xlen = self.general.xlen;
        let m = &self.memory;
        if m.heap_base == 0 {
            return Err(ConfigError::Invalid("heap_base must not be the NULL address".into()));
        }
        if m.heap_base % xlen.bytes() != 0 {
            return Err(ConfigError::Invalid(format!(
                "heap_base {:#x} is not {}-byte aligned",
                m.heap_base,
                xlen.bytes()
            )));
        }
        if m.heap_limit <= m.heap_base {
            return Err(ConfigError::Invalid(format!(
                "heap_limit {:#x} must be above heap_base {:#x}",
                m.heap_limit, m.heap_base
            )));
        }
        let header = BlockHeader::header_size(xlen);
        if m.heap_base.checked_add(header).is_none_or(|end| end > m.heap_limit) {
            return Err(ConfigError::Invalid(format!(
                "heap window [{:#x}, {:#x}) cannot hold a {header}-byte block header",
                m.heap_base, m.heap_limit
            )));
        }
        if m.text_base % crate::common::constants::INSTRUCTION_SIZE != 0 {
            return Err(ConfigError::Invalid(format!(
                "text_base {:#x} is not instruction aligned",
                m.text_base
            )));
        }
        // heap_limit is exclusive, so it may equal 2^32 on RV32.
        let max = xlen.max_addr();
        let fields = [
            ("text_base", m.text_base, max),
            ("data_base", m.data_base, max),
            ("heap_base", m.heap_base, max),
            ("heap_limit", m.heap_limit, max.saturating_add(1)),
            ("stack_pointer", m.stack_pointer, max),
            ("global_pointer", m.global_pointer, max),
        ];
        for (name, value, bound) in fields {
            if value > bound {
                return Err(ConfigError::Invalid(format!(
                    "{name} {value:#x} does not fit in {} bits",
                    xlen.bits()
                )));
            }
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeneralConfig {
    /// Register and address width; fixed for the lifetime of a simulator.
    #[serde(default)]
    pub xlen: Xlen,

    /// Emit a `trace`-level event for every executed instruction.
    #[serde(default)]
    pub trace_instructions: bool,

    /// Abort with `StepLimitExceeded` once this many instructions have executed.
    #[serde(default)]
    pub max_steps: Option<u64>,
}

/// Memory map and alignment policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// Reject half-word, word and long accesses that are not naturally aligned.
    #[serde(default)]
    pub aligned_addresses: bool,

    /// Address of the first instruction.
    #[serde(default = "MemoryConfig::default_text_base")]
    pub text_base: u64,

    /// Address the data segment is copied to.
    #[serde(default = "MemoryConfig::default_data_base")]
    pub data_base: u64,

    /// First address used by the allocator.
    #[serde(default = "MemoryConfig::default_heap_base")]
    pub heap_base: u64,

    /// Exclusive upper bound of the heap.
    #[serde(default = "MemoryConfig::default_heap_limit")]
    pub heap_limit: u64,

    /// Initial value of `sp`.
    #[serde(default = "MemoryConfig::default_stack_pointer")]
    pub stack_pointer: u64,

    /// Initial value of `gp`.
    #[serde(default = "MemoryConfig::default_global_pointer")]
    pub global_pointer: u64,
}

impl MemoryConfig {
    fn default_text_base() -> u64 {
        defaults::TEXT_BASE
    }

    fn default_data_base() -> u64 {
        defaults::DATA_BASE
    }

    fn default_heap_base() -> u64 {
        defaults::HEAP_BASE
    }

    fn default_heap_limit() -> u64 {
        defaults::HEAP_LIMIT
    }

    fn default_stack_pointer() -> u64 {
        defaults::STACK_POINTER
    }

    fn default_global_pointer() -> u64 {
        defaults::GLOBAL_POINTER
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            aligned_addresses: false,
            text_base: defaults::TEXT_BASE,
            data_base: defaults::DATA_BASE,
            heap_base: defaults::HEAP_BASE,
            heap_limit: defaults::HEAP_LIMIT,
            stack_pointer: defaults::STACK_POINTER,
            global_pointer: defaults::GLOBAL_POINTER,
        }
    }
}

/// Allocator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HeapConfig {
    /// Zero-fill every allocation, whichever entry point was used.
    #[serde(default)]
    pub always_calloc: bool,
}
