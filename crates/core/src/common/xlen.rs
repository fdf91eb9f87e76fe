//! Register and Address Width.
//!
//! The simulator runs either as RV32 or RV64. Rather than duplicating the register file,
//! memory accessors and allocator for each width, every component carries an `Xlen` and
//! normalizes values through it:
//! 1. **Masking:** Register values and addresses are truncated to the active width.
//! 2. **Sign Extension:** Signed comparisons and arithmetic see the value as `XLEN`-bit signed.
//! 3. **Shift Amounts:** Register shifts use 5 bits on RV32 and 6 bits on RV64.

use serde::Deserialize;

/// Width of the integer registers and of the simulated address space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum Xlen {
    /// 32-bit registers and a 4 GiB address space.
    #[default]
    Rv32,
    /// 64-bit registers and address space; enables `LD`/`SD`/`LWU` and W-suffix ops.
    Rv64,
}

impl Xlen {
    /// Returns the register width in bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Rv32 => 32,
            Self::Rv64 => 64,
        }
    }

    /// Returns the register width in bytes.
    #[inline]
    pub const fn bytes(self) -> u64 {
        match self {
            Self::Rv32 => 4,
            Self::Rv64 => 8,
        }
    }

    /// Truncates `val` to the active width (zero-extended into a `u64`).
    ///
    /// # Arguments
    ///
    /// * `val` - The raw 64-bit value.
    ///
    /// # Returns
    ///
    /// `val` unchanged on RV64, or its low 32 bits on RV32.
    #[inline]
    pub const fn mask(self, val: u64) -> u64 {
        match self {
            Self::Rv32 => val & 0xFFFF_FFFF,
            Self::Rv64 => val,
        }
    }

    /// Interprets `val` as a signed `XLEN`-bit integer.
    #[inline]
    pub const fn sext(self, val: u64) -> i64 {
        match self {
            Self::Rv32 => val as u32 as i32 as i64,
            Self::Rv64 => val as i64,
        }
    }

    /// Returns the mask applied to register shift amounts.
    #[inline]
    pub const fn shamt_mask(self) -> u64 {
        match self {
            Self::Rv32 => 0x1F,
            Self::Rv64 => 0x3F,
        }
    }

    /// Returns the largest representable address.
    #[inline]
    pub const fn max_addr(self) -> u64 {
        match self {
            Self::Rv32 => 0xFFFF_FFFF,
            Self::Rv64 => u64::MAX,
        }
    }

    /// Returns `true` for the 64-bit variant.
    #[inline]
    pub const fn is_rv64(self) -> bool {
        matches!(self, Self::Rv64)
    }
}
