//! General-Purpose Register File.
//!
//! This module implements the integer register file shared by the RV32 and RV64 engines.
//! It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`x0`-`x31`) as 64-bit slots.
//! 2. **Width Normalization:** Truncates every write to the configured `XLEN`.
//! 3. **Invariant Enforcement:** Ensures that register `x0` is hardwired to zero.
//! 4. **Debugging:** Provides a register dump for trace output.

use super::xlen::Xlen;
use crate::isa::abi;

/// Number of architectural integer registers.
pub const NUM_REGS: usize = 32;

/// General-purpose register file.
///
/// Values are stored zero-extended to 64 bits; on RV32 the upper half is always clear.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u64; NUM_REGS],
    xlen: Xlen,
}

impl RegisterFile {
    /// Creates a new register file with all registers initialized to zero.
    ///
    /// # Arguments
    ///
    /// * `xlen` - Register width applied to every write.
    pub fn new(xlen: Xlen) -> Self {
        Self {
            regs: [0; NUM_REGS],
            xlen,
        }
    }

    /// Returns the register width.
    pub fn xlen(&self) -> Xlen {
        self.xlen
    }

    /// Reads a general-purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Register `x0` always returns 0.
    ///
    /// # Returns
    ///
    /// The register value, zero-extended to 64 bits.
    #[inline]
    pub fn read(&self, idx: usize) -> u64 {
        if idx == abi::REG_ZERO { 0 } else { self.regs[idx] }
    }

    /// Reads a register as a signed `XLEN`-bit value.
    #[inline]
    pub fn read_signed(&self, idx: usize) -> i64 {
        self.xlen.sext(self.read(idx))
    }

    /// Writes a general-purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Writes to `x0` are discarded.
    /// * `val` - The value to write; truncated to `XLEN` bits.
    #[inline]
    pub fn write(&mut self, idx: usize, val: u64) {
        if idx != abi::REG_ZERO {
            self.regs[idx] = self.xlen.mask(val);
        }
    }

    /// Formats all registers in pairs with their ABI names.
    pub fn dump(&self) -> String {
        let digits = (self.xlen.bytes() * 2) as usize;
        let mut out = String::new();
        for i in (0..NUM_REGS).step_by(2) {
            out.push_str(&format!(
                "{:>4}={:#0w$x} {:>4}={:#0w$x}\n",
                abi::name(i),
                self.regs[i],
                abi::name(i + 1),
                self.regs[i + 1],
                w = digits + 2,
            ));
        }
        out
    }
}
