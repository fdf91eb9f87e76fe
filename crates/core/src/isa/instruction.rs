//! Instruction field extraction.
//!
//! Bit-field accessors for 32-bit RISC-V encodings and the record produced by
//! [`decode`](super::decode::decode).

/// Mask for a 5-bit register specifier.
const REG_MASK: u32 = 0x1F;
/// Mask for the 3-bit `funct3` field.
const FUNCT3_MASK: u32 = 0x7;
/// Mask for the 7-bit `funct7` field.
const FUNCT7_MASK: u32 = 0x7F;

/// Field accessors for an encoded instruction word.
pub trait InstructionBits {
    /// Major opcode (bits 6-0).
    fn opcode(&self) -> u32;
    /// Destination register (bits 11-7).
    fn rd(&self) -> usize;
    /// First source register (bits 19-15).
    fn rs1(&self) -> usize;
    /// Second source register (bits 24-20).
    fn rs2(&self) -> usize;
    /// Minor opcode (bits 14-12).
    fn funct3(&self) -> u32;
    /// R-type function code (bits 31-25).
    fn funct7(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & crate::common::constants::OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 7) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> 15) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> 20) & REG_MASK) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }
}

/// A decoded instruction: every field extracted, immediate sign-extended.
///
/// Fields that the instruction's format does not use hold whatever bits occupy
/// their position; consumers only look at the fields their opcode defines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Raw 32-bit encoding.
    pub raw: u32,
    /// Major opcode.
    pub opcode: u32,
    /// Destination register index.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Minor opcode.
    pub funct3: u32,
    /// R-type function code.
    pub funct7: u32,
    /// Sign-extended immediate (0 for R-type and system encodings).
    pub imm: i64,
}
