//! RISC-V Instruction Decoder.
//!
//! Splits a 32-bit encoding into a [`Decoded`] record. Register and function fields
//! are extracted for every word; the immediate is reassembled and sign-extended
//! according to the format the major opcode implies (I, S, B, U or J).

use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::rv64i::opcodes;

/// Total width of a RISC-V instruction in bits.
const INSTRUCTION_WIDTH: u32 = 32;

/// Width of the S-type immediate.
const S_IMM_BITS: u32 = 12;

/// Width of the B-type immediate (bit 0 implied zero).
const B_IMM_BITS: u32 = 13;

/// Width of the J-type immediate (bit 0 implied zero).
const J_IMM_BITS: u32 = 21;

/// Mask for the U-type immediate (bits 31-12, used in place).
const U_IMM_MASK: u32 = 0xFFFF_F000;

/// Decodes a RISC-V instruction into its component fields.
///
/// Decoding never fails; whether the opcode/function combination is implemented
/// is decided later by [`decode_control`](crate::core::control::decode_control).
///
/// # Arguments
///
/// * `inst` - The 32-bit instruction encoding to decode
///
/// # Returns
///
/// A `Decoded` structure containing all extracted instruction fields.
pub fn decode(inst: u32) -> Decoded {
    let opcode = inst.opcode();

    let imm = match opcode {
        opcodes::OP_IMM | opcodes::OP_LOAD | opcodes::OP_JALR | opcodes::OP_IMM_32 => {
            i_imm(inst)
        }
        opcodes::OP_STORE => s_imm(inst),
        opcodes::OP_BRANCH => b_imm(inst),
        opcodes::OP_LUI | opcodes::OP_AUIPC => u_imm(inst),
        opcodes::OP_JAL => j_imm(inst),
        _ => 0,
    };

    Decoded {
        raw: inst,
        opcode,
        rd: inst.rd(),
        rs1: inst.rs1(),
        rs2: inst.rs2(),
        funct3: inst.funct3(),
        funct7: inst.funct7(),
        imm,
    }
}

/// I-type: `imm[11:0] | rs1 | funct3 | rd | opcode`.
fn i_imm(inst: u32) -> i64 {
    i64::from((inst as i32) >> 20)
}

/// S-type: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`.
fn s_imm(inst: u32) -> i64 {
    let low = (inst >> 7) & 0x1F;
    let high = (inst >> 25) & 0x7F;
    sign_extend((high << 5) | low, S_IMM_BITS)
}

/// B-type: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`.
fn b_imm(inst: u32) -> i64 {
    let bit_11 = (inst >> 7) & 0x1;
    let bits_4_1 = (inst >> 8) & 0xF;
    let bits_10_5 = (inst >> 25) & 0x3F;
    let bit_12 = (inst >> 31) & 0x1;
    let combined = (bit_12 << 12) | (bit_11 << 11) | (bits_10_5 << 5) | (bits_4_1 << 1);
    sign_extend(combined, B_IMM_BITS)
}

/// U-type: `imm[31:12] | rd | opcode`, kept in place and sign-extended from bit 31.
fn u_imm(inst: u32) -> i64 {
    i64::from((inst & U_IMM_MASK) as i32)
}

/// J-type: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`.
fn j_imm(inst: u32) -> i64 {
    let bits_19_12 = (inst >> 12) & 0xFF;
    let bit_11 = (inst >> 20) & 0x1;
    let bits_10_1 = (inst >> 21) & 0x3FF;
    let bit_20 = (inst >> 31) & 0x1;
    let combined = (bit_20 << 20) | (bits_19_12 << 12) | (bit_11 << 11) | (bits_10_1 << 1);
    sign_extend(combined, J_IMM_BITS)
}

/// Sign extends a value of `bits` width to a 64-bit signed integer.
///
/// # Arguments
///
/// * `val` - The value to extend.
/// * `bits` - The number of valid bits in `val`.
fn sign_extend(val: u32, bits: u32) -> i64 {
    let shift = INSTRUCTION_WIDTH - bits;
    i64::from(((val as i32) << shift) >> shift)
}
