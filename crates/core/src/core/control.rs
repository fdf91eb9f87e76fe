//! Control Decode.
//!
//! Maps a decoded instruction onto [`ControlSignals`]. This is where the engine decides
//! whether it implements an encoding at all: anything outside RV32I/RV64I, the M
//! extension, fences and `ECALL`/`EBREAK` (and RV64-only encodings on an RV32 engine)
//! is rejected as an illegal instruction.

use crate::common::{SimError, Xlen};
use crate::core::signals::{
    AluOp, BranchOp, ControlSignals, InstClass, JumpKind, MemWidth, OpASrc, OpBSrc, SystemOp,
};
use crate::isa::instruction::Decoded;
use crate::isa::privileged::opcodes as sys_opcodes;
use crate::isa::rv64i::{funct3 as i_funct3, funct7 as i_funct7, opcodes as i_opcodes};
use crate::isa::rv64m::{funct3 as m_funct3, opcodes as m_opcodes};

/// Bit 30 of the encoding (bit 5 of funct7): selects SRA/SRAI over SRL/SRLI.
const FUNCT7_ALT_BIT: u32 = 0b010_0000;

/// Builds the control signals for `d`.
///
/// # Arguments
///
/// * `d` - The decoded instruction.
/// * `xlen` - Register width of the engine; RV64-only encodings fail on RV32.
/// * `pc` - Address of the instruction, used in the error.
///
/// # Returns
///
/// The signals, or `SimError::IllegalInstruction` for unimplemented encodings.
pub fn decode_control(d: &Decoded, xlen: Xlen, pc: u64) -> Result<ControlSignals, SimError> {
    let illegal = || SimError::IllegalInstruction { pc, inst: d.raw };
    let rv64 = xlen.is_rv64();

    let mut c = ControlSignals::default();

    match d.opcode {
        i_opcodes::OP_LUI => {
            c.reg_write = true;
            c.a_src = OpASrc::Zero;
        }
        i_opcodes::OP_AUIPC => {
            c.reg_write = true;
            c.a_src = OpASrc::Pc;
        }
        i_opcodes::OP_JAL => {
            c.class = InstClass::Jump;
            c.reg_write = true;
            c.jump = Some(JumpKind::Jal);
        }
        i_opcodes::OP_JALR => {
            if d.funct3 != 0 {
                return Err(illegal());
            }
            c.class = InstClass::Jump;
            c.reg_write = true;
            c.jump = Some(JumpKind::Jalr);
        }
        i_opcodes::OP_BRANCH => {
            c.class = InstClass::Branch;
            c.b_src = OpBSrc::Reg2;
            c.branch = Some(match d.funct3 {
                i_funct3::BEQ => BranchOp::Eq,
                i_funct3::BNE => BranchOp::Ne,
                i_funct3::BLT => BranchOp::Lt,
                i_funct3::BGE => BranchOp::Ge,
                i_funct3::BLTU => BranchOp::Ltu,
                i_funct3::BGEU => BranchOp::Geu,
                _ => return Err(illegal()),
            });
        }
        i_opcodes::OP_LOAD => {
            c.class = InstClass::Load;
            c.reg_write = true;
            c.mem_read = true;
            let (w, s) = match d.funct3 {
                i_funct3::LB => (MemWidth::Byte, true),
                i_funct3::LH => (MemWidth::Half, true),
                i_funct3::LW => (MemWidth::Word, true),
                i_funct3::LBU => (MemWidth::Byte, false),
                i_funct3::LHU => (MemWidth::Half, false),
                i_funct3::LD if rv64 => (MemWidth::Double, true),
                i_funct3::LWU if rv64 => (MemWidth::Word, false),
                _ => return Err(illegal()),
            };
            c.width = w;
            c.signed_load = s;
        }
        i_opcodes::OP_STORE => {
            c.class = InstClass::Store;
            c.mem_write = true;
            c.width = match d.funct3 {
                i_funct3::SB => MemWidth::Byte,
                i_funct3::SH => MemWidth::Half,
                i_funct3::SW => MemWidth::Word,
                i_funct3::SD if rv64 => MemWidth::Double,
                _ => return Err(illegal()),
            };
        }
        i_opcodes::OP_IMM | i_opcodes::OP_IMM_32 => {
            let word = d.opcode == i_opcodes::OP_IMM_32;
            if word && !rv64 {
                return Err(illegal());
            }
            c.reg_write = true;
            c.is_word_op = word;
            // RV32 and W-forms only have 5-bit shift amounts.
            let shamt_ok = if word || !rv64 {
                d.funct7 & !FUNCT7_ALT_BIT == 0
            } else {
                (d.funct7 >> 1) & !(FUNCT7_ALT_BIT >> 1) == 0
            };
            c.alu = match d.funct3 {
                i_funct3::ADD_SUB => AluOp::Add,
                i_funct3::SLT if !word => AluOp::Slt,
                i_funct3::SLTU if !word => AluOp::Sltu,
                i_funct3::XOR if !word => AluOp::Xor,
                i_funct3::OR if !word => AluOp::Or,
                i_funct3::AND if !word => AluOp::And,
                i_funct3::SLL if shamt_ok && d.funct7 & FUNCT7_ALT_BIT == 0 => AluOp::Sll,
                i_funct3::SRL_SRA if shamt_ok => {
                    if d.funct7 & FUNCT7_ALT_BIT == 0 {
                        AluOp::Srl
                    } else {
                        AluOp::Sra
                    }
                }
                _ => return Err(illegal()),
            };
        }
        i_opcodes::OP_REG | i_opcodes::OP_REG_32 => {
            let word = d.opcode == i_opcodes::OP_REG_32;
            if word && !rv64 {
                return Err(illegal());
            }
            c.reg_write = true;
            c.is_word_op = word;
            c.b_src = OpBSrc::Reg2;

            c.alu = if d.funct7 == m_opcodes::M_EXTENSION {
                match d.funct3 {
                    m_funct3::MUL => AluOp::Mul,
                    m_funct3::MULH if !word => AluOp::Mulh,
                    m_funct3::MULHSU if !word => AluOp::Mulhsu,
                    m_funct3::MULHU if !word => AluOp::Mulhu,
                    m_funct3::DIV => AluOp::Div,
                    m_funct3::DIVU => AluOp::Divu,
                    m_funct3::REM => AluOp::Rem,
                    m_funct3::REMU => AluOp::Remu,
                    _ => return Err(illegal()),
                }
            } else {
                match (d.funct3, d.funct7) {
                    (i_funct3::ADD_SUB, i_funct7::DEFAULT) => AluOp::Add,
                    (i_funct3::ADD_SUB, i_funct7::SUB) => AluOp::Sub,
                    (i_funct3::SLL, i_funct7::DEFAULT) => AluOp::Sll,
                    (i_funct3::SLT, i_funct7::DEFAULT) if !word => AluOp::Slt,
                    (i_funct3::SLTU, i_funct7::DEFAULT) if !word => AluOp::Sltu,
                    (i_funct3::XOR, i_funct7::DEFAULT) if !word => AluOp::Xor,
                    (i_funct3::SRL_SRA, i_funct7::DEFAULT) => AluOp::Srl,
                    (i_funct3::SRL_SRA, i_funct7::SRA) => AluOp::Sra,
                    (i_funct3::OR, i_funct7::DEFAULT) if !word => AluOp::Or,
                    (i_funct3::AND, i_funct7::DEFAULT) if !word => AluOp::And,
                    _ => return Err(illegal()),
                }
            };
        }
        i_opcodes::OP_MISC_MEM => {
            if d.funct3 != i_funct3::FENCE && d.funct3 != i_funct3::FENCE_I {
                return Err(illegal());
            }
            c.class = InstClass::System;
            c.system = Some(SystemOp::Fence);
        }
        sys_opcodes::OP_SYSTEM => {
            c.class = InstClass::System;
            c.system = Some(match d.raw {
                sys_opcodes::ECALL => SystemOp::Ecall,
                sys_opcodes::EBREAK => SystemOp::Ebreak,
                _ => return Err(illegal()),
            });
        }
        _ => return Err(illegal()),
    }

    Ok(c)
}
