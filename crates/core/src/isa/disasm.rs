//! Instruction Disassembler.
//!
//! Converts a 32-bit encoding into a mnemonic string for trace output and error
//! diagnostics. Covers the base integer set (RV32I/RV64I), the M extension,
//! FENCE and the two environment instructions. Anything else renders as `"unknown"`.
//!
//! # Usage
//!
//! ```
//! use rvexec_core::isa::disasm::disassemble;
//! assert_eq!(disassemble(0x00A00513), "addi a0, zero, 10");
//! ```

use crate::isa::abi::name as xreg;
use crate::isa::decode::decode;
use crate::isa::instruction::Decoded;
use crate::isa::privileged::opcodes as sys_op;
use crate::isa::rv64i::{funct3 as i_f3, funct7 as i_f7, opcodes as i_op};
use crate::isa::rv64m::{funct3 as m_f3, opcodes as m_op};

/// Disassembles a 32-bit RISC-V instruction into a human-readable string.
///
/// Returns a mnemonic like `"add a0, a1, a2"` or `"unknown"` for
/// unrecognised encodings.
///
/// # Arguments
///
/// * `inst` - The raw 32-bit instruction encoding.
pub fn disassemble(inst: u32) -> String {
    let d = decode(inst);
    let text = match d.opcode {
        i_op::OP_LUI => Some(format!("lui {}, {:#x}", xreg(d.rd), (d.imm >> 12) & 0xF_FFFF)),
        i_op::OP_AUIPC => Some(format!("auipc {}, {:#x}", xreg(d.rd), (d.imm >> 12) & 0xF_FFFF)),
        i_op::OP_JAL => Some(format!("jal {}, {}", xreg(d.rd), d.imm)),
        i_op::OP_JALR if d.funct3 == 0 => {
            Some(format!("jalr {}, {}({})", xreg(d.rd), d.imm, xreg(d.rs1)))
        }
        i_op::OP_BRANCH => disasm_branch(&d),
        i_op::OP_LOAD => disasm_load(&d),
        i_op::OP_STORE => disasm_store(&d),
        i_op::OP_IMM => disasm_op_imm(&d, false),
        i_op::OP_IMM_32 => disasm_op_imm(&d, true),
        i_op::OP_REG => disasm_op_reg(&d, false),
        i_op::OP_REG_32 => disasm_op_reg(&d, true),
        i_op::OP_MISC_MEM => match d.funct3 {
            i_f3::FENCE => Some("fence".to_string()),
            i_f3::FENCE_I => Some("fence.i".to_string()),
            _ => None,
        },
        sys_op::OP_SYSTEM => disasm_system(inst),
        _ => None,
    };
    text.unwrap_or_else(|| "unknown".to_string())
}

fn disasm_branch(d: &Decoded) -> Option<String> {
    let mnemonic = match d.funct3 {
        i_f3::BEQ => "beq",
        i_f3::BNE => "bne",
        i_f3::BLT => "blt",
        i_f3::BGE => "bge",
        i_f3::BLTU => "bltu",
        i_f3::BGEU => "bgeu",
        _ => return None,
    };
    Some(format!("{mnemonic} {}, {}, {}", xreg(d.rs1), xreg(d.rs2), d.imm))
}

fn disasm_load(d: &Decoded) -> Option<String> {
    let mnemonic = match d.funct3 {
        i_f3::LB => "lb",
        i_f3::LH => "lh",
        i_f3::LW => "lw",
        i_f3::LD => "ld",
        i_f3::LBU => "lbu",
        i_f3::LHU => "lhu",
        i_f3::LWU => "lwu",
        _ => return None,
    };
    Some(format!("{mnemonic} {}, {}({})", xreg(d.rd), d.imm, xreg(d.rs1)))
}

fn disasm_store(d: &Decoded) -> Option<String> {
    let mnemonic = match d.funct3 {
        i_f3::SB => "sb",
        i_f3::SH => "sh",
        i_f3::SW => "sw",
        i_f3::SD => "sd",
        _ => return None,
    };
    Some(format!("{mnemonic} {}, {}({})", xreg(d.rs2), d.imm, xreg(d.rs1)))
}

fn disasm_op_imm(d: &Decoded, word: bool) -> Option<String> {
    let suffix = if word { "w" } else { "" };
    let shamt = d.imm & if word { 0x1F } else { 0x3F };
    let (mnemonic, operand) = match d.funct3 {
        i_f3::ADD_SUB => ("addi", d.imm),
        i_f3::SLT if !word => ("slti", d.imm),
        i_f3::SLTU if !word => ("sltiu", d.imm),
        i_f3::XOR if !word => ("xori", d.imm),
        i_f3::OR if !word => ("ori", d.imm),
        i_f3::AND if !word => ("andi", d.imm),
        i_f3::SLL => ("slli", shamt),
        i_f3::SRL_SRA if d.raw & (1 << 30) != 0 => ("srai", shamt),
        i_f3::SRL_SRA => ("srli", shamt),
        _ => return None,
    };
    Some(format!("{mnemonic}{suffix} {}, {}, {operand}", xreg(d.rd), xreg(d.rs1)))
}

fn disasm_op_reg(d: &Decoded, word: bool) -> Option<String> {
    let mnemonic = if d.funct7 == m_op::M_EXTENSION {
        match d.funct3 {
            m_f3::MUL => "mul",
            m_f3::MULH if !word => "mulh",
            m_f3::MULHSU if !word => "mulhsu",
            m_f3::MULHU if !word => "mulhu",
            m_f3::DIV => "div",
            m_f3::DIVU => "divu",
            m_f3::REM => "rem",
            m_f3::REMU => "remu",
            _ => return None,
        }
    } else {
        match (d.funct3, d.funct7) {
            (i_f3::ADD_SUB, i_f7::DEFAULT) => "add",
            (i_f3::ADD_SUB, i_f7::SUB) => "sub",
            (i_f3::SLL, i_f7::DEFAULT) => "sll",
            (i_f3::SLT, i_f7::DEFAULT) if !word => "slt",
            (i_f3::SLTU, i_f7::DEFAULT) if !word => "sltu",
            (i_f3::XOR, i_f7::DEFAULT) if !word => "xor",
            (i_f3::SRL_SRA, i_f7::DEFAULT) => "srl",
            (i_f3::SRL_SRA, i_f7::SRA) => "sra",
            (i_f3::OR, i_f7::DEFAULT) if !word => "or",
            (i_f3::AND, i_f7::DEFAULT) if !word => "and",
            _ => return None,
        }
    };
    let suffix = if word { "w" } else { "" };
    Some(format!(
        "{mnemonic}{suffix} {}, {}, {}",
        xreg(d.rd),
        xreg(d.rs1),
        xreg(d.rs2)
    ))
}

fn disasm_system(inst: u32) -> Option<String> {
    match inst {
        sys_op::ECALL => Some("ecall".to_string()),
        sys_op::EBREAK => Some("ebreak".to_string()),
        _ => None,
    }
}
