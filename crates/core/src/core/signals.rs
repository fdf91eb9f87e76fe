//! Control signals and operation types.
//!
//! This module defines the signals that drive instruction execution. It performs:
//! 1. **Operation Classification:** ALU operations, branch conditions and system operations.
//! 2. **Operand Selection:** Sources for the ALU inputs (registers, PC, zero or immediate).
//! 3. **Memory Control:** Access widths and sign-extension of loads.

use serde::Serialize;

/// Integer ALU operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluOp {
    /// Wrapping addition; also address generation for loads, stores and JALR.
    #[default]
    Add,
    /// Wrapping subtraction.
    Sub,
    /// Shift left logical.
    Sll,
    /// Set if less than, signed.
    Slt,
    /// Set if less than, unsigned.
    Sltu,
    /// Bitwise exclusive or.
    Xor,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Bitwise or.
    Or,
    /// Bitwise and.
    And,
    /// Multiply, low half.
    Mul,
    /// Multiply high, signed × signed.
    Mulh,
    /// Multiply high, signed × unsigned.
    Mulhsu,
    /// Multiply high, unsigned × unsigned.
    Mulhu,
    /// Signed division.
    Div,
    /// Unsigned division.
    Divu,
    /// Signed remainder.
    Rem,
    /// Unsigned remainder.
    Remu,
}

/// Memory access width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemWidth {
    /// No memory access.
    #[default]
    Nop,
    /// 1 byte.
    Byte,
    /// 2 bytes.
    Half,
    /// 4 bytes.
    Word,
    /// 8 bytes (RV64 only).
    Double,
}

impl MemWidth {
    /// Access size in bytes (0 for [`MemWidth::Nop`]).
    pub const fn bytes(self) -> u64 {
        match self {
            Self::Nop => 0,
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
            Self::Double => 8,
        }
    }
}

/// Source of the ALU's first operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpASrc {
    /// Register `rs1`.
    #[default]
    Reg1,
    /// The instruction's own address.
    Pc,
    /// Constant zero.
    Zero,
}

/// Source of the ALU's second operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpBSrc {
    /// The sign-extended immediate.
    #[default]
    Imm,
    /// Register `rs2`.
    Reg2,
}

/// Conditional branch condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchOp {
    /// `rs1 == rs2`.
    Eq,
    /// `rs1 != rs2`.
    Ne,
    /// Signed `rs1 < rs2`.
    Lt,
    /// Signed `rs1 >= rs2`.
    Ge,
    /// Unsigned `rs1 < rs2`.
    Ltu,
    /// Unsigned `rs1 >= rs2`.
    Geu,
}

/// Control transfer performed by a jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpKind {
    /// PC-relative jump (`JAL`).
    Jal,
    /// Register-indirect jump (`JALR`); bit 0 of the target is cleared.
    Jalr,
}

/// System-level operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemOp {
    /// Environment call.
    Ecall,
    /// Breakpoint; pauses `run_to_breakpoint` and executes as a no-op.
    Ebreak,
    /// `FENCE` / `FENCE.I`; a no-op on a single in-order hart.
    Fence,
}

/// Instruction category, used for statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum InstClass {
    /// Register or immediate arithmetic, `LUI`, `AUIPC`.
    #[default]
    Alu,
    /// Loads.
    Load,
    /// Stores.
    Store,
    /// Conditional branches.
    Branch,
    /// `JAL` / `JALR`.
    Jump,
    /// `ECALL`, `EBREAK`, fences.
    System,
}

/// Control signals for one instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlSignals {
    /// Category of the instruction.
    pub class: InstClass,
    /// Whether `rd` is written.
    pub reg_write: bool,
    /// Whether the instruction reads memory.
    pub mem_read: bool,
    /// Whether the instruction writes memory.
    pub mem_write: bool,
    /// Access width for loads and stores.
    pub width: MemWidth,
    /// Whether a load sign-extends.
    pub signed_load: bool,
    /// Whether this is a 32-bit W-suffix operation on RV64.
    pub is_word_op: bool,
    /// ALU operation.
    pub alu: AluOp,
    /// First ALU operand source.
    pub a_src: OpASrc,
    /// Second ALU operand source.
    pub b_src: OpBSrc,
    /// Branch condition, if this is a branch.
    pub branch: Option<BranchOp>,
    /// Jump kind, if this is a jump.
    pub jump: Option<JumpKind>,
    /// System operation, if any.
    pub system: Option<SystemOp>,
}
