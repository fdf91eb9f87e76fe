//! RISC-V Base Integer (I) Opcodes.
//!
//! Major opcodes (bits 6-0) for the base integer instruction set.

/// Loads (LB, LH, LW, LBU, LHU; RV64 adds LWU, LD).
pub const OP_LOAD: u32 = 0b0000011;

/// Memory ordering (FENCE, FENCE.I).
pub const OP_MISC_MEM: u32 = 0b0001111;

/// Register-immediate arithmetic (ADDI, ANDI, SLLI, ...).
pub const OP_IMM: u32 = 0b0010011;

/// Add Upper Immediate to PC.
pub const OP_AUIPC: u32 = 0b0010111;

/// 32-bit register-immediate arithmetic (ADDIW, SLLIW, ...), RV64 only.
pub const OP_IMM_32: u32 = 0b0011011;

/// Stores (SB, SH, SW; RV64 adds SD).
pub const OP_STORE: u32 = 0b0100011;

/// Register-register arithmetic (ADD, SUB, SLL, ... and the M extension).
pub const OP_REG: u32 = 0b0110011;

/// Load Upper Immediate.
pub const OP_LUI: u32 = 0b0110111;

/// 32-bit register-register arithmetic (ADDW, SUBW, ...), RV64 only.
pub const OP_REG_32: u32 = 0b0111011;

/// Conditional branches (BEQ, BNE, BLT, BGE, BLTU, BGEU).
pub const OP_BRANCH: u32 = 0b1100011;

/// Jump and Link Register.
pub const OP_JALR: u32 = 0b1100111;

/// Jump and Link.
pub const OP_JAL: u32 = 0b1101111;
