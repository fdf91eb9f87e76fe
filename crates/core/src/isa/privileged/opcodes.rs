//! RISC-V System Opcodes.

/// System instruction opcode (0b1110011).
pub const OP_SYSTEM: u32 = 0b1110011;

/// Environment Call (ECALL); services are selected through `a0`.
pub const ECALL: u32 = 0x0000_0073;

/// Environment Break (EBREAK); the engine's breakpoint instruction.
pub const EBREAK: u32 = 0x0010_0073;
