//! RISC-V Multiply/Divide Extension (M) selector.

/// `funct7` value marking an `OP_REG`/`OP_REG_32` instruction as a multiply or divide.
pub const M_EXTENSION: u32 = 0b0000001;
