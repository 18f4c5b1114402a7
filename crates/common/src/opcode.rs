//! Opcode definitions for the NVM instruction set.

use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// The `#[repr(u8)]` attribute pins each variant to its byte in the
/// instruction stream.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// No operation.
    Nop = 0x00,
    /// Push a 32-bit signed constant (4 little-endian operand bytes).
    LoadConst = 0x01,
    /// Pop and drop the top of stack.
    Discard = 0x02,

    // Arithmetic: pop b, pop a, push a <op> b.
    /// Addition.
    BinaryAdd = 0x03,
    /// Subtraction.
    BinarySub = 0x04,
    /// Multiplication.
    BinaryMul = 0x05,
    /// Integer division. Division by zero is a runtime error.
    BinaryDiv = 0x06,

    // Stack shuffling
    /// Swap the top two values.
    RotTwo = 0x07,
    /// Move the top value down to third position.
    RotThree = 0x08,

    // Variables
    /// Pop a value and bind it to a name in the current block.
    Store = 0x09,
    /// Push a copy of the value bound to a name.
    LoadName = 0x0A,
    /// Duplicate the top of stack.
    Dup = 0x0B,

    // Functions
    /// Marks a function entry. Skipped during linear execution.
    FnStart = 0x0C,
    /// Marks a function exit.
    FnEnd = 0x0D,
    /// Invoke a function by name.
    Call = 0x0E,

    // Blocks
    /// Push a new lexical block.
    EnterBlock = 0x0F,
    /// Pop the current lexical block.
    LeaveBlock = 0x10,
}

/// What follows an opcode byte in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Nothing; the instruction is one byte wide.
    None,
    /// Four bytes, a little-endian `i32`.
    Int32,
    /// One length byte followed by that many name bytes.
    Name,
}

/// All valid opcodes, in byte order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 17] = [
    Opcode::Nop,
    Opcode::LoadConst,
    Opcode::Discard,
    Opcode::BinaryAdd,
    Opcode::BinarySub,
    Opcode::BinaryMul,
    Opcode::BinaryDiv,
    Opcode::RotTwo,
    Opcode::RotThree,
    Opcode::Store,
    Opcode::LoadName,
    Opcode::Dup,
    Opcode::FnStart,
    Opcode::FnEnd,
    Opcode::Call,
    Opcode::EnterBlock,
    Opcode::LeaveBlock,
];

impl Opcode {
    /// Decode an opcode byte found at offset `at`.
    pub fn decode(byte: u8, at: usize) -> Result<Self, DecodeError> {
        ALL_OPCODES
            .get(byte as usize)
            .copied()
            .ok_or(DecodeError::UnknownOpcode { at, byte })
    }

    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::LoadConst => "LOAD_CONST",
            Opcode::Discard => "DISCARD",
            Opcode::BinaryAdd => "BINARY_ADD",
            Opcode::BinarySub => "BINARY_SUB",
            Opcode::BinaryMul => "BINARY_MUL",
            Opcode::BinaryDiv => "BINARY_DIV",
            Opcode::RotTwo => "ROT_TWO",
            Opcode::RotThree => "ROT_THREE",
            Opcode::Store => "STORE",
            Opcode::LoadName => "LOAD_NAME",
            Opcode::Dup => "DUP",
            Opcode::FnStart => "FN_START",
            Opcode::FnEnd => "FN_END",
            Opcode::Call => "CALL",
            Opcode::EnterBlock => "ENTER_BLOCK",
            Opcode::LeaveBlock => "LEAVE_BLOCK",
        }
    }

    /// Look up an opcode by its (uppercase) mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == mnemonic)
            .copied()
    }

    /// The operand layout that follows this opcode.
    pub fn operand(&self) -> Operand {
        match self {
            Opcode::LoadConst => Operand::Int32,
            Opcode::Store | Opcode::LoadName | Opcode::FnStart | Opcode::Call => Operand::Name,
            _ => Operand::None,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    /// Decode without positional context; the error reports offset 0.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Opcode::decode(value, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_opcodes_are_dense_from_zero() {
        for (i, &opcode) in ALL_OPCODES.iter().enumerate() {
            assert_eq!(opcode as u8 as usize, i, "gap before {opcode:?}");
        }
    }

    #[test]
    fn roundtrip_all_valid_opcodes() {
        for &opcode in &ALL_OPCODES {
            let byte = opcode as u8;
            assert_eq!(Opcode::try_from(byte), Ok(opcode));
        }
    }

    #[test]
    fn unknown_range_rejected_with_offset() {
        for byte in 0x11..=0xFFu8 {
            assert_eq!(
                Opcode::decode(byte, 42),
                Err(DecodeError::UnknownOpcode { at: 42, byte })
            );
        }
    }

    #[test]
    fn operand_layouts() {
        assert_eq!(Opcode::LoadConst.operand(), Operand::Int32);
        assert_eq!(Opcode::Store.operand(), Operand::Name);
        assert_eq!(Opcode::LoadName.operand(), Operand::Name);
        assert_eq!(Opcode::FnStart.operand(), Operand::Name);
        assert_eq!(Opcode::Call.operand(), Operand::Name);
        assert_eq!(Opcode::FnEnd.operand(), Operand::None);
        assert_eq!(Opcode::RotThree.operand(), Operand::None);
    }

    #[test]
    fn mnemonic_lookup() {
        for &opcode in &ALL_OPCODES {
            let m = opcode.mnemonic();
            assert_eq!(m, m.to_uppercase(), "mnemonic should be uppercase: {m}");
            assert_eq!(Opcode::from_mnemonic(m), Some(opcode));
        }
        assert_eq!(Opcode::from_mnemonic("HALT"), None);
    }
}
