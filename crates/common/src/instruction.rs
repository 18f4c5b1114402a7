//! Instruction encoding and decoding for the NVM instruction set.
//!
//! Instructions are variable width. The opcode byte comes first and is
//! followed by one of three operand layouts:
//! ```text
//! none:   [opcode]
//! int32:  [opcode] [b0 b1 b2 b3]            little-endian i32
//! name:   [opcode] [len] [len name bytes]   UTF-8, len <= 255
//! ```

use crate::error::{DecodeError, EncodeError};
use crate::opcode::{Opcode, Operand};

/// Longest name a one-byte length prefix can describe.
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// A single decoded instruction.
///
/// Name operands borrow from the buffer they were decoded from, so decoding
/// never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction<'a> {
    Nop,
    LoadConst(i32),
    Discard,
    BinaryAdd,
    BinarySub,
    BinaryMul,
    BinaryDiv,
    RotTwo,
    RotThree,
    Store(&'a str),
    LoadName(&'a str),
    Dup,
    FnStart(&'a str),
    FnEnd,
    Call(&'a str),
    EnterBlock,
    LeaveBlock,
}

impl<'a> Instruction<'a> {
    /// The opcode of this instruction.
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Nop => Opcode::Nop,
            Instruction::LoadConst(_) => Opcode::LoadConst,
            Instruction::Discard => Opcode::Discard,
            Instruction::BinaryAdd => Opcode::BinaryAdd,
            Instruction::BinarySub => Opcode::BinarySub,
            Instruction::BinaryMul => Opcode::BinaryMul,
            Instruction::BinaryDiv => Opcode::BinaryDiv,
            Instruction::RotTwo => Opcode::RotTwo,
            Instruction::RotThree => Opcode::RotThree,
            Instruction::Store(_) => Opcode::Store,
            Instruction::LoadName(_) => Opcode::LoadName,
            Instruction::Dup => Opcode::Dup,
            Instruction::FnStart(_) => Opcode::FnStart,
            Instruction::FnEnd => Opcode::FnEnd,
            Instruction::Call(_) => Opcode::Call,
            Instruction::EnterBlock => Opcode::EnterBlock,
            Instruction::LeaveBlock => Opcode::LeaveBlock,
        }
    }

    /// The name operand, for STORE / LOAD_NAME / FN_START / CALL.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Instruction::Store(name)
            | Instruction::LoadName(name)
            | Instruction::FnStart(name)
            | Instruction::Call(name) => Some(name),
            _ => None,
        }
    }

    /// Number of bytes this instruction occupies when encoded.
    pub fn encoded_len(&self) -> usize {
        match self {
            Instruction::LoadConst(_) => 5,
            other => match other.name() {
                Some(name) => 2 + name.len(),
                None => 1,
            },
        }
    }

    /// Decode the instruction starting at byte `at` of `bytes`.
    ///
    /// `bytes` is the whole buffer so that offsets in errors are absolute.
    /// Returns the instruction and the number of bytes it occupies.
    pub fn decode(bytes: &'a [u8], at: usize) -> Result<(Self, usize), DecodeError> {
        let byte = *bytes.get(at).ok_or(DecodeError::Truncated {
            at,
            needed: 1,
            available: 0,
        })?;
        let opcode = Opcode::decode(byte, at)?;
        let rest = &bytes[at + 1..];

        let decoded = match opcode.operand() {
            Operand::None => (Self::without_operand(opcode), 1),
            Operand::Int32 => {
                let raw: [u8; 4] = rest
                    .get(..4)
                    .and_then(|b| b.try_into().ok())
                    .ok_or(DecodeError::Truncated {
                        at,
                        needed: 4,
                        available: rest.len(),
                    })?;
                (Instruction::LoadConst(i32::from_le_bytes(raw)), 5)
            }
            Operand::Name => {
                let len = *rest.first().ok_or(DecodeError::Truncated {
                    at,
                    needed: 1,
                    available: 0,
                })? as usize;
                let raw = rest.get(1..1 + len).ok_or(DecodeError::Truncated {
                    at,
                    needed: 1 + len,
                    available: rest.len(),
                })?;
                let name = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidName { at })?;
                (Self::with_name(opcode, name), 2 + len)
            }
        };

        Ok(decoded)
    }

    /// Append the encoded form of this instruction to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        let opcode = self.opcode() as u8;
        match (self, self.name()) {
            (Instruction::LoadConst(n), _) => {
                out.push(opcode);
                out.extend_from_slice(&n.to_le_bytes());
            }
            (_, Some(name)) => {
                if name.len() > MAX_NAME_LEN {
                    return Err(EncodeError::NameTooLong {
                        name: name.to_string(),
                        len: name.len(),
                    });
                }
                out.push(opcode);
                out.push(name.len() as u8);
                out.extend_from_slice(name.as_bytes());
            }
            (_, None) => out.push(opcode),
        }
        Ok(())
    }

    fn without_operand(opcode: Opcode) -> Self {
        match opcode {
            Opcode::Nop => Instruction::Nop,
            Opcode::Discard => Instruction::Discard,
            Opcode::BinaryAdd => Instruction::BinaryAdd,
            Opcode::BinarySub => Instruction::BinarySub,
            Opcode::BinaryMul => Instruction::BinaryMul,
            Opcode::BinaryDiv => Instruction::BinaryDiv,
            Opcode::RotTwo => Instruction::RotTwo,
            Opcode::RotThree => Instruction::RotThree,
            Opcode::Dup => Instruction::Dup,
            Opcode::FnEnd => Instruction::FnEnd,
            Opcode::EnterBlock => Instruction::EnterBlock,
            Opcode::LeaveBlock => Instruction::LeaveBlock,
            // Operand-carrying opcodes are routed elsewhere by `operand()`.
            Opcode::LoadConst
            | Opcode::Store
            | Opcode::LoadName
            | Opcode::FnStart
            | Opcode::Call => unreachable!("{opcode:?} carries an operand"),
        }
    }

    fn with_name(opcode: Opcode, name: &'a str) -> Self {
        match opcode {
            Opcode::Store => Instruction::Store(name),
            Opcode::LoadName => Instruction::LoadName(name),
            Opcode::FnStart => Instruction::FnStart(name),
            Opcode::Call => Instruction::Call(name),
            _ => unreachable!("{opcode:?} has no name operand"),
        }
    }
}
