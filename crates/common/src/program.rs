//! Program representation for NVM bytecode buffers.
//!
//! A program is the full byte buffer: the 3-byte version header followed
//! by the instruction stream. Offsets handed out by this module count from
//! the first header byte.

use crate::error::{DecodeError, EncodeError};
use crate::header::{Version, HEADER_LEN};
use crate::instruction::Instruction;

/// An NVM program: a header plus an encoded instruction stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Program {
    /// Encode `instructions` under the current format version.
    pub fn from_instructions(instructions: &[Instruction<'_>]) -> Result<Self, EncodeError> {
        Self::with_version(Version::CURRENT, instructions)
    }

    /// Encode `instructions` under an explicit format version.
    pub fn with_version(
        version: Version,
        instructions: &[Instruction<'_>],
    ) -> Result<Self, EncodeError> {
        let mut bytes = Vec::with_capacity(
            HEADER_LEN + instructions.iter().map(Instruction::encoded_len).sum::<usize>(),
        );
        bytes.extend_from_slice(&version.to_bytes());
        for instr in instructions {
            instr.encode(&mut bytes)?;
        }
        Ok(Self { bytes })
    }

    /// Wrap an existing buffer. Only the header is checked; instructions
    /// are decoded lazily by [`Program::instructions`].
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Version::read(bytes)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// The format version from the header.
    pub fn version(&self) -> Version {
        Version::new(self.bytes[0], self.bytes[1], self.bytes[2])
    }

    /// Consume the program, returning the full buffer.
    pub fn encode(self) -> Vec<u8> {
        self.bytes
    }

    /// Iterate over the decoded instructions with their absolute offsets.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.bytes)
    }

    /// Number of code bytes (header excluded).
    pub fn len(&self) -> usize {
        self.bytes.len() - HEADER_LEN
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Iterator over `(offset, instruction)` pairs of a full buffer.
///
/// Stops after the first decode error, since every later offset would be
/// misaligned.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    bytes: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    /// Start iterating after the header of `bytes`. A buffer shorter than
    /// the header yields nothing.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: HEADER_LEN,
            failed: false,
        }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<(usize, Instruction<'a>), DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.bytes.len() {
            return None;
        }
        let at = self.pos;
        match Instruction::decode(self.bytes, at) {
            Ok((instr, width)) => {
                self.pos += width;
                Some(Ok((at, instr)))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program() {
        let program = Program::from_instructions(&[]).unwrap();
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
        assert_eq!(program.encode(), vec![0, 0, 1]);
    }

    #[test]
    fn encode_layout() {
        let program = Program::from_instructions(&[
            Instruction::LoadConst(7),
            Instruction::Store("x"),
        ])
        .unwrap();
        assert_eq!(program.len(), 8);
        assert_eq!(
            program.encode(),
            vec![0, 0, 1, 0x01, 7, 0, 0, 0, 0x09, 1, b'x']
        );
    }

    #[test]
    fn explicit_version() {
        let program = Program::with_version(Version::new(3, 1, 4), &[Instruction::Nop]).unwrap();
        assert_eq!(program.version(), Version::new(3, 1, 4));
        assert_eq!(program.encode(), vec![3, 1, 4, 0x00]);
    }

    #[test]
    fn decode_requires_header() {
        assert_eq!(
            Program::decode(&[0, 1]),
            Err(DecodeError::MissingHeader { len: 2 })
        );
    }

    #[test]
    fn instructions_have_absolute_offsets() {
        let program = Program::from_instructions(&[
            Instruction::LoadConst(2),
            Instruction::Dup,
            Instruction::BinaryAdd,
        ])
        .unwrap();
        let decoded: Vec<_> = program.instructions().collect::<Result<_, _>>().unwrap();
        assert_eq!(
            decoded,
            vec![
                (3, Instruction::LoadConst(2)),
                (8, Instruction::Dup),
                (9, Instruction::BinaryAdd),
            ]
        );
    }

    #[test]
    fn iteration_stops_after_error() {
        let program = Program::decode(&[0, 0, 1, 0x0B, 0x7F, 0x0B]).unwrap();
        let items: Vec<_> = program.instructions().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok((3, Instruction::Dup)));
        assert_eq!(
            items[1],
            Err(DecodeError::UnknownOpcode { at: 4, byte: 0x7F })
        );
    }

    #[test]
    fn iterating_a_headerless_buffer_yields_nothing() {
        assert_eq!(Instructions::new(&[0x0B]).count(), 0);
    }
}
