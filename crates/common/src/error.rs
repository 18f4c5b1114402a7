//! Decode and encode errors for NVM bytecode buffers.

use thiserror::Error;

/// Errors that occur while decoding a bytecode buffer.
///
/// Every offset is absolute: it counts from the first byte of the buffer,
/// version header included.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer is shorter than the 3-byte version header.
    #[error("missing version header: buffer is {len} byte(s) long")]
    MissingHeader { len: usize },

    /// Opcode byte not in the instruction set.
    #[error("unknown opcode {byte:#04x} at offset {at}")]
    UnknownOpcode { at: usize, byte: u8 },

    /// An operand runs past the end of the buffer.
    #[error("truncated instruction at offset {at}: needs {needed} byte(s), {available} available")]
    Truncated {
        at: usize,
        needed: usize,
        available: usize,
    },

    /// A name operand is not valid UTF-8. Names are strings, so byte
    /// sequences that do not decode are rejected rather than carried as raw
    /// bytes.
    #[error("name operand at offset {at} is not valid UTF-8")]
    InvalidName { at: usize },
}

/// Errors that occur while encoding instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A name is too long for its one-byte length prefix.
    #[error("name '{name}' is {len} bytes long (max 255)")]
    NameTooLong { name: String, len: usize },
}

impl DecodeError {
    /// The offset of the offending instruction, if the error has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::UnknownOpcode { at, .. }
            | DecodeError::Truncated { at, .. }
            | DecodeError::InvalidName { at } => Some(*at),
            DecodeError::MissingHeader { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_opcode() {
        assert_eq!(
            DecodeError::UnknownOpcode { at: 7, byte: 0x2a }.to_string(),
            "unknown opcode 0x2a at offset 7"
        );
    }

    #[test]
    fn display_missing_header() {
        assert_eq!(
            DecodeError::MissingHeader { len: 2 }.to_string(),
            "missing version header: buffer is 2 byte(s) long"
        );
    }

    #[test]
    fn display_truncated() {
        assert_eq!(
            DecodeError::Truncated {
                at: 3,
                needed: 4,
                available: 1
            }
            .to_string(),
            "truncated instruction at offset 3: needs 4 byte(s), 1 available"
        );
    }

    #[test]
    fn display_name_too_long() {
        assert_eq!(
            EncodeError::NameTooLong {
                name: "x".repeat(3),
                len: 300
            }
            .to_string(),
            "name 'xxx' is 300 bytes long (max 255)"
        );
    }

    #[test]
    fn offsets() {
        assert_eq!(DecodeError::InvalidName { at: 9 }.offset(), Some(9));
        assert_eq!(DecodeError::MissingHeader { len: 0 }.offset(), None);
    }
}
