//! Validation errors for the NVM validator.
//!
//! Every error that points into the buffer carries the absolute byte offset
//! (`at`) of the offending instruction, header included.

use nvm_common::DecodeError;
use thiserror::Error;

/// Problems found by static validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    // --- Decoding ---
    /// Buffer is shorter than the version header.
    #[error("bytecode not initialized: missing version header")]
    NotInitialized,

    /// Opcode byte not in the instruction set.
    #[error("unknown opcode {byte:#04x} at offset {at}")]
    UnknownOpcode { at: usize, byte: u8 },

    /// An operand runs past the end of the buffer.
    #[error("truncated instruction at offset {at}")]
    Truncated { at: usize },

    /// A name operand is not valid UTF-8.
    #[error("invalid name operand at offset {at}")]
    InvalidName { at: usize },

    // --- Structure ---
    /// A function name is defined more than once.
    #[error("function '{name}' at offset {at} already defined at offset {first}")]
    DuplicateFunction {
        at: usize,
        name: String,
        first: usize,
    },

    /// FN_START without a matching FN_END.
    #[error("unterminated function at offset {at}")]
    UnterminatedFunction { at: usize },

    /// FN_END with no open FN_START.
    #[error("FN_END without FN_START at offset {at}")]
    StrayFunctionEnd { at: usize },

    /// LEAVE_BLOCK with nothing to leave, or a body ending with blocks open.
    #[error("unbalanced block at offset {at}")]
    UnbalancedBlock { at: usize },
}

impl From<DecodeError> for ValidationError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::MissingHeader { .. } => ValidationError::NotInitialized,
            DecodeError::UnknownOpcode { at, byte } => ValidationError::UnknownOpcode { at, byte },
            DecodeError::Truncated { at, .. } => ValidationError::Truncated { at },
            DecodeError::InvalidName { at } => ValidationError::InvalidName { at },
        }
    }
}
