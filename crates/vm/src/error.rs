//! Runtime errors for the NVM.
//!
//! Every error raised during dispatch is fatal: it ends the run and is
//! returned to the caller. Where a position is known it is the absolute
//! byte offset (`at`) of the instruction that failed.

use nvm_common::{DecodeError, Version};
use thiserror::Error;

use crate::alloc::Resource;

/// Errors that occur while loading or executing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Pop on an empty operand stack.
    #[error("stack underflow at offset {at}")]
    StackUnderflow { at: usize },

    /// LEAVE_BLOCK with no block to leave, or a body ending with blocks
    /// still open.
    #[error("unbalanced block at offset {at}")]
    UnbalancedBlock { at: usize },

    /// LOAD_NAME on a name bound in no enclosing block.
    #[error("name '{name}' not found at offset {at}")]
    NameNotFound { at: usize, name: String },

    /// CALL to a name missing from the function table.
    #[error("function '{name}' not found at offset {at}")]
    FunctionNotFound { at: usize, name: String },

    /// Opcode byte not in the instruction set.
    #[error("unknown opcode {byte:#04x} at offset {at}")]
    UnknownOpcode { at: usize, byte: u8 },

    /// The allocation strategy refused to grow a resource.
    #[error("allocation failure ({resource}) at offset {at}")]
    AllocationFailure { at: usize, resource: Resource },

    /// BINARY_DIV with a zero divisor.
    #[error("division by zero at offset {at}")]
    DivisionByZero { at: usize },

    /// Two FN_START markers declare the same name.
    #[error("function '{name}' defined twice (second definition at offset {at})")]
    DuplicateFunction { at: usize, name: String },

    /// FN_END reached with no function being executed.
    #[error("FN_END outside of a function at offset {at}")]
    StrayFunctionEnd { at: usize },

    /// A function body runs to the end of the buffer without FN_END.
    #[error("function '{name}' starting at offset {at} has no FN_END")]
    UnterminatedFunction { at: usize, name: String },

    /// An operand runs past the end of the buffer.
    #[error("truncated instruction at offset {at}")]
    Truncated { at: usize },

    /// A name operand is not valid UTF-8.
    #[error("invalid name operand at offset {at}")]
    InvalidName { at: usize },

    /// The buffer is shorter than the version header.
    #[error("missing version header: buffer is {len} byte(s) long")]
    MissingHeader { len: usize },

    /// The header's major version differs from the supported one.
    #[error("unsupported bytecode version {found} (expected {expected})")]
    UnsupportedVersion { found: Version, expected: Version },
}

impl RuntimeError {
    /// The byte offset of the failing instruction, if the error has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            RuntimeError::StackUnderflow { at }
            | RuntimeError::UnbalancedBlock { at }
            | RuntimeError::NameNotFound { at, .. }
            | RuntimeError::FunctionNotFound { at, .. }
            | RuntimeError::UnknownOpcode { at, .. }
            | RuntimeError::AllocationFailure { at, .. }
            | RuntimeError::DivisionByZero { at }
            | RuntimeError::DuplicateFunction { at, .. }
            | RuntimeError::StrayFunctionEnd { at }
            | RuntimeError::UnterminatedFunction { at, .. }
            | RuntimeError::Truncated { at }
            | RuntimeError::InvalidName { at } => Some(*at),
            RuntimeError::MissingHeader { .. } | RuntimeError::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<DecodeError> for RuntimeError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::MissingHeader { len } => RuntimeError::MissingHeader { len },
            DecodeError::UnknownOpcode { at, byte } => RuntimeError::UnknownOpcode { at, byte },
            DecodeError::Truncated { at, .. } => RuntimeError::Truncated { at },
            DecodeError::InvalidName { at } => RuntimeError::InvalidName { at },
        }
    }
}
