//! NVM validator: static well-formedness checks for bytecode buffers.
//!
//! The validator never executes anything and never mutates the buffer. A
//! buffer that passes can still fail at run time (an unknown name, a
//! division by zero, a missing function), but it will not fail on decoding
//! or on function and block structure.
//!
//! # Usage
//!
//! ```
//! use nvm_common::{Instruction, Program};
//! use nvm_validator::{validate, ValidationError};
//!
//! let good = Program::from_instructions(&[Instruction::LoadConst(1)])
//!     .unwrap()
//!     .encode();
//! assert!(validate(&good).is_ok());
//!
//! assert_eq!(validate(&[0, 0]), Err(ValidationError::NotInitialized));
//! ```
//!
//! # Passes
//!
//! 1. **Decode** — header present, every opcode known, operands in bounds,
//!    names valid UTF-8
//! 2. **Structural** — FN_START/FN_END pairing, per-body block balance,
//!    unique function names

pub mod decode;
pub mod error;
pub mod structural;

pub use error::ValidationError;

/// Validate a buffer, returning the first problem found.
pub fn validate(bytes: &[u8]) -> Result<(), ValidationError> {
    validate_all(bytes).map_err(|mut errors| errors.swap_remove(0))
}

/// Validate a buffer, collecting every problem found.
///
/// If decoding fails, that single error is returned and the structural
/// pass is skipped.
pub fn validate_all(bytes: &[u8]) -> Result<(), Vec<ValidationError>> {
    let instrs = decode::check_decode(bytes).map_err(|e| vec![e])?;
    let errors = structural::check_structural(&instrs, bytes.len());

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
