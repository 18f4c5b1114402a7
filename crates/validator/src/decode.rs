//! Decoding pass: header, opcodes and operand bounds.
//!
//! Walks the buffer once and either produces every instruction with its
//! offset or stops at the first byte that cannot be decoded. Offsets past
//! that point are meaningless, so nothing after it is reported.

use nvm_common::{Instruction, Instructions, Version};

use crate::error::ValidationError;

/// Decode the whole buffer.
pub fn check_decode(bytes: &[u8]) -> Result<Vec<(usize, Instruction<'_>)>, ValidationError> {
    Version::read(bytes)?;
    Instructions::new(bytes)
        .map(|item| item.map_err(ValidationError::from))
        .collect()
}
