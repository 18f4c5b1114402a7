//! NVM common types and instruction encoding.
//!
//! This crate provides the foundational data structures for the NVM
//! bytecode format:
//!
//! - [`Opcode`] — the 17 opcodes of the instruction set
//! - [`Version`] — the 3-byte header every buffer starts with
//! - [`Instruction`] — a decoded, variable-width instruction
//! - [`Program`] — a header plus instruction stream
//! - [`Value`] — runtime value representation for the VM stack
//! - [`DecodeError`] / [`EncodeError`] — errors from decoding and encoding byte streams

pub mod error;
pub mod header;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod type_tag;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::{DecodeError, EncodeError};
pub use header::{Version, HEADER_LEN};
pub use instruction::Instruction;
pub use opcode::{Opcode, Operand};
pub use program::{Instructions, Program};
pub use type_tag::TypeTag;
pub use value::Value;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Decoding arbitrary bytes either succeeds within bounds or
        /// returns a positioned error; it never panics.
        #[test]
        fn decode_arbitrary_bytes(
            bytes in prop::collection::vec(any::<u8>(), 0..64),
            at in 0usize..64,
        ) {
            match Instruction::decode(&bytes, at) {
                Ok((instr, width)) => {
                    prop_assert!(at + width <= bytes.len());
                    prop_assert_eq!(instr.encoded_len(), width);
                    prop_assert_eq!(instr.opcode() as u8, bytes[at]);
                }
                Err(e) => prop_assert_eq!(e.offset(), Some(at)),
            }
        }

        /// Walking a buffer of arbitrary bytes visits strictly increasing
        /// offsets that stay inside the buffer.
        #[test]
        fn iteration_stays_in_bounds(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
            let mut last = None;
            for item in Instructions::new(&bytes) {
                let Ok((at, instr)) = item else { break };
                prop_assert!(at + instr.encoded_len() <= bytes.len());
                if let Some(prev) = last {
                    prop_assert!(at > prev);
                }
                last = Some(at);
            }
        }
    }
}
