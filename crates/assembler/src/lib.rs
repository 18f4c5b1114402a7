//! NVM assembler: bidirectional text ↔ bytecode translation.
//!
//! The assembler is a mechanical 1:1 translation. No optimization, no sugar.
//!
//! # Usage
//!
//! ```
//! use nvm_assembler::{assemble, disassemble};
//!
//! let text = ".version 0 0 1\nLOAD_CONST 42\nSTORE answer\n";
//! let bytes = assemble(text).unwrap();
//! assert_eq!(disassemble(&bytes).unwrap(), text);
//! ```
//!
//! # Syntax
//!
//! - One instruction per line; `;` starts a comment; blank lines are ignored.
//! - Mnemonics are case-insensitive. Names are case-sensitive and may be
//!   double-quoted (`"two words"`, with `\\`, `\"` and `\u{HEX}` escapes).
//! - `LOAD_CONST` takes a decimal or `0x` hex integer, optionally negative.
//! - An optional `.version MAJOR MINOR PATCH` directive may precede the
//!   first instruction. Without it the current version is written.
//! - Leading indentation is ignored.
//!
//! # Roundtrip Guarantee
//!
//! `assemble(&disassemble(bytes)?) == bytes` holds for every buffer that
//! decodes. The disassembler outputs canonical text; the assembler accepts
//! both canonical and non-canonical input (e.g., hex where decimal is
//! canonical).

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use disassembler::disassemble;
pub use error::AsmError;

use lexer::tokenize_line;
use nvm_common::{EncodeError, Version};
use parser::{parse_line, ParseResult};

/// Assemble text into a bytecode buffer, header included.
///
/// Returns the first error encountered. Fix one error at a time.
pub fn assemble(text: &str) -> Result<Vec<u8>, AsmError> {
    let mut header: Option<Version> = None;
    let mut code = Vec::new();
    let mut seen_instruction = false;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        match parse_line(&tokens, line_num)? {
            None => {}
            Some(ParseResult::Version(version)) => {
                if seen_instruction || header.is_some() {
                    return Err(AsmError::InvalidDirective {
                        line: line_num,
                        directive: "version".to_string(),
                    });
                }
                header = Some(version);
            }
            Some(ParseResult::Instr(instr)) => {
                seen_instruction = true;
                instr.encode(&mut code).map_err(|e| match e {
                    EncodeError::NameTooLong { len, .. } => AsmError::NameTooLong {
                        line: line_num,
                        len,
                    },
                })?;
            }
        }
    }

    let mut bytes = header.unwrap_or(Version::CURRENT).to_bytes().to_vec();
    bytes.extend_from_slice(&code);
    Ok(bytes)
}
