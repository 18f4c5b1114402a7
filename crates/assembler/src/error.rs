//! Error types for the NVM assembler.

use thiserror::Error;

/// Errors produced during assembly of text to bytecode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An opcode is missing its operand.
    #[error("line {line}: {opcode} expects {expected}")]
    MissingArgument {
        line: usize,
        opcode: &'static str,
        expected: &'static str,
    },

    /// A numeric literal could not be parsed or is out of range.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// A directive is unknown, repeated, or placed after an instruction.
    #[error("line {line}: invalid directive '.{directive}'")]
    InvalidDirective { line: usize, directive: String },

    /// A name does not fit the one-byte length prefix.
    #[error("line {line}: name is {len} bytes long (at most 255 allowed)")]
    NameTooLong { line: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_opcode() {
        let e = AsmError::UnknownOpcode {
            line: 3,
            token: "FOO".to_string(),
        };
        assert_eq!(e.to_string(), "line 3: unknown opcode 'FOO'");
    }

    #[test]
    fn error_display_missing_argument() {
        let e = AsmError::MissingArgument {
            line: 7,
            opcode: "STORE",
            expected: "a name",
        };
        assert_eq!(e.to_string(), "line 7: STORE expects a name");
    }

    #[test]
    fn error_display_invalid_number() {
        let e = AsmError::InvalidNumber {
            line: 2,
            token: "0xZZZZ".to_string(),
        };
        assert_eq!(e.to_string(), "line 2: invalid number '0xZZZZ'");
    }

    #[test]
    fn error_display_invalid_directive() {
        let e = AsmError::InvalidDirective {
            line: 4,
            directive: "origin".to_string(),
        };
        assert_eq!(e.to_string(), "line 4: invalid directive '.origin'");
    }

    #[test]
    fn error_display_name_too_long() {
        let e = AsmError::NameTooLong { line: 1, len: 300 };
        assert_eq!(
            e.to_string(),
            "line 1: name is 300 bytes long (at most 255 allowed)"
        );
    }
}
