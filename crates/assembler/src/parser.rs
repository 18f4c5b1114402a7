//! Parser for NVM assembly tokens → instructions.
//!
//! Dispatches on the opcode's operand layout: none, a 32-bit integer, or
//! a name.

use crate::error::AsmError;
use crate::lexer::Token;
use nvm_common::opcode::ALL_OPCODES;
use nvm_common::{Instruction, Opcode, Operand, Version};

/// Result of parsing a single assembly line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ParseResult<'t> {
    /// A `.version` directive.
    Version(Version),
    /// One instruction. Names borrow from the line's tokens.
    Instr(Instruction<'t>),
}

fn lookup_opcode(mnemonic: &str) -> Option<Opcode> {
    ALL_OPCODES
        .iter()
        .find(|op| op.mnemonic().eq_ignore_ascii_case(mnemonic))
        .copied()
}

/// Parse a sequence of tokens from a single line.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line<'t>(
    tokens: &'t [Token<'_>],
    line_num: usize,
) -> Result<Option<ParseResult<'t>>, AsmError> {
    let Some(first) = tokens.first() else {
        return Ok(None);
    };
    let args = &tokens[1..];

    let mnemonic = match first {
        Token::Word(w) => *w,
        Token::Directive(d) => return parse_directive(d, args, line_num).map(Some),
        other => {
            return Err(AsmError::UnexpectedToken {
                line: line_num,
                token: other.text(),
            })
        }
    };

    let opcode = lookup_opcode(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
        line: line_num,
        token: mnemonic.to_string(),
    })?;

    let instr = match opcode.operand() {
        Operand::None => {
            expect_end(args, line_num)?;
            bare(opcode)
        }
        Operand::Int32 => {
            let value = expect_i32(args, line_num, opcode)?;
            expect_end(&args[1..], line_num)?;
            Instruction::LoadConst(value)
        }
        Operand::Name => {
            let name = expect_name(args, line_num, opcode)?;
            expect_end(&args[1..], line_num)?;
            named(opcode, name)
        }
    };

    Ok(Some(ParseResult::Instr(instr)))
}

fn bare(opcode: Opcode) -> Instruction<'static> {
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
        Opcode::LoadConst
        | Opcode::Store
        | Opcode::LoadName
        | Opcode::FnStart
        | Opcode::Call => unreachable!("{opcode:?} carries an operand"),
    }
}

fn named(opcode: Opcode, name: &str) -> Instruction<'_> {
    match opcode {
        Opcode::Store => Instruction::Store(name),
        Opcode::LoadName => Instruction::LoadName(name),
        Opcode::FnStart => Instruction::FnStart(name),
        Opcode::Call => Instruction::Call(name),
        _ => unreachable!("{opcode:?} has no name operand"),
    }
}

/// `.version MAJOR MINOR PATCH`
fn parse_directive<'t>(
    directive: &str,
    args: &[Token<'_>],
    line_num: usize,
) -> Result<ParseResult<'t>, AsmError> {
    if directive != "version" {
        return Err(AsmError::InvalidDirective {
            line: line_num,
            directive: directive.to_string(),
        });
    }
    let mut parts = [0u8; 3];
    for (i, part) in parts.iter_mut().enumerate() {
        *part = match args.get(i) {
            Some(Token::Number { value, text }) => {
                u8::try_from(*value).map_err(|_| AsmError::InvalidNumber {
                    line: line_num,
                    token: (*text).to_string(),
                })?
            }
            Some(other) => {
                return Err(AsmError::UnexpectedToken {
                    line: line_num,
                    token: other.text(),
                })
            }
            None => {
                return Err(AsmError::MissingArgument {
                    line: line_num,
                    opcode: ".version",
                    expected: "three version numbers",
                })
            }
        };
    }
    expect_end(&args[3..], line_num)?;
    Ok(ParseResult::Version(Version::new(parts[0], parts[1], parts[2])))
}

/// A 32-bit operand. Values above `i32::MAX` up to `0xFFFFFFFF` are taken
/// as raw bit patterns, so `0xFFFFFFFF` is `-1`.
fn expect_i32(args: &[Token<'_>], line: usize, opcode: Opcode) -> Result<i32, AsmError> {
    match args.first() {
        Some(Token::Number { value, text }) => {
            if let Ok(n) = i32::try_from(*value) {
                Ok(n)
            } else if let Ok(bits) = u32::try_from(*value) {
                Ok(bits as i32)
            } else {
                Err(AsmError::InvalidNumber {
                    line,
                    token: (*text).to_string(),
                })
            }
        }
        Some(other) => Err(AsmError::UnexpectedToken {
            line,
            token: other.text(),
        }),
        None => Err(AsmError::MissingArgument {
            line,
            opcode: opcode.mnemonic(),
            expected: "an integer",
        }),
    }
}

fn expect_name<'t>(
    args: &'t [Token<'_>],
    line: usize,
    opcode: Opcode,
) -> Result<&'t str, AsmError> {
    match args.first() {
        Some(Token::Word(w)) => Ok(*w),
        Some(Token::Quoted(s)) => Ok(s.as_str()),
        Some(other) => Err(AsmError::UnexpectedToken {
            line,
            token: other.text(),
        }),
        None => Err(AsmError::MissingArgument {
            line,
            opcode: opcode.mnemonic(),
            expected: "a name",
        }),
    }
}

/// Check that there are no extra tokens.
fn expect_end(remaining: &[Token<'_>], line: usize) -> Result<(), AsmError> {
    match remaining.first() {
        Some(tok) => Err(AsmError::UnexpectedToken {
            line,
            token: tok.text(),
        }),
        None => Ok(()),
    }
}
