//! Structural pass: function and block nesting, duplicate definitions.
//!
//! Each function body is checked as its own unit: blocks opened inside a
//! body must be closed inside it, and LEAVE_BLOCK may only close blocks the
//! same body opened. The top-level program is treated the same way.

use std::collections::HashMap;

use nvm_common::Instruction;

use crate::error::ValidationError;

/// One body being scanned: the program itself or an open function.
#[derive(Debug, Clone, Copy)]
struct Body {
    /// Offset of FN_START, `None` for the top level.
    start: Option<usize>,
    open_blocks: usize,
}

/// Run the structural pass over decoded instructions.
///
/// `len` is the buffer length, used as the offset for problems that are
/// only visible at the end of the stream.
pub fn check_structural(instrs: &[(usize, Instruction<'_>)], len: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut defined: HashMap<&str, usize> = HashMap::new();
    let mut bodies = vec![Body {
        start: None,
        open_blocks: 0,
    }];

    for &(at, instr) in instrs {
        match instr {
            Instruction::FnStart(name) => {
                if let Some(&first) = defined.get(name) {
                    errors.push(ValidationError::DuplicateFunction {
                        at,
                        name: name.to_string(),
                        first,
                    });
                } else {
                    defined.insert(name, at);
                }
                bodies.push(Body {
                    start: Some(at),
                    open_blocks: 0,
                });
            }
            Instruction::FnEnd => {
                let current = bodies.len() - 1;
                if bodies[current].start.is_none() {
                    errors.push(ValidationError::StrayFunctionEnd { at });
                    continue;
                }
                if bodies[current].open_blocks > 0 {
                    errors.push(ValidationError::UnbalancedBlock { at });
                }
                bodies.pop();
            }
            Instruction::EnterBlock => {
                if let Some(body) = bodies.last_mut() {
                    body.open_blocks += 1;
                }
            }
            Instruction::LeaveBlock => {
                if let Some(body) = bodies.last_mut() {
                    if body.open_blocks == 0 {
                        errors.push(ValidationError::UnbalancedBlock { at });
                    } else {
                        body.open_blocks -= 1;
                    }
                }
            }
            _ => {}
        }
    }

    // Innermost first, so offsets descend like the nesting unwinds.
    while let Some(body) = bodies.pop() {
        match body.start {
            Some(at) => errors.push(ValidationError::UnterminatedFunction { at }),
            None if body.open_blocks > 0 => {
                errors.push(ValidationError::UnbalancedBlock { at: len })
            }
            None => {}
        }
    }

    errors
}
