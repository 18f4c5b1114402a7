//! Function table and the pre-run scan that builds it.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use nvm_common::{Instruction, Instructions};
use tracing::debug;

use crate::error::RuntimeError;

/// A function located by the pre-run scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Name declared by FN_START.
    pub name: String,
    /// Offset of the FN_START instruction.
    pub start: usize,
    /// Offset of the first body instruction (just past the name).
    pub body_offset: usize,
    /// Offset just past the matching FN_END.
    pub end: usize,
}

/// Name → entry point map. Built once before execution, read-only after.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    by_name: IndexMap<String, FunctionInfo>,
    /// FN_START offset → offset past its FN_END, for skipping inline bodies.
    ends: HashMap<usize, usize>,
}

impl FunctionTable {
    /// Scan a full buffer (header included) for function definitions.
    ///
    /// Definitions may appear anywhere and may nest; every FN_START is
    /// registered. Nothing is executed. A second definition of a name is
    /// rejected rather than silently shadowing the first.
    pub fn scan(bytes: &[u8]) -> Result<Self, RuntimeError> {
        let mut table = FunctionTable::default();
        let mut open: Vec<(&str, usize, usize)> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for item in Instructions::new(bytes) {
            let (at, instr) = item?;
            match instr {
                Instruction::FnStart(name) => {
                    // Checked on entry so nested redefinitions report the inner one.
                    if !seen.insert(name) {
                        return Err(RuntimeError::DuplicateFunction {
                            at,
                            name: name.to_string(),
                        });
                    }
                    open.push((name, at, at + instr.encoded_len()));
                }
                Instruction::FnEnd => {
                    // A stray FN_END is reported when (and if) it executes.
                    if let Some((name, start, body_offset)) = open.pop() {
                        table.register(FunctionInfo {
                            name: name.to_string(),
                            start,
                            body_offset,
                            end: at + 1,
                        });
                    }
                }
                _ => {}
            }
        }

        if let Some(&(name, start, _)) = open.last() {
            return Err(RuntimeError::UnterminatedFunction {
                at: start,
                name: name.to_string(),
            });
        }

        debug!(functions = table.len(), "function table built");
        Ok(table)
    }

    fn register(&mut self, info: FunctionInfo) {
        debug!(function = %info.name, body = info.body_offset, "function registered");
        self.ends.insert(info.start, info.end);
        self.by_name.insert(info.name.clone(), info);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionInfo> {
        self.by_name.get(name)
    }

    /// Where linear execution resumes after skipping the function whose
    /// FN_START is at `start`.
    pub fn end_of(&self, start: usize) -> Option<usize> {
        self.ends.get(&start).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Functions in the order their definitions close.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionInfo> {
        self.by_name.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nvm_common::Program;

    fn bytes(instrs: &[Instruction<'_>]) -> Vec<u8> {
        Program::from_instructions(instrs).unwrap().encode()
    }

    #[test]
    fn empty_program_has_no_functions() {
        let table = FunctionTable::scan(&bytes(&[])).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn records_body_offset_after_name() {
        // header(3) + LOAD_CONST(5) = 8; FN_START "double" is 8 bytes wide.
        let code = bytes(&[
            Instruction::LoadConst(5),
            Instruction::FnStart("double"),
            Instruction::Dup,
            Instruction::BinaryAdd,
            Instruction::FnEnd,
        ]);
        let table = FunctionTable::scan(&code).unwrap();
        let f = table.get("double").unwrap();
        assert_eq!(f.start, 8);
        assert_eq!(f.body_offset, 16);
        assert_eq!(f.end, 19);
        assert_eq!(table.end_of(8), Some(19));
        assert_eq!(code.len(), 19);
    }

    #[test]
    fn finds_functions_anywhere() {
        let code = bytes(&[
            Instruction::FnStart("a"),
            Instruction::FnEnd,
            Instruction::LoadConst(1),
            Instruction::FnStart("b"),
            Instruction::FnEnd,
            Instruction::Discard,
        ]);
        let table = FunctionTable::scan(&code).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get("a").is_some());
        assert!(table.get("b").is_some());
    }

    #[test]
    fn nested_definitions_are_registered() {
        let code = bytes(&[
            Instruction::FnStart("outer"),
            Instruction::FnStart("inner"),
            Instruction::FnEnd,
            Instruction::FnEnd,
        ]);
        let table = FunctionTable::scan(&code).unwrap();
        let outer = table.get("outer").unwrap();
        let inner = table.get("inner").unwrap();
        assert!(outer.start < inner.start && inner.end < outer.end);
        assert_eq!(outer.end, code.len());
    }

    #[test]
    fn name_bytes_are_not_mistaken_for_opcodes() {
        // "\r" is 0x0D, the FN_END byte.
        let code = bytes(&[
            Instruction::FnStart("f"),
            Instruction::LoadName("\r"),
            Instruction::FnEnd,
        ]);
        let table = FunctionTable::scan(&code).unwrap();
        assert_eq!(table.get("f").unwrap().end, code.len());
    }

    #[test]
    fn duplicate_names_rejected() {
        let code = bytes(&[
            Instruction::FnStart("f"),
            Instruction::FnEnd,
            Instruction::FnStart("f"),
            Instruction::FnEnd,
        ]);
        assert_eq!(
            FunctionTable::scan(&code).unwrap_err(),
            RuntimeError::DuplicateFunction {
                at: 7,
                name: "f".to_string()
            }
        );
    }

    #[test]
    fn nested_duplicate_reports_inner_definition() {
        // Outer FN_START "f" at 3 (3 bytes wide), inner one at 6.
        let code = bytes(&[
            Instruction::FnStart("f"),
            Instruction::FnStart("f"),
            Instruction::FnEnd,
            Instruction::FnEnd,
        ]);
        assert_eq!(
            FunctionTable::scan(&code).unwrap_err(),
            RuntimeError::DuplicateFunction {
                at: 6,
                name: "f".to_string()
            }
        );
    }

    #[test]
    fn unterminated_function_rejected() {
        let code = bytes(&[Instruction::FnStart("f"), Instruction::Dup]);
        assert_eq!(
            FunctionTable::scan(&code).unwrap_err(),
            RuntimeError::UnterminatedFunction {
                at: 3,
                name: "f".to_string()
            }
        );
    }

    #[test]
    fn decode_errors_surface() {
        let code = vec![0, 0, 1, 0x0B, 0x42];
        assert_eq!(
            FunctionTable::scan(&code).unwrap_err(),
            RuntimeError::UnknownOpcode { at: 4, byte: 0x42 }
        );
    }
}
