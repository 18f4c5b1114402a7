//! NVM virtual machine: executes NVM bytecode buffers.
//!
//! The VM is a stack-based machine with:
//! - An operand stack of 32-bit integers
//! - A scope chain of lexical blocks holding name bindings
//! - A function table built by scanning the buffer before execution
//! - An explicit call stack, so call depth never consumes host stack
//!
//! # Usage
//!
//! ```
//! use nvm_common::{Instruction, Program, Value};
//!
//! let bytes = Program::from_instructions(&[
//!     Instruction::LoadConst(2),
//!     Instruction::LoadConst(2),
//!     Instruction::BinaryAdd,
//!     Instruction::LoadConst(2),
//!     Instruction::BinaryMul,
//! ])
//! .unwrap()
//! .encode();
//!
//! assert_eq!(nvm_vm::run(&bytes).unwrap(), vec![Value::Int(8)]);
//! ```

pub mod alloc;
pub mod config;
pub mod error;
pub mod execute;
pub mod functions;
pub mod machine;
pub mod scope;
pub mod stack;

pub use alloc::{AllocationStrategy, Budget, Resource, SystemAllocation};
pub use config::VmConfig;
pub use error::RuntimeError;
pub use functions::{FunctionInfo, FunctionTable};
pub use machine::{CallFrame, Vm};
pub use scope::{BlockId, ScopeChain};
pub use stack::OperandStack;

use nvm_common::Value;

/// Load and execute a buffer, returning the final operand stack.
///
/// This is the primary entry point for the VM. It:
/// 1. Reads the version header
/// 2. Scans the buffer for function definitions
/// 3. Executes from the first instruction to the end of the buffer
///
/// # Errors
///
/// Returns [`RuntimeError`] on the first fatal condition (stack underflow,
/// unknown name or function, unbalanced blocks, division by zero, etc.).
pub fn run(bytes: &[u8]) -> Result<Vec<Value>, RuntimeError> {
    Vm::load(bytes)?.run()
}
