//! VM state: operand stack, scope chain, call stack, function table.

use std::fmt::Write as _;

use nvm_common::{Value, Version, HEADER_LEN};
use tracing::debug;

use crate::alloc::Resource;
use crate::config::VmConfig;
use crate::error::RuntimeError;
use crate::functions::FunctionTable;
use crate::scope::{BlockId, ScopeChain};
use crate::stack::{OperandStack, Underflow};

/// Saved caller state for one active CALL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// Name of the function being executed.
    pub function: String,
    /// Offset of the instruction after the CALL.
    pub return_ip: usize,
    /// Scope that was current at the call site.
    pub saved_scope: BlockId,
    /// Block opened for the callee's locals.
    pub callee_scope: BlockId,
}

/// The NVM virtual machine.
///
/// A `Vm` borrows its bytecode buffer for its whole life and owns
/// everything else. Loading runs the pre-run function scan; [`Vm::run`]
/// drives the dispatch loop to completion.
#[derive(Debug)]
pub struct Vm<'a> {
    /// Full buffer, header included. Offsets index into it directly.
    pub(crate) bytes: &'a [u8],
    pub(crate) version: Version,
    pub(crate) stack: OperandStack,
    pub(crate) scopes: ScopeChain,
    pub(crate) functions: FunctionTable,
    pub(crate) call_stack: Vec<CallFrame>,
    /// Offset of the next instruction to fetch.
    pub(crate) ip: usize,
    /// Offset of the instruction being executed.
    pub(crate) at: usize,
    pub(crate) config: VmConfig,
}

impl<'a> Vm<'a> {
    /// Load a buffer with the default configuration.
    pub fn load(bytes: &'a [u8]) -> Result<Self, RuntimeError> {
        Self::with_config(bytes, VmConfig::default())
    }

    /// Load a buffer: read the version header and build the function table.
    pub fn with_config(bytes: &'a [u8], config: VmConfig) -> Result<Self, RuntimeError> {
        let version = Version::read(bytes)?;
        if config.strict_version && !version.is_compatible_with(&Version::CURRENT) {
            return Err(RuntimeError::UnsupportedVersion {
                found: version,
                expected: Version::CURRENT,
            });
        }
        debug!(%version, len = bytes.len(), "loading bytecode");

        let functions = FunctionTable::scan(bytes)?;

        Ok(Self {
            bytes,
            version,
            stack: OperandStack::new(),
            scopes: ScopeChain::new(),
            functions,
            call_stack: Vec::new(),
            ip: HEADER_LEN,
            at: HEADER_LEN,
            config,
        })
    }

    /// Version from the buffer's header.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Current operand stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        self.stack.as_slice()
    }

    /// Functions found by the pre-run scan.
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Number of functions currently executing.
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Bindings visible in the main block.
    pub fn globals(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.scopes.bindings(BlockId::MAIN)
    }

    /// Operand stack as text, one `item on stack: N` line per value from
    /// bottom to top.
    pub fn format_stack(&self) -> String {
        let mut out = String::new();
        for value in self.stack.as_slice() {
            let _ = writeln!(out, "item on stack: {value}");
        }
        out
    }

    /// Hand every live resource back to the strategy and rewind to the
    /// first instruction with an empty stack and only the main block.
    pub(crate) fn reset(&mut self) {
        self.release(Resource::StackSlot, self.stack.len());
        self.release(Resource::Binding, self.scopes.binding_count());
        self.release(Resource::Block, self.scopes.depth() - 1);
        self.release(Resource::CallFrame, self.call_stack.len());
        self.stack = OperandStack::new();
        self.scopes = ScopeChain::new();
        self.call_stack.clear();
        self.ip = HEADER_LEN;
        self.at = HEADER_LEN;
    }

    // ---- Accounting ----

    pub(crate) fn reserve(&mut self, resource: Resource) -> Result<(), RuntimeError> {
        if self.config.allocation.reserve(resource) {
            Ok(())
        } else {
            Err(RuntimeError::AllocationFailure {
                at: self.at,
                resource,
            })
        }
    }

    pub(crate) fn release(&mut self, resource: Resource, count: usize) {
        if count > 0 {
            self.config.allocation.release(resource, count);
        }
    }

    // ---- Operand stack ----

    pub(crate) fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        self.reserve(Resource::StackSlot)?;
        self.stack.push(value);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Value, RuntimeError> {
        let value = self.stack.pop().map_err(|e| self.underflow(e))?;
        self.release(Resource::StackSlot, 1);
        Ok(value)
    }

    /// Pop `(a, b)` with `b` the former top.
    pub(crate) fn pop_ints(&mut self) -> Result<(i32, i32), RuntimeError> {
        let (a, b) = self.stack.pop_pair().map_err(|e| self.underflow(e))?;
        self.release(Resource::StackSlot, 2);
        Ok((int(a), int(b)))
    }

    pub(crate) fn underflow(&self, _: Underflow) -> RuntimeError {
        RuntimeError::StackUnderflow { at: self.at }
    }
}

fn int(value: Value) -> i32 {
    match value {
        Value::Int(n) => n,
    }
}
