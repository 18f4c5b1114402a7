//! Main execution loop and opcode dispatch for the NVM.

use nvm_common::{Instruction, Value};
use tracing::{debug, instrument, trace};

use crate::alloc::Resource;
use crate::error::RuntimeError;
use crate::machine::{CallFrame, Vm};
use crate::scope::BlockId;

impl<'a> Vm<'a> {
    /// Execute from the first instruction until the end of the buffer or
    /// the first error.
    ///
    /// On success returns the final operand stack, bottom first. The stack
    /// is left in place, so [`Vm::stack`] still shows it afterwards (and
    /// shows whatever had been pushed when a run fails). Every run starts
    /// from a fresh state, so running again replays the whole program.
    #[instrument(skip(self), fields(len = self.bytes.len(), functions = self.functions.len()))]
    pub fn run(&mut self) -> Result<Vec<Value>, RuntimeError> {
        self.reset();
        while self.ip < self.bytes.len() {
            let (instr, width) = Instruction::decode(self.bytes, self.ip)?;
            self.at = self.ip;
            self.ip += width;
            trace!(at = self.at, op = instr.opcode().mnemonic(), depth = self.stack.len());

            match instr {
                Instruction::Nop => {}

                // Stack
                Instruction::LoadConst(n) => self.push(Value::Int(n))?,
                Instruction::Discard => self.exec_discard()?,
                Instruction::Dup => self.exec_dup()?,
                Instruction::RotTwo => self.stack.rotate_two().map_err(|e| self.underflow(e))?,
                Instruction::RotThree => self.stack.rotate_three().map_err(|e| self.underflow(e))?,

                // Arithmetic
                Instruction::BinaryAdd => self.exec_binary(i32::wrapping_add)?,
                Instruction::BinarySub => self.exec_binary(i32::wrapping_sub)?,
                Instruction::BinaryMul => self.exec_binary(i32::wrapping_mul)?,
                Instruction::BinaryDiv => self.exec_div()?,

                // Names and blocks
                Instruction::Store(name) => self.exec_store(name)?,
                Instruction::LoadName(name) => self.exec_load_name(name)?,
                Instruction::EnterBlock => {
                    self.enter_block()?;
                }
                Instruction::LeaveBlock => self.exec_leave_block()?,

                // Functions
                Instruction::FnStart(name) => self.skip_function(name)?,
                Instruction::FnEnd => self.exec_fn_end()?,
                Instruction::Call(name) => self.exec_call(name)?,
            }
        }

        self.finish()
    }

    fn finish(&mut self) -> Result<Vec<Value>, RuntimeError> {
        if let Some(frame) = self.call_stack.last() {
            let at = self
                .functions
                .get(&frame.function)
                .map_or(self.bytes.len(), |f| f.start);
            return Err(RuntimeError::UnterminatedFunction {
                at,
                name: frame.function.clone(),
            });
        }
        if self.scopes.depth() > 1 {
            return Err(RuntimeError::UnbalancedBlock {
                at: self.bytes.len(),
            });
        }
        debug!(depth = self.stack.len(), "halted");
        Ok(self.stack.as_slice().to_vec())
    }

    // ---- Stack ----

    fn exec_discard(&mut self) -> Result<(), RuntimeError> {
        self.stack.discard().map_err(|e| self.underflow(e))?;
        self.release(Resource::StackSlot, 1);
        Ok(())
    }

    fn exec_dup(&mut self) -> Result<(), RuntimeError> {
        if self.stack.is_empty() {
            return Err(RuntimeError::StackUnderflow { at: self.at });
        }
        self.reserve(Resource::StackSlot)?;
        self.stack.duplicate().map_err(|e| self.underflow(e))
    }

    // ---- Arithmetic ----

    fn exec_binary(&mut self, op: fn(i32, i32) -> i32) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_ints()?;
        self.push(Value::Int(op(a, b)))
    }

    fn exec_div(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_ints()?;
        if b == 0 {
            return Err(RuntimeError::DivisionByZero { at: self.at });
        }
        self.push(Value::Int(a.wrapping_div(b)))
    }

    // ---- Names and blocks ----

    fn exec_store(&mut self, name: &str) -> Result<(), RuntimeError> {
        let value = self.pop()?;
        if !self.scopes.binds(name) {
            self.reserve(Resource::Binding)?;
        }
        self.scopes.store(name, value);
        Ok(())
    }

    fn exec_load_name(&mut self, name: &str) -> Result<(), RuntimeError> {
        let value = self
            .scopes
            .load(name)
            .cloned()
            .ok_or_else(|| RuntimeError::NameNotFound {
                at: self.at,
                name: name.to_string(),
            })?;
        self.push(value)
    }

    fn enter_block(&mut self) -> Result<BlockId, RuntimeError> {
        self.reserve(Resource::Block)?;
        Ok(self.scopes.enter())
    }

    fn leave_block(&mut self) -> Result<(), RuntimeError> {
        let released = self
            .scopes
            .leave()
            .map_err(|_| RuntimeError::UnbalancedBlock { at: self.at })?;
        self.release(Resource::Binding, released);
        self.release(Resource::Block, 1);
        Ok(())
    }

    fn exec_leave_block(&mut self) -> Result<(), RuntimeError> {
        // A callee's own block is closed by FN_END, never by LEAVE_BLOCK.
        if let Some(frame) = self.call_stack.last() {
            if self.scopes.current() == frame.callee_scope {
                return Err(RuntimeError::UnbalancedBlock { at: self.at });
            }
        }
        self.leave_block()
    }

    // ---- Functions ----

    /// Hop over a definition met during linear execution.
    fn skip_function(&mut self, name: &str) -> Result<(), RuntimeError> {
        self.ip = self
            .functions
            .end_of(self.at)
            .ok_or_else(|| RuntimeError::UnterminatedFunction {
                at: self.at,
                name: name.to_string(),
            })?;
        Ok(())
    }

    fn exec_call(&mut self, name: &str) -> Result<(), RuntimeError> {
        let body = self
            .functions
            .get(name)
            .map(|f| f.body_offset)
            .ok_or_else(|| RuntimeError::FunctionNotFound {
                at: self.at,
                name: name.to_string(),
            })?;

        self.reserve(Resource::CallFrame)?;
        let saved_scope = self.scopes.current();
        let callee_scope = match self.enter_block() {
            Ok(id) => id,
            Err(e) => {
                self.release(Resource::CallFrame, 1);
                return Err(e);
            }
        };

        debug!(function = name, at = self.at, depth = self.call_stack.len() + 1, "call");
        self.call_stack.push(CallFrame {
            function: name.to_string(),
            return_ip: self.ip,
            saved_scope,
            callee_scope,
        });
        self.ip = body;
        Ok(())
    }

    fn exec_fn_end(&mut self) -> Result<(), RuntimeError> {
        let callee_scope = match self.call_stack.last() {
            Some(frame) => frame.callee_scope,
            None => return Err(RuntimeError::StrayFunctionEnd { at: self.at }),
        };
        if self.scopes.current() != callee_scope {
            return Err(RuntimeError::UnbalancedBlock { at: self.at });
        }
        self.leave_block()?;

        let frame = self
            .call_stack
            .pop()
            .ok_or(RuntimeError::StrayFunctionEnd { at: self.at })?;
        self.release(Resource::CallFrame, 1);
        debug_assert_eq!(self.scopes.current(), frame.saved_scope);
        debug!(function = %frame.function, depth = self.call_stack.len(), "return");
        self.ip = frame.return_ip;
        Ok(())
    }
}
