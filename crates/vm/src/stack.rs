//! The operand stack.
//!
//! A growable LIFO of [`Value`]s. Every operation checks its precondition
//! before touching the stack, so a failed operation leaves it unchanged.

use nvm_common::Value;

/// Raised when an operation needs more values than the stack holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underflow;

/// LIFO working memory of the VM. The top is the last element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperandStack {
    values: Vec<Value>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Contents from bottom to top.
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, Underflow> {
        self.values.pop().ok_or(Underflow)
    }

    /// Pop the top two values as `(a, b)`, where `b` was on top.
    pub fn pop_pair(&mut self) -> Result<(Value, Value), Underflow> {
        self.require(2)?;
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }

    /// Pop the top value and drop it.
    pub fn discard(&mut self) -> Result<(), Underflow> {
        self.pop().map(drop)
    }

    /// Push a copy of the top value.
    pub fn duplicate(&mut self) -> Result<(), Underflow> {
        let top = self.peek().cloned().ok_or(Underflow)?;
        self.values.push(top);
        Ok(())
    }

    /// Swap the top two values.
    pub fn rotate_two(&mut self) -> Result<(), Underflow> {
        let n = self.require(2)?;
        self.values.swap(n - 1, n - 2);
        Ok(())
    }

    /// Move the top value down to third position, lifting the second and
    /// third values up one slot: `[.., c, b, a]` becomes `[.., a, c, b]`.
    pub fn rotate_three(&mut self) -> Result<(), Underflow> {
        let n = self.require(3)?;
        self.values[n - 3..].rotate_right(1);
        Ok(())
    }

    fn require(&self, count: usize) -> Result<usize, Underflow> {
        let n = self.values.len();
        if n < count {
            Err(Underflow)
        } else {
            Ok(n)
        }
    }
}
