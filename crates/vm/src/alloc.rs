//! Pluggable allocation accounting.
//!
//! The VM asks an [`AllocationStrategy`] before every growth of its
//! working memory and tells it about every release. The default,
//! [`SystemAllocation`], never refuses and leaves real allocation to the
//! global allocator. [`Budget`] caps the number of live resources, which is
//! how tests (and hosts that want a bound on runaway recursion) provoke
//! [`RuntimeError::AllocationFailure`](crate::RuntimeError::AllocationFailure).

use std::fmt;

/// The kinds of VM memory the strategy is consulted about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// One slot of the operand stack.
    StackSlot,
    /// One name binding in a block.
    Binding,
    /// One lexical block on the scope chain.
    Block,
    /// One frame on the call stack.
    CallFrame,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::StackSlot => "stack slot",
            Resource::Binding => "binding",
            Resource::Block => "block",
            Resource::CallFrame => "call frame",
        })
    }
}

/// Decides whether the VM may grow a resource.
pub trait AllocationStrategy: fmt::Debug {
    /// Called before one unit of `resource` is allocated. Returning `false`
    /// refuses the allocation and halts the run.
    fn reserve(&mut self, resource: Resource) -> bool;

    /// Called after `count` units of `resource` were released.
    fn release(&mut self, _resource: Resource, _count: usize) {}
}

/// Defers to the global allocator; never refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocation;

impl AllocationStrategy for SystemAllocation {
    fn reserve(&mut self, _resource: Resource) -> bool {
        true
    }
}

/// Caps the number of simultaneously live resources.
#[derive(Debug, Clone)]
pub struct Budget {
    limit: usize,
    live: usize,
    only: Option<Resource>,
}

impl Budget {
    /// Allow at most `limit` live resources of any kind.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            live: 0,
            only: None,
        }
    }

    /// Allow at most `limit` live units of `resource`; other kinds are
    /// unrestricted.
    pub fn only(resource: Resource, limit: usize) -> Self {
        Self {
            limit,
            live: 0,
            only: Some(resource),
        }
    }

    /// Number of live resources currently counted against the budget.
    pub fn live(&self) -> usize {
        self.live
    }

    fn counts(&self, resource: Resource) -> bool {
        self.only.map_or(true, |only| only == resource)
    }
}

impl AllocationStrategy for Budget {
    fn reserve(&mut self, resource: Resource) -> bool {
        if !self.counts(resource) {
            return true;
        }
        if self.live >= self.limit {
            return false;
        }
        self.live += 1;
        true
    }

    fn release(&mut self, resource: Resource, count: usize) {
        if self.counts(resource) {
            self.live = self.live.saturating_sub(count);
        }
    }
}
