//! The scope chain: a stack of lexical blocks holding name bindings.
//!
//! Blocks live in an index-addressed arena owned by the chain. A block's
//! parent link is the [`BlockId`] of the block that was current when it was
//! entered. Blocks are entered and left in strict LIFO order, so the arena
//! only ever grows or shrinks at its end, and dropping the chain drops
//! every binding at once.
//!
//! The main block (`BlockId::MAIN`) is created with the chain and can never
//! be left.

use indexmap::IndexMap;
use nvm_common::Value;

/// Index of a block in the scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

impl BlockId {
    /// The top-level program body.
    pub const MAIN: BlockId = BlockId(0);
}

/// `leave` was called with only the main block open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unbalanced;

#[derive(Debug, Clone, Default)]
struct Block {
    bindings: IndexMap<String, Value>,
    parent: Option<BlockId>,
}

/// Stack of lexical blocks. Lookups walk from the current block outward.
#[derive(Debug, Clone)]
pub struct ScopeChain {
    blocks: Vec<Block>,
}

impl ScopeChain {
    /// A chain holding only the main block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::default()],
        }
    }

    /// The innermost open block.
    pub fn current(&self) -> BlockId {
        BlockId(self.blocks.len() - 1)
    }

    /// Number of open blocks, main included.
    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    /// Open a new empty block parented to the current one.
    pub fn enter(&mut self) -> BlockId {
        let parent = self.current();
        self.blocks.push(Block {
            bindings: IndexMap::new(),
            parent: Some(parent),
        });
        self.current()
    }

    /// Close the current block, dropping its bindings.
    ///
    /// Returns how many bindings were released.
    pub fn leave(&mut self) -> Result<usize, Unbalanced> {
        if self.blocks.len() == 1 {
            return Err(Unbalanced);
        }
        let block = self.blocks.pop().ok_or(Unbalanced)?;
        Ok(block.bindings.len())
    }

    /// Bind `name` in the current block only, replacing any binding of the
    /// same name there. Outer blocks are never modified.
    ///
    /// Returns `true` if a new binding was created.
    pub fn store(&mut self, name: &str, value: Value) -> bool {
        let current = self.current().0;
        let bindings = &mut self.blocks[current].bindings;
        match bindings.get_mut(name) {
            Some(slot) => {
                *slot = value;
                false
            }
            None => {
                bindings.insert(name.to_owned(), value);
                true
            }
        }
    }

    /// Whether the current block itself binds `name`.
    pub fn binds(&self, name: &str) -> bool {
        self.blocks[self.current().0].bindings.contains_key(name)
    }

    /// Find `name`, searching the current block and then its ancestors.
    pub fn load(&self, name: &str) -> Option<&Value> {
        let mut cursor = Some(self.current());
        while let Some(id) = cursor {
            let block = &self.blocks[id.0];
            if let Some(value) = block.bindings.get(name) {
                return Some(value);
            }
            cursor = block.parent;
        }
        None
    }

    /// Bindings held across every open block.
    pub fn binding_count(&self) -> usize {
        self.blocks.iter().map(|block| block.bindings.len()).sum()
    }

    /// Bindings of one block, in insertion order.
    pub fn bindings(&self, id: BlockId) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.blocks
            .get(id.0)
            .into_iter()
            .flat_map(|block| block.bindings.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_main_only() {
        let chain = ScopeChain::new();
        assert_eq!(chain.current(), BlockId::MAIN);
        assert_eq!(chain.depth(), 1);
    }

    #[test]
    fn main_block_cannot_be_left() {
        let mut chain = ScopeChain::new();
        assert_eq!(chain.leave(), Err(Unbalanced));
        assert_eq!(chain.depth(), 1);
    }

    #[test]
    fn store_then_load() {
        let mut chain = ScopeChain::new();
        assert!(chain.store("x", Value::Int(7)));
        assert_eq!(chain.load("x"), Some(&Value::Int(7)));
    }

    #[test]
    fn overwrite_in_same_block() {
        let mut chain = ScopeChain::new();
        assert!(chain.store("x", Value::Int(1)));
        assert!(!chain.store("x", Value::Int(2)));
        assert_eq!(chain.load("x"), Some(&Value::Int(2)));
    }

    #[test]
    fn binds_checks_current_block_only() {
        let mut chain = ScopeChain::new();
        chain.store("x", Value::Int(1));
        chain.enter();
        assert!(!chain.binds("x"));
        chain.store("x", Value::Int(2));
        assert!(chain.binds("x"));
    }

    #[test]
    fn inner_block_sees_outer_bindings() {
        let mut chain = ScopeChain::new();
        chain.store("x", Value::Int(1));
        chain.enter();
        assert_eq!(chain.load("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn shadowing_does_not_touch_outer() {
        let mut chain = ScopeChain::new();
        chain.store("x", Value::Int(1));
        chain.enter();
        assert!(chain.store("x", Value::Int(2)));
        assert_eq!(chain.load("x"), Some(&Value::Int(2)));
        assert_eq!(chain.leave(), Ok(1));
        assert_eq!(chain.load("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn inner_bindings_vanish_on_leave() {
        let mut chain = ScopeChain::new();
        chain.enter();
        chain.store("y", Value::Int(3));
        chain.leave().unwrap();
        assert_eq!(chain.load("y"), None);
    }

    #[test]
    fn bindings_iterate_in_insertion_order() {
        let mut chain = ScopeChain::new();
        chain.store("b", Value::Int(2));
        chain.store("a", Value::Int(1));
        let names: Vec<_> = chain.bindings(BlockId::MAIN).map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
