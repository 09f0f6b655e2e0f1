//! Modules: the unit of CFG construction.
//!
//! A [`Module`] owns its functions and tracks the label bound used to hand
//! out fresh labels for blocks synthesized during optimization (for example
//! by the loop header splitter).

use crate::ir::{BlockId, Function};

/// A module: a collection of functions sharing one label space.
///
/// Block labels are unique across the whole module, so the module is the
/// authority for allocating new ones. The bound starts one past the highest
/// label seen in any added function and only grows.
///
/// # Examples
///
/// ```rust
/// use blockflow::ir::{BasicBlock, BlockId, Function, Module, Terminator};
///
/// let mut func = Function::new(1);
/// func.add_block(BasicBlock::new(BlockId::new(4), Terminator::Return))?;
///
/// let mut module = Module::new();
/// module.add_function(func);
///
/// assert_eq!(module.fresh_label(), BlockId::new(5));
/// assert_eq!(module.fresh_label(), BlockId::new(6));
/// # Ok::<(), blockflow::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// Functions in declaration order.
    functions: Vec<Function>,
    /// One past the highest block label in use.
    bound: u32,
}

impl Module {
    /// Creates a new empty module.
    ///
    /// The label bound starts at `1`; label `0` is reserved for the CFG's
    /// pseudo-entry block.
    #[must_use]
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            bound: 1,
        }
    }

    /// Adds a function to the module, growing the label bound past every
    /// label the function uses.
    ///
    /// Function ids are expected to be unique within the module; lookups by
    /// id return the first match.
    pub fn add_function(&mut self, function: Function) {
        debug_assert!(
            self.function(function.id()).is_none(),
            "duplicate function id {}",
            function.id()
        );
        if let Some(max) = function.max_label() {
            self.bound = self.bound.max(max.value().saturating_add(1));
        }
        self.functions.push(function);
    }

    /// Returns the functions in declaration order.
    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Returns the function with the given id, if present.
    #[must_use]
    pub fn function(&self, id: u32) -> Option<&Function> {
        self.functions.iter().find(|f| f.id() == id)
    }

    /// Returns a mutable reference to the function with the given id.
    pub fn function_mut(&mut self, id: u32) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.id() == id)
    }

    /// Returns a fresh, never-used block label and advances the bound.
    ///
    /// # Panics
    ///
    /// Panics if the label space is exhausted (the bound would reach the
    /// pseudo-exit label `u32::MAX`).
    pub fn fresh_label(&mut self) -> BlockId {
        assert!(
            self.bound < u32::MAX,
            "block label space exhausted"
        );
        let label = BlockId::new(self.bound);
        self.bound += 1;
        label
    }

    /// Returns one past the highest block label in use.
    #[must_use]
    pub const fn bound(&self) -> u32 {
        self.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicBlock, Terminator};

    #[test]
    fn test_fresh_label_past_existing() {
        let mut func = Function::new(1);
        func.add_block(BasicBlock::new(BlockId::new(10), Terminator::Return))
            .unwrap();
        func.add_block(BasicBlock::new(BlockId::new(3), Terminator::Return))
            .unwrap();

        let mut module = Module::new();
        module.add_function(func);

        assert_eq!(module.bound(), 11);
        assert_eq!(module.fresh_label(), BlockId::new(11));
        assert_eq!(module.bound(), 12);
    }

    #[test]
    fn test_empty_module_labels_start_at_one() {
        let mut module = Module::new();
        assert_eq!(module.fresh_label(), BlockId::new(1));
    }

    #[test]
    fn test_function_lookup_by_id() {
        let mut module = Module::new();
        module.add_function(Function::new(4));
        module.add_function(Function::new(9));

        assert_eq!(module.function(9).map(Function::id), Some(9));
        assert!(module.function(5).is_none());

        module
            .function_mut(4)
            .unwrap()
            .add_block(BasicBlock::new(BlockId::new(2), Terminator::Return))
            .unwrap();
        assert_eq!(module.function(4).unwrap().block_count(), 1);
    }
}
