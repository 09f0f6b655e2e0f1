//! Functions: ordered block sequences owning their blocks.
//!
//! A [`Function`] is both the layout order of its blocks (the order the
//! frontend emitted and the order output emission walks) and the per-function
//! arena the CFG resolves labels against. The arena keeps a label → index
//! side table so lookups are O(1) while iteration stays in layout order.

use std::collections::HashMap;

use crate::{
    ir::{BasicBlock, BlockId},
    Error, Result,
};

/// Labels reserved for the CFG's pseudo boundary blocks.
const RESERVED_LABELS: [u32; 2] = [0, u32::MAX];

/// A function: an ordered sequence of basic blocks, owned and indexed by label.
///
/// The first block in layout order is the function's entry block. Blocks are
/// added, inserted, and removed by label; the function maintains the
/// label → index mapping internally so external code never holds positional
/// indices that could be invalidated by edits.
///
/// # Examples
///
/// ```rust
/// use blockflow::ir::{BasicBlock, BlockId, Function, Terminator};
///
/// let mut func = Function::new(1);
/// func.add_block(BasicBlock::new(
///     BlockId::new(2),
///     Terminator::Branch { target: BlockId::new(3) },
/// ))?;
/// func.add_block(BasicBlock::new(BlockId::new(3), Terminator::Return))?;
///
/// assert_eq!(func.block_count(), 2);
/// assert_eq!(func.entry().unwrap().label(), BlockId::new(2));
/// # Ok::<(), blockflow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Function {
    /// Numeric function id, unique within the module.
    id: u32,
    /// Blocks in layout order. The first block is the entry.
    blocks: Vec<BasicBlock>,
    /// Label → position in `blocks`.
    label_to_index: HashMap<BlockId, usize>,
}

impl Function {
    /// Creates a new empty function with the given id.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            blocks: Vec::new(),
            label_to_index: HashMap::new(),
        }
    }

    /// Creates a new function with pre-allocated block capacity.
    #[must_use]
    pub fn with_capacity(id: u32, block_capacity: usize) -> Self {
        Self {
            id,
            blocks: Vec::with_capacity(block_capacity),
            label_to_index: HashMap::with_capacity(block_capacity),
        }
    }

    /// Returns the function's numeric id.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Appends a block at the end of the layout order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateLabel`] if a block with the same label is
    /// already present, or [`Error::ReservedLabel`] if the label is one of
    /// the pseudo boundary labels (`0`, `u32::MAX`).
    pub fn add_block(&mut self, block: BasicBlock) -> Result<()> {
        self.check_label(block.label())?;
        self.label_to_index.insert(block.label(), self.blocks.len());
        self.blocks.push(block);
        Ok(())
    }

    /// Inserts a block directly after the block labeled `after`.
    ///
    /// Used by the loop header splitter, which must keep the new header
    /// adjacent to its preheader in layout order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateLabel`] / [`Error::ReservedLabel`] as for
    /// [`add_block`](Self::add_block), or [`Error::GraphError`] if `after`
    /// names no block in this function.
    pub fn insert_after(&mut self, after: BlockId, block: BasicBlock) -> Result<()> {
        self.check_label(block.label())?;
        let Some(&index) = self.label_to_index.get(&after) else {
            return Err(Error::GraphError(format!(
                "Function {}: no block {after} to insert after",
                self.id
            )));
        };
        self.blocks.insert(index + 1, block);
        self.reindex(index + 1);
        Ok(())
    }

    /// Removes and returns the block with the given label, if present.
    ///
    /// The caller is responsible for forgetting the block in any CFG that
    /// still references it before dropping the returned value.
    pub fn remove_block(&mut self, label: BlockId) -> Option<BasicBlock> {
        let index = self.label_to_index.remove(&label)?;
        let block = self.blocks.remove(index);
        self.reindex(index);
        Some(block)
    }

    /// Returns the block with the given label, if present.
    #[must_use]
    pub fn block(&self, label: BlockId) -> Option<&BasicBlock> {
        self.label_to_index
            .get(&label)
            .map(|&index| &self.blocks[index])
    }

    /// Returns a mutable reference to the block with the given label.
    pub fn block_mut(&mut self, label: BlockId) -> Option<&mut BasicBlock> {
        self.label_to_index
            .get(&label)
            .map(|&index| &mut self.blocks[index])
    }

    /// Returns `true` if a block with the given label is present.
    #[must_use]
    pub fn contains(&self, label: BlockId) -> bool {
        self.label_to_index.contains_key(&label)
    }

    /// Returns the function's entry block: the first block in layout order.
    #[must_use]
    pub fn entry(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    /// Returns the blocks in layout order.
    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the function has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the highest label used by any block, if the function is
    /// non-empty. Modules use this to seed their fresh-label bound.
    #[must_use]
    pub fn max_label(&self) -> Option<BlockId> {
        self.label_to_index.keys().max().copied()
    }

    fn check_label(&self, label: BlockId) -> Result<()> {
        if RESERVED_LABELS.contains(&label.value()) {
            return Err(Error::ReservedLabel(label));
        }
        if self.label_to_index.contains_key(&label) {
            return Err(Error::DuplicateLabel(label));
        }
        Ok(())
    }

    /// Rebuilds `label_to_index` for positions `from..`, after an insert or
    /// removal shifted them.
    fn reindex(&mut self, from: usize) {
        for (index, block) in self.blocks.iter().enumerate().skip(from) {
            self.label_to_index.insert(block.label(), index);
        }
    }
}
