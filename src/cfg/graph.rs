//! Control flow graph implementation.
//!
//! This module provides the main [`Cfg`] structure: the incrementally
//! maintained edge table, the pseudo boundary blocks, and the traversal and
//! reachability queries built on top of them.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::{
    cfg::{
        structured::StructuredCache,
        traversal::{postorder, RealEdges},
    },
    ir::{BasicBlock, BlockId, Function, Module, Terminator},
    Error, Result,
};

/// Handle naming the function that owns a registered block.
///
/// The CFG stores handles instead of references, so nothing dangles when a
/// block is forgotten or its function is edited; lookups resolve the handle
/// against a caller-supplied [`Module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHandle {
    /// Id of the owning function.
    pub(crate) func: u32,
}

/// A control flow graph over a module's basic blocks.
///
/// The CFG maintains, incrementally, the predecessor lists of every
/// registered block plus two synthetic boundary blocks: a pseudo-entry with
/// an edge to every block that has no real predecessor, and a pseudo-exit
/// with an edge from every block whose terminator names no successor. The
/// boundary blocks give every traversal and every dominance-style algorithm
/// a single root and single sink regardless of how many disconnected entry
/// points or early-exit blocks a function has.
///
/// # Construction
///
/// Build a CFG once per module with [`Cfg::new`]. Passes that rewrite the
/// module afterwards keep the graph consistent through the targeted
/// mutation primitives ([`register_block`](Cfg::register_block),
/// [`forget_block`](Cfg::forget_block), [`add_edge`](Cfg::add_edge),
/// [`remove_edge`](Cfg::remove_edge),
/// [`remove_non_existing_edges`](Cfg::remove_non_existing_edges)) instead of
/// rebuilding from scratch.
///
/// # Preconditions
///
/// Queries and mutations require their block arguments to be registered.
/// Violations panic rather than returning a degraded answer, because a
/// silently empty or stale result would corrupt every downstream pass that
/// trusts the graph.
///
/// # Examples
///
/// ```rust
/// use blockflow::Cfg;
/// use blockflow::ir::{BasicBlock, BlockId, Function, Module, Terminator};
///
/// let mut func = Function::new(1);
/// func.add_block(BasicBlock::new(
///     BlockId::new(2),
///     Terminator::Branch { target: BlockId::new(3) },
/// ))?;
/// func.add_block(BasicBlock::new(BlockId::new(3), Terminator::Return))?;
///
/// let mut module = Module::new();
/// module.add_function(func);
///
/// let cfg = Cfg::new(&module)?;
/// assert_eq!(cfg.preds(BlockId::new(3)), &[BlockId::new(2)]);
/// # Ok::<(), blockflow::Error>(())
/// ```
#[derive(Debug)]
pub struct Cfg {
    /// Synthetic block preceding every block with no real predecessor.
    pseudo_entry: BasicBlock,
    /// Synthetic block succeeding every block whose terminator names no
    /// successor.
    pseudo_exit: BasicBlock,
    /// Label → owning-function handle, one entry per registered block.
    label2block: HashMap<BlockId, BlockHandle>,
    /// Label → predecessor labels in insertion order. Parallel edges appear
    /// as duplicate entries and must not be de-duplicated: edge removal
    /// relies on the multiplicity.
    label2preds: HashMap<BlockId, Vec<BlockId>>,
    /// Structured successor cache, valid for one function and one
    /// generation at a time.
    pub(crate) structured: StructuredCache,
    /// Bumped by every structural mutation; stale cache tags force rebuilds.
    pub(crate) generation: u64,
}

impl Cfg {
    /// Label of the pseudo-entry block.
    pub const PSEUDO_ENTRY: BlockId = BlockId(0);
    /// Label of the pseudo-exit block.
    pub const PSEUDO_EXIT: BlockId = BlockId(u32::MAX);

    /// Builds the CFG for every function in `module`.
    ///
    /// Registers each block, records predecessor edges for every label its
    /// terminator or merge declaration names (registration also gives each
    /// block whose terminator names no successor its single edge to the
    /// pseudo-exit), then wires pseudo-entry → each block with an empty
    /// predecessor list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateLabel`] if two functions carry blocks with
    /// the same label, or [`Error::UnknownTarget`] if any terminator or
    /// merge declaration names a label with no block in the module.
    pub fn new(module: &Module) -> Result<Self> {
        let mut cfg = Self {
            pseudo_entry: BasicBlock::new(Self::PSEUDO_ENTRY, Terminator::Unreachable),
            pseudo_exit: BasicBlock::new(Self::PSEUDO_EXIT, Terminator::Unreachable),
            label2block: HashMap::new(),
            label2preds: HashMap::from([
                (Self::PSEUDO_ENTRY, Vec::new()),
                (Self::PSEUDO_EXIT, Vec::new()),
            ]),
            structured: StructuredCache::new(),
            generation: 0,
        };

        for func in module.functions() {
            for blk in func.blocks() {
                if cfg.label2block.contains_key(&blk.label()) {
                    return Err(Error::DuplicateLabel(blk.label()));
                }
                cfg.register_block(func.id(), blk);
            }
        }

        // All blocks are in; every named target must now resolve.
        for func in module.functions() {
            for blk in func.blocks() {
                for target in blk.edge_labels() {
                    if !cfg.label2block.contains_key(&target) {
                        return Err(Error::UnknownTarget {
                            block: blk.label(),
                            target,
                        });
                    }
                }
            }
        }

        // Registration already recorded each successor-less block's single
        // edge to the pseudo-exit; only the entry side is wired here.
        for func in module.functions() {
            for blk in func.blocks() {
                if cfg.label2preds[&blk.label()].is_empty() {
                    cfg.add_edge(Self::PSEUDO_ENTRY, blk.label());
                }
            }
        }

        Ok(cfg)
    }

    /// Returns the pseudo-entry block.
    #[must_use]
    pub const fn pseudo_entry_block(&self) -> &BasicBlock {
        &self.pseudo_entry
    }

    /// Returns the pseudo-exit block.
    #[must_use]
    pub const fn pseudo_exit_block(&self) -> &BasicBlock {
        &self.pseudo_exit
    }

    /// Returns `true` if `label` names the pseudo-entry block.
    #[must_use]
    pub fn is_pseudo_entry_block(&self, label: BlockId) -> bool {
        label == Self::PSEUDO_ENTRY
    }

    /// Returns `true` if `label` names the pseudo-exit block.
    #[must_use]
    pub fn is_pseudo_exit_block(&self, label: BlockId) -> bool {
        label == Self::PSEUDO_EXIT
    }

    /// Returns `true` if `label` is known to the graph: a registered block,
    /// a pseudo boundary block, or a block that has received edges.
    #[must_use]
    pub fn contains(&self, label: BlockId) -> bool {
        self.label2preds.contains_key(&label)
    }

    /// Returns the predecessor labels of `label`, in insertion order.
    ///
    /// The list may be empty, and it may contain duplicates when the graph
    /// has parallel edges.
    ///
    /// # Panics
    ///
    /// Panics if `label` was never registered — callers must register a
    /// block before querying it.
    #[must_use]
    pub fn preds(&self, label: BlockId) -> &[BlockId] {
        self.label2preds
            .get(&label)
            .unwrap_or_else(|| panic!("preds: block {label} is not registered"))
    }

    /// Resolves a registered block against its owning function in `module`.
    ///
    /// # Panics
    ///
    /// Panics if `label` is not a registered block, or the owning function
    /// no longer contains it (a forgotten-before-removed bookkeeping error
    /// in the caller). The pseudo boundary blocks are not resolved here; use
    /// [`pseudo_entry_block`](Self::pseudo_entry_block) /
    /// [`pseudo_exit_block`](Self::pseudo_exit_block).
    #[must_use]
    pub fn block<'m>(&self, module: &'m Module, label: BlockId) -> &'m BasicBlock {
        self.try_block(module, label)
            .unwrap_or_else(|| panic!("block: {label} is not a registered block"))
    }

    /// Returns the id of the function owning `label`, if registered.
    pub(crate) fn owner(&self, label: BlockId) -> Option<u32> {
        self.label2block.get(&label).map(|handle| handle.func)
    }

    /// Resolves `label` to its block, or `None` if it is not registered or
    /// its function no longer holds it.
    pub(crate) fn try_block<'m>(
        &self,
        module: &'m Module,
        label: BlockId,
    ) -> Option<&'m BasicBlock> {
        let handle = self.label2block.get(&label)?;
        module.function(handle.func)?.block(label)
    }

    /// Registers `blk`, owned by the function with id `func`, and records a
    /// predecessor edge for every label the block's terminator or merge
    /// declaration names.
    ///
    /// Re-registering the same identity overwrites the previous handle (last
    /// write wins); callers must not register two live blocks under the same
    /// label.
    pub fn register_block(&mut self, func: u32, blk: &BasicBlock) {
        self.label2block.insert(blk.label(), BlockHandle { func });
        self.label2preds.entry(blk.label()).or_default();
        self.add_edges(blk);
    }

    /// Removes every trace of `blk` from the graph: its identity entry, its
    /// own predecessor list, and the edges it contributed to each of its
    /// successors' predecessor lists.
    ///
    /// The pseudo boundary blocks cannot be forgotten.
    ///
    /// # Panics
    ///
    /// Panics if `blk` is a pseudo boundary block.
    pub fn forget_block(&mut self, blk: &BasicBlock) {
        assert!(
            !self.is_pseudo_entry_block(blk.label()) && !self.is_pseudo_exit_block(blk.label()),
            "forget_block: cannot forget pseudo block {}",
            blk.label()
        );
        self.label2block.remove(&blk.label());
        self.label2preds.remove(&blk.label());
        self.remove_successor_edges(blk);
        self.touch();
    }

    /// Records `blk` as a predecessor of every label its terminator or
    /// merge declaration names. A block whose terminator names no successor
    /// gets exactly one edge to the pseudo-exit instead.
    pub fn add_edges(&mut self, blk: &BasicBlock) {
        for target in blk.edge_labels() {
            self.add_edge(blk.label(), target);
        }
        if blk.successor_labels().is_empty() {
            self.add_edge(blk.label(), Self::PSEUDO_EXIT);
        }
    }

    /// Records `pred` as a predecessor of `succ`.
    ///
    /// Parallel edges are kept as duplicate entries.
    pub fn add_edge(&mut self, pred: BlockId, succ: BlockId) {
        self.label2preds.entry(succ).or_default().push(pred);
        self.touch();
    }

    /// Removes the first occurrence of `pred` from `succ`'s predecessor
    /// list, if present.
    ///
    /// With parallel edges, one call removes one occurrence; repeat the call
    /// to remove more. Removing from an unknown `succ` is a no-op.
    pub fn remove_edge(&mut self, pred: BlockId, succ: BlockId) {
        if let Some(preds) = self.label2preds.get_mut(&succ) {
            if let Some(position) = preds.iter().position(|&p| p == pred) {
                preds.remove(position);
                self.touch();
            }
        }
    }

    /// Removes the edges leaving `blk` from every successor's predecessor
    /// list, covering both terminator targets and merge declaration targets
    /// (the same label set [`add_edges`](Self::add_edges) records).
    pub fn remove_successor_edges(&mut self, blk: &BasicBlock) {
        for target in blk.edge_labels() {
            self.remove_edge(blk.label(), target);
        }
        if blk.successor_labels().is_empty() {
            self.remove_edge(blk.label(), Self::PSEUDO_EXIT);
        }
    }

    /// Reconciles the predecessor list of `label` against the current state
    /// of the module, dropping every entry whose source block no longer
    /// exists or no longer names `label` as a target.
    ///
    /// Used after a terminator rewrite to avoid a full-graph rebuild. Note
    /// that a pseudo-entry edge is dropped too (the pseudo-entry names no
    /// targets); callers re-wire it if the reconciled list comes out empty
    /// and the block is a function entry point.
    ///
    /// # Panics
    ///
    /// Panics if `label` was never registered.
    pub fn remove_non_existing_edges(&mut self, module: &Module, label: BlockId) {
        assert!(
            self.label2preds.contains_key(&label),
            "remove_non_existing_edges: block {label} is not registered"
        );
        let kept: Vec<BlockId> = self.label2preds[&label]
            .iter()
            .copied()
            .filter(|&pred| {
                self.try_block(module, pred)
                    .is_some_and(|blk| blk.edge_labels().contains(&label))
            })
            .collect();
        self.label2preds.insert(label, kept);
        self.touch();
    }

    /// Applies `visit` to every block reachable from `start` over real
    /// terminator edges, in depth-first post-order: a block is delivered
    /// only after all of its reachable successors have been delivered.
    ///
    /// # Panics
    ///
    /// Panics if `start` was never registered.
    pub fn for_each_block_in_post_order(
        &self,
        func: &Function,
        start: BlockId,
        mut visit: impl FnMut(&BasicBlock),
    ) {
        for label in self.post_order_labels(func, start) {
            if let Some(blk) = self.visitable(func, label) {
                visit(blk);
            }
        }
    }

    /// Applies `visit` to every block reachable from `start` over real
    /// terminator edges, in reverse post-order: the exact reverse of
    /// [`for_each_block_in_post_order`](Self::for_each_block_in_post_order)
    /// for the same snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `start` was never registered.
    pub fn for_each_block_in_reverse_post_order(
        &self,
        func: &Function,
        start: BlockId,
        mut visit: impl FnMut(&BasicBlock),
    ) {
        let mut order = self.post_order_labels(func, start);
        order.reverse();
        for label in order {
            if let Some(blk) = self.visitable(func, label) {
                visit(blk);
            }
        }
    }

    /// Returns the set of labels reachable from `start` over real
    /// terminator edges.
    ///
    /// This equals exactly the set of blocks
    /// [`for_each_block_in_post_order`](Self::for_each_block_in_post_order)
    /// visits for the same start.
    ///
    /// # Panics
    ///
    /// Panics if `start` was never registered.
    #[must_use]
    pub fn find_reachable_blocks(&self, func: &Function, start: BlockId) -> HashSet<BlockId> {
        self.post_order_labels(func, start).into_iter().collect()
    }

    /// Post-order labels from `start` over real edges, with the
    /// registration precondition checked once.
    fn post_order_labels(&self, func: &Function, start: BlockId) -> Vec<BlockId> {
        assert!(
            self.contains(start),
            "traversal: start block {start} is not registered"
        );
        postorder(&RealEdges::new(func), start)
    }

    /// Resolves a traversal label to a visitable block: a block of `func`
    /// or one of the pseudo boundary blocks.
    fn visitable<'s>(&'s self, func: &'s Function, label: BlockId) -> Option<&'s BasicBlock> {
        if self.is_pseudo_entry_block(label) {
            Some(&self.pseudo_entry)
        } else if self.is_pseudo_exit_block(label) {
            Some(&self.pseudo_exit)
        } else {
            func.block(label)
        }
    }

    /// Bumps the generation, invalidating any structured successor cache.
    pub(crate) fn touch(&mut self) {
        self.generation += 1;
    }

    /// Generates a DOT representation of the graph for debugging.
    ///
    /// Real edges are solid; merge and continue declarations are dashed;
    /// pseudo boundary edges are dotted. The pseudo-entry is filled green,
    /// the pseudo-exit red.
    #[must_use]
    pub fn to_dot(&self, module: &Module, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph cfg {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"{name}\";");
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n\n");
        dot.push_str("    entry [label=\"pseudo entry\", style=filled, fillcolor=lightgreen];\n");
        dot.push_str("    exit [label=\"pseudo exit\", style=filled, fillcolor=lightcoral];\n");

        for func in module.functions() {
            let _ = writeln!(dot, "\n    subgraph cluster_f{} {{", func.id());
            let _ = writeln!(dot, "        label=\"fn {}\";", func.id());
            for blk in func.blocks() {
                let _ = writeln!(
                    dot,
                    "        {} [label=\"{} {}\"];",
                    blk.label(),
                    blk.label(),
                    blk.terminator()
                );
            }
            dot.push_str("    }\n");
        }

        dot.push('\n');
        for func in module.functions() {
            for blk in func.blocks() {
                blk.for_each_successor_label(|target| {
                    let _ = writeln!(dot, "    {} -> {};", blk.label(), target);
                });
                if let Some(merge) = blk.merge_target() {
                    let _ = writeln!(
                        dot,
                        "    {} -> {merge} [style=dashed, label=\"merge\"];",
                        blk.label()
                    );
                }
                if let Some(cont) = blk.continue_target() {
                    let _ = writeln!(
                        dot,
                        "    {} -> {cont} [style=dashed, label=\"continue\"];",
                        blk.label()
                    );
                }
                if self
                    .label2preds
                    .get(&blk.label())
                    .is_some_and(|p| p.contains(&Self::PSEUDO_ENTRY))
                {
                    let _ = writeln!(dot, "    entry -> {} [style=dotted];", blk.label());
                }
            }
        }
        for pred in &self.label2preds[&Self::PSEUDO_EXIT] {
            let _ = writeln!(dot, "    {pred} -> exit [style=dotted];");
        }

        dot.push_str("}\n");
        dot
    }
}
