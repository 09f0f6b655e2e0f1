//! Structured successors and structured block ordering.
//!
//! Structured control flow carries more than the terminator edges: a loop or
//! selection header also declares where the construct merges and, for loops,
//! where the continue block is. The structured successor relation puts those
//! declared targets *before* the real branch targets, which makes the reverse
//! post-order over it — the structured order — visit every construct's body
//! before its merge block while still visiting dominators first. Passes that
//! must process constructs inside-out or respect structured nesting walk this
//! order instead of the plain reverse post-order.

use std::collections::HashMap;

use crate::{
    cfg::{
        graph::Cfg,
        traversal::{reverse_postorder, Successors},
    },
    ir::{BlockId, Function},
};

/// Cached structured successor lists.
///
/// The lists are valid for exactly one function and one graph generation;
/// any structural mutation of the [`Cfg`] bumps the generation and forces a
/// rebuild on next use. The cache makes repeated ordering queries over an
/// unchanged graph cheap without ever serving stale edges.
#[derive(Debug)]
pub(crate) struct StructuredCache {
    /// Function the cached lists describe, if any.
    func: Option<u32>,
    /// Graph generation the lists were built at.
    generation: u64,
    /// Label → structured successors, duplicates preserved.
    succs: HashMap<BlockId, Vec<BlockId>>,
}

impl StructuredCache {
    pub(crate) fn new() -> Self {
        Self {
            func: None,
            generation: 0,
            succs: HashMap::new(),
        }
    }
}

/// Successor relation over cached structured successor lists.
struct StructuredEdges<'a> {
    succs: &'a HashMap<BlockId, Vec<BlockId>>,
}

impl Successors for StructuredEdges<'_> {
    fn successors(&self, block: BlockId) -> Vec<BlockId> {
        self.succs.get(&block).cloned().unwrap_or_default()
    }
}

impl Cfg {
    /// Returns the structured successors of `label` within `func`,
    /// rebuilding the cache if the graph changed since the last query.
    ///
    /// For a real block the list is: the merge target (if declared), then
    /// the continue target (if declared), then the terminator targets in
    /// edge order. A label that is both declared and branched to appears
    /// once per role. The pseudo-entry's structured successors are the
    /// function's blocks with no real predecessor, in layout order.
    ///
    /// # Panics
    ///
    /// Panics if `label` is neither a block of `func` nor the pseudo-entry.
    pub fn structured_successors(&mut self, func: &Function, label: BlockId) -> &[BlockId] {
        self.ensure_structured(func);
        self.structured
            .succs
            .get(&label)
            .unwrap_or_else(|| panic!("structured_successors: block {label} is not in function"))
    }

    /// Computes the structured order of `func` starting at `root`: the
    /// reverse post-order over the structured successor relation.
    ///
    /// Starting at [`Cfg::PSEUDO_ENTRY`] covers every block with no real
    /// predecessor, including blocks unreachable over terminator edges;
    /// starting at the function's entry covers only its reachable region.
    /// In the returned order a construct's header precedes its body and its
    /// merge block follows every block of the body.
    ///
    /// # Panics
    ///
    /// Panics if `root` was never registered.
    pub fn compute_structured_order(&mut self, func: &Function, root: BlockId) -> Vec<BlockId> {
        assert!(
            self.contains(root),
            "structured order: root block {root} is not registered"
        );
        self.ensure_structured(func);
        let graph = StructuredEdges {
            succs: &self.structured.succs,
        };
        reverse_postorder(&graph, root)
    }

    /// Rebuilds the structured successor lists for `func` unless the cache
    /// already holds them for the current generation.
    fn ensure_structured(&mut self, func: &Function) {
        if self.structured.func == Some(func.id()) && self.structured.generation == self.generation
        {
            return;
        }

        let mut succs: HashMap<BlockId, Vec<BlockId>> = HashMap::new();

        // Pseudo-entry reaches every block with no real predecessor, so the
        // structured order can cover blocks no terminator edge leads to.
        let roots: Vec<BlockId> = func
            .blocks()
            .iter()
            .map(crate::ir::BasicBlock::label)
            .filter(|&label| self.has_no_real_preds(label))
            .collect();
        succs.insert(Self::PSEUDO_ENTRY, roots);

        for blk in func.blocks() {
            succs.insert(blk.label(), blk.edge_labels());
        }

        self.structured.func = Some(func.id());
        self.structured.generation = self.generation;
        self.structured.succs = succs;
    }

    /// Returns `true` if every predecessor of `label` is the pseudo-entry
    /// (or the list is empty).
    fn has_no_real_preds(&self, label: BlockId) -> bool {
        self.preds(label).iter().all(|&p| p == Self::PSEUDO_ENTRY)
    }
}
