//! Loop header splitting.
//!
//! Several loop transforms need a dedicated preheader: a block that is the
//! single non-back-edge predecessor of the loop header. Splitting a header
//! produces one in place. The original block keeps its label and every edge
//! from outside the loop, so nothing outside the loop has to be rewritten; a
//! freshly labeled block takes over the header role, receiving the merge
//! declaration, the terminator, and every back edge.

use crate::{
    cfg::graph::Cfg,
    ir::{BasicBlock, BlockId, MergeDecl, Module, Terminator},
};

impl Cfg {
    /// Splits the loop header `label` into a preheader and a new header.
    ///
    /// After the split:
    ///
    /// - The block labeled `label` is the preheader. It keeps its label, its
    ///   predecessors from outside the loop, and branches unconditionally to
    ///   the new header. It carries no merge declaration.
    /// - A new block, labeled fresh from `module` and placed directly after
    ///   the preheader in layout order, is the loop header. It receives the
    ///   old header's merge declaration and terminator, and every back edge
    ///   is retargeted to it. A continue target or branch target naming the
    ///   old header (a self-loop) is rewritten to the new label.
    ///
    /// Back edges are the predecessor entries laid out at or after the
    /// header: in structured layout a loop's body follows its header, while
    /// entry edges come from earlier blocks (or the pseudo-entry). Every
    /// outside predecessor stays on the preheader, even when the loop is
    /// nested inside another loop whose back edge makes the entry block
    /// reachable from this header.
    ///
    /// The edge table is updated in place. Returns the new header's label.
    ///
    /// # Panics
    ///
    /// Panics if `label` is not a registered block or not a loop header (no
    /// loop merge declaration).
    pub fn split_loop_header(&mut self, module: &mut Module, label: BlockId) -> BlockId {
        let func_id = self
            .owner(label)
            .unwrap_or_else(|| panic!("split_loop_header: block {label} is not registered"));

        // Classify each predecessor by layout position: the loop body sits
        // at or after its header, so those entries are back edges. The
        // header's own entry (a self-loop) is excluded because that edge
        // moves with the terminator.
        let back_preds: Vec<BlockId> = {
            let func = module
                .function(func_id)
                .unwrap_or_else(|| panic!("split_loop_header: function {func_id} not in module"));
            assert!(
                func.block(label).is_some_and(BasicBlock::is_loop_header),
                "split_loop_header: block {label} is not a loop header"
            );
            let position = |l: BlockId| func.blocks().iter().position(|b| b.label() == l);
            let header_pos = position(label).unwrap_or_else(|| {
                panic!("split_loop_header: block {label} left function {func_id}")
            });
            self.preds(label)
                .iter()
                .copied()
                .filter(|&pred| {
                    pred != label && position(pred).is_some_and(|pos| pos >= header_pos)
                })
                .collect()
        };

        let new_label = module.fresh_label();
        let func = module
            .function_mut(func_id)
            .unwrap_or_else(|| panic!("split_loop_header: function {func_id} not in module"));
        let old_header = func
            .block(label)
            .unwrap_or_else(|| panic!("split_loop_header: block {label} left function {func_id}"))
            .clone();

        // Move merge declaration and terminator onto the new header,
        // rewriting self references.
        let mut terminator = old_header.terminator().clone();
        terminator.replace_target(label, new_label);
        let decl = match old_header.merge() {
            Some(MergeDecl::Loop {
                merge,
                continue_target,
            }) => Some(MergeDecl::Loop {
                merge: *merge,
                continue_target: if *continue_target == label {
                    new_label
                } else {
                    *continue_target
                },
            }),
            other => other.cloned(),
        };
        let mut new_header = BasicBlock::new(new_label, terminator);
        new_header.set_merge(decl);

        let preheader = func
            .block_mut(label)
            .unwrap_or_else(|| panic!("split_loop_header: block {label} left function {func_id}"));
        preheader.take_merge();
        preheader.replace_terminator(Terminator::Branch { target: new_label });

        func.insert_after(label, new_header)
            .unwrap_or_else(|err| panic!("split_loop_header: {err}"));

        for &pred in &back_preds {
            if let Some(blk) = func.block_mut(pred) {
                blk.terminator_mut().replace_target(label, new_label);
            }
        }

        let new_clone = func
            .block(new_label)
            .unwrap_or_else(|| panic!("split_loop_header: new header {new_label} missing"))
            .clone();
        let preheader_clone = func
            .block(label)
            .unwrap_or_else(|| panic!("split_loop_header: block {label} left function {func_id}"))
            .clone();

        // Edge table: retire the old header's out-edges, wire the new
        // header and the preheader branch, then move each back edge.
        self.remove_successor_edges(&old_header);
        self.register_block(func_id, &new_clone);
        self.add_edges(&preheader_clone);
        for &pred in &back_preds {
            self.remove_edge(pred, label);
            self.add_edge(pred, new_label);
        }

        new_label
    }
}
