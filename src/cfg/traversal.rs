//! Depth-first traversal over block successor relations.
//!
//! This module provides the iterative post-order / reverse-post-order
//! machinery every ordering query in the CFG is built on. The traversal is
//! generic over a [`Successors`] seam so the same engine serves both the
//! real terminator edges and the structured successor lists.
//!
//! # Iteration, Not Recursion
//!
//! Block counts in real programs can exceed a safe call-stack depth, so the
//! traversal uses an explicit work stack with enter/exit states instead of
//! recursion.

use std::collections::HashSet;

use crate::ir::BlockId;

/// A successor relation over block labels.
///
/// This is the single seam between the traversal engine and its edge
/// sources. The engine only ever asks "what are the successors of this
/// label"; adapters answer from a function's terminators
/// ([`RealEdges`]) or from a structured successor cache.
pub(crate) trait Successors {
    /// Returns the successors of `block`, in edge order.
    ///
    /// The list may contain duplicates; the traversal's visited check
    /// tolerates them by skipping blocks on second sight.
    fn successors(&self, block: BlockId) -> Vec<BlockId>;
}

/// Successor relation over a function's real terminator edges.
///
/// Labels that name no block in the function (including the pseudo boundary
/// labels, which live outside every function) have no successors.
pub(crate) struct RealEdges<'a> {
    func: &'a crate::ir::Function,
}

impl<'a> RealEdges<'a> {
    pub(crate) fn new(func: &'a crate::ir::Function) -> Self {
        Self { func }
    }
}

impl Successors for RealEdges<'_> {
    fn successors(&self, block: BlockId) -> Vec<BlockId> {
        self.func
            .block(block)
            .map(crate::ir::BasicBlock::successor_labels)
            .unwrap_or_default()
    }
}

/// Computes the depth-first post-order of blocks reachable from `start`.
///
/// A block is emitted only after all of its reachable successors have been
/// emitted. Blocks unreachable from `start` never appear. Each reachable
/// block appears exactly once, regardless of parallel edges or cycles
/// (cycles are broken in first-seen order).
pub(crate) fn postorder<G: Successors>(graph: &G, start: BlockId) -> Vec<BlockId> {
    #[derive(Clone, Copy)]
    enum State {
        Enter,
        Exit,
    }

    let mut seen: HashSet<BlockId> = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![(start, State::Enter)];

    while let Some((block, state)) = stack.pop() {
        match state {
            State::Enter => {
                if !seen.insert(block) {
                    continue;
                }

                // The exit entry is processed after all children.
                stack.push((block, State::Exit));

                // Push successors in reverse so they are explored in edge order.
                let successors = graph.successors(block);
                for &succ in successors.iter().rev() {
                    if !seen.contains(&succ) {
                        stack.push((succ, State::Enter));
                    }
                }
            }
            State::Exit => {
                order.push(block);
            }
        }
    }

    order
}

/// Computes the reverse post-order of blocks reachable from `start`.
///
/// This is exactly the reverse of [`postorder`] for the same start and graph
/// snapshot — not an independent traversal — which makes it a valid
/// topological order whenever the reachable subgraph is acyclic.
pub(crate) fn reverse_postorder<G: Successors>(graph: &G, start: BlockId) -> Vec<BlockId> {
    let mut order = postorder(graph, start);
    order.reverse();
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicBlock, BlockId, Function, Terminator};

    fn branch(label: u32, target: u32) -> BasicBlock {
        BasicBlock::new(
            BlockId::new(label),
            Terminator::Branch {
                target: BlockId::new(target),
            },
        )
    }

    fn cond(label: u32, t: u32, f: u32) -> BasicBlock {
        BasicBlock::new(
            BlockId::new(label),
            Terminator::BranchConditional {
                true_target: BlockId::new(t),
                false_target: BlockId::new(f),
            },
        )
    }

    fn ret(label: u32) -> BasicBlock {
        BasicBlock::new(BlockId::new(label), Terminator::Return)
    }

    fn diamond() -> Function {
        // 1 -> {2, 3} -> 4
        let mut func = Function::new(1);
        func.add_block(cond(1, 2, 3)).unwrap();
        func.add_block(branch(2, 4)).unwrap();
        func.add_block(branch(3, 4)).unwrap();
        func.add_block(ret(4)).unwrap();
        func
    }

    #[test]
    fn test_postorder_linear() {
        let mut func = Function::new(1);
        func.add_block(branch(1, 2)).unwrap();
        func.add_block(branch(2, 3)).unwrap();
        func.add_block(ret(3)).unwrap();

        let order = postorder(&RealEdges::new(&func), BlockId::new(1));
        assert_eq!(order, vec![BlockId::new(3), BlockId::new(2), BlockId::new(1)]);
    }

    #[test]
    fn test_postorder_diamond_root_last() {
        let func = diamond();
        let order = postorder(&RealEdges::new(&func), BlockId::new(1));

        assert_eq!(order.len(), 4);
        assert_eq!(*order.last().unwrap(), BlockId::new(1));
        // The join block is emitted before both arms.
        let pos = |l: u32| order.iter().position(|&b| b == BlockId::new(l)).unwrap();
        assert!(pos(4) < pos(2));
        assert!(pos(4) < pos(3));
    }

    #[test]
    fn test_reverse_postorder_is_exact_reverse() {
        let func = diamond();
        let graph = RealEdges::new(&func);
        let mut post = postorder(&graph, BlockId::new(1));
        let rpo = reverse_postorder(&graph, BlockId::new(1));
        post.reverse();
        assert_eq!(post, rpo);
    }

    #[test]
    fn test_cycle_visited_once() {
        // 1 -> 2 -> 3 -> 2 (back edge), 3 -> 4
        let mut func = Function::new(1);
        func.add_block(branch(1, 2)).unwrap();
        func.add_block(branch(2, 3)).unwrap();
        func.add_block(cond(3, 2, 4)).unwrap();
        func.add_block(ret(4)).unwrap();

        let order = postorder(&RealEdges::new(&func), BlockId::new(1));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn test_unreachable_block_not_visited() {
        let mut func = Function::new(1);
        func.add_block(branch(1, 2)).unwrap();
        func.add_block(ret(2)).unwrap();
        func.add_block(ret(9)).unwrap(); // orphan

        let order = postorder(&RealEdges::new(&func), BlockId::new(1));
        assert!(!order.contains(&BlockId::new(9)));
    }

    #[test]
    fn test_self_loop_visited_once() {
        let mut func = Function::new(1);
        func.add_block(cond(1, 1, 2)).unwrap();
        func.add_block(ret(2)).unwrap();

        let order = postorder(&RealEdges::new(&func), BlockId::new(1));
        assert_eq!(order, vec![BlockId::new(2), BlockId::new(1)]);
    }

    #[test]
    fn test_start_from_mid_graph() {
        let func = diamond();
        let order = postorder(&RealEdges::new(&func), BlockId::new(2));
        assert_eq!(order, vec![BlockId::new(4), BlockId::new(2)]);
    }
}
