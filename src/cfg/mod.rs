//! Control flow graph construction, maintenance, and ordering queries.
//!
//! This module implements the CFG layer of the optimizer: the incrementally
//! maintained [`Cfg`] over a module's basic blocks, and the queries passes
//! run against it.
//!
//! # Key Components
//!
//! - [`Cfg`] - The graph itself: predecessor edge table, pseudo boundary
//!   blocks, traversals, reachability, structured ordering, and loop header
//!   splitting
//!
//! # Edge Model
//!
//! The graph stores only the *inverse* adjacency: for each block, the list
//! of predecessor labels in insertion order. Successors are always read
//! straight from a block's terminator and merge declaration, so they can
//! never go stale. Parallel edges are kept as duplicate predecessor entries;
//! removal takes one occurrence at a time.
//!
//! Two synthetic blocks bound the graph: a pseudo-entry preceding every
//! block with no real predecessor, and a pseudo-exit succeeding every block
//! whose terminator names no successor. They are owned by the [`Cfg`] and
//! never appear inside any function.
//!
//! # Orderings
//!
//! Plain post-order and reverse post-order walk the real terminator edges.
//! The structured order walks the structured successor relation instead —
//! merge and continue targets before branch targets — which visits every
//! construct's body before its merge block. See
//! [`Cfg::compute_structured_order`].
//!
//! # Examples
//!
//! ```rust
//! use blockflow::Cfg;
//! use blockflow::ir::{BasicBlock, BlockId, Function, MergeDecl, Module, Terminator};
//!
//! // if (1) { 2 } else { 3 } merging at 4
//! let mut func = Function::new(1);
//! let mut header = BasicBlock::new(
//!     BlockId::new(1),
//!     Terminator::BranchConditional {
//!         true_target: BlockId::new(2),
//!         false_target: BlockId::new(3),
//!     },
//! );
//! header.set_merge(Some(MergeDecl::Selection { merge: BlockId::new(4) }));
//! func.add_block(header)?;
//! func.add_block(BasicBlock::new(
//!     BlockId::new(2),
//!     Terminator::Branch { target: BlockId::new(4) },
//! ))?;
//! func.add_block(BasicBlock::new(
//!     BlockId::new(3),
//!     Terminator::Branch { target: BlockId::new(4) },
//! ))?;
//! func.add_block(BasicBlock::new(BlockId::new(4), Terminator::Return))?;
//!
//! let mut module = Module::new();
//! module.add_function(func);
//!
//! let mut cfg = Cfg::new(&module)?;
//! let func = module.function(1).unwrap();
//! let order = cfg.compute_structured_order(func, BlockId::new(1));
//!
//! // The merge block comes after both arms of the selection.
//! assert_eq!(order.last(), Some(&BlockId::new(4)));
//! # Ok::<(), blockflow::Error>(())
//! ```

mod graph;
mod split;
mod structured;
mod traversal;

pub use graph::Cfg;
