//! Minimal structured-IR collaborators consumed by the control flow graph.
//!
//! The CFG layer does not define a full instruction set. It consumes exactly
//! the surface the surrounding optimizer exposes for each basic block: the
//! block's numeric label, its terminator's branch targets, and — if the block
//! heads a structured construct — its declared merge and continue targets.
//! This module provides that surface.
//!
//! # Key Types
//!
//! - [`BlockId`] - Strongly-typed numeric block label, unique per module
//! - [`Terminator`] - The control transfer ending a block
//! - [`MergeDecl`] - Structured selection/loop declaration on header blocks
//! - [`BasicBlock`] - Label + terminator + optional merge declaration
//! - [`Function`] - Ordered block sequence owning its blocks, indexed by label
//! - [`Module`] - Owns functions and allocates fresh labels
//!
//! # Ownership
//!
//! Blocks are owned by their [`Function`]; functions are owned by their
//! [`Module`]. The CFG layer never stores references into this tree — it
//! holds labels and resolves them against a caller-supplied module, so no
//! handle can dangle across block removal or splitting.

mod block;
mod function;
mod module;

pub use block::{BasicBlock, BlockId, MergeDecl, Terminator};
pub use function::Function;
pub use module::Module;
