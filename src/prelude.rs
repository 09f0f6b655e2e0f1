//! # blockflow Prelude
//!
//! This module provides a convenient prelude for the most commonly used
//! types from the blockflow library. Import this module to get quick access
//! to everything needed to build a module and query its control flow graph.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all blockflow operations
pub use crate::Error;

/// The result type used throughout blockflow
pub use crate::Result;

// ================================================================================================
// Main Entry Point
// ================================================================================================

/// The control flow graph over a module's basic blocks
pub use crate::Cfg;

// ================================================================================================
// IR Surface
// ================================================================================================

/// Basic block: label, terminator, optional merge declaration
pub use crate::ir::BasicBlock;

/// Strongly-typed block label
pub use crate::ir::BlockId;

/// Structured selection/loop declaration carried by header blocks
pub use crate::ir::MergeDecl;

/// The control transfer ending a block
pub use crate::ir::Terminator;

/// Ordered block sequence owning its blocks
pub use crate::ir::Function;

/// Function collection and fresh-label authority
pub use crate::ir::Module;
