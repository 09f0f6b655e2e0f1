use thiserror::Error;

use crate::ir::BlockId;

/// The generic error type covering every failure this library can surface.
///
/// All variants describe *structural* problems in the input IR that are
/// detected while the control flow graph is being constructed or a block is
/// being registered. The graph never repairs such input; it reports the
/// problem and leaves the caller to fix the upstream representation.
///
/// Precondition violations on queries and mutations (for example asking for
/// the predecessors of a block that was never registered) are not represented
/// here — they panic, because a degraded answer would corrupt every pass that
/// trusts the graph. See the `# Panics` sections on the individual methods.
///
/// # Examples
///
/// ```rust
/// use blockflow::{Cfg, Error};
/// use blockflow::ir::{BasicBlock, BlockId, Function, Module, Terminator};
///
/// let mut func = Function::new(1);
/// func.add_block(BasicBlock::new(
///     BlockId::new(2),
///     Terminator::Branch { target: BlockId::new(99) },
/// ))?;
///
/// let mut module = Module::new();
/// module.add_function(func);
///
/// match Cfg::new(&module) {
///     Err(Error::UnknownTarget { block, target }) => {
///         eprintln!("{block} branches to unregistered {target}");
///     }
///     other => panic!("expected an unknown-target error, got {other:?}"),
/// }
/// # Ok::<(), blockflow::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Two live blocks were registered under the same label.
    ///
    /// Labels are unique within a module; re-registering the *same* block is
    /// a permitted last-write-wins overwrite, but a second distinct block
    /// under an existing label at construction time is a malformed module.
    #[error("Duplicate block label {0}")]
    DuplicateLabel(BlockId),

    /// A terminator or merge declaration names a label with no registered block.
    ///
    /// Every branch target, merge target, and continue target must resolve
    /// to a block that is currently part of the module. This is checked once
    /// all blocks have been registered, so forward references within a
    /// function are fine.
    #[error("Block {block} targets unregistered label {target}")]
    UnknownTarget {
        /// The block whose terminator or merge declaration is at fault.
        block: BlockId,
        /// The label that did not resolve.
        target: BlockId,
    },

    /// A block was created with a label reserved for the pseudo boundary nodes.
    ///
    /// Label `0` is the pseudo-entry and `u32::MAX` is the pseudo-exit; real
    /// blocks must use labels strictly between the two.
    #[error("Label {0} is reserved for a pseudo boundary block")]
    ReservedLabel(BlockId),

    /// Generic error for miscellaneous graph failures.
    #[error("{0}")]
    GraphError(String),
}

/// Convenience alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;
