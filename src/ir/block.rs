//! Basic blocks, terminators and structured merge declarations.
//!
//! A [`BasicBlock`] is the unit the CFG indexes: a numeric label, the
//! [`Terminator`] naming the block's branch targets, and — when the block
//! heads a structured construct — a [`MergeDecl`] naming the construct's
//! merge block and, for loops, its continue block.
//!
//! # Label Space
//!
//! Labels are `u32` values unique within a module. Two labels are reserved
//! for the CFG's synthetic boundary nodes: `0` (pseudo-entry) and `u32::MAX`
//! (pseudo-exit). Real blocks must use labels strictly between the two; the
//! [`Function`](crate::ir::Function) arena rejects reserved labels.

use std::fmt;

use strum::Display;

/// A strongly-typed numeric label identifying a basic block within a module.
///
/// `BlockId` wraps a `u32`, providing type safety to prevent accidental
/// mixing of block labels with other integer values. Labels are assigned by
/// the frontend that produced the module; fresh labels for synthesized
/// blocks come from [`Module::fresh_label`](crate::ir::Module::fresh_label).
///
/// # Examples
///
/// ```rust
/// use blockflow::ir::BlockId;
///
/// let label = BlockId::new(5);
/// assert_eq!(label.value(), 5);
/// assert_eq!(label.to_string(), "b5");
/// ```
///
/// # Thread Safety
///
/// `BlockId` is [`Copy`], [`Send`], and [`Sync`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    /// Creates a new `BlockId` from a raw label value.
    ///
    /// # Arguments
    ///
    /// * `label` - The raw numeric label
    #[must_use]
    #[inline]
    pub const fn new(label: u32) -> Self {
        BlockId(label)
    }

    /// Returns the raw numeric label.
    #[must_use]
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl From<u32> for BlockId {
    #[inline]
    fn from(label: u32) -> Self {
        BlockId(label)
    }
}

impl From<BlockId> for u32 {
    #[inline]
    fn from(label: BlockId) -> Self {
        label.0
    }
}

/// The control transfer ending a basic block.
///
/// A terminator names zero, one, or more successor labels depending on its
/// kind. The variant name (rendered by [`Display`](fmt::Display)) is used in
/// diagnostics and DOT output.
///
/// # Target Order
///
/// [`target_labels`](Terminator::target_labels) yields targets in declared
/// order: the single target for a branch, then-target before else-target for
/// a conditional, and default before the cases for a switch. The CFG's edge
/// table and traversals rely on this order being stable.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Terminator {
    /// Unconditional branch to a single successor.
    Branch {
        /// The branch target.
        target: BlockId,
    },
    /// Two-way branch on a condition computed earlier in the block.
    BranchConditional {
        /// Target when the condition holds.
        true_target: BlockId,
        /// Target when the condition does not hold.
        false_target: BlockId,
    },
    /// Multi-way branch over an integer selector.
    Switch {
        /// Target when no case matches.
        default: BlockId,
        /// `(selector value, target)` pairs in declared order.
        cases: Vec<(i32, BlockId)>,
    },
    /// Return from the function. Names no successors.
    Return,
    /// Abnormal termination (trap/kill). Names no successors.
    Unreachable,
}

impl Terminator {
    /// Returns the successor labels this terminator names, in declared order.
    ///
    /// The list may contain duplicates when several arms share a target; the
    /// CFG preserves that multiplicity in its predecessor lists.
    #[must_use]
    pub fn target_labels(&self) -> Vec<BlockId> {
        match self {
            Terminator::Branch { target } => vec![*target],
            Terminator::BranchConditional {
                true_target,
                false_target,
            } => vec![*true_target, *false_target],
            Terminator::Switch { default, cases } => {
                let mut targets = Vec::with_capacity(1 + cases.len());
                targets.push(*default);
                targets.extend(cases.iter().map(|(_, t)| *t));
                targets
            }
            Terminator::Return | Terminator::Unreachable => Vec::new(),
        }
    }

    /// Rewrites every occurrence of `old` among this terminator's targets to
    /// `new`, returning how many targets were rewritten.
    ///
    /// Used by the loop header splitter to retarget back edges.
    pub fn replace_target(&mut self, old: BlockId, new: BlockId) -> usize {
        let mut replaced = 0;
        let mut swap = |t: &mut BlockId| {
            if *t == old {
                *t = new;
                replaced += 1;
            }
        };
        match self {
            Terminator::Branch { target } => swap(target),
            Terminator::BranchConditional {
                true_target,
                false_target,
            } => {
                swap(true_target);
                swap(false_target);
            }
            Terminator::Switch { default, cases } => {
                swap(default);
                for (_, t) in cases.iter_mut() {
                    swap(t);
                }
            }
            Terminator::Return | Terminator::Unreachable => {}
        }
        replaced
    }
}

/// A structured-construct declaration carried by a header block.
///
/// Selection constructs declare their merge block; loop constructs declare
/// both the merge block (the loop's single exit) and the continue block (the
/// back-edge target). The CFG registers declared targets as edges alongside
/// the terminator's real branch targets, and the structured successor
/// builder orders them first so depth-first search respects block nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecl {
    /// Header of a selection (if/switch) construct.
    Selection {
        /// The construct's merge block.
        merge: BlockId,
    },
    /// Header of a loop construct.
    Loop {
        /// The loop's merge block (single exit).
        merge: BlockId,
        /// The loop's continue block (back-edge target).
        continue_target: BlockId,
    },
}

impl MergeDecl {
    /// Returns the declared merge block.
    #[must_use]
    pub const fn merge_target(&self) -> BlockId {
        match self {
            MergeDecl::Selection { merge } | MergeDecl::Loop { merge, .. } => *merge,
        }
    }

    /// Returns the declared continue block, for loop headers only.
    #[must_use]
    pub const fn continue_target(&self) -> Option<BlockId> {
        match self {
            MergeDecl::Selection { .. } => None,
            MergeDecl::Loop {
                continue_target, ..
            } => Some(*continue_target),
        }
    }

    /// Returns `true` if this is a loop declaration.
    #[must_use]
    pub const fn is_loop(&self) -> bool {
        matches!(self, MergeDecl::Loop { .. })
    }
}

/// A basic block: a label, a terminator, and an optional merge declaration.
///
/// The CFG layer treats the instructions between block entry and terminator
/// as opaque; only the control surface modeled here matters for edge
/// bookkeeping and ordering.
///
/// # Examples
///
/// ```rust
/// use blockflow::ir::{BasicBlock, BlockId, MergeDecl, Terminator};
///
/// let mut header = BasicBlock::new(
///     BlockId::new(2),
///     Terminator::Branch { target: BlockId::new(3) },
/// );
/// header.set_merge(Some(MergeDecl::Loop {
///     merge: BlockId::new(5),
///     continue_target: BlockId::new(4),
/// }));
///
/// assert!(header.is_loop_header());
/// assert_eq!(header.merge_target(), Some(BlockId::new(5)));
/// // Declared targets come first, then the terminator's real targets.
/// assert_eq!(
///     header.edge_labels(),
///     vec![BlockId::new(5), BlockId::new(4), BlockId::new(3)],
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    /// The block's label, unique within its module.
    label: BlockId,
    /// The control transfer ending the block.
    terminator: Terminator,
    /// Structured-construct declaration, present on header blocks only.
    merge: Option<MergeDecl>,
}

impl BasicBlock {
    /// Creates a new block with the given label and terminator.
    #[must_use]
    pub const fn new(label: BlockId, terminator: Terminator) -> Self {
        Self {
            label,
            terminator,
            merge: None,
        }
    }

    /// Returns the block's label.
    #[must_use]
    pub const fn label(&self) -> BlockId {
        self.label
    }

    /// Returns the block's terminator.
    #[must_use]
    pub const fn terminator(&self) -> &Terminator {
        &self.terminator
    }

    /// Returns a mutable reference to the block's terminator.
    pub fn terminator_mut(&mut self) -> &mut Terminator {
        &mut self.terminator
    }

    /// Replaces the block's terminator, returning the previous one.
    pub fn replace_terminator(&mut self, terminator: Terminator) -> Terminator {
        std::mem::replace(&mut self.terminator, terminator)
    }

    /// Returns the block's merge declaration, if it heads a construct.
    #[must_use]
    pub const fn merge(&self) -> Option<&MergeDecl> {
        self.merge.as_ref()
    }

    /// Sets or clears the block's merge declaration.
    pub fn set_merge(&mut self, merge: Option<MergeDecl>) {
        self.merge = merge;
    }

    /// Removes and returns the block's merge declaration.
    pub fn take_merge(&mut self) -> Option<MergeDecl> {
        self.merge.take()
    }

    /// Returns the declared merge block, if any.
    #[must_use]
    pub fn merge_target(&self) -> Option<BlockId> {
        self.merge.as_ref().map(MergeDecl::merge_target)
    }

    /// Returns the declared continue block, if this is a loop header.
    #[must_use]
    pub fn continue_target(&self) -> Option<BlockId> {
        self.merge.as_ref().and_then(MergeDecl::continue_target)
    }

    /// Returns `true` if this block declares a loop construct.
    #[must_use]
    pub fn is_loop_header(&self) -> bool {
        self.merge.as_ref().is_some_and(MergeDecl::is_loop)
    }

    /// Returns the terminator's real branch targets, in declared order.
    #[must_use]
    pub fn successor_labels(&self) -> Vec<BlockId> {
        self.terminator.target_labels()
    }

    /// Applies `f` to each of the terminator's real branch targets.
    pub fn for_each_successor_label(&self, mut f: impl FnMut(BlockId)) {
        for target in self.terminator.target_labels() {
            f(target);
        }
    }

    /// Returns every label this block names as an edge target: the declared
    /// merge and continue targets first (if present), then the terminator's
    /// real targets.
    ///
    /// This is the label set the CFG's edge table registers for the block.
    /// Duplicates are preserved — a merge target that is also a real branch
    /// target appears twice, and edge removal relies on that multiplicity.
    #[must_use]
    pub fn edge_labels(&self) -> Vec<BlockId> {
        let mut labels = Vec::new();
        if let Some(merge) = &self.merge {
            labels.push(merge.merge_target());
            if let Some(cont) = merge.continue_target() {
                labels.push(cont);
            }
        }
        labels.extend(self.terminator.target_labels());
        labels
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.terminator)?;
        match &self.merge {
            Some(MergeDecl::Selection { merge }) => write!(f, " [merge {merge}]"),
            Some(MergeDecl::Loop {
                merge,
                continue_target,
            }) => write!(f, " [merge {merge}, continue {continue_target}]"),
            None => Ok(()),
        }
    }
}
