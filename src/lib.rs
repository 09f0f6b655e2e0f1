// Copyright 2026 blockflow contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # blockflow
//!
//! Control flow graph layer for optimizing structured bytecode modules.
//! `blockflow` maintains the predecessor edge table, boundary nodes, block
//! orderings, and loop header splitting that optimization passes over a
//! structured SSA-style IR rely on.
//!
//! ## Features
//!
//! - **Incremental edge table** - Predecessor lists are maintained through
//!   targeted register/forget/add/remove operations instead of full rebuilds
//! - **Pseudo boundary blocks** - A synthetic entry and exit give every
//!   traversal a single root and sink, whatever the function's shape
//! - **Iterative traversals** - Post-order and reverse post-order walks use
//!   an explicit work stack, safe for arbitrarily deep graphs
//! - **Structured ordering** - A dedicated order that visits a construct's
//!   body before its merge block, driven by merge/continue declarations
//! - **Loop header splitting** - In-place preheader creation that keeps
//!   every edge from outside the loop untouched
//!
//! ## Quick Start
//!
//! Add `blockflow` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! blockflow = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use blockflow::prelude::*;
//!
//! let mut func = Function::new(1);
//! func.add_block(BasicBlock::new(
//!     BlockId::new(2),
//!     Terminator::Branch { target: BlockId::new(3) },
//! ))?;
//! func.add_block(BasicBlock::new(BlockId::new(3), Terminator::Return))?;
//!
//! let mut module = Module::new();
//! module.add_function(func);
//!
//! let cfg = Cfg::new(&module)?;
//! assert_eq!(cfg.preds(BlockId::new(3)), &[BlockId::new(2)]);
//! # Ok::<(), blockflow::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `blockflow` is organized into two layers plus shared error handling:
//!
//! - [`ir`] - The structured-IR surface the graph consumes: blocks,
//!   terminators, merge declarations, functions, and modules
//! - [`cfg`] - The graph itself: edge bookkeeping, traversals, reachability,
//!   structured ordering, and loop header splitting
//! - [`Error`] and [`Result`] - Error handling for construction-time
//!   structural validation
//!
//! The graph holds no references into the IR. Blocks are identified by
//! label and resolved against a caller-supplied [`ir::Module`], so passes
//! can interleave IR edits with targeted graph updates without invalidating
//! anything they hold.

pub mod cfg;
pub mod ir;
pub mod prelude;

mod error;

pub use cfg::Cfg;
pub use error::{Error, Result};
