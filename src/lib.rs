//! # Ordered multisets on a chained B+ tree
//!
//! `bplus-chain` provides [`BPlusTree`], an in-memory ordered multiset meant
//! as a building block for indexes and ordered sets.  Every level of the tree
//! is a doubly linked chain in ascending order and each branch owns a
//! contiguous run of the chain below it, so splits and merges only move run
//! boundaries.  Insertion, removal, exact lookup, lower and upper bounds all
//! take O(log n) steps; iteration walks the leaf chain.
//!
//! The element order is any [`Compare`] implementation: [`Natural`] for
//! `Ord` types, or a closure.
//!
//! Structural changes (splits, merges, level growth and collapse) are
//! reported as `tracing` events at the `trace` level.

mod compare;
pub use compare::{Compare, Natural};

mod error;
pub use error::{Error, InvariantViolation, Result};

pub mod bptree;
pub use bptree::{BPlusTree, Cursor, IntoIter, Iter, Position};

/// Fan-out used by [`BPlusTree::new`].
pub const DEFAULT_FANOUT: usize = 8;
