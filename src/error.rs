//! Error types.

/// Result type for the fallible constructors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported while configuring a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The fan-out must be at least one; a tree of fan-out zero could never
    /// hold a child.
    #[error("fan-out must be at least 1, got {0}")]
    InvalidFanout(usize),
}

/// A broken structural property found by
/// [`BPlusTree::check`](crate::BPlusTree::check).
///
/// Node numbers are arena slots and only mean something for the tree that
/// reported them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("leaf chain is out of order at position {position}")]
    OutOfOrder { position: usize },

    #[error("node {node} holds {len} children, expected {min}..={max}")]
    Occupancy {
        node: usize,
        len: usize,
        min: usize,
        max: usize,
    },

    #[error("chain link is broken around node {node}")]
    BrokenChain { node: usize },

    #[error("node {node} does not point back at its parent {parent}")]
    ParentMismatch { node: usize, parent: usize },

    #[error("node {node} caches a stale max-descendant")]
    StaleMax { node: usize },

    #[error("tree reports {reported} elements but holds {actual}")]
    LenMismatch { reported: usize, actual: usize },

    #[error("leftmost leaf cache is stale")]
    StaleFirst,

    #[error("level {level} mixes leaves and branches")]
    UnevenDepth { level: usize },

    #[error("{leaked} nodes are allocated but unreachable")]
    Leaked { leaked: usize },
}
