use std::fmt;

use crate::compare::{Compare, Natural};
use crate::error::{Error, Result};
use crate::DEFAULT_FANOUT;

mod check;
mod cursor;
mod node;
mod rebalance;
mod search;

pub use cursor::{Cursor, IntoIter, Iter, Position};

use node::{Arena, Node, NodeId};
use search::Seek;

/// Most children a non-root branch may hold for fan-out `k`.
///
/// Branches split once they exceed it and keep `k..=max_children(k)`
/// children otherwise.  For `k == 1` the bound is raised to two so that the
/// tree can still branch.
pub const fn max_children(k: usize) -> usize {
    let max = (2 * k).saturating_sub(1);
    if max < 2 {
        2
    } else {
        max
    }
}

/// An ordered multiset stored in a B+ tree whose levels are linked chains.
///
/// Every level of the tree, leaves included, is one doubly linked sequence in
/// ascending order.  A branch owns a contiguous run of the level below it,
/// from its first child to its last, rather than an array of children, and
/// caches the rightmost leaf of its subtree to steer searches.  Splitting or
/// merging a branch moves two boundaries and re-parents only the moved
/// children.
///
/// Elements that compare equal may coexist.  A newly inserted element is
/// placed *before* every element it is equivalent to, so equivalent elements
/// iterate most-recent-first.
///
/// The tree is move-only; it cannot be cloned.  `std::mem::take` leaves an
/// empty tree behind.
///
/// # Examples
/// ```
/// use bplus_chain::BPlusTree;
///
/// let mut t = BPlusTree::with_fanout(2).unwrap();
/// for i in 1..=5 {
///     t.insert(i);
/// }
///
/// assert!(t.iter().eq([1, 2, 3, 4, 5].iter()));
/// assert_eq!(t.lower_bound(&3).get(), Some(&3));
/// assert_eq!(t.upper_bound(&3).get(), Some(&4));
/// assert_eq!(t.find(&6), t.end());
/// ```
pub struct BPlusTree<T, C = Natural> {
    nodes: Arena<T>,
    // the root's single child; a leaf, a branch, or nothing when empty
    root: Option<NodeId>,
    // leftmost leaf
    first: Option<NodeId>,
    len: usize,
    fanout: usize,
    cmp: C,
}

impl<T> BPlusTree<T> {
    /// Creates an empty tree with the default fan-out, ordered by `Ord`.
    ///
    /// # Examples
    /// ```
    /// use bplus_chain::BPlusTree;
    ///
    /// let t: BPlusTree<u32> = BPlusTree::new();
    /// assert!(t.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::from_parts(DEFAULT_FANOUT, Natural)
    }

    /// Creates an empty tree, ordered by `Ord`, whose non-root branches hold
    /// between `fanout` and `2 * fanout - 1` children.
    ///
    /// Fails with [`Error::InvalidFanout`] when `fanout` is zero.
    pub fn with_fanout(fanout: usize) -> Result<Self> {
        Self::with_fanout_and_compare(fanout, Natural)
    }
}

impl<T, C> BPlusTree<T, C> {
    /// Creates an empty tree with the given fan-out and element order.
    pub fn with_fanout_and_compare(fanout: usize, cmp: C) -> Result<Self> {
        if fanout == 0 {
            return Err(Error::InvalidFanout(fanout));
        }
        Ok(Self::from_parts(fanout, cmp))
    }

    fn from_parts(fanout: usize, cmp: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            first: None,
            len: 0,
            fanout,
            cmp,
        }
    }

    /// Iterator positioned at the least element, or the end if empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(&self.nodes, self.first)
    }

    /// Removes every element.  The fan-out and order are kept.
    pub fn clear(&mut self) {
        tracing::debug!(len = self.len, "clearing tree");
        self.reset();
    }

    // drop the whole structure at once rather than node by node
    fn reset(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.first = None;
        self.len = 0;
    }

    /// The past-the-end iterator.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(&self.nodes, None)
    }

    /// The fan-out the tree was built with.
    pub fn fanout(&self) -> usize {
        self.fanout
    }

    /// Returns the least element.
    ///
    /// # Examples
    /// ```
    /// use bplus_chain::BPlusTree;
    ///
    /// let t = BPlusTree::<_>::from_iter([100, 0, 35, 104]);
    /// assert_eq!(t.first(), Some(&0));
    /// ```
    pub fn first(&self) -> Option<&T> {
        self.first.map(|id| self.nodes.elem(id))
    }

    /// Number of levels, counting the leaves; zero for an empty tree.
    pub fn height(&self) -> usize {
        let mut ht = 0;
        let mut curr = self.root;
        while let Some(id) = curr {
            ht += 1;
            curr = match &self.nodes[id].body {
                node::Body::Branch(span) => Some(span.first),
                node::Body::Leaf(_) => None,
            };
        }
        ht
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.nodes, self.first, Some(self.len))
    }

    /// Returns the greatest element, the root's max-descendant.
    pub fn last(&self) -> Option<&T> {
        self.root.map(|id| self.nodes.elem(self.nodes.max_leaf(id)))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Removes the element at `pos` and returns it.
    ///
    /// The end position is a no-op.  `pos` must come from this tree and its
    /// element must not have been removed since; a stale position is not
    /// detected and may name another element or nothing at all.
    ///
    /// # Examples
    /// ```
    /// use bplus_chain::BPlusTree;
    ///
    /// let mut t = BPlusTree::<_>::from_iter([1, 2, 3]);
    /// let pos = t.upper_bound(&1).position();
    /// assert_eq!(t.remove_at(pos), Some(2));
    /// assert_eq!(t.remove_at(t.end().position()), None);
    /// assert!(t.iter().eq([1, 3].iter()));
    /// ```
    pub fn remove_at(&mut self, pos: Position) -> Option<T> {
        let leaf = pos.node()?;
        if !self.nodes.get(leaf)?.is_leaf() {
            return None;
        }

        Some(self.remove_leaf(leaf))
    }

    fn remove_leaf(&mut self, leaf: NodeId) -> T {
        self.len -= 1;
        if self.len == 0 {
            let elem = self.nodes.release(leaf).into_elem();
            tracing::debug!("last element removed");
            self.reset();
            return elem;
        }

        if self.first == Some(leaf) {
            self.first = self.nodes[leaf].right;
        }

        let parent = self.nodes.unlink(leaf);
        let elem = self.nodes.release(leaf).into_elem();
        tracing::trace!(%leaf, "leaf unlinked");

        if let Some(p) = parent {
            self.nodes.refresh_max(p);
            self.repair_underflow(p);
        }

        elem
    }
}

impl<T, C: Compare<T>> BPlusTree<T, C> {
    /// Tests if the tree holds an element equivalent to `key`.
    pub fn contains(&self, key: &T) -> bool {
        self.locate(key, Seek::Exact).is_some()
    }

    /// Counts the elements equivalent to `key`.
    ///
    /// # Examples
    /// ```
    /// use bplus_chain::BPlusTree;
    ///
    /// let t = BPlusTree::<_>::from_iter([1, 2, 2, 2, 3]);
    /// assert_eq!(t.count(&2), 3);
    /// assert_eq!(t.count(&4), 0);
    /// ```
    pub fn count(&self, key: &T) -> usize {
        self.lower_bound(key)
            .into_iter()
            .take_while(|e| !self.cmp.less(key, e))
            .count()
    }

    /// Finds an element equivalent to `key`, returning the end iterator if
    /// there is none.  Among several equivalent elements, the first in
    /// iteration order is found.
    pub fn find(&self, key: &T) -> Cursor<'_, T> {
        Cursor::new(&self.nodes, self.locate(key, Seek::Exact))
    }

    /// Adds `value`, keeping any equivalent elements already present.
    ///
    /// # Examples
    /// ```
    /// use bplus_chain::BPlusTree;
    ///
    /// let mut t = BPlusTree::new();
    /// t.insert(2);
    /// t.insert(1);
    /// t.insert(2);
    /// assert_eq!(t.len(), 3);
    /// assert!(t.iter().eq([1, 2, 2].iter()));
    /// ```
    pub fn insert(&mut self, value: T) {
        let Some(root) = self.root else {
            let leaf = self.nodes.alloc(Node::leaf(value));
            self.root = Some(leaf);
            self.first = Some(leaf);
            self.len = 1;
            return;
        };

        let next = self.locate(&value, Seek::LowerBound);
        let leaf = self.nodes.alloc(Node::leaf(value));
        match next {
            Some(next) => {
                if self.first == Some(next) {
                    self.first = Some(leaf);
                }
                self.splice_before(next, leaf);
            }

            None => {
                let last = self.nodes.max_leaf(root);
                self.splice_after(last, leaf);
            }
        }

        self.len += 1;
        tracing::trace!(%leaf, len = self.len, "leaf spliced");
    }

    /// Iterator at the first element not less than `key`.
    pub fn lower_bound(&self, key: &T) -> Cursor<'_, T> {
        Cursor::new(&self.nodes, self.locate(key, Seek::LowerBound))
    }

    /// Removes the first element equivalent to `key` and returns it.
    ///
    /// # Examples
    /// ```
    /// use bplus_chain::BPlusTree;
    ///
    /// let mut t = BPlusTree::<_>::from_iter(['a', 'b']);
    /// assert_eq!(t.remove(&'a'), Some('a'));
    /// assert_eq!(t.remove(&'a'), None);
    /// assert_eq!(t.len(), 1);
    /// ```
    pub fn remove(&mut self, key: &T) -> Option<T> {
        let leaf = self.locate(key, Seek::Exact)?;
        Some(self.remove_leaf(leaf))
    }

    /// Iterator at the first element greater than `key`.
    pub fn upper_bound(&self, key: &T) -> Cursor<'_, T> {
        Cursor::new(&self.nodes, self.locate(key, Seek::UpperBound))
    }
}

impl<T, C: Default> Default for BPlusTree<T, C> {
    fn default() -> Self {
        Self::from_parts(DEFAULT_FANOUT, C::default())
    }
}

impl<T: fmt::Debug, C> fmt::Debug for BPlusTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Compare<T>> Extend<T> for BPlusTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for x in iter {
            self.insert(x);
        }
    }
}

impl<T, C> FromIterator<T> for BPlusTree<T, C>
where
    C: Compare<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut t = Self::default();
        t.extend(iter);
        t
    }
}

impl<T, C> IntoIterator for BPlusTree<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.nodes, self.first, self.len)
    }
}

impl<'a, T, C> IntoIterator for &'a BPlusTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq, C> PartialEq for BPlusTree<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for BPlusTree<T, C> {}

#[cfg(feature = "serde")]
impl<T, C> serde::ser::Serialize for BPlusTree<T, C>
where
    T: serde::ser::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T, C> serde::de::Deserialize<'de> for BPlusTree<T, C>
where
    T: serde::de::Deserialize<'de>,
    C: Compare<T> + Default,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        // Equivalent elements land in front of each other, so inserting the
        // sequence back to front restores their serialized order.
        let elems = Vec::<T>::deserialize(deserializer)?;
        let mut t = Self::default();
        t.extend(elems.into_iter().rev());
        Ok(t)
    }
}
