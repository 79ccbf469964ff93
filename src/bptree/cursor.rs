use std::fmt;
use std::iter::FusedIterator;

use super::node::{Arena, Body, Node, NodeId};

/// A forward cursor over a tree's elements, or the end of the sequence.
///
/// Cursors borrow their tree, so the tree cannot change while one is alive.
/// To remove the element under a cursor, take its [`Position`] and hand that
/// to [`BPlusTree::remove_at`](crate::BPlusTree::remove_at).
///
/// Two cursors are equal when they sit on the same leaf of the same tree;
/// all end cursors of a tree are equal.
///
/// # Examples
/// ```
/// use bplus_chain::BPlusTree;
///
/// let t = BPlusTree::<_>::from_iter([1, 3, 5]);
/// let mut c = t.lower_bound(&2);
/// assert_eq!(c.get(), Some(&3));
/// c.move_next();
/// assert_eq!(c.get(), Some(&5));
/// c.move_next();
/// assert_eq!(c, t.end());
/// ```
pub struct Cursor<'a, T> {
    nodes: &'a Arena<T>,
    leaf: Option<NodeId>,
}

impl<'a, T> Cursor<'a, T> {
    pub(super) fn new(nodes: &'a Arena<T>, leaf: Option<NodeId>) -> Self {
        Self { nodes, leaf }
    }

    /// The element under the cursor, or `None` at the end.
    pub fn get(&self) -> Option<&'a T> {
        self.leaf.map(|id| self.nodes.elem(id))
    }

    pub fn is_end(&self) -> bool {
        self.leaf.is_none()
    }

    /// Steps to the next element.  Stepping past the end stays at the end.
    pub fn move_next(&mut self) {
        if let Some(id) = self.leaf {
            self.leaf = self.nodes[id].right;
        }
    }

    /// A detached handle to the element under the cursor.
    pub fn position(&self) -> Position {
        Position(self.leaf)
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.nodes, other.nodes) && self.leaf == other.leaf
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(elem) => f.debug_tuple("Cursor").field(elem).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

impl<'a, T> IntoIterator for Cursor<'a, T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    /// Iterates from the cursor to the end.
    fn into_iter(self) -> Self::IntoIter {
        Iter::new(self.nodes, self.leaf, None)
    }
}

/// Where a [`Cursor`] stood, without borrowing the tree.
///
/// A position stays meaningful only while its element remains in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position(Option<NodeId>);

impl Position {
    pub fn is_end(&self) -> bool {
        self.0.is_none()
    }

    pub(crate) fn node(self) -> Option<NodeId> {
        self.0
    }
}

/// Iterator over borrowed elements in order, following the leaf chain.
pub struct Iter<'a, T> {
    nodes: &'a Arena<T>,
    next: Option<NodeId>,
    // known when iterating a whole tree
    remaining: Option<usize>,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(
        nodes: &'a Arena<T>,
        next: Option<NodeId>,
        remaining: Option<usize>,
    ) -> Self {
        Self {
            nodes,
            next,
            remaining,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.nodes[id].right;
        if let Some(n) = self.remaining.as_mut() {
            *n -= 1;
        }
        Some(self.nodes.elem(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.remaining, self.next) {
            (Some(n), _) => (n, Some(n)),
            (None, Some(_)) => (1, None),
            (None, None) => (0, Some(0)),
        }
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over a tree's elements in order.
pub struct IntoIter<T> {
    slots: Vec<Option<Node<T>>>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<T> IntoIter<T> {
    pub(super) fn new(nodes: Arena<T>, first: Option<NodeId>, len: usize) -> Self {
        Self {
            slots: nodes.into_slots(),
            next: first,
            remaining: len,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.slots[id.index()]
            .take()
            .expect("leaf chain runs through live slots");
        self.next = node.right;
        self.remaining -= 1;
        match node.body {
            Body::Leaf(elem) => Some(elem),
            Body::Branch(_) => panic!("leaf chain reached a branch"),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
