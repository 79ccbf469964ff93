//! Structural repair: splitting over-full branches on the way up from an
//! insertion and borrowing or merging under-full ones on the way up from a
//! removal.  The root's child is handled specially, growing a new level when
//! it splits and collapsing when it is left with a single child.

use super::node::{Body, Node, Span};
use super::{max_children, BPlusTree, NodeId};

impl<T, C> BPlusTree<T, C> {
    /// Splices the fresh node `new` in front of `at` and repairs overflow.
    pub(super) fn splice_before(&mut self, at: NodeId, new: NodeId) {
        match self.nodes.link_before(at, new) {
            None => self.grow(new, at),
            Some(parent) => self.split_overflow(parent),
        }
    }

    /// Splices the fresh node `new` behind `at` and repairs overflow.
    pub(super) fn splice_after(&mut self, at: NodeId, new: NodeId) {
        match self.nodes.link_after(at, new) {
            None => self.grow(at, new),
            Some(parent) => {
                // `new` may be the parent's last child now
                self.nodes.refresh_max(parent);
                self.split_overflow(parent);
            }
        }
    }

    // Wraps the two top-level nodes `lo` and `hi` into a new root child.
    fn grow(&mut self, lo: NodeId, hi: NodeId) {
        let top = self.nodes.alloc(Node::branch(Span {
            first: lo,
            last: hi,
            len: 2,
            max: self.nodes.max_leaf(hi),
        }));
        self.nodes.adopt(top, lo, hi);
        self.root = Some(top);

        tracing::trace!(%top, height = self.height(), "tree grew a level");
    }

    // Splits `curr` and its ancestors for as long as they hold too many
    // children.  The left half stays put; the right half moves to a new
    // sibling spliced in behind it.
    fn split_overflow(&mut self, mut curr: NodeId) {
        let max = max_children(self.fanout);
        loop {
            let span = *self.nodes.span(curr);
            if span.len <= max {
                return;
            }

            let keep = span.len / 2;
            let mid = self.nodes.nth_right(span.first, keep);
            let sibling = self.nodes.alloc(Node::branch(Span {
                first: mid,
                last: span.last,
                len: span.len - keep,
                max: span.max,
            }));
            self.nodes.adopt(sibling, mid, span.last);

            let left_last = self.nodes[mid].left.expect("split point has a left");
            let s = self.nodes.span_mut(curr);
            s.last = left_last;
            s.len = keep;
            // the parent's max is unaffected: `sibling` takes over the old one
            self.nodes.recompute_max(curr);

            tracing::trace!(
                node = %curr,
                %sibling,
                left = keep,
                right = span.len - keep,
                "split branch"
            );

            match self.nodes.link_after(curr, sibling) {
                None => {
                    self.grow(curr, sibling);
                    return;
                }

                Some(parent) => curr = parent,
            }
        }
    }

    /// Restores the occupancy of `curr` and its ancestors after `curr` lost
    /// a child.
    pub(super) fn repair_underflow(&mut self, mut curr: NodeId) {
        let min = self.fanout;
        loop {
            let len = self.nodes.span(curr).len;

            let Some(parent) = self.nodes[curr].parent else {
                if len == 1 {
                    self.collapse();
                }
                return;
            };

            if len >= min {
                return;
            }

            let (left, right) = (self.nodes[curr].left, self.nodes[curr].right);
            curr = if let Some(right) = right {
                if self.nodes.span(right).len > min {
                    self.borrow_first(curr, right);
                    return;
                }
                self.absorb_right(curr, right)
            } else if let Some(left) = left {
                if self.nodes.span(left).len > min {
                    self.borrow_last(curr, left);
                    return;
                }
                self.absorb_left(curr, left)
            } else {
                // alone on its level, so the parent is the root's child
                parent
            };
        }
    }

    // Moves the first child of `right` to the end of `curr`.
    fn borrow_first(&mut self, curr: NodeId, right: NodeId) {
        let moved = self.nodes.span(right).first;
        let next = self.nodes[moved].right.expect("lender keeps a child");

        let r = self.nodes.span_mut(right);
        r.first = next;
        r.len -= 1;

        let s = self.nodes.span_mut(curr);
        if s.len == 0 {
            s.first = moved;
        }
        s.last = moved;
        s.len += 1;

        self.nodes[moved].parent = Some(curr);
        self.nodes.refresh_max(curr);

        tracing::trace!(node = %curr, lender = %right, "borrowed from right");
    }

    // Moves the last child of `left` to the front of `curr`.
    fn borrow_last(&mut self, curr: NodeId, left: NodeId) {
        let moved = self.nodes.span(left).last;
        let prev = self.nodes[moved].left.expect("lender keeps a child");

        let l = self.nodes.span_mut(left);
        l.last = prev;
        l.len -= 1;

        let s = self.nodes.span_mut(curr);
        if s.len == 0 {
            s.last = moved;
        }
        s.first = moved;
        s.len += 1;

        self.nodes[moved].parent = Some(curr);
        self.nodes.refresh_max(left);
        self.nodes.refresh_max(curr);

        tracing::trace!(node = %curr, lender = %left, "borrowed from left");
    }

    // Takes over every child of `right` and drops it from its level.
    // Returns the parent that lost `right`.
    fn absorb_right(&mut self, curr: NodeId, right: NodeId) -> NodeId {
        let taken = *self.nodes.span(right);
        let owner = self.nodes.unlink(right).expect("merged node has a parent");
        self.nodes.release(right);

        let s = self.nodes.span_mut(curr);
        if s.len == 0 {
            s.first = taken.first;
        }
        s.last = taken.last;
        s.len += taken.len;
        self.nodes.adopt(curr, taken.first, taken.last);

        self.nodes.refresh_max(curr);
        self.nodes.refresh_max(owner);

        tracing::trace!(node = %curr, merged = %right, "merged right sibling");
        owner
    }

    // Takes over every child of `left` and drops it from its level.
    // Returns the parent that lost `left`.
    fn absorb_left(&mut self, curr: NodeId, left: NodeId) -> NodeId {
        let taken = *self.nodes.span(left);
        let owner = self.nodes.unlink(left).expect("merged node has a parent");
        self.nodes.release(left);

        let s = self.nodes.span_mut(curr);
        if s.len == 0 {
            s.last = taken.last;
        }
        s.first = taken.first;
        s.len += taken.len;
        self.nodes.adopt(curr, taken.first, taken.last);

        self.nodes.refresh_max(curr);
        self.nodes.refresh_max(owner);

        tracing::trace!(node = %curr, merged = %left, "merged left sibling");
        owner
    }

    // Replaces the root's child by its only child while it has just one.
    fn collapse(&mut self) {
        while let Some(top) = self.root {
            let child = match &self.nodes[top].body {
                Body::Branch(span) if span.len == 1 => span.first,
                _ => return,
            };

            self.nodes.release(top);
            self.nodes[child].parent = None;
            self.root = Some(child);

            tracing::trace!(%top, %child, "tree lost a level");
        }
    }
}
