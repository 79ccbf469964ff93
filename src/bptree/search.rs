use super::node::Body;
use super::{BPlusTree, NodeId};
use crate::compare::Compare;

/// What a top-down search is looking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Seek {
    /// a leaf equivalent to the key
    Exact,
    /// the first leaf not less than the key
    LowerBound,
    /// the first leaf greater than the key
    UpperBound,
}

impl<T, C: Compare<T>> BPlusTree<T, C> {
    // Tests if every leaf under `id` falls short of what `seek` wants, so the
    // search should move on to the next node of the level.
    fn passes_over(&self, id: NodeId, key: &T, seek: Seek) -> bool {
        let max = self.nodes.elem(self.nodes.max_leaf(id));
        match seek {
            Seek::Exact | Seek::LowerBound => self.cmp.less(max, key),
            Seek::UpperBound => !self.cmp.less(key, max),
        }
    }

    /// Walks down from the root.  At each level the search moves right along
    /// the chain past subtrees whose max-descendant is too small, then
    /// descends into the first child of the node that stopped it.  The
    /// search stays inside the stopping parent's span because that parent's
    /// own max was big enough.
    pub(super) fn locate(&self, key: &T, seek: Seek) -> Option<NodeId> {
        let mut curr = self.root?;
        loop {
            if self.passes_over(curr, key, seek) {
                // None only at the top, when key is past the global max
                curr = self.nodes[curr].right?;
                continue;
            }

            match &self.nodes[curr].body {
                Body::Branch(span) => curr = span.first,

                Body::Leaf(elem) => {
                    return match seek {
                        Seek::Exact if self.cmp.less(key, elem) => None,
                        _ => Some(curr),
                    };
                }
            }
        }
    }
}
