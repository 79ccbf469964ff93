use std::fmt;
use std::ops::{Index, IndexMut};

/// Names a slot in the node arena.
///
/// Ids are only meaningful for the arena that produced them and may be
/// recycled once the node they named is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The contiguous run of the level below that a branch owns.
///
/// `first` and `last` point into the shared chain of the child level; the
/// children in between are reached by following right links.  When `len`
/// drops to zero (only possible mid-repair) the other fields are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Span {
    pub first: NodeId,
    pub last: NodeId,
    pub len: usize,
    // rightmost leaf of the subtree, used to steer searches
    pub max: NodeId,
}

pub(crate) enum Body<T> {
    Leaf(T),
    Branch(Span),
}

/// A node and its chain links.
///
/// `right` is the forward link of the level chain; `left` and `parent` are
/// navigation only.  Nodes without a parent are the root's child.
pub(crate) struct Node<T> {
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub body: Body<T>,
}

impl<T> Node<T> {
    pub fn leaf(elem: T) -> Self {
        Self {
            parent: None,
            left: None,
            right: None,
            body: Body::Leaf(elem),
        }
    }

    pub fn branch(span: Span) -> Self {
        Self {
            parent: None,
            left: None,
            right: None,
            body: Body::Branch(span),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.body, Body::Leaf(_))
    }

    pub fn into_elem(self) -> T {
        match self.body {
            Body::Leaf(elem) => elem,
            Body::Branch(_) => panic!("branch holds no element"),
        }
    }
}

/// Slot storage for every node of a tree.
///
/// Released slots go on a free list and are handed out again by `alloc`.
pub(crate) struct Arena<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<NodeId>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    pub fn alloc(&mut self, node: Node<T>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    pub fn release(&mut self, id: NodeId) -> Node<T> {
        let node = self.slots[id.0].take().expect("released a vacant slot");
        self.free.push(id);
        node
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots.get(id.0)?.as_ref()
    }

    // number of occupied slots
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn into_slots(self) -> Vec<Option<Node<T>>> {
        self.slots
    }

    pub fn span(&self, id: NodeId) -> &Span {
        match &self[id].body {
            Body::Branch(span) => span,
            Body::Leaf(_) => panic!("leaf {id} has no children"),
        }
    }

    pub fn span_mut(&mut self, id: NodeId) -> &mut Span {
        match &mut self[id].body {
            Body::Branch(span) => span,
            Body::Leaf(_) => panic!("leaf {id} has no children"),
        }
    }

    pub fn elem(&self, id: NodeId) -> &T {
        match &self[id].body {
            Body::Leaf(elem) => elem,
            Body::Branch(_) => panic!("branch {id} holds no element"),
        }
    }

    /// The rightmost leaf reachable from `id`.
    pub fn max_leaf(&self, id: NodeId) -> NodeId {
        match &self[id].body {
            Body::Leaf(_) => id,
            Body::Branch(span) => span.max,
        }
    }

    // what `id`'s max should be, if it has children to take it from
    fn derived_max(&self, id: NodeId) -> Option<NodeId> {
        match &self[id].body {
            Body::Branch(span) if span.len > 0 => Some(self.max_leaf(span.last)),
            _ => None,
        }
    }

    /// Recomputes `id`'s max-descendant without touching its ancestors.
    pub fn recompute_max(&mut self, id: NodeId) {
        if let Some(max) = self.derived_max(id) {
            self.span_mut(id).max = max;
        }
    }

    /// Recomputes `id`'s max-descendant and carries the change up through
    /// every ancestor that reaches it through its last child.
    pub fn refresh_max(&mut self, mut id: NodeId) {
        while let Some(max) = self.derived_max(id) {
            let span = self.span_mut(id);
            if span.max == max {
                return;
            }
            span.max = max;

            match self[id].parent {
                Some(p) if self.span(p).last == id => id = p,
                _ => return,
            }
        }
    }

    /// Steps `n` links to the right of `id`.
    pub fn nth_right(&self, mut id: NodeId, n: usize) -> NodeId {
        for _ in 0..n {
            id = self[id].right.expect("chain ended inside a span");
        }
        id
    }

    /// Points every node of the chain run `first..=last` at `parent`.
    pub fn adopt(&mut self, parent: NodeId, first: NodeId, last: NodeId) {
        let mut curr = first;
        loop {
            self[curr].parent = Some(parent);
            if curr == last {
                return;
            }
            curr = self[curr].right.expect("chain ended inside a span");
        }
    }

    /// Splices `new` into `at`'s chain immediately to its left, under `at`'s
    /// parent.  Returns that parent, whose count has been bumped.
    pub fn link_before(&mut self, at: NodeId, new: NodeId) -> Option<NodeId> {
        let parent = self[at].parent;
        let left = self[at].left;

        let n = &mut self[new];
        n.parent = parent;
        n.left = left;
        n.right = Some(at);

        self[at].left = Some(new);
        if let Some(l) = left {
            self[l].right = Some(new);
        }

        if let Some(p) = parent {
            let span = self.span_mut(p);
            span.len += 1;
            if span.first == at {
                span.first = new;
            }
        }

        parent
    }

    /// Splices `new` into `at`'s chain immediately to its right, under `at`'s
    /// parent.  Returns that parent, whose count has been bumped.
    pub fn link_after(&mut self, at: NodeId, new: NodeId) -> Option<NodeId> {
        let parent = self[at].parent;
        let right = self[at].right;

        let n = &mut self[new];
        n.parent = parent;
        n.left = Some(at);
        n.right = right;

        self[at].right = Some(new);
        if let Some(r) = right {
            self[r].left = Some(new);
        }

        if let Some(p) = parent {
            let span = self.span_mut(p);
            span.len += 1;
            if span.last == at {
                span.last = new;
            }
        }

        parent
    }

    /// Detaches `id` from its level chain and from its parent's span.
    /// Returns the former parent, whose count has been dropped.  The caller
    /// is responsible for refreshing that parent's max-descendant.
    pub fn unlink(&mut self, id: NodeId) -> Option<NodeId> {
        let Node {
            parent,
            left,
            right,
            ..
        } = self[id];

        if let Some(l) = left {
            self[l].right = right;
        }
        if let Some(r) = right {
            self[r].left = left;
        }

        let n = &mut self[id];
        n.parent = None;
        n.left = None;
        n.right = None;

        if let Some(p) = parent {
            let span = self.span_mut(p);
            span.len -= 1;
            if span.len > 0 {
                if span.first == id {
                    span.first = right.expect("span continues to the right");
                }
                if span.last == id {
                    span.last = left.expect("span continues to the left");
                }
            }
        }

        parent
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = Node<T>;

    fn index(&self, id: NodeId) -> &Node<T> {
        self.slots[id.0].as_ref().expect("dangling node id")
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.slots[id.0].as_mut().expect("dangling node id")
    }
}
