use super::node::Body;
use super::{max_children, BPlusTree, NodeId};
use crate::compare::Compare;
use crate::error::InvariantViolation;

type Check = Result<(), InvariantViolation>;

impl<T, C: Compare<T>> BPlusTree<T, C> {
    /// Validates the whole structure.
    ///
    /// Walks every level along its chain and confirms that parents own
    /// contiguous, correctly linked runs of the level below, that branches
    /// respect the occupancy bounds of the fan-out, that cached
    /// max-descendants are current, that all leaves sit at the same depth in
    /// order, and that the length and leftmost-leaf caches match.  Costs
    /// O(n); meant for tests and debugging.
    pub fn check(&self) -> Check {
        let Some(root) = self.root else {
            if self.len != 0 {
                return Err(InvariantViolation::LenMismatch {
                    reported: self.len,
                    actual: 0,
                });
            }
            if self.first.is_some() {
                return Err(InvariantViolation::StaleFirst);
            }
            return self.check_leaks(0);
        };

        let top = &self.nodes[root];
        if top.parent.is_some() || top.left.is_some() || top.right.is_some() {
            return Err(InvariantViolation::BrokenChain { node: root.index() });
        }

        let mut visited = 0;
        let mut level = vec![root];
        let mut depth = 0;
        loop {
            visited += level.len();
            let leaves = level.iter().filter(|id| self.nodes[**id].is_leaf()).count();

            if leaves == level.len() {
                self.check_leaves(&level)?;
                return self.check_leaks(visited);
            }
            if leaves != 0 {
                return Err(InvariantViolation::UnevenDepth { level: depth });
            }

            level = self.check_branches(&level, depth == 0)?;
            depth += 1;
        }
    }

    // Checks one level of branches and returns the level below, gathered by
    // walking its chain from the first branch's first child.
    fn check_branches(
        &self,
        level: &[NodeId],
        is_top: bool,
    ) -> Result<Vec<NodeId>, InvariantViolation> {
        let min = if is_top { 2 } else { self.fanout };
        let max = max_children(self.fanout);

        let mut below = Vec::new();
        let mut expect_left = None;

        for &id in level {
            let Body::Branch(span) = &self.nodes[id].body else {
                unreachable!("caller filtered out leaves");
            };

            if span.len < min || span.len > max {
                return Err(InvariantViolation::Occupancy {
                    node: id.index(),
                    len: span.len,
                    min,
                    max,
                });
            }

            // the run must continue exactly where the previous parent's ended
            let joined = match expect_left {
                Some(prev) => self.nodes[prev].right == Some(span.first),
                None => true,
            };
            if !joined || self.nodes[span.first].left != expect_left {
                return Err(InvariantViolation::BrokenChain {
                    node: span.first.index(),
                });
            }

            let mut curr = span.first;
            for i in 0..span.len {
                let node = &self.nodes[curr];
                if node.parent != Some(id) {
                    return Err(InvariantViolation::ParentMismatch {
                        node: curr.index(),
                        parent: id.index(),
                    });
                }
                below.push(curr);

                if i + 1 < span.len {
                    let next = node.right.ok_or(InvariantViolation::BrokenChain {
                        node: curr.index(),
                    })?;
                    if self.nodes[next].left != Some(curr) {
                        return Err(InvariantViolation::BrokenChain {
                            node: next.index(),
                        });
                    }
                    curr = next;
                }
            }

            if curr != span.last {
                return Err(InvariantViolation::BrokenChain {
                    node: span.last.index(),
                });
            }
            if span.max != self.nodes.max_leaf(span.last) {
                return Err(InvariantViolation::StaleMax { node: id.index() });
            }

            expect_left = Some(span.last);
        }

        // nothing may hang off either end of the level
        let last = *below.last().expect("branches own children");
        if self.nodes[last].right.is_some() {
            return Err(InvariantViolation::BrokenChain { node: last.index() });
        }

        Ok(below)
    }

    fn check_leaves(&self, leaves: &[NodeId]) -> Check {
        if leaves.len() != self.len {
            return Err(InvariantViolation::LenMismatch {
                reported: self.len,
                actual: leaves.len(),
            });
        }
        if self.first != leaves.first().copied() {
            return Err(InvariantViolation::StaleFirst);
        }

        for (position, pair) in leaves.windows(2).enumerate() {
            let (a, b) = (self.nodes.elem(pair[0]), self.nodes.elem(pair[1]));
            if self.cmp.less(b, a) {
                return Err(InvariantViolation::OutOfOrder { position });
            }
        }

        Ok(())
    }

    fn check_leaks(&self, visited: usize) -> Check {
        let live = self.nodes.live();
        if live != visited {
            return Err(InvariantViolation::Leaked {
                leaked: live - visited,
            });
        }
        Ok(())
    }
}
