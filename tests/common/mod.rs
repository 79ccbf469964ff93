#![allow(dead_code)]

use proptest::prelude::*;

use bplus_chain::{BPlusTree, Compare};

pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq,
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

/// Sends the tree's split/merge traces to the test output.
pub(super) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// A key with a tag that tells equivalent elements apart.
pub(super) type Tagged = (u16, u32);

/// Orders [`Tagged`] elements by key alone.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct ByKey;

impl Compare<Tagged> for ByKey {
    fn less(&self, a: &Tagged, b: &Tagged) -> bool {
        a.0 < b.0
    }
}

pub(super) type TaggedTree = BPlusTree<Tagged, ByKey>;

/// A sorted vector that places equivalent elements the way the tree does:
/// the newest in front.
#[derive(Clone, Debug, Default)]
pub(super) struct Model {
    pub elems: Vec<Tagged>,
}

impl Model {
    pub fn insert(&mut self, x: Tagged) {
        let at = self.lower_bound(x.0);
        self.elems.insert(at, x);
    }

    pub fn remove(&mut self, key: u16) -> Option<Tagged> {
        let at = self.lower_bound(key);
        if self.elems.get(at)?.0 == key {
            Some(self.elems.remove(at))
        } else {
            None
        }
    }

    pub fn lower_bound(&self, key: u16) -> usize {
        self.elems.partition_point(|e| e.0 < key)
    }

    pub fn upper_bound(&self, key: u16) -> usize {
        self.elems.partition_point(|e| e.0 <= key)
    }
}

#[derive(Clone, Debug)]
pub(super) enum Op {
    Insert(u16),
    Remove(u16),
    // remove whatever lies at the lower bound of the key
    RemoveAt(u16),
}

pub(super) type U16Seq = Vec<u16>;

pub(super) fn small_int_seq() -> impl Strategy<Value = U16Seq> {
    prop::collection::vec(0u16..1024u16, 0..512)
}

pub(super) fn tiny_int_seq() -> impl Strategy<Value = U16Seq> {
    prop::collection::vec(0u16..16u16, 0..64)
}

// keys drawn from a narrow range so removals hit and duplicates pile up
pub(super) fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => (0u16..64).prop_map(Op::Insert),
        2 => (0u16..64).prop_map(Op::Remove),
        1 => (0u16..64).prop_map(Op::RemoveAt),
    ];
    prop::collection::vec(op, 0..400)
}

pub(super) fn fanouts() -> impl Strategy<Value = usize> {
    prop_oneof![Just(1usize), Just(2), Just(3), Just(4), Just(8)]
}
