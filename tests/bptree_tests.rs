use bplus_chain::{BPlusTree, Error, InvariantViolation};
use proptest::prelude::*;

mod common;
use common::*;

fn run_ops(k: usize, ops: Vec<Op>) {
    init_tracing();

    let mut t = TaggedTree::with_fanout_and_compare(k, ByKey).unwrap();
    let mut m = Model::default();

    for (tag, op) in ops.into_iter().enumerate() {
        match op {
            Op::Insert(key) => {
                t.insert((key, tag as u32));
                m.insert((key, tag as u32));
            }

            Op::Remove(key) => {
                assert_eq!(t.remove(&(key, 0)), m.remove(key));
            }

            Op::RemoveAt(key) => {
                let pos = t.lower_bound(&(key, 0)).position();
                let at = m.lower_bound(key);
                let expected = if at < m.elems.len() {
                    Some(m.elems.remove(at))
                } else {
                    None
                };
                assert_eq!(t.remove_at(pos), expected);
            }
        }

        assert_eq!(t.len(), m.elems.len());
        assert_eq!(t.is_empty(), m.elems.is_empty());
        t.check().unwrap();
    }

    assert_eq_iters(t.iter(), m.elems.iter());
    assert_eq!(t.first(), m.elems.first());
    assert_eq!(t.last(), m.elems.last());
}

fn check_bounds(k: usize, u: U16Seq, probes: U16Seq) {
    let mut t = TaggedTree::with_fanout_and_compare(k, ByKey).unwrap();
    let mut m = Model::default();
    for (tag, key) in u.into_iter().enumerate() {
        t.insert((key, tag as u32));
        m.insert((key, tag as u32));
    }

    for p in probes {
        let probe = (p, u32::MAX);
        let (lb, ub) = (m.lower_bound(p), m.upper_bound(p));

        assert_eq!(t.lower_bound(&probe).get(), m.elems.get(lb));
        assert_eq!(t.upper_bound(&probe).get(), m.elems.get(ub));
        assert_eq!(t.count(&probe), ub - lb);
        assert_eq!(t.contains(&probe), lb < ub);

        let found = t.find(&probe);
        if lb < ub {
            assert_eq!(found.get(), m.elems.get(lb));
        } else {
            assert_eq!(found, t.end());
        }

        // walking from the lower bound reaches the end through every
        // remaining element
        assert_eq_iters(t.lower_bound(&probe).into_iter(), m.elems[lb..].iter());
    }
}

fn check_sorted(k: usize, u: U16Seq) {
    let mut t = BPlusTree::with_fanout(k).unwrap();
    t.extend(u.iter().copied());

    let mut v = u;
    v.sort();
    assert_eq_iters(t.iter(), v.iter());
    assert!(t.iter().zip(t.iter().skip(1)).all(|(a, b)| a <= b));
    t.check().unwrap();
}

fn check_drain(k: usize, u: U16Seq, seed: u64) {
    let mut t = BPlusTree::with_fanout(k).unwrap();
    t.extend(u.iter().copied());

    // remove in a scrambled but reproducible order
    let mut order = u.clone();
    let n = order.len().max(1) as u64;
    order.sort_by_key(|x| (*x as u64).wrapping_mul(seed | 1) % n);

    for (i, x) in order.iter().enumerate() {
        assert_eq!(t.remove(x), Some(*x));
        assert_eq!(t.len(), u.len() - i - 1);
        t.check().unwrap();
    }

    assert!(t.is_empty());
    assert_eq!(t.len(), 0);
    assert_eq!(t.begin(), t.end());
    assert_eq!(t.height(), 0);
}

#[test]
fn ascending_five_with_fanout_two() {
    let mut t = BPlusTree::with_fanout(2).unwrap();
    for i in 1..=5 {
        t.insert(i);
    }

    assert!(t.height() > 2);
    assert_eq_iters(t.iter(), [1, 2, 3, 4, 5].iter());
    assert_eq!(t.lower_bound(&3).get(), Some(&3));
    assert_eq!(t.upper_bound(&3).get(), Some(&4));
    t.check().unwrap();
}

#[test]
fn empty_tree_misses() {
    let mut t = BPlusTree::<u8>::with_fanout(2).unwrap();
    assert_eq!(t.find(&3), t.end());
    assert_eq!(t.begin(), t.end());
    assert_eq!(t.remove(&3), None);
    assert_eq!(t.len(), 0);
    t.check().unwrap();
}

#[test]
fn equivalent_elements_newest_first() {
    let mut t = TaggedTree::with_fanout_and_compare(2, ByKey).unwrap();
    for tag in 0..10 {
        t.insert((1, tag));
    }
    let tags: Vec<u32> = t.iter().map(|e| e.1).collect();
    assert_eq!(tags, (0..10).rev().collect::<Vec<_>>());
}

#[test]
fn round_trip_find_remove() {
    let mut t = BPlusTree::with_fanout(3).unwrap();
    let keys: Vec<u32> = (0..500).map(|i| (i * 7919) % 1000).collect();
    t.extend(keys.iter().copied());

    for k in &keys {
        assert_eq!(t.find(k).get(), Some(k));
    }
    for k in &keys {
        assert_eq!(t.remove(k), Some(*k));
        assert_eq!(t.find(k), t.end());
    }
    assert!(t.is_empty());
}

#[test]
fn construction_errors() {
    let err = BPlusTree::<u8>::with_fanout(0).err();
    assert_eq!(err, Some(Error::InvalidFanout(0)));

    let cmp = |a: &u8, b: &u8| a < b;
    assert!(BPlusTree::<u8, _>::with_fanout_and_compare(0, cmp).is_err());
}

#[test]
fn check_reports_nothing_for_fresh_trees() {
    let t = BPlusTree::<u8>::new();
    let res: Result<(), InvariantViolation> = t.check();
    assert!(res.is_ok());
}

#[test]
fn ops_regr1() {
    use Op::*;
    run_ops(
        2,
        vec![
            Insert(5),
            Insert(5),
            Insert(1),
            Insert(9),
            Insert(3),
            Remove(5),
            RemoveAt(4),
            Remove(1),
            Remove(9),
            Remove(5),
        ],
    );
}

proptest! {
    #[test]
    fn test_ops(k in fanouts(), ops in ops()) {
        run_ops(k, ops);
    }

    #[test]
    fn test_bounds(k in fanouts(), u in small_int_seq(), probes in tiny_int_seq()) {
        check_bounds(k, u, probes);
    }

    #[test]
    fn test_sorted(k in fanouts(), u in small_int_seq()) {
        check_sorted(k, u);
    }

    #[test]
    fn test_drain(k in fanouts(), u in small_int_seq(), seed in any::<u64>()) {
        check_drain(k, u, seed);
    }
}
