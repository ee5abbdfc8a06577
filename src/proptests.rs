use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

/// Walks the whole tree and asserts every structural invariant.
fn validate_tree<K: Ord + fmt::Debug, V>(t: &OrderedTree<K, V>) {
    let Some(root) = t.root else {
        assert_eq!(t.size, 0, "empty tree must have size 0");
        assert_eq!(t.height, 0, "empty tree must have height 0");
        return;
    };
    assert_eq!(t.nodes.get(root).parent, None, "root must not have a parent");

    let mut leaf_depth = None;
    let mut count = 0usize;
    validate_node(t, root, None, None, 0, &mut leaf_depth, &mut count);

    assert_eq!(leaf_depth, Some(t.height), "every leaf must sit at depth == height");
    assert_eq!(count, t.size, "reachable entry count must match size");
    assert_eq!(t.iter().count(), t.size, "iter must yield every entry");
}

fn validate_node<K: Ord + fmt::Debug, V>(
    t: &OrderedTree<K, V>,
    id: NodeId,
    lo: Option<&K>,
    hi: Option<&K>,
    depth: usize,
    leaf_depth: &mut Option<usize>,
    count: &mut usize,
) {
    let node = t.nodes.get(id);
    let cfg = t.config;
    let n = node.len();
    *count += n;

    assert!(n <= cfg.max_entries(), "node {id:?} holds {n} entries");
    if Some(id) != t.root {
        assert!(
            n >= cfg.threshold() - 1,
            "non-root node {id:?} under minimum occupancy: {n}"
        );
    }

    for pair in node.entries.windows(2) {
        assert!(pair[0].key() <= pair[1].key(), "entries out of order in {id:?}");
    }
    for e in &node.entries {
        if let Some(lo) = lo {
            assert!(e.key() >= lo, "{:?} below separator {:?}", e.key(), lo);
        }
        if let Some(hi) = hi {
            assert!(e.key() <= hi, "{:?} above separator {:?}", e.key(), hi);
        }
    }

    if node.is_leaf() {
        match *leaf_depth {
            None => *leaf_depth = Some(depth),
            Some(d) => assert_eq!(d, depth, "leaves at different depths"),
        }
        return;
    }

    assert_eq!(node.children.len(), n + 1, "internal node {id:?} fan-out");
    assert!(node.children.len() <= cfg.max_children());
    for (i, &child) in node.children.iter().enumerate() {
        assert_eq!(t.nodes.get(child).parent, Some(id), "stale parent link on {child:?}");
        let child_lo = if i == 0 { lo } else { Some(node.entries[i - 1].key()) };
        let child_hi = node.entries.get(i).map(Entry::key).or(hi);
        validate_node(t, child, child_lo, child_hi, depth + 1, leaf_depth, count);
    }
}

/// Sorted reference model; equal keys keep insertion order.
#[derive(Default)]
struct Model {
    entries: Vec<(u16, u32)>,
}

impl Model {
    fn insert(&mut self, k: u16, v: u32) {
        let idx = self.entries.partition_point(|(x, _)| *x <= k);
        self.entries.insert(idx, (k, v));
    }

    fn get(&self, k: u16) -> Option<u32> {
        self.entries.iter().find(|(x, _)| *x == k).map(|(_, v)| *v)
    }

    fn filtered(&self, pred: impl Fn(u16) -> bool) -> Vec<(u16, u32)> {
        self.entries.iter().copied().filter(|(k, _)| pred(*k)).collect()
    }
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(
        #[proptest(strategy = "0u16..512")] u16,
        u32,
    ),
    Get(#[proptest(strategy = "0u16..512")] u16),
    Above(
        #[proptest(strategy = "0u16..512")] u16,
        #[proptest(strategy = "proptest::option::of(0u16..512)")] Option<u16>,
        bool,
    ),
    Below(
        #[proptest(strategy = "0u16..512")] u16,
        #[proptest(strategy = "proptest::option::of(0u16..512)")] Option<u16>,
        bool,
    ),
}

fn pairs<'a>(it: impl Iterator<Item = (&'a u16, &'a u32)>) -> Vec<(u16, u32)> {
    it.map(|(k, v)| (*k, *v)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(
        threshold in 1usize..=5,
        ops in prop::collection::vec(any::<Op>(), 0..=1500),
    ) {
        let mut t: OrderedTree<u16, u32> = OrderedTree::new(threshold).unwrap();
        let mut m = Model::default();
        let mut inserts = 0usize;

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let before = t.height();
                    t.insert(k, v);
                    m.insert(k, v);
                    inserts += 1;
                    prop_assert!(t.height() == before || t.height() == before + 1);
                }
                Op::Get(k) => {
                    prop_assert_eq!(t.get(&k).copied(), m.get(k));
                    prop_assert_eq!(t.contains_key(&k), m.get(k).is_some());
                }
                Op::Above(term, upper, inclusive) => {
                    let got = pairs(t.range_above(&term, upper.as_ref(), inclusive));
                    let expected = m.filtered(|k| {
                        let lo_ok = if inclusive { k >= term } else { k > term };
                        let hi_ok = match upper {
                            None => true,
                            Some(u) if inclusive => k <= u,
                            Some(u) => k < u,
                        };
                        lo_ok && hi_ok
                    });
                    prop_assert_eq!(got, expected);
                }
                Op::Below(term, lower, inclusive) => {
                    let got = pairs(t.range_below(&term, lower.as_ref(), inclusive));
                    let expected = m.filtered(|k| {
                        let hi_ok = if inclusive { k <= term } else { k < term };
                        let lo_ok = match lower {
                            None => true,
                            Some(l) if inclusive => k >= l,
                            Some(l) => k > l,
                        };
                        lo_ok && hi_ok
                    });
                    prop_assert_eq!(got, expected);
                }
            }

            prop_assert_eq!(t.size(), inserts);
        }

        validate_tree(&t);
        prop_assert_eq!(pairs(t.iter()), m.entries);
    }

    #[test]
    fn prop_distinct_round_trip(
        threshold in 2usize..=8,
        keys in prop::collection::hash_set(any::<u32>(), 0..=2000),
    ) {
        let mut t: OrderedTree<u32, u64> = OrderedTree::new(threshold).unwrap();
        for &k in &keys {
            t.insert(k, u64::from(k) * 7);
        }
        validate_tree(&t);
        prop_assert_eq!(t.size(), keys.len());
        for &k in &keys {
            prop_assert_eq!(t.get(&k), Some(&(u64::from(k) * 7)));
        }

        let mut sorted: Vec<u32> = keys.into_iter().collect();
        sorted.sort_unstable();
        let got: Vec<u32> = t.keys().copied().collect();
        prop_assert_eq!(got, sorted);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u8> = vec![1, 2, 3, 4, 5, 6, 7];

    for threshold in 1..=3 {
        for_each_permutation(&keys, |perm| {
            let mut t: OrderedTree<u8, usize> = OrderedTree::new(threshold).unwrap();
            for (i, k) in perm.iter().enumerate() {
                t.insert(*k, i);
            }

            validate_tree(&t);
            let got: Vec<u8> = t.keys().copied().collect();
            assert_eq!(got, keys);
            for (i, k) in perm.iter().enumerate() {
                assert_eq!(t.get(k), Some(&i));
            }
            for term in 0..=8u8 {
                let above: Vec<u8> = t.range_above(&term, None, false).map(|(k, _)| *k).collect();
                let expected: Vec<u8> = keys.iter().copied().filter(|k| *k > term).collect();
                assert_eq!(above, expected);
            }
        });
    }
}

#[test]
fn ascending_inserts_keep_minimum_occupancy() {
    let mut t: OrderedTree<u32, ()> = OrderedTree::new(3).unwrap();
    for k in 0..10_000 {
        t.insert(k, ());
    }
    validate_tree(&t);
    assert!(t.height() >= 4);
}
