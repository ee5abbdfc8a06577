use std::iter::FusedIterator;
use std::ops::Bound;

use crate::arena::NodeArena;
use crate::node::NodeId;

/// Lazy ascending scan over the entries between two bounds.
///
/// Built by [`OrderedTree::range`](crate::OrderedTree::range) and the helpers
/// layered on it. Each call starts a fresh traversal; the iterator holds no
/// state shared with the tree beyond the borrow.
pub struct Range<'a, K, V> {
    arena: &'a NodeArena<K, V>,
    /// `(node, next entry index)`; the top frame is the next one to yield.
    stack: Vec<(NodeId, usize)>,
    upper: Bound<&'a K>,
}

impl<'a, K: Ord, V> Range<'a, K, V> {
    pub(crate) fn new(
        arena: &'a NodeArena<K, V>,
        root: Option<NodeId>,
        lower: Bound<&'a K>,
        upper: Bound<&'a K>,
    ) -> Self {
        let mut stack = Vec::new();
        let mut cur = root;
        // Seek: at each level skip every entry (and the subtree left of it)
        // that falls below `lower`.
        while let Some(id) = cur {
            let node = arena.get(id);
            let start = match lower {
                Bound::Unbounded => 0,
                Bound::Included(k) => node.lower_bound(k),
                Bound::Excluded(k) => node.insert_index(k),
            };
            stack.push((id, start));
            cur = node.children.get(start).copied();
        }
        Self {
            arena,
            stack,
            upper,
        }
    }

    fn push_leftmost(&mut self, mut id: NodeId) {
        loop {
            self.stack.push((id, 0));
            match self.arena.get(id).children.first() {
                Some(&child) => id = child,
                None => return,
            }
        }
    }
}

impl<'a, K: Ord, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, idx)) = self.stack.pop() {
            let node = self.arena.get(id);
            let Some(entry) = node.entries.get(idx) else {
                continue;
            };
            if !below_upper(entry.key(), self.upper) {
                // Everything after this entry is at least as large.
                self.stack.clear();
                return None;
            }
            self.stack.push((id, idx + 1));
            if let Some(&child) = node.children.get(idx + 1) {
                self.push_leftmost(child);
            }
            return Some((entry.key(), entry.value()));
        }
        None
    }
}

impl<K: Ord, V> FusedIterator for Range<'_, K, V> {}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            stack: self.stack.clone(),
            upper: self.upper,
        }
    }
}

#[inline]
fn below_upper<K: Ord>(key: &K, upper: Bound<&K>) -> bool {
    match upper {
        Bound::Unbounded => true,
        Bound::Included(u) => key <= u,
        Bound::Excluded(u) => key < u,
    }
}

/// `term` as a bound, closed when `inclusive`.
#[inline]
pub(crate) fn fence<K>(term: &K, inclusive: bool) -> Bound<&K> {
    if inclusive {
        Bound::Included(term)
    } else {
        Bound::Excluded(term)
    }
}
