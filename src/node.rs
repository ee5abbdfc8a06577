//! Node layout and the split rule.

use std::cmp::Ordering;

/// Index of a node inside the [`NodeArena`](crate::arena::NodeArena).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn new(idx: usize) -> Self {
        debug_assert!(idx <= u32::MAX as usize);
        Self(idx as u32)
    }

    #[inline]
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A key and its value, as stored in a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Result of splitting an overfull node.
///
/// The node that was split keeps the left half; `entries`/`children` are the
/// right half, and `promoted` is the median that moves up to the parent.
pub(crate) struct Split<K, V> {
    pub(crate) promoted: Entry<K, V>,
    pub(crate) entries: Vec<Entry<K, V>>,
    pub(crate) children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    /// Sorted by key; equal keys keep insertion order.
    pub(crate) entries: Vec<Entry<K, V>>,
    /// Empty for leaves, otherwise `entries.len() + 1`.
    pub(crate) children: Vec<NodeId>,
    /// Back-relation only; the parent owns this node through `children`.
    pub(crate) parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn leaf(parent: Option<NodeId>) -> Self {
        Self {
            entries: Vec::new(),
            children: Vec::new(),
            parent,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes the median entry (index `len / 2`) and moves everything to its
    /// right into the returned [`Split`].
    pub(crate) fn split(&mut self) -> Split<K, V> {
        debug_assert!(!self.entries.is_empty());
        let mid = self.entries.len() / 2;
        let mut entries = self.entries.split_off(mid);
        let promoted = entries.remove(0);
        let children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children.split_off(mid + 1)
        };
        Split {
            promoted,
            entries,
            children,
        }
    }
}

impl<K: Ord, V> Node<K, V> {
    /// Position of the first entry whose key is `>= key`.
    #[inline]
    pub(crate) fn lower_bound(&self, key: &K) -> usize {
        self.entries.partition_point(|e| e.key.cmp(key) == Ordering::Less)
    }

    /// Position a new entry for `key` takes: after every entry `<= key`, so
    /// duplicates stay in insertion order.
    #[inline]
    pub(crate) fn insert_index(&self, key: &K) -> usize {
        self.entries.partition_point(|e| e.key <= *key)
    }

    pub(crate) fn insert_entry(&mut self, key: K, value: V) -> usize {
        let idx = self.insert_index(&key);
        self.entries.insert(idx, Entry::new(key, value));
        idx
    }
}
