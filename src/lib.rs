//! # kvtree
//!
//! An in-memory ordered key-value store backed by a B-tree.
//!
//! Keys only need to be [`Ord`]; values are opaque. The tree supports point
//! lookup and ascending range scans bounded on one or both sides. There is no
//! removal: a tree only grows.
//!
//! ## Example
//!
//! ```rust
//! use kvtree::OrderedTree;
//!
//! let mut tree = OrderedTree::new(3).unwrap();
//! for k in 1..=100u32 {
//!     tree.insert(k, k * 2);
//! }
//!
//! assert_eq!(tree.get(&17), Some(&34));
//! let keys: Vec<u32> = tree.range_above(&50, Some(&60), true).map(|(k, _)| *k).collect();
//! assert_eq!(keys, (50..=60).collect::<Vec<_>>());
//! ```
//!
//! ## Duplicate keys
//!
//! Inserting a key that is already present adds a second entry instead of
//! replacing the first. Both entries are kept in insertion order, range scans
//! yield each of them, and [`OrderedTree::get`] returns the one inserted
//! first. [`OrderedTree::size`] counts insertions, not distinct keys.
//!
//! ## Concurrency
//!
//! Every operation runs to completion on the calling thread. Share a tree
//! across threads behind a single lock; a split rewires nodes anywhere on the
//! insertion path.

mod arena;
mod config;
mod error;
mod node;
mod range;

use std::fmt;
use std::ops::Bound;

use log::{debug, trace};

use arena::NodeArena;
use node::{Node, NodeId};

pub use config::{TreeConfig, DEFAULT_THRESHOLD};
pub use error::{Error, Result};
pub use node::Entry;
pub use range::Range;

// =============================================================================
// OrderedTree
// =============================================================================

/// An ordered map from `K` to `V` stored as a B-tree of threshold `t`.
///
/// Every node holds at most `2t - 1` entries; internal nodes hold exactly one
/// more child than entries.
pub struct OrderedTree<K, V> {
    nodes: NodeArena<K, V>,
    root: Option<NodeId>,
    config: TreeConfig,
    /// Number of `insert` calls, duplicates included.
    size: usize,
    /// Number of times the root has split.
    height: usize,
}

impl<K, V> OrderedTree<K, V> {
    /// Creates an empty tree with threshold `t`.
    ///
    /// Fails with [`Error::InvalidArgument`] when `t < 1`.
    pub fn new(threshold: usize) -> Result<Self> {
        Self::with_config(TreeConfig::new().with_threshold(threshold))
    }

    pub fn with_config(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        debug!("created tree with threshold {}", config.threshold());
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TreeConfig) -> Self {
        Self {
            nodes: NodeArena::new(),
            root: None,
            config,
            size: 0,
            height: 0,
        }
    }

    /// Number of entries inserted so far, duplicates included.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Same as [`size`](Self::size).
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of root splits so far. A single-node tree has height 0.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn threshold(&self) -> usize {
        self.config.threshold()
    }

    #[inline]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Drops every entry. The threshold is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.size = 0;
        self.height = 0;
    }
}

// =============================================================================
// Insertion
// =============================================================================

impl<K: Ord, V> OrderedTree<K, V> {
    /// Inserts `key` with `value`.
    ///
    /// Never fails. An existing equal key is not replaced; see the crate docs
    /// on duplicate keys.
    pub fn insert(&mut self, key: K, value: V) {
        self.size += 1;

        let Some(mut id) = self.root else {
            let mut leaf = Node::leaf(None);
            leaf.insert_entry(key, value);
            self.root = Some(self.nodes.alloc(leaf));
            return;
        };

        loop {
            let node = self.nodes.get(id);
            if node.is_leaf() {
                break;
            }
            id = node.children[node.insert_index(&key)];
        }

        self.nodes.get_mut(id).insert_entry(key, value);
        self.split_overfull(id);
    }

    /// Splits `id` while it holds more than `2t - 1` entries, carrying each
    /// promoted median into the parent and re-checking the parent.
    fn split_overfull(&mut self, mut id: NodeId) {
        while self.config.overflows(self.nodes.get(id).len()) {
            let split = self.nodes.get_mut(id).split();

            let parent_id = match self.nodes.get(id).parent {
                Some(parent_id) => parent_id,
                None => self.grow_root(id),
            };

            let right = self.nodes.alloc(Node {
                entries: split.entries,
                children: split.children,
                parent: Some(parent_id),
            });
            self.nodes.adopt_children(right);

            let parent = self.nodes.get_mut(parent_id);
            let pos = parent
                .children
                .iter()
                .position(|&c| c == id)
                .expect("split node must be linked from its parent");
            parent.entries.insert(pos, split.promoted);
            parent.children.insert(pos + 1, right);

            trace!(
                "split node {:?} into {:?}; parent {:?} now holds {} entries",
                id,
                right,
                parent_id,
                parent.entries.len()
            );

            id = parent_id;
        }
    }

    /// Hangs the current root `old` under a fresh empty root and returns it.
    fn grow_root(&mut self, old: NodeId) -> NodeId {
        let mut root = Node::leaf(None);
        root.children.push(old);
        let root_id = self.nodes.alloc(root);
        self.nodes.get_mut(old).parent = Some(root_id);
        self.root = Some(root_id);
        self.height += 1;
        debug!("root split, tree height is now {}", self.height);
        root_id
    }
}

// =============================================================================
// Lookup
// =============================================================================

impl<K: Ord, V> OrderedTree<K, V> {
    /// Locates the first-inserted entry for `key`.
    ///
    /// Equal keys sit in insertion order, so this is the leftmost equal entry:
    /// a match in `children[idx]` precedes one at `entries[idx]`.
    fn find(&self, key: &K) -> Option<(NodeId, usize)> {
        let mut cur = self.root?;
        let mut hit = None;
        loop {
            let node = self.nodes.get(cur);
            let idx = node.lower_bound(key);
            if node.entries.get(idx).is_some_and(|e| e.key() == key) {
                hit = Some((cur, idx));
            }
            match node.children.get(idx) {
                Some(&child) => cur = child,
                None => return hit,
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_entry(key).map(Entry::value)
    }

    pub fn get_entry(&self, key: &K) -> Option<&Entry<K, V>> {
        let (id, idx) = self.find(key)?;
        Some(&self.nodes.get(id).entries[idx])
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (id, idx) = self.find(key)?;
        Some(self.nodes.get_mut(id).entries[idx].value_mut())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }
}

// =============================================================================
// Range scans
// =============================================================================

impl<K: Ord, V> OrderedTree<K, V> {
    /// Ascending scan over the entries between `lower` and `upper`.
    pub fn range<'a>(&'a self, lower: Bound<&'a K>, upper: Bound<&'a K>) -> Range<'a, K, V> {
        Range::new(&self.nodes, self.root, lower, upper)
    }

    /// Entries with keys above `term`, optionally capped by `upper_bound`.
    ///
    /// `inclusive` closes both ends: keys equal to `term` or to `upper_bound`
    /// are included only when it is set.
    pub fn range_above<'a>(
        &'a self,
        term: &'a K,
        upper_bound: Option<&'a K>,
        inclusive: bool,
    ) -> Range<'a, K, V> {
        let upper = upper_bound.map_or(Bound::Unbounded, |u| range::fence(u, inclusive));
        self.range(range::fence(term, inclusive), upper)
    }

    /// Entries with keys below `term`, optionally floored by `lower_bound`.
    ///
    /// Results are still ascending. `inclusive` closes both ends.
    pub fn range_below<'a>(
        &'a self,
        term: &'a K,
        lower_bound: Option<&'a K>,
        inclusive: bool,
    ) -> Range<'a, K, V> {
        let lower = lower_bound.map_or(Bound::Unbounded, |l| range::fence(l, inclusive));
        self.range(lower, range::fence(term, inclusive))
    }

    /// Every entry in ascending key order.
    pub fn iter(&self) -> Range<'_, K, V> {
        self.range(Bound::Unbounded, Bound::Unbounded)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

// =============================================================================
// Trait impls
// =============================================================================

impl<K, V> Default for OrderedTree<K, V> {
    fn default() -> Self {
        Self::from_valid_config(TreeConfig::default())
    }
}

impl<K: Clone, V: Clone> Clone for OrderedTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            config: self.config,
            size: self.size,
            height: self.height,
        }
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a OrderedTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Range<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


#[cfg(test)]
mod proptests;
