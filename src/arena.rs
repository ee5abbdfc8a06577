//! Index-addressed node storage.
//!
//! Nodes are never freed individually: a tree only grows, and a split reuses
//! the overfull node as its left half.

use crate::node::{Node, NodeId};

#[derive(Clone, Debug)]
pub(crate) struct NodeArena<K, V> {
    nodes: Vec<Node<K, V>>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.idx()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id.idx()]
    }

    /// Points the parent link of every child of `parent` back at it.
    pub(crate) fn adopt_children(&mut self, parent: NodeId) {
        for i in 0..self.nodes[parent.idx()].children.len() {
            let child = self.nodes[parent.idx()].children[i];
            self.nodes[child.idx()].parent = Some(parent);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }
}
