//! Arena-owned document tree nodes.
//!
//! Every node of every registered tree lives in a per-registry arena
//! keyed by stable [`NodeId`]s. Parent links are ids, never owning
//! references, so tearing a tree down is a map purge rather than a
//! recursive free tied to pointer ownership, and a stale id simply
//! stops resolving.

use std::collections::HashMap;

use docpane_extension_sdk::{DocNode, DocRef};
use serde::{Deserialize, Serialize};

/// Stable identity of one document tree node.
///
/// Ids are never reused within a registry, so a node unloaded together
/// with its extension cannot be confused with a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

/// One interned node.
#[derive(Debug)]
pub(crate) struct NodeRecord {
    pub(crate) title: String,
    pub(crate) synonyms: Vec<String>,
    pub(crate) doc_ref: DocRef,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// Arena holding every node of every registered tree.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    nodes: HashMap<NodeId, NodeRecord>,
    next_id: u64,
}

impl NodeArena {
    pub(crate) fn get(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    /// Intern a blueprint tree, assigning ids and parent links.
    /// Returns the id of the root.
    pub(crate) fn insert_tree(&mut self, tree: DocNode) -> NodeId {
        self.insert_node(tree, None)
    }

    fn insert_node(&mut self, node: DocNode, parent: Option<NodeId>) -> NodeId {
        let DocNode {
            title,
            synonyms,
            doc_ref,
            children,
        } = node;

        let id = self.alloc_id();
        self.nodes.insert(
            id,
            NodeRecord {
                title,
                synonyms,
                doc_ref,
                parent,
                children: Vec::new(),
            },
        );

        let child_ids: Vec<NodeId> = children
            .into_iter()
            .map(|child| self.insert_node(child, Some(id)))
            .collect();
        if let Some(record) = self.nodes.get_mut(&id) {
            record.children = child_ids;
        }

        id
    }

    /// Remove `root` and every node reachable from it.
    pub(crate) fn remove_tree(&mut self, root: NodeId) {
        if let Some(record) = self.nodes.remove(&root) {
            for child in record.children {
                self.remove_tree(child);
            }
        }
    }

    /// Walk parent links up to the root of the tree containing `id`.
    pub(crate) fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        let mut record = self.nodes.get(&current)?;
        while let Some(parent) = record.parent {
            current = parent;
            record = self.nodes.get(&current)?;
        }
        Some(current)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    fn alloc_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}
