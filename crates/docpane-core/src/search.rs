//! Prefix-matching traversal over registered document trees.
//!
//! No index is kept: every search walks every tree, which is O(total
//! nodes x query length) and plenty for documentation-sized trees.

use crate::tree::{NodeArena, NodeId, NodeRecord};

/// True when the node's title or any synonym starts with `query`.
///
/// Matching is literal and case sensitive. The empty query is a prefix
/// of everything and therefore matches every node.
fn matches(record: &NodeRecord, query: &str) -> bool {
    record.title.starts_with(query) || record.synonyms.iter().any(|s| s.starts_with(query))
}

/// Collect matches in the tree rooted at `root`, in pre-order.
pub(crate) fn collect_matches(arena: &NodeArena, root: NodeId, query: &str, out: &mut Vec<NodeId>) {
    let Some(record) = arena.get(root) else {
        return;
    };
    if matches(record, query) {
        out.push(root);
    }
    for &child in &record.children {
        collect_matches(arena, child, query, out);
    }
}
