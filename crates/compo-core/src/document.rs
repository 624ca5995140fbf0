//! Nested JSON shape of a document.
//!
//! The arena keeps structure out of [`Node`]; this module materializes it
//! again as `children` arrays and `parentId` back-references so that a
//! forest can be persisted, put on a clipboard, and rebuilt. Rebuilding goes
//! through [`Forest::insert`] node by node in pre-order, so every guard the
//! tree store enforces also applies to loaded documents.

use crate::error::DocumentError;
use crate::id::NodeId;
use crate::model::{Node, NodeType};
use crate::tree::Forest;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node together with its nested children, as stored in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    #[serde(flatten)]
    pub node: Node,
    /// `null` only on the root. When absent on a child it is re-derived from
    /// nesting.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Every id in this subtree, pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.node.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }

    /// Rewrite every id in the subtree through `remap`, keeping the
    /// children's `parentId` in step with their parent's new id.
    pub fn remap_ids(&mut self, remap: &mut impl FnMut(&Node) -> NodeId) {
        self.node.id = remap(&self.node);
        let parent = self.node.id;
        for child in &mut self.children {
            child.parent_id = Some(parent);
            child.remap_ids(remap);
        }
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DocumentNode::node_count)
            .sum::<usize>()
    }
}

// ─── Forest → document ───────────────────────────────────────────────────

impl Forest {
    /// The whole forest as its top-level JSON array (a single root entry).
    pub fn to_document(&self) -> Vec<DocumentNode> {
        self.subtree(self.root_id()).into_iter().collect()
    }

    /// The subtree rooted at `id` in document shape.
    pub fn subtree(&self, id: NodeId) -> Option<DocumentNode> {
        let node = self.get(id)?.clone();
        let children = self
            .children(id)
            .into_iter()
            .filter_map(|child| self.subtree(child))
            .collect();
        Some(DocumentNode {
            node,
            parent_id: self.parent_of(id),
            children,
        })
    }

    /// Rebuild a forest from its top-level JSON array.
    pub fn from_document(top_level: &[DocumentNode]) -> Result<Self, DocumentError> {
        let root = match top_level {
            [] => return Err(DocumentError::MissingRoot),
            [root] => root,
            _ => {
                return Err(DocumentError::TopLevel {
                    count: top_level.len(),
                });
            }
        };
        if root.node.node_type() != NodeType::Root {
            return Err(DocumentError::MissingRoot);
        }
        if let Some(parent) = root.parent_id {
            return Err(DocumentError::InvalidShape(format!(
                "root `{}` cannot have parent `{parent}`",
                root.id()
            )));
        }

        let mut seen = HashSet::new();
        seen.insert(root.id());
        for child in &root.children {
            validate(child, Some(root.id()), &mut seen)?;
        }

        let mut forest = Forest::new(root.node.clone());
        for child in &root.children {
            forest.insert_validated(child, root.id())?;
        }
        log::debug!("loaded document with {} nodes", forest.node_count());
        Ok(forest)
    }

    /// Insert a whole subtree under `parent`. Nothing is inserted unless
    /// every node can be.
    pub fn insert_subtree(
        &mut self,
        subtree: &DocumentNode,
        parent: NodeId,
    ) -> Result<(), DocumentError> {
        let Some(parent_node) = self.get(parent) else {
            return Err(DocumentError::InvalidShape(format!(
                "parent `{parent}` does not exist"
            )));
        };
        if !parent_node.is_container() {
            return Err(DocumentError::NotAContainer(parent));
        }

        // the subtree's own parentId records where it was cut from
        let mut seen = HashSet::new();
        validate(subtree, None, &mut seen)?;
        if let Some(taken) = seen.iter().find(|id| self.contains(**id)) {
            return Err(DocumentError::DuplicateId(*taken));
        }

        self.insert_validated(subtree, parent)
    }

    fn insert_validated(
        &mut self,
        subtree: &DocumentNode,
        parent: NodeId,
    ) -> Result<(), DocumentError> {
        if !self.insert(subtree.node.clone(), Some(parent)) {
            return Err(DocumentError::InvalidShape(format!(
                "node `{}` could not be placed under `{parent}`",
                subtree.id()
            )));
        }
        for child in &subtree.children {
            self.insert_validated(child, subtree.id())?;
        }
        Ok(())
    }
}

fn validate(
    entry: &DocumentNode,
    parent: Option<NodeId>,
    seen: &mut HashSet<NodeId>,
) -> Result<(), DocumentError> {
    let id = entry.id();
    if entry.node.node_type() == NodeType::Root {
        return Err(DocumentError::NestedRoot(id));
    }
    if !seen.insert(id) {
        return Err(DocumentError::DuplicateId(id));
    }
    if let (Some(declared), Some(actual)) = (entry.parent_id, parent)
        && declared != actual
    {
        return Err(DocumentError::ParentMismatch {
            id,
            declared,
            actual,
        });
    }
    if !entry.children.is_empty() && !entry.node.is_container() {
        return Err(DocumentError::NotAContainer(id));
    }
    for child in &entry.children {
        validate(child, Some(id), seen)?;
    }
    Ok(())
}

// ─── JSON text ───────────────────────────────────────────────────────────

/// Parse a document from its JSON text.
pub fn parse_document(json: &str) -> Result<Forest, DocumentError> {
    let top_level: Vec<DocumentNode> = serde_json::from_str(json)?;
    Forest::from_document(&top_level)
}

/// Emit a forest as pretty-printed JSON.
pub fn emit_document(forest: &Forest) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(&forest.to_document())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, NodeKind, ShapeKind, Size};
    use pretty_assertions::assert_eq;

    fn shape(id: &str) -> Node {
        Node::new(
            NodeId::intern(id),
            id,
            NodeKind::shape(ShapeKind::Ellipse, Color::WHITE),
        )
    }

    fn sample() -> Forest {
        let mut f = Forest::with_canvas(Size::new(800.0, 600.0));
        let layer = Node::new(NodeId::intern("doc-layer"), "Layer", NodeKind::Layer);
        assert!(f.insert(layer, None));
        assert!(f.insert(shape("doc-a"), Some(NodeId::intern("doc-layer"))));
        assert!(f.insert(shape("doc-b"), Some(NodeId::intern("doc-layer"))));
        f
    }

    #[test]
    fn subtree_materializes_parent_ids() {
        let f = sample();
        let doc = f.to_document();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc[0].parent_id, None);
        let layer = &doc[0].children[0];
        assert_eq!(layer.parent_id, Some(f.root_id()));
        assert_eq!(layer.children[1].parent_id, Some(NodeId::intern("doc-layer")));
        assert_eq!(doc[0].node_count(), 4);
    }

    #[test]
    fn document_roundtrip_is_isomorphic() {
        let f = sample();
        let json = emit_document(&f).unwrap();
        let back = parse_document(&json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn rejects_two_top_level_nodes() {
        let f = sample();
        let mut doc = f.to_document();
        doc.push(doc[0].clone());
        assert!(matches!(
            Forest::from_document(&doc),
            Err(DocumentError::TopLevel { count: 2 })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let f = sample();
        let mut doc = f.to_document();
        let dup = doc[0].children[0].children[0].clone();
        doc[0].children[0].children.push(dup);
        assert!(matches!(
            Forest::from_document(&doc),
            Err(DocumentError::DuplicateId(_))
        ));
    }

    #[test]
    fn rejects_children_under_leaf() {
        let f = sample();
        let mut doc = f.to_document();
        let mut leaf = doc[0].children[0].children[0].clone();
        leaf.children.push(DocumentNode {
            node: shape("doc-inner"),
            parent_id: None,
            children: vec![],
        });
        doc[0].children[0].children[0] = leaf;
        assert!(matches!(
            Forest::from_document(&doc),
            Err(DocumentError::NotAContainer(_))
        ));
    }

    #[test]
    fn rejects_stale_parent_reference() {
        let f = sample();
        let mut doc = f.to_document();
        doc[0].children[0].children[0].parent_id = Some(NodeId::intern("elsewhere"));
        assert!(matches!(
            Forest::from_document(&doc),
            Err(DocumentError::ParentMismatch { .. })
        ));
    }

    #[test]
    fn insert_subtree_is_all_or_nothing() {
        let mut f = sample();
        let before = f.clone();
        let mut sub = f.subtree(NodeId::intern("doc-layer")).unwrap();
        // one fresh id, one colliding id
        sub.node.id = NodeId::intern("doc-layer-2");
        sub.children[0].parent_id = Some(sub.node.id);
        sub.children[1].parent_id = Some(sub.node.id);
        sub.children[0].node.id = NodeId::intern("doc-a-2");

        let err = f.insert_subtree(&sub, f.root_id()).unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateId(id) if id == NodeId::intern("doc-b")));
        assert_eq!(f, before);
    }

    #[test]
    fn remap_keeps_links_consistent() {
        let f = sample();
        let mut sub = f.subtree(NodeId::intern("doc-layer")).unwrap();
        sub.remap_ids(&mut |n| NodeId::intern(&format!("{}-x", n.id)));
        assert_eq!(sub.id(), NodeId::intern("doc-layer-x"));
        for child in &sub.children {
            assert_eq!(child.parent_id, Some(sub.id()));
        }

        let mut g = f.clone();
        g.insert_subtree(&sub, g.root_id()).unwrap();
        assert_eq!(g.children(NodeId::intern("doc-layer-x")).len(), 2);
    }

    #[test]
    fn unparsable_and_misshapen_payloads_fail_differently() {
        assert!(parse_document("[{").unwrap_err().is_parse());
        let misshapen = parse_document(r#"[{"id": 3}]"#).unwrap_err();
        assert!(matches!(misshapen, DocumentError::InvalidShape(_)));
        assert!(matches!(
            parse_document("[]"),
            Err(DocumentError::MissingRoot)
        ));
    }
}
