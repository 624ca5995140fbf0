//! Selection state.
//!
//! Ids are kept in click order. Clicking a node inside a group selects the
//! group instead (one level only), so a group behaves as a single object on
//! the canvas. The active layer is sticky: it only changes when a layer
//! itself is selected.

use compo_core::{Forest, NodeId, NodeType};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: SmallVec<[NodeId; 4]>,
    selected_layer: Option<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on `target` (`None` = empty canvas).
    ///
    /// Without `multi` the selection is replaced (or cleared); with `multi`
    /// the resolved target is toggled in or out.
    pub fn select_object(&mut self, forest: &Forest, target: Option<NodeId>, multi: bool) {
        let resolved = target
            .filter(|id| forest.contains(*id) && *id != forest.root_id())
            .map(|id| resolve_group(forest, id));

        let Some(id) = resolved else {
            if target.is_some_and(|id| !forest.contains(id)) {
                log::trace!("select: unknown id {target:?} ignored");
                return;
            }
            if !multi {
                self.ids.clear();
            }
            return;
        };

        if multi {
            if let Some(pos) = self.ids.iter().position(|s| *s == id) {
                self.ids.remove(pos);
            } else {
                self.ids.push(id);
            }
        } else {
            self.ids.clear();
            self.ids.push(id);
        }

        if forest.get(id).map(|n| n.node_type()) == Some(NodeType::Layer) {
            self.selected_layer = Some(id);
        }
        log::debug!("select: {:?} (layer {:?})", self.ids, self.selected_layer);
    }

    /// Select every direct child of the active layer (or of the root when
    /// no layer is active).
    pub fn select_all(&mut self, forest: &Forest) {
        let scope = self.target_parent(forest);
        self.ids = forest.children(scope).into_iter().collect();
    }

    /// Replace the selection outright, keeping the active layer.
    pub fn set(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer exist (e.g. after undo).
    pub fn prune(&mut self, forest: &Forest) {
        self.ids.retain(|id| forest.contains(*id));
        if self.selected_layer.is_some_and(|id| !forest.contains(id)) {
            self.selected_layer = None;
        }
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn selected_layer(&self) -> Option<NodeId> {
        self.selected_layer
    }

    pub fn set_selected_layer(&mut self, layer: Option<NodeId>) {
        self.selected_layer = layer;
    }

    /// Where new content goes: the active layer if it still exists and can
    /// hold children, otherwise the root.
    pub fn target_parent(&self, forest: &Forest) -> NodeId {
        self.selected_layer
            .filter(|id| forest.get(*id).is_some_and(|n| n.is_container()))
            .unwrap_or_else(|| forest.root_id())
    }
}

/// Drop ids that are unknown or have a selected ancestor, keeping click
/// order. Operations on whole subtrees work on this reduced set.
pub fn outermost(forest: &Forest, ids: &[NodeId]) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !forest.contains(*id) || *id == forest.root_id() || out.contains(id) {
            continue;
        }
        if forest.ancestors(*id).iter().any(|a| ids.contains(a)) {
            continue;
        }
        out.push(*id);
    }
    out
}

/// A click on a group member selects the group.
fn resolve_group(forest: &Forest, id: NodeId) -> NodeId {
    match forest.parent_node(id) {
        Some(parent) if parent.node_type() == NodeType::Group => parent.id,
        _ => id,
    }
}
