//! Arena-backed tree store.
//!
//! The forest is a `StableDiGraph` of [`Node`] values with parent→child
//! edges, an `id → NodeIndex` index, and an explicit per-parent child order
//! (storage order = paint order, last child paints on top). A node's parent
//! is read from its single incoming edge, so parent back-references cannot
//! drift from actual membership.
//!
//! Every structural operation comes in two forms:
//!
//! - a `&mut Forest` method returning `bool` (whether anything changed), and
//! - a pure free function `(&Forest, ..) -> Forest` that never touches its
//!   input. History snapshots are built from the pure forms.
//!
//! Both are total: unknown ids leave the forest unchanged.

use crate::id::NodeId;
use crate::model::{Node, NodeChanges, NodeType, Size};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::{HashMap, HashSet};

/// The whole document's structural state at one instant.
#[derive(Debug, Clone)]
pub struct Forest {
    graph: StableDiGraph<Node, ()>,
    root: NodeIndex,
    id_index: HashMap<NodeId, NodeIndex>,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl Forest {
    /// Create a forest holding only `root`. A non-root `root` argument is
    /// retyped into a root so the forest always has exactly one.
    #[must_use]
    pub fn new(root: Node) -> Self {
        let root = if root.node_type() == NodeType::Root {
            root
        } else {
            let mut fallback = Node::root(root.size);
            fallback.position = root.position;
            fallback
        };
        let mut graph = StableDiGraph::new();
        let id = root.id;
        let root_idx = graph.add_node(root);
        let mut id_index = HashMap::new();
        id_index.insert(id, root_idx);

        Self {
            graph,
            root: root_idx,
            id_index,
            child_order: HashMap::new(),
        }
    }

    /// An empty document with a root of the given canvas size.
    #[must_use]
    pub fn with_canvas(size: Size) -> Self {
        Self::new(Node::root(size))
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn root(&self) -> &Node {
        &self.graph[self.root]
    }

    pub fn root_id(&self) -> NodeId {
        self.graph[self.root].id
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Look up a node by id anywhere in the forest.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Parent id of `id`; `None` for the root or an unknown id.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        let idx = self.index_of(id)?;
        self.parent_idx(idx).map(|p| self.graph[p].id)
    }

    pub fn parent_node(&self, id: NodeId) -> Option<&Node> {
        let idx = self.index_of(id)?;
        self.parent_idx(idx).map(|p| &self.graph[p])
    }

    /// Children of `id` in storage (paint) order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.index_of(id)
            .map(|idx| self.ordered_children(idx).map(|c| self.graph[c].id).collect())
            .unwrap_or_default()
    }

    pub fn child_nodes(&self, id: NodeId) -> Vec<&Node> {
        self.index_of(id)
            .map(|idx| self.ordered_children(idx).map(|c| &self.graph[c]).collect())
            .unwrap_or_default()
    }

    /// All nodes sharing `id`'s parent, `id` included, in storage order.
    pub fn siblings(&self, id: NodeId) -> Vec<NodeId> {
        self.parent_of(id)
            .map(|p| self.children(p))
            .unwrap_or_default()
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(mut idx) = self.index_of(id) else {
            return out;
        };
        while let Some(parent) = self.parent_idx(idx) {
            out.push(self.graph[parent].id);
            idx = parent;
        }
        out
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        ancestor != descendant && self.ancestors(descendant).contains(&ancestor)
    }

    /// Every node below `id` in pre-order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(idx) = self.index_of(id) {
            self.collect_subtree(idx, &mut out);
            out.remove(0);
        }
        out
    }

    /// Depth-first, pre-order walk of the whole forest starting at the root.
    pub fn depth_first(&self) -> Vec<&Node> {
        let mut ids = Vec::with_capacity(self.node_count());
        self.collect_subtree(self.root, &mut ids);
        ids.into_iter().map(|id| &self.graph[self.id_index[&id]]).collect()
    }

    /// Highest `zIndex` among the children of `parent`.
    pub fn max_child_z(&self, parent: NodeId) -> Option<i32> {
        self.child_nodes(parent).iter().map(|n| n.z_index).max()
    }

    /// The `zIndex` a node appended under `parent` should take.
    pub fn next_z(&self, parent: NodeId) -> i32 {
        self.max_child_z(parent).map_or(0, |z| z + 1)
    }

    /// Return `base` if unused, otherwise `base-N` for the first free counter
    /// value. Never returns an id present in this forest.
    pub fn unique_id(&self, base: &str) -> NodeId {
        let candidate = NodeId::intern(base);
        if !self.contains(candidate) {
            return candidate;
        }
        loop {
            let candidate = NodeId::intern(&format!("{base}-{}", crate::id::next_suffix()));
            if !self.contains(candidate) {
                return candidate;
            }
        }
    }

    /// Mint a fresh id for a node of `kind`.
    pub fn mint_id(&self, kind: NodeType) -> NodeId {
        loop {
            let candidate = NodeId::with_prefix(kind.id_prefix());
            if !self.contains(candidate) {
                return candidate;
            }
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Append `node` to `parent`'s children (`None` → the root).
    ///
    /// No-op when the parent is unknown or not a container, when the id is
    /// already taken, or when `node` is a second root.
    pub fn insert(&mut self, node: Node, parent: Option<NodeId>) -> bool {
        let parent_id = parent.unwrap_or_else(|| self.root_id());
        let Some(parent_idx) = self.index_of(parent_id) else {
            log::trace!("insert {}: parent {parent_id} not found", node.id);
            return false;
        };
        if !self.graph[parent_idx].is_container() {
            log::warn!("insert {}: parent {parent_id} cannot hold children", node.id);
            return false;
        }
        if self.contains(node.id) {
            log::warn!("insert {}: id already present", node.id);
            return false;
        }
        if node.node_type() == NodeType::Root {
            log::warn!("insert {}: a document has exactly one root", node.id);
            return false;
        }

        let id = node.id;
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        self.link(parent_idx, idx);
        log::trace!("insert {id} under {parent_id}");
        true
    }

    /// Remove `id` and its whole subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx == self.root {
            return false;
        }

        let mut doomed = Vec::new();
        self.collect_subtree(idx, &mut doomed);
        let parent = self.parent_idx(idx);
        self.unlink(idx);
        if let Some(parent) = parent {
            self.renumber_z(parent);
        }
        for gone in &doomed {
            if let Some(gone_idx) = self.id_index.remove(gone) {
                self.child_order.remove(&gone_idx);
                self.graph.remove_node(gone_idx);
            }
        }
        log::trace!("remove {id} ({} nodes)", doomed.len());
        true
    }

    /// Shallow-merge `changes` into the node.
    pub fn update(&mut self, id: NodeId, changes: &NodeChanges) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        changes.apply(&mut self.graph[idx]);
        true
    }

    /// Move `id` (with its subtree) to the end of `new_parent`'s children.
    /// Both the old and the new siblings get their z renumbered.
    ///
    /// No-op for the root, unknown ids, non-container targets, and targets
    /// inside `id`'s own subtree.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> bool {
        let (Some(idx), Some(parent_idx)) = (self.index_of(id), self.index_of(new_parent)) else {
            return false;
        };
        if idx == self.root || !self.graph[parent_idx].is_container() {
            return false;
        }
        if id == new_parent || self.is_ancestor_of(id, new_parent) {
            log::warn!("reparent {id} into {new_parent}: would create a cycle");
            return false;
        }

        let old_parent = self.parent_idx(idx);
        self.unlink(idx);
        self.link(parent_idx, idx);
        if let Some(old_parent) = old_parent {
            self.renumber_z(old_parent);
        }
        self.renumber_z(parent_idx);
        log::trace!("reparent {id} → {new_parent}");
        true
    }

    /// Move a node to the front of its siblings (last child, painted on top).
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        self.shift(id, |_, len| len - 1)
    }

    /// Move a node to the back of its siblings (first child).
    pub fn move_to_back(&mut self, id: NodeId) -> bool {
        self.shift(id, |_, _| 0)
    }

    /// Move a node one step toward the front. No-op at the front.
    pub fn move_forward(&mut self, id: NodeId) -> bool {
        self.shift(id, |pos, len| (pos + 1).min(len - 1))
    }

    /// Move a node one step toward the back. No-op at the back.
    pub fn move_backward(&mut self, id: NodeId) -> bool {
        self.shift(id, |pos, _| pos.saturating_sub(1))
    }

    /// Replace the child order of `parent` with `order`, which must be a
    /// permutation of its current children.
    pub fn set_child_order(&mut self, parent: NodeId, order: &[NodeId]) -> bool {
        let Some(parent_idx) = self.index_of(parent) else {
            return false;
        };
        let current: Vec<NodeIndex> = self.ordered_children(parent_idx).collect();
        let proposed: Option<Vec<NodeIndex>> =
            order.iter().map(|id| self.index_of(*id)).collect();
        let Some(proposed) = proposed else {
            return false;
        };
        if proposed.len() != current.len()
            || proposed.iter().collect::<HashSet<_>>() != current.iter().collect::<HashSet<_>>()
        {
            log::warn!("set_child_order on {parent}: not a permutation of its children");
            return false;
        }
        if proposed == current {
            return false;
        }
        self.child_order.insert(parent_idx, proposed);
        self.renumber_z(parent_idx);
        true
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    fn parent_idx(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    fn ordered_children(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.child_order
            .get(&idx)
            .map(|v| v.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
    }

    fn collect_subtree(&self, idx: NodeIndex, out: &mut Vec<NodeId>) {
        out.push(self.graph[idx].id);
        for child in self.ordered_children(idx) {
            self.collect_subtree(child, out);
        }
    }

    /// Edges and child order change only here and in `unlink`.
    fn link(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.graph.add_edge(parent, child, ());
        self.child_order.entry(parent).or_default().push(child);
    }

    fn unlink(&mut self, child: NodeIndex) {
        let Some(parent) = self.parent_idx(child) else {
            return;
        };
        if let Some(edge) = self.graph.find_edge(parent, child) {
            self.graph.remove_edge(edge);
        }
        if let Some(order) = self.child_order.get_mut(&parent) {
            order.retain(|c| *c != child);
        }
    }

    fn shift(&mut self, id: NodeId, target: impl FnOnce(usize, usize) -> usize) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let Some(parent) = self.parent_idx(idx) else {
            return false;
        };
        let Some(order) = self.child_order.get_mut(&parent) else {
            return false;
        };
        let Some(from) = order.iter().position(|c| *c == idx) else {
            return false;
        };
        let to = target(from, order.len());
        if to == from {
            return false;
        }
        let child = order.remove(from);
        order.insert(to, child);
        self.renumber_z(parent);
        log::trace!("z-order {id}: {from} → {to}");
        true
    }

    /// Keep stored `zIndex` equal to storage position among siblings.
    fn renumber_z(&mut self, parent: NodeIndex) {
        if let Some(order) = self.child_order.get(&parent) {
            for (z, child) in order.iter().enumerate() {
                self.graph[*child].z_index = z as i32;
            }
        }
    }

    fn subtree_eq(&self, a: NodeIndex, other: &Forest, b: NodeIndex) -> bool {
        if self.graph[a] != other.graph[b] {
            return false;
        }
        let left: Vec<NodeIndex> = self.ordered_children(a).collect();
        let right: Vec<NodeIndex> = other.ordered_children(b).collect();
        left.len() == right.len()
            && left
                .iter()
                .zip(&right)
                .all(|(l, r)| self.subtree_eq(*l, other, *r))
    }

    /// Edge-level consistency data for the invariant checker.
    pub(crate) fn raw_graph(&self) -> &StableDiGraph<Node, ()> {
        &self.graph
    }

    pub(crate) fn raw_order_len(&self, id: NodeId) -> usize {
        self.index_of(id)
            .and_then(|idx| self.child_order.get(&idx))
            .map_or(0, Vec::len)
    }

    pub(crate) fn indexed_ids(&self) -> impl Iterator<Item = (NodeId, NodeIndex)> + '_ {
        self.id_index.iter().map(|(id, idx)| (*id, *idx))
    }
}

impl Default for Forest {
    fn default() -> Self {
        Self::with_canvas(Size::new(1080.0, 1080.0))
    }
}

/// Structural equality: same nodes, same parent/child relationships, same
/// child order. Arena indices are not compared.
impl PartialEq for Forest {
    fn eq(&self, other: &Self) -> bool {
        self.node_count() == other.node_count() && self.subtree_eq(self.root, other, other.root)
    }
}

// ─── Pure operations ─────────────────────────────────────────────────────

fn derive(forest: &Forest, op: impl FnOnce(&mut Forest) -> bool) -> Forest {
    let mut next = forest.clone();
    op(&mut next);
    next
}

/// Depth-first lookup by id.
pub fn find_node_by_id(forest: &Forest, id: NodeId) -> Option<&Node> {
    forest.get(id)
}

/// The node whose children directly contain `child`; `None` for the root or
/// an unknown id.
pub fn find_parent_node(forest: &Forest, child: NodeId) -> Option<&Node> {
    forest.parent_node(child)
}

/// Remove `id` and its subtree.
#[must_use]
pub fn remove_node_from_parent(forest: &Forest, id: NodeId) -> Forest {
    derive(forest, |f| f.remove(id))
}

/// Append `node` under `parent` (`None` → top level, i.e. the root).
#[must_use]
pub fn insert_node(forest: &Forest, node: Node, parent: Option<NodeId>) -> Forest {
    derive(forest, |f| f.insert(node, parent))
}

/// Shallow-merge `changes` into the node with `id`.
#[must_use]
pub fn update_node_in_tree(forest: &Forest, id: NodeId, changes: &NodeChanges) -> Forest {
    derive(forest, |f| f.update(id, changes))
}

/// Relocate `id`'s subtree into `parent` (drag-over preview).
///
/// Duplicate membership cannot be represented in the arena, so the
/// add-then-remove pair is a single move here.
#[must_use]
pub fn add_node_to_parent(forest: &Forest, id: NodeId, parent: NodeId) -> Forest {
    derive(forest, |f| f.reparent(id, parent))
}

/// Same as [`add_node_to_parent`], named for drops that commit the move.
#[must_use]
pub fn reparent_node(forest: &Forest, id: NodeId, parent: NodeId) -> Forest {
    add_node_to_parent(forest, id, parent)
}

#[must_use]
pub fn move_node_to_front(forest: &Forest, id: NodeId) -> Forest {
    derive(forest, |f| f.move_to_front(id))
}

#[must_use]
pub fn move_node_to_back(forest: &Forest, id: NodeId) -> Forest {
    derive(forest, |f| f.move_to_back(id))
}

#[must_use]
pub fn move_node_forward(forest: &Forest, id: NodeId) -> Forest {
    derive(forest, |f| f.move_forward(id))
}

#[must_use]
pub fn move_node_backward(forest: &Forest, id: NodeId) -> Forest {
    derive(forest, |f| f.move_backward(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, NodeKind, Position, ShapeKind};
    use pretty_assertions::assert_eq;

    fn shape(id: &str) -> Node {
        Node::new(
            NodeId::intern(id),
            id,
            NodeKind::shape(ShapeKind::Rect, Color::BLACK),
        )
    }

    fn layer(id: &str) -> Node {
        Node::new(NodeId::intern(id), id, NodeKind::Layer)
    }

    /// root → L1 → [a, b, c]
    fn sample() -> Forest {
        let mut f = Forest::default();
        assert!(f.insert(layer("L1"), None));
        for id in ["a", "b", "c"] {
            assert!(f.insert(shape(id), Some(NodeId::intern("L1"))));
        }
        f
    }

    fn ids(list: &[&str]) -> Vec<NodeId> {
        list.iter().map(|s| NodeId::intern(s)).collect()
    }

    #[test]
    fn insert_and_find() {
        let f = sample();
        let b = NodeId::intern("b");
        assert_eq!(find_node_by_id(&f, b).map(|n| n.name.as_str()), Some("b"));
        assert_eq!(
            find_parent_node(&f, b).map(|n| n.id),
            Some(NodeId::intern("L1"))
        );
        assert_eq!(find_parent_node(&f, f.root_id()), None);
        assert_eq!(f.node_count(), 5);
    }

    #[test]
    fn insert_without_parent_goes_to_root() {
        let f = insert_node(&Forest::default(), layer("top"), None);
        assert_eq!(f.parent_of(NodeId::intern("top")), Some(f.root_id()));
    }

    #[test]
    fn insert_misses_are_noops() {
        let f = sample();
        let g = insert_node(&f, shape("x"), Some(NodeId::intern("nope")));
        assert_eq!(g, f);

        // parent exists but is a leaf
        let g = insert_node(&f, shape("x"), Some(NodeId::intern("a")));
        assert_eq!(g, f);

        // colliding id
        let g = insert_node(&f, shape("a"), None);
        assert_eq!(g, f);

        // second root
        let g = insert_node(&f, Node::root(Size::new(1.0, 1.0)), None);
        assert_eq!(g, f);
    }

    #[test]
    fn pure_ops_leave_input_untouched() {
        let f = sample();
        let before = f.clone();
        let g = remove_node_from_parent(&f, NodeId::intern("a"));
        assert_eq!(f, before);
        assert_ne!(g, f);
    }

    #[test]
    fn remove_takes_whole_subtree() {
        let f = sample();
        let g = remove_node_from_parent(&f, NodeId::intern("L1"));
        for id in ["L1", "a", "b", "c"] {
            assert!(!g.contains(NodeId::intern(id)), "{id} survived");
        }
        assert_eq!(g.node_count(), 1);
        assert!(g.children(g.root_id()).is_empty());
    }

    #[test]
    fn root_is_permanent() {
        let f = sample();
        assert_eq!(remove_node_from_parent(&f, f.root_id()), f);
        assert_eq!(add_node_to_parent(&f, f.root_id(), NodeId::intern("L1")), f);
    }

    #[test]
    fn update_merges_shallowly() {
        let f = sample();
        let a = NodeId::intern("a");
        let g = update_node_in_tree(&f, a, &NodeChanges::position(5.0, 6.0));
        assert_eq!(g.get(a).unwrap().position, Position::new(5.0, 6.0));
        assert_eq!(g.get(a).unwrap().name, "a");
        assert_eq!(update_node_in_tree(&f, NodeId::intern("zz"), &NodeChanges::default()), f);
    }

    #[test]
    fn reparent_moves_subtree_and_rejects_cycles() {
        let mut f = sample();
        assert!(f.insert(
            Node::new(NodeId::intern("G"), "G", NodeKind::Group),
            Some(NodeId::intern("L1"))
        ));
        let g = add_node_to_parent(&f, NodeId::intern("a"), NodeId::intern("G"));
        assert_eq!(g.parent_of(NodeId::intern("a")), Some(NodeId::intern("G")));
        assert_eq!(g.children(NodeId::intern("L1")), ids(&["b", "c", "G"]));

        // L1 into its own descendant G
        let h = add_node_to_parent(&g, NodeId::intern("L1"), NodeId::intern("G"));
        assert_eq!(h, g);
        // into itself
        let h = add_node_to_parent(&g, NodeId::intern("G"), NodeId::intern("G"));
        assert_eq!(h, g);

        let back = reparent_node(&g, NodeId::intern("a"), NodeId::intern("L1"));
        assert_eq!(back.children(NodeId::intern("L1")), ids(&["b", "c", "G", "a"]));
    }

    #[test]
    fn reparent_and_remove_keep_z_in_storage_order() {
        let mut f = sample();
        let l1 = NodeId::intern("L1");
        let l2 = NodeId::intern("L2");
        assert!(f.insert(layer("L2"), None));
        let z = |f: &Forest, parent: NodeId| -> Vec<i32> {
            f.child_nodes(parent).iter().map(|n| n.z_index).collect()
        };

        assert!(f.reparent(NodeId::intern("a"), l2));
        assert!(f.reparent(NodeId::intern("c"), l2));
        assert_eq!(f.children(l1), ids(&["b"]));
        assert_eq!(z(&f, l1), vec![0]);
        assert_eq!(f.children(l2), ids(&["a", "c"]));
        assert_eq!(z(&f, l2), vec![0, 1]);

        assert!(f.reparent(NodeId::intern("a"), l1));
        assert_eq!(z(&f, l1), vec![0, 1]);
        assert_eq!(z(&f, l2), vec![0]);

        assert!(f.remove(NodeId::intern("b")));
        assert_eq!(f.children(l1), ids(&["a"]));
        assert_eq!(z(&f, l1), vec![0]);
    }

    #[test]
    fn z_order_moves() {
        let f = sample();
        let l1 = NodeId::intern("L1");
        let a = NodeId::intern("a");
        let c = NodeId::intern("c");

        let g = move_node_to_front(&f, a);
        assert_eq!(g.children(l1), ids(&["b", "c", "a"]));
        assert_eq!(g.get(a).unwrap().z_index, 2);

        let g = move_node_to_back(&f, c);
        assert_eq!(g.children(l1), ids(&["c", "a", "b"]));

        let g = move_node_forward(&f, a);
        assert_eq!(g.children(l1), ids(&["b", "a", "c"]));

        let g = move_node_backward(&f, c);
        assert_eq!(g.children(l1), ids(&["a", "c", "b"]));
    }

    #[test]
    fn z_order_is_idempotent_at_extremes() {
        let f = sample();
        let a = NodeId::intern("a");
        let once = move_node_to_front(&f, a);
        assert_eq!(move_node_to_front(&once, a), once);
        let once = move_node_to_back(&f, a);
        assert_eq!(move_node_to_back(&once, a), once);

        // forward at the front, backward at the back
        let front = NodeId::intern("c");
        assert_eq!(move_node_forward(&f, front), f);
        assert_eq!(move_node_backward(&f, a), f);
    }

    #[test]
    fn set_child_order_requires_permutation() {
        let mut f = sample();
        let l1 = NodeId::intern("L1");
        assert!(!f.set_child_order(l1, &ids(&["a", "b"])));
        assert!(!f.set_child_order(l1, &ids(&["a", "b", "zz"])));
        assert!(f.set_child_order(l1, &ids(&["c", "b", "a"])));
        assert_eq!(f.children(l1), ids(&["c", "b", "a"]));
        assert_eq!(f.get(NodeId::intern("c")).unwrap().z_index, 0);
    }

    #[test]
    fn ancestry_queries() {
        let f = sample();
        let a = NodeId::intern("a");
        let l1 = NodeId::intern("L1");
        assert_eq!(f.ancestors(a), vec![l1, f.root_id()]);
        assert!(f.is_ancestor_of(f.root_id(), a));
        assert!(!f.is_ancestor_of(a, l1));
        assert!(!f.is_ancestor_of(a, a));
        assert_eq!(f.descendants(l1), ids(&["a", "b", "c"]));
        assert_eq!(f.siblings(a), ids(&["a", "b", "c"]));
        assert_eq!(f.depth_first().len(), 5);
    }

    #[test]
    fn unique_id_avoids_collisions() {
        let f = sample();
        assert_eq!(f.unique_id("fresh"), NodeId::intern("fresh"));
        let dup = f.unique_id("a");
        assert_ne!(dup, NodeId::intern("a"));
        assert!(dup.as_str().starts_with("a-"));
        assert!(!f.contains(f.mint_id(NodeType::Shape)));
    }

    #[test]
    fn next_z_follows_max() {
        let mut f = sample();
        let l1 = NodeId::intern("L1");
        assert_eq!(f.next_z(NodeId::intern("a")), 0);
        // inserted nodes keep whatever z they came with
        assert_eq!(f.next_z(l1), 1);
        f.update(NodeId::intern("b"), &NodeChanges {
            z_index: Some(7),
            ..Default::default()
        });
        assert_eq!(f.next_z(l1), 8);
    }
}
