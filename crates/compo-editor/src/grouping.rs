//! Operations over the current selection: group, ungroup, z-order, delete,
//! duplicate.
//!
//! Every function takes the forest by reference and returns the next forest
//! (or `None` when the selection gives it nothing to do), so the editor can
//! commit the result as one undo step.

use crate::clipboard::{Pasted, copies_of, insert_copies};
use crate::selection::outermost;
use compo_core::{Forest, Node, NodeId, NodeKind, NodeType, Position, Rect, Size};
use std::collections::HashSet;

/// Direction of a z-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZMove {
    ToFront,
    ToBack,
    Forward,
    Backward,
}

/// Wrap the selected nodes in a new group under the first node's parent.
///
/// Returns the new forest and the group's id. Child positions are kept as
/// they are; the group's frame is the union of their bounds.
pub fn group(forest: &Forest, selected: &[NodeId]) -> Option<(Forest, NodeId)> {
    let candidates = outermost(forest, selected);
    let first = *candidates.first()?;
    let parent = forest.parent_of(first)?;

    // a node cannot be moved into a group that will live inside it
    let members: Vec<NodeId> = candidates
        .into_iter()
        .filter(|id| *id != parent && !forest.is_ancestor_of(*id, parent))
        .collect();
    if members.len() < 2 {
        log::trace!("group: needs at least two nodes, got {}", members.len());
        return None;
    }

    let bounds = members
        .iter()
        .filter_map(|id| forest.get(*id))
        .map(Node::bounds)
        .reduce(|acc, r| acc.union(r))
        .unwrap_or(Rect::ZERO);

    let mut next = forest.clone();
    let group_id = next.mint_id(NodeType::Group);
    let mut group = Node::new(group_id, "Group", NodeKind::Group).with_frame(
        Position::new(bounds.x0, bounds.y0),
        Size::new(bounds.width(), bounds.height()),
    );
    group.z_index = next.next_z(parent);
    group.is_expanded = true;
    if !next.insert(group, Some(parent)) {
        return None;
    }
    for id in &members {
        next.reparent(*id, group_id);
    }
    log::debug!("group: {} nodes into {group_id}", members.len());
    Some((next, group_id))
}

/// Dissolve every selected group: its children move to the group's parent
/// (appended in their original order) and the group is removed.
pub fn ungroup(forest: &Forest, selected: &[NodeId]) -> Option<Forest> {
    let mut next = forest.clone();
    let mut changed = false;
    for id in selected {
        let Some(node) = next.get(*id) else {
            continue;
        };
        if node.node_type() != NodeType::Group {
            continue;
        }
        let Some(parent) = next.parent_of(*id) else {
            continue;
        };
        for child in next.children(*id) {
            next.reparent(child, parent);
        }
        next.remove(*id);
        changed = true;
    }
    changed.then_some(next)
}

/// Move the selection in paint order. Selected siblings move as a block and
/// keep their mutual order.
pub fn reorder(forest: &Forest, selected: &[NodeId], direction: ZMove) -> Option<Forest> {
    let ids = outermost(forest, selected);
    let chosen: HashSet<NodeId> = ids.iter().copied().collect();

    let mut parents: Vec<NodeId> = Vec::new();
    for id in &ids {
        if let Some(parent) = forest.parent_of(*id)
            && !parents.contains(&parent)
        {
            parents.push(parent);
        }
    }

    let mut next = forest.clone();
    let mut changed = false;
    for parent in parents {
        let order = reordered(&forest.children(parent), &chosen, direction);
        changed |= next.set_child_order(parent, &order);
    }
    changed.then_some(next)
}

fn reordered(siblings: &[NodeId], chosen: &HashSet<NodeId>, direction: ZMove) -> Vec<NodeId> {
    let (picked, rest): (Vec<NodeId>, Vec<NodeId>) =
        siblings.iter().partition(|id| chosen.contains(*id));
    let mut order = siblings.to_vec();
    match direction {
        ZMove::ToFront => {
            order = rest;
            order.extend(picked);
        }
        ZMove::ToBack => {
            order = picked;
            order.extend(rest);
        }
        // leading edge first, so a block moves one slot without leapfrogging
        ZMove::Forward => {
            for i in (0..order.len().saturating_sub(1)).rev() {
                if chosen.contains(&order[i]) && !chosen.contains(&order[i + 1]) {
                    order.swap(i, i + 1);
                }
            }
        }
        ZMove::Backward => {
            for i in 1..order.len() {
                if chosen.contains(&order[i]) && !chosen.contains(&order[i - 1]) {
                    order.swap(i, i - 1);
                }
            }
        }
    }
    order
}

/// Remove the selected subtrees.
pub fn delete(forest: &Forest, selected: &[NodeId]) -> Option<Forest> {
    let ids = outermost(forest, selected);
    if ids.is_empty() {
        return None;
    }
    let mut next = forest.clone();
    for id in ids {
        next.remove(id);
    }
    Some(next)
}

/// Copy each selected subtree in place, directly above its original.
/// The clipboard is not touched.
pub fn duplicate(forest: &Forest, selected: &[NodeId]) -> Option<Pasted> {
    let mut next = forest.clone();
    let mut ids = Vec::new();
    for original in outermost(forest, selected) {
        let Some(parent) = next.parent_of(original) else {
            continue;
        };
        let copies = copies_of(&next, &[original]);
        let Some(pasted) = insert_copies(&next, copies, parent) else {
            continue;
        };
        next = pasted.forest;

        let mut order = next.children(parent);
        for copy in &pasted.ids {
            order.retain(|id| id != copy);
        }
        if let Some(pos) = order.iter().position(|id| *id == original) {
            for (offset, copy) in pasted.ids.iter().enumerate() {
                order.insert(pos + 1 + offset, *copy);
            }
            next.set_child_order(parent, &order);
        }
        ids.extend(pasted.ids);
    }
    if ids.is_empty() {
        return None;
    }
    Some(Pasted { forest: next, ids })
}

#[cfg(test)]
mod tests {
    use super::*;
    use compo_core::{Color, ShapeKind, is_well_formed, lint_document};
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn ids(list: &[&str]) -> Vec<NodeId> {
        list.iter().map(|s| id(s)).collect()
    }

    /// Sibling z equals storage position everywhere and lint sees no drift.
    fn assert_z_in_storage_order(f: &Forest) {
        for parent in f.depth_first() {
            let z: Vec<i32> = f.child_nodes(parent.id).iter().map(|n| n.z_index).collect();
            let expected: Vec<i32> = (0..z.len() as i32).collect();
            assert_eq!(z, expected, "children of {}", parent.id);
        }
        let drift: Vec<_> = lint_document(f)
            .into_iter()
            .filter(|d| d.rule == "z-order-drift")
            .collect();
        assert!(drift.is_empty(), "{drift:?}");
        assert!(is_well_formed(f));
    }

    fn rect(name: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
        Node::new(id(name), name, NodeKind::shape(ShapeKind::Rect, Color::BLACK))
            .with_frame(Position::new(x, y), Size::new(w, h))
    }

    /// root → g-L → [g-a, g-b, g-c, g-d]
    fn forest() -> Forest {
        let mut f = Forest::default();
        assert!(f.insert(Node::new(id("g-L"), "L", NodeKind::Layer), None));
        let layer = Some(id("g-L"));
        assert!(f.insert(rect("g-a", 10.0, 10.0, 20.0, 20.0), layer));
        assert!(f.insert(rect("g-b", 50.0, 40.0, 10.0, 30.0), layer));
        assert!(f.insert(rect("g-c", 0.0, 0.0, 5.0, 5.0), layer));
        assert!(f.insert(rect("g-d", 0.0, 0.0, 5.0, 5.0), layer));
        f
    }

    #[test]
    fn group_uses_union_bounds() {
        let f = forest();
        let (g, group) = group(&f, &ids(&["g-a", "g-b"])).unwrap();
        let node = g.get(group).unwrap();
        assert_eq!(node.position, Position::new(10.0, 10.0));
        assert_eq!(node.size, Size::new(50.0, 60.0));
        assert_eq!(g.parent_of(group), Some(id("g-L")));
        assert_eq!(g.children(group), ids(&["g-a", "g-b"]));
        // children keep their own positions
        assert_eq!(g.get(id("g-b")).unwrap().position, Position::new(50.0, 40.0));
        assert_eq!(g.children(id("g-L")), vec![id("g-c"), id("g-d"), group]);
        assert_z_in_storage_order(&g);
    }

    #[test]
    fn group_needs_two_nodes() {
        let f = forest();
        assert!(group(&f, &ids(&["g-a"])).is_none());
        assert!(group(&f, &ids(&["g-a", "missing"])).is_none());
        // g-a sits inside the selected layer, leaving only the layer
        assert!(group(&f, &ids(&["g-a", "g-L"])).is_none());
    }

    #[test]
    fn ungroup_restores_members() {
        let f = forest();
        let (g, group_id) = group(&f, &ids(&["g-b", "g-c"])).unwrap();
        let h = ungroup(&g, &[group_id]).unwrap();
        assert!(!h.contains(group_id));
        for member in ["g-b", "g-c"] {
            assert_eq!(h.parent_of(id(member)), Some(id("g-L")));
            let (before, after) = (f.get(id(member)).unwrap(), h.get(id(member)).unwrap());
            assert_eq!(after.position, before.position);
            assert_eq!(after.size, before.size);
        }
        // members land on top, in their original order
        assert_eq!(h.children(id("g-L")), ids(&["g-a", "g-d", "g-b", "g-c"]));
        assert_z_in_storage_order(&h);
        assert!(ungroup(&h, &ids(&["g-a"])).is_none());
    }

    #[test]
    fn block_moves_keep_mutual_order() {
        let f = forest();
        let layer = id("g-L");
        let sel = ids(&["g-c", "g-a"]);

        let front = reorder(&f, &sel, ZMove::ToFront).unwrap();
        assert_eq!(front.children(layer), ids(&["g-b", "g-d", "g-a", "g-c"]));

        let back = reorder(&f, &sel, ZMove::ToBack).unwrap();
        assert_eq!(back.children(layer), ids(&["g-a", "g-c", "g-b", "g-d"]));

        let fwd = reorder(&f, &sel, ZMove::Forward).unwrap();
        assert_eq!(fwd.children(layer), ids(&["g-b", "g-a", "g-d", "g-c"]));

        let bwd = reorder(&f, &sel, ZMove::Backward).unwrap();
        assert_eq!(bwd.children(layer), ids(&["g-a", "g-c", "g-b", "g-d"]));
    }

    #[test]
    fn adjacent_block_does_not_leapfrog() {
        let f = forest();
        let layer = id("g-L");
        let fwd = reorder(&f, &ids(&["g-a", "g-b"]), ZMove::Forward).unwrap();
        assert_eq!(fwd.children(layer), ids(&["g-c", "g-a", "g-b", "g-d"]));
        // already at the front
        assert!(reorder(&f, &ids(&["g-c", "g-d"]), ZMove::Forward).is_none());
        assert!(reorder(&f, &ids(&["g-d"]), ZMove::ToFront).is_none());
    }

    #[test]
    fn delete_removes_outermost() {
        let f = forest();
        let g = delete(&f, &ids(&["g-a", "g-L"])).unwrap();
        assert_eq!(g.node_count(), 1);
        assert!(delete(&f, &[]).is_none());
    }

    #[test]
    fn duplicate_sits_above_original() {
        let f = forest();
        let out = duplicate(&f, &ids(&["g-b"])).unwrap();
        let copy = out.ids[0];
        assert_eq!(
            out.forest.children(id("g-L")),
            vec![id("g-a"), id("g-b"), copy, id("g-c"), id("g-d")]
        );
        assert_eq!(out.forest.get(copy).unwrap().name, "g-b copy");
    }
}
