//! Integration tests: a short editing session driven through `Editor`.
//!
//! Insert an image, try to group it alone, add a shape, group both, and
//! walk the whole session back with undo.

use compo_core::*;
use compo_editor::grouping;
use compo_editor::{EditAction, Editor};
use pretty_assertions::assert_eq;

fn image(name: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
    Node::fresh(name, NodeKind::Image { src: format!("{name}.png") })
        .with_frame(Position::new(x, y), Size::new(w, h))
}

fn rect(name: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
    Node::fresh(name, NodeKind::shape(ShapeKind::Rect, Color::from_hex("#ff0066").unwrap()))
        .with_frame(Position::new(x, y), Size::new(w, h))
}

#[test]
fn group_two_nodes_from_an_empty_canvas() {
    let mut editor = Editor::default();
    let root = editor.forest().root_id();
    assert_eq!(editor.forest().node_count(), 1);

    let photo = editor
        .add_node(image("photo", 100.0, 100.0, 200.0, 150.0), Some(root))
        .unwrap();
    assert_eq!(editor.forest().node_count(), 2);
    assert!(editor.can_undo());

    editor.select_object(Some(photo), false);
    assert_eq!(editor.selection().ids(), &[photo]);

    // a single existing node cannot be grouped
    let missing = NodeId::intern("never-inserted");
    assert!(grouping::group(editor.forest(), &[photo, missing]).is_none());
    assert!(editor.group_selected().is_none());
    assert_eq!(editor.forest().node_count(), 2);

    let badge = editor
        .add_node(rect("badge", 250.0, 50.0, 100.0, 100.0), Some(root))
        .unwrap();
    editor.select_object(Some(photo), false);
    editor.select_object(Some(badge), true);
    assert_eq!(editor.selection().ids(), &[photo, badge]);

    let group = editor.group_selected().unwrap();
    let forest = editor.forest();
    assert_eq!(forest.node_count(), 4);
    assert_eq!(forest.children(root), vec![group]);
    assert_eq!(forest.children(group), vec![photo, badge]);
    assert_eq!(editor.selection().ids(), &[group]);

    let frame = forest.get(group).unwrap().bounds();
    assert_eq!(frame, Rect::new(100.0, 50.0, 350.0, 250.0));
    for member in [photo, badge] {
        let r = forest.get(member).unwrap().bounds();
        assert_eq!(frame.union(r), frame);
    }
    assert!(is_well_formed(forest));
}

#[test]
fn session_unwinds_step_by_step() {
    let mut editor = Editor::default();
    let a = editor.add_node(rect("a", 0.0, 0.0, 10.0, 10.0), None).unwrap();
    let b = editor.add_node(rect("b", 20.0, 0.0, 10.0, 10.0), None).unwrap();
    editor.select_object(Some(a), false);
    editor.select_object(Some(b), true);
    let group = editor.group_selected().unwrap();
    assert!(editor.perform(EditAction::Ungroup));
    assert!(!editor.forest().contains(group));

    assert_eq!(editor.undo().as_deref(), Some("Ungroup"));
    assert_eq!(editor.forest().parent_of(a), Some(group));
    assert_eq!(editor.undo().as_deref(), Some("Group"));
    assert!(!editor.forest().contains(group));
    assert_eq!(editor.undo().as_deref(), Some("Add shape"));
    assert_eq!(editor.undo().as_deref(), Some("Add shape"));
    assert_eq!(editor.forest().node_count(), 1);
    assert_eq!(editor.undo(), None);

    // everything comes back in the same order
    for _ in 0..4 {
        assert!(editor.redo().is_some());
    }
    assert!(!editor.forest().contains(group));
    assert_eq!(editor.forest().children(editor.forest().root_id()), vec![a, b]);
}

#[test]
fn clicking_a_grouped_member_selects_its_group() {
    let mut editor = Editor::default();
    let a = editor.add_node(rect("a", 0.0, 0.0, 10.0, 10.0), None).unwrap();
    let b = editor.add_node(rect("b", 20.0, 0.0, 10.0, 10.0), None).unwrap();
    editor.select_object(Some(a), false);
    editor.select_object(Some(b), true);
    let group = editor.group_selected().unwrap();

    editor.clear_selection();
    editor.select_object(Some(b), false);
    assert_eq!(editor.selection().ids(), &[group]);
}
