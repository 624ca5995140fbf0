//! Integration tests: JSON → Forest → JSON round-trip.
//!
//! Verifies that persisted documents survive a load/save cycle and that
//! rebuilding a forest node by node through `insert_node` reconstructs the
//! same tree.

use compo_core::*;
use pretty_assertions::assert_eq;

const POSTER: &str = include_str!("fixtures/poster.json");

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

// ─── Loading ─────────────────────────────────────────────────────────────

#[test]
fn fixture_loads_with_expected_structure() {
    let forest = parse_document(POSTER).expect("fixture should parse");

    assert_eq!(forest.node_count(), 9);
    assert_eq!(forest.children(forest.root_id()), vec![id("layer-bg"), id("layer-fg")]);
    assert_eq!(
        forest.children(id("layer-fg")),
        vec![id("badge"), id("headline"), id("wave")]
    );
    assert_eq!(forest.parent_of(id("badge-label")), Some(id("badge")));
    assert_eq!(forest.root().size, Size::new(1080.0, 1350.0));

    let photo = forest.get(id("photo")).unwrap();
    assert_eq!(photo.blend_mode, BlendMode::Multiply);
    assert!((photo.opacity - 0.9).abs() < 1e-9);

    let Some(NodeKind::Shape { curve_config, .. }) = forest.get(id("wave")).map(|n| &n.kind)
    else {
        panic!("wave should be a shape");
    };
    assert_eq!(curve_config.as_ref().map(|c| c.control_points.len()), Some(3));
}

#[test]
fn fixture_passes_lint() {
    let forest = parse_document(POSTER).unwrap();
    let errors: Vec<_> = lint_document(&forest)
        .into_iter()
        .filter(|d| d.severity != LintSeverity::Info)
        .collect();
    assert!(errors.is_empty(), "unexpected diagnostics: {errors:?}");
}

// ─── Round-trip ──────────────────────────────────────────────────────────

#[test]
fn emit_then_parse_is_identity() {
    let forest = parse_document(POSTER).unwrap();
    let emitted = emit_document(&forest).unwrap();
    let again = parse_document(&emitted).expect("re-parse failed");
    assert_eq!(again, forest, "forest changed after round-trip:\n{emitted}");

    // second emit is byte-identical
    assert_eq!(emit_document(&again).unwrap(), emitted);
}

#[test]
fn node_by_node_insert_reconstructs_forest() {
    let forest = parse_document(POSTER).unwrap();

    let mut rebuilt = Forest::new(forest.root().clone());
    for node in forest.depth_first().into_iter().skip(1) {
        let parent = forest.parent_of(node.id);
        rebuilt = insert_node(&rebuilt, node.clone(), parent);
    }

    assert_eq!(rebuilt, forest);
}

#[test]
fn subtree_survives_structural_edits() {
    let forest = parse_document(POSTER).unwrap();
    let moved = add_node_to_parent(&forest, id("headline"), id("layer-bg"));
    let emitted = emit_document(&moved).unwrap();
    let again = parse_document(&emitted).unwrap();

    assert_eq!(again.parent_of(id("headline")), Some(id("layer-bg")));
    assert_eq!(again, moved);
}

// ─── Malformed payloads ──────────────────────────────────────────────────

#[test]
fn truncated_payload_is_a_parse_error() {
    let truncated = &POSTER[..POSTER.len() / 2];
    let err = parse_document(truncated).unwrap_err();
    assert!(err.is_parse(), "expected parse error, got {err}");
}

#[test]
fn unknown_node_type_is_a_shape_error() {
    let bad = POSTER.replace(r#""type": "image""#, r#""type": "video""#);
    let err = parse_document(&bad).unwrap_err();
    assert!(matches!(err, DocumentError::InvalidShape(_)), "got {err}");
}

#[test]
fn nested_root_is_rejected() {
    let bad = POSTER.replace(r#""type": "group""#, r#""type": "root""#);
    let err = parse_document(&bad).unwrap_err();
    assert!(
        matches!(err, DocumentError::NestedRoot(_) | DocumentError::InvalidShape(_)),
        "got {err}"
    );
}

#[test]
fn misplaced_parent_reference_is_rejected() {
    let bad = POSTER.replace(r#""parentId": "badge""#, r#""parentId": "layer-bg""#);
    let err = parse_document(&bad).unwrap_err();
    assert!(matches!(err, DocumentError::ParentMismatch { .. }), "got {err}");
}
