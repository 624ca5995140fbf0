//! Lint diagnostics for Compo documents.
//!
//! Reports structural issues without modifying the forest. The structural
//! rules should never fire on a forest built through the tree store; they
//! exist to catch regressions in it. The remaining rules are hints for the
//! layers panel.

use crate::id::NodeId;
use crate::model::NodeType;
use crate::tree::Forest;
use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// The forest breaks a structural invariant.
    Error,
    /// Likely a mistake.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic for a node.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The node this diagnostic refers to.
    pub node_id: NodeId,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "cycle", "empty-group").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the forest and return diagnostics.
#[must_use]
pub fn lint_document(forest: &Forest) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_structure(forest, &mut diags);
    lint_z_order(forest, &mut diags);
    lint_empty_groups(forest, &mut diags);
    lint_off_canvas(forest, &mut diags);
    diags
}

/// True when no rule reports an [`LintSeverity::Error`].
pub fn is_well_formed(forest: &Forest) -> bool {
    lint_document(forest)
        .iter()
        .all(|d| d.severity != LintSeverity::Error)
}

// ─── Rules ────────────────────────────────────────────────────────────────

/// Acyclicity, single membership, index agreement, one root.
fn lint_structure(forest: &Forest, diags: &mut Vec<LintDiagnostic>) {
    let graph = forest.raw_graph();
    let root = forest.root_id();

    if is_cyclic_directed(graph) {
        diags.push(LintDiagnostic {
            node_id: root,
            message: "The node graph contains a cycle.".into(),
            severity: LintSeverity::Error,
            rule: "cycle",
        });
    }

    let mut roots = 0;
    for idx in graph.node_indices() {
        let node = &graph[idx];
        let parents = graph.neighbors_directed(idx, Direction::Incoming).count();
        let children = graph.neighbors_directed(idx, Direction::Outgoing).count();

        if node.node_type() == NodeType::Root {
            roots += 1;
        }
        match (parents, node.id == root) {
            (0, false) => diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("`{}` is not attached to any parent.", node.id),
                severity: LintSeverity::Error,
                rule: "orphan",
            }),
            (n, _) if n > 1 => diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("`{}` appears under {n} parents.", node.id),
                severity: LintSeverity::Error,
                rule: "multiple-parents",
            }),
            (1, true) => diags.push(LintDiagnostic {
                node_id: node.id,
                message: "The root must not have a parent.".into(),
                severity: LintSeverity::Error,
                rule: "root-has-parent",
            }),
            _ => {}
        }
        if children > 0 && !node.is_container() {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("`{}` is a {:?} but has children.", node.id, node.node_type()),
                severity: LintSeverity::Error,
                rule: "leaf-with-children",
            });
        }
        if forest.raw_order_len(node.id) != children {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("Child order of `{}` disagrees with its edges.", node.id),
                severity: LintSeverity::Error,
                rule: "order-mismatch",
            });
        }
    }

    if roots != 1 {
        diags.push(LintDiagnostic {
            node_id: root,
            message: format!("Expected exactly one root, found {roots}."),
            severity: LintSeverity::Error,
            rule: "root-count",
        });
    }

    let mut indexed = HashSet::new();
    for (id, idx) in forest.indexed_ids() {
        indexed.insert(id);
        if graph.node_weight(idx).is_none_or(|n| n.id != id) {
            diags.push(LintDiagnostic {
                node_id: id,
                message: format!("Index entry for `{id}` points at the wrong node."),
                severity: LintSeverity::Error,
                rule: "index-mismatch",
            });
        }
    }
    if indexed.len() != graph.node_count() {
        diags.push(LintDiagnostic {
            node_id: root,
            message: "Some nodes are missing from the id index.".into(),
            severity: LintSeverity::Error,
            rule: "index-mismatch",
        });
    }
}

/// Warn when stored `zIndex` values disagree with sibling storage order.
fn lint_z_order(forest: &Forest, diags: &mut Vec<LintDiagnostic>) {
    for parent in forest.depth_first() {
        let children = forest.child_nodes(parent.id);
        let sorted = children.windows(2).all(|w| w[0].z_index <= w[1].z_index);
        if !sorted {
            diags.push(LintDiagnostic {
                node_id: parent.id,
                message: format!(
                    "Children of `{}` are stored out of zIndex order.",
                    parent.id
                ),
                severity: LintSeverity::Warning,
                rule: "z-order-drift",
            });
        }
    }
}

fn lint_empty_groups(forest: &Forest, diags: &mut Vec<LintDiagnostic>) {
    for node in forest.depth_first() {
        if node.node_type() == NodeType::Group && forest.children(node.id).is_empty() {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("Group `{}` is empty.", node.name),
                severity: LintSeverity::Info,
                rule: "empty-group",
            });
        }
    }
}

/// Info when a visible leaf lies completely outside the canvas.
fn lint_off_canvas(forest: &Forest, diags: &mut Vec<LintDiagnostic>) {
    let canvas = forest.root().bounds();
    for node in forest.depth_first() {
        if node.is_container() || !node.visible {
            continue;
        }
        if canvas.intersect(node.bounds()).area() <= 0.0 {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("`{}` lies outside the canvas.", node.name),
                severity: LintSeverity::Info,
                rule: "off-canvas",
            });
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
