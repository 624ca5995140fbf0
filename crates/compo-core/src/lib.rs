//! Compo core: the scene-graph data model of a visual composition editor.
//!
//! - [`model`]: nodes, colors, geometry, partial updates
//! - [`tree`]: the arena-backed forest and its structural operations
//! - [`document`]: nested JSON shape for persistence and the clipboard
//! - [`lint`]: invariant checks over a forest

pub mod document;
pub mod error;
pub mod format;
pub mod id;
pub mod lint;
pub mod model;
pub mod project;
pub mod tree;

pub use document::{DocumentNode, emit_document, parse_document};
pub use error::DocumentError;
pub use format::{CanvasFormat, apply_format, presets};
pub use id::{KeyframeId, NodeId, TimelineId};
pub use lint::{LintDiagnostic, LintSeverity, is_well_formed, lint_document};
pub use model::*;
pub use project::{Project, Template};
pub use tree::*;

// Re-export kurbo's rectangle so downstream crates don't need a direct dependency
pub use kurbo::Rect;
