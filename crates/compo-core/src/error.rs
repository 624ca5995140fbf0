use crate::id::NodeId;
use thiserror::Error;

/// Why a document payload could not be turned into a forest.
///
/// `Parse` means the bytes are not JSON at all; every other variant means the
/// JSON is well-formed but does not describe a valid document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("document has the wrong shape: {0}")]
    InvalidShape(String),

    #[error("document has no root node")]
    MissingRoot,

    #[error("document must have exactly one top-level node, found {count}")]
    TopLevel { count: usize },

    #[error("a root node may only appear at the top level (found `{0}`)")]
    NestedRoot(NodeId),

    #[error("duplicate node id `{0}`")]
    DuplicateId(NodeId),

    #[error("node `{id}` declares parent `{declared}` but is nested under `{actual}`")]
    ParentMismatch {
        id: NodeId,
        declared: NodeId,
        actual: NodeId,
    },

    #[error("node `{0}` has children but cannot hold any")]
    NotAContainer(NodeId),
}

impl DocumentError {
    /// True when the payload was unreadable rather than merely mis-shaped.
    pub fn is_parse(&self) -> bool {
        matches!(self, DocumentError::Parse(_))
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => DocumentError::InvalidShape(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => DocumentError::Parse(err),
        }
    }
}
