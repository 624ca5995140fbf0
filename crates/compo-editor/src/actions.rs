//! Edit actions and the canvas context menu.
//!
//! Menus, toolbars and keyboard bindings all resolve to an [`EditAction`];
//! the editor decides which ones are currently enabled.

use compo_core::{NodeId, Position};

/// Semantic edit commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditAction {
    // ── History ──
    Undo,
    Redo,

    // ── Clipboard ──
    Cut,
    Copy,
    Paste,
    Duplicate,
    Delete,

    // ── Selection ──
    SelectAll,
    Deselect,

    // ── Grouping ──
    Group,
    Ungroup,

    // ── Z-order ──
    BringToFront,
    BringForward,
    SendBackward,
    SendToBack,
}

impl EditAction {
    pub const ALL: [EditAction; 15] = [
        EditAction::Undo,
        EditAction::Redo,
        EditAction::Cut,
        EditAction::Copy,
        EditAction::Paste,
        EditAction::Duplicate,
        EditAction::Delete,
        EditAction::SelectAll,
        EditAction::Deselect,
        EditAction::Group,
        EditAction::Ungroup,
        EditAction::BringToFront,
        EditAction::BringForward,
        EditAction::SendBackward,
        EditAction::SendToBack,
    ];

    /// Menu label; also used as the undo-step label.
    pub fn label(self) -> &'static str {
        match self {
            EditAction::Undo => "Undo",
            EditAction::Redo => "Redo",
            EditAction::Cut => "Cut",
            EditAction::Copy => "Copy",
            EditAction::Paste => "Paste",
            EditAction::Duplicate => "Duplicate",
            EditAction::Delete => "Delete",
            EditAction::SelectAll => "Select All",
            EditAction::Deselect => "Deselect",
            EditAction::Group => "Group",
            EditAction::Ungroup => "Ungroup",
            EditAction::BringToFront => "Bring to Front",
            EditAction::BringForward => "Bring Forward",
            EditAction::SendBackward => "Send Backward",
            EditAction::SendToBack => "Send to Back",
        }
    }

    /// Whether the action changes the document (and so creates an undo step).
    pub fn is_edit(self) -> bool {
        !matches!(
            self,
            EditAction::Undo
                | EditAction::Redo
                | EditAction::Copy
                | EditAction::SelectAll
                | EditAction::Deselect
        )
    }
}

/// Answer to a right-click on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    /// Canvas coordinates of the click.
    pub at: Position,
    /// Node under the pointer after group redirection, if any.
    pub target: Option<NodeId>,
    /// Enabled actions in display order.
    pub actions: Vec<EditAction>,
}

impl ContextMenu {
    pub fn contains(&self, action: EditAction) -> bool {
        self.actions.contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            EditAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), EditAction::ALL.len());
    }

    #[test]
    fn copy_is_not_an_edit() {
        assert!(!EditAction::Copy.is_edit());
        assert!(EditAction::Cut.is_edit());
    }
}
