//! The editor context: one open document and everything that acts on it.
//!
//! There are exactly two ways the document changes:
//!
//! - **tracked edits** go through [`History::commit`] and become undo steps;
//! - **animation writes** go through [`History::amend`] and never do.
//!
//! Everything else the editor shows is derived from the present snapshot
//! after each step, so undo and redo cannot leave it behind: the canvas
//! format follows the root size, and timelines of nodes that are not in the
//! document are parked until the node comes back.
//!
//! Collaborators (renderer, storage, clipboard, frame loop, rasterizer) are
//! passed in; the editor holds no globals.

use crate::actions::{ContextMenu, EditAction};
use crate::animation::{
    AnimationEngine, AnimationSnapshot, FrameScheduler, KeyframeProps, Timeline,
};
use crate::clipboard::{self, Clipboard, MemoryClipboard, Pasted};
use crate::config::EditorConfig;
use crate::export::{ExportError, Rasterizer, export_request};
use crate::grouping::{self, ZMove};
use crate::history::History;
use crate::selection::Selection;
use crate::store::{RecordStore, StoreError};
use compo_core::{
    CanvasFormat, Forest, KeyframeId, Node, NodeChanges, NodeId, NodeType, Position, Project,
    Size, Template, TimelineId, presets,
};
use std::sync::Arc;

/// A gesture reported by the render collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Click on a node (`None` = empty canvas).
    Select { id: Option<NodeId>, multi: bool },
    /// Property change, e.g. the end of a drag or an inspector edit.
    Change { id: NodeId, changes: NodeChanges },
    /// Drop of a new node; `parent` defaults to the active layer.
    Add { node: Node, parent: Option<NodeId> },
    /// Delete the given node, or the selection when `None`.
    Delete { id: Option<NodeId> },
    /// Right-click.
    ContextMenu { at: Position, id: Option<NodeId> },
}

pub struct Editor {
    config: EditorConfig,
    history: History<Forest>,
    selection: Selection,
    clipboard: Box<dyn Clipboard>,
    animation: AnimationEngine,
    /// Timelines whose nodes are currently deleted; undo brings them back.
    parked_timelines: Vec<Timeline>,
    format: CanvasFormat,
    custom_formats: Vec<CanvasFormat>,
    project: Option<Project>,
}

impl Editor {
    /// A blank document sized to the default format.
    pub fn new(config: EditorConfig) -> Self {
        let format = CanvasFormat::default();
        let forest = Forest::with_canvas(format.size());
        let mut editor = Self::with_forest(config, forest, Box::new(MemoryClipboard::new()));
        editor.format = format;
        editor
    }

    pub fn with_forest(config: EditorConfig, forest: Forest, clipboard: Box<dyn Clipboard>) -> Self {
        let size = forest.root().size;
        Self {
            history: History::new(forest, config.history_depth),
            selection: Selection::new(),
            clipboard,
            animation: AnimationEngine::new(config.animation.clone()),
            parked_timelines: Vec::new(),
            format: format_for(&[], size),
            custom_formats: Vec::new(),
            project: None,
            config,
        }
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn forest(&self) -> &Forest {
        self.history.present()
    }

    /// Shared handle for consumers that outlive the next edit.
    pub fn snapshot(&self) -> Arc<Forest> {
        self.history.snapshot()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History<Forest> {
        &self.history
    }

    pub fn animation(&self) -> &AnimationEngine {
        &self.animation
    }

    pub fn animation_snapshot(&self) -> &AnimationSnapshot {
        self.animation.snapshot()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn format(&self) -> &CanvasFormat {
        &self.format
    }

    pub fn custom_formats(&self) -> &[CanvasFormat] {
        &self.custom_formats
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Tracked edits ───────────────────────────────────────────────────

    fn commit(&mut self, label: &str, next: Forest) {
        self.history.commit(next, label);
        self.follow_present();
    }

    /// Bring derived state in line with the present snapshot.
    fn follow_present(&mut self) {
        let forest = self.history.present();
        self.selection.prune(forest);

        let size = forest.root().size;
        if self.format.size() != size {
            self.format = format_for(&self.custom_formats, size);
        }

        let gone: Vec<NodeId> = self
            .animation
            .timelines()
            .iter()
            .map(|t| t.object_id)
            .filter(|id| !forest.contains(*id))
            .collect();
        let (back, still_gone): (Vec<Timeline>, Vec<Timeline>) =
            std::mem::take(&mut self.parked_timelines)
                .into_iter()
                .partition(|t| forest.contains(t.object_id));
        self.parked_timelines = still_gone;
        if !gone.is_empty() {
            let parked = self.animation.take_timelines_for(&gone);
            self.parked_timelines.extend(parked);
        }
        self.animation.restore_timelines(back);
    }

    /// Add `node` under `parent` (default: the active layer, else the root)
    /// and select it. A colliding id is replaced with a fresh one.
    pub fn add_node(&mut self, mut node: Node, parent: Option<NodeId>) -> Option<NodeId> {
        let forest = self.forest();
        let parent = parent.unwrap_or_else(|| self.selection.target_parent(forest));
        if forest.contains(node.id) {
            node.id = forest.mint_id(node.node_type());
        }
        node.z_index = forest.next_z(parent);

        let id = node.id;
        let label = format!("Add {}", node.node_type().id_prefix());
        let mut next = forest.clone();
        if !next.insert(node, Some(parent)) {
            return None;
        }
        self.commit(&label, next);
        self.selection.set([id]);
        Some(id)
    }

    /// Add a layer on top of the root's children and make it active.
    pub fn add_layer(&mut self, name: &str) -> Option<NodeId> {
        let root = self.forest().root_id();
        let id = self.add_node(Node::layer(name), Some(root))?;
        self.selection.set_selected_layer(Some(id));
        Some(id)
    }

    pub fn update_node(&mut self, id: NodeId, changes: &NodeChanges) -> bool {
        if changes.is_empty() || !self.forest().contains(id) {
            return false;
        }
        let next = compo_core::update_node_in_tree(self.forest(), id, changes);
        if next == *self.forest() {
            return false;
        }
        self.commit("Change", next);
        true
    }

    /// Move `id` into `parent` (layers panel drop).
    pub fn reparent(&mut self, id: NodeId, parent: NodeId) -> bool {
        let mut next = self.forest().clone();
        if !next.reparent(id, parent) {
            return false;
        }
        self.commit("Move", next);
        true
    }

    /// Start a drag gesture; every edit until [`end_gesture`] is one undo
    /// step.
    ///
    /// [`end_gesture`]: Editor::end_gesture
    pub fn begin_gesture(&mut self, label: &str) {
        self.history.begin_batch(label);
    }

    pub fn end_gesture(&mut self) {
        self.history.end_batch();
    }

    pub fn undo(&mut self) -> Option<String> {
        let label = self.history.undo()?;
        self.follow_present();
        Some(label)
    }

    pub fn redo(&mut self) -> Option<String> {
        let label = self.history.redo()?;
        self.follow_present();
        Some(label)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select_object(&mut self, id: Option<NodeId>, multi: bool) {
        let forest = self.history.present();
        self.selection.select_object(forest, id, multi);
    }

    pub fn select_all(&mut self) {
        let forest = self.history.present();
        self.selection.select_all(forest);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    pub fn copy(&mut self) -> usize {
        clipboard::copy(self.history.present(), self.selection.ids(), self.clipboard.as_mut())
    }

    pub fn cut(&mut self) -> bool {
        let forest = self.history.present();
        let Some(next) = clipboard::cut(forest, self.selection.ids(), self.clipboard.as_mut()) else {
            return false;
        };
        self.commit(EditAction::Cut.label(), next);
        self.selection.clear();
        true
    }

    pub fn paste(&mut self) -> bool {
        let Some(Pasted { forest, ids }) =
            clipboard::paste(self.forest(), &self.selection, self.clipboard.as_ref())
        else {
            return false;
        };
        self.commit(EditAction::Paste.label(), forest);
        self.selection.set(ids);
        true
    }

    pub fn duplicate(&mut self) -> bool {
        let Some(Pasted { forest, ids }) = grouping::duplicate(self.forest(), self.selection.ids())
        else {
            return false;
        };
        self.commit(EditAction::Duplicate.label(), forest);
        self.selection.set(ids);
        true
    }

    /// Delete the selected subtrees. Their timelines stay parked so that undo
    /// restores the animation too.
    pub fn delete_selected(&mut self) -> bool {
        let ids: Vec<NodeId> = self.selection.ids().to_vec();
        self.delete(&ids)
    }

    pub fn delete(&mut self, ids: &[NodeId]) -> bool {
        let Some(next) = grouping::delete(self.forest(), ids) else {
            return false;
        };
        self.commit(EditAction::Delete.label(), next);
        true
    }

    // ─── Grouping and z-order ────────────────────────────────────────────

    pub fn group_selected(&mut self) -> Option<NodeId> {
        let (next, group) = grouping::group(self.forest(), self.selection.ids())?;
        self.commit(EditAction::Group.label(), next);
        self.selection.set([group]);
        Some(group)
    }

    pub fn ungroup_selected(&mut self) -> bool {
        let Some(next) = grouping::ungroup(self.forest(), self.selection.ids()) else {
            return false;
        };
        self.commit(EditAction::Ungroup.label(), next);
        self.selection.clear();
        true
    }

    pub fn reorder_selected(&mut self, direction: ZMove) -> bool {
        let Some(next) = grouping::reorder(self.forest(), self.selection.ids(), direction) else {
            return false;
        };
        let action = match direction {
            ZMove::ToFront => EditAction::BringToFront,
            ZMove::ToBack => EditAction::SendToBack,
            ZMove::Forward => EditAction::BringForward,
            ZMove::Backward => EditAction::SendBackward,
        };
        self.commit(action.label(), next);
        true
    }

    // ─── Canvas format ───────────────────────────────────────────────────

    /// Resize the root to `format` as one undo step.
    pub fn apply_format(&mut self, format: CanvasFormat) -> bool {
        let mut next = self.forest().clone();
        if !next.apply_format(&format) {
            if format.is_valid() {
                self.format = format;
            }
            return false;
        }
        self.commit(&format!("Resize to {}", format.name), next);
        self.format = format;
        true
    }

    pub fn add_custom_format(&mut self, format: CanvasFormat) -> bool {
        if !format.is_valid() || self.custom_formats.iter().any(|f| f.id == format.id) {
            return false;
        }
        self.custom_formats.push(format);
        true
    }

    // ─── Animation ───────────────────────────────────────────────────────

    pub fn add_keyframe(&mut self, object: NodeId, time: f64, props: KeyframeProps) -> Option<KeyframeId> {
        if !self.forest().contains(object) {
            return None;
        }
        Some(self.animation.add_keyframe(object, time, props))
    }

    pub fn update_keyframe(
        &mut self,
        timeline: TimelineId,
        keyframe: KeyframeId,
        props: KeyframeProps,
        time: Option<f64>,
    ) -> bool {
        self.animation.update_keyframe(timeline, keyframe, props, time)
    }

    pub fn delete_keyframe(&mut self, timeline: TimelineId, keyframe: KeyframeId) -> bool {
        self.animation.delete_keyframe(timeline, keyframe)
    }

    pub fn toggle_playback(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.animation.toggle_playback(scheduler);
    }

    pub fn stop_playback(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.animation.stop(scheduler);
    }

    /// Host frame callback.
    pub fn tick(&mut self, now_ms: f64) {
        let mut patches: Vec<(NodeId, NodeChanges)> = Vec::new();
        self.animation.tick(now_ms, &mut patches);
        self.apply_untracked(patches);
    }

    pub fn advance(&mut self, elapsed_ms: f64) {
        let mut patches: Vec<(NodeId, NodeChanges)> = Vec::new();
        self.animation.advance(elapsed_ms, &mut patches);
        self.apply_untracked(patches);
    }

    /// Scrub the playhead; the document shows the new time immediately.
    pub fn set_current_time(&mut self, time_ms: f64) {
        let mut patches: Vec<(NodeId, NodeChanges)> = Vec::new();
        self.animation.set_current_time(time_ms, &mut patches);
        self.apply_untracked(patches);
    }

    /// Write animation output through the untracked channel.
    fn apply_untracked(&mut self, patches: Vec<(NodeId, NodeChanges)>) {
        if patches.is_empty() {
            return;
        }
        let mut next = self.forest().clone();
        let mut changed = false;
        for (id, changes) in &patches {
            changed |= next.update(*id, changes);
        }
        if changed {
            self.history.amend(next);
        }
    }

    /// Cancel frame callbacks before the editor is dropped.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.animation.teardown(scheduler);
    }

    // ─── Render events ───────────────────────────────────────────────────

    /// Consume a gesture from the render collaborator. Only a context-menu
    /// request produces an answer.
    pub fn handle_event(&mut self, event: CanvasEvent) -> Option<ContextMenu> {
        match event {
            CanvasEvent::Select { id, multi } => self.select_object(id, multi),
            CanvasEvent::Change { id, changes } => {
                self.update_node(id, &changes);
            }
            CanvasEvent::Add { node, parent } => {
                self.add_node(node, parent);
            }
            CanvasEvent::Delete { id: Some(id) } => {
                self.delete(&[id]);
            }
            CanvasEvent::Delete { id: None } => {
                self.delete_selected();
            }
            CanvasEvent::ContextMenu { at, id } => return Some(self.context_menu(at, id)),
        }
        None
    }

    /// Right-click: the target joins the selection if it is not already in
    /// it, then the enabled actions are listed.
    pub fn context_menu(&mut self, at: Position, id: Option<NodeId>) -> ContextMenu {
        if let Some(id) = id
            && !self.selection.contains(id)
        {
            self.select_object(Some(id), false);
        }
        let target = id.and_then(|_| self.selection.ids().last().copied());
        let actions = EditAction::ALL
            .into_iter()
            .filter(|a| self.is_enabled(*a))
            .collect();
        ContextMenu { at, target, actions }
    }

    pub fn is_enabled(&self, action: EditAction) -> bool {
        let has_selection = !self.selection.is_empty();
        match action {
            EditAction::Undo => self.can_undo(),
            EditAction::Redo => self.can_redo(),
            EditAction::Paste => self.clipboard.read().is_some(),
            EditAction::SelectAll => true,
            EditAction::Group => self.selection.len() >= 2,
            EditAction::Ungroup => self.selection.ids().iter().any(|id| {
                self.forest()
                    .get(*id)
                    .is_some_and(|n| n.node_type() == NodeType::Group)
            }),
            EditAction::Cut
            | EditAction::Copy
            | EditAction::Duplicate
            | EditAction::Delete
            | EditAction::Deselect
            | EditAction::BringToFront
            | EditAction::BringForward
            | EditAction::SendBackward
            | EditAction::SendToBack => has_selection,
        }
    }

    /// Run an action from a menu or shortcut. Returns whether anything
    /// happened.
    pub fn perform(&mut self, action: EditAction) -> bool {
        match action {
            EditAction::Undo => self.undo().is_some(),
            EditAction::Redo => self.redo().is_some(),
            EditAction::Cut => self.cut(),
            EditAction::Copy => self.copy() > 0,
            EditAction::Paste => self.paste(),
            EditAction::Duplicate => self.duplicate(),
            EditAction::Delete => self.delete_selected(),
            EditAction::SelectAll => {
                self.select_all();
                !self.selection.is_empty()
            }
            EditAction::Deselect => {
                let had = !self.selection.is_empty();
                self.clear_selection();
                had
            }
            EditAction::Group => self.group_selected().is_some(),
            EditAction::Ungroup => self.ungroup_selected(),
            EditAction::BringToFront => self.reorder_selected(ZMove::ToFront),
            EditAction::BringForward => self.reorder_selected(ZMove::Forward),
            EditAction::SendBackward => self.reorder_selected(ZMove::Backward),
            EditAction::SendToBack => self.reorder_selected(ZMove::ToBack),
        }
    }

    // ─── Persistence and export ──────────────────────────────────────────

    /// Save the current document. The record keeps its id and creation time
    /// across saves.
    pub fn save_project(
        &mut self,
        store: &mut dyn RecordStore<Project>,
        id: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut project = match self.project.take() {
            Some(mut existing) if existing.id == id => {
                existing.store(self.forest());
                existing.name = name.to_string();
                existing
            }
            _ => Project::new(id, name, self.forest()),
        };
        project.current_format = self.format.clone();
        project.custom_formats = self.custom_formats.clone();

        let result = store.save(project.clone());
        self.project = Some(project);
        result
    }

    /// Replace the working document with a stored project. Nothing changes
    /// unless the record loads and validates completely.
    pub fn load_project(
        &mut self,
        store: &dyn RecordStore<Project>,
        id: &str,
    ) -> Result<(), StoreError> {
        let project = store.load(id)?;
        let forest = project.forest().map_err(|source| StoreError::Malformed {
            id: id.to_string(),
            source,
        })?;

        self.replace_document(forest);
        self.format = project.current_format.clone();
        self.custom_formats = project.custom_formats.clone();
        self.project = Some(project);
        log::debug!("loaded project `{id}`");
        Ok(())
    }

    /// Start over from a template.
    pub fn load_template(&mut self, template: &Template) -> Result<(), StoreError> {
        let forest = template.forest().map_err(|source| StoreError::Malformed {
            id: template.id.clone(),
            source,
        })?;
        self.replace_document(forest);
        self.format = template.format.clone();
        self.project = None;
        Ok(())
    }

    fn replace_document(&mut self, forest: Forest) {
        let stale: Vec<NodeId> = self
            .animation
            .timelines()
            .iter()
            .map(|t| t.object_id)
            .filter(|id| !forest.contains(*id))
            .collect();
        self.animation.remove_timelines_for(&stale);
        self.parked_timelines.clear();
        self.history.clear(forest);
        self.selection = Selection::new();
    }

    /// Rasterize the whole canvas through `rasterizer`.
    pub fn export(
        &self,
        rasterizer: &mut dyn Rasterizer,
        pixel_ratio: f64,
    ) -> Result<Vec<u8>, ExportError> {
        let request = export_request(self.forest(), pixel_ratio)?;
        rasterizer.rasterize(&request)
    }
}

/// The custom or preset format matching `size`, else an ad-hoc one.
fn format_for(custom: &[CanvasFormat], size: Size) -> CanvasFormat {
    custom
        .iter()
        .cloned()
        .chain(presets())
        .find(|f| f.size() == size)
        .unwrap_or_else(|| CanvasFormat::new("custom", "Custom", size.width, size.height))
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
