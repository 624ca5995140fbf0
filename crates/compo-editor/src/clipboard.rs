//! Cut, copy and paste through an injected clipboard.
//!
//! The clipboard only ever sees an opaque string; the payload is the JSON of
//! the copied subtrees in document shape. Copies get fresh ids all the way
//! down, and paste re-mints anything that would still collide, so pasting
//! the same payload repeatedly never produces duplicate ids.

use crate::selection::{Selection, outermost};
use compo_core::{DocumentNode, Forest, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Storage for clipboard payloads.
pub trait Clipboard {
    fn read(&self) -> Option<String>;
    fn write(&mut self, payload: String);
}

/// Process-local clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn read(&self) -> Option<String> {
        self.contents.clone()
    }

    fn write(&mut self, payload: String) {
        self.contents = Some(payload);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub nodes: Vec<DocumentNode>,
}

/// What the pasted content looks like once it is in the forest.
#[derive(Debug, Clone)]
pub struct Pasted {
    pub forest: Forest,
    pub ids: Vec<NodeId>,
}

const COPY_SUFFIX: &str = " copy";

/// Serialize the selected subtrees with fresh `<id>-copy` ids. Returns how
/// many subtrees were written.
pub fn copy(forest: &Forest, selected: &[NodeId], clipboard: &mut dyn Clipboard) -> usize {
    let nodes = copies_of(forest, selected);
    write_payload(clipboard, nodes)
}

/// Serialize the selected subtrees as they are, then remove them.
///
/// Returns `None` when nothing was selected.
pub fn cut(forest: &Forest, selected: &[NodeId], clipboard: &mut dyn Clipboard) -> Option<Forest> {
    let roots = outermost(forest, selected);
    if roots.is_empty() {
        return None;
    }
    let nodes: Vec<DocumentNode> = roots.iter().filter_map(|id| forest.subtree(*id)).collect();
    write_payload(clipboard, nodes);

    let mut next = forest.clone();
    for id in &roots {
        next.remove(*id);
    }
    Some(next)
}

/// Insert the clipboard's subtrees under the selection's target parent.
///
/// `None` when the clipboard is empty or does not hold a payload.
pub fn paste(forest: &Forest, selection: &Selection, clipboard: &dyn Clipboard) -> Option<Pasted> {
    let raw = clipboard.read()?;
    let payload: ClipboardPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(err) => {
            log::warn!("paste: clipboard does not hold a document payload: {err}");
            return None;
        }
    };
    let parent = selection.target_parent(forest);
    insert_copies(forest, payload.nodes, parent)
}

/// Copies of the outermost selected subtrees, every id re-minted and the
/// top-level names suffixed.
pub(crate) fn copies_of(forest: &Forest, selected: &[NodeId]) -> Vec<DocumentNode> {
    let mut minted = HashSet::new();
    outermost(forest, selected)
        .into_iter()
        .filter_map(|id| forest.subtree(id))
        .map(|mut subtree| {
            subtree.remap_ids(&mut |node| copy_id(forest, &mut minted, node.id));
            subtree.node.name.push_str(COPY_SUFFIX);
            subtree
        })
        .collect()
}

/// Insert `nodes` under `parent`, re-minting any id that collides with the
/// forest. Each top-level node is stacked above its new siblings.
pub(crate) fn insert_copies(
    forest: &Forest,
    nodes: Vec<DocumentNode>,
    parent: NodeId,
) -> Option<Pasted> {
    let mut next = forest.clone();
    let mut ids = Vec::with_capacity(nodes.len());
    let mut minted = HashSet::new();

    for mut subtree in nodes {
        if subtree.ids().iter().any(|id| next.contains(*id) || minted.contains(id)) {
            subtree.remap_ids(&mut |node| {
                if next.contains(node.id) || minted.contains(&node.id) {
                    fresh_id(&next, &mut minted, node.id.as_str())
                } else {
                    minted.insert(node.id);
                    node.id
                }
            });
        }
        subtree.node.z_index = next.next_z(parent);
        if let Err(err) = next.insert_subtree(&subtree, parent) {
            log::warn!("paste: skipping `{}`: {err}", subtree.id());
            continue;
        }
        ids.push(subtree.id());
    }

    if ids.is_empty() {
        return None;
    }
    log::debug!("paste: {} subtrees under {parent}", ids.len());
    Some(Pasted { forest: next, ids })
}

fn write_payload(clipboard: &mut dyn Clipboard, nodes: Vec<DocumentNode>) -> usize {
    let count = nodes.len();
    if count == 0 {
        return 0;
    }
    match serde_json::to_string(&ClipboardPayload { nodes }) {
        Ok(json) => {
            clipboard.write(json);
            count
        }
        Err(err) => {
            log::warn!("clipboard: could not serialize selection: {err}");
            0
        }
    }
}

fn copy_id(forest: &Forest, minted: &mut HashSet<NodeId>, original: NodeId) -> NodeId {
    let base = format!("{original}-copy");
    let candidate = NodeId::intern(&base);
    if !forest.contains(candidate) && minted.insert(candidate) {
        return candidate;
    }
    fresh_id(forest, minted, &base)
}

/// `<base>-<n>`, free in both the forest and this operation's minted set.
fn fresh_id(forest: &Forest, minted: &mut HashSet<NodeId>, base: &str) -> NodeId {
    loop {
        let candidate = NodeId::with_prefix(base);
        if !forest.contains(candidate) && minted.insert(candidate) {
            return candidate;
        }
    }
}
