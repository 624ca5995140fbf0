//! Compo editor: everything that acts on an open document.
//!
//! - [`editor`]: the [`Editor`] context and its two mutation channels
//! - [`history`]: snapshot undo/redo
//! - [`selection`], [`clipboard`], [`grouping`]: structural edits
//! - [`animation`]: keyframe timelines and playback
//! - [`store`], [`export`]: persistence and raster export seams

pub mod actions;
pub mod animation;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod export;
pub mod grouping;
pub mod history;
pub mod selection;
pub mod store;

pub use actions::{ContextMenu, EditAction};
pub use animation::{
    AnimationEngine, AnimationSnapshot, FrameScheduler, FrameToken, Keyframe, KeyframeProps,
    NodeUpdateSink, Timeline,
};
pub use clipboard::{Clipboard, ClipboardPayload, MemoryClipboard, Pasted};
pub use config::{AnimationConfig, EditorConfig};
pub use editor::{CanvasEvent, Editor};
pub use export::{ExportError, ExportRequest, Rasterizer};
pub use grouping::ZMove;
pub use history::History;
pub use selection::Selection;
pub use store::{InMemoryStore, Record, RecordStore, StoreError};

pub use compo_core;
