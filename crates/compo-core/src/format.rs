//! Canvas formats: the named sizes a document's root can take.

use crate::model::{NodeChanges, Size};
use crate::tree::Forest;
use serde::{Deserialize, Serialize};

/// A named canvas size. Presets ship with the crate; projects may carry
/// their own custom formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasFormat {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
}

impl CanvasFormat {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Zero or negative dimensions cannot be applied.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

impl Default for CanvasFormat {
    fn default() -> Self {
        Self::new("square", "Square Post", 1080.0, 1080.0)
    }
}

/// Built-in formats, in picker order.
pub fn presets() -> Vec<CanvasFormat> {
    vec![
        CanvasFormat::default(),
        CanvasFormat::new("portrait", "Portrait Post", 1080.0, 1350.0),
        CanvasFormat::new("story", "Story", 1080.0, 1920.0),
        CanvasFormat::new("landscape", "Landscape", 1920.0, 1080.0),
        CanvasFormat::new("banner", "Banner", 1500.0, 500.0),
        CanvasFormat::new("a4", "A4 Document", 2480.0, 3508.0),
    ]
}

pub fn find_preset(id: &str) -> Option<CanvasFormat> {
    presets().into_iter().find(|f| f.id == id)
}

impl Forest {
    /// Resize the root to `format`. The root keeps its id and position.
    pub fn apply_format(&mut self, format: &CanvasFormat) -> bool {
        if !format.is_valid() {
            log::warn!("ignoring canvas format `{}` with invalid size", format.id);
            return false;
        }
        if self.root().size == format.size() {
            return false;
        }
        let root = self.root_id();
        self.update(root, &NodeChanges::size(format.width, format.height))
    }
}

/// Pure form of [`Forest::apply_format`].
#[must_use]
pub fn apply_format(forest: &Forest, format: &CanvasFormat) -> Forest {
    let mut next = forest.clone();
    next.apply_format(format);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid_and_unique() {
        let all = presets();
        assert!(all.iter().all(CanvasFormat::is_valid));
        let ids: std::collections::HashSet<_> = all.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
        assert_eq!(find_preset("story").map(|f| f.height), Some(1920.0));
    }

    #[test]
    fn apply_format_resizes_root_only() {
        let f = Forest::default();
        let root = f.root_id();
        let story = find_preset("story").unwrap();
        let g = apply_format(&f, &story);
        assert_eq!(g.root().size, Size::new(1080.0, 1920.0));
        assert_eq!(g.root_id(), root);
        assert_eq!(f.root().size, Size::new(1080.0, 1080.0));
    }

    #[test]
    fn invalid_format_is_ignored() {
        let mut f = Forest::default();
        assert!(!f.apply_format(&CanvasFormat::new("bad", "Bad", 0.0, 100.0)));
        assert!(!f.apply_format(&CanvasFormat::default()));
    }
}
