//! Raster export seam.
//!
//! Painting is done by an external graphics layer. The editor only decides
//! what to paint: the forest, the clip rectangle (the root's frame) and the
//! pixel ratio.

use compo_core::{Forest, Rect};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("pixel ratio must be positive, got {0}")]
    InvalidPixelRatio(f64),

    #[error("canvas is empty ({width}×{height})")]
    EmptyCanvas { width: f64, height: f64 },

    #[error("rasterizer failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub forest: &'a Forest,
    pub clip: Rect,
    pub pixel_ratio: f64,
}

impl ExportRequest<'_> {
    /// Output size in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = |v: f64| (v * self.pixel_ratio).round().max(0.0) as u32;
        (scale(self.clip.width()), scale(self.clip.height()))
    }
}

/// Turns a forest into encoded image bytes.
pub trait Rasterizer {
    fn rasterize(&mut self, request: &ExportRequest<'_>) -> Result<Vec<u8>, ExportError>;
}

/// Build the request for exporting the whole canvas.
pub fn export_request(forest: &Forest, pixel_ratio: f64) -> Result<ExportRequest<'_>, ExportError> {
    if !(pixel_ratio > 0.0 && pixel_ratio.is_finite()) {
        return Err(ExportError::InvalidPixelRatio(pixel_ratio));
    }
    let clip = forest.root().bounds();
    if clip.area() <= 0.0 {
        return Err(ExportError::EmptyCanvas {
            width: clip.width(),
            height: clip.height(),
        });
    }
    Ok(ExportRequest {
        forest,
        clip,
        pixel_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use compo_core::Size;

    #[test]
    fn request_clips_to_root() {
        let forest = Forest::with_canvas(Size::new(1080.0, 1350.0));
        let request = export_request(&forest, 2.0).unwrap();
        assert_eq!(request.clip, Rect::new(0.0, 0.0, 1080.0, 1350.0));
        assert_eq!(request.pixel_size(), (2160, 2700));
    }

    #[test]
    fn rejects_bad_inputs() {
        let forest = Forest::default();
        assert!(matches!(
            export_request(&forest, 0.0),
            Err(ExportError::InvalidPixelRatio(_))
        ));
        let empty = Forest::with_canvas(Size::new(0.0, 100.0));
        assert!(matches!(
            export_request(&empty, 1.0),
            Err(ExportError::EmptyCanvas { .. })
        ));
    }
}
