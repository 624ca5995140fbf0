//! Core scene data model for Compo documents.
//!
//! A document is a tree of [`Node`] values: one permanent `root`, layers
//! beneath it, and groups, images, text and shapes inside those. Structural
//! membership (children, parent) is owned by the arena in [`crate::tree`];
//! a `Node` only carries its own properties.

use crate::id::NodeId;
use kurbo::Rect;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], serialized as a hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_pair(hi: u8, lo: u8) -> Option<f32> {
    Some((hex_val(hi)? << 4 | hex_val(lo)?) as f32 / 255.0)
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 | 8 => {
                let r = hex_pair(bytes[0], bytes[1])?;
                let g = hex_pair(bytes[2], bytes[3])?;
                let b = hex_pair(bytes[4], bytes[5])?;
                let a = if bytes.len() == 8 {
                    hex_pair(bytes[6], bytes[7])?
                } else {
                    1.0
                };
                Some(Self::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        );
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color: {s:?}")))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// ─── Compositing ─────────────────────────────────────────────────────────

/// How a node's pixels combine with what is painted beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    SourceOver,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

// ─── Shapes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rect,
    Ellipse,
    Triangle,
    Star,
    Line,
    Curve,
}

/// Control points for `curve` shapes, relative to the shape's position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveConfig {
    pub control_points: Vec<Position>,
    #[serde(default)]
    pub tension: f64,
    #[serde(default)]
    pub closed: bool,
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Discriminant of [`NodeKind`], for cheap matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Layer,
    Group,
    Image,
    Text,
    Shape,
}

impl NodeType {
    /// Whether nodes of this type may own children.
    pub fn is_container(self) -> bool {
        matches!(self, NodeType::Root | NodeType::Layer | NodeType::Group)
    }

    /// Prefix used when minting ids for this type.
    pub fn id_prefix(self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Layer => "layer",
            NodeType::Group => "group",
            NodeType::Image => "image",
            NodeType::Text => "text",
            NodeType::Shape => "shape",
        }
    }
}

/// Type-specific node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum NodeKind {
    /// Top of the document. Its size is the canvas format.
    Root {
        background_color: Color,
        background_opacity: f64,
    },
    Layer,
    Group,
    Image {
        src: String,
    },
    Text {
        text: String,
        font_size: f64,
        font_family: String,
        font_color: Color,
        #[serde(default)]
        stroke: Option<Color>,
        #[serde(default)]
        stroke_width: f64,
    },
    Shape {
        shape_type: ShapeKind,
        fill: Color,
        #[serde(default)]
        stroke: Option<Color>,
        #[serde(default)]
        stroke_width: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        curve_config: Option<CurveConfig>,
    },
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Root { .. } => NodeType::Root,
            NodeKind::Layer => NodeType::Layer,
            NodeKind::Group => NodeType::Group,
            NodeKind::Image { .. } => NodeType::Image,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Shape { .. } => NodeType::Shape,
        }
    }

    pub fn text(content: &str) -> Self {
        NodeKind::Text {
            text: content.to_string(),
            font_size: 24.0,
            font_family: "Inter".into(),
            font_color: Color::BLACK,
            stroke: None,
            stroke_width: 0.0,
        }
    }

    pub fn shape(shape_type: ShapeKind, fill: Color) -> Self {
        NodeKind::Shape {
            shape_type,
            fill,
            stroke: None,
            stroke_width: 0.0,
            curve_config: None,
        }
    }
}

/// A single element of the composition.
///
/// `children` and `parentId` live in the arena, not here, so they can never
/// disagree with actual membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    pub blend_mode: BlendMode,
    #[serde(flatten)]
    pub kind: NodeKind,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            is_expanded: false,
            position: Position::default(),
            size: Size::default(),
            rotation: 0.0,
            opacity: 1.0,
            z_index: 0,
            blend_mode: BlendMode::SourceOver,
            kind,
        }
    }

    /// Create a node with a freshly minted, type-prefixed id.
    pub fn fresh(name: impl Into<String>, kind: NodeKind) -> Self {
        let id = NodeId::with_prefix(kind.node_type().id_prefix());
        Self::new(id, name, kind)
    }

    /// The document root, sized to the canvas.
    pub fn root(size: Size) -> Self {
        let mut node = Self::new(
            NodeId::intern("root"),
            "Root",
            NodeKind::Root {
                background_color: Color::WHITE,
                background_opacity: 1.0,
            },
        );
        node.size = size;
        node.is_expanded = true;
        node
    }

    pub fn layer(name: impl Into<String>) -> Self {
        let mut node = Self::fresh(name, NodeKind::Layer);
        node.is_expanded = true;
        node
    }

    pub fn with_frame(mut self, position: Position, size: Size) -> Self {
        self.position = position;
        self.size = size;
        self
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn is_container(&self) -> bool {
        self.node_type().is_container()
    }

    /// Axis-aligned rectangle from `position` and `size` (rotation ignored).
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.size.width,
            self.position.y + self.size.height,
        )
    }
}

// ─── Partial updates ─────────────────────────────────────────────────────

/// A shallow, typed patch over a node's properties.
///
/// Fields that do not apply to the target's kind are ignored by [`apply`].
///
/// [`apply`]: NodeChanges::apply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<BlendMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<ShapeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve_config: Option<CurveConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_opacity: Option<f64>,
}

impl NodeChanges {
    pub fn is_empty(&self) -> bool {
        *self == NodeChanges::default()
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            position: Some(Position::new(x, y)),
            ..Default::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            size: Some(Size::new(width, height)),
            ..Default::default()
        }
    }

    /// Overlay `other` on top of `self`; `Some` fields in `other` win.
    pub fn merge(&mut self, other: NodeChanges) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        take!(
            name,
            visible,
            is_expanded,
            position,
            size,
            rotation,
            opacity,
            z_index,
            blend_mode,
            src,
            text,
            font_size,
            font_family,
            font_color,
            fill,
            stroke,
            stroke_width,
            shape_type,
            curve_config,
            background_color,
            background_opacity,
        );
    }

    /// Shallow-merge this patch into `node`.
    pub fn apply(&self, node: &mut Node) {
        if let Some(name) = &self.name {
            node.name = name.clone();
        }
        if let Some(visible) = self.visible {
            node.visible = visible;
        }
        if let Some(expanded) = self.is_expanded {
            node.is_expanded = expanded;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(size) = self.size {
            node.size = size;
        }
        if let Some(rotation) = self.rotation {
            node.rotation = rotation;
        }
        if let Some(opacity) = self.opacity {
            node.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(z) = self.z_index {
            node.z_index = z;
        }
        if let Some(mode) = self.blend_mode {
            node.blend_mode = mode;
        }

        match &mut node.kind {
            NodeKind::Root {
                background_color,
                background_opacity,
            } => {
                if let Some(c) = self.background_color {
                    *background_color = c;
                }
                if let Some(o) = self.background_opacity {
                    *background_opacity = o.clamp(0.0, 1.0);
                }
            }
            NodeKind::Image { src } => {
                if let Some(s) = &self.src {
                    *src = s.clone();
                }
            }
            NodeKind::Text {
                text,
                font_size,
                font_family,
                font_color,
                stroke,
                stroke_width,
            } => {
                if let Some(t) = &self.text {
                    *text = t.clone();
                }
                if let Some(s) = self.font_size {
                    *font_size = s;
                }
                if let Some(f) = &self.font_family {
                    *font_family = f.clone();
                }
                if let Some(c) = self.font_color {
                    *font_color = c;
                }
                if let Some(c) = self.stroke {
                    *stroke = Some(c);
                }
                if let Some(w) = self.stroke_width {
                    *stroke_width = w;
                }
            }
            NodeKind::Shape {
                shape_type,
                fill,
                stroke,
                stroke_width,
                curve_config,
            } => {
                if let Some(t) = self.shape_type {
                    *shape_type = t;
                }
                if let Some(c) = self.fill {
                    *fill = c;
                }
                if let Some(c) = self.stroke {
                    *stroke = Some(c);
                }
                if let Some(w) = self.stroke_width {
                    *stroke_width = w;
                }
                if let Some(cfg) = &self.curve_config {
                    *curve_config = Some(cfg.clone());
                }
            }
            NodeKind::Layer | NodeKind::Group => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#6C5CE7").unwrap();
        assert_eq!(c.to_hex(), "#6C5CE7");

        let c2 = Color::from_hex("#FF000080").unwrap();
        assert!((c2.a - 128.0 / 255.0).abs() < 0.01);
        assert_eq!(c2.to_hex().len(), 9);

        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("zzzzzz"), None);
    }

    #[test]
    fn node_json_shape_is_flat_and_camel_cased() {
        let node = Node::new(
            NodeId::intern("t1"),
            "Title",
            NodeKind::Text {
                text: "Hello".into(),
                font_size: 32.0,
                font_family: "Inter".into(),
                font_color: Color::BLACK,
                stroke: None,
                stroke_width: 0.0,
            },
        );
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["fontSize"], 32.0);
        assert_eq!(value["fontColor"], "#000000");
        assert_eq!(value["blendMode"], "source-over");
        assert_eq!(value["zIndex"], 0);

        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let json = r##"{ "id": "s1", "name": "Box", "type": "shape",
                        "shapeType": "rect", "fill": "#FF0000" }"##;
        let node: Node = serde_json::from_str(json).unwrap();
        assert!(node.visible);
        assert_eq!(node.opacity, 1.0);
        assert_eq!(node.node_type(), NodeType::Shape);
    }

    #[test]
    fn changes_apply_only_matching_fields() {
        let mut node = Node::new(
            NodeId::intern("img"),
            "Photo",
            NodeKind::Image {
                src: "a.png".into(),
            },
        );
        let changes = NodeChanges {
            src: Some("b.png".into()),
            fill: Some(Color::WHITE),
            opacity: Some(4.0),
            ..NodeChanges::position(10.0, 20.0)
        };
        changes.apply(&mut node);

        assert_eq!(node.position, Position::new(10.0, 20.0));
        assert_eq!(node.opacity, 1.0);
        assert_eq!(
            node.kind,
            NodeKind::Image {
                src: "b.png".into()
            }
        );
    }

    #[test]
    fn merge_prefers_later_values() {
        let mut a = NodeChanges::position(1.0, 1.0);
        a.rotation = Some(45.0);
        a.merge(NodeChanges::position(5.0, 5.0));
        assert_eq!(a.position, Some(Position::new(5.0, 5.0)));
        assert_eq!(a.rotation, Some(45.0));
        assert!(!a.is_empty());
        assert!(NodeChanges::default().is_empty());
    }

    #[test]
    fn bounds_from_position_and_size() {
        let node = Node::fresh("r", NodeKind::shape(ShapeKind::Rect, Color::BLACK))
            .with_frame(Position::new(10.0, 20.0), Size::new(30.0, 40.0));
        let b = node.bounds();
        assert_eq!((b.x0, b.y0, b.x1, b.y1), (10.0, 20.0, 40.0, 60.0));
    }
}
