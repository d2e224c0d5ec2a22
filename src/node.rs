//! Design node model.
//!
//! The input document is a JSON export from the design tool. It is parsed in
//! two steps:
//!
//! 1. `serde_json` deserializes the export into loose `Raw*` structs that
//!    mirror the tool's camelCase schema and tolerate absent fields.
//! 2. The requested frame is located by id, and only its subtree is converted
//!    into the owned [`DesignNode`] tree. Conversion is where structural
//!    validation happens: a node without an `id` or `type` aborts the build
//!    with the offending node path.
//!
//! ## Accepted Input Shapes
//!
//! ```text
//! { "document": { ... } }                          full file export
//! { "nodes": { "1:2": { "document": { ... } } } }   nodes endpoint response
//! { "id": "1:2", "type": "FRAME", ... }             bare node
//! ```
//!
//! ## Node Kinds
//!
//! The tool has many node types; the engine only distinguishes six:
//!
//! | Tool type | Kind |
//! |-----------|------|
//! | `FRAME`, `COMPONENT`, `INSTANCE`, `COMPONENT_SET`, `SECTION`, `CANVAS`, `DOCUMENT` | frame |
//! | `GROUP`, `BOOLEAN_OPERATION` | group |
//! | `TEXT` | text |
//! | `LINE` | line |
//! | `RECTANGLE`, `ELLIPSE`, `VECTOR`, `STAR`, `REGULAR_POLYGON` | rectangle |
//!
//! A childless rectangle whose paints include an image is upgraded to an
//! image node. Unknown types with children become frames; without children
//! they become rectangles.

use crate::types::{Padding, num};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed node at {path}: {reason}")]
    Malformed { path: String, reason: String },
    #[error("Frame {0} not found in the supplied document")]
    UnresolvedFrame(String),
}

// ============================================================================
// Raw export schema
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: Option<String>,
    #[serde(rename = "type")]
    node_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    visible: Option<bool>,
    absolute_bounding_box: Option<RawBox>,
    layout_mode: Option<String>,
    item_spacing: Option<f64>,
    padding_top: Option<f64>,
    padding_right: Option<f64>,
    padding_bottom: Option<f64>,
    padding_left: Option<f64>,
    primary_axis_align_items: Option<String>,
    counter_axis_align_items: Option<String>,
    layout_wrap: Option<String>,
    layout_sizing_horizontal: Option<String>,
    layout_sizing_vertical: Option<String>,
    layout_grow: Option<f64>,
    layout_positioning: Option<String>,
    fills: Option<Vec<RawPaint>>,
    strokes: Option<Vec<RawPaint>>,
    stroke_weight: Option<f64>,
    corner_radius: Option<f64>,
    rectangle_corner_radii: Option<Vec<f64>>,
    effects: Option<Vec<RawEffect>>,
    blend_mode: Option<String>,
    clips_content: Option<bool>,
    opacity: Option<f64>,
    characters: Option<String>,
    style: Option<RawTypeStyle>,
    children: Option<Vec<RawNode>>,
}

#[derive(Debug, Deserialize)]
struct RawBox {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPaint {
    #[serde(rename = "type")]
    paint_type: String,
    visible: Option<bool>,
    opacity: Option<f64>,
    color: Option<RawColor>,
    gradient_stops: Option<Vec<RawStop>>,
    gradient_handle_positions: Option<Vec<RawVector>>,
    image_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawColor {
    r: f64,
    g: f64,
    b: f64,
    #[serde(default = "opaque")]
    a: f64,
}

fn opaque() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct RawStop {
    color: RawColor,
    #[serde(default)]
    position: f64,
}

#[derive(Debug, Deserialize)]
struct RawVector {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Deserialize)]
struct RawEffect {
    #[serde(rename = "type")]
    effect_type: String,
    visible: Option<bool>,
    #[serde(default)]
    radius: f64,
    color: Option<RawColor>,
    offset: Option<RawVector>,
    spread: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeStyle {
    font_family: Option<String>,
    font_size: Option<f64>,
    font_weight: Option<f64>,
    line_height_px: Option<f64>,
    line_height_percent_font_size: Option<f64>,
    letter_spacing: Option<f64>,
    text_align_horizontal: Option<String>,
    text_decoration: Option<String>,
    text_case: Option<String>,
    italic: Option<bool>,
    paragraph_spacing: Option<f64>,
}

// ============================================================================
// Owned node model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Frame,
    Text,
    Rectangle,
    Image,
    Line,
    Group,
}

impl NodeKind {
    /// Map a tool node type to a kind. `has_children` decides unknown types.
    pub fn from_tool_type(node_type: &str, has_children: bool) -> Self {
        match node_type.to_ascii_uppercase().as_str() {
            "FRAME" | "COMPONENT" | "INSTANCE" | "COMPONENT_SET" | "SECTION" | "CANVAS"
            | "DOCUMENT" => Self::Frame,
            "GROUP" | "BOOLEAN_OPERATION" => Self::Group,
            "TEXT" => Self::Text,
            "LINE" => Self::Line,
            "IMAGE" => Self::Image,
            "RECTANGLE" | "ELLIPSE" | "VECTOR" | "STAR" | "REGULAR_POLYGON" | "POLYGON" => {
                Self::Rectangle
            }
            _ if has_children => Self::Frame,
            _ => Self::Rectangle,
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, Self::Frame | Self::Group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    None,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingHint {
    Fixed,
    Fill,
    Hug,
}

impl SizingHint {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "FIXED" => Some(Self::Fixed),
            "FILL" => Some(Self::Fill),
            "HUG" => Some(Self::Hug),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisAlign {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    Baseline,
}

impl AxisAlign {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_uppercase).as_deref() {
            Some("CENTER") => Self::Center,
            Some("MAX") => Self::End,
            Some("SPACE_BETWEEN") => Self::SpaceBetween,
            Some("BASELINE") => Self::Baseline,
            _ => Self::Start,
        }
    }

    pub fn to_css(self) -> &'static str {
        match self {
            Self::Start => "flex-start",
            Self::Center => "center",
            Self::End => "flex-end",
            Self::SpaceBetween => "space-between",
            Self::Baseline => "baseline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    #[default]
    Auto,
    Absolute,
}

/// Auto-layout attributes of a container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AutoLayout {
    pub mode: LayoutMode,
    pub item_spacing: f64,
    pub padding: Padding,
    pub primary_align: AxisAlign,
    pub counter_align: AxisAlign,
    pub wrap: bool,
}

/// Sizing hints a node carries as a child of an auto-layout container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChildSizing {
    pub horizontal: Option<SizingHint>,
    pub vertical: Option<SizingHint>,
    pub grow: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    fn channel(value: f64) -> u8 {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        let (r, g, b) = (
            Self::channel(self.r),
            Self::channel(self.g),
            Self::channel(self.b),
        );
        if self.a >= 0.999 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("rgba({r}, {g}, {b}, {})", num(self.a.max(0.0)))
        }
    }

    fn from_raw(raw: &RawColor, opacity: f64) -> Self {
        Self {
            r: raw.r,
            g: raw.g,
            b: raw.b,
            a: raw.a * opacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
    Angular,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub color: Color,
    pub position: f64,
}

/// One paint layer. Layers are ordered bottom-most first.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Gradient {
        kind: GradientKind,
        angle_deg: f64,
        stops: Vec<GradientStop>,
    },
    Image {
        image_ref: Option<String>,
    },
}

impl Paint {
    fn from_raw(raw: &RawPaint) -> Option<Self> {
        if raw.visible == Some(false) {
            return None;
        }
        let opacity = raw.opacity.unwrap_or(1.0);
        let kind = raw.paint_type.to_ascii_uppercase();
        match kind.as_str() {
            "SOLID" => raw
                .color
                .as_ref()
                .map(|c| Self::Solid(Color::from_raw(c, opacity))),
            "IMAGE" => Some(Self::Image {
                image_ref: raw.image_ref.clone(),
            }),
            k if k.starts_with("GRADIENT") => {
                let kind = match k {
                    "GRADIENT_RADIAL" | "GRADIENT_DIAMOND" => GradientKind::Radial,
                    "GRADIENT_ANGULAR" => GradientKind::Angular,
                    _ => GradientKind::Linear,
                };
                let stops = raw
                    .gradient_stops
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|s| GradientStop {
                        color: Color::from_raw(&s.color, opacity),
                        position: s.position,
                    })
                    .collect();
                Some(Self::Gradient {
                    kind,
                    angle_deg: gradient_angle(raw.gradient_handle_positions.as_deref()),
                    stops,
                })
            }
            _ => None,
        }
    }
}

/// CSS angle of a linear gradient from its first two handle positions.
///
/// Handle coordinates are normalized with y pointing down; CSS measures
/// clockwise from "to top".
fn gradient_angle(handles: Option<&[RawVector]>) -> f64 {
    match handles {
        Some([start, end, ..]) => {
            let (dx, dy) = (end.x - start.x, end.y - start.y);
            if dx == 0.0 && dy == 0.0 {
                return 180.0;
            }
            let deg = dx.atan2(-dy).to_degrees();
            let normalized = (deg + 360.0) % 360.0;
            (normalized * 100.0).round() / 100.0
        }
        _ => 180.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerRadius {
    Uniform(f64),
    PerCorner([f64; 4]),
}

impl CornerRadius {
    pub fn to_css(&self) -> String {
        match self {
            Self::Uniform(r) => crate::types::px(*r),
            Self::PerCorner(corners) => corners
                .iter()
                .map(|r| crate::types::px(*r))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    DropShadow {
        color: Color,
        x: f64,
        y: f64,
        radius: f64,
        spread: f64,
    },
    InnerShadow {
        color: Color,
        x: f64,
        y: f64,
        radius: f64,
        spread: f64,
    },
    LayerBlur {
        radius: f64,
    },
    BackgroundBlur {
        radius: f64,
    },
}

impl Effect {
    fn from_raw(raw: &RawEffect) -> Option<Self> {
        if raw.visible == Some(false) {
            return None;
        }
        let color = raw
            .color
            .as_ref()
            .map(|c| Color::from_raw(c, 1.0))
            .unwrap_or(Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 0.25,
            });
        let (x, y) = raw.offset.as_ref().map(|o| (o.x, o.y)).unwrap_or_default();
        let spread = raw.spread.unwrap_or(0.0);
        match raw.effect_type.to_ascii_uppercase().as_str() {
            "DROP_SHADOW" => Some(Self::DropShadow {
                color,
                x,
                y,
                radius: raw.radius,
                spread,
            }),
            "INNER_SHADOW" => Some(Self::InnerShadow {
                color,
                x,
                y,
                radius: raw.radius,
                spread,
            }),
            "LAYER_BLUR" => Some(Self::LayerBlur { radius: raw.radius }),
            "BACKGROUND_BLUR" => Some(Self::BackgroundBlur { radius: raw.radius }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDecoration {
    Underline,
    Strikethrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCase {
    Upper,
    Lower,
    Title,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: f64,
    /// Line height as a multiple of the font size.
    pub line_height: Option<f64>,
    pub letter_spacing: f64,
    pub align: Option<String>,
    pub decoration: Option<TextDecoration>,
    pub case: Option<TextCase>,
    pub italic: bool,
    pub paragraph_spacing: f64,
    pub color: Option<Color>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: 400.0,
            line_height: None,
            letter_spacing: 0.0,
            align: None,
            decoration: None,
            case: None,
            italic: false,
            paragraph_spacing: 0.0,
            color: None,
        }
    }
}

impl TextStyle {
    fn from_raw(raw: Option<&RawTypeStyle>, fills: &[Paint]) -> Self {
        let mut style = Self {
            color: fills.iter().find_map(|p| match p {
                Paint::Solid(c) => Some(*c),
                _ => None,
            }),
            ..Self::default()
        };
        let Some(raw) = raw else {
            return style;
        };
        style.font_family = raw.font_family.clone();
        if let Some(size) = raw.font_size.filter(|s| *s > 0.0) {
            style.font_size = size;
        }
        if let Some(weight) = raw.font_weight {
            style.font_weight = weight;
        }
        style.line_height = match (raw.line_height_px, raw.line_height_percent_font_size) {
            (Some(px), _) if px > 0.0 => Some(((px / style.font_size) * 100.0).round() / 100.0),
            (_, Some(pct)) if pct > 0.0 => Some(pct / 100.0),
            _ => None,
        };
        style.letter_spacing = raw.letter_spacing.unwrap_or(0.0);
        style.align = raw
            .text_align_horizontal
            .as_deref()
            .and_then(|a| match a.to_ascii_uppercase().as_str() {
                "CENTER" => Some("center".to_string()),
                "RIGHT" => Some("right".to_string()),
                "JUSTIFIED" => Some("justify".to_string()),
                _ => None,
            });
        style.decoration = raw
            .text_decoration
            .as_deref()
            .and_then(|d| match d.to_ascii_uppercase().as_str() {
                "UNDERLINE" => Some(TextDecoration::Underline),
                "STRIKETHROUGH" => Some(TextDecoration::Strikethrough),
                _ => None,
            });
        style.case = raw
            .text_case
            .as_deref()
            .and_then(|c| match c.to_ascii_uppercase().as_str() {
                "UPPER" => Some(TextCase::Upper),
                "LOWER" => Some(TextCase::Lower),
                "TITLE" => Some(TextCase::Title),
                _ => None,
            });
        style.italic = raw.italic.unwrap_or(false);
        style.paragraph_spacing = raw.paragraph_spacing.unwrap_or(0.0).max(0.0);
        style
    }
}

/// Element a text node renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTag {
    H1,
    H2,
    H3,
    H4,
    P,
}

/// An immutable design node and its subtree.
///
/// Children are in render order, which is also DOM order.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    /// Tool type the kind was derived from (`VECTOR`, `INSTANCE`, ...).
    pub source_type: String,
    pub visible: bool,
    pub bounds: BoundingBox,
    pub layout: AutoLayout,
    pub sizing: ChildSizing,
    pub positioning: Positioning,
    pub fills: Vec<Paint>,
    pub stroke: Option<Stroke>,
    pub corner_radius: Option<CornerRadius>,
    pub effects: Vec<Effect>,
    pub blend_mode: Option<String>,
    pub clips_content: bool,
    pub opacity: f64,
    pub characters: Option<String>,
    pub text_style: Option<TextStyle>,
    pub children: Vec<DesignNode>,
}

impl DesignNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        let source_type = match kind {
            NodeKind::Frame => "FRAME",
            NodeKind::Text => "TEXT",
            NodeKind::Rectangle | NodeKind::Image => "RECTANGLE",
            NodeKind::Line => "LINE",
            NodeKind::Group => "GROUP",
        };
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            source_type: source_type.to_string(),
            visible: true,
            bounds: BoundingBox::default(),
            layout: AutoLayout::default(),
            sizing: ChildSizing::default(),
            positioning: Positioning::Auto,
            fills: Vec::new(),
            stroke: None,
            corner_radius: None,
            effects: Vec::new(),
            blend_mode: None,
            clips_content: false,
            opacity: 1.0,
            characters: None,
            text_style: None,
            children: Vec::new(),
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn is_auto_layout(&self) -> bool {
        self.layout.mode != LayoutMode::None
    }

    pub fn has_image_fill(&self) -> bool {
        self.fills.iter().any(|p| matches!(p, Paint::Image { .. }))
    }

    /// True for shapes authored as vectors (icons, glyphs) rather than boxes.
    pub fn is_vector_shape(&self) -> bool {
        matches!(
            self.source_type.as_str(),
            "VECTOR" | "STAR" | "REGULAR_POLYGON" | "POLYGON" | "BOOLEAN_OPERATION"
        )
    }

    /// Smaller of the two bounding-box extents.
    pub fn minor_extent(&self) -> f64 {
        self.bounds.width.min(self.bounds.height)
    }

    /// Element a text node renders as.
    ///
    /// The layer name wins, then weight plus size, then size alone.
    pub fn text_tag(&self) -> TextTag {
        let name = self.name.to_lowercase();
        if name.contains("h1") || name.contains("見出し1") {
            return TextTag::H1;
        }
        if name.contains("h2") || name.contains("見出し2") || name.contains("subtitle") {
            return TextTag::H2;
        }
        if name.contains("title") {
            return TextTag::H1;
        }
        if name.contains("h3") || name.contains("見出し3") {
            return TextTag::H3;
        }
        if name.contains("h4") || name.contains("見出し4") {
            return TextTag::H4;
        }
        let style = self.text_style.clone().unwrap_or_default();
        let (size, weight) = (style.font_size, style.font_weight);
        if weight >= 600.0 {
            if size >= 32.0 {
                return TextTag::H1;
            }
            if size >= 24.0 {
                return TextTag::H2;
            }
            if size >= 18.0 {
                return TextTag::H3;
            }
            if size >= 16.0 {
                return TextTag::H4;
            }
        }
        if size >= 28.0 {
            TextTag::H1
        } else if size >= 20.0 {
            TextTag::H2
        } else {
            TextTag::P
        }
    }

    /// Depth-first, document-order search by id.
    pub fn find(&self, id: &str) -> Option<&DesignNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Parse a design export and return the subtree rooted at `frame_id`.
pub fn load_frame(json: &str, frame_id: &str) -> Result<DesignNode, NodeError> {
    let value: Value = serde_json::from_str(json)?;
    let raw: RawNode = serde_json::from_value(unwrap_document(value))?;
    let frame = take_frame(raw, frame_id)
        .ok_or_else(|| NodeError::UnresolvedFrame(frame_id.to_string()))?;
    let mut seen = HashSet::new();
    convert(frame, "root", &mut seen)
}

/// Parse a bare node tree without frame lookup.
pub fn parse_tree(json: &str) -> Result<DesignNode, NodeError> {
    let value: Value = serde_json::from_str(json)?;
    let raw: RawNode = serde_json::from_value(unwrap_document(value))?;
    let mut seen = HashSet::new();
    convert(raw, "root", &mut seen)
}

/// Strip the file-export or nodes-response envelope around the node tree.
fn unwrap_document(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if let Some(document) = map.remove("document") {
                return document;
            }
            if let Some(Value::Object(nodes)) = map.remove("nodes") {
                // serde_json maps iterate in key order, so this pick is stable.
                if let Some((_, Value::Object(mut entry))) = nodes.into_iter().next()
                    && let Some(document) = entry.remove("document")
                {
                    return document;
                }
                return Value::Null;
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn take_frame(raw: RawNode, frame_id: &str) -> Option<RawNode> {
    if raw.id.as_deref() == Some(frame_id) {
        return Some(raw);
    }
    raw.children
        .unwrap_or_default()
        .into_iter()
        .find_map(|child| take_frame(child, frame_id))
}

fn malformed(path: &str, reason: impl Into<String>) -> NodeError {
    NodeError::Malformed {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn convert(raw: RawNode, path: &str, seen: &mut HashSet<String>) -> Result<DesignNode, NodeError> {
    let id = raw
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| malformed(path, "missing id"))?;
    let node_type = raw
        .node_type
        .filter(|t| !t.is_empty())
        .ok_or_else(|| malformed(path, format!("node {id} is missing its type")))?;
    if !seen.insert(id.clone()) {
        return Err(malformed(path, format!("duplicate node id {id}")));
    }

    let raw_children = raw.children.unwrap_or_default();
    let mut children = Vec::with_capacity(raw_children.len());
    for (i, child) in raw_children.into_iter().enumerate() {
        let child_name = child.name.as_deref().unwrap_or("Unnamed").to_string();
        let child_path = format!("{path}/{child_name}[{i}]");
        children.push(convert(child, &child_path, seen)?);
    }

    let fills: Vec<Paint> = raw
        .fills
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(Paint::from_raw)
        .collect();
    let mut kind = NodeKind::from_tool_type(&node_type, !children.is_empty());
    if kind == NodeKind::Rectangle
        && children.is_empty()
        && fills.iter().any(|p| matches!(p, Paint::Image { .. }))
    {
        kind = NodeKind::Image;
    }

    let stroke = raw.stroke_weight.filter(|w| *w > 0.0).and_then(|weight| {
        raw.strokes
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(Paint::from_raw)
            .find_map(|p| match p {
                Paint::Solid(color) => Some(Stroke { color, weight }),
                _ => None,
            })
    });

    let corner_radius = match (raw.rectangle_corner_radii.as_deref(), raw.corner_radius) {
        (Some([a, b, c, d]), _) if !(a == b && b == c && c == d) => {
            Some(CornerRadius::PerCorner([*a, *b, *c, *d]))
        }
        (Some([a, ..]), _) if *a > 0.0 => Some(CornerRadius::Uniform(*a)),
        (_, Some(r)) if r > 0.0 => Some(CornerRadius::Uniform(r)),
        _ => None,
    };

    let layout = AutoLayout {
        mode: match raw.layout_mode.as_deref().map(str::to_ascii_uppercase).as_deref() {
            Some("HORIZONTAL") => LayoutMode::Horizontal,
            Some("VERTICAL") => LayoutMode::Vertical,
            _ => LayoutMode::None,
        },
        item_spacing: raw.item_spacing.unwrap_or(0.0),
        padding: Padding {
            top: raw.padding_top.unwrap_or(0.0),
            right: raw.padding_right.unwrap_or(0.0),
            bottom: raw.padding_bottom.unwrap_or(0.0),
            left: raw.padding_left.unwrap_or(0.0),
        },
        primary_align: AxisAlign::parse(raw.primary_axis_align_items.as_deref()),
        counter_align: AxisAlign::parse(raw.counter_axis_align_items.as_deref()),
        wrap: raw
            .layout_wrap
            .as_deref()
            .is_some_and(|w| w.eq_ignore_ascii_case("WRAP")),
    };

    let text_style =
        (kind == NodeKind::Text).then(|| TextStyle::from_raw(raw.style.as_ref(), &fills));

    Ok(DesignNode {
        id,
        name: raw.name.unwrap_or_default(),
        kind,
        source_type: node_type.to_ascii_uppercase(),
        visible: raw.visible.unwrap_or(true),
        bounds: raw
            .absolute_bounding_box
            .map(|b| BoundingBox {
                x: b.x,
                y: b.y,
                width: b.width,
                height: b.height,
            })
            .unwrap_or_default(),
        layout,
        sizing: ChildSizing {
            horizontal: raw.layout_sizing_horizontal.as_deref().and_then(SizingHint::parse),
            vertical: raw.layout_sizing_vertical.as_deref().and_then(SizingHint::parse),
            grow: raw.layout_grow.unwrap_or(0.0),
        },
        positioning: match raw.layout_positioning.as_deref() {
            Some(p) if p.eq_ignore_ascii_case("ABSOLUTE") => Positioning::Absolute,
            _ => Positioning::Auto,
        },
        fills,
        stroke,
        corner_radius,
        effects: raw
            .effects
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(Effect::from_raw)
            .collect(),
        blend_mode: raw
            .blend_mode
            .filter(|m| !matches!(m.to_ascii_uppercase().as_str(), "PASS_THROUGH" | "NORMAL")),
        clips_content: raw.clips_content.unwrap_or(false),
        opacity: raw.opacity.unwrap_or(1.0),
        characters: raw.characters,
        text_style,
        children,
    })
}
