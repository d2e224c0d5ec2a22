//! Style collector.
//!
//! Produces the declarations attached to a node's identity class. Every
//! proposed declaration is tagged with the lowest [`FidelityScope`] that
//! permits it and then gated against the configured scope: anything the scope
//! refuses is withheld and recorded as a scope violation, never silently
//! dropped or silently emitted.
//!
//! ## Scope Table
//!
//! | Property | text node | other nodes |
//! |----------|-----------|-------------|
//! | `color` | conservative | aggressive |
//! | typography (`font-*`, `line-height`, ...) | conservative | standard |
//! | background, border, radius, shadow, filter, blend | conservative | conservative |
//! | flex, gap, padding, overflow, min-height, alignment | conservative | conservative |
//! | everything else (`width`, `height`, `opacity`, ...) | standard | standard |
//!
//! Non-text nodes receive `color` proposals in two ways: a container whose
//! direct text children share one colour has it hoisted, and a vector shape
//! proposes its fill as `color`. Both are withheld unless the scope is
//! aggressive.
//!
//! Declarations are split in two maps. The node's *own* declarations depend
//! only on the node; its *item* declarations (`flex`, `align-self`, ...)
//! depend on the parent it sits in and travel with it if a wrapper above it is
//! flattened.

use crate::background::Composite;
use crate::node::{DesignNode, Effect, NodeKind, Paint, SizingHint, TextCase, TextDecoration};
use crate::session::BuildSession;
use crate::sizing::CrossSizing;
use crate::spacing;
use crate::types::{Axis, FidelityScope, LayoutContext, ResolvedStyle, SizingDirective, num, px};

const CONSERVATIVE: &[&str] = &[
    "display",
    "flex",
    "flex-direction",
    "flex-wrap",
    "gap",
    "padding",
    "overflow",
    "min-height",
    "min-width",
    "align-items",
    "align-self",
    "justify-content",
    "border",
    "border-top",
    "border-radius",
    "box-shadow",
    "filter",
    "backdrop-filter",
    "-webkit-backdrop-filter",
    "mix-blend-mode",
    "margin",
    "margin-bottom",
];

const TYPOGRAPHY: &[&str] = &[
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "letter-spacing",
    "text-align",
    "text-decoration",
    "text-transform",
];

/// Lowest scope that permits `property` on a text or non-text node.
pub fn required_scope(property: &str, is_text: bool) -> FidelityScope {
    if property == "color" {
        return if is_text {
            FidelityScope::Conservative
        } else {
            FidelityScope::Aggressive
        };
    }
    if property.starts_with("background") || CONSERVATIVE.contains(&property) {
        return FidelityScope::Conservative;
    }
    if is_text && TYPOGRAPHY.contains(&property) {
        return FidelityScope::Conservative;
    }
    FidelityScope::Standard
}

fn propose(
    style: &mut ResolvedStyle,
    session: &mut BuildSession,
    node: &DesignNode,
    property: &str,
    value: impl Into<String>,
) {
    let value = value.into();
    let required = required_scope(property, node.kind == NodeKind::Text);
    if session.config.style.scope.permits(required) {
        style.set(property, value, required);
    } else {
        session.record_violation(&node.id, property, &value, required);
    }
}

/// Where a node sits relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// `None` for the root frame.
    pub main: Option<SizingDirective>,
    pub cross: CrossSizing,
    pub parent_axis: Option<Axis>,
    /// Direct child of a fixed/fill column pair.
    pub in_pair: bool,
    /// Inside the first column of a fixed/fill pair.
    pub in_first_column: bool,
}

impl Placement {
    pub fn root() -> Self {
        Self {
            main: None,
            cross: CrossSizing::Auto,
            parent_axis: None,
            in_pair: false,
            in_first_column: false,
        }
    }

    /// The parent's flex sizing already governs this node's width.
    fn width_from_flex(&self) -> bool {
        self.parent_axis == Some(Axis::Row)
            && matches!(
                self.main,
                Some(SizingDirective::Fixed(_) | SizingDirective::Fill | SizingDirective::Basis(_))
            )
    }
}

// ============================================================================
// Item declarations
// ============================================================================

/// Declarations a node carries because of the parent it sits in.
pub fn item_declarations(
    node: &DesignNode,
    placement: &Placement,
    session: &mut BuildSession,
) -> ResolvedStyle {
    let mut style = ResolvedStyle::new();
    if let Some(directive) = placement.main
        && directive != SizingDirective::Hug
    {
        propose(&mut style, session, node, "flex", directive.flex_value());
    }
    match placement.cross {
        CrossSizing::Stretch => propose(&mut style, session, node, "align-self", "stretch"),
        CrossSizing::Fixed(width) if node.is_container() => {
            if session.config.style.suppress_container_width {
                session.suppressed_widths += 1;
                propose(&mut style, session, node, "max-width", px(width));
            } else {
                propose(&mut style, session, node, "width", px(width));
                propose(&mut style, session, node, "max-width", "100%");
            }
        }
        CrossSizing::Fixed(width) => {
            propose(&mut style, session, node, "width", px(width));
            propose(&mut style, session, node, "max-width", "100%");
        }
        CrossSizing::Auto => {}
    }
    if placement.in_pair {
        propose(&mut style, session, node, "min-width", "0");
    }
    // Without the shared reset rule, text in a flex parent resets its own margins.
    if node.kind == NodeKind::Text
        && placement.parent_axis.is_some()
        && !session.config.css.utilities
    {
        propose(&mut style, session, node, "margin", "0");
    }
    style
}

// ============================================================================
// Container declarations
// ============================================================================

/// Flex, gap, padding and alignment for a container.
///
/// With `utilities` on, `display`/`flex-direction`/`flex-wrap` come from the
/// shared utility classes instead.
pub fn container_declarations(
    node: &DesignNode,
    ctx: &LayoutContext,
    session: &mut BuildSession,
) -> ResolvedStyle {
    let mut style = ResolvedStyle::new();
    if ctx.auto_layout {
        if !session.config.css.utilities {
            propose(&mut style, session, node, "display", "flex");
            let direction = match ctx.axis {
                Axis::Row => "row",
                Axis::Column => "column",
            };
            propose(&mut style, session, node, "flex-direction", direction);
            if ctx.wrap {
                propose(&mut style, session, node, "flex-wrap", "wrap");
            }
        }
        if ctx.gap > 0.0 {
            propose(&mut style, session, node, "gap", px(ctx.gap));
        }
        if node.layout.primary_align != Default::default() {
            propose(
                &mut style,
                session,
                node,
                "justify-content",
                node.layout.primary_align.to_css(),
            );
        }
        propose(
            &mut style,
            session,
            node,
            "align-items",
            node.layout.counter_align.to_css(),
        );
    }
    if let Some(padding) = ctx.padding.to_css() {
        propose(&mut style, session, node, "padding", padding);
    }
    if node.clips_content {
        propose(&mut style, session, node, "overflow", "hidden");
    }
    if node.sizing.vertical == Some(SizingHint::Fixed) && node.bounds.height > 0.0 {
        propose(&mut style, session, node, "min-height", px(node.bounds.height));
    }
    if !session.config.style.suppress_container_width
        && node.sizing.horizontal == Some(SizingHint::Fixed)
        && node.bounds.width > 0.0
    {
        propose(&mut style, session, node, "width", px(node.bounds.width));
    }
    style
}

// ============================================================================
// Own declarations
// ============================================================================

/// Colour shared by every direct text child, if there is at least one.
fn uniform_text_color(children: &[&DesignNode]) -> Option<String> {
    let mut colors = children
        .iter()
        .filter(|c| c.kind == NodeKind::Text)
        .map(|c| c.text_style.as_ref().and_then(|s| s.color).map(|c| c.to_css()));
    let first = colors.next()??;
    colors.all(|c| c.as_deref() == Some(first.as_str())).then_some(first)
}

/// Font stack for a design font family.
pub fn font_stack(family: &str) -> String {
    match family {
        "Noto Sans JP" => {
            "\"Noto Sans JP\", \"Hiragino Kaku Gothic ProN\", \"Hiragino Sans\", Meiryo, sans-serif"
                .to_string()
        }
        "Yu Gothic" => {
            "\"Yu Gothic\", \"Hiragino Kaku Gothic ProN\", Meiryo, sans-serif".to_string()
        }
        "Hiragino Sans" => {
            "\"Hiragino Sans\", \"Hiragino Kaku Gothic ProN\", Meiryo, sans-serif".to_string()
        }
        "Inter" => "Inter, -apple-system, BlinkMacSystemFont, sans-serif".to_string(),
        "Roboto" => "Roboto, -apple-system, BlinkMacSystemFont, sans-serif".to_string(),
        other => format!("\"{}\", sans-serif", other.replace('"', "")),
    }
}

fn blend_css(mode: &str) -> Option<String> {
    let css = match mode.to_ascii_uppercase().as_str() {
        "LINEAR_DODGE" => "plus-lighter".to_string(),
        "LINEAR_BURN" => "plus-darker".to_string(),
        "MULTIPLY" | "SCREEN" | "OVERLAY" | "DARKEN" | "LIGHTEN" | "COLOR_DODGE"
        | "COLOR_BURN" | "HARD_LIGHT" | "SOFT_LIGHT" | "DIFFERENCE" | "EXCLUSION" | "HUE"
        | "SATURATION" | "COLOR" | "LUMINOSITY" => mode.to_ascii_lowercase().replace('_', "-"),
        _ => return None,
    };
    Some(css)
}

fn shadow_css(effects: &[Effect]) -> Option<String> {
    let shadows: Vec<String> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::DropShadow {
                color,
                x,
                y,
                radius,
                spread,
            } => Some(format!(
                "{} {} {} {} {}",
                px(*x),
                px(*y),
                px(*radius),
                px(*spread),
                color.to_css()
            )),
            Effect::InnerShadow {
                color,
                x,
                y,
                radius,
                spread,
            } => Some(format!(
                "inset {} {} {} {} {}",
                px(*x),
                px(*y),
                px(*radius),
                px(*spread),
                color.to_css()
            )),
            _ => None,
        })
        .collect();
    (!shadows.is_empty()).then(|| shadows.join(", "))
}

fn typography(style: &mut ResolvedStyle, session: &mut BuildSession, node: &DesignNode) {
    let Some(text) = node.text_style.as_ref() else {
        return;
    };
    if let Some(color) = text.color {
        propose(style, session, node, "color", color.to_css());
    }
    if let Some(family) = text.font_family.as_deref() {
        propose(style, session, node, "font-family", font_stack(family));
    }
    propose(style, session, node, "font-size", px(text.font_size));
    if text.font_weight != 400.0 {
        propose(style, session, node, "font-weight", num(text.font_weight));
    }
    if let Some(ratio) = text.line_height {
        propose(style, session, node, "line-height", num(ratio));
    }
    if text.letter_spacing != 0.0 {
        propose(style, session, node, "letter-spacing", px(text.letter_spacing));
    }
    if let Some(align) = text.align.as_deref() {
        propose(style, session, node, "text-align", align);
    }
    if let Some(decoration) = text.decoration {
        let value = match decoration {
            TextDecoration::Underline => "underline",
            TextDecoration::Strikethrough => "line-through",
        };
        propose(style, session, node, "text-decoration", value);
    }
    if let Some(case) = text.case {
        let value = match case {
            TextCase::Upper => "uppercase",
            TextCase::Lower => "lowercase",
            TextCase::Title => "capitalize",
        };
        propose(style, session, node, "text-transform", value);
    }
    if text.italic {
        propose(style, session, node, "font-style", "italic");
    }
    if let Some(margin) = spacing::paragraph_margin(node) {
        propose(style, session, node, "margin-bottom", px(margin));
    }
}

fn box_sizing(
    style: &mut ResolvedStyle,
    session: &mut BuildSession,
    node: &DesignNode,
    placement: &Placement,
) {
    let (w, h) = (node.bounds.width, node.bounds.height);
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    if node.kind == NodeKind::Image && placement.in_first_column {
        propose(style, session, node, "height", px(h));
        propose(style, session, node, "width", "auto");
        propose(style, session, node, "max-width", "100%");
        return;
    }
    if !placement.width_from_flex() && placement.cross != CrossSizing::Stretch {
        propose(style, session, node, "width", px(w));
    }
    propose(style, session, node, "max-width", "100%");
    if session.config.style.fixed_height_to_aspect_ratio {
        propose(style, session, node, "aspect-ratio", format!("{} / {}", num(w), num(h)));
        propose(style, session, node, "height", "auto");
    } else {
        propose(style, session, node, "height", px(h));
    }
}

/// Declarations that depend only on the node itself.
///
/// `children` are the retained direct children, used for colour hoisting.
/// `background` is the node's composited paint stack; text nodes pass an
/// empty one since their fills are the text colour.
pub fn own_declarations(
    node: &DesignNode,
    children: &[&DesignNode],
    background: &Composite,
    placement: &Placement,
    session: &mut BuildSession,
) -> ResolvedStyle {
    let mut style = ResolvedStyle::new();

    match node.kind {
        NodeKind::Text => typography(&mut style, session, node),
        NodeKind::Image | NodeKind::Rectangle => box_sizing(&mut style, session, node, placement),
        NodeKind::Line => {
            if node.bounds.width > 0.0 && !placement.width_from_flex() {
                propose(&mut style, session, node, "width", px(node.bounds.width));
                propose(&mut style, session, node, "max-width", "100%");
            }
        }
        NodeKind::Frame | NodeKind::Group => {
            if let Some(color) = uniform_text_color(children) {
                propose(&mut style, session, node, "color", color);
            }
        }
    }

    if node.kind != NodeKind::Text && node.is_vector_shape() {
        let fill = node.fills.iter().find_map(|p| match p {
            Paint::Solid(c) => Some(c.to_css()),
            _ => None,
        });
        if let Some(color) = fill {
            propose(&mut style, session, node, "color", color);
        }
    }

    for (property, value) in &background.declarations {
        propose(&mut style, session, node, property, value.clone());
    }

    if let Some(stroke) = node.stroke {
        let value = format!("{} solid {}", px(stroke.weight), stroke.color.to_css());
        let property = if node.kind == NodeKind::Line {
            "border-top"
        } else {
            "border"
        };
        propose(&mut style, session, node, property, value);
    }
    if node.source_type == "ELLIPSE" {
        propose(&mut style, session, node, "border-radius", "50%");
    } else if let Some(radius) = node.corner_radius {
        propose(&mut style, session, node, "border-radius", radius.to_css());
    }
    if let Some(shadow) = shadow_css(&node.effects) {
        propose(&mut style, session, node, "box-shadow", shadow);
    }
    for effect in &node.effects {
        if let Effect::LayerBlur { radius } = effect {
            propose(&mut style, session, node, "filter", format!("blur({})", px(*radius)));
        }
    }
    if let Some(blend) = node.blend_mode.as_deref().and_then(blend_css) {
        propose(&mut style, session, node, "mix-blend-mode", blend);
    }
    if node.opacity < 1.0 {
        propose(&mut style, session, node, "opacity", num(node.opacity.max(0.0)));
    }
    if node.clips_content && !node.is_container() {
        propose(&mut style, session, node, "overflow", "hidden");
    }
    style
}
