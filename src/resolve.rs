//! Top-down resolution pass.
//!
//! Walks the retained tree in document order. For each container it derives
//! a [`LayoutContext`] before touching any child; each child is then sized
//! against that context and styled, producing a [`ResolvedNode`] tree that
//! the flattener, namer, emitter and markup renderer consume.
//!
//! ## Two-Wrapper Split
//!
//! A container whose background includes an image keeps the background on
//! its own element and moves its flex/gap/padding onto an inner
//! `<identity>__content` wrapper:
//!
//! ```text
//! <section class="n-1-2 hero bg-fullbleed">      background, full width
//!   <div class="n-1-2__content fx-col">           padding, gap, children
//!     ...
//! ```
//!
//! `bg-fullbleed` is added when the container is a section or a page-width
//! wrapper.

use crate::background::{self, Composite};
use crate::config::BuildConfig;
use crate::naming::{self, ClassAssignment, Role, TextRole};
use crate::node::{DesignNode, NodeKind, TextTag};
use crate::noise::Retained;
use crate::session::{BuildSession, DiagnosticKind};
use crate::sizing;
use crate::spacing;
use crate::style::{self, Placement};
use crate::types::{Axis, ColumnPair, LayoutContext, ResolvedPadding, ResolvedStyle};
use log::debug;

pub const FX_ROW: &str = "fx-row";
pub const FX_COL: &str = "fx-col";
pub const FW_WRAP: &str = "fw-wrap";
pub const LAYOUT_2COL: &str = "layout-2col";
pub const COL_FIRST: &str = "layout-2col__col--first";
pub const COL_SECOND: &str = "layout-2col__col--second";
pub const BG_FULLBLEED: &str = "bg-fullbleed";

/// Element a resolved node renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Section,
    Div,
    Text(TextTag),
    Img,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub element: Element,
    /// Direct container child of the root frame.
    pub is_section: bool,
    pub text: Option<String>,
    pub image_src: Option<String>,
    /// Declarations that depend only on the node.
    pub own: ResolvedStyle,
    /// Declarations that depend on the parent the node sits in.
    pub item: ResolvedStyle,
    /// Sits directly in an auto-layout (flex) parent.
    pub flex_item: bool,
    /// Inner wrapper declarations when the background is split off.
    pub content: Option<ResolvedStyle>,
    pub utilities: Vec<&'static str>,
    pub content_utilities: Vec<&'static str>,
    /// Carries fill, stroke, radius, clip, effects, opacity or blend.
    pub visual_role: bool,
    /// Carries non-zero padding or gap.
    pub spacing_role: bool,
    pub role: Option<Role>,
    pub text_role: Option<TextRole>,
    pub classes: ClassAssignment,
    pub children: Vec<ResolvedNode>,
}

impl ResolvedNode {
    /// Declarations for the identity rule: item first, then own.
    pub fn declarations(&self) -> ResolvedStyle {
        let mut combined = self.item.clone();
        combined.merge(&self.own);
        combined
    }

    pub fn has_declarations(&self) -> bool {
        !(self.item.is_empty() && self.own.is_empty())
    }

    /// Class of the inner content wrapper, if the node was split.
    pub fn content_class(&self) -> Option<String> {
        self.content
            .as_ref()
            .filter(|c| !c.is_empty())
            .map(|_| format!("{}__content", self.classes.identity))
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ResolvedNode::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Root,
    RootChild,
    Nested,
}

/// Layout facts for one container's retained children.
pub fn layout_context(
    node: &DesignNode,
    children: &[&DesignNode],
    is_root_child: bool,
    root_width: f64,
    config: &BuildConfig,
) -> LayoutContext {
    let (axis, auto_layout) = sizing::container_axis(node);
    let wrap = auto_layout && axis == Axis::Row && node.layout.wrap;
    LayoutContext {
        axis,
        auto_layout,
        gap: if auto_layout {
            spacing::normalize_gap(node.layout.item_spacing)
        } else {
            0.0
        },
        padding: if auto_layout {
            spacing::normalize_padding(node, root_width, is_root_child, &config.padding)
        } else {
            ResolvedPadding::zero()
        },
        child_count: children.len(),
        wrap,
        hugs_main_axis: sizing::hugs_main_axis(node),
        pair: sizing::analyze_pair(children, axis, auto_layout, wrap, &config.columns),
        root_width,
    }
}

fn layout_utilities(ctx: &LayoutContext) -> Vec<&'static str> {
    if !ctx.auto_layout {
        return Vec::new();
    }
    let mut utilities = vec![match ctx.axis {
        Axis::Row => FX_ROW,
        Axis::Column => FX_COL,
    }];
    if ctx.wrap {
        utilities.push(FW_WRAP);
    }
    if matches!(ctx.pair, Some(ColumnPair::FixedFill { .. })) {
        utilities.push(LAYOUT_2COL);
    }
    utilities
}

fn has_visual_role(node: &DesignNode) -> bool {
    !node.fills.is_empty()
        || node.stroke.is_some()
        || node.corner_radius.is_some()
        || node.clips_content
        || !node.effects.is_empty()
        || node.opacity < 1.0
        || node.blend_mode.is_some()
}

/// Resolve the retained tree rooted at the build frame.
pub fn resolve(root: &Retained, session: &mut BuildSession) -> ResolvedNode {
    let root_width = root.node.bounds.width;
    let mut resolved = resolve_node(root, Placement::root(), Position::Root, root_width, session);
    let mut seen_h1 = false;
    demote_extra_h1(&mut resolved, &mut seen_h1);
    resolved
}

/// One `h1` per page: the first in document order keeps it, later ones become `h2`.
fn demote_extra_h1(node: &mut ResolvedNode, seen_h1: &mut bool) {
    if node.element == Element::Text(TextTag::H1) {
        if *seen_h1 {
            debug!("resolve: {} demoted to h2", node.id);
            node.element = Element::Text(TextTag::H2);
        }
        *seen_h1 = true;
    }
    for child in &mut node.children {
        demote_extra_h1(child, seen_h1);
    }
}

fn resolve_node(
    retained: &Retained,
    placement: Placement,
    position: Position,
    root_width: f64,
    session: &mut BuildSession,
) -> ResolvedNode {
    let node = retained.node;
    let config = session.config;
    let children: Vec<&DesignNode> = retained.children.iter().map(|c| c.node).collect();
    let is_section = position == Position::RootChild && node.is_container();

    let image_src = if node.kind != NodeKind::Text && node.has_image_fill() {
        background::resolve_image(node, session)
    } else {
        None
    };
    let as_img = node.kind == NodeKind::Image && image_src.is_some();
    let composite = if node.kind == NodeKind::Text {
        Composite::default()
    } else {
        let url = if as_img { None } else { image_src.as_deref() };
        background::composite(&node.fills, &node.effects, url)
    };

    let mut own = style::own_declarations(node, &children, &composite, &placement, session);
    let item = style::item_declarations(node, &placement, session);

    let element = match node.kind {
        NodeKind::Text => Element::Text(node.text_tag()),
        _ if as_img => Element::Img,
        _ if is_section => Element::Section,
        _ => Element::Div,
    };

    let mut utilities = Vec::new();
    let mut content = None;
    let mut content_utilities = Vec::new();
    let mut spacing_role = false;
    let ctx = node.is_container().then(|| {
        layout_context(
            node,
            &children,
            position == Position::RootChild,
            root_width,
            config,
        )
    });

    if let Some(ctx) = &ctx {
        spacing_role = ctx.gap > 0.0 || !ctx.padding.is_zero();
        let layout = style::container_declarations(node, ctx, session);
        let layout_utils = if config.css.utilities {
            layout_utilities(ctx)
        } else {
            Vec::new()
        };
        if composite.has_image && !retained.children.is_empty() {
            debug!("resolve: splitting background of {} onto a wrapper", node.id);
            content = Some(layout);
            content_utilities = layout_utils;
            let page_wide = position == Position::Root
                || spacing::is_wrapper(
                    node,
                    root_width,
                    position == Position::RootChild,
                    &config.padding,
                );
            if config.css.utilities && (is_section || page_wide) {
                utilities.push(BG_FULLBLEED);
            }
        } else {
            let mut merged = layout;
            merged.merge(&own);
            own = merged;
            utilities = layout_utils;
        }
    }

    let mut resolved_children = Vec::with_capacity(retained.children.len());
    if let Some(ctx) = &ctx {
        let fixed_pair = matches!(ctx.pair, Some(ColumnPair::FixedFill { .. }));
        let child_position = match position {
            Position::Root => Position::RootChild,
            _ => Position::Nested,
        };
        for (index, child) in retained.children.iter().enumerate() {
            let decision = sizing::resolve_child(child.node, index, ctx);
            if let Some(reason) = decision.diagnostic {
                session.diagnose(DiagnosticKind::AmbiguousSizing, &child.node.id, reason);
            }
            let child_placement = Placement {
                main: ctx.auto_layout.then_some(decision.directive),
                cross: sizing::resolve_cross(child.node, ctx),
                parent_axis: ctx.auto_layout.then_some(ctx.axis),
                in_pair: fixed_pair,
                in_first_column: placement.in_first_column || (fixed_pair && index == 0),
            };
            let mut resolved =
                resolve_node(child, child_placement, child_position, root_width, session);
            if fixed_pair && config.css.utilities {
                resolved
                    .utilities
                    .push(if index == 0 { COL_FIRST } else { COL_SECOND });
            }
            resolved_children.push(resolved);
        }
    }

    ResolvedNode {
        id: node.id.clone(),
        name: node.name.clone(),
        kind: node.kind,
        element,
        is_section,
        text: node.characters.clone(),
        image_src: if as_img { image_src } else { None },
        own,
        item,
        flex_item: placement.parent_axis.is_some(),
        content,
        utilities,
        content_utilities,
        visual_role: has_visual_role(node),
        spacing_role,
        role: naming::classify(node, &children),
        text_role: naming::text_role(node),
        classes: ClassAssignment::default(),
        children: resolved_children,
    }
}
