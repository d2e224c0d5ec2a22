//! Sizing resolver.
//!
//! Decides how each child occupies its parent's main axis, and whether it
//! stretches or keeps a fixed extent on the cross axis. Everything here is a
//! pure function of the child, its retained siblings and the parent's
//! [`LayoutContext`].
//!
//! ## Main Axis
//!
//! | Hint | Row parent | Column parent |
//! |------|-----------|---------------|
//! | fixed | `flex: 0 0 <W>px` | `flex: 0 0 auto` |
//! | fill / grow | `flex: 1 1 auto` | `flex: 1 1 auto` |
//! | hug / none | intrinsic | intrinsic |
//!
//! ## Two-Column Pairs
//!
//! A horizontal, non-wrapping container with exactly two retained children is
//! analyzed as a pair before the per-child rules run:
//!
//! - one fixed child: the fixed width wins, the sibling fills, and no ratio
//!   logic is applied
//! - both fixed: each keeps its width
//! - neither fixed: a percentage basis from auto-layout hints, else from the
//!   bounding-box widths, else an optional equal split
//!
//! Wrapping rows skip the pair analysis entirely.

use crate::config::{ColumnsConfig, RatioSource};
use crate::node::{DesignNode, LayoutMode, SizingHint};
use crate::types::{Axis, ColumnPair, LayoutContext, SizingDirective, num};
use log::debug;

/// Main-axis decision for one child, plus a diagnostic when the hints
/// conflicted and the resolver fell back to intrinsic sizing.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingDecision {
    pub directive: SizingDirective,
    pub diagnostic: Option<String>,
}

impl SizingDecision {
    fn plain(directive: SizingDirective) -> Self {
        Self {
            directive,
            diagnostic: None,
        }
    }

    fn ambiguous(reason: String) -> Self {
        Self {
            directive: SizingDirective::Hug,
            diagnostic: Some(reason),
        }
    }
}

/// Cross-axis behavior of a child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossSizing {
    Stretch,
    Fixed(f64),
    Auto,
}

/// Axis and auto-layout flag of a container.
pub fn container_axis(node: &DesignNode) -> (Axis, bool) {
    match node.layout.mode {
        LayoutMode::Horizontal => (Axis::Row, true),
        LayoutMode::Vertical => (Axis::Column, true),
        LayoutMode::None => (Axis::Column, false),
    }
}

fn main_hint(node: &DesignNode, axis: Axis) -> Option<SizingHint> {
    match axis {
        Axis::Row => node.sizing.horizontal,
        Axis::Column => node.sizing.vertical,
    }
}

fn cross_hint(node: &DesignNode, axis: Axis) -> Option<SizingHint> {
    match axis {
        Axis::Row => node.sizing.vertical,
        Axis::Column => node.sizing.horizontal,
    }
}

fn main_extent(node: &DesignNode, axis: Axis) -> f64 {
    match axis {
        Axis::Row => node.bounds.width,
        Axis::Column => node.bounds.height,
    }
}

/// Whether a container hugs its content along its own main axis.
pub fn hugs_main_axis(node: &DesignNode) -> bool {
    match container_axis(node) {
        (axis, true) => main_hint(node, axis) == Some(SizingHint::Hug),
        (_, false) => false,
    }
}

fn is_fixed_main(node: &DesignNode, axis: Axis) -> bool {
    main_hint(node, axis) == Some(SizingHint::Fixed)
        && main_extent(node, axis) > 0.0
        && node.sizing.grow <= 0.0
}

fn wants_fill(node: &DesignNode, axis: Axis) -> bool {
    main_hint(node, axis) == Some(SizingHint::Fill) || node.sizing.grow > 0.0
}

fn has_layout_signal(node: &DesignNode) -> bool {
    node.sizing.horizontal.is_some() || node.sizing.grow > 0.0
}

fn fixed_with_grow(node: &DesignNode, axis: Axis) -> bool {
    main_hint(node, axis) == Some(SizingHint::Fixed) && node.sizing.grow > 0.0
}

fn ratio(first: f64, second: f64) -> Option<ColumnPair> {
    let total = first + second;
    if first <= 0.0 || second <= 0.0 || total <= 0.0 {
        return None;
    }
    let first_pct = (first / total * 10000.0).round() / 100.0;
    Some(ColumnPair::Ratio {
        first_pct,
        second_pct: ((100.0 - first_pct) * 100.0).round() / 100.0,
    })
}

/// Ratio from auto-layout hints. Both children must fill for a split to
/// exist; the split follows their grow weights.
fn layout_ratio(a: &DesignNode, b: &DesignNode) -> Option<ColumnPair> {
    if !(wants_fill(a, Axis::Row) && wants_fill(b, Axis::Row)) {
        return None;
    }
    let weight = |n: &DesignNode| if n.sizing.grow > 0.0 { n.sizing.grow } else { 1.0 };
    ratio(weight(a), weight(b))
}

fn bounding_box_ratio(a: &DesignNode, b: &DesignNode) -> Option<ColumnPair> {
    ratio(a.bounds.width, b.bounds.width)
}

fn equal_split(config: &ColumnsConfig) -> Option<ColumnPair> {
    config.equal_split_fallback.then_some(ColumnPair::Ratio {
        first_pct: 50.0,
        second_pct: 50.0,
    })
}

/// Two-column analysis for a row's retained children.
///
/// Returns `None` when the container is not a two-column candidate.
pub fn analyze_pair(
    children: &[&DesignNode],
    axis: Axis,
    auto_layout: bool,
    wrap: bool,
    config: &ColumnsConfig,
) -> Option<ColumnPair> {
    if axis != Axis::Row || !auto_layout || wrap {
        return None;
    }
    let [a, b] = children else {
        return None;
    };
    if fixed_with_grow(a, axis) || fixed_with_grow(b, axis) {
        return Some(ColumnPair::Intrinsic);
    }

    let pair = match (is_fixed_main(a, axis), is_fixed_main(b, axis)) {
        (true, true) => ColumnPair::BothFixed,
        (true, false) => ColumnPair::FixedFill { fixed_index: 0 },
        (false, true) => ColumnPair::FixedFill { fixed_index: 1 },
        (false, false) => {
            let hinted = has_layout_signal(a) || has_layout_signal(b);
            let derived = match config.ratio_source {
                RatioSource::Auto if hinted => layout_ratio(a, b),
                RatioSource::Auto => bounding_box_ratio(a, b),
                RatioSource::Layout => layout_ratio(a, b),
                RatioSource::BoundingBox => bounding_box_ratio(a, b),
            };
            // Hints that produce no split (fill + hug) still count as a
            // signal, so equal split is only reached without any.
            let signal = derived.is_some()
                || (hinted && config.ratio_source != RatioSource::BoundingBox);
            match derived {
                Some(pair) => pair,
                None if signal => ColumnPair::Intrinsic,
                None => equal_split(config).unwrap_or(ColumnPair::Intrinsic),
            }
        }
    };
    debug!("sizing: pair {} / {} resolved as {:?}", a.id, b.id, pair);
    Some(pair)
}

/// Main-axis directive for the child at `index` of a container.
pub fn resolve_child(child: &DesignNode, index: usize, ctx: &LayoutContext) -> SizingDecision {
    if !ctx.auto_layout {
        return SizingDecision::plain(SizingDirective::Hug);
    }
    match ctx.pair {
        Some(ColumnPair::FixedFill { fixed_index }) => {
            return SizingDecision::plain(if index == fixed_index {
                SizingDirective::Fixed(child.bounds.width)
            } else {
                SizingDirective::Fill
            });
        }
        Some(ColumnPair::BothFixed) => {
            return SizingDecision::plain(SizingDirective::Fixed(child.bounds.width));
        }
        Some(ColumnPair::Ratio {
            first_pct,
            second_pct,
        }) => {
            let pct = if index == 0 { first_pct } else { second_pct };
            return SizingDecision::plain(SizingDirective::Basis(pct));
        }
        Some(ColumnPair::Intrinsic) | None => {}
    }

    let axis = ctx.axis;
    if fixed_with_grow(child, axis) {
        return SizingDecision::ambiguous(format!(
            "node {} is fixed on the main axis but has layoutGrow {}",
            child.id,
            num(child.sizing.grow)
        ));
    }
    if wants_fill(child, axis) {
        if ctx.hugs_main_axis {
            return SizingDecision::ambiguous(format!(
                "node {} fills the main axis of a parent that hugs its content",
                child.id
            ));
        }
        return SizingDecision::plain(SizingDirective::Fill);
    }
    match main_hint(child, axis) {
        Some(SizingHint::Fixed) if main_extent(child, axis) > 0.0 => {
            SizingDecision::plain(match axis {
                Axis::Row => SizingDirective::Fixed(child.bounds.width),
                Axis::Column => SizingDirective::FlexibleHeight,
            })
        }
        _ => SizingDecision::plain(SizingDirective::Hug),
    }
}

/// Cross-axis behavior of a child inside an auto-layout parent.
///
/// Only column parents assert a cross-axis width; a row child's height is
/// left to its content and to the style collector.
pub fn resolve_cross(child: &DesignNode, ctx: &LayoutContext) -> CrossSizing {
    if !ctx.auto_layout {
        return CrossSizing::Auto;
    }
    match (ctx.axis, cross_hint(child, ctx.axis)) {
        (_, Some(SizingHint::Fill)) => CrossSizing::Stretch,
        (Axis::Column, Some(SizingHint::Fixed)) if child.bounds.width > 0.0 => {
            CrossSizing::Fixed(child.bounds.width)
        }
        _ => CrossSizing::Auto,
    }
}
