//! Shared types passed between resolution stages.
//!
//! A [`LayoutContext`] is derived once per container, top-down, and handed to
//! every child resolution by reference. A [`ResolvedStyle`] is the ordered
//! declaration map each node ends up with; the collector and compositor build
//! it additively and everything after them only reads it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied mapping from node id to a local image path.
pub type ImageMap = BTreeMap<String, String>;

/// How much of a node's visual styling is allowed onto its class.
///
/// Levels are ordered: a declaration tagged `Standard` is permitted under
/// `Standard` and `Aggressive` but not under `Conservative`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FidelityScope {
    Conservative,
    #[default]
    Standard,
    Aggressive,
}

impl FidelityScope {
    /// Whether a declaration requiring `required` may be emitted under `self`.
    pub fn permits(self, required: FidelityScope) -> bool {
        required <= self
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Standard => "standard",
            Self::Aggressive => "aggressive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

/// Raw padding as authored, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// One horizontal padding side after normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InlinePadding {
    Px(f64),
    /// `clamp(min, vw, max)`
    Fluid { min: f64, vw: f64, max: f64 },
}

impl InlinePadding {
    pub fn to_css(&self) -> String {
        match self {
            Self::Px(v) => px(*v),
            Self::Fluid { min, vw, max } => {
                format!("clamp({}, {}vw, {})", px(*min), num(*vw), px(*max))
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Px(v) if *v <= 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPadding {
    pub top: f64,
    pub right: InlinePadding,
    pub bottom: f64,
    pub left: InlinePadding,
}

impl ResolvedPadding {
    pub fn zero() -> Self {
        Self {
            top: 0.0,
            right: InlinePadding::Px(0.0),
            bottom: 0.0,
            left: InlinePadding::Px(0.0),
        }
    }

    pub fn from_raw(padding: &Padding) -> Self {
        Self {
            top: padding.top.max(0.0),
            right: InlinePadding::Px(padding.right.max(0.0)),
            bottom: padding.bottom.max(0.0),
            left: InlinePadding::Px(padding.left.max(0.0)),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top <= 0.0 && self.bottom <= 0.0 && self.left.is_zero() && self.right.is_zero()
    }

    /// Shorthand `padding` value, or `None` when every side is zero.
    pub fn to_css(&self) -> Option<String> {
        if self.is_zero() {
            return None;
        }
        Some(format!(
            "{} {} {} {}",
            px(self.top),
            self.right.to_css(),
            px(self.bottom),
            self.left.to_css()
        ))
    }
}

/// Outcome of the two-column analysis for a horizontal pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnPair {
    /// One child is fixed; the other fills the remaining space.
    FixedFill { fixed_index: usize },
    /// Both children are fixed and keep their widths.
    BothFixed,
    /// Percentage bases derived from hints, bounding boxes or an equal split.
    Ratio { first_pct: f64, second_pct: f64 },
    /// No split applies; each child follows its own hints.
    Intrinsic,
}

/// Layout facts about one container, shared read-only with its children.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutContext {
    pub axis: Axis,
    pub auto_layout: bool,
    /// Post-normalization gap, never negative.
    pub gap: f64,
    pub padding: ResolvedPadding,
    /// Retained children only.
    pub child_count: usize,
    pub wrap: bool,
    /// Container hugs its content along its main axis.
    pub hugs_main_axis: bool,
    pub pair: Option<ColumnPair>,
    /// Width of the root frame, for wrapper detection and fluid padding.
    pub root_width: f64,
}

/// How a child occupies its parent's main axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingDirective {
    Fixed(f64),
    Fill,
    Hug,
    /// Percentage flex-basis from the two-column analysis.
    Basis(f64),
    FlexibleHeight,
}

impl SizingDirective {
    /// The `flex` shorthand this directive emits.
    pub fn flex_value(&self) -> String {
        match self {
            Self::Fixed(w) => format!("0 0 {}", px(*w)),
            Self::Fill => "1 1 auto".to_string(),
            Self::Hug => "0 1 auto".to_string(),
            Self::Basis(pct) => format!("0 1 {}%", num(*pct)),
            Self::FlexibleHeight => "0 0 auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    /// Lowest fidelity scope that permits this declaration.
    pub scope: FidelityScope,
}

/// Ordered property map. Setting an existing property replaces its value
/// in place, so first-insertion order is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedStyle {
    declarations: Vec<Declaration>,
}

impl ResolvedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: &str, value: impl Into<String>, scope: FidelityScope) {
        let value = value.into();
        match self.declarations.iter_mut().find(|d| d.property == property) {
            Some(existing) => {
                existing.value = value;
                existing.scope = scope;
            }
            None => self.declarations.push(Declaration {
                property: property.to_string(),
                value,
                scope,
            }),
        }
    }

    /// Set only if the property is not already present.
    pub fn set_default(&mut self, property: &str, value: impl Into<String>, scope: FidelityScope) {
        if !self.contains(property) {
            self.set(property, value, scope);
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    pub fn contains(&self, property: &str) -> bool {
        self.declarations.iter().any(|d| d.property == property)
    }

    pub fn remove(&mut self, property: &str) -> Option<Declaration> {
        let index = self
            .declarations
            .iter()
            .position(|d| d.property == property)?;
        Some(self.declarations.remove(index))
    }

    /// Copy every declaration of `other` over this map.
    pub fn merge(&mut self, other: &ResolvedStyle) {
        for decl in &other.declarations {
            self.set(&decl.property, decl.value.clone(), decl.scope);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Format a number for CSS: at most two decimals, no trailing zeros.
pub fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        return format!("{}", rounded as i64);
    }
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').to_string()
}

/// Format a pixel length; zero is written unitless.
pub fn px(value: f64) -> String {
    match num(value).as_str() {
        "0" => "0".to_string(),
        n => format!("{n}px"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_ordering() {
        assert!(FidelityScope::Standard.permits(FidelityScope::Conservative));
        assert!(FidelityScope::Standard.permits(FidelityScope::Standard));
        assert!(!FidelityScope::Standard.permits(FidelityScope::Aggressive));
        assert!(!FidelityScope::Conservative.permits(FidelityScope::Standard));
        assert!(FidelityScope::Aggressive.permits(FidelityScope::Aggressive));
    }

    #[test]
    fn resolved_style_keeps_insertion_order_on_replace() {
        let mut style = ResolvedStyle::new();
        style.set("display", "flex", FidelityScope::Conservative);
        style.set("gap", "8px", FidelityScope::Conservative);
        style.set("display", "block", FidelityScope::Conservative);

        let props: Vec<_> = style.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(props, vec!["display", "gap"]);
        assert_eq!(style.get("display"), Some("block"));
    }

    #[test]
    fn set_default_does_not_override() {
        let mut style = ResolvedStyle::new();
        style.set("width", "10px", FidelityScope::Standard);
        style.set_default("width", "20px", FidelityScope::Standard);
        assert_eq!(style.get("width"), Some("10px"));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(num(24.0), "24");
        assert_eq!(num(33.333333), "33.33");
        assert_eq!(num(1.5), "1.5");
        assert_eq!(num(-0.0), "0");
        assert_eq!(px(0.0), "0");
        assert_eq!(px(320.0), "320px");
    }

    #[test]
    fn flex_values() {
        assert_eq!(SizingDirective::Fixed(320.0).flex_value(), "0 0 320px");
        assert_eq!(SizingDirective::Fill.flex_value(), "1 1 auto");
        assert_eq!(SizingDirective::Hug.flex_value(), "0 1 auto");
        assert_eq!(SizingDirective::Basis(62.5).flex_value(), "0 1 62.5%");
        assert_eq!(SizingDirective::FlexibleHeight.flex_value(), "0 0 auto");
    }

    #[test]
    fn padding_shorthand() {
        let padding = ResolvedPadding {
            top: 10.0,
            right: InlinePadding::Fluid {
                min: 16.0,
                vw: 6.67,
                max: 80.0,
            },
            bottom: 0.0,
            left: InlinePadding::Px(80.0),
        };
        assert_eq!(
            padding.to_css().as_deref(),
            Some("10px clamp(16px, 6.67vw, 80px) 0 80px")
        );
        assert_eq!(ResolvedPadding::zero().to_css(), None);
    }
}
