//! Spacing normalizer.
//!
//! Gap is the only source of spacing between siblings in an auto-layout
//! container. Heading and paragraph default margins are reset by a shared
//! rule (see [`crate::css`]); a text node's own paragraph spacing becomes a
//! bottom margin on that node alone.
//!
//! Horizontal padding can additionally be normalized on page-width wrapper
//! frames:
//!
//! | Mode | Effect |
//! |------|--------|
//! | `none` | authored padding passes through |
//! | `trim` | large symmetric left/right padding becomes zero |
//! | `clamp` | each side becomes `clamp(min, <vw>, <original>)` |

use crate::config::{PaddingConfig, PaddingMode, PaddingScope};
use crate::node::DesignNode;
use crate::types::{InlinePadding, ResolvedPadding, num};
use log::debug;

/// Gap between children; negative spacing clamps to zero.
pub fn normalize_gap(item_spacing: f64) -> f64 {
    item_spacing.max(0.0)
}

fn is_symmetric(left: f64, right: f64, tolerance: f64) -> bool {
    (left - right).abs() <= tolerance
}

/// A page-width frame whose horizontal padding is really page gutter.
pub fn is_wrapper(
    node: &DesignNode,
    root_width: f64,
    is_root_child: bool,
    config: &PaddingConfig,
) -> bool {
    if root_width <= 0.0 {
        return false;
    }
    let wide = node.bounds.width >= config.wrapper_width_ratio * root_width;
    let padding = &node.layout.padding;
    wide && (is_root_child
        || is_symmetric(padding.left, padding.right, config.symmetry_tolerance_px))
}

/// Resolve a container's padding under the configured normalization.
pub fn normalize_padding(
    node: &DesignNode,
    root_width: f64,
    is_root_child: bool,
    config: &PaddingConfig,
) -> ResolvedPadding {
    let mut resolved = ResolvedPadding::from_raw(&node.layout.padding);
    if config.mode == PaddingMode::None {
        return resolved;
    }
    if config.scope == PaddingScope::Wrappers
        && !is_wrapper(node, root_width, is_root_child, config)
    {
        return resolved;
    }

    let left = node.layout.padding.left.max(0.0);
    let right = node.layout.padding.right.max(0.0);
    match config.mode {
        PaddingMode::None => {}
        PaddingMode::Trim => {
            if left > config.threshold_px
                && right > config.threshold_px
                && is_symmetric(left, right, config.symmetry_tolerance_px)
            {
                debug!(
                    "spacing: trimming {}/{}px side padding on {}",
                    num(left),
                    num(right),
                    node.id
                );
                resolved.left = InlinePadding::Px(0.0);
                resolved.right = InlinePadding::Px(0.0);
            }
        }
        PaddingMode::Clamp => {
            if root_width > 0.0 {
                resolved.left = fluid(left, root_width, config.clamp_min_px);
                resolved.right = fluid(right, root_width, config.clamp_min_px);
            }
        }
    }
    resolved
}

fn fluid(original: f64, root_width: f64, min: f64) -> InlinePadding {
    if original <= min {
        return InlinePadding::Px(original);
    }
    InlinePadding::Fluid {
        min,
        vw: ((original / root_width * 100.0) * 100.0).round() / 100.0,
        max: original,
    }
}

/// Bottom margin carrying a text node's own paragraph spacing.
pub fn paragraph_margin(node: &DesignNode) -> Option<f64> {
    node.text_style
        .as_ref()
        .map(|s| s.paragraph_spacing)
        .filter(|s| *s > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::Padding;

    fn padded(width: f64, left: f64, right: f64) -> DesignNode {
        let mut node = column("1:2", width, vec![]);
        node.layout.padding = Padding {
            top: 10.0,
            right,
            bottom: 10.0,
            left,
        };
        node
    }

    fn config(mode: PaddingMode) -> PaddingConfig {
        PaddingConfig {
            mode,
            ..PaddingConfig::default()
        }
    }

    #[test]
    fn negative_gap_clamps_to_zero() {
        assert_eq!(normalize_gap(-8.0), 0.0);
        assert_eq!(normalize_gap(24.0), 24.0);
    }

    #[test]
    fn none_mode_passes_through() {
        let node = padded(1200.0, 80.0, 80.0);
        let padding = normalize_padding(&node, 1200.0, true, &config(PaddingMode::None));
        assert_eq!(padding.left, InlinePadding::Px(80.0));
        assert_eq!(padding.right, InlinePadding::Px(80.0));
    }

    #[test]
    fn trim_zeroes_large_symmetric_padding() {
        let node = padded(1200.0, 80.0, 81.0);
        let padding = normalize_padding(&node, 1200.0, false, &config(PaddingMode::Trim));
        assert_eq!(padding.left, InlinePadding::Px(0.0));
        assert_eq!(padding.right, InlinePadding::Px(0.0));
        assert_eq!(padding.top, 10.0);
    }

    #[test]
    fn trim_keeps_padding_below_threshold() {
        let node = padded(1200.0, 24.0, 24.0);
        let padding = normalize_padding(&node, 1200.0, true, &config(PaddingMode::Trim));
        assert_eq!(padding.left, InlinePadding::Px(24.0));
    }

    #[test]
    fn trim_keeps_asymmetric_padding() {
        let node = padded(1200.0, 80.0, 120.0);
        let padding = normalize_padding(&node, 1200.0, true, &config(PaddingMode::Trim));
        assert_eq!(padding.right, InlinePadding::Px(120.0));
    }

    #[test]
    fn clamp_interpolates_viewport_width() {
        let node = padded(1200.0, 120.0, 8.0);
        let padding = normalize_padding(&node, 1200.0, true, &config(PaddingMode::Clamp));
        assert_eq!(
            padding.left,
            InlinePadding::Fluid {
                min: 16.0,
                vw: 10.0,
                max: 120.0
            }
        );
        assert_eq!(padding.right, InlinePadding::Px(8.0));
    }

    #[test]
    fn narrow_frames_are_not_wrappers() {
        let node = padded(600.0, 80.0, 80.0);
        let cfg = config(PaddingMode::Trim);
        assert!(!is_wrapper(&node, 1200.0, true, &cfg));
        let padding = normalize_padding(&node, 1200.0, true, &cfg);
        assert_eq!(padding.left, InlinePadding::Px(80.0));
    }

    #[test]
    fn asymmetric_root_child_is_still_wrapper() {
        let node = padded(1200.0, 40.0, 200.0);
        let cfg = PaddingConfig::default();
        assert!(is_wrapper(&node, 1200.0, true, &cfg));
        assert!(!is_wrapper(&node, 1200.0, false, &cfg));
    }

    #[test]
    fn scope_all_ignores_wrapper_test() {
        let node = padded(300.0, 60.0, 60.0);
        let cfg = PaddingConfig {
            mode: PaddingMode::Trim,
            scope: PaddingScope::All,
            ..PaddingConfig::default()
        };
        let padding = normalize_padding(&node, 1200.0, false, &cfg);
        assert!(padding.left.is_zero());
    }

    #[test]
    fn paragraph_spacing_becomes_margin() {
        let mut node = text("1:3", "copy");
        assert_eq!(paragraph_margin(&node), None);
        if let Some(style) = node.text_style.as_mut() {
            style.paragraph_spacing = 12.0;
        }
        assert_eq!(paragraph_margin(&node), Some(12.0));
    }
}
