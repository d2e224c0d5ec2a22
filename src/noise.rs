//! Noise filter.
//!
//! Runs before any layout resolution. Hidden nodes and thin absolutely
//! positioned shapes (underlines, dividers, hairline decorations) are cut out
//! of the tree here, so they can never influence sibling counts, gaps or
//! column ratios downstream.
//!
//! The result is a [`Retained`] tree that borrows from the input; the input
//! itself is never modified.

use crate::config::NoiseConfig;
use crate::node::{DesignNode, NodeKind, Positioning};
use log::debug;
use serde::Serialize;

/// A node that survived filtering, with its surviving children.
#[derive(Debug, Clone)]
pub struct Retained<'a> {
    pub node: &'a DesignNode,
    pub children: Vec<Retained<'a>>,
}

impl Retained<'_> {
    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Retained::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoiseStats {
    pub invisible_removed: usize,
    pub decorative_removed: usize,
}

/// Why a node was cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Invisible,
    Decorative,
}

/// Whether a node is positioned outside its parent's flow.
///
/// Explicit absolute positioning counts, as does a plain shape inside a
/// parent without auto-layout, where the tool places everything by
/// coordinates.
pub fn is_absolute(node: &DesignNode, parent_auto_layout: bool) -> bool {
    node.positioning == Positioning::Absolute
        || (!parent_auto_layout && matches!(node.kind, NodeKind::Rectangle | NodeKind::Line))
}

/// Decide whether `node` is excluded from layout.
pub fn classify(
    node: &DesignNode,
    parent_auto_layout: bool,
    config: &NoiseConfig,
) -> Option<Exclusion> {
    if !node.visible {
        return Some(Exclusion::Invisible);
    }
    if is_absolute(node, parent_auto_layout)
        && node.minor_extent() <= config.decorative_threshold_px
    {
        return Some(Exclusion::Decorative);
    }
    None
}

/// Filter `root` and its subtree. The root itself is always retained.
pub fn filter<'a>(root: &'a DesignNode, config: &NoiseConfig) -> (Retained<'a>, NoiseStats) {
    let mut stats = NoiseStats::default();
    let retained = filter_children(root, config, &mut stats);
    (retained, stats)
}

fn filter_children<'a>(
    node: &'a DesignNode,
    config: &NoiseConfig,
    stats: &mut NoiseStats,
) -> Retained<'a> {
    let auto_layout = node.is_auto_layout();
    let mut children = Vec::with_capacity(node.children.len());
    for child in &node.children {
        match classify(child, auto_layout, config) {
            Some(Exclusion::Invisible) => {
                debug!("noise: dropping hidden node {} ({})", child.id, child.name);
                stats.invisible_removed += 1;
            }
            Some(Exclusion::Decorative) => {
                debug!(
                    "noise: dropping decorative node {} ({}), minor extent {}px",
                    child.id,
                    child.name,
                    child.minor_extent()
                );
                stats.decorative_removed += 1;
            }
            None => children.push(filter_children(child, config, stats)),
        }
    }
    Retained { node, children }
}
