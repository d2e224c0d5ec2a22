//! Shared test utilities for the figflow test suite.
//!
//! Builders for design nodes, so unit tests can describe a tree in a few
//! lines instead of JSON, plus lookups over resolved trees that panic with a
//! clear message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let root = row("1:1", 1200.0, vec![
//!     fixed_w(rect("1:2", 320.0, 200.0)),
//!     fill_w(column("1:3", 856.0, vec![text("1:4", "Hello")])),
//! ]);
//! ```

use std::path::Path;

use crate::node::{
    BoundingBox, Color, CornerRadius, DesignNode, LayoutMode, NodeKind, Paint, SizingHint,
    TextStyle,
};
use crate::resolve::ResolvedNode;

// =========================================================================
// Node builders
// =========================================================================

/// A frame without auto-layout.
pub fn frame(id: &str, width: f64, height: f64) -> DesignNode {
    let mut node = DesignNode::new(id, NodeKind::Frame);
    node.name = format!("Frame {id}");
    node.bounds = BoundingBox {
        x: 0.0,
        y: 0.0,
        width,
        height,
    };
    node
}

/// A horizontal auto-layout frame.
pub fn row(id: &str, width: f64, children: Vec<DesignNode>) -> DesignNode {
    let mut node = frame(id, width, 400.0);
    node.layout.mode = LayoutMode::Horizontal;
    node.children = children;
    node
}

/// A vertical auto-layout frame.
pub fn column(id: &str, width: f64, children: Vec<DesignNode>) -> DesignNode {
    let mut node = frame(id, width, 400.0);
    node.layout.mode = LayoutMode::Vertical;
    node.children = children;
    node
}

pub fn rect(id: &str, width: f64, height: f64) -> DesignNode {
    let mut node = frame(id, width, height);
    node.kind = NodeKind::Rectangle;
    node.source_type = "RECTANGLE".to_string();
    node.name = format!("Rectangle {id}");
    node
}

pub fn image(id: &str, width: f64, height: f64) -> DesignNode {
    let mut node = rect(id, width, height);
    node.kind = NodeKind::Image;
    node.name = format!("Image {id}");
    node.fills = vec![Paint::Image {
        image_ref: Some(format!("ref-{id}")),
    }];
    node
}

/// A paragraph-sized text node in black 16px type.
pub fn text(id: &str, characters: &str) -> DesignNode {
    let mut node = frame(id, 200.0, 24.0);
    node.kind = NodeKind::Text;
    node.source_type = "TEXT".to_string();
    node.name = characters.to_string();
    node.characters = Some(characters.to_string());
    node.text_style = Some(TextStyle {
        color: Some(Color::rgb(0.0, 0.0, 0.0)),
        ..TextStyle::default()
    });
    node
}

pub fn named(mut node: DesignNode, name: &str) -> DesignNode {
    node.name = name.to_string();
    node
}

pub fn fixed_w(mut node: DesignNode) -> DesignNode {
    node.sizing.horizontal = Some(SizingHint::Fixed);
    node
}

pub fn fill_w(mut node: DesignNode) -> DesignNode {
    node.sizing.horizontal = Some(SizingHint::Fill);
    node
}

pub fn with_fill(mut node: DesignNode, r: f64, g: f64, b: f64) -> DesignNode {
    node.fills.push(Paint::Solid(Color::rgb(r, g, b)));
    node
}

pub fn with_radius(mut node: DesignNode, radius: f64) -> DesignNode {
    node.corner_radius = Some(CornerRadius::Uniform(radius));
    node
}

pub fn with_gap(mut node: DesignNode, gap: f64) -> DesignNode {
    node.layout.item_spacing = gap;
    node
}

// =========================================================================
// Fixtures
// =========================================================================

/// Read a JSON fixture from `fixtures/`.
pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("fixture '{}' unreadable: {e}", path.display()))
}

// =========================================================================
// Resolved tree lookups
// =========================================================================

/// Find a resolved node by source id. Panics if not found.
pub fn find_resolved<'a>(root: &'a ResolvedNode, id: &str) -> &'a ResolvedNode {
    fn walk<'a>(node: &'a ResolvedNode, id: &str) -> Option<&'a ResolvedNode> {
        if node.id == id {
            return Some(node);
        }
        node.children.iter().find_map(|c| walk(c, id))
    }
    walk(root, id).unwrap_or_else(|| {
        let mut ids = Vec::new();
        collect_ids(root, &mut ids);
        panic!("resolved node '{id}' not found. Available: {ids:?}")
    })
}

fn collect_ids(node: &ResolvedNode, out: &mut Vec<String>) {
    out.push(node.id.clone());
    for child in &node.children {
        collect_ids(child, out);
    }
}

/// All resolved ids in document order.
pub fn resolved_ids(root: &ResolvedNode) -> Vec<String> {
    let mut ids = Vec::new();
    collect_ids(root, &mut ids);
    ids
}
