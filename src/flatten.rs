//! Wrapper flattening.
//!
//! Removes containers that exist only to hold one child: no visual role, no
//! spacing role, not the root, not a section, and not split around an image
//! background. The child takes the wrapper's place and inherits the
//! declarations the wrapper had because of its own parent, so the surrounding
//! flex layout is unchanged. Runs bottom-up, so chains of wrappers collapse in
//! one pass.
//!
//! A promoted heading or paragraph that lands in a flex parent keeps its
//! margin reset when there is no shared reset rule to cover it.

use crate::config::CssConfig;
use crate::resolve::{COL_FIRST, COL_SECOND, Element, ResolvedNode};
use crate::style;
use log::debug;

fn is_removable(node: &ResolvedNode) -> bool {
    node.element == Element::Div
        && node.children.len() == 1
        && !node.is_section
        && !node.visual_role
        && !node.spacing_role
        && node.content.is_none()
}

/// Replace `wrapper` with its only child. Returns false if it wasn't one.
fn promote(wrapper: &mut ResolvedNode, css: &CssConfig) -> bool {
    if !is_removable(wrapper) {
        return false;
    }
    let Some(mut child) = wrapper.children.pop() else {
        return false;
    };
    debug!("flatten: {} replaces wrapper {}", child.id, wrapper.id);
    child.item = std::mem::take(&mut wrapper.item);
    child.flex_item = wrapper.flex_item;
    if matches!(child.element, Element::Text(_)) && child.flex_item && !css.utilities {
        child
            .item
            .set("margin", "0", style::required_scope("margin", true));
    }
    child
        .utilities
        .retain(|u| *u != COL_FIRST && *u != COL_SECOND);
    child.utilities.extend(
        wrapper
            .utilities
            .iter()
            .filter(|u| **u == COL_FIRST || **u == COL_SECOND),
    );
    *wrapper = child;
    true
}

fn flatten_children(node: &mut ResolvedNode, css: &CssConfig, removed: &mut usize) {
    for child in &mut node.children {
        flatten_children(child, css, removed);
        while promote(child, css) {
            *removed += 1;
        }
    }
}

/// Flatten every eligible wrapper below `root`; returns how many were removed.
pub fn flatten(root: &mut ResolvedNode, css: &CssConfig) -> usize {
    let mut removed = 0;
    flatten_children(root, css, &mut removed);
    removed
}
