//! Class naming: identity classes, semantic roles and aliases.
//!
//! Every emitted element gets exactly one identity class derived from its
//! source id. Identity classes are collision-free within a build:
//!
//! - `7291:125581` → `n-7291-125581`
//! - `I12:3;45:6` → `n-I12-3-45-6`
//! - a second node that sanitizes to the same string → `n-…-2`
//!
//! Aliases are optional, human-readable classes derived from the design
//! layer name or from a semantic role:
//!
//! - `"Hero Section"` → `hero-section`
//! - `"Pricing Card"` inside section `pricing` → `pricing__pricing-card`
//! - `"Frame 12"` (tool default) → no name alias; `card` if it looks like one
//!
//! An alias shared by several nodes is a collision. With `unique_only` on,
//! only aliases held by a single node are ever used as CSS selectors; shared
//! ones stay in markup for readability and are reported.
//!
//! Text inside a card also gets a card-part hook (`card__title`,
//! `card__body`, `card__meta`) so repeated cards can be styled together by
//! hand. Card parts are markup hooks only and never selectors.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::config::{AliasMode, AliasScope, AliasSource, ClassesConfig};
use crate::node::{DesignNode, Effect, NodeKind, Paint, TextTag};
use crate::resolve::{self, ResolvedNode};
use crate::session::{BuildSession, DiagnosticKind};

/// Prefix of every identity class.
pub const IDENTITY_PREFIX: &str = "n-";

const MAX_ALIAS_LEN: usize = 48;

/// Layer names that carry no meaning of their own.
const GENERIC_NAMES: &[&str] = &[
    "frame",
    "group",
    "rectangle",
    "ellipse",
    "vector",
    "line",
    "text",
    "image",
    "instance",
    "component",
    "auto layout",
    "container",
    "layer",
    "union",
    "subtract",
    "polygon",
    "star",
];

const SECTION_KEYWORDS: &[&str] = &[
    "section", "hero", "feature", "pricing", "contact", "about", "service", "gallery",
    "content", "main",
];

/// Semantic role inferred from a node's name or structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Button,
    Card,
    Title,
    Text,
    Image,
    Icon,
    Nav,
    Header,
    Footer,
    Section,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Button => "button",
            Role::Card => "card",
            Role::Title => "title",
            Role::Text => "text",
            Role::Image => "image",
            Role::Icon => "icon",
            Role::Nav => "nav",
            Role::Header => "header",
            Role::Footer => "footer",
            Role::Section => "section",
        }
    }
}

/// What a text element is for, from its tag and typography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Heading,
    Body,
    Note,
}

impl TextRole {
    /// Hook class for this role inside a card.
    pub fn card_class(self) -> &'static str {
        match self {
            TextRole::Heading => "card__title",
            TextRole::Body => "card__body",
            TextRole::Note => "card__meta",
        }
    }
}

/// Headings by tag, then by size or weight; small light text is a note.
pub fn text_role(node: &DesignNode) -> Option<TextRole> {
    if node.kind != NodeKind::Text {
        return None;
    }
    if node.text_tag() != TextTag::P {
        return Some(TextRole::Heading);
    }
    let (size, weight) = node
        .text_style
        .as_ref()
        .map_or((0.0, 0.0), |s| (s.font_size, s.font_weight));
    Some(if size >= 20.0 || weight >= 600.0 {
        TextRole::Heading
    } else if size > 0.0 && size <= 12.0 && weight <= 500.0 {
        TextRole::Note
    } else {
        TextRole::Body
    })
}

/// Classes assigned to one resolved node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassAssignment {
    pub identity: String,
    pub alias: Option<String>,
    /// The alias is used as a CSS selector.
    pub alias_selector: bool,
    /// The identity class appears in markup and in the stylesheet.
    pub emit_identity: bool,
    /// Card-part hook for text inside a card.
    pub card_part: Option<&'static str>,
}

/// Alias → ids of the nodes that carry it, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasRegistry {
    entries: BTreeMap<String, Vec<String>>,
}

impl AliasRegistry {
    pub fn register(&mut self, alias: &str, node_id: &str) {
        self.entries
            .entry(alias.to_string())
            .or_default()
            .push(node_id.to_string());
    }

    pub fn holders(&self, alias: &str) -> &[String] {
        self.entries.get(alias).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_unique(&self, alias: &str) -> bool {
        self.holders(alias).len() == 1
    }

    /// Aliases held by more than one node.
    pub fn collisions(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(alias, ids)| (alias.as_str(), ids.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(alias, ids)| (alias.as_str(), ids.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Sanitizing
// ============================================================================

/// Identity class for a source id, before collision suffixes.
pub fn identity_class(node_id: &str) -> String {
    let body: String = node_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{IDENTITY_PREFIX}{body}")
}

/// Lowercase, dash-separated class token for a layer name.
///
/// Returns `None` when nothing usable remains.
pub fn slugify(name: &str) -> Option<String> {
    let mut slug = String::with_capacity(name.len());
    let mut dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            dash = false;
        } else {
            dash = true;
        }
    }
    if slug.is_empty() {
        return None;
    }
    slug.truncate(MAX_ALIAS_LEN);
    let slug = slug.trim_end_matches('-').to_string();
    let reserved = slug.starts_with(IDENTITY_PREFIX)
        || slug.starts_with(resolve::LAYOUT_2COL)
        || [
            resolve::FX_ROW,
            resolve::FX_COL,
            resolve::FW_WRAP,
            resolve::BG_FULLBLEED,
        ]
        .contains(&slug.as_str());
    if slug.starts_with(|c: char| c.is_ascii_digit()) || reserved {
        Some(format!("a-{slug}"))
    } else {
        Some(slug)
    }
}

/// Tool-default names such as `Frame 12`, `Rectangle`, `Group 3 copy`.
pub fn is_generic_name(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    let stem = lower
        .trim_end_matches(" copy")
        .trim_end_matches(|c: char| !c.is_alphabetic());
    stem.is_empty() || GENERIC_NAMES.contains(&stem)
}

// ============================================================================
// Semantic roles
// ============================================================================

fn has_background(node: &DesignNode) -> bool {
    node.fills
        .iter()
        .any(|p| matches!(p, Paint::Solid(_) | Paint::Gradient { .. }))
}

fn has_shadow(node: &DesignNode) -> bool {
    node.effects
        .iter()
        .any(|e| matches!(e, Effect::DropShadow { .. }))
}

/// Surface with a background and a radius or shadow, or a clipped rounded box.
fn looks_like_card(node: &DesignNode) -> bool {
    let radius = node.corner_radius.is_some();
    (node.clips_content && radius) || (has_background(node) && (radius || has_shadow(node)))
}

/// Small filled or outlined container around a single line of text.
fn looks_like_button(node: &DesignNode, children: &[&DesignNode]) -> bool {
    let [only] = children else {
        return false;
    };
    only.kind == NodeKind::Text
        && node.bounds.height > 0.0
        && node.bounds.height <= 64.0
        && node.bounds.width <= 400.0
        && (has_background(node) || node.stroke.is_some())
}

fn role_from_name(name: &str) -> Option<Role> {
    let lower = name.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    let has = |words: &[&str]| {
        tokens
            .iter()
            .any(|t| words.iter().any(|w| t.starts_with(w)))
    };
    if has(&["button", "btn", "cta"]) {
        Some(Role::Button)
    } else if has(&["card"]) {
        Some(Role::Card)
    } else if has(&["nav", "menu"]) {
        Some(Role::Nav)
    } else if has(&["header"]) {
        Some(Role::Header)
    } else if has(&["footer"]) {
        Some(Role::Footer)
    } else if has(&["icon"]) {
        Some(Role::Icon)
    } else if has(SECTION_KEYWORDS) {
        Some(Role::Section)
    } else {
        None
    }
}

/// Semantic role of a node given its retained children.
pub fn classify(node: &DesignNode, children: &[&DesignNode]) -> Option<Role> {
    if let Some(role) = role_from_name(&node.name) {
        return Some(role);
    }
    match node.kind {
        NodeKind::Text => Some(match node.text_tag() {
            TextTag::P => Role::Text,
            _ => Role::Title,
        }),
        NodeKind::Image => Some(Role::Image),
        _ if node.is_vector_shape() && node.bounds.width.max(node.bounds.height) <= 48.0 => {
            Some(Role::Icon)
        }
        NodeKind::Frame | NodeKind::Group if looks_like_button(node, children) => {
            Some(Role::Button)
        }
        NodeKind::Frame | NodeKind::Group if looks_like_card(node) => Some(Role::Card),
        _ => None,
    }
}

/// Name-derived alias; text layers named after their own content don't count.
fn name_alias(node: &ResolvedNode) -> Option<String> {
    if is_generic_name(&node.name) {
        return None;
    }
    if node.kind == NodeKind::Text && node.text.as_deref() == Some(node.name.as_str()) {
        return None;
    }
    slugify(&node.name)
}

fn base_alias(node: &ResolvedNode, source: AliasSource) -> Option<String> {
    let semantic = || node.role.map(|r| r.as_str().to_string());
    match source {
        AliasSource::Name => name_alias(node),
        AliasSource::Semantic => semantic(),
        AliasSource::Both => name_alias(node).or_else(semantic),
    }
}

// ============================================================================
// Assignment
// ============================================================================

struct Namer<'c> {
    config: &'c ClassesConfig,
    used: HashSet<String>,
}

impl Namer<'_> {
    fn unique_identity(&mut self, node_id: &str) -> String {
        let base = identity_class(node_id);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }

    fn assign(
        &mut self,
        node: &mut ResolvedNode,
        section_alias: Option<&str>,
        in_card: bool,
        registry: &mut AliasRegistry,
    ) {
        node.classes.identity = self.unique_identity(&node.id);
        node.classes.emit_identity = true;

        let alias = if self.config.alias_mode == AliasMode::Off
            || (self.config.alias_scope == AliasScope::Sections && !node.is_section)
        {
            None
        } else {
            base_alias(node, self.config.alias_source).map(|alias| match section_alias {
                Some(section) if !node.is_section => format!("{section}__{alias}"),
                _ => alias,
            })
        };
        if let Some(alias) = &alias {
            registry.register(alias, &node.id);
        }
        node.classes.alias = alias;
        if in_card && self.config.card_roles && self.config.alias_mode != AliasMode::Off {
            node.classes.card_part = node.text_role.map(TextRole::card_class);
        }

        let scope = if node.is_section {
            node.classes.alias.clone()
        } else {
            section_alias.map(str::to_string)
        };
        let in_card = in_card || node.role == Some(Role::Card);
        for child in &mut node.children {
            self.assign(child, scope.as_deref(), in_card, registry);
        }
    }
}

fn finalize(node: &mut ResolvedNode, config: &ClassesConfig, registry: &AliasRegistry) {
    if let Some(alias) = &node.classes.alias {
        let unique = registry.is_unique(alias);
        node.classes.alias_selector = unique || !config.unique_only;
        node.classes.emit_identity = !(unique && config.drop_identity_when_unique);
    }
    for child in &mut node.children {
        finalize(child, config, registry);
    }
}

/// Assign identity and alias classes over the whole tree.
///
/// Alias uniqueness is decided from final counts, so the result does not
/// depend on which duplicate was visited first.
pub fn assign_classes(root: &mut ResolvedNode, session: &mut BuildSession) {
    let build_config = session.config;
    let config = &build_config.classes;
    let mut namer = Namer {
        config,
        used: HashSet::new(),
    };
    let mut registry = AliasRegistry::default();
    namer.assign(root, None, false, &mut registry);
    finalize(root, config, &registry);

    let collisions: Vec<(String, Vec<String>)> = registry
        .collisions()
        .map(|(alias, ids)| (alias.to_string(), ids.to_vec()))
        .collect();
    for (alias, ids) in collisions {
        let message = format!("alias '{alias}' is shared by {} nodes", ids.len());
        session.diagnose(DiagnosticKind::AliasCollision, &ids[0], message);
    }
    session.aliases = registry;
}
