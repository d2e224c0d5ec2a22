//! Build reports.
//!
//! Three JSON documents accompany every build:
//!
//! | Report | Answers |
//! |--------|---------|
//! | [`StyleReport`] | What the active scope withheld, which containers lost their width, what each rule carries |
//! | [`AliasReport`] | Which aliases were assigned, which collided, which became selectors |
//! | [`WasteReport`] | What was dropped: wrappers, noise nodes, empty classes, pruned rules |
//!
//! Every map is a `BTreeMap` so the serialized output is stable across runs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::BuildConfig;
use crate::css::EmitStats;
use crate::prune::PruneOutcome;
use crate::session::{BuildSession, Diagnostic, ScopeViolation};
use crate::types::FidelityScope;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleReport {
    pub scope: FidelityScope,
    pub violations_total: usize,
    pub violations_by_property: BTreeMap<String, usize>,
    pub violations: Vec<ScopeViolation>,
    pub suppressed_container_widths: usize,
    /// Properties emitted per rule, keyed by class.
    pub coverage: BTreeMap<String, Vec<String>>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasEntry {
    pub nodes: Vec<String>,
    pub collision: bool,
    pub selector_emitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasReport {
    pub aliases: BTreeMap<String, AliasEntry>,
    pub collisions: usize,
    pub unique_only: bool,
    /// Nodes whose identity class was dropped in favor of a unique alias.
    pub identity_dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WasteReport {
    pub flattened_wrappers: usize,
    pub invisible_removed: usize,
    pub decorative_removed: usize,
    pub zero_declaration_classes: usize,
    pub zero_declaration_class_list: Vec<String>,
    pub pruned_selectors: usize,
    pub pruned_classes: Vec<String>,
}

pub fn style_report(session: &BuildSession, stats: &EmitStats) -> StyleReport {
    let mut by_property = BTreeMap::new();
    for violation in &session.violations {
        *by_property.entry(violation.property.clone()).or_insert(0) += 1;
    }
    StyleReport {
        scope: session.config.style.scope,
        violations_total: session.violations.len(),
        violations_by_property: by_property,
        violations: session.violations.clone(),
        suppressed_container_widths: session.suppressed_widths,
        coverage: stats.coverage.clone(),
        diagnostics: session.diagnostics.clone(),
    }
}

pub fn alias_report(session: &BuildSession, config: &BuildConfig) -> AliasReport {
    let unique_only = config.classes.unique_only;
    let mut aliases = BTreeMap::new();
    let mut collisions = 0;
    let mut identity_dropped = 0;
    for (alias, nodes) in session.aliases.iter() {
        let collision = nodes.len() > 1;
        if collision {
            collisions += 1;
        } else if config.classes.drop_identity_when_unique {
            identity_dropped += 1;
        }
        aliases.insert(
            alias.to_string(),
            AliasEntry {
                nodes: nodes.to_vec(),
                collision,
                selector_emitted: !collision || !unique_only,
            },
        );
    }
    AliasReport {
        aliases,
        collisions,
        unique_only,
        identity_dropped,
    }
}

pub fn waste_report(
    session: &BuildSession,
    stats: &EmitStats,
    pruned: &PruneOutcome,
) -> WasteReport {
    WasteReport {
        flattened_wrappers: session.flattened,
        invisible_removed: session.noise.invisible_removed,
        decorative_removed: session.noise.decorative_removed,
        zero_declaration_classes: stats.zero_declaration_classes.len(),
        zero_declaration_class_list: stats.zero_declaration_classes.clone(),
        pruned_selectors: pruned.removed.len(),
        pruned_classes: pruned.removed.clone(),
    }
}
