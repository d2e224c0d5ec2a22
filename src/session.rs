//! Per-build session state.
//!
//! A [`BuildSession`] is created at the start of a build, passed by mutable
//! reference through every stage that records something, and dropped when
//! the build returns. Nothing in it outlives one build, so two builds of the
//! same input never see each other's counters or alias tables.

use crate::config::BuildConfig;
use crate::naming::AliasRegistry;
use crate::noise::NoiseStats;
use crate::types::{FidelityScope, ImageMap};
use log::{debug, warn};
use serde::Serialize;

/// Category of a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    AmbiguousSizing,
    ScopeViolation,
    AliasCollision,
    UnresolvedImage,
}

/// A recovered condition, reported instead of raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub node_id: String,
    pub message: String,
}

/// A declaration the active scope did not allow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeViolation {
    pub node_id: String,
    pub property: String,
    pub value: String,
    /// Lowest scope that would have allowed it.
    pub required: FidelityScope,
}

pub struct BuildSession<'a> {
    pub config: &'a BuildConfig,
    pub images: &'a ImageMap,
    pub aliases: AliasRegistry,
    pub diagnostics: Vec<Diagnostic>,
    pub violations: Vec<ScopeViolation>,
    /// Container `width`/`min-width` declarations withheld by policy.
    pub suppressed_widths: usize,
    pub noise: NoiseStats,
    pub flattened: usize,
}

impl<'a> BuildSession<'a> {
    pub fn new(config: &'a BuildConfig, images: &'a ImageMap) -> Self {
        Self {
            config,
            images,
            aliases: AliasRegistry::default(),
            diagnostics: Vec::new(),
            violations: Vec::new(),
            suppressed_widths: 0,
            noise: NoiseStats::default(),
            flattened: 0,
        }
    }

    /// Record a recoverable condition and log it.
    pub fn diagnose(&mut self, kind: DiagnosticKind, node_id: &str, message: impl Into<String>) {
        let message = message.into();
        warn!("{kind:?} at {node_id}: {message}");
        self.diagnostics.push(Diagnostic {
            kind,
            node_id: node_id.to_string(),
            message,
        });
    }

    pub fn record_violation(
        &mut self,
        node_id: &str,
        property: &str,
        value: &str,
        required: FidelityScope,
    ) {
        debug!(
            "scope: withholding {property}: {value} on {node_id} (needs {})",
            required.as_str()
        );
        self.violations.push(ScopeViolation {
            node_id: node_id.to_string(),
            property: property.to_string(),
            value: value.to_string(),
            required,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty() {
        let config = BuildConfig::default();
        let images = ImageMap::new();
        let session = BuildSession::new(&config, &images);
        assert!(session.diagnostics.is_empty());
        assert!(session.violations.is_empty());
        assert_eq!(session.suppressed_widths, 0);
        assert_eq!(session.flattened, 0);
    }

    #[test]
    fn diagnose_records_kind_and_node() {
        let config = BuildConfig::default();
        let images = ImageMap::new();
        let mut session = BuildSession::new(&config, &images);
        session.diagnose(DiagnosticKind::AmbiguousSizing, "1:2", "fill in hug parent");
        assert_eq!(session.diagnostics.len(), 1);
        assert_eq!(session.diagnostics[0].kind, DiagnosticKind::AmbiguousSizing);
        assert_eq!(session.diagnostics[0].node_id, "1:2");
    }
}
