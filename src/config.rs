//! Build configuration.
//!
//! Handles loading, validating, and merging `figflow.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged over them key by
//! key, so a config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [style]
//! scope = "standard"                   # conservative | standard | aggressive
//! suppress_container_width = true      # omit width/min-width on containers
//! fixed_height_to_aspect_ratio = true  # image/rect heights become aspect-ratio
//!
//! [padding]
//! mode = "none"                        # none | trim | clamp
//! scope = "wrappers"                   # wrappers | all
//! threshold_px = 40
//! symmetry_tolerance_px = 2
//! clamp_min_px = 16
//! wrapper_width_ratio = 0.9
//!
//! [columns]
//! ratio_source = "auto"                # auto | layout | bounding-box
//! equal_split_fallback = false
//!
//! [noise]
//! decorative_threshold_px = 14
//!
//! [flatten]
//! enabled = false
//!
//! [classes]
//! alias_mode = "markup"                # off | markup
//! alias_source = "both"                # name | semantic | both
//! alias_scope = "all"                  # all | sections
//! unique_only = true
//! drop_identity_when_unique = false
//! card_roles = true
//!
//! [css]
//! prune = true
//! utilities = true
//! mobile_breakpoint_px = 768
//!
//! [images]
//! offline = true
//!
//! [markup]
//! lang = "en"
//! stylesheet_href = "style.css"
//! # title = "Landing page"
//! ```
//!
//! Unknown keys are ignored and fall back to defaults, with a warning naming
//! each one. Unrecognised enum values are a load error.

use crate::types::FidelityScope;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up next to the input document.
pub const CONFIG_FILE_NAME: &str = "figflow.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Complete build configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub style: StyleConfig,
    pub padding: PaddingConfig,
    pub columns: ColumnsConfig,
    pub noise: NoiseConfig,
    pub flatten: FlattenConfig,
    pub classes: ClassesConfig,
    pub css: CssConfig,
    pub images: ImagesConfig,
    pub markup: MarkupConfig,
}

impl BuildConfig {
    /// Validate numeric ranges. Enum fields are already checked by serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.padding;
        if !(p.wrapper_width_ratio > 0.0 && p.wrapper_width_ratio <= 1.0) {
            return Err(ConfigError::Validation(
                "padding.wrapper_width_ratio must be in (0, 1]".into(),
            ));
        }
        if p.threshold_px < 0.0 || p.symmetry_tolerance_px < 0.0 || p.clamp_min_px < 0.0 {
            return Err(ConfigError::Validation(
                "padding pixel values must not be negative".into(),
            ));
        }
        if self.noise.decorative_threshold_px < 0.0 {
            return Err(ConfigError::Validation(
                "noise.decorative_threshold_px must not be negative".into(),
            ));
        }
        if self.css.mobile_breakpoint_px == 0 {
            return Err(ConfigError::Validation(
                "css.mobile_breakpoint_px must be non-zero".into(),
            ));
        }
        if self.markup.stylesheet_href.trim().is_empty() {
            return Err(ConfigError::Validation(
                "markup.stylesheet_href must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Fidelity and box-size policy for collected declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub scope: FidelityScope,
    /// Omit `width`/`min-width` on container nodes.
    pub suppress_container_width: bool,
    /// Replace fixed heights on image/rect nodes with `aspect-ratio`.
    pub fixed_height_to_aspect_ratio: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            scope: FidelityScope::Standard,
            suppress_container_width: true,
            fixed_height_to_aspect_ratio: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaddingMode {
    #[default]
    None,
    Trim,
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaddingScope {
    #[default]
    Wrappers,
    All,
}

/// Horizontal padding normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingConfig {
    pub mode: PaddingMode,
    pub scope: PaddingScope,
    /// Both sides must exceed this before `trim` applies.
    pub threshold_px: f64,
    pub symmetry_tolerance_px: f64,
    /// Lower bound of the fluid `clamp()` value.
    pub clamp_min_px: f64,
    /// Minimum width, as a fraction of the root width, for a wrapper frame.
    pub wrapper_width_ratio: f64,
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self {
            mode: PaddingMode::None,
            scope: PaddingScope::Wrappers,
            threshold_px: 40.0,
            symmetry_tolerance_px: 2.0,
            clamp_min_px: 16.0,
            wrapper_width_ratio: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RatioSource {
    /// Auto-layout hints first, bounding boxes when hints are absent.
    #[default]
    Auto,
    Layout,
    BoundingBox,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub ratio_source: RatioSource,
    pub equal_split_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub decorative_threshold_px: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            decorative_threshold_px: 14.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasMode {
    Off,
    #[default]
    Markup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasSource {
    Name,
    Semantic,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasScope {
    #[default]
    All,
    Sections,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassesConfig {
    pub alias_mode: AliasMode,
    pub alias_source: AliasSource,
    pub alias_scope: AliasScope,
    /// Emit an alias selector only when exactly one node carries the alias.
    pub unique_only: bool,
    /// Drop the identity class from nodes whose alias is unique.
    pub drop_identity_when_unique: bool,
    /// Mark text inside cards with `card__title`, `card__body` or `card__meta`.
    pub card_roles: bool,
}

impl Default for ClassesConfig {
    fn default() -> Self {
        Self {
            alias_mode: AliasMode::Markup,
            alias_source: AliasSource::Both,
            alias_scope: AliasScope::All,
            unique_only: true,
            drop_identity_when_unique: false,
            card_roles: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    pub prune: bool,
    pub utilities: bool,
    pub mobile_breakpoint_px: u32,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            prune: true,
            utilities: true,
            mobile_breakpoint_px: 768,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Reject remote image URLs.
    pub offline: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { offline: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub lang: String,
    pub stylesheet_href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            stylesheet_href: "style.css".to_string(),
            title: None,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    // BuildConfig holds only strings, numbers, booleans and unit enums, all of
    // which have a TOML representation.
    toml::Value::try_from(BuildConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Dotted paths of keys present in `overlay` but absent from `reference`.
///
/// `markup.title` has no stock value, so it is never reported.
pub fn unknown_keys(reference: &toml::Value, overlay: &toml::Value) -> Vec<String> {
    fn walk(reference: &toml::Value, overlay: &toml::Value, prefix: &str, out: &mut Vec<String>) {
        let (Some(ref_table), Some(over_table)) = (reference.as_table(), overlay.as_table()) else {
            return;
        };
        for (key, value) in over_table {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match ref_table.get(key) {
                Some(ref_value) => walk(ref_value, value, &path, out),
                None if path == "markup.title" => {}
                None => out.push(path),
            }
        }
    }
    let mut out = Vec::new();
    walk(reference, overlay, "", &mut out);
    out
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<BuildConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => {
            for key in unknown_keys(&base, &ov) {
                warn!("ignoring unknown config key `{key}`");
            }
            merge_toml(base, ov)
        }
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file, falling back to stock defaults if absent.
pub fn load_config(path: &Path) -> Result<BuildConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Config for a build run from `dir`.
///
/// An explicit path must exist. Without one, `dir/figflow.toml` is used when
/// present, else the stock defaults.
pub fn discover_config(explicit: Option<&Path>, dir: &Path) -> Result<BuildConfig, ConfigError> {
    match explicit {
        Some(path) if !path.is_file() => Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => load_config(path),
        None => load_config(&dir.join(CONFIG_FILE_NAME)),
    }
}

/// Returns a fully-commented stock `figflow.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# figflow configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys are ignored with a warning.

# ---------------------------------------------------------------------------
# Style collection
# ---------------------------------------------------------------------------
[style]
# Which declarations may be attached to a node class:
#   conservative - no colour on non-text nodes, box/visual properties only
#   standard     - no colour on non-text nodes, everything else
#   aggressive   - everything (diagnostics only)
scope = "standard"

# Omit width/min-width on container nodes so they follow their parent.
suppress_container_width = true

# Replace fixed heights on image and rectangle nodes with aspect-ratio.
fixed_height_to_aspect_ratio = true

# ---------------------------------------------------------------------------
# Horizontal padding normalization
# ---------------------------------------------------------------------------
[padding]
# none  - keep authored padding
# trim  - zero large symmetric left/right padding
# clamp - replace left/right padding with clamp(min, vw, original)
mode = "none"

# wrappers - only page-width wrapper frames
# all      - every auto-layout container
scope = "wrappers"

# Both sides must exceed this for trim to apply.
threshold_px = 40

# Left/right are symmetric when they differ by at most this much.
symmetry_tolerance_px = 2

# Lower bound of the fluid clamp() value.
clamp_min_px = 16

# A wrapper is at least this fraction of the root frame width.
wrapper_width_ratio = 0.9

# ---------------------------------------------------------------------------
# Two-column sizing
# ---------------------------------------------------------------------------
[columns]
# auto         - auto-layout hints, then bounding-box ratio
# layout       - auto-layout hints only
# bounding-box - bounding-box ratio only
ratio_source = "auto"

# Split 50/50 when no other ratio signal exists.
equal_split_fallback = false

# ---------------------------------------------------------------------------
# Noise filter
# ---------------------------------------------------------------------------
[noise]
# Absolutely positioned shapes this thin (or thinner) are decorations.
decorative_threshold_px = 14

# ---------------------------------------------------------------------------
# Wrapper flattening
# ---------------------------------------------------------------------------
[flatten]
# Collapse single-child containers with no visual role.
enabled = false

# ---------------------------------------------------------------------------
# Class naming
# ---------------------------------------------------------------------------
[classes]
# off    - identity classes only
# markup - add readable alias classes to the markup
alias_mode = "markup"

# Where aliases come from: layer names, the semantic classifier, or both.
alias_source = "both"

# all      - alias every node
# sections - alias only section-level containers
alias_scope = "all"

# Emit .alias selectors only for aliases carried by exactly one node.
unique_only = true

# Drop the n-<id> class from nodes whose alias is unique.
drop_identity_when_unique = false

# Mark text inside cards with card__title / card__body / card__meta hooks.
# These are markup-only and never become selectors.
card_roles = true

# ---------------------------------------------------------------------------
# Stylesheet
# ---------------------------------------------------------------------------
[css]
# Remove rules whose class never appears in the markup.
prune = true

# Emit shared layout utility rules (fx-row, layout-2col, ...).
utilities = true

# Two-column pairs stack below this viewport width.
mobile_breakpoint_px = 768

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# Reject http(s) image paths.
offline = true

# ---------------------------------------------------------------------------
# Markup
# ---------------------------------------------------------------------------
[markup]
lang = "en"
stylesheet_href = "style.css"
# Document title; defaults to the frame name.
# title = "Landing page"
"##
}
