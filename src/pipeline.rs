//! Fixed build pipeline.
//!
//! ```text
//! DesignNode ─▶ noise ─▶ resolve ─▶ flatten ─▶ naming ─▶ css ─┬─▶ prune ─▶ reports
//!                                                  └─▶ generate ─┘
//! ```
//!
//! A build is a pure function of the frame, the configuration and the image
//! map. All per-build state lives in a [`BuildSession`] created here and
//! dropped on return, so repeated builds of the same input are byte-identical.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use log::info;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{BuildConfig, ConfigError};
use crate::node::{self, DesignNode, NodeError};
use crate::prune::PruneOutcome;
use crate::report::{self, AliasReport, StyleReport, WasteReport};
use crate::session::BuildSession;
use crate::types::ImageMap;
use crate::{css, flatten, generate, naming, noise, prune, resolve};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Input error: {0}")]
    Node(#[from] NodeError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything one build produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOutput {
    pub frame_id: String,
    pub markup: String,
    pub stylesheet: String,
    pub style_report: StyleReport,
    pub alias_report: AliasReport,
    pub waste_report: WasteReport,
    /// Elements in the emitted tree.
    pub elements: usize,
}

impl BuildOutput {
    /// SHA-256 over markup, stylesheet and all three reports.
    pub fn fingerprint(&self) -> Result<String, BuildError> {
        let mut hasher = Sha256::new();
        hasher.update(self.markup.as_bytes());
        hasher.update(b"\0");
        hasher.update(self.stylesheet.as_bytes());
        hasher.update(b"\0");
        hasher.update(serde_json::to_vec(&self.style_report)?);
        hasher.update(b"\0");
        hasher.update(serde_json::to_vec(&self.alias_report)?);
        hasher.update(b"\0");
        hasher.update(serde_json::to_vec(&self.waste_report)?);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Pretty JSON for each report, keyed by output file name.
    pub fn report_files(&self) -> Result<BTreeMap<&'static str, String>, BuildError> {
        let mut files = BTreeMap::new();
        files.insert(
            "style_report.json",
            serde_json::to_string_pretty(&self.style_report)?,
        );
        files.insert(
            "alias_report.json",
            serde_json::to_string_pretty(&self.alias_report)?,
        );
        files.insert(
            "waste_report.json",
            serde_json::to_string_pretty(&self.waste_report)?,
        );
        Ok(files)
    }
}

/// Build markup, stylesheet and reports for an already-parsed frame.
pub fn build(
    frame: &DesignNode,
    config: &BuildConfig,
    images: &ImageMap,
) -> Result<BuildOutput, BuildError> {
    config.validate()?;
    let mut session = BuildSession::new(config, images);

    let (retained, noise_stats) = noise::filter(frame, &config.noise);
    info!(
        "noise: kept {} nodes ({} invisible, {} decorative removed)",
        retained.count(),
        noise_stats.invisible_removed,
        noise_stats.decorative_removed
    );
    session.noise = noise_stats;

    let mut root = resolve::resolve(&retained, &mut session);
    if config.flatten.enabled {
        session.flattened = flatten::flatten(&mut root, &config.css);
        info!("flatten: removed {} wrappers", session.flattened);
    }

    naming::assign_classes(&mut root, &mut session);
    info!(
        "naming: {} aliases, {} collisions",
        session.aliases.len(),
        session.aliases.collisions().count()
    );

    let (sheet, stats) = css::emit(&root, config);
    let markup = generate::render_page(&root, &config.markup);
    let stylesheet = sheet.render();
    let pruned = if config.css.prune {
        prune::prune(&markup, &stylesheet)
    } else {
        PruneOutcome {
            stylesheet,
            removed: Vec::new(),
        }
    };
    info!(
        "css: {} rules, {} pruned",
        sheet.blocks.len(),
        pruned.removed.len()
    );

    Ok(BuildOutput {
        frame_id: frame.id.clone(),
        style_report: report::style_report(&session, &stats),
        alias_report: report::alias_report(&session, config),
        waste_report: report::waste_report(&session, &stats, &pruned),
        markup,
        stylesheet: pruned.stylesheet,
        elements: root.count(),
    })
}

/// Parse a design export, locate `frame_id`, and build it.
pub fn build_from_json(
    json: &str,
    frame_id: &str,
    config: &BuildConfig,
    images: &ImageMap,
) -> Result<BuildOutput, BuildError> {
    let frame = node::load_frame(json, frame_id)?;
    build(&frame, config, images)
}

/// Image map from a directory of files named by file-safe node id.
///
/// `7291-125581.png` maps key `7291-125581` to `<href_prefix>/7291-125581.png`.
/// Entries are sorted by file name; non-files are skipped.
pub fn scan_image_dir(dir: &Path, href_prefix: &str) -> io::Result<ImageMap> {
    let mut images = ImageMap::new();
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let (Some(stem), Some(file_name)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.file_name().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        let href = if href_prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{file_name}", href_prefix.trim_end_matches('/'))
        };
        images.insert(stem.to_string(), href);
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn build_produces_all_outputs() {
        let config = BuildConfig::default();
        let pair = row("1:2", 1200.0, vec![text("2:1", "a"), text("2:2", "b")]);
        let tree = column("1:1", 1200.0, vec![with_gap(pair, 12.0)]);
        let out = build(&tree, &config, &ImageMap::new()).unwrap();
        assert!(out.markup.starts_with("<!DOCTYPE html>"));
        assert!(out.stylesheet.contains("gap: 12px;"));
        assert_eq!(out.frame_id, "1:1");
        assert_eq!(out.elements, 4);
        assert_eq!(out.report_files().unwrap().len(), 3);
    }

    #[test]
    fn invalid_config_fails_fast() {
        let mut config = BuildConfig::default();
        config.css.mobile_breakpoint_px = 0;
        let err = build(&column("1:1", 100.0, vec![]), &config, &ImageMap::new()).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn missing_frame_fails_fast() {
        let json = r#"{"id": "0:1", "type": "FRAME", "name": "Root", "children": []}"#;
        let err = build_from_json(json, "9:9", &BuildConfig::default(), &ImageMap::new())
            .unwrap_err();
        assert!(matches!(err, BuildError::Node(NodeError::UnresolvedFrame(_))));
    }

    #[test]
    fn prune_disabled_keeps_every_rule() {
        let mut config = BuildConfig::default();
        config.css.prune = false;
        let out = build(&column("1:1", 1200.0, vec![]), &config, &ImageMap::new()).unwrap();
        assert_eq!(out.waste_report.pruned_selectors, 0);
        assert!(out.stylesheet.contains(".fw-wrap {"));
    }

    #[test]
    fn unused_utilities_are_pruned() {
        let config = BuildConfig::default();
        let out = build(&column("1:1", 1200.0, vec![]), &config, &ImageMap::new()).unwrap();
        assert!(!out.stylesheet.contains(".fw-wrap {"));
        assert!(out.waste_report.pruned_classes.contains(&"fw-wrap".to_string()));
    }

    #[test]
    fn fingerprint_is_stable() {
        let config = BuildConfig::default();
        let tree = column("1:1", 1200.0, vec![text("1:2", "hello")]);
        let a = build(&tree, &config, &ImageMap::new()).unwrap();
        let b = build(&tree, &config, &ImageMap::new()).unwrap();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn image_dir_is_keyed_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("7291-125581.png"), b"png").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let images = scan_image_dir(dir.path(), "images/").unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images["7291-125581"], "images/7291-125581.png");
    }
}
