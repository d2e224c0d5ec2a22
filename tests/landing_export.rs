//! Full-document exports: sections, aliases, backgrounds and input errors.

use figflow::config::{self, BuildConfig};
use figflow::node::NodeError;
use figflow::pipeline::{BuildError, BuildOutput, build_from_json};
use figflow::session::DiagnosticKind;
use figflow::types::{FidelityScope, ImageMap};
use pretty_assertions::assert_eq;
use scraper::{Html, Selector};
use std::path::Path;

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("fixture '{}' unreadable: {e}", path.display()))
}

fn landing(config: &BuildConfig, images: &ImageMap) -> BuildOutput {
    build_from_json(&fixture("landing.json"), "10:1", config, images).unwrap()
}

fn hero_image() -> ImageMap {
    let mut images = ImageMap::new();
    images.insert("10-2".to_string(), "images/10-2.png".to_string());
    images
}

fn count(markup: &str, selector: &str) -> usize {
    let document = Html::parse_document(markup);
    let selector = Selector::parse(selector).unwrap();
    document.select(&selector).count()
}

fn selector_tokens(css: &str) -> Vec<String> {
    css.lines()
        .filter_map(|l| l.trim().strip_suffix(" {"))
        .flat_map(|s| s.split(", ").map(str::to_string).collect::<Vec<_>>())
        .collect()
}

// =========================================================================
// Structure
// =========================================================================

#[test]
fn top_level_frames_become_sections() {
    let out = landing(&BuildConfig::default(), &hero_image());
    assert_eq!(count(&out.markup, "body > div > section"), 3);
    assert_eq!(count(&out.markup, "h1"), 1);
    assert!(out.markup.contains("<title>Landing</title>"));
    assert!(out.markup.contains(r#"href="style.css""#));
}

#[test]
fn line_break_in_text_becomes_br() {
    let out = landing(&BuildConfig::default(), &hero_image());
    let document = Html::parse_document(&out.markup);
    let selector = Selector::parse(".n-10-4 br").unwrap();
    assert_eq!(document.select(&selector).count(), 1);
}

#[test]
fn line_renders_as_top_border() {
    let out = landing(&BuildConfig::default(), &ImageMap::new());
    assert!(out.stylesheet.contains("border-top: 1px solid #d9d9d9;"));
}

// =========================================================================
// Backgrounds
// =========================================================================

#[test]
fn image_section_splits_background_from_content() {
    let out = landing(&BuildConfig::default(), &hero_image());
    assert_eq!(count(&out.markup, ".n-10-2 > .n-10-2__content"), 1);
    assert_eq!(count(&out.markup, "section.bg-fullbleed"), 1);
    assert!(out.stylesheet.contains("url(\"images/10-2.png\")"));
}

#[test]
fn missing_image_is_diagnosed_not_fatal() {
    let out = landing(&BuildConfig::default(), &ImageMap::new());
    assert!(
        out.style_report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnresolvedImage && d.node_id == "10:2")
    );
    assert!(!out.markup.contains("n-10-2__content"));
}

// =========================================================================
// Aliases
// =========================================================================

#[test]
fn shared_alias_is_reported_and_never_a_selector() {
    let out = landing(&BuildConfig::default(), &ImageMap::new());
    let entry = &out.alias_report.aliases["pricing__card"];
    assert_eq!(entry.nodes, vec!["20:2", "20:5"]);
    assert!(entry.collision);
    assert!(!entry.selector_emitted);

    let tokens = selector_tokens(&out.stylesheet);
    assert!(!tokens.iter().any(|t| t == ".pricing__card"));
    assert!(tokens.iter().any(|t| t == ".n-20-2"));
    assert!(tokens.iter().any(|t| t == ".n-20-5"));
    assert_eq!(count(&out.markup, ".pricing__card"), 2);
}

#[test]
fn shared_alias_merges_when_uniqueness_is_off() {
    let mut config = BuildConfig::default();
    config.classes.unique_only = false;
    let out = landing(&config, &ImageMap::new());
    let tokens = selector_tokens(&out.stylesheet);
    assert!(tokens.iter().any(|t| t == ".pricing__card"));
    assert!(out.alias_report.aliases["pricing__card"].selector_emitted);
}

#[test]
fn card_text_carries_card_part_hooks() {
    let out = landing(&BuildConfig::default(), &ImageMap::new());
    assert_eq!(count(&out.markup, ".pricing__card > h2.card__title"), 2);
    assert_eq!(count(&out.markup, ".pricing__card > p.card__body"), 1);
    assert_eq!(count(&out.markup, ".pricing__card > p.card__meta"), 1);
    assert_eq!(count(&out.markup, "section.hero .card__title"), 0);

    let tokens = selector_tokens(&out.stylesheet);
    assert!(!tokens.iter().any(|t| t.starts_with(".card__")));
}

// =========================================================================
// Scopes and waste
// =========================================================================

#[test]
fn stricter_scope_withholds_more() {
    let mut config = BuildConfig::default();
    config.style.scope = FidelityScope::Conservative;
    let conservative = landing(&config, &ImageMap::new());
    config.style.scope = FidelityScope::Aggressive;
    let aggressive = landing(&config, &ImageMap::new());

    assert!(conservative.style_report.violations_total > 0);
    assert!(
        conservative.style_report.violations_total >= aggressive.style_report.violations_total
    );
    assert!(conservative.style_report.violations_by_property.contains_key("color"));
}

#[test]
fn single_child_wrapper_is_flattened() {
    let mut config = BuildConfig::default();
    config.flatten.enabled = true;
    let flat = landing(&config, &ImageMap::new());
    config.flatten.enabled = false;
    let nested = landing(&config, &ImageMap::new());

    assert_eq!(flat.waste_report.flattened_wrappers, 1);
    assert_eq!(nested.waste_report.flattened_wrappers, 0);
    assert_eq!(flat.elements + 1, nested.elements);
    assert_eq!(count(&flat.markup, ".n-30-1 > .n-30-4"), 1);
}

// =========================================================================
// Input handling
// =========================================================================

#[test]
fn nodes_response_wrapper_is_accepted() {
    let json = format!(
        r#"{{"nodes": {{"1:1": {{"document": {}}}}}}}"#,
        fixture("two_column.json")
    );
    let out = build_from_json(&json, "1:1", &BuildConfig::default(), &ImageMap::new()).unwrap();
    assert_eq!(out.frame_id, "1:1");
}

#[test]
fn malformed_node_reports_its_path() {
    let err = build_from_json(
        &fixture("malformed.json"),
        "1:1",
        &BuildConfig::default(),
        &ImageMap::new(),
    )
    .unwrap_err();
    match err {
        BuildError::Node(NodeError::Malformed { path, .. }) => {
            assert!(path.contains("Broken"), "{path}");
        }
        other => panic!("expected malformed node, got {other:?}"),
    }
}

#[test]
fn unknown_frame_is_rejected() {
    let err = build_from_json(
        &fixture("landing.json"),
        "99:99",
        &BuildConfig::default(),
        &ImageMap::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BuildError::Node(NodeError::UnresolvedFrame(id)) if id == "99:99"
    ));
}

#[test]
fn config_file_drives_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figflow.toml");
    std::fs::write(&path, "[classes]\nalias_mode = \"off\"\n").unwrap();
    let config = config::load_config(&path).unwrap();

    let out = landing(&config, &ImageMap::new());
    assert!(out.alias_report.aliases.is_empty());
    assert!(!out.markup.contains("pricing__card"));
}
