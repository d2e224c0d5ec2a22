//! Stylesheet emission.
//!
//! Turns the named, resolved tree into CSS text. Output order is fixed so the
//! same tree always produces byte-identical CSS:
//!
//! 1. base rules (`box-sizing`, body margin)
//! 2. shared utility classes (`fx-row`, `layout-2col`, …), when enabled
//! 3. one rule per styled node, in document order
//! 4. compound helpers that target utilities (margin reset, column images)
//! 5. the mobile `@media` block that stacks two-column rows
//!
//! Nodes that end up with no declarations get no rule; their identity class
//! is dropped from markup and counted as waste.

use std::collections::BTreeMap;

use crate::config::BuildConfig;
use crate::resolve::{
    BG_FULLBLEED, COL_FIRST, COL_SECOND, FW_WRAP, FX_COL, FX_ROW, LAYOUT_2COL, ResolvedNode,
};
use crate::types::ResolvedStyle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
}

impl Rule {
    fn new(selector: impl Into<String>, declarations: &[(&str, &str)]) -> Self {
        Self {
            selector: selector.into(),
            declarations: declarations
                .iter()
                .map(|(p, v)| (p.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn from_style(selector: String, style: &ResolvedStyle) -> Self {
        Self {
            selector,
            declarations: style
                .iter()
                .map(|d| (d.property.clone(), d.value.clone()))
                .collect(),
        }
    }

    fn render_into(&self, out: &mut String, indent: &str) {
        out.push_str(&format!("{indent}{} {{\n", self.selector));
        for (property, value) in &self.declarations {
            out.push_str(&format!("{indent}  {property}: {value};\n"));
        }
        out.push_str(&format!("{indent}}}\n"));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Rule(Rule),
    Media { query: String, rules: Vec<Rule> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub blocks: Vec<Block>,
}

impl StyleSheet {
    fn rule(&mut self, rule: Rule) {
        self.blocks.push(Block::Rule(rule));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match block {
                Block::Rule(rule) => rule.render_into(&mut out, ""),
                Block::Media { query, rules } => {
                    out.push_str(&format!("@media {query} {{\n"));
                    for rule in rules {
                        rule.render_into(&mut out, "  ");
                    }
                    out.push_str("}\n");
                }
            }
        }
        out
    }
}

/// What the emitter saw while walking the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitStats {
    /// Identity classes that received no declarations.
    pub zero_declaration_classes: Vec<String>,
    /// Properties emitted per node rule, keyed by its first class.
    pub coverage: BTreeMap<String, Vec<String>>,
}

fn selector_for(node: &ResolvedNode) -> String {
    let classes = &node.classes;
    match (&classes.alias, classes.alias_selector, classes.emit_identity) {
        (Some(alias), true, true) => format!(".{}, .{alias}", classes.identity),
        (Some(alias), true, false) => format!(".{alias}"),
        _ => format!(".{}", classes.identity),
    }
}

fn primary_class(node: &ResolvedNode) -> &str {
    match &node.classes.alias {
        Some(alias) if !node.classes.emit_identity => alias,
        _ => &node.classes.identity,
    }
}

fn node_rules(node: &ResolvedNode, sheet: &mut StyleSheet, stats: &mut EmitStats) {
    if node.has_declarations() {
        let declarations = node.declarations();
        stats.coverage.insert(
            primary_class(node).to_string(),
            declarations.iter().map(|d| d.property.clone()).collect(),
        );
        sheet.rule(Rule::from_style(selector_for(node), &declarations));
    } else {
        stats
            .zero_declaration_classes
            .push(node.classes.identity.clone());
    }
    if let (Some(class), Some(content)) = (node.content_class(), &node.content) {
        stats.coverage.insert(
            class.clone(),
            content.iter().map(|d| d.property.clone()).collect(),
        );
        sheet.rule(Rule::from_style(format!(".{class}"), content));
    }
    for child in &node.children {
        node_rules(child, sheet, stats);
    }
}

fn base_rules(sheet: &mut StyleSheet) {
    sheet.rule(Rule::new(
        "*, *::before, *::after",
        &[("box-sizing", "border-box")],
    ));
    sheet.rule(Rule::new("body", &[("margin", "0")]));
}

fn utility_rules(sheet: &mut StyleSheet) {
    let class = |name: &str| format!(".{name}");
    sheet.rule(Rule::new(
        class(FX_ROW),
        &[("display", "flex"), ("flex-direction", "row")],
    ));
    sheet.rule(Rule::new(
        class(FX_COL),
        &[("display", "flex"), ("flex-direction", "column")],
    ));
    sheet.rule(Rule::new(class(FW_WRAP), &[("flex-wrap", "wrap")]));
    sheet.rule(Rule::new(
        class(LAYOUT_2COL),
        &[("display", "flex"), ("flex-wrap", "nowrap")],
    ));
    sheet.rule(Rule::new(class(COL_FIRST), &[("min-width", "0")]));
    sheet.rule(Rule::new(class(COL_SECOND), &[("min-width", "0")]));
    sheet.rule(Rule::new(
        class(BG_FULLBLEED),
        &[
            ("width", "100vw"),
            ("max-width", "none"),
            ("margin-left", "calc(50% - 50vw)"),
            ("margin-right", "calc(50% - 50vw)"),
        ],
    ));
}

fn compound_rules(sheet: &mut StyleSheet, breakpoint: u32) {
    sheet.rule(Rule::new(
        format!(":where(.{FX_ROW}, .{FX_COL}) > :is(h1, h2, h3, h4, h5, h6, p)"),
        &[("margin", "0")],
    ));
    sheet.rule(Rule::new(
        format!(".{LAYOUT_2COL} > *"),
        &[("min-width", "0")],
    ));
    sheet.rule(Rule::new(
        format!(".{COL_FIRST} img"),
        &[("width", "auto"), ("max-width", "100%"), ("height", "auto")],
    ));
    sheet.blocks.push(Block::Media {
        query: format!("(max-width: {breakpoint}px)"),
        rules: vec![
            Rule::new(format!(".{LAYOUT_2COL}"), &[("flex-direction", "column")]),
            Rule::new(
                format!(".{LAYOUT_2COL} > *"),
                &[("flex", "1 1 auto"), ("width", "100%"), ("max-width", "100%")],
            ),
        ],
    });
}

/// Emit the stylesheet for a named tree.
pub fn emit(root: &ResolvedNode, config: &BuildConfig) -> (StyleSheet, EmitStats) {
    let mut sheet = StyleSheet::default();
    let mut stats = EmitStats::default();
    base_rules(&mut sheet);
    if config.css.utilities {
        utility_rules(&mut sheet);
    }
    node_rules(root, &mut sheet, &mut stats);
    if config.css.utilities {
        compound_rules(&mut sheet, config.css.mobile_breakpoint_px);
    }
    (sheet, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::assign_classes;
    use crate::noise;
    use crate::resolve::resolve;
    use crate::session::BuildSession;
    use crate::test_helpers::*;
    use crate::types::ImageMap;
    use pretty_assertions::assert_eq;

    fn emitted(config: &BuildConfig, tree: &crate::node::DesignNode) -> (String, EmitStats) {
        let images = ImageMap::new();
        let mut session = BuildSession::new(config, &images);
        let (retained, _) = noise::filter(tree, &config.noise);
        let mut root = resolve(&retained, &mut session);
        assign_classes(&mut root, &mut session);
        let (sheet, stats) = emit(&root, config);
        (sheet.render(), stats)
    }

    #[test]
    fn rule_format() {
        let mut sheet = StyleSheet::default();
        sheet.rule(Rule::new(".a", &[("gap", "8px"), ("padding", "4px")]));
        sheet.rule(Rule::new(".b", &[("margin", "0")]));
        assert_eq!(
            sheet.render(),
            ".a {\n  gap: 8px;\n  padding: 4px;\n}\n\n.b {\n  margin: 0;\n}\n"
        );
    }

    #[test]
    fn media_block_format() {
        let mut sheet = StyleSheet::default();
        sheet.blocks.push(Block::Media {
            query: "(max-width: 768px)".into(),
            rules: vec![Rule::new(".a", &[("flex-direction", "column")])],
        });
        assert_eq!(
            sheet.render(),
            "@media (max-width: 768px) {\n  .a {\n    flex-direction: column;\n  }\n}\n"
        );
    }

    #[test]
    fn pair_rules_and_stacking() {
        let config = BuildConfig::default();
        let a = fixed_w(rect("2:1", 320.0, 200.0));
        let b = fill_w(column("2:2", 856.0, vec![text("3:1", "a"), text("3:2", "b")]));
        let tree = column("1:1", 1200.0, vec![with_gap(row("1:2", 1200.0, vec![a, b]), 24.0)]);
        let (css, _) = emitted(&config, &tree);

        assert!(css.contains(".n-2-1 {\n  flex: 0 0 320px;\n"));
        assert!(css.contains("  flex: 1 1 auto;\n"));
        assert!(css.contains("  gap: 24px;\n"));
        assert!(css.contains(".layout-2col {\n"));
        let media = "@media (max-width: 768px) {\n  .layout-2col {\n    flex-direction: column;";
        assert!(css.contains(media));
        let reset = ":where(.fx-row, .fx-col) > :is(h1, h2, h3, h4, h5, h6, p) {\n  margin: 0;";
        assert!(css.contains(reset));
    }

    #[test]
    fn breakpoint_comes_from_config() {
        let mut config = BuildConfig::default();
        config.css.mobile_breakpoint_px = 640;
        let (css, _) = emitted(&config, &column("1:1", 1200.0, vec![]));
        assert!(css.contains("@media (max-width: 640px)"));
    }

    #[test]
    fn utilities_off_inlines_flex() {
        let mut config = BuildConfig::default();
        config.css.utilities = false;
        let tree = column("1:1", 1200.0, vec![row("1:2", 1200.0, vec![text("2:1", "a")])]);
        let (css, _) = emitted(&config, &tree);
        assert!(!css.contains(".fx-row"));
        assert!(!css.contains("@media"));
        assert!(css.contains("  display: flex;\n  flex-direction: row;\n"));
        assert!(css.contains("  margin: 0;\n"));
    }

    #[test]
    fn zero_declaration_nodes_get_no_rule() {
        let mut config = BuildConfig::default();
        config.css.utilities = false;
        let mut bare = frame("1:2", 10.0, 10.0);
        bare.kind = crate::node::NodeKind::Group;
        bare.children.push(frame("2:1", 20.0, 20.0));
        let mut tree = frame("1:1", 1200.0, 800.0);
        tree.children.push(bare);
        let (css, stats) = emitted(&config, &tree);
        assert!(stats.zero_declaration_classes.contains(&"n-1-2".to_string()));
        assert!(!css.contains(".n-1-2 "));
    }

    #[test]
    fn unique_alias_joins_the_selector() {
        let config = BuildConfig::default();
        let hero = named(with_fill(column("1:2", 1200.0, vec![]), 0.0, 0.0, 0.0), "Hero");
        let (css, stats) = emitted(&config, &column("1:1", 1200.0, vec![hero]));
        assert!(css.contains(".n-1-2, .hero {\n"));
        assert!(stats.coverage.contains_key("n-1-2"));
    }

    #[test]
    fn duplicate_alias_is_never_a_selector() {
        let config = BuildConfig::default();
        let a = named(with_fill(column("2:1", 300.0, vec![]), 1.0, 1.0, 1.0), "card");
        let b = named(with_fill(column("2:2", 300.0, vec![]), 1.0, 1.0, 1.0), "card");
        let (css, _) = emitted(&config, &column("1:1", 1200.0, vec![a, b]));
        assert!(!css.contains(".card"));
    }
}
