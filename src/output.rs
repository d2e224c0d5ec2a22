//! CLI output formatting.
//!
//! A build summary leads with the frame and element count, then one block per
//! report with counts first and details indented beneath:
//!
//! ```text
//! Frame 7291:125581 → 42 elements
//! Style (standard)
//!     3 scope violations: color ×2, opacity ×1
//!     2 container widths suppressed
//!     Diagnostics
//!         ambiguous_sizing 12:4: node 12:4 fills the main axis of ...
//! Aliases
//!     7 aliases, 1 collision
//!         card ×2 (no selector)
//! Waste
//!     1 wrapper flattened
//!     2 invisible, 1 decorative nodes removed
//!     0 zero-declaration classes
//!     5 selectors pruned
//! ```
//!
//! Each `format_*` function returns `Vec<String>` and does no I/O; `print_*`
//! wrappers write to stdout.

use std::path::Path;

use crate::pipeline::BuildOutput;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Summary lines for a finished build.
pub fn format_build_output(output: &BuildOutput) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "Frame {} → {}",
        output.frame_id,
        plural(output.elements, "element", "elements")
    ));

    let style = &output.style_report;
    lines.push(format!("Style ({})", style.scope.as_str()));
    let mut violations = plural(style.violations_total, "scope violation", "scope violations");
    if !style.violations_by_property.is_empty() {
        let parts: Vec<String> = style
            .violations_by_property
            .iter()
            .map(|(property, n)| format!("{property} ×{n}"))
            .collect();
        violations.push_str(&format!(": {}", parts.join(", ")));
    }
    lines.push(format!("{}{violations}", indent(1)));
    if style.suppressed_container_widths > 0 {
        lines.push(format!(
            "{}{} suppressed",
            indent(1),
            plural(
                style.suppressed_container_widths,
                "container width",
                "container widths"
            )
        ));
    }
    if !style.diagnostics.is_empty() {
        lines.push(format!("{}Diagnostics", indent(1)));
        for d in &style.diagnostics {
            let kind = serde_json::to_value(d.kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            lines.push(format!("{}{kind} {}: {}", indent(2), d.node_id, d.message));
        }
    }

    let aliases = &output.alias_report;
    lines.push("Aliases".to_string());
    lines.push(format!(
        "{}{}, {}",
        indent(1),
        plural(aliases.aliases.len(), "alias", "aliases"),
        plural(aliases.collisions, "collision", "collisions")
    ));
    for (alias, entry) in aliases.aliases.iter().filter(|(_, e)| e.collision) {
        let note = if entry.selector_emitted {
            "merged selector"
        } else {
            "no selector"
        };
        lines.push(format!(
            "{}{alias} ×{} ({note})",
            indent(2),
            entry.nodes.len()
        ));
    }

    let waste = &output.waste_report;
    lines.push("Waste".to_string());
    lines.push(format!(
        "{}{} flattened",
        indent(1),
        plural(waste.flattened_wrappers, "wrapper", "wrappers")
    ));
    lines.push(format!(
        "{}{} invisible, {} decorative nodes removed",
        indent(1),
        waste.invisible_removed,
        waste.decorative_removed
    ));
    lines.push(format!(
        "{}{}",
        indent(1),
        plural(
            waste.zero_declaration_classes,
            "zero-declaration class",
            "zero-declaration classes"
        )
    ));
    lines.push(format!(
        "{}{} pruned",
        indent(1),
        plural(waste.pruned_selectors, "selector", "selectors")
    ));
    lines
}

pub fn print_build_output(output: &BuildOutput) {
    for line in format_build_output(output) {
        println!("{}", line);
    }
}

/// One line per written file, relative to the output directory.
pub fn format_written_files(dir: &Path, files: &[&str]) -> Vec<String> {
    let mut lines = vec![format!("Wrote {}", dir.display())];
    lines.extend(files.iter().map(|f| format!("{}{f}", indent(1))));
    lines
}

pub fn print_written_files(dir: &Path, files: &[&str]) {
    for line in format_written_files(dir, files) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::pipeline::build;
    use crate::test_helpers::*;
    use crate::types::ImageMap;

    fn sample() -> BuildOutput {
        let a = named(with_fill(column("2:1", 300.0, vec![]), 1.0, 1.0, 1.0), "card");
        let b = named(with_fill(column("2:2", 300.0, vec![]), 1.0, 1.0, 1.0), "card");
        let label = text("3:1", "Label");
        let tree = column("1:1", 1200.0, vec![a, b, column("2:3", 300.0, vec![label])]);
        build(&tree, &BuildConfig::default(), &ImageMap::new()).unwrap()
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "alias", "aliases"), "1 alias");
        assert_eq!(plural(0, "alias", "aliases"), "0 aliases");
    }

    #[test]
    fn summary_leads_with_frame() {
        let lines = format_build_output(&sample());
        assert_eq!(lines[0], "Frame 1:1 → 5 elements");
        assert_eq!(lines[1], "Style (standard)");
    }

    #[test]
    fn collisions_are_listed_under_aliases() {
        let lines = format_build_output(&sample());
        assert!(lines.contains(&"        card ×2 (no selector)".to_string()));
    }

    #[test]
    fn hoisted_color_shows_as_violation() {
        let lines = format_build_output(&sample());
        assert!(lines.iter().any(|l| l.contains("color ×1")));
    }

    #[test]
    fn written_files_are_indented() {
        let lines = format_written_files(Path::new("dist"), &["index.html", "style.css"]);
        assert_eq!(lines, vec!["Wrote dist", "    index.html", "    style.css"]);
    }
}
