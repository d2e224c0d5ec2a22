//! Unused-selector pruning.
//!
//! Collects every class token used in the markup, then drops top-level rules
//! whose selector is a single simple class (`.name {`) not in that set.
//! Everything else is copied through verbatim:
//!
//! - comments
//! - `@media`, `@supports` and other at-blocks, including their contents
//! - selector lists (`.a, .b`) and compound selectors (`.a > *`, `:where(…)`)
//!
//! Because kept text is never rewritten, pruning already-pruned CSS against
//! the same markup returns it unchanged.

use std::collections::BTreeSet;

use cssparser::{ParseError, Parser, ParserInput, SourcePosition, Token};
use log::debug;
use scraper::Html;

/// Result of a prune pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub stylesheet: String,
    /// Classes whose rules were removed, in stylesheet order.
    pub removed: Vec<String>,
}

/// Every class token on any element of the document.
pub fn used_classes(markup: &str) -> BTreeSet<String> {
    let document = Html::parse_document(markup);
    document
        .tree
        .nodes()
        .filter_map(|node| node.value().as_element())
        .flat_map(|element| element.classes().map(str::to_string))
        .collect()
}

/// The class name if `selector` is exactly one simple class selector.
fn simple_class(selector: &str) -> Option<&str> {
    let name = selector.trim().strip_prefix('.')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(name)
}

/// Consume the rest of a `{}` block.
fn skip_block<'i>(parser: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    while parser.next_including_whitespace_and_comments().is_ok() {}
    Ok(())
}

/// Remove rules for classes not in `used`.
///
/// Walks the top-level token stream with cssparser. Each rule's source span,
/// including the whitespace before it, is copied or dropped as a unit.
pub fn prune_stylesheet(css: &str, used: &BTreeSet<String>) -> PruneOutcome {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut out = String::with_capacity(css.len());
    let mut removed = Vec::new();
    let mut segment = parser.position();
    let mut prelude: Option<SourcePosition> = None;

    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_) if prelude.is_none() => {}
            Token::Comment(_) if prelude.is_none() => {
                out.push_str(parser.slice_from(segment));
                segment = parser.position();
            }
            // End of an at-rule statement such as `@import`.
            Token::Semicolon => {
                out.push_str(parser.slice_from(segment));
                segment = parser.position();
                prelude = None;
            }
            Token::CurlyBracketBlock => {
                let start = prelude.unwrap_or(before);
                let selector = parser.slice(start..before);
                let is_at_rule = selector.starts_with('@');
                if let Err(err) = parser.parse_nested_block(|block| skip_block(block)) {
                    debug!("prune: block after '{}' not consumed: {:?}", selector.trim(), err.kind);
                }
                let end = parser.position();
                match simple_class(selector) {
                    Some(class) if !is_at_rule && !used.contains(class) => {
                        removed.push(class.to_string());
                    }
                    _ => {
                        // A rule that follows removed leading rules starts the output.
                        let from = if out.is_empty() && !removed.is_empty() {
                            start
                        } else {
                            segment
                        };
                        out.push_str(parser.slice(from..end));
                    }
                }
                segment = end;
                prelude = None;
            }
            _ if prelude.is_none() => prelude = Some(before),
            _ => {}
        }
    }
    out.push_str(parser.slice_from(segment));

    PruneOutcome {
        stylesheet: out,
        removed,
    }
}

/// Prune `css` against the classes used by `markup`.
pub fn prune(markup: &str, css: &str) -> PruneOutcome {
    prune_stylesheet(css, &used_classes(markup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MARKUP: &str = concat!(
        r#"<!DOCTYPE html><html><body>"#,
        r#"<div class="a fx-row"><p class="b">x</p></div></body></html>"#
    );

    #[test]
    fn collects_class_tokens() {
        let used = used_classes(MARKUP);
        assert_eq!(
            used.into_iter().collect::<Vec<_>>(),
            vec!["a".to_string(), "b".to_string(), "fx-row".to_string()]
        );
    }

    #[test]
    fn removes_unused_simple_rules() {
        let css =
            ".a {\n  gap: 8px;\n}\n\n.unused {\n  margin: 0;\n}\n\n.b {\n  color: #000000;\n}\n";
        let outcome = prune(MARKUP, css);
        assert_eq!(outcome.removed, vec!["unused".to_string()]);
        assert_eq!(
            outcome.stylesheet,
            ".a {\n  gap: 8px;\n}\n\n.b {\n  color: #000000;\n}\n"
        );
    }

    #[test]
    fn removes_trailing_unused_rule() {
        let css = ".a {\n  gap: 8px;\n}\n\n.unused {\n  margin: 0;\n}\n";
        let outcome = prune(MARKUP, css);
        assert_eq!(outcome.stylesheet, ".a {\n  gap: 8px;\n}\n");
    }

    #[test]
    fn removes_leading_unused_rule() {
        let css = ".unused {\n  margin: 0;\n}\n\n.a {\n  gap: 8px;\n}\n";
        let outcome = prune(MARKUP, css);
        assert_eq!(outcome.stylesheet, ".a {\n  gap: 8px;\n}\n");
    }

    #[test]
    fn preserves_lists_compounds_at_blocks_and_comments() {
        let css = "/* keep */\n.x, .y {\n  margin: 0;\n}\n\n.z > * {\n  min-width: 0;\n}\n\n\
                   @media (max-width: 768px) {\n  .gone {\n    flex-direction: column;\n  }\n}\n\n\
                   :where(.q) > p {\n  margin: 0;\n}\n";
        let outcome = prune(MARKUP, css);
        assert!(outcome.removed.is_empty());
        assert_eq!(outcome.stylesheet, css);
    }

    #[test]
    fn braces_in_strings_stay_inside_their_rule() {
        let css =
            ".a {\n  background-image: url(\"x{y}.png\");\n}\n\n.unused {\n  content: \"}\";\n}\n";
        let outcome = prune(MARKUP, css);
        assert_eq!(
            outcome.stylesheet,
            ".a {\n  background-image: url(\"x{y}.png\");\n}\n"
        );
    }

    #[test]
    fn at_rule_statements_and_prelude_comments_are_kept() {
        let css = "@import url(\"base.css\");\n\n.a /* row */ {\n  gap: 8px;\n}\n\n\
                   .unused {\n  margin: 0;\n}\n";
        let outcome = prune(MARKUP, css);
        assert_eq!(outcome.removed, vec!["unused".to_string()]);
        assert_eq!(
            outcome.stylesheet,
            "@import url(\"base.css\");\n\n.a /* row */ {\n  gap: 8px;\n}\n"
        );
    }

    #[test]
    fn pruning_is_idempotent() {
        let css = ".a {\n  gap: 8px;\n}\n\n.c {\n  gap: 1px;\n}\n\n.d {\n  gap: 2px;\n}\n\n\
                   @media (max-width: 768px) {\n  .a {\n    gap: 0;\n  }\n}\n";
        let once = prune(MARKUP, css);
        let twice = prune(MARKUP, &once.stylesheet);
        assert_eq!(once.stylesheet, twice.stylesheet);
        assert!(twice.removed.is_empty());
        assert_eq!(once.removed.len(), 2);
    }
}
