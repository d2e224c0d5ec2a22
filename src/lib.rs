//! # figflow
//!
//! Translates one frame of a design-tool JSON export into semantic, responsive
//! HTML and CSS. Auto-layout becomes flexbox and fixed widths become flex bases.
//! Nothing is absolutely positioned, so the page reflows like hand-written
//! markup instead of a pixel-pinned screenshot.
//!
//! # Architecture: Fixed Pipeline
//!
//! Every build runs the same stages in the same order:
//!
//! ```text
//! 1. Load      JSON        →  DesignNode       (unwrap export, find frame, validate)
//! 2. Filter    DesignNode  →  retained tree    (drop invisible and decorative nodes)
//! 3. Resolve   retained    →  ResolvedNode     (sizing, spacing, style, backgrounds)
//! 4. Flatten   resolved    →  resolved         (optional: drop no-op wrappers)
//! 5. Name      resolved    →  named            (identity classes, aliases)
//! 6. Emit      named       →  markup + CSS     (maud, rule per styled node)
//! 7. Prune     markup+CSS  →  CSS              (drop rules for unused classes)
//! 8. Report    session     →  JSON reports     (style, alias, waste)
//! ```
//!
//! Each heuristic is an independent function over immutable inputs that
//! returns a decision plus an optional diagnostic. The stages are composed
//! only in [`pipeline::build`]. Counters, alias tables and diagnostics live in
//! a [`session::BuildSession`] created per build and passed by reference, so
//! builds never share state.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`node`] | Design node model, JSON conversion, frame lookup |
//! | [`config`] | `figflow.toml` loading, merging, validation, stock file |
//! | [`types`] | Shared layout types: contexts, padding, sizing directives, styles |
//! | [`noise`] | Noise filter: invisible and tiny absolutely-positioned nodes |
//! | [`sizing`] | Sizing resolver, including two-column analysis |
//! | [`spacing`] | Gap and padding normalization |
//! | [`style`] | Style collector with fidelity-scope gating |
//! | [`background`] | Paint-stack compositor and image resolution |
//! | [`resolve`] | Top-down resolution into the resolved tree |
//! | [`flatten`] | Wrapper flattener |
//! | [`naming`] | Identity classes, aliases, semantic roles |
//! | [`css`] | Stylesheet emitter and shared utility rules |
//! | [`generate`] | Markup rendering with Maud |
//! | [`prune`] | Unused-selector pruner |
//! | [`report`] | Style, alias and waste reports |
//! | [`session`] | Per-build state and diagnostics |
//! | [`pipeline`] | Stage order, `build`, `BuildOutput` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Identity Classes First
//!
//! Every styled element carries an `n-<id>` class that is unique within the
//! build, and each node's rule is keyed on it. Human-readable aliases are
//! layered on top and only become selectors when a single node holds them, so
//! two "card" layers with different declarations never merge under `.card`.
//!
//! ## Fidelity Scopes
//!
//! Declarations are tagged with the lowest scope that permits them
//! (conservative, standard, aggressive). A withheld declaration is never an
//! error: it is counted in the style report, so a reviewer can see exactly
//! what a stricter scope cost.
//!
//! ## Maud Over Template Engines
//!
//! Markup is generated with [Maud](https://maud.lambda.xyz/). Layer names and
//! text content come from an untrusted export, and Maud escapes every
//! interpolation by default.
//!
//! ## Deterministic Output
//!
//! Traversal is document order, report maps are `BTreeMap`s, and the pruner
//! copies kept CSS verbatim. Two builds of the same input produce identical
//! bytes, which [`pipeline::BuildOutput::fingerprint`] makes easy to check.

pub mod background;
pub mod config;
pub mod css;
pub mod flatten;
pub mod generate;
pub mod naming;
pub mod node;
pub mod noise;
pub mod output;
pub mod pipeline;
pub mod prune;
pub mod report;
pub mod resolve;
pub mod session;
pub mod sizing;
pub mod spacing;
pub mod style;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
