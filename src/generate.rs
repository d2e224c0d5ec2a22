//! Markup rendering.
//!
//! Renders the named tree as one HTML document using [Maud](https://maud.lambda.xyz/).
//! All interpolation goes through Maud, so layer names and text content are
//! escaped. Root children that are containers become `<section>`, text nodes
//! become `h1`–`h4` or `p`, resolved image nodes become `<img>`, and every
//! other container is a `<div>`.
//!
//! Class attribute order is fixed: identity, alias, then utilities.

use maud::{DOCTYPE, Markup, html};

use crate::config::MarkupConfig;
use crate::node::TextTag;
use crate::resolve::{Element, ResolvedNode};

/// Classes for a node's own element, or `None` for no `class` attribute.
pub fn class_list(node: &ResolvedNode) -> Option<String> {
    let mut classes: Vec<&str> = Vec::new();
    if node.classes.emit_identity && node.has_declarations() {
        classes.push(&node.classes.identity);
    }
    if let Some(alias) = &node.classes.alias {
        classes.push(alias);
    }
    classes.extend(node.classes.card_part);
    classes.extend(node.utilities.iter().copied());
    (!classes.is_empty()).then(|| classes.join(" "))
}

fn content_class_list(node: &ResolvedNode) -> Option<String> {
    let mut classes: Vec<String> = node.content_class().into_iter().collect();
    classes.extend(node.content_utilities.iter().map(|u| u.to_string()));
    (!classes.is_empty()).then(|| classes.join(" "))
}

/// Text with line and paragraph separators turned into `<br>`.
fn text_body(text: &str) -> Markup {
    let normalized = text.replace(['\u{2028}', '\u{2029}'], "\n");
    html! {
        @for (i, line) in normalized.split('\n').enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}

fn render_children(node: &ResolvedNode) -> Markup {
    html! {
        @for child in &node.children {
            (render_node(child))
        }
    }
}

/// Children, wrapped in the inner content element when the node was split.
fn container_body(node: &ResolvedNode) -> Markup {
    if node.content.is_some() {
        html! {
            div class=[content_class_list(node)] {
                (render_children(node))
            }
        }
    } else {
        render_children(node)
    }
}

pub fn render_node(node: &ResolvedNode) -> Markup {
    let class = class_list(node);
    match node.element {
        Element::Img => html! {
            img class=[class] src=[node.image_src.as_deref()] alt=(node.name);
        },
        Element::Text(tag) => {
            let body = text_body(node.text.as_deref().unwrap_or_default());
            match tag {
                TextTag::H1 => html! { h1 class=[class] { (body) } },
                TextTag::H2 => html! { h2 class=[class] { (body) } },
                TextTag::H3 => html! { h3 class=[class] { (body) } },
                TextTag::H4 => html! { h4 class=[class] { (body) } },
                TextTag::P => html! { p class=[class] { (body) } },
            }
        }
        Element::Section => html! {
            section class=[class] { (container_body(node)) }
        },
        Element::Div => html! {
            div class=[class] { (container_body(node)) }
        },
    }
}

/// Full HTML document for a named tree.
pub fn render_page(root: &ResolvedNode, config: &MarkupConfig) -> String {
    let title = config
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&root.name);
    html! {
        (DOCTYPE)
        html lang=(config.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(config.stylesheet_href);
            }
            body {
                (render_node(root))
            }
        }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::naming::assign_classes;
    use crate::noise;
    use crate::resolve::resolve;
    use crate::session::BuildSession;
    use crate::test_helpers::*;
    use crate::types::ImageMap;

    fn page(config: &BuildConfig, images: &ImageMap, tree: &crate::node::DesignNode) -> String {
        let mut session = BuildSession::new(config, images);
        let (retained, _) = noise::filter(tree, &config.noise);
        let mut root = resolve(&retained, &mut session);
        assign_classes(&mut root, &mut session);
        render_page(&root, &config.markup)
    }

    #[test]
    fn document_shell() {
        let config = BuildConfig::default();
        let root = named(column("1:1", 1200.0, vec![]), "Landing");
        let html = page(&config, &ImageMap::new(), &root);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("<title>Landing</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="style.css">"#));
    }

    #[test]
    fn configured_title_wins() {
        let mut config = BuildConfig::default();
        config.markup.title = Some("Home".into());
        let html = page(&config, &ImageMap::new(), &column("1:1", 1200.0, vec![]));
        assert!(html.contains("<title>Home</title>"));
    }

    #[test]
    fn sections_headings_and_paragraphs() {
        let config = BuildConfig::default();
        let mut heading = text("2:1", "Big title");
        if let Some(style) = heading.text_style.as_mut() {
            style.font_size = 40.0;
            style.font_weight = 700.0;
        }
        let tree = column(
            "1:1",
            1200.0,
            vec![column("1:2", 1200.0, vec![heading, text("2:2", "Line one\nLine two")])],
        );
        let html = page(&config, &ImageMap::new(), &tree);
        assert!(html.contains("<section class=\"n-1-2"));
        assert!(html.contains(">Big title</h1>"));
        assert!(html.contains(">Line one<br>Line two</p>"));
    }

    #[test]
    fn text_is_escaped() {
        let config = BuildConfig::default();
        let tree = column("1:1", 1200.0, vec![text("1:2", "<b>&</b>")]);
        let html = page(&config, &ImageMap::new(), &tree);
        assert!(html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }

    #[test]
    fn images_and_split_backgrounds() {
        let config = BuildConfig::default();
        let mut images = ImageMap::new();
        images.insert("2:1".into(), "images/2-1.png".into());
        images.insert("1:2".into(), "images/1-2.png".into());
        let mut hero = column("1:2", 1200.0, vec![named(image("2:1", 400.0, 300.0), "Photo")]);
        hero.fills.push(crate::node::Paint::Image { image_ref: None });
        let html = page(&config, &images, &column("1:1", 1200.0, vec![hero]));

        assert!(html.contains(r#"src="images/2-1.png" alt="Photo">"#));
        assert!(html.contains(r#"<div class="n-1-2__content fx-col">"#));
        assert!(html.contains("bg-fullbleed"));
    }

    #[test]
    fn class_order_is_identity_alias_utilities() {
        let config = BuildConfig::default();
        let hero = named(with_fill(row("1:2", 1200.0, vec![]), 1.0, 1.0, 1.0), "Hero");
        let html = page(&config, &ImageMap::new(), &column("1:1", 1200.0, vec![hero]));
        assert!(html.contains(r#"class="n-1-2 hero fx-row""#));
    }
}
