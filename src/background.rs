//! Background compositor.
//!
//! Folds a node's paint stack into one CSS background. Paints arrive
//! bottom-most first; CSS lists `background-image` layers top-most first, so
//! the stack is reversed on the way out.
//!
//! ```text
//! paints (bottom → top)          CSS
//! ─────────────────────          ───────────────────────────────────────
//! SOLID #fff                  →  background-color: #ffffff
//! GRADIENT_LINEAR             →  background-image: url(...),
//! SOLID rgba(0,0,0,.4)        →      linear-gradient(rgba(0, 0, 0, 0.4), ...),
//! IMAGE                       →      linear-gradient(90deg, ...)
//! ```
//!
//! The image is always the top-most layer. Image paths come from the
//! caller's [`ImageMap`](crate::types::ImageMap); in offline mode remote URLs
//! are refused.

use crate::node::{DesignNode, Effect, GradientKind, GradientStop, Paint};
use crate::session::{BuildSession, DiagnosticKind};
use crate::types::{num, px};

/// Composited background declarations for one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composite {
    pub declarations: Vec<(&'static str, String)>,
    /// An image layer was emitted.
    pub has_image: bool,
}

impl Composite {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

fn is_remote(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Local path of a node's image, if the caller supplied a usable one.
///
/// Entries are keyed by node id, or by the file-safe form of it
/// (`7291:125581` → `7291-125581`). Missing and refused images are recorded
/// as diagnostics.
pub fn resolve_image(node: &DesignNode, session: &mut BuildSession) -> Option<String> {
    let entry = session
        .images
        .get(&node.id)
        .or_else(|| session.images.get(&node.id.replace([':', ';'], "-")));
    match entry {
        Some(path) if session.config.images.offline && is_remote(path) => {
            let message = format!("remote image {path} refused in offline mode");
            session.diagnose(DiagnosticKind::UnresolvedImage, &node.id, message);
            None
        }
        Some(path) => Some(path.clone()),
        None => {
            session.diagnose(
                DiagnosticKind::UnresolvedImage,
                &node.id,
                "no local image supplied",
            );
            None
        }
    }
}

fn stops_css(stops: &[GradientStop]) -> String {
    stops
        .iter()
        .map(|s| format!("{} {}%", s.color.to_css(), num(s.position * 100.0)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn gradient_css(kind: GradientKind, angle_deg: f64, stops: &[GradientStop]) -> Option<String> {
    if stops.is_empty() {
        return None;
    }
    let stops = stops_css(stops);
    Some(match kind {
        GradientKind::Linear => format!("linear-gradient({}deg, {stops})", num(angle_deg)),
        GradientKind::Radial => format!("radial-gradient({stops})"),
        GradientKind::Angular => format!("conic-gradient({stops})"),
    })
}

/// Composite a paint stack.
///
/// `image_url` is the resolved path for an image paint; without one the
/// image layer is skipped.
pub fn composite(paints: &[Paint], effects: &[Effect], image_url: Option<&str>) -> Composite {
    let mut out = Composite::default();
    let mut base_color = None;
    let mut layers = Vec::new();
    let mut image_layer = None;

    for paint in paints {
        match paint {
            Paint::Solid(color) if base_color.is_none() => base_color = Some(color.to_css()),
            Paint::Solid(color) => {
                let c = color.to_css();
                layers.push(format!("linear-gradient({c}, {c})"));
            }
            Paint::Gradient {
                kind,
                angle_deg,
                stops,
            } => layers.extend(gradient_css(*kind, *angle_deg, stops)),
            Paint::Image { .. } => {
                if let Some(url) = image_url {
                    image_layer = Some(format!("url(\"{url}\")"));
                }
            }
        }
    }

    if let Some(color) = base_color {
        out.declarations.push(("background-color", color));
    }
    layers.reverse();
    if let Some(image) = image_layer {
        layers.insert(0, image);
        out.has_image = true;
    }
    if !layers.is_empty() {
        out.declarations.push(("background-image", layers.join(", ")));
    }
    if out.has_image {
        out.declarations.push(("background-size", "cover".to_string()));
        out.declarations
            .push(("background-position", "center".to_string()));
        out.declarations
            .push(("background-repeat", "no-repeat".to_string()));
    }

    for effect in effects {
        if let Effect::BackgroundBlur { radius } = effect {
            let blur = format!("blur({})", px(*radius));
            out.declarations.push(("backdrop-filter", blur.clone()));
            out.declarations.push(("-webkit-backdrop-filter", blur));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::node::Color;
    use crate::test_helpers::*;
    use crate::types::ImageMap;

    fn solid(r: f64, g: f64, b: f64) -> Paint {
        Paint::Solid(Color::rgb(r, g, b))
    }

    fn linear() -> Paint {
        Paint::Gradient {
            kind: GradientKind::Linear,
            angle_deg: 90.0,
            stops: vec![
                GradientStop {
                    color: Color::rgb(1.0, 1.0, 1.0),
                    position: 0.0,
                },
                GradientStop {
                    color: Color::rgb(0.0, 0.0, 0.0),
                    position: 1.0,
                },
            ],
        }
    }

    fn get<'a>(c: &'a Composite, prop: &str) -> Option<&'a str> {
        c.declarations
            .iter()
            .find(|(p, _)| *p == prop)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn single_solid_is_background_color() {
        let c = composite(&[solid(1.0, 0.0, 0.0)], &[], None);
        assert_eq!(get(&c, "background-color"), Some("#ff0000"));
        assert_eq!(get(&c, "background-image"), None);
    }

    #[test]
    fn gradient_layers_above_base_color() {
        let c = composite(&[solid(1.0, 1.0, 1.0), linear()], &[], None);
        assert_eq!(get(&c, "background-color"), Some("#ffffff"));
        assert_eq!(
            get(&c, "background-image"),
            Some("linear-gradient(90deg, #ffffff 0%, #000000 100%)")
        );
    }

    #[test]
    fn image_is_top_most_layer() {
        let paints = vec![
            solid(1.0, 1.0, 1.0),
            Paint::Image { image_ref: None },
            linear(),
            solid(0.0, 0.0, 0.0),
        ];
        let c = composite(&paints, &[], Some("images/1-2.png"));
        assert!(c.has_image);
        assert_eq!(
            get(&c, "background-image"),
            Some(
                "url(\"images/1-2.png\"), linear-gradient(#000000, #000000), \
                 linear-gradient(90deg, #ffffff 0%, #000000 100%)"
            )
        );
        assert_eq!(get(&c, "background-size"), Some("cover"));
        assert_eq!(get(&c, "background-repeat"), Some("no-repeat"));
    }

    #[test]
    fn image_without_path_is_skipped() {
        let c = composite(&[Paint::Image { image_ref: None }], &[], None);
        assert!(!c.has_image);
        assert!(c.is_empty());
    }

    #[test]
    fn backdrop_blur_has_prefixed_twin() {
        let c = composite(&[], &[Effect::BackgroundBlur { radius: 8.0 }], None);
        assert_eq!(get(&c, "backdrop-filter"), Some("blur(8px)"));
        assert_eq!(get(&c, "-webkit-backdrop-filter"), Some("blur(8px)"));
        assert_eq!(get(&c, "filter"), None);
    }

    #[test]
    fn offline_mode_refuses_remote_images() {
        let config = BuildConfig::default();
        let mut images = ImageMap::new();
        images.insert("1:2".to_string(), "https://cdn.example/x.png".to_string());
        let mut session = BuildSession::new(&config, &images);

        let node = image("1:2", 100.0, 100.0);
        assert_eq!(resolve_image(&node, &mut session), None);
        assert_eq!(session.diagnostics.len(), 1);
        assert_eq!(session.diagnostics[0].kind, DiagnosticKind::UnresolvedImage);
    }

    #[test]
    fn local_images_resolve() {
        let config = BuildConfig::default();
        let mut images = ImageMap::new();
        images.insert("1:2".to_string(), "images/1-2.png".to_string());
        let mut session = BuildSession::new(&config, &images);

        let node = image("1:2", 100.0, 100.0);
        assert_eq!(
            resolve_image(&node, &mut session).as_deref(),
            Some("images/1-2.png")
        );
        assert!(session.diagnostics.is_empty());
    }

    #[test]
    fn file_safe_keys_resolve() {
        let config = BuildConfig::default();
        let mut images = ImageMap::new();
        images.insert("7291-125581".to_string(), "images/7291-125581.png".to_string());
        let mut session = BuildSession::new(&config, &images);
        let node = image("7291:125581", 100.0, 100.0);
        assert_eq!(
            resolve_image(&node, &mut session).as_deref(),
            Some("images/7291-125581.png")
        );
    }

    #[test]
    fn missing_image_is_diagnosed() {
        let config = BuildConfig::default();
        let images = ImageMap::new();
        let mut session = BuildSession::new(&config, &images);
        assert_eq!(resolve_image(&image("9:9", 10.0, 10.0), &mut session), None);
        assert_eq!(session.diagnostics.len(), 1);
    }
}
