use constants::nodes::GLYPH_MAX_CHARS;

use super::visual_node::{VisualNode, VisualizationKind};

/// Recognised image URL schemes.
const URL_SCHEMES: [&str; 4] = ["http://", "https://", "data:", "blob:"];

/// What the billboard ends up showing after the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedVisual {
    Image(String),
    Glyph(String),
    Sphere,
}

/// Treat `value` as a glyph unless it starts with a URL scheme or is longer
/// than four characters. A heuristic: short URLs and long emoji sequences
/// are misclassified.
pub fn is_glyph(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    let lower = value.to_ascii_lowercase();
    if URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return false;
    }
    value.chars().count() <= GLYPH_MAX_CHARS
}

/// Default glyph for a category, if it has one.
pub fn category_glyph(category: &str) -> Option<&'static str> {
    let glyph = match category.trim().to_ascii_lowercase().as_str() {
        "health" | "fitness" => "💪",
        "career" | "work" => "💼",
        "learning" | "education" => "📚",
        "finance" | "money" => "💰",
        "relationships" | "family" => "❤",
        "creativity" | "art" => "🎨",
        "travel" => "✈",
        "mindfulness" | "spirituality" => "🧘",
        "home" => "🏡",
        _ => return None,
    };
    Some(glyph)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Classify a raw string from either source field by the glyph heuristic.
fn classify(value: &str) -> ResolvedVisual {
    if is_glyph(value) {
        ResolvedVisual::Glyph(value.to_string())
    } else {
        ResolvedVisual::Image(value.to_string())
    }
}

/// Walk image URL → glyph → category glyph → sphere.
///
/// `Icon` nodes try the glyph before the image. Only an explicit `Sphere`
/// kind skips the chain.
pub fn resolve_visual(node: &VisualNode) -> ResolvedVisual {
    let image = non_empty(&node.image_url);
    let glyph = non_empty(&node.glyph);

    let ordered = match node.visualization_kind {
        VisualizationKind::Sphere => return ResolvedVisual::Sphere,
        VisualizationKind::Image => [image, glyph],
        VisualizationKind::Icon => [glyph, image],
    };

    if let Some(value) = ordered.into_iter().flatten().next() {
        return classify(value);
    }
    match category_glyph(&node.category) {
        Some(glyph) => ResolvedVisual::Glyph(glyph.to_string()),
        None => ResolvedVisual::Sphere,
    }
}
