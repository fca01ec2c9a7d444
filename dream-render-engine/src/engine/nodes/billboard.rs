use super::visual_kind::ResolvedVisual;

/// Load status of a billboard image as seen by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLoad {
    Pending,
    Loaded,
    Failed,
}

/// What a node's billboard currently renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillboardState {
    /// Image requested, not yet available. Drawn as the node-coloured plane.
    Loading,
    Image,
    Glyph(String),
    Sphere,
    /// Image failed; flat coloured plane at reduced opacity.
    FallbackPlane,
}

impl BillboardState {
    pub fn initial(visual: &ResolvedVisual) -> Self {
        match visual {
            ResolvedVisual::Image(_) => Self::Loading,
            ResolvedVisual::Glyph(glyph) => Self::Glyph(glyph.clone()),
            ResolvedVisual::Sphere => Self::Sphere,
        }
    }

    /// Fold one poll result in. Returns whether the state changed.
    pub fn observe(&mut self, load: ImageLoad) -> bool {
        if *self != Self::Loading {
            return false;
        }
        *self = match load {
            ImageLoad::Pending => return false,
            ImageLoad::Loaded => Self::Image,
            ImageLoad::Failed => Self::FallbackPlane,
        };
        true
    }

    pub fn awaits_image(&self) -> bool {
        *self == Self::Loading
    }

    pub fn shows_plane(&self) -> bool {
        matches!(self, Self::Loading | Self::Image | Self::FallbackPlane)
    }
}
