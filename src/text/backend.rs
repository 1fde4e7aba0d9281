use image::RgbaImage;

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::ReactionResult;

/// Font variant requested by a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFace {
    Regular,
    Bold,
    Mono,
}

/// Text capability used by the fitter and the card renderer.
///
/// Implementations must be deterministic: the same arguments measure and draw identically.
pub trait TextBackend {
    /// Bounding size `(width, height)` of `text` laid out at `size_px`.
    fn measure(&mut self, text: &str, face: FontFace, size_px: f32) -> ReactionResult<(f64, f64)>;

    /// Draw `text` with its layout box's top-left corner at `origin`.
    fn draw(
        &mut self,
        canvas: &mut RgbaImage,
        text: &str,
        origin: Point,
        face: FontFace,
        size_px: f32,
        color: Rgba8,
    ) -> ReactionResult<()>;
}

/// Raw font file plus the face index inside it (non-zero for collections).
#[derive(Clone, Debug)]
pub struct FontSource {
    pub bytes: Vec<u8>,
    pub index: u32,
}

impl FontSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, index: 0 }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn read(path: &std::path::Path) -> ReactionResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font '{}'", path.display()))?;
        Ok(Self::new(bytes))
    }
}

/// Caller-supplied fonts. Missing bold and mono faces fall back to the regular face.
#[derive(Clone, Debug)]
pub struct FontSet {
    pub regular: FontSource,
    pub bold: Option<FontSource>,
    pub mono: Option<FontSource>,
}

impl FontSet {
    pub fn new(regular: FontSource) -> Self {
        Self {
            regular,
            bold: None,
            mono: None,
        }
    }

    pub fn with_bold(mut self, bold: FontSource) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_mono(mut self, mono: FontSource) -> Self {
        self.mono = Some(mono);
        self
    }

    /// Font used for `face`, and whether it is a dedicated face rather than the regular fallback.
    pub fn resolve(&self, face: FontFace) -> (&FontSource, bool) {
        let dedicated = match face {
            FontFace::Regular => None,
            FontFace::Bold => self.bold.as_ref(),
            FontFace::Mono => self.mono.as_ref(),
        };
        match dedicated {
            Some(src) => (src, true),
            None => (&self.regular, face == FontFace::Regular),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/backend.rs"]
mod tests;
