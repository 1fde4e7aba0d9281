use std::borrow::Cow;

use image::RgbaImage;

use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::ReactionResult;
use crate::layout::boxes::{center_anchor, place_grid};
use crate::raster::canvas::{resize_exact, transparent};
use crate::text::backend::{FontFace, TextBackend};
use crate::text::cache::floor_px;

const MEASURE_SIZE_PX: f64 = 10.0;
const MEASURE_FUDGE: f64 = 1.05;
const MAX_HORIZONTAL_COMPRESSION: f64 = 1.5;
const WRAP_MIN_CHARS: usize = 15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Knobs for [`fit_text`]. Text is always centered vertically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FitOptions {
    /// Upper bound on the chosen font size. `None` leaves only the box as a limit.
    pub max_size: Option<u32>,
    /// Break long text once, at the whitespace nearest its middle.
    pub multiline: bool,
    /// Allow up to 1.5x horizontal squeeze when the result is resized into the box.
    pub compress: bool,
    pub align: TextAlign,
    pub color: Rgba8,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_size: None,
            multiline: false,
            compress: false,
            align: TextAlign::Left,
            color: Rgba8::opaque(255, 255, 255),
        }
    }
}

impl FitOptions {
    pub fn max_size(mut self, px: u32) -> Self {
        self.max_size = Some(px);
        self
    }

    pub fn multiline(mut self, on: bool) -> Self {
        self.multiline = on;
        self
    }

    pub fn compress(mut self, on: bool) -> Self {
        self.compress = on;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn color(mut self, color: Rgba8) -> Self {
        self.color = color;
        self
    }
}

/// Render `text` at the largest integer size that fits `dims`, into a bitmap of exactly
/// `floor(w) x floor(h)`.
///
/// With compression enabled the text may be drawn up to 1.5x wider than the box and squeezed
/// back by the final resize.
pub fn fit_text(
    backend: &mut dyn TextBackend,
    text: &str,
    dims: (f64, f64),
    face: FontFace,
    options: FitOptions,
) -> ReactionResult<RgbaImage> {
    let (width, height) = (floor_px(dims.0), floor_px(dims.1));
    if text.is_empty() || width == 0 || height == 0 {
        return Ok(transparent(width, height));
    }

    let text: Cow<'_, str> = if options.multiline {
        wrap_at_middle(text)
    } else {
        Cow::Borrowed(text)
    };

    let (mw, mh) = backend.measure(&text, face, MEASURE_SIZE_PX as f32)?;
    let width_ratio = mw * MEASURE_FUDGE / MEASURE_SIZE_PX;
    let height_ratio = mh * MEASURE_FUDGE / MEASURE_SIZE_PX;
    let compression = if options.compress {
        MAX_HORIZONTAL_COMPRESSION
    } else {
        1.0
    };

    let mut limit = options.max_size.map_or(f64::INFINITY, f64::from);
    if width_ratio > 0.0 {
        limit = limit.min(f64::from(width) / width_ratio * compression);
    }
    if height_ratio > 0.0 {
        limit = limit.min(f64::from(height) / height_ratio);
    }
    if !limit.is_finite() {
        // Nothing measurable to draw (e.g. whitespace only) and no explicit cap.
        return Ok(transparent(width, height));
    }
    let size = limit.floor().max(1.0);

    let canvas_w = width.max(floor_px(size * width_ratio));
    let canvas_h = height.max(floor_px(size * height_ratio));
    let mut canvas = transparent(canvas_w, canvas_h);

    let size_px = size as f32;
    let measured = backend.measure(&text, face, size_px)?;
    let slot = place_grid(center_anchor(
        Rect::new(0.0, 0.0, f64::from(canvas_w), f64::from(canvas_h)),
        measured,
    ));
    let x = match options.align {
        TextAlign::Left => 0,
        TextAlign::Center => slot.left,
    };
    backend.draw(
        &mut canvas,
        &text,
        Point::new(x as f64, slot.top as f64),
        face,
        size_px,
        options.color,
    )?;

    Ok(resize_exact(&canvas, width, height))
}

/// Replace the whitespace character closest to the middle of `text` with a line break.
///
/// Short text (under 15 characters) and text without whitespace are returned unchanged.
pub fn wrap_at_middle(text: &str) -> Cow<'_, str> {
    let len = text.chars().count();
    if len < WRAP_MIN_CHARS {
        return Cow::Borrowed(text);
    }
    let mid = len / 2;
    let best = text
        .char_indices()
        .enumerate()
        .filter(|(_, (_, c))| c.is_whitespace())
        .min_by_key(|(i, _)| i.abs_diff(mid))
        .map(|(_, (byte, c))| (byte, c.len_utf8()));
    match best {
        Some((byte, n)) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..byte]);
            out.push('\n');
            out.push_str(&text[byte + n..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fit.rs"]
mod tests;
