use image::RgbaImage;

use crate::animation::ease::Ease;
use crate::animation::interp::Keyframes;
use crate::config::CardConfig;
use crate::foundation::core::{Fps, Rgba8};
use crate::foundation::error::{ReactionError, ReactionResult};
use crate::raster::canvas::{resize_exact, transparent};

/// Flat submission record shown on a card.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardFields {
    /// Team display name.
    pub title: String,
    /// Team full name.
    pub subtitle: String,
    pub hashtag: String,
    /// Problem label, e.g. `"C"`.
    pub task: String,
    /// Verdict short name, e.g. `"AC"` or `"WA"`.
    pub outcome: String,
    pub success: bool,
    /// Contest time of the submission in milliseconds.
    pub time_ms: f64,
    pub rank_before: u32,
    pub rank_after: u32,
}

impl CardFields {
    pub fn validate(&self) -> ReactionResult<()> {
        if !self.time_ms.is_finite() || self.time_ms < 0.0 {
            return Err(ReactionError::validation(
                "submission time must be finite and >= 0",
            ));
        }
        if self.rank_before == 0 || self.rank_after == 0 {
            return Err(ReactionError::validation("ranks start at 1"));
        }
        Ok(())
    }
}

/// Immutable per-job card state. Everything that varies per frame is derived from it.
#[derive(Clone, Debug)]
pub struct Card {
    pub(crate) fields: CardFields,
    pub(crate) logo: RgbaImage,
    pub(crate) animation_start: u64,
    pub(crate) fps: Fps,
    pub(crate) config: CardConfig,
    pub(crate) rank_track: Keyframes,
    pub(crate) badge_track: Keyframes,
}

impl Card {
    /// Validate inputs, fit the logo once and build the rank/badge tracks around
    /// `animation_start`.
    pub fn new(
        fields: CardFields,
        logo: &RgbaImage,
        animation_start: u64,
        fps: Fps,
        config: CardConfig,
    ) -> ReactionResult<Self> {
        fields.validate()?;
        config.validate()?;

        let a = animation_start as f64;
        let before = f64::from(fields.rank_before);
        let (rank_track, badge_track) = if fields.success {
            let times = vec![a - 15.0, a + 5.0];
            (
                Keyframes::new(
                    times.clone(),
                    vec![before, f64::from(fields.rank_after)],
                    Ease::Linear,
                )?,
                Keyframes::new(times, vec![1.0, 0.0], Ease::InOutQuad)?,
            )
        } else {
            let times = vec![a - 15.0, a, a + 6.0];
            (
                Keyframes::new(times.clone(), vec![before, 1.0, before], Ease::Linear)?,
                Keyframes::new(times, vec![1.0, 0.7, 1.0], Ease::InOutSine)?,
            )
        };

        let logo = fit_logo(logo, config.logo_size, config.panel_height());
        Ok(Self {
            fields,
            logo,
            animation_start,
            fps,
            config,
            rank_track,
            badge_track,
        })
    }

    pub fn fields(&self) -> &CardFields {
        &self.fields
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn animation_start(&self) -> u64 {
        self.animation_start
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Logo as prepared for the logo slot.
    pub fn logo(&self) -> &RgbaImage {
        &self.logo
    }
}

/// Logo from an image file, or a solid square for a `#rrggbb` source.
pub fn load_logo(source: &str, size: u32) -> ReactionResult<RgbaImage> {
    use anyhow::Context as _;

    if source.starts_with('#') {
        let color = Rgba8::from_hex(source)?;
        return Ok(RgbaImage::from_pixel(size, size, image::Rgba(color.to_array())));
    }
    let lower = source.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Err(ReactionError::validation(format!(
            "remote logo '{source}' must be downloaded first"
        )));
    }
    let img = image::open(source).with_context(|| format!("failed to read logo '{source}'"))?;
    Ok(img.to_rgba8())
}

/// Scale `logo` to fill `max_h` or `max_w` (whichever binds first), then shrink it to fit
/// inside `max_w x max_h` keeping its aspect ratio.
pub fn fit_logo(logo: &RgbaImage, max_w: f64, max_h: f64) -> RgbaImage {
    let (w, h) = logo.dimensions();
    if w == 0 || h == 0 || max_w <= 0.0 || max_h <= 0.0 {
        return transparent(0, 0);
    }
    let factor = (max_h / f64::from(h)).min(max_w / f64::from(w));
    let scaled_w = (f64::from(w) * factor).ceil().max(1.0) as u32;
    let scaled_h = (f64::from(h) * factor).ceil().max(1.0) as u32;
    let scaled = resize_exact(logo, scaled_w, scaled_h);

    let (bound_w, bound_h) = (max_w.floor() as u32, max_h.floor() as u32);
    if scaled_w <= bound_w && scaled_h <= bound_h {
        return scaled;
    }
    let shrink =
        (f64::from(bound_w) / f64::from(scaled_w)).min(f64::from(bound_h) / f64::from(scaled_h));
    let thumb_w = (f64::from(scaled_w) * shrink).round().max(1.0) as u32;
    let thumb_h = (f64::from(scaled_h) * shrink).round().max(1.0) as u32;
    resize_exact(&scaled, thumb_w.min(bound_w.max(1)), thumb_h.min(bound_h.max(1)))
}

#[cfg(test)]
#[path = "../../tests/unit/card/model.rs"]
mod tests;
