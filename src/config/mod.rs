//! Tunables for card geometry, caches and the encoder. Everything has a default and every
//! struct deserializes from a partial JSON document.

use std::path::{Path, PathBuf};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{ReactionError, ReactionResult};

/// Environment variable overriding [`RenderConfig::text_cache_capacity`].
pub const TEXT_CACHE_CAPACITY_ENV: &str = "REACTIONS_TEXT_CACHE_CAPACITY";

/// Card colors, straight RGBA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Palette {
    pub white: Rgba8,
    pub light_gray: Rgba8,
    /// Verdict still pending.
    pub yellow: Rgba8,
    /// Accepted.
    pub green: Rgba8,
    /// Rejected.
    pub red: Rgba8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            white: Rgba8::opaque(0xff, 0xff, 0xff),
            light_gray: Rgba8::opaque(0x3d, 0x3d, 0x3d),
            yellow: Rgba8::opaque(0xfd, 0xba, 0x12),
            green: Rgba8::opaque(0x1b, 0x80, 0x41),
            red: Rgba8::opaque(0xb2, 0x2c, 0x1b),
        }
    }
}

/// Pixel geometry of the scoreboard card.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub width: u32,
    pub height: u32,
    /// Space above the panel reserved for the rank badge.
    pub top_padding: f64,
    pub corner_radius: f64,
    pub logo_size: f64,
    pub logo_padding: f64,
    pub logo_gap: f64,
    pub content_padding: f64,
    pub row_gap: f64,
    pub column_gap: f64,
    pub badge_font_size: u32,
    pub badge_padding: u32,
    /// The status line is drawn this many pixels above its box.
    pub status_nudge: i64,
    pub palette: Palette,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 340,
            top_padding: 48.0,
            corner_radius: 48.0,
            logo_size: 152.0,
            logo_padding: 40.0,
            logo_gap: 32.0,
            content_padding: 16.0,
            row_gap: 20.0,
            column_gap: 16.0,
            badge_font_size: 40,
            badge_padding: 16,
            status_nudge: 5,
            palette: Palette::default(),
        }
    }
}

impl CardConfig {
    pub fn validate(&self) -> ReactionResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReactionError::validation("card width/height must be non-zero"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(ReactionError::validation("card width/height must be <= 65535"));
        }
        let lengths = [
            ("top_padding", self.top_padding),
            ("corner_radius", self.corner_radius),
            ("logo_size", self.logo_size),
            ("logo_padding", self.logo_padding),
            ("logo_gap", self.logo_gap),
            ("content_padding", self.content_padding),
            ("row_gap", self.row_gap),
            ("column_gap", self.column_gap),
        ];
        for (name, v) in lengths {
            if !v.is_finite() || v < 0.0 {
                return Err(ReactionError::validation(format!(
                    "card {name} must be finite and >= 0"
                )));
            }
        }
        if self.top_padding >= f64::from(self.height) {
            return Err(ReactionError::validation(
                "card top_padding must be smaller than its height",
            ));
        }
        if self.badge_font_size == 0 {
            return Err(ReactionError::validation("badge_font_size must be non-zero"));
        }
        Ok(())
    }

    /// Height of the colored panel below the badge strip.
    pub fn panel_height(&self) -> f64 {
        f64::from(self.height) - self.top_padding
    }
}

/// How the external encoder is invoked.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub program: PathBuf,
    /// Used to read the footage frame rate and duration.
    pub probe_program: PathBuf,
    pub video_codec: String,
    /// `None` writes no audio stream.
    pub audio_codec: Option<String>,
    pub log_level: String,
    /// Inherit the encoder's stderr instead of capturing it.
    pub verbose: bool,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            probe_program: PathBuf::from("ffprobe"),
            video_codec: "libx264".to_owned(),
            audio_codec: Some("aac".to_owned()),
            log_level: "error".to_owned(),
            verbose: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub card: CardConfig,
    pub text_cache_capacity: usize,
    pub badge_cache_capacity: usize,
    /// Length of the reveal animation window at the end of the footage.
    pub reveal_secs: f64,
    pub encoder: EncoderSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            card: CardConfig::default(),
            text_cache_capacity: 256,
            badge_cache_capacity: 64,
            reveal_secs: 30.0,
            encoder: EncoderSettings::default(),
        }
    }
}

impl RenderConfig {
    /// Parse a (possibly partial) JSON document.
    pub fn from_json_str(s: &str) -> ReactionResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| ReactionError::serde(format!("invalid render config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> ReactionResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Apply environment overrides. Unparseable or zero values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = std::env::var(TEXT_CACHE_CAPACITY_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.text_cache_capacity = n;
        }
        self
    }

    pub fn validate(&self) -> ReactionResult<()> {
        self.card.validate()?;
        if !self.reveal_secs.is_finite() || self.reveal_secs < 0.0 {
            return Err(ReactionError::validation("reveal_secs must be finite and >= 0"));
        }
        if self.encoder.video_codec.trim().is_empty() {
            return Err(ReactionError::validation("encoder video_codec must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/mod.rs"]
mod tests;
