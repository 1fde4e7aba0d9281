use image::RgbaImage;

use crate::card::model::Card;
use crate::card::timeline::{CardFrameState, badge_text};
use crate::config::{CardConfig, RenderConfig};
use crate::encode::sink::FrameRGBA;
use crate::foundation::core::{FrameIndex, Point, Rect, Rgba8};
use crate::foundation::error::ReactionResult;
use crate::layout::boxes::{center_anchor, dimensions, place_grid, split_horizontal, split_vertical};
use crate::raster::canvas::{fill_rounded_rect, paste_with_alpha, transparent};
use crate::text::backend::{FontFace, TextBackend};
use crate::text::cache::{LruCache, TextFitCache, fit_text_cached};
use crate::text::fit::{FitOptions, TextAlign};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BadgeKey {
    rank: u32,
    font_size: u32,
    padding: u32,
    radius_bits: u64,
    fill: Rgba8,
    ink: Rgba8,
}

/// Slots of the card content area, in card pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardSlots {
    pub logo: Rect,
    pub title: Rect,
    pub task: Rect,
    pub subtitle: Rect,
    pub status: Rect,
}

impl CardSlots {
    /// Logo on the left; title/task over subtitle/status on the right.
    pub fn compute(cfg: &CardConfig) -> Self {
        let (w, h) = (f64::from(cfg.width), f64::from(cfg.height));
        let (logo, content) = split_horizontal(
            Rect::new(0.0, cfg.top_padding, w, h),
            cfg.logo_size,
            cfg.logo_padding,
            cfg.logo_gap,
        );
        let (top_row, bottom_row) =
            split_vertical(content, h / 2.0, cfg.content_padding, cfg.row_gap);
        let column = w / 2.0 - cfg.content_padding;
        let (title, task) = split_horizontal(top_row, column, 0.0, cfg.column_gap);
        let (subtitle, status) = split_horizontal(bottom_row, column, 0.0, cfg.column_gap);
        Self {
            logo,
            title,
            task,
            subtitle,
            status,
        }
    }
}

/// Composes card frames. Holds the text backend and the bitmap caches.
pub struct CardRenderer<B> {
    backend: B,
    text_cache: TextFitCache,
    badge_cache: LruCache<BadgeKey, RgbaImage>,
}

impl<B: TextBackend> CardRenderer<B> {
    pub fn new(backend: B, cfg: &RenderConfig) -> Self {
        Self {
            backend,
            text_cache: TextFitCache::new(cfg.text_cache_capacity),
            badge_cache: LruCache::new(cfg.badge_cache_capacity),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn text_cache(&self) -> &TextFitCache {
        &self.text_cache
    }

    pub fn render_frame(&mut self, card: &Card, frame: FrameIndex) -> ReactionResult<FrameRGBA> {
        self.render_image(card, frame).map(FrameRGBA::from_image)
    }

    pub fn render_image(&mut self, card: &Card, frame: FrameIndex) -> ReactionResult<RgbaImage> {
        let state = card.sample(frame);
        self.compose(card, &state)
    }

    /// Draw one frame from an already sampled state.
    pub fn compose(&mut self, card: &Card, state: &CardFrameState) -> ReactionResult<RgbaImage> {
        let cfg = &card.config;
        let (w, h) = (cfg.width, cfg.height);
        let mut image = transparent(w, h);

        fill_rounded_rect(
            &mut image,
            Rect::new(0.0, cfg.top_padding, f64::from(w), f64::from(h)),
            cfg.corner_radius,
            state.background,
        )?;

        let badge = self.badge(cfg, state.rank)?;
        let badge_x =
            ((f64::from(w) - f64::from(badge.width())) * state.badge_offset).round_ties_even();
        paste_with_alpha(&mut image, badge, badge_x as i64, 0);

        let slots = CardSlots::compute(cfg);
        let logo = &card.logo;
        let logo_at = place_grid(center_anchor(
            slots.logo,
            (f64::from(logo.width()), f64::from(logo.height())),
        ));
        paste_with_alpha(&mut image, logo, logo_at.left, logo_at.top);

        let fields = &card.fields;
        let white = cfg.palette.white;
        self.draw_fitted(
            &mut image,
            &fields.title,
            slots.title,
            FontFace::Bold,
            FitOptions::default().multiline(true).compress(true).color(white),
            0,
        )?;
        self.draw_fitted(
            &mut image,
            &format!("{} {}", fields.subtitle, fields.hashtag),
            slots.subtitle,
            FontFace::Regular,
            FitOptions::default().compress(true).max_size(32).color(white),
            0,
        )?;
        self.draw_fitted(
            &mut image,
            &fields.task,
            slots.task,
            FontFace::Bold,
            FitOptions::default().align(TextAlign::Center).color(white),
            0,
        )?;
        self.draw_fitted(
            &mut image,
            &format!("{} {}", state.status, state.clock),
            slots.status,
            FontFace::Mono,
            FitOptions::default().align(TextAlign::Center).max_size(32).color(white),
            cfg.status_nudge,
        )?;

        Ok(image)
    }

    fn draw_fitted(
        &mut self,
        image: &mut RgbaImage,
        text: &str,
        slot: Rect,
        face: FontFace,
        options: FitOptions,
        nudge_up: i64,
    ) -> ReactionResult<()> {
        let fitted = fit_text_cached(
            &mut self.text_cache,
            &mut self.backend,
            text,
            dimensions(slot),
            face,
            options,
        )?;
        let at = place_grid(slot);
        paste_with_alpha(image, fitted, at.left, at.top - nudge_up);
        Ok(())
    }

    /// `"{n}{ordinal} place"` on a rounded pill, cached per rank and style.
    fn badge(&mut self, cfg: &CardConfig, rank: u32) -> ReactionResult<&RgbaImage> {
        let key = BadgeKey {
            rank,
            font_size: cfg.badge_font_size,
            padding: cfg.badge_padding,
            radius_bits: cfg.corner_radius.to_bits(),
            fill: cfg.palette.light_gray,
            ink: cfg.palette.white,
        };
        let backend = &mut self.backend;
        self.badge_cache.get_or_try_insert_with(key, || {
            render_badge(backend, cfg, rank)
        })
    }
}

fn render_badge<B: TextBackend>(
    backend: &mut B,
    cfg: &CardConfig,
    rank: u32,
) -> ReactionResult<RgbaImage> {
    let text = badge_text(rank);
    let size_px = cfg.badge_font_size as f32;
    let (tw, th) = backend.measure(&text, FontFace::Regular, size_px)?;
    let pad = f64::from(cfg.badge_padding);
    let bw = (tw + pad * 2.0).ceil().max(1.0) as u32;
    let bh = (th + pad * 2.0).ceil().max(1.0) as u32;

    let mut badge = transparent(bw, bh);
    fill_rounded_rect(
        &mut badge,
        Rect::new(0.0, 0.0, f64::from(bw), f64::from(bh)),
        cfg.corner_radius,
        cfg.palette.light_gray,
    )?;
    backend.draw(
        &mut badge,
        &text,
        Point::new(pad, pad),
        FontFace::Regular,
        size_px,
        cfg.palette.white,
    )?;
    Ok(badge)
}

#[cfg(test)]
#[path = "../../tests/unit/card/render.rs"]
mod tests;
