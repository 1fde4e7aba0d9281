use crate::foundation::core::Rect;
use crate::layout::boxes::{center_anchor, place_above, place_below};

/// Gap between the card and the footage stacked around it.
const FOOTAGE_GAP: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// 1080x1920: webcam above the card, screen below.
    Vertical,
    /// 1920x1080: full-width webcam, card in the bottom-right corner.
    Horizontal,
}

/// Where the card and the footage land on the output canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReactionLayout {
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
    pub card: Rect,
    pub webcam: Rect,
    /// Only the vertical layout shows the screen capture.
    pub screen: Option<Rect>,
}

impl ReactionLayout {
    pub fn vertical(card_w: u32, card_h: u32) -> Self {
        let (width, height) = (1080, 1920);
        let card = center_anchor(
            Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
            (f64::from(card_w), f64::from(card_h)),
        );
        let footage = widescreen(card_w);
        Self {
            orientation: Orientation::Vertical,
            width,
            height,
            card,
            webcam: place_above(card, footage, FOOTAGE_GAP),
            screen: Some(place_below(card, footage, FOOTAGE_GAP)),
        }
    }

    pub fn horizontal(card_w: u32, card_h: u32) -> Self {
        let (width, height) = (1920u32, 1080u32);
        let (w, h) = (f64::from(width), f64::from(height));
        let (_, webcam_h) = widescreen(width);
        Self {
            orientation: Orientation::Horizontal,
            width,
            height,
            card: Rect::new(w - f64::from(card_w), h - f64::from(card_h), w, h),
            webcam: Rect::new(0.0, 0.0, w, webcam_h),
            screen: None,
        }
    }

    pub fn new(orientation: Orientation, card_w: u32, card_h: u32) -> Self {
        match orientation {
            Orientation::Vertical => Self::vertical(card_w, card_h),
            Orientation::Horizontal => Self::horizontal(card_w, card_h),
        }
    }
}

fn widescreen(width: u32) -> (f64, f64) {
    let w = f64::from(width);
    (w, w * 9.0 / 16.0)
}

#[cfg(test)]
#[path = "../../tests/unit/reaction/layout.rs"]
mod tests;
