//! Pure geometry over axis-aligned boxes.
//!
//! Boxes are [`Rect`] values (`x0`/`y0` = left/top, `x1`/`y1` = right/bottom). Every function
//! returns a new box; nothing is resized in place. Zero-area boxes are valid input everywhere.

use crate::foundation::core::Rect;

/// Integer pixel bounds produced by [`place_grid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelBox {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PixelBox {
    pub fn width(self) -> u32 {
        (self.right - self.left).clamp(0, i64::from(u32::MAX)) as u32
    }

    pub fn height(self) -> u32 {
        (self.bottom - self.top).clamp(0, i64::from(u32::MAX)) as u32
    }

    pub fn area(self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }
}

/// Width and height of `b`.
pub fn dimensions(b: Rect) -> (f64, f64) {
    (b.x1 - b.x0, b.y1 - b.y0)
}

/// Split `b` into a left child of `width` and a right child with the remainder.
///
/// `padding` is removed from both outer edges, `gap` separates the children.
pub fn split_horizontal(b: Rect, width: f64, padding: f64, gap: f64) -> (Rect, Rect) {
    let left = Rect::new(b.x0 + padding, b.y0, b.x0 + padding + width, b.y1);
    let right = Rect::new(left.x1 + gap, b.y0, b.x1 - padding, b.y1);
    (left, right)
}

/// Split `b` into a top child of `height` and a bottom child with the remainder.
pub fn split_vertical(b: Rect, height: f64, padding: f64, gap: f64) -> (Rect, Rect) {
    let top = Rect::new(b.x0, b.y0 + padding, b.x1, b.y0 + padding + height);
    let bottom = Rect::new(b.x0, top.y1 + gap, b.x1, b.y1 - padding);
    (top, bottom)
}

/// Box of `dims` centered in `b`. Overflows `b` when `dims` is larger.
pub fn center_anchor(b: Rect, dims: (f64, f64)) -> Rect {
    let (width, height) = dims;
    let left = (b.x0 + b.x1 - width) / 2.0;
    let top = (b.y0 + b.y1 - height) / 2.0;
    Rect::new(left, top, left + width, top + height)
}

/// Box of `dims` horizontally centered on `b`, ending `gap` above its top edge.
pub fn place_above(b: Rect, dims: (f64, f64), gap: f64) -> Rect {
    let (width, height) = dims;
    Rect::new(
        (b.x0 + b.x1 - width) / 2.0,
        b.y0 - height - gap,
        (b.x0 + b.x1 + width) / 2.0,
        b.y0 - gap,
    )
}

/// Box of `dims` horizontally centered on `b`, starting `gap` below its bottom edge.
pub fn place_below(b: Rect, dims: (f64, f64), gap: f64) -> Rect {
    let (width, height) = dims;
    Rect::new(
        (b.x0 + b.x1 - width) / 2.0,
        b.y1 + gap,
        (b.x0 + b.x1 + width) / 2.0,
        b.y1 + height + gap,
    )
}

/// Snap `b` to the pixel grid: ceil on the near edges, floor on the far edges.
///
/// The result never covers a pixel outside `b`.
pub fn place_grid(b: Rect) -> PixelBox {
    PixelBox {
        left: b.x0.ceil() as i64,
        top: b.y0.ceil() as i64,
        right: b.x1.floor() as i64,
        bottom: b.y1.floor() as i64,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/boxes.rs"]
mod tests;
