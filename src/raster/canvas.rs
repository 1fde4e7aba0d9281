use image::RgbaImage;

use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{ReactionError, ReactionResult};
use crate::foundation::math::premul_over_straight_px;

/// Fully transparent canvas. Zero dimensions are allowed.
pub fn transparent(width: u32, height: u32) -> RgbaImage {
    RgbaImage::new(width, height)
}

/// Alpha-composite `src` onto `dst` with its top-left corner at `(x, y)`.
///
/// Parts of `src` that fall outside `dst` are clipped.
pub fn paste_with_alpha(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    image::imageops::overlay(dst, src, x, y);
}

/// Resize to exactly `width x height`. Zero-area targets return an empty canvas.
pub fn resize_exact(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if width == 0 || height == 0 {
        return transparent(width, height);
    }
    if src.width() == width && src.height() == height {
        return src.clone();
    }
    if src.width() == 0 || src.height() == 0 {
        return transparent(width, height);
    }
    image::imageops::resize(src, width, height, image::imageops::FilterType::CatmullRom)
}

/// Run `draw` against a `vello_cpu` context sized like `canvas`, then composite the result over it.
///
/// `vello_cpu` renders premultiplied pixels; the canvas stays straight-alpha.
pub fn paint_onto(
    canvas: &mut RgbaImage,
    draw: impl FnOnce(&mut vello_cpu::RenderContext) -> ReactionResult<()>,
) -> ReactionResult<()> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Ok(());
    }
    let width = u16::try_from(canvas.width())
        .map_err(|_| ReactionError::render("canvas width exceeds 65535"))?;
    let height = u16::try_from(canvas.height())
        .map_err(|_| ReactionError::render("canvas height exceeds 65535"))?;

    let mut ctx = vello_cpu::RenderContext::new(width, height);
    draw(&mut ctx)?;
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    ctx.render_to_pixmap(&mut pixmap);

    for (dst, src) in canvas
        .as_mut()
        .chunks_exact_mut(4)
        .zip(pixmap.data_as_u8_slice().chunks_exact(4))
    {
        premul_over_straight_px(dst, src);
    }
    Ok(())
}

pub(crate) fn cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Fill a rounded rectangle. The radius is clamped by the shape to half the shorter side.
pub fn fill_rounded_rect(
    canvas: &mut RgbaImage,
    rect: Rect,
    radius: f64,
    color: Rgba8,
) -> ReactionResult<()> {
    if rect.width() <= 0.0 || rect.height() <= 0.0 || color.a == 0 {
        return Ok(());
    }
    paint_onto(canvas, |ctx| {
        let rr =
            vello_cpu::kurbo::RoundedRect::new(rect.x0, rect.y0, rect.x1, rect.y1, radius.max(0.0));
        let mut path = vello_cpu::kurbo::BezPath::new();
        for el in vello_cpu::kurbo::Shape::path_elements(&rr, 0.1) {
            path.push(el);
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(cpu_color(color));
        ctx.fill_path(&path);
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/raster/canvas.rs"]
mod tests;
