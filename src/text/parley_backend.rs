use image::RgbaImage;

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{ReactionError, ReactionResult};
use crate::raster::canvas::{cpu_color, paint_onto};
use crate::text::backend::{FontFace, FontSet, TextBackend};

type Brush = [u8; 4];

struct LoadedFace {
    family: String,
    font: vello_cpu::peniko::FontData,
    request_bold: bool,
}

/// [`TextBackend`] that shapes with Parley and rasterizes glyph runs with `vello_cpu`.
pub struct ParleyTextBackend {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Brush>,
    regular: LoadedFace,
    bold: LoadedFace,
    mono: LoadedFace,
}

impl ParleyTextBackend {
    /// Register every font in `fonts`. Fails when a font yields no family.
    pub fn new(fonts: &FontSet) -> ReactionResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let regular = load_face(&mut font_ctx, fonts, FontFace::Regular)?;
        let bold = load_face(&mut font_ctx, fonts, FontFace::Bold)?;
        let mono = load_face(&mut font_ctx, fonts, FontFace::Mono)?;
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            regular,
            bold,
            mono,
        })
    }

    /// Family name Parley resolved for `face`.
    pub fn family_name(&self, face: FontFace) -> &str {
        &self.face(face).family
    }

    fn face(&self, face: FontFace) -> &LoadedFace {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Mono => &self.mono,
        }
    }

    fn layout(
        &mut self,
        text: &str,
        face: FontFace,
        size_px: f32,
    ) -> ReactionResult<parley::Layout<Brush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReactionError::render(
                "text size_px must be finite and > 0",
            ));
        }
        let (family, request_bold) = {
            let f = self.face(face);
            (f.family.clone(), f.request_bold)
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        if request_bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<Brush> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}

fn load_face(
    font_ctx: &mut parley::FontContext,
    fonts: &FontSet,
    face: FontFace,
) -> ReactionResult<LoadedFace> {
    let (src, dedicated) = fonts.resolve(face);
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(src.bytes.clone()), None);
    let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
        ReactionError::validation(format!("no font families registered for {face:?} face"))
    })?;
    let family = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| ReactionError::validation("registered font family has no name"))?
        .to_string();
    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(src.bytes.clone()),
        src.index,
    );
    Ok(LoadedFace {
        family,
        font,
        request_bold: face == FontFace::Bold && dedicated,
    })
}

impl TextBackend for ParleyTextBackend {
    fn measure(&mut self, text: &str, face: FontFace, size_px: f32) -> ReactionResult<(f64, f64)> {
        let layout = self.layout(text, face, size_px)?;
        Ok((f64::from(layout.width()), f64::from(layout.height())))
    }

    fn draw(
        &mut self,
        canvas: &mut RgbaImage,
        text: &str,
        origin: Point,
        face: FontFace,
        size_px: f32,
        color: Rgba8,
    ) -> ReactionResult<()> {
        let layout = self.layout(text, face, size_px)?;
        let font = &self.face(face).font;
        paint_onto(canvas, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
            ctx.set_paint(cpu_color(color));
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/parley_backend.rs"]
mod tests;
