//! CPU raster backend on tiny-skia.
//!
//! Paints a [`Scene`] into an RGBA pixmap. Text is drawn from glyph outlines when a font has
//! been loaded; without one, text runs are skipped. Frames can be encoded to PNG.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use crate::scene::{DrawCommand, Scene, TextRun};
use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve};
use inkboard_core::element::{FontStyle, FontWeight};
use inkboard_core::text::{FontSpec, TextMeasure};
use kurbo::{Affine, BezPath, PathEl};
use peniko::Color;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Horizontal shear applied to synthesize italics.
const ITALIC_SKEW: f32 = 0.2;
/// Outline stroke applied to synthesize bold, as a fraction of the font size.
const BOLD_STROKE: f32 = 0.04;

/// Text measurement from real glyph advances.
#[derive(Clone)]
pub struct GlyphMeasure {
    font: FontArc,
}

impl GlyphMeasure {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }
}

impl std::fmt::Debug for GlyphMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphMeasure").finish_non_exhaustive()
    }
}

/// Pixels per font unit for an em size.
fn units_scale(font: &FontArc, size: f64) -> f32 {
    let units = font.units_per_em().unwrap_or_else(|| font.height_unscaled());
    size as f32 / units
}

impl TextMeasure for GlyphMeasure {
    fn line_width(&self, line: &str, font: &FontSpec<'_>) -> f64 {
        let scale = units_scale(&self.font, font.size);
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for c in line.chars() {
            let id = self.font.glyph_id(c);
            if let Some(prev) = prev {
                width += self.font.kern_unscaled(prev, id);
            }
            width += self.font.h_advance_unscaled(id);
            prev = Some(id);
        }
        let bold = if font.weight == FontWeight::Bold {
            BOLD_STROKE * font.size as f32
        } else {
            0.0
        };
        f64::from(width * scale + bold)
    }
}

/// Load a TrueType/OpenType font from raw bytes.
pub fn load_font(bytes: Vec<u8>) -> RenderResult<FontArc> {
    FontArc::try_from_vec(bytes).map_err(|e| RendererError::InitFailed(format!("invalid font: {e}")))
}

/// Software renderer producing RGBA frames.
pub struct RasterRenderer {
    pixmap: Pixmap,
    font: Option<FontArc>,
}

impl std::fmt::Debug for RasterRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterRenderer")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl RasterRenderer {
    /// Create a renderer with a surface of the given pixel size.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RendererError::InitFailed(format!("cannot allocate a {width}x{height} surface"))
        })?;
        log::debug!("Raster surface {width}x{height} created");
        Ok(Self { pixmap, font: None })
    }

    /// Use `font` for every text run.
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Measurement matching what this renderer draws, if a font is loaded.
    pub fn glyph_measure(&self) -> Option<GlyphMeasure> {
        self.font.clone().map(GlyphMeasure::new)
    }

    /// Clear the surface and paint a scene.
    pub fn paint(&mut self, scene: &Scene) {
        self.pixmap.fill(skia_color(scene.background()));
        let mut skipped_text = 0usize;
        for command in scene.commands() {
            match command {
                DrawCommand::Fill {
                    path,
                    transform,
                    color,
                } => {
                    if let Some(path) = skia_path(path) {
                        self.pixmap.fill_path(
                            &path,
                            &paint(*color),
                            FillRule::Winding,
                            skia_transform(*transform),
                            None,
                        );
                    }
                }
                DrawCommand::Stroke {
                    path,
                    transform,
                    color,
                    width,
                } => {
                    if let Some(path) = skia_path(path) {
                        self.pixmap.stroke_path(
                            &path,
                            &paint(*color),
                            &stroke(*width as f32),
                            skia_transform(*transform),
                            None,
                        );
                    }
                }
                DrawCommand::Text(run) => {
                    if !self.draw_text(run) {
                        skipped_text += 1;
                    }
                }
            }
        }
        if skipped_text > 0 {
            log::debug!("Skipped {skipped_text} text runs without a loaded font");
        }
    }

    /// Returns false when the run could not be drawn.
    fn draw_text(&mut self, run: &TextRun) -> bool {
        let Some(font) = &self.font else {
            return false;
        };
        let Some(path) = text_path(font, run) else {
            return true;
        };
        let paint = paint(run.color);
        let transform = skia_transform(run.transform);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, transform, None);
        if run.weight == FontWeight::Bold {
            let width = BOLD_STROKE * run.size as f32;
            self.pixmap
                .stroke_path(&path, &paint, &stroke(width), transform, None);
        }
        true
    }

    /// Frame pixels as straight (non-premultiplied) RGBA rows.
    pub fn rgba(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixmap.data().len());
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        data
    }

    /// Straight RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Encode the current frame as PNG.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        let png = encode_png(&self.rgba(), self.width(), self.height())?;
        log::info!("PNG export complete: {} bytes", png.len());
        Ok(png)
    }
}

impl Renderer for RasterRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let scene = Scene::build(ctx);
        self.paint(&scene);
        Ok(())
    }
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let expected = width as usize * height as usize * 4;
    if rgba_data.len() != expected {
        return Err(RendererError::Encode(format!(
            "expected {expected} bytes of RGBA data, got {}",
            rgba_data.len()
        )));
    }
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| RendererError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let c = color.to_rgba8();
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn paint(color: Color) -> Paint<'static> {
    let c = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Convert a kurbo path. Degenerate paths yield `None`.
fn skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for element in path.elements() {
        match *element {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                builder.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Glyph outlines of a run laid out along its baseline, in the run's local coordinates.
fn text_path(font: &FontArc, run: &TextRun) -> Option<tiny_skia::Path> {
    let scale = units_scale(font, run.size);
    let skew = if run.style == FontStyle::Italic {
        ITALIC_SKEW
    } else {
        0.0
    };
    let baseline = run.origin.y as f32;
    let mut pen_x = run.origin.x as f32;
    let mut builder = PathBuilder::new();
    let mut prev: Option<GlyphId> = None;

    for c in run.text.chars() {
        let id = font.glyph_id(c);
        if let Some(prev) = prev {
            pen_x += font.kern_unscaled(prev, id) * scale;
        }
        if let Some(outline) = font.outline(id) {
            let map = |p: ab_glyph::Point| {
                let x = pen_x + (p.x + p.y * skew) * scale;
                (x, baseline - p.y * scale)
            };
            let mut cursor: Option<ab_glyph::Point> = None;
            for curve in &outline.curves {
                let (start, end) = match *curve {
                    OutlineCurve::Line(p0, p1) => (p0, p1),
                    OutlineCurve::Quad(p0, _, p2) => (p0, p2),
                    OutlineCurve::Cubic(p0, _, _, p3) => (p0, p3),
                };
                if cursor != Some(start) {
                    if cursor.is_some() {
                        builder.close();
                    }
                    let (x, y) = map(start);
                    builder.move_to(x, y);
                }
                match *curve {
                    OutlineCurve::Line(_, p1) => {
                        let (x, y) = map(p1);
                        builder.line_to(x, y);
                    }
                    OutlineCurve::Quad(_, p1, p2) => {
                        let (x1, y1) = map(p1);
                        let (x, y) = map(p2);
                        builder.quad_to(x1, y1, x, y);
                    }
                    OutlineCurve::Cubic(_, p1, p2, p3) => {
                        let (x1, y1) = map(p1);
                        let (x2, y2) = map(p2);
                        let (x, y) = map(p3);
                        builder.cubic_to(x1, y1, x2, y2, x, y);
                    }
                }
                cursor = Some(end);
            }
            if cursor.is_some() {
                builder.close();
            }
        }
        pen_x += font.h_advance_unscaled(id) * scale;
        prev = Some(id);
    }
    builder.finish()
}
