//! PNG raster serializer.
//!
//! The canvas is drawn with `tiny-skia` at `dpi` pixels per inch and
//! encoded with the `png` crate so the resolution travels with the file
//! (`pHYs` chunk). The image is exactly the canvas: no padding, no
//! trimming.

use geo::{Coord, LineString, Polygon};
use maposter_core::{Canvas, Color, GradientFade, Primitive, RuleItem, TextItem};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};
use ttf_parser::OutlineBuilder;

use crate::frame::PageFrame;
use crate::text::{FontSet, baseline_offset, start_offset};
use crate::{ExportError, PosterArtifact};

/// Default output resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Largest raster we agree to allocate, in pixels.
pub const MAX_PIXELS: u64 = 400_000_000;

const METRES_PER_INCH: f64 = 0.0254;

/// Raster settings.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Pixels per inch.
    pub dpi: u32,
    /// Faces for the captions; the bundled faces by default.
    pub fonts: FontSet,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            fonts: FontSet::bundled(),
        }
    }
}

/// Pixel dimensions of `canvas` at `dpi`: `round(inches × dpi)`.
///
/// # Errors
///
/// Returns [`ExportError::CanvasTooLarge`] when either side is zero or
/// the pixel count exceeds [`MAX_PIXELS`].
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn pixel_size(canvas: &Canvas, dpi: u32) -> Result<(u32, u32), ExportError> {
    let size = canvas.size();
    let to_px = |inches: f64| {
        let px = (inches * f64::from(dpi)).round();
        if px.is_finite() && px >= 0.0 {
            px.min(u64::MAX as f64) as u64
        } else {
            0
        }
    };
    let (width_px, height_px) = (to_px(size.width_in), to_px(size.height_in));
    let too_large = ExportError::CanvasTooLarge {
        width_px,
        height_px,
    };
    if width_px == 0 || height_px == 0 || width_px.saturating_mul(height_px) > MAX_PIXELS {
        return Err(too_large);
    }
    match (u32::try_from(width_px), u32::try_from(height_px)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(too_large),
    }
}

/// Render `canvas` to a PNG.
///
/// Captions are outlined from `options.fonts`. A caption whose face
/// fails to parse is skipped with a warning.
///
/// # Errors
///
/// [`ExportError::CanvasTooLarge`] for oversized or empty canvases and
/// [`ExportError::PngEncode`] if encoding fails.
pub fn to_png(canvas: &Canvas, options: &RasterOptions) -> Result<PosterArtifact, ExportError> {
    let (width_px, height_px) = pixel_size(canvas, options.dpi)?;
    let mut pixmap = Pixmap::new(width_px, height_px).ok_or(ExportError::CanvasTooLarge {
        width_px: u64::from(width_px),
        height_px: u64::from(height_px),
    })?;

    let mut painter = Painter {
        canvas,
        frame: PageFrame::for_canvas(canvas, 0.0, 0.0),
        scale: f64::from(options.dpi) / maposter_core::POINTS_PER_INCH,
        fonts: &options.fonts,
        skipped_text: 0,
    };
    painter.draw(&mut pixmap);
    if painter.skipped_text > 0 {
        log::warn!(
            "caption font unusable; skipped {} caption(s) in raster output",
            painter.skipped_text
        );
    }

    let bytes = encode_png(&pixmap, options.dpi)?;
    log::debug!("rasterized {width_px}x{height_px} px at {} dpi", options.dpi);
    Ok(PosterArtifact::Raster {
        bytes,
        dpi: options.dpi,
        width_px,
        height_px,
    })
}

struct Painter<'a> {
    canvas: &'a Canvas,
    frame: PageFrame,
    /// Pixels per point.
    scale: f64,
    fonts: &'a FontSet,
    skipped_text: usize,
}

impl Painter<'_> {
    fn draw(&mut self, pixmap: &mut Pixmap) {
        let canvas = self.canvas;
        pixmap.fill(skia_color(canvas.background(), 1.0));
        for op in canvas.ops() {
            match &op.primitive {
                Primitive::Area { polygon, color } => self.area(pixmap, polygon, *color),
                Primitive::Line {
                    line,
                    color,
                    width_pt,
                } => self.line(pixmap, line, *color, *width_pt),
                Primitive::Fade(fade) => self.fade(pixmap, fade),
                Primitive::Text(text) => self.text(pixmap, text),
                Primitive::Rule(rule) => self.rule(pixmap, rule),
            }
        }
    }

    /// Page points (y up) to pixels (y down).
    #[allow(clippy::cast_possible_truncation)]
    fn px(&self, page: Coord<f64>) -> (f32, f32) {
        (
            (page.x * self.scale) as f32,
            ((self.frame.height - page.y) * self.scale) as f32,
        )
    }

    fn map_px(&self, coord: Coord<f64>) -> (f32, f32) {
        self.px(self.frame.map(self.canvas, coord))
    }

    fn ring(&self, builder: &mut PathBuilder, ring: &LineString<f64>) {
        let mut points = ring.coords().map(|c| self.map_px(*c));
        if let Some((x, y)) = points.next() {
            builder.move_to(x, y);
            for (x, y) in points {
                builder.line_to(x, y);
            }
            builder.close();
        }
    }

    fn area(&self, pixmap: &mut Pixmap, polygon: &Polygon<f64>, color: Color) {
        let mut builder = PathBuilder::new();
        self.ring(&mut builder, polygon.exterior());
        for hole in polygon.interiors() {
            self.ring(&mut builder, hole);
        }
        if let Some(path) = builder.finish() {
            pixmap.fill_path(
                &path,
                &paint(color, 1.0),
                FillRule::EvenOdd,
                Transform::identity(),
                None,
            );
        }
    }

    fn line(&self, pixmap: &mut Pixmap, line: &LineString<f64>, color: Color, width_pt: f64) {
        let mut points = line.coords().map(|c| self.map_px(*c));
        let mut builder = PathBuilder::new();
        if let Some((x, y)) = points.next() {
            builder.move_to(x, y);
            for (x, y) in points {
                builder.line_to(x, y);
            }
        }
        if let Some(path) = builder.finish() {
            self.stroke(pixmap, &path, color, width_pt, LineCap::Round);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn stroke(
        &self,
        pixmap: &mut Pixmap,
        path: &Path,
        color: Color,
        width_pt: f64,
        cap: LineCap,
    ) {
        let stroke = Stroke {
            width: (width_pt * self.scale) as f32,
            line_cap: cap,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(path, &paint(color, 1.0), &stroke, Transform::identity(), None);
    }

    fn fade(&self, pixmap: &mut Pixmap, fade: &GradientFade) {
        for band in fade.bands() {
            let (low, high) = self.frame.band(self.canvas, band.y_min, band.y_max);
            let (left, bottom) = self.px(low);
            let (right, top) = self.px(high);
            if let Some(rect) = Rect::from_ltrb(left, top, right, bottom) {
                let mut band_paint = paint(fade.color, band.alpha);
                band_paint.anti_alias = false;
                pixmap.fill_rect(rect, &band_paint, Transform::identity(), None);
            }
        }
    }

    fn rule(&self, pixmap: &mut Pixmap, rule: &RuleItem) {
        let (x0, y0) = self.px(self.frame.normalized(self.canvas, rule.from));
        let (x1, y1) = self.px(self.frame.normalized(self.canvas, rule.to));
        let mut builder = PathBuilder::new();
        builder.move_to(x0, y0);
        builder.line_to(x1, y1);
        if let Some(path) = builder.finish() {
            self.stroke(pixmap, &path, rule.color, rule.width_pt, LineCap::Butt);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn text(&mut self, pixmap: &mut Pixmap, item: &TextItem) {
        let Some(face) = self.fonts.face(item.weight) else {
            self.skipped_text += 1;
            return;
        };
        let size_px = item.size_pt * self.scale;
        let glyph_scale = size_px / f64::from(face.units_per_em().max(1));
        let glyphs: Vec<_> = item
            .text
            .chars()
            .map(|ch| face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0)))
            .collect();
        let advance_units: u32 = glyphs
            .iter()
            .map(|&gid| u32::from(face.glyph_hor_advance(gid).unwrap_or(0)))
            .sum();
        let width_px = f64::from(advance_units) * glyph_scale;

        let (anchor_x, anchor_y) = self.px(self.frame.normalized(self.canvas, item.anchor));
        let mut pen_x = f64::from(anchor_x) + start_offset(item.h_align, width_px);
        let baseline = f64::from(anchor_y) - baseline_offset(item.v_align, size_px);

        let mut outline = GlyphPathBuilder {
            builder: PathBuilder::new(),
            origin_x: 0.0,
            origin_y: baseline as f32,
            scale: glyph_scale as f32,
        };
        for gid in glyphs {
            outline.origin_x = pen_x as f32;
            face.outline_glyph(gid, &mut outline);
            pen_x += f64::from(face.glyph_hor_advance(gid).unwrap_or(0)) * glyph_scale;
        }
        if let Some(path) = outline.builder.finish() {
            pixmap.fill_path(
                &path,
                &paint(item.color, item.opacity),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }
}

/// Collects glyph outlines (font units, y up) into a pixel-space path
/// (y down).
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alpha_u8(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn skia_color(color: Color, opacity: f64) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, alpha_u8(opacity))
}

fn paint(color: Color, opacity: f64) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, alpha_u8(opacity));
    paint.anti_alias = true;
    paint
}

/// Encode an opaque pixmap as 8-bit RGB PNG with a `pHYs` chunk.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn encode_png(pixmap: &Pixmap, dpi: u32) -> Result<Vec<u8>, ExportError> {
    let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }

    let pixels_per_metre = (f64::from(dpi) / METRES_PER_INCH).round() as u32;
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: pixels_per_metre,
            yppu: pixels_per_metre,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder
            .write_header()
            .map_err(|err| ExportError::PngEncode(err.to_string()))?;
        writer
            .write_image_data(&rgb)
            .map_err(|err| ExportError::PngEncode(err.to_string()))?;
        writer
            .finish()
            .map_err(|err| ExportError::PngEncode(err.to_string()))?;
    }
    Ok(bytes)
}
