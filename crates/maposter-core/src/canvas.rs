//! The poster canvas: a physical size, a background, and a z-ordered
//! list of draw operations.
//!
//! The canvas does not rasterize anything. Serializers in
//! `maposter-export` walk [`Canvas::ops`] and translate each
//! [`Primitive`] into their output format.
//!
//! # Coordinate spaces
//!
//! - **Map space**: metres east/north of the poster center (see
//!   [`crate::projection`]). Used by [`Primitive::Area`] and
//!   [`Primitive::Line`].
//! - **Normalized space**: fractions of the content region, `x` to the
//!   right and `y` *upward* from the bottom edge. Used by fades,
//!   captions and rules.
//!
//! [`Canvas::map_to_normalized`] bridges the two. The map view is
//! recomputed from the canvas's current physical aspect, so resizing
//! the canvas to a paper format never distorts the map.

use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::types::{Color, MM_PER_INCH, POINTS_PER_INCH};

/// Height of the preview canvas in inches.
pub const PREVIEW_HEIGHT_IN: f64 = 16.0;

/// Width of the preview canvas when no paper aspect is requested.
pub const DEFAULT_PREVIEW_WIDTH_IN: f64 = 12.0;

/// Drawing layers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Water fills and waterways.
    Water,
    /// Parks and green space.
    Parks,
    /// The street network.
    Roads,
    /// Top and bottom gradient fades.
    Fades,
    /// Captions and decorations.
    Captions,
}

impl Layer {
    /// The layer's z-order value.
    #[must_use]
    pub const fn z(self) -> u8 {
        match self {
            Self::Water => 1,
            Self::Parks => 2,
            Self::Roads => 3,
            Self::Fades => 10,
            Self::Captions => 11,
        }
    }
}

/// Physical canvas size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in inches.
    pub width_in: f64,
    /// Height in inches.
    pub height_in: f64,
}

impl CanvasSize {
    /// Preview size for a width/height ratio: 16 in tall, width from the
    /// ratio, or 12 × 16 in when no ratio is given.
    #[must_use]
    pub fn preview(aspect_ratio: Option<f64>) -> Self {
        let width_in = aspect_ratio
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
            .map_or(DEFAULT_PREVIEW_WIDTH_IN, |ratio| PREVIEW_HEIGHT_IN * ratio);
        Self {
            width_in,
            height_in: PREVIEW_HEIGHT_IN,
        }
    }

    /// Size from millimetres.
    #[must_use]
    pub fn from_mm(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_in: width_mm / MM_PER_INCH,
            height_in: height_mm / MM_PER_INCH,
        }
    }

    /// Width in points.
    #[must_use]
    pub fn width_pt(self) -> f64 {
        self.width_in * POINTS_PER_INCH
    }

    /// Height in points.
    #[must_use]
    pub fn height_pt(self) -> f64 {
        self.height_in * POINTS_PER_INCH
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::preview(None)
    }
}

/// The part of the canvas the content occupies, as fractions of the
/// canvas (`y` upward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentRegion {
    /// Left edge.
    pub left: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Right edge.
    pub right: f64,
    /// Top edge.
    pub top: f64,
}

impl ContentRegion {
    /// The whole canvas, no margins.
    pub const FULL: Self = Self {
        left: 0.0,
        bottom: 0.0,
        right: 1.0,
        top: 1.0,
    };

    /// Map a normalized content coordinate to a canvas fraction.
    #[must_use]
    pub fn to_canvas(self, point: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (self.right - self.left).mul_add(point.x, self.left),
            y: (self.top - self.bottom).mul_add(point.y, self.bottom),
        }
    }
}

impl Default for ContentRegion {
    fn default() -> Self {
        Self::FULL
    }
}

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    /// Anchor at the start of the text.
    Left,
    /// Anchor at the middle of the text.
    Center,
    /// Anchor at the end of the text.
    Right,
}

/// Vertical text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    /// Anchor at the bottom of the glyph box.
    Bottom,
    /// Anchor at the middle of the cap height.
    Center,
    /// Anchor at the top of the glyph box.
    Top,
}

/// Font weight of a caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontWeight {
    /// Regular weight.
    Regular,
    /// Bold weight.
    Bold,
}

/// A line of text placed in normalized space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// The text, already cased and spaced.
    pub text: String,
    /// Anchor point in normalized space.
    pub anchor: Coord<f64>,
    /// Horizontal anchor.
    pub h_align: HAlign,
    /// Vertical anchor.
    pub v_align: VAlign,
    /// Font size in points.
    pub size_pt: f64,
    /// Font weight.
    pub weight: FontWeight,
    /// Fill color.
    pub color: Color,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// A straight rule in normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleItem {
    /// Start point.
    pub from: Coord<f64>,
    /// End point.
    pub to: Coord<f64>,
    /// Stroke color.
    pub color: Color,
    /// Stroke width in points.
    pub width_pt: f64,
}

/// Which canvas edge a fade is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeEdge {
    /// Fade down from the top edge.
    Top,
    /// Fade up from the bottom edge.
    Bottom,
}

/// A stepped vertical alpha ramp of a single color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientFade {
    /// Anchoring edge; the ramp is opaque there.
    pub edge: FadeEdge,
    /// Depth of the fade as a fraction of the content height.
    pub extent: f64,
    /// Fade color; only alpha varies.
    pub color: Color,
    /// Number of discrete bands.
    pub steps: u32,
}

/// One band of a [`GradientFade`], in normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeBand {
    /// Lower edge of the band.
    pub y_min: f64,
    /// Upper edge of the band.
    pub y_max: f64,
    /// Band opacity.
    pub alpha: f64,
}

impl GradientFade {
    /// The bands from the anchoring edge inward. Alpha falls linearly
    /// from 1 on the edge band to 0 on the innermost band.
    pub fn bands(&self) -> impl Iterator<Item = FadeBand> + '_ {
        let steps = self.steps.max(1);
        let band = self.extent / f64::from(steps);
        let last = f64::from(steps.saturating_sub(1).max(1));
        (0..steps).map(move |i| {
            let i = f64::from(i);
            let alpha = if steps == 1 { 1.0 } else { 1.0 - i / last };
            let (y_min, y_max) = match self.edge {
                FadeEdge::Top => (1.0 - (i + 1.0) * band, 1.0 - i * band),
                FadeEdge::Bottom => (i * band, (i + 1.0) * band),
            };
            FadeBand {
                y_min,
                y_max,
                alpha,
            }
        })
    }
}

/// A single drawable item.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A filled polygon in map space (holes are even-odd cut-outs).
    Area {
        /// Polygon in metres.
        polygon: Polygon<f64>,
        /// Fill color.
        color: Color,
    },
    /// A stroked polyline in map space.
    Line {
        /// Line in metres.
        line: LineString<f64>,
        /// Stroke color.
        color: Color,
        /// Stroke width in points.
        width_pt: f64,
    },
    /// An edge fade in normalized space.
    Fade(GradientFade),
    /// A caption in normalized space.
    Text(TextItem),
    /// A straight rule in normalized space.
    Rule(RuleItem),
}

/// A primitive assigned to a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOp {
    /// The layer the primitive belongs to.
    pub layer: Layer,
    /// What to draw.
    pub primitive: Primitive,
}

/// Placement of map space on the canvas: centered on the map origin,
/// the longer content axis spans `2 × radius_m`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Radius shown along the longer content axis, in metres.
    pub radius_m: f64,
}

impl MapView {
    /// Half extents `(x, y)` in metres for a content area with the
    /// given width/height ratio.
    #[must_use]
    pub fn half_extents(self, aspect: f64) -> (f64, f64) {
        if aspect >= 1.0 {
            (self.radius_m, self.radius_m / aspect)
        } else {
            (self.radius_m * aspect, self.radius_m)
        }
    }
}

/// The composited poster, owned by one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    size: CanvasSize,
    background: Color,
    region: ContentRegion,
    view: MapView,
    ops: Vec<DrawOp>,
}

impl Canvas {
    /// An empty canvas.
    #[must_use]
    pub const fn new(size: CanvasSize, background: Color, view: MapView) -> Self {
        Self {
            size,
            background,
            region: ContentRegion::FULL,
            view,
            ops: Vec::new(),
        }
    }

    /// Physical size.
    #[must_use]
    pub const fn size(&self) -> CanvasSize {
        self.size
    }

    /// Resize the canvas. Draw operations are kept; map geometry is
    /// re-fitted to the new aspect by [`Self::map_to_normalized`].
    pub const fn set_size(&mut self, size: CanvasSize) {
        self.size = size;
    }

    /// Background fill.
    #[must_use]
    pub const fn background(&self) -> Color {
        self.background
    }

    /// Content region.
    #[must_use]
    pub const fn region(&self) -> ContentRegion {
        self.region
    }

    /// Replace the content region.
    pub const fn set_region(&mut self, region: ContentRegion) {
        self.region = region;
    }

    /// Map view.
    #[must_use]
    pub const fn view(&self) -> MapView {
        self.view
    }

    /// Append a primitive on `layer`.
    pub fn push(&mut self, layer: Layer, primitive: Primitive) {
        self.ops.push(DrawOp { layer, primitive });
    }

    /// Number of draw operations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if nothing but the background would be drawn.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Draw operations in paint order: ascending z, insertion order
    /// within a layer.
    #[must_use]
    pub fn ops(&self) -> Vec<&DrawOp> {
        let mut ops: Vec<&DrawOp> = self.ops.iter().collect();
        ops.sort_by_key(|op| op.layer.z());
        ops
    }

    /// Draw operations on one layer, in insertion order.
    pub fn ops_in(&self, layer: Layer) -> impl Iterator<Item = &DrawOp> + '_ {
        self.ops.iter().filter(move |op| op.layer == layer)
    }

    /// Width/height ratio of the content region.
    #[must_use]
    pub fn content_aspect(&self) -> f64 {
        let width = self.size.width_in * (self.region.right - self.region.left);
        let height = self.size.height_in * (self.region.top - self.region.bottom);
        if height > 0.0 { width / height } else { 1.0 }
    }

    /// Convert a map-space coordinate (metres) to normalized space.
    #[must_use]
    pub fn map_to_normalized(&self, coord: Coord<f64>) -> Coord<f64> {
        let (half_x, half_y) = self.view.half_extents(self.content_aspect());
        Coord {
            x: 0.5 + coord.x / (2.0 * half_x),
            y: 0.5 + coord.y / (2.0 * half_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(width_in: f64, height_in: f64) -> Canvas {
        Canvas::new(
            CanvasSize {
                width_in,
                height_in,
            },
            Color::WHITE,
            MapView { radius_m: 1000.0 },
        )
    }

    #[test]
    fn layer_z_order() {
        let order = [Layer::Water, Layer::Parks, Layer::Roads, Layer::Fades, Layer::Captions];
        let z: Vec<u8> = order.iter().map(|l| l.z()).collect();
        assert_eq!(z, vec![1, 2, 3, 10, 11]);
    }

    #[test]
    fn ops_are_sorted_by_z_and_stable_within_layer() {
        let mut c = canvas(12.0, 16.0);
        let rule = |x: f64| {
            Primitive::Rule(RuleItem {
                from: Coord { x, y: 0.0 },
                to: Coord { x, y: 1.0 },
                color: Color::BLACK,
                width_pt: 1.0,
            })
        };
        c.push(Layer::Captions, rule(1.0));
        c.push(Layer::Water, rule(2.0));
        c.push(Layer::Captions, rule(3.0));
        c.push(Layer::Roads, rule(4.0));

        let xs: Vec<f64> = c
            .ops()
            .iter()
            .map(|op| match &op.primitive {
                Primitive::Rule(r) => r.from.x,
                _ => f64::NAN,
            })
            .collect();
        assert_eq!(xs, vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn preview_size_uses_aspect() {
        let s = CanvasSize::preview(Some(0.5));
        assert!((s.width_in - 8.0).abs() < f64::EPSILON);
        assert!((s.height_in - 16.0).abs() < f64::EPSILON);
        let d = CanvasSize::preview(None);
        assert!((d.width_in - 12.0).abs() < f64::EPSILON);
        let bad = CanvasSize::preview(Some(f64::NAN));
        assert!((bad.width_in - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn map_origin_is_canvas_center() {
        let c = canvas(12.0, 16.0);
        let p = c.map_to_normalized(Coord { x: 0.0, y: 0.0 });
        assert!((p.x - 0.5).abs() < f64::EPSILON);
        assert!((p.y - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn portrait_longer_axis_spans_the_radius() {
        let c = canvas(12.0, 16.0);
        let top = c.map_to_normalized(Coord { x: 0.0, y: 1000.0 });
        assert!((top.y - 1.0).abs() < 1e-12);
        // Horizontal half extent is 1000 * 0.75.
        let right = c.map_to_normalized(Coord { x: 750.0, y: 0.0 });
        assert!((right.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn landscape_longer_axis_spans_the_radius() {
        let c = canvas(16.0, 12.0);
        let right = c.map_to_normalized(Coord { x: 1000.0, y: 0.0 });
        assert!((right.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn resizing_refits_the_map_without_distortion() {
        let mut c = canvas(12.0, 16.0);
        c.set_size(CanvasSize::from_mm(297.0, 210.0));
        let right = c.map_to_normalized(Coord { x: 1000.0, y: 0.0 });
        let top = c.map_to_normalized(Coord { x: 0.0, y: 1000.0 * 210.0 / 297.0 });
        assert!((right.x - 1.0).abs() < 1e-9);
        assert!((top.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn region_to_canvas() {
        let region = ContentRegion {
            left: 0.1,
            bottom: 0.2,
            right: 0.9,
            top: 0.8,
        };
        let p = region.to_canvas(Coord { x: 0.5, y: 0.5 });
        assert!((p.x - 0.5).abs() < 1e-12);
        assert!((p.y - 0.5).abs() < 1e-12);
        let origin = region.to_canvas(Coord { x: 0.0, y: 0.0 });
        assert!((origin.x - 0.1).abs() < 1e-12);
        assert!((origin.y - 0.2).abs() < 1e-12);
    }

    // --- Fade tests ---

    #[test]
    fn top_fade_is_opaque_at_the_edge() {
        let fade = GradientFade {
            edge: FadeEdge::Top,
            extent: 0.08,
            color: Color::WHITE,
            steps: 100,
        };
        let bands: Vec<FadeBand> = fade.bands().collect();
        assert_eq!(bands.len(), 100);
        assert!((bands[0].alpha - 1.0).abs() < f64::EPSILON);
        assert!((bands[0].y_max - 1.0).abs() < f64::EPSILON);
        assert!(bands[99].alpha.abs() < f64::EPSILON);
        assert!((bands[99].y_min - 0.92).abs() < 1e-12);
    }

    #[test]
    fn bottom_fade_covers_its_extent_with_linear_alpha() {
        let fade = GradientFade {
            edge: FadeEdge::Bottom,
            extent: 0.2,
            color: Color::BLACK,
            steps: 100,
        };
        let bands: Vec<FadeBand> = fade.bands().collect();
        assert!(bands[0].y_min.abs() < f64::EPSILON);
        assert!((bands[99].y_max - 0.2).abs() < 1e-12);
        for pair in bands.windows(2) {
            assert!(pair[1].alpha < pair[0].alpha);
            let step = pair[0].alpha - pair[1].alpha;
            assert!((step - 1.0 / 99.0).abs() < 1e-12);
            assert!((pair[0].y_max - pair[1].y_min).abs() < 1e-12);
        }
    }
}
