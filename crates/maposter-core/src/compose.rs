//! Layer compositor: projects geographic layers and stacks them on a
//! canvas in fixed z-order, then adds the edge fades.

use geo::{Geometry, LineString, Polygon};

use crate::canvas::{
    Canvas, CanvasSize, FadeEdge, GradientFade, Layer, MapView, Primitive,
};
use crate::classify::style_for;
use crate::geodata::{FeatureCollection, StreetGraph};
use crate::projection::LocalProjection;
use crate::theme::Theme;
use crate::types::{Color, LatLon};

/// Depth of the top fade as a fraction of the canvas height.
pub const TOP_FADE_EXTENT: f64 = 0.08;

/// Depth of the bottom fade as a fraction of the canvas height.
pub const BOTTOM_FADE_EXTENT: f64 = 0.20;

/// Number of bands per fade.
pub const FADE_STEPS: u32 = 100;

/// Stroke width of linear water and park features, in points.
pub const FEATURE_LINE_WIDTH_PT: f64 = 1.0;

/// Geographic input of one poster. Optional layers are `None` when the
/// provider could not deliver them.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    /// The street network.
    pub streets: StreetGraph,
    /// Water bodies and waterways.
    pub water: Option<FeatureCollection>,
    /// Parks and green space.
    pub parks: Option<FeatureCollection>,
}

/// Compose the map layers for a poster centered on `center`.
///
/// Paint order is background, water, parks, roads, then the two
/// gradient fades. Empty or missing optional layers produce no draw
/// operations at all.
///
/// `radius_m` must be positive; [`crate::create_poster`] rejects a zero
/// radius before getting here.
#[must_use]
pub fn compose_layers(
    theme: &Theme,
    center: LatLon,
    radius_m: f64,
    data: &MapData,
    size: CanvasSize,
) -> Canvas {
    let projection = LocalProjection::new(center);
    let mut canvas = Canvas::new(size, theme.background, MapView { radius_m });

    if let Some(water) = data.water.as_ref().filter(|w| !w.is_empty()) {
        add_features(&mut canvas, &projection, Layer::Water, water, theme.water);
    }
    if let Some(parks) = data.parks.as_ref().filter(|p| !p.is_empty()) {
        add_features(&mut canvas, &projection, Layer::Parks, parks, theme.parks);
    }
    add_streets(&mut canvas, &projection, &data.streets, theme);
    add_fades(&mut canvas, theme.gradient_tint);

    log::debug!(
        "composed {} draw operations ({} road segments)",
        canvas.len(),
        data.streets.edge_count()
    );
    canvas
}

fn add_streets(
    canvas: &mut Canvas,
    projection: &LocalProjection,
    streets: &StreetGraph,
    theme: &Theme,
) {
    for (edge, line) in streets.segments() {
        let style = style_for(edge.class(), theme);
        canvas.push(
            Layer::Roads,
            Primitive::Line {
                line: projection.project_geometry(&line),
                color: style.color,
                width_pt: style.width,
            },
        );
    }
}

fn add_features(
    canvas: &mut Canvas,
    projection: &LocalProjection,
    layer: Layer,
    features: &FeatureCollection,
    color: Color,
) {
    for geometry in features.features() {
        add_geometry(canvas, projection, layer, geometry, color);
    }
}

fn add_geometry(
    canvas: &mut Canvas,
    projection: &LocalProjection,
    layer: Layer,
    geometry: &Geometry<f64>,
    color: Color,
) {
    let area = |canvas: &mut Canvas, polygon: &Polygon<f64>| {
        canvas.push(
            layer,
            Primitive::Area {
                polygon: projection.project_geometry(polygon),
                color,
            },
        );
    };
    let line = |canvas: &mut Canvas, line: &LineString<f64>| {
        canvas.push(
            layer,
            Primitive::Line {
                line: projection.project_geometry(line),
                color,
                width_pt: FEATURE_LINE_WIDTH_PT,
            },
        );
    };

    match geometry {
        Geometry::Polygon(polygon) => area(canvas, polygon),
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                area(canvas, polygon);
            }
        }
        Geometry::Rect(rect) => area(canvas, &rect.to_polygon()),
        Geometry::Triangle(triangle) => area(canvas, &triangle.to_polygon()),
        Geometry::LineString(ls) => line(canvas, ls),
        Geometry::MultiLineString(lines) => {
            for ls in lines {
                line(canvas, ls);
            }
        }
        Geometry::Line(segment) => line(canvas, &LineString::from(*segment)),
        Geometry::GeometryCollection(collection) => {
            for inner in collection {
                add_geometry(canvas, projection, layer, inner, color);
            }
        }
        // Point features (e.g. a spring) have no visible extent.
        Geometry::Point(_) | Geometry::MultiPoint(_) => {}
    }
}

fn add_fades(canvas: &mut Canvas, color: Color) {
    for (edge, extent) in [
        (FadeEdge::Top, TOP_FADE_EXTENT),
        (FadeEdge::Bottom, BOTTOM_FADE_EXTENT),
    ] {
        canvas.push(
            Layer::Fades,
            Primitive::Fade(GradientFade {
                edge,
                extent,
                color,
                steps: FADE_STEPS,
            }),
        );
    }
}
