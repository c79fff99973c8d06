//! Placement of a canvas on an output page.
//!
//! All serializers work in page points with `y` upward. The raster
//! backend flips `y` once when it converts points to pixels.

use geo::Coord;
use maposter_core::Canvas;

/// Where the canvas sits on the page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Left edge of the canvas on the page.
    pub origin_x: f64,
    /// Bottom edge of the canvas on the page.
    pub origin_y: f64,
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
}

impl PageFrame {
    /// A frame covering `canvas` exactly, with its bottom-left corner at
    /// `(origin_x, origin_y)`.
    #[must_use]
    pub fn for_canvas(canvas: &Canvas, origin_x: f64, origin_y: f64) -> Self {
        let size = canvas.size();
        Self {
            origin_x,
            origin_y,
            width: size.width_pt(),
            height: size.height_pt(),
        }
    }

    /// Convert a normalized content coordinate to page points.
    #[must_use]
    pub fn normalized(&self, canvas: &Canvas, point: Coord<f64>) -> Coord<f64> {
        let on_canvas = canvas.region().to_canvas(point);
        Coord {
            x: on_canvas.x.mul_add(self.width, self.origin_x),
            y: on_canvas.y.mul_add(self.height, self.origin_y),
        }
    }

    /// Convert a map-space coordinate (metres) to page points.
    #[must_use]
    pub fn map(&self, canvas: &Canvas, coord: Coord<f64>) -> Coord<f64> {
        self.normalized(canvas, canvas.map_to_normalized(coord))
    }

    /// The page-space span `(y_min, y_max)` of a normalized vertical
    /// band covering the full content width.
    #[must_use]
    pub fn band(&self, canvas: &Canvas, y_min: f64, y_max: f64) -> (Coord<f64>, Coord<f64>) {
        (
            self.normalized(canvas, Coord { x: 0.0, y: y_min }),
            self.normalized(canvas, Coord { x: 1.0, y: y_max }),
        )
    }
}

#[cfg(test)]
mod tests {
    use maposter_core::{CanvasSize, Color, MapView};

    use super::*;

    #[test]
    fn center_of_map_is_center_of_page() {
        let canvas = Canvas::new(
            CanvasSize {
                width_in: 2.0,
                height_in: 4.0,
            },
            Color::WHITE,
            MapView { radius_m: 100.0 },
        );
        let frame = PageFrame::for_canvas(&canvas, 10.0, 20.0);
        let p = frame.map(&canvas, Coord { x: 0.0, y: 0.0 });
        assert!((p.x - 82.0).abs() < 1e-9);
        assert!((p.y - 164.0).abs() < 1e-9);
    }

    #[test]
    fn band_spans_full_width() {
        let canvas = Canvas::new(
            CanvasSize {
                width_in: 1.0,
                height_in: 1.0,
            },
            Color::WHITE,
            MapView { radius_m: 1.0 },
        );
        let frame = PageFrame::for_canvas(&canvas, 0.0, 0.0);
        let (lo, hi) = frame.band(&canvas, 0.0, 0.5);
        assert!(lo.x.abs() < 1e-12);
        assert!((hi.x - 72.0).abs() < 1e-12);
        assert!((hi.y - 36.0).abs() < 1e-12);
    }
}
