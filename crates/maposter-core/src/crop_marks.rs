//! Printer's crop marks for print-ready pages.
//!
//! The marked sheet is the bleed area plus a slug of [`SLUG_MM`] on every
//! side. Coordinates are millimetres from the bottom-left corner of the
//! sheet, `y` upward.

use geo::{Coord, Rect};

use crate::types::Color;

/// Width of the slug around the bleed area.
pub const SLUG_MM: f64 = 10.0;

/// Length of each mark.
pub const MARK_LENGTH_MM: f64 = 5.0;

/// Gap between the trim edge and the start of each mark.
pub const MARK_GAP_MM: f64 = 3.0;

/// Stroke width of each mark, in points.
pub const MARK_WIDTH_PT: f64 = 0.5;

/// Color of the marks.
pub const MARK_COLOR: Color = Color::BLACK;

/// One mark segment, `from` nearest the trim corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropMark {
    /// Inner end of the mark.
    pub from: Coord<f64>,
    /// Outer end of the mark.
    pub to: Coord<f64>,
}

/// A full set of crop marks and the boxes they frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CropMarks {
    /// Full sheet size, slug included.
    pub sheet_mm: (f64, f64),
    /// The bleed area on the sheet.
    pub bleed_box: Rect<f64>,
    /// The trim area on the sheet.
    pub trim_box: Rect<f64>,
    /// Eight segments: for each corner a horizontal then a vertical mark.
    pub marks: Vec<CropMark>,
}

/// Compute crop marks for a trim of `trim_width_mm × trim_height_mm`
/// with `bleed_mm` of bleed on every edge.
#[must_use]
pub fn crop_marks(trim_width_mm: f64, trim_height_mm: f64, bleed_mm: f64) -> CropMarks {
    let bleed = bleed_mm.max(0.0);
    let inset = SLUG_MM + bleed;
    let sheet_mm = (
        2.0f64.mul_add(inset, trim_width_mm),
        2.0f64.mul_add(inset, trim_height_mm),
    );

    let left = inset;
    let bottom = inset;
    let right = inset + trim_width_mm;
    let top = inset + trim_height_mm;

    let mut marks = Vec::with_capacity(8);
    for (x, x_dir) in [(left, -1.0_f64), (right, 1.0)] {
        for (y, y_dir) in [(bottom, -1.0_f64), (top, 1.0)] {
            marks.push(CropMark {
                from: Coord {
                    x: x_dir.mul_add(MARK_GAP_MM, x),
                    y,
                },
                to: Coord {
                    x: x_dir.mul_add(MARK_GAP_MM + MARK_LENGTH_MM, x),
                    y,
                },
            });
            marks.push(CropMark {
                from: Coord {
                    x,
                    y: y_dir.mul_add(MARK_GAP_MM, y),
                },
                to: Coord {
                    x,
                    y: y_dir.mul_add(MARK_GAP_MM + MARK_LENGTH_MM, y),
                },
            });
        }
    }

    CropMarks {
        sheet_mm,
        bleed_box: Rect::new(
            Coord { x: SLUG_MM, y: SLUG_MM },
            Coord {
                x: sheet_mm.0 - SLUG_MM,
                y: sheet_mm.1 - SLUG_MM,
            },
        ),
        trim_box: Rect::new(Coord { x: left, y: bottom }, Coord { x: right, y: top }),
        marks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(mark: &CropMark) -> f64 {
        (mark.to.x - mark.from.x).hypot(mark.to.y - mark.from.y)
    }

    #[test]
    fn eight_marks_of_five_mm() {
        let set = crop_marks(210.0, 297.0, 3.0);
        assert_eq!(set.marks.len(), 8);
        for mark in &set.marks {
            assert!((length(mark) - MARK_LENGTH_MM).abs() < 1e-12);
            let horizontal = (mark.from.y - mark.to.y).abs() < f64::EPSILON;
            let vertical = (mark.from.x - mark.to.x).abs() < f64::EPSILON;
            assert!(horizontal ^ vertical);
        }
    }

    #[test]
    fn sheet_includes_bleed_and_slug() {
        let set = crop_marks(210.0, 297.0, 3.0);
        assert!((set.sheet_mm.0 - 236.0).abs() < 1e-12);
        assert!((set.sheet_mm.1 - 323.0).abs() < 1e-12);
        assert!((set.bleed_box.width() - 216.0).abs() < 1e-12);
        assert!((set.bleed_box.height() - 303.0).abs() < 1e-12);
        assert!((set.trim_box.width() - 210.0).abs() < 1e-12);
        assert!((set.trim_box.min().x - 13.0).abs() < 1e-12);
    }

    #[test]
    fn marks_start_outside_trim_and_point_away() {
        let set = crop_marks(100.0, 50.0, 3.0);
        let trim = set.trim_box;
        for mark in &set.marks {
            let from_dist = outside_distance(trim, mark.from);
            let to_dist = outside_distance(trim, mark.to);
            assert!((from_dist - MARK_GAP_MM).abs() < 1e-12, "{mark:?}");
            assert!((to_dist - (MARK_GAP_MM + MARK_LENGTH_MM)).abs() < 1e-12, "{mark:?}");
        }
    }

    #[test]
    fn marks_stay_on_the_sheet() {
        let set = crop_marks(148.0, 148.0, 0.0);
        for mark in &set.marks {
            for p in [mark.from, mark.to] {
                assert!(p.x >= 0.0 && p.x <= set.sheet_mm.0);
                assert!(p.y >= 0.0 && p.y <= set.sheet_mm.1);
            }
        }
    }

    fn outside_distance(rect: Rect<f64>, p: Coord<f64>) -> f64 {
        let dx = (rect.min().x - p.x).max(p.x - rect.max().x).max(0.0);
        let dy = (rect.min().y - p.y).max(p.y - rect.max().y).max(0.0);
        dx.max(dy)
    }
}
