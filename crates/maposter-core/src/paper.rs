//! Paper geometry: named ISO sizes, orientation and bleed, and fitting
//! the canvas to them.
//!
//! Every lookup is permissive. An unknown paper name means A4 and an
//! unknown orientation means portrait, so a paper request never fails.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, CanvasSize, ContentRegion};

/// Default bleed on each edge, in millimetres.
pub const DEFAULT_BLEED_MM: f64 = 3.0;

/// Supported ISO 216 sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperSize {
    /// 297 × 420 mm.
    A3,
    /// 210 × 297 mm.
    #[default]
    A4,
    /// 148 × 210 mm.
    A5,
}

impl PaperSize {
    /// Look up a size by name, ignoring case. Unknown names are A4.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "A3" => Self::A3,
            "A5" => Self::A5,
            "A4" => Self::A4,
            other => {
                log::debug!("unknown paper size {other:?}; using A4");
                Self::A4
            }
        }
    }

    /// Portrait `(width, height)` in millimetres.
    #[must_use]
    pub const fn portrait_mm(self) -> (f64, f64) {
        match self {
            Self::A3 => (297.0, 420.0),
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A3 => "A3",
            Self::A4 => "A4",
            Self::A5 => "A5",
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide.
    #[default]
    Portrait,
    /// Wider than tall.
    Landscape,
    /// Both sides equal to the shorter paper side.
    Square,
}

impl Orientation {
    /// Parse a name, ignoring case. Unknown names are portrait.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "landscape" => Self::Landscape,
            "square" => Self::Square,
            _ => Self::Portrait,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
            Self::Square => "square",
        }
    }

    /// The four-letter form used in file names (`port`, `land`, `squa`).
    #[must_use]
    pub fn short_name(self) -> &'static str {
        &self.name()[..4]
    }

    /// Apply the orientation to portrait dimensions.
    #[must_use]
    pub fn apply(self, (width, height): (f64, f64)) -> (f64, f64) {
        match self {
            Self::Portrait => (width, height),
            Self::Landscape => (height, width),
            Self::Square => {
                let side = width.min(height);
                (side, side)
            }
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A complete paper request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperSpec {
    /// Paper size.
    pub size: PaperSize,
    /// Orientation.
    pub orientation: Orientation,
    /// Bleed added to every edge when `print_ready`.
    pub bleed_mm: f64,
    /// Whether to add bleed and crop marks.
    pub print_ready: bool,
}

impl Default for PaperSpec {
    fn default() -> Self {
        Self {
            size: PaperSize::A4,
            orientation: Orientation::Portrait,
            bleed_mm: DEFAULT_BLEED_MM,
            print_ready: false,
        }
    }
}

impl PaperSpec {
    /// Nominal `(width, height)` in millimetres, without bleed.
    #[must_use]
    pub fn trim_mm(&self) -> (f64, f64) {
        self.orientation.apply(self.size.portrait_mm())
    }

    /// Output `(width, height)` in millimetres, including bleed when
    /// print-ready.
    #[must_use]
    pub fn dimensions_mm(&self) -> (f64, f64) {
        let (width, height) = self.trim_mm();
        if self.print_ready {
            let bleed = self.bleed_mm.max(0.0);
            (2.0f64.mul_add(bleed, width), 2.0f64.mul_add(bleed, height))
        } else {
            (width, height)
        }
    }

    /// Width/height ratio of the nominal page.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        let (width, height) = self.trim_mm();
        width / height
    }
}

/// Output dimensions in millimetres for a named paper request.
///
/// Unknown names fall back to A4 portrait. When `print_ready` the bleed
/// is added on both sides of each axis.
#[must_use]
pub fn resolve_dimensions(
    paper_name: &str,
    orientation: &str,
    bleed_mm: f64,
    print_ready: bool,
) -> (f64, f64) {
    PaperSpec {
        size: PaperSize::from_name(paper_name),
        orientation: Orientation::from_name(orientation),
        bleed_mm,
        print_ready,
    }
    .dimensions_mm()
}

/// Width/height ratio of a named paper in a named orientation.
#[must_use]
pub fn aspect_ratio(paper_name: &str, orientation: &str) -> f64 {
    PaperSpec {
        size: PaperSize::from_name(paper_name),
        orientation: Orientation::from_name(orientation),
        ..PaperSpec::default()
    }
    .aspect_ratio()
}

/// Resize `canvas` to exactly `width_mm × height_mm` and let the
/// content fill it edge to edge.
pub fn apply_to_canvas(canvas: &mut Canvas, width_mm: f64, height_mm: f64) {
    canvas.set_size(CanvasSize::from_mm(width_mm, height_mm));
    canvas.set_region(ContentRegion::FULL);
}
