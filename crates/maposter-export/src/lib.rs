//! maposter-export: Pure format serializers (sans-IO)
//!
//! Converts a composed [`maposter_core::Canvas`] into output bytes:
//! PNG rasters at a chosen resolution, single-page PDFs at an exact
//! paper size (optionally with bleed and crop marks), and SVG previews.
//!
//! Every serializer is a pure function of its inputs. Writing the bytes
//! to disk is left to `maposter-io`.

pub mod filename;
pub mod frame;
pub mod pdf;
pub mod raster;
pub mod svg;
pub mod text;

pub use filename::{page_filename, raster_filename, slug, vector_filename};
pub use frame::PageFrame;
pub use pdf::{PageOptions, to_pdf};
pub use raster::{DEFAULT_DPI, RasterOptions, to_png};
pub use svg::to_svg;
pub use text::{BuiltinFont, FontSet};

/// Errors from the serializers.
///
/// Only size limits, invalid fonts and encoder failures are reported.
/// A canvas with nothing on it still serializes.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The requested raster would exceed the supported pixel count.
    #[error("canvas too large to rasterize: {width_px}x{height_px} px")]
    CanvasTooLarge {
        /// Requested width in pixels.
        width_px: u64,
        /// Requested height in pixels.
        height_px: u64,
    },

    /// The PNG encoder failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),

    /// The PDF writer failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// A supplied font file could not be parsed.
    #[error("invalid font: {0}")]
    InvalidFont(String),
}

/// A serialized poster. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub enum PosterArtifact {
    /// A PNG image.
    Raster {
        /// PNG file contents.
        bytes: Vec<u8>,
        /// Resolution recorded in the file.
        dpi: u32,
        /// Width in pixels.
        width_px: u32,
        /// Height in pixels.
        height_px: u32,
    },
    /// A single-page PDF.
    Page {
        /// PDF file contents.
        bytes: Vec<u8>,
        /// Page width in millimetres, bleed included.
        width_mm: f64,
        /// Page height in millimetres, bleed included.
        height_mm: f64,
        /// Whether bleed and crop marks were added.
        print_ready: bool,
    },
    /// An SVG document.
    Vector {
        /// SVG source.
        svg: String,
    },
}

impl PosterArtifact {
    /// File extension for the artifact, without the dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Raster { .. } => "png",
            Self::Page { .. } => "pdf",
            Self::Vector { .. } => "svg",
        }
    }

    /// The serialized bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Raster { bytes, .. } | Self::Page { bytes, .. } => bytes,
            Self::Vector { svg } => svg.as_bytes(),
        }
    }
}
