//! Rendering a composed poster to a file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use maposter_core::{ComposedPoster, PaperSpec};
use maposter_export::{
    ExportError, FontSet, PageOptions, PosterArtifact, RasterOptions, page_filename,
    raster_filename, to_pdf, to_png, to_svg, vector_filename,
};
use serde::{Deserialize, Serialize};

use crate::IoError;

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG raster at the configured DPI.
    #[default]
    Png,
    /// Single PDF page at the configured paper size.
    Pdf,
    /// SVG preview.
    Svg,
}

impl OutputFormat {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            "svg" => Ok(Self::Svg),
            other => Err(format!("unknown format {other:?} (expected png, pdf or svg)")),
        }
    }
}

/// How and where to write a poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output format.
    pub format: OutputFormat,
    /// Raster resolution.
    pub dpi: u32,
    /// Paper for PDF output. Also fixes the preview aspect ratio of a
    /// PDF poster.
    pub paper: PaperSpec,
    /// Directory the file is written to.
    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            dpi: maposter_export::DEFAULT_DPI,
            paper: PaperSpec::default(),
            output_dir: PathBuf::from("posters"),
        }
    }
}

impl RenderConfig {
    /// The preview aspect ratio the poster should be composed at, if the
    /// format dictates one.
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.format == OutputFormat::Pdf).then(|| self.paper.aspect_ratio())
    }
}

/// Serialize `poster` as configured.
///
/// # Errors
///
/// Whatever the serializer reports; see [`ExportError`].
pub fn render(
    poster: &ComposedPoster,
    config: &RenderConfig,
    fonts: &FontSet,
) -> Result<PosterArtifact, ExportError> {
    match config.format {
        OutputFormat::Png => to_png(&poster.canvas, &RasterOptions {
            dpi: config.dpi,
            fonts: fonts.clone(),
        }),
        OutputFormat::Pdf => to_pdf(poster.canvas.clone(), &PageOptions {
            paper: config.paper,
            title: Some(poster.theme.name.clone()),
        }),
        OutputFormat::Svg => Ok(to_svg(&poster.canvas)),
    }
}

/// File name for a poster of `city` in `theme_id`.
#[must_use]
pub fn output_filename(
    city: &str,
    theme_id: &str,
    config: &RenderConfig,
    now: NaiveDateTime,
) -> String {
    match config.format {
        OutputFormat::Png => raster_filename(city, theme_id, now),
        OutputFormat::Pdf => page_filename(city, theme_id, &config.paper),
        OutputFormat::Svg => vector_filename(city, theme_id, now),
    }
}

/// Write `artifact` to `dir/filename`, creating `dir` if needed.
///
/// # Errors
///
/// [`IoError::Io`] if the directory or file cannot be written.
pub fn save_artifact(
    dir: &Path,
    filename: &str,
    artifact: &PosterArtifact,
) -> Result<PathBuf, IoError> {
    std::fs::create_dir_all(dir).map_err(|err| IoError::io(dir, err))?;
    let path = dir.join(filename);
    std::fs::write(&path, artifact.as_bytes()).map_err(|err| IoError::io(&path, err))?;
    log::info!(
        "saved {} ({} bytes)",
        path.display(),
        artifact.as_bytes().len()
    );
    Ok(path)
}
