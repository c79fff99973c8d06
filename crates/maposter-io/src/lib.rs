//! maposter-io: Filesystem and network I/O.
//!
//! Concrete implementations of the collaborators `maposter-core` only
//! knows as traits (a theme directory, a Nominatim geocoder, an Overpass
//! geodata provider) plus system font discovery and persistence of the
//! serialized posters.

pub mod fonts;
pub mod nominatim;
pub mod output;
pub mod overpass;
pub mod themes;

use std::path::PathBuf;

pub use fonts::{FONT_DIR_ENV, discover_fonts, load_fonts};
pub use nominatim::NominatimGeocoder;
pub use output::{OutputFormat, RenderConfig, output_filename, render, save_artifact};
pub use overpass::OverpassProvider;
pub use themes::DirThemeStore;

/// Errors from filesystem and network operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// A file or directory could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// A response or file could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl IoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
