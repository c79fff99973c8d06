//! Output filenames.
//!
//! Raster and vector outputs carry a timestamp so repeated runs never
//! collide; PDF names describe the paper instead.

use chrono::NaiveDateTime;
use maposter_core::PaperSpec;

/// Lowercase `text` and replace spaces with underscores.
///
/// # Examples
///
/// ```
/// assert_eq!(maposter_export::slug("New York"), "new_york");
/// ```
#[must_use]
pub fn slug(text: &str) -> String {
    text.trim().to_lowercase().replace(' ', "_")
}

fn stamped(city: &str, theme: &str, at: NaiveDateTime, extension: &str) -> String {
    format!(
        "{}_{}_{}.{extension}",
        slug(city),
        theme,
        at.format("%Y%m%d_%H%M%S")
    )
}

/// `<city>_<theme>_<YYYYMMDD_HHMMSS>.png`.
#[must_use]
pub fn raster_filename(city: &str, theme: &str, at: NaiveDateTime) -> String {
    stamped(city, theme, at, "png")
}

/// `<city>_<theme>_<YYYYMMDD_HHMMSS>.svg`.
#[must_use]
pub fn vector_filename(city: &str, theme: &str, at: NaiveDateTime) -> String {
    stamped(city, theme, at, "svg")
}

/// `<city>_<theme>_<paper>_<orient>[_printready].pdf`, where `orient`
/// is the first four letters of the orientation: `port`, `land` or
/// `squa`.
#[must_use]
pub fn page_filename(city: &str, theme: &str, paper: &PaperSpec) -> String {
    let suffix = if paper.print_ready { "_printready" } else { "" };
    format!(
        "{}_{}_{}_{}{suffix}.pdf",
        slug(city),
        theme,
        paper.size.name(),
        paper.orientation.short_name()
    )
}
