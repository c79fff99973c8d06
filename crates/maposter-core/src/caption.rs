//! Caption layer: city, divider, country, coordinates and attribution
//! at fixed positions near the bottom of the poster.

use geo::Coord;

use crate::canvas::{Canvas, FontWeight, HAlign, Layer, Primitive, RuleItem, TextItem, VAlign};
use crate::theme::Theme;
use crate::types::LatLon;

/// Attribution text required by the map data license.
pub const ATTRIBUTION: &str = "\u{a9} OpenStreetMap";

/// Normalized height of the city line.
pub const CITY_Y: f64 = 0.14;
/// Normalized height of the divider rule.
pub const DIVIDER_Y: f64 = 0.125;
/// Normalized height of the country line.
pub const COUNTRY_Y: f64 = 0.10;
/// Normalized height of the coordinate line.
pub const COORDS_Y: f64 = 0.07;

/// The text shown in the caption block.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionText {
    /// City name as entered.
    pub city: String,
    /// Country name as entered.
    pub country: String,
    /// Poster center.
    pub location: LatLon,
}

/// Spread a name for display: uppercase, letters joined by two spaces.
///
/// ```
/// assert_eq!(maposter_core::caption::spaced_upper("Rome"), "R  O  M  E");
/// ```
#[must_use]
pub fn spaced_upper(name: &str) -> String {
    let upper = name.to_uppercase();
    let mut out = String::with_capacity(upper.len() * 3);
    for (i, ch) in upper.chars().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push(ch);
    }
    out
}

/// Format a position as `"48.86°N / 2.35°E"`.
///
/// Hemisphere letters replace signs. Zero counts as north and east.
#[must_use]
pub fn format_coordinates(location: LatLon) -> String {
    let ns = if location.lat < 0.0 { 'S' } else { 'N' };
    let ew = if location.lon < 0.0 { 'W' } else { 'E' };
    format!(
        "{:.2}\u{b0}{ns} / {:.2}\u{b0}{ew}",
        location.lat.abs(),
        location.lon.abs()
    )
}

/// Add the caption block to `canvas` on [`Layer::Captions`].
pub fn add_captions(canvas: &mut Canvas, caption: &CaptionText, theme: &Theme) {
    let color = theme.text;
    let centered = |text: String, y: f64, size_pt: f64, weight: FontWeight, opacity: f64| {
        TextItem {
            text,
            anchor: Coord { x: 0.5, y },
            h_align: HAlign::Center,
            v_align: VAlign::Center,
            size_pt,
            weight,
            color,
            opacity,
        }
    };

    canvas.push(
        Layer::Captions,
        Primitive::Text(centered(
            spaced_upper(&caption.city),
            CITY_Y,
            28.0,
            FontWeight::Bold,
            1.0,
        )),
    );
    canvas.push(
        Layer::Captions,
        Primitive::Rule(RuleItem {
            from: Coord { x: 0.35, y: DIVIDER_Y },
            to: Coord { x: 0.65, y: DIVIDER_Y },
            color,
            width_pt: 1.0,
        }),
    );
    canvas.push(
        Layer::Captions,
        Primitive::Text(centered(
            caption.country.to_uppercase(),
            COUNTRY_Y,
            12.0,
            FontWeight::Regular,
            1.0,
        )),
    );
    canvas.push(
        Layer::Captions,
        Primitive::Text(centered(
            format_coordinates(caption.location),
            COORDS_Y,
            10.0,
            FontWeight::Regular,
            0.7,
        )),
    );
    canvas.push(
        Layer::Captions,
        Primitive::Text(TextItem {
            text: ATTRIBUTION.to_owned(),
            anchor: Coord { x: 0.98, y: 0.02 },
            h_align: HAlign::Right,
            v_align: VAlign::Bottom,
            size_pt: 6.0,
            weight: FontWeight::Regular,
            color,
            opacity: 0.5,
        }),
    );
}
