//! Shared types for the maposter composition pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Millimetres per inch. Physical sizes cross the crate boundary in
/// millimetres; the canvas is sized in inches.
pub const MM_PER_INCH: f64 = 25.4;

/// Typographic points per inch. Stroke widths and font sizes on the
/// canvas are expressed in points.
pub const POINTS_PER_INCH: f64 = 72.0;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Pure black, used for registration marks.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Pure white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create a color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `#RGB` (the leading `#` is required,
    /// hex digits are case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ColorParseError`] if the string is not a hex color.
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError(input.to_owned());
        let digits = input.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Channels as fractions in `[0, 1]`, as PDF color operators expect.
    #[must_use]
    pub fn to_unit_rgb(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A string that is not a valid hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color: {0:?}")]
pub struct ColorParseError(pub String);

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude, positive north.
    pub lat: f64,
    /// Longitude, positive east.
    pub lon: f64,
}

impl LatLon {
    /// Create a new position.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// The geographic layers a poster is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeoLayer {
    /// The routable street network. Required.
    StreetGraph,
    /// Lakes, bays and waterways. Optional.
    WaterFeatures,
    /// Parks, grass and forest. Optional.
    ParkFeatures,
}

impl fmt::Display for GeoLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StreetGraph => "street network",
            Self::WaterFeatures => "water features",
            Self::ParkFeatures => "parks",
        })
    }
}

/// Failure reported by a geodata provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeodataError {
    /// The provider could not deliver the layer (network, parse, quota).
    #[error("geodata unavailable: {0}")]
    Unavailable(String),

    /// The provider answered but the layer contains nothing.
    #[error("no geodata found in the requested area")]
    Empty,
}

/// Failure reported by a geocoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    /// The geocoder has no match for the query.
    #[error("no match for {query:?}")]
    NotFound {
        /// The query as sent to the geocoder.
        query: String,
    },

    /// The geocoder could not be reached or answered garbage.
    #[error("geocoding failed: {0}")]
    Failed(String),
}

/// Terminal failures of a poster request.
///
/// Optional layers never produce an error: their failures are reported
/// through [`crate::PipelineEvent::LayerUnavailable`] and the layer is
/// left out of the composition.
#[derive(Debug, thiserror::Error)]
pub enum PosterError {
    /// The map radius must be at least one metre.
    #[error("map radius must be positive, got {0} m")]
    InvalidRadius(u32),

    /// The geocoder has no match for the requested place.
    #[error("could not find coordinates for {city}, {country}")]
    LocationNotFound {
        /// Requested city.
        city: String,
        /// Requested country.
        country: String,
    },

    /// The geocoder failed for a reason other than "no match".
    #[error("geocoding failed: {0}")]
    Geocoding(String),

    /// The required street network could not be fetched.
    #[error("failed to fetch street network: {0}")]
    StreetsUnavailable(#[source] GeodataError),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Color tests ---

    #[test]
    fn color_parses_six_digit_hex() {
        assert_eq!(Color::from_hex("#0A1b2C").unwrap(), Color::rgb(10, 27, 44));
    }

    #[test]
    fn color_parses_three_digit_hex() {
        assert_eq!(Color::from_hex("#fa0").unwrap(), Color::rgb(255, 170, 0));
    }

    #[test]
    fn color_rejects_missing_hash() {
        assert!(Color::from_hex("FFFFFF").is_err());
    }

    #[test]
    fn color_rejects_bad_digits_and_lengths() {
        assert!(Color::from_hex("#GGGGGG").is_err());
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#").is_err());
        assert!(Color::from_hex("#ÄÄÄ").is_err());
    }

    #[test]
    fn color_displays_uppercase_hex() {
        assert_eq!(Color::rgb(10, 26, 255).to_string(), "#0A1AFF");
    }

    #[test]
    fn color_serde_uses_hex_strings() {
        let json = serde_json::to_string(&Color::rgb(192, 192, 192)).unwrap();
        assert_eq!(json, "\"#C0C0C0\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(192, 192, 192));
    }

    #[test]
    fn color_unit_rgb() {
        let [r, g, b] = Color::rgb(255, 0, 51).to_unit_rgb();
        assert!((r - 1.0).abs() < f64::EPSILON);
        assert!(g.abs() < f64::EPSILON);
        assert!((b - 0.2).abs() < 1e-12);
    }

    // --- Error display tests ---

    #[test]
    fn location_not_found_display() {
        let err = PosterError::LocationNotFound {
            city: "Atlantis".to_owned(),
            country: "Ocean".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "could not find coordinates for Atlantis, Ocean"
        );
    }

    #[test]
    fn invalid_radius_display() {
        assert_eq!(
            PosterError::InvalidRadius(0).to_string(),
            "map radius must be positive, got 0 m"
        );
    }

    #[test]
    fn streets_unavailable_display_wraps_source() {
        let err = PosterError::StreetsUnavailable(GeodataError::Empty);
        assert_eq!(
            err.to_string(),
            "failed to fetch street network: no geodata found in the requested area"
        );
    }
}
