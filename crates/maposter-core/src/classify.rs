//! Road classification: OSM `highway` tags to a road class, and road
//! classes to stroke styles.
//!
//! OSM ways merged by the data provider may carry several `highway`
//! values. [`HighwayTag`] normalizes that at the ingestion boundary: it
//! keeps only the first value, so classification itself only ever sees
//! a single optional token.

use serde::{Deserialize, Serialize};

use crate::theme::{Theme, ThemeRole};
use crate::types::Color;

/// A raw tag value as delivered by a data source: a single token or an
/// ordered list of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTagValue {
    /// One token.
    Single(String),
    /// Several tokens; only the first is meaningful for styling.
    List(Vec<String>),
}

/// The normalized `highway` tag of a street edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighwayTag(Option<String>);

impl HighwayTag {
    /// An edge without a `highway` tag.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// A single known token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    /// Normalize a raw tag value, keeping the first token of a list.
    #[must_use]
    pub fn from_raw(raw: Option<&RawTagValue>) -> Self {
        match raw {
            Some(RawTagValue::Single(value)) => Self(Some(value.clone())),
            Some(RawTagValue::List(values)) => Self(values.first().cloned()),
            None => Self(None),
        }
    }

    /// The tag token, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Stroke hierarchy of the street network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoadClass {
    /// `motorway`, `motorway_link`.
    Motorway,
    /// `trunk`, `trunk_link`, `primary`, `primary_link`.
    Primary,
    /// `secondary`, `secondary_link`.
    Secondary,
    /// `tertiary`, `tertiary_link`.
    Tertiary,
    /// `residential`, `living_street`.
    Residential,
    /// Anything else, including untagged edges.
    Default,
}

impl RoadClass {
    /// Every class, heaviest first.
    pub const ALL: [Self; 6] = [
        Self::Motorway,
        Self::Primary,
        Self::Secondary,
        Self::Tertiary,
        Self::Residential,
        Self::Default,
    ];

    /// Classify a single `highway` token. Matching is exact and
    /// case-sensitive.
    #[must_use]
    pub fn from_highway(value: &str) -> Self {
        match value {
            "motorway" | "motorway_link" => Self::Motorway,
            "trunk" | "trunk_link" | "primary" | "primary_link" => Self::Primary,
            "secondary" | "secondary_link" => Self::Secondary,
            "tertiary" | "tertiary_link" => Self::Tertiary,
            "residential" | "living_street" => Self::Residential,
            _ => Self::Default,
        }
    }

    /// The theme role that colors this class.
    #[must_use]
    pub const fn role(self) -> ThemeRole {
        match self {
            Self::Motorway => ThemeRole::RoadMotorway,
            Self::Primary => ThemeRole::RoadPrimary,
            Self::Secondary => ThemeRole::RoadSecondary,
            Self::Tertiary => ThemeRole::RoadTertiary,
            Self::Residential => ThemeRole::RoadResidential,
            Self::Default => ThemeRole::RoadDefault,
        }
    }

    /// Stroke width in canvas points.
    #[must_use]
    pub const fn stroke_width(self) -> f64 {
        match self {
            Self::Motorway => 1.2,
            Self::Primary => 1.0,
            Self::Secondary => 0.8,
            Self::Tertiary => 0.6,
            Self::Residential => 0.4,
            Self::Default => 0.3,
        }
    }
}

/// Classify a street edge by its normalized `highway` tag.
#[must_use]
pub fn classify_edge(tag: &HighwayTag) -> RoadClass {
    tag.as_str().map_or(RoadClass::Default, RoadClass::from_highway)
}

/// The stroke used for one road class under one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in canvas points.
    pub width: f64,
}

/// Look up the stroke for `class` under `theme`.
#[must_use]
pub const fn style_for(class: RoadClass, theme: &Theme) -> RoadStyle {
    RoadStyle {
        color: theme.color(class.role()),
        width: class.stroke_width(),
    }
}
