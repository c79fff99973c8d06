//! Theme resolution: named color palettes merged over a fixed default.
//!
//! A theme definition is a flat JSON object whose keys are role names
//! (`background`, `water`, `road_primary`, ...). Definitions may be
//! partial or partly malformed; [`merge`] takes every role it can parse
//! and leaves the rest at the [`Theme::default`] value, so resolution
//! never fails.
//!
//! Lookup goes through the [`ThemeStore`] trait. The core ships an
//! in-memory store; the filesystem store lives in `maposter-io`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Color;

/// Identifier of the built-in default theme.
pub const DEFAULT_THEME_ID: &str = "feature_based";

/// A semantic color slot in a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeRole {
    /// Canvas fill behind everything.
    Background,
    /// Captions, divider rule and attribution.
    Text,
    /// Color of the top and bottom gradient fades.
    GradientTint,
    /// Water fill.
    Water,
    /// Park and green-space fill.
    Parks,
    /// Motorways and their links.
    RoadMotorway,
    /// Trunk and primary roads.
    RoadPrimary,
    /// Secondary roads.
    RoadSecondary,
    /// Tertiary roads.
    RoadTertiary,
    /// Residential and living streets.
    RoadResidential,
    /// Everything else in the street graph.
    RoadDefault,
}

impl ThemeRole {
    /// Every role, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Background,
        Self::Text,
        Self::GradientTint,
        Self::Water,
        Self::Parks,
        Self::RoadMotorway,
        Self::RoadPrimary,
        Self::RoadSecondary,
        Self::RoadTertiary,
        Self::RoadResidential,
        Self::RoadDefault,
    ];

    /// The canonical JSON key for this role.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Text => "text",
            Self::GradientTint => "gradient_tint",
            Self::Water => "water",
            Self::Parks => "parks",
            Self::RoadMotorway => "road_motorway",
            Self::RoadPrimary => "road_primary",
            Self::RoadSecondary => "road_secondary",
            Self::RoadTertiary => "road_tertiary",
            Self::RoadResidential => "road_residential",
            Self::RoadDefault => "road_default",
        }
    }

    /// Legacy key accepted as a synonym in theme files.
    #[must_use]
    pub const fn alias(self) -> Option<&'static str> {
        match self {
            Self::Background => Some("bg"),
            Self::GradientTint => Some("gradient_color"),
            _ => None,
        }
    }
}

/// A fully resolved palette. Every role has a color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Display name of the theme.
    pub name: String,
    /// Optional human description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canvas background.
    pub background: Color,
    /// Caption color.
    pub text: Color,
    /// Gradient fade color.
    pub gradient_tint: Color,
    /// Water fill.
    pub water: Color,
    /// Park fill.
    pub parks: Color,
    /// Motorway stroke.
    pub road_motorway: Color,
    /// Primary stroke.
    pub road_primary: Color,
    /// Secondary stroke.
    pub road_secondary: Color,
    /// Tertiary stroke.
    pub road_tertiary: Color,
    /// Residential stroke.
    pub road_residential: Color,
    /// Fallback road stroke.
    pub road_default: Color,
}

impl Default for Theme {
    /// The classic black & white palette with a road hierarchy.
    fn default() -> Self {
        Self {
            name: DEFAULT_THEME_ID.to_owned(),
            description: Some("Classic black & white with road hierarchy".to_owned()),
            background: Color::rgb(0xFF, 0xFF, 0xFF),
            text: Color::rgb(0x00, 0x00, 0x00),
            gradient_tint: Color::rgb(0xFF, 0xFF, 0xFF),
            water: Color::rgb(0xC0, 0xC0, 0xC0),
            parks: Color::rgb(0xF0, 0xF0, 0xF0),
            road_motorway: Color::rgb(0x0A, 0x0A, 0x0A),
            road_primary: Color::rgb(0x1A, 0x1A, 0x1A),
            road_secondary: Color::rgb(0x2A, 0x2A, 0x2A),
            road_tertiary: Color::rgb(0x3A, 0x3A, 0x3A),
            road_residential: Color::rgb(0x4A, 0x4A, 0x4A),
            road_default: Color::rgb(0x3A, 0x3A, 0x3A),
        }
    }
}

impl Theme {
    /// The color assigned to `role`.
    #[must_use]
    pub const fn color(&self, role: ThemeRole) -> Color {
        match role {
            ThemeRole::Background => self.background,
            ThemeRole::Text => self.text,
            ThemeRole::GradientTint => self.gradient_tint,
            ThemeRole::Water => self.water,
            ThemeRole::Parks => self.parks,
            ThemeRole::RoadMotorway => self.road_motorway,
            ThemeRole::RoadPrimary => self.road_primary,
            ThemeRole::RoadSecondary => self.road_secondary,
            ThemeRole::RoadTertiary => self.road_tertiary,
            ThemeRole::RoadResidential => self.road_residential,
            ThemeRole::RoadDefault => self.road_default,
        }
    }

    fn set_color(&mut self, role: ThemeRole, color: Color) {
        let slot = match role {
            ThemeRole::Background => &mut self.background,
            ThemeRole::Text => &mut self.text,
            ThemeRole::GradientTint => &mut self.gradient_tint,
            ThemeRole::Water => &mut self.water,
            ThemeRole::Parks => &mut self.parks,
            ThemeRole::RoadMotorway => &mut self.road_motorway,
            ThemeRole::RoadPrimary => &mut self.road_primary,
            ThemeRole::RoadSecondary => &mut self.road_secondary,
            ThemeRole::RoadTertiary => &mut self.road_tertiary,
            ThemeRole::RoadResidential => &mut self.road_residential,
            ThemeRole::RoadDefault => &mut self.road_default,
        };
        *slot = color;
    }
}

/// A raw, possibly partial theme definition as read from a store.
///
/// Values are kept as untyped JSON so one malformed role cannot
/// invalidate the rest of the definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeOverrides(pub BTreeMap<String, Value>);

impl ThemeOverrides {
    /// Parse a JSON theme definition.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text is not a JSON object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Build overrides from `(key, value)` pairs.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_owned(), Value::String(v.to_owned())))
                .collect(),
        )
    }

    fn role_value(&self, role: ThemeRole) -> Option<&Value> {
        self.0
            .get(role.key())
            .or_else(|| role.alias().and_then(|alias| self.0.get(alias)))
    }
}

/// Layer `overrides` on top of `base`, role by role.
///
/// Roles that are absent, not strings, or not valid hex colors keep the
/// value from `base`. A string `name` or `description` replaces the
/// base's; unknown keys are ignored.
#[must_use]
pub fn merge(base: &Theme, overrides: &ThemeOverrides) -> Theme {
    let mut theme = base.clone();

    if let Some(Value::String(name)) = overrides.0.get("name") {
        theme.name.clone_from(name);
    }
    if let Some(Value::String(description)) = overrides.0.get("description") {
        theme.description = Some(description.clone());
    }

    for role in ThemeRole::ALL {
        let Some(value) = overrides.role_value(role) else {
            continue;
        };
        match value.as_str().map(Color::from_hex) {
            Some(Ok(color)) => theme.set_color(role, color),
            Some(Err(err)) => {
                log::warn!("theme {:?}: role {}: {err}; using default", theme.name, role.key());
            }
            None => {
                log::warn!(
                    "theme {:?}: role {} is not a string; using default",
                    theme.name,
                    role.key()
                );
            }
        }
    }

    theme
}

/// Source of stored theme definitions.
pub trait ThemeStore {
    /// Fetch the raw definition for `theme_id`, or `None` if the store
    /// has no such theme (or cannot read it).
    fn load(&self, theme_id: &str) -> Option<ThemeOverrides>;

    /// Identifiers of every theme the store can serve, sorted.
    fn list(&self) -> Vec<String>;
}

/// Resolve `theme_id` against `store`, falling back to the default.
///
/// When the id is unknown the default theme is returned unchanged.
/// Otherwise the stored definition is merged over the default, so a
/// definition without `name` or `description` keeps the default's.
#[must_use]
pub fn resolve<S: ThemeStore + ?Sized>(theme_id: &str, store: &S) -> Theme {
    let Some(overrides) = store.load(theme_id) else {
        log::debug!("theme {theme_id:?} not found; using {DEFAULT_THEME_ID}");
        return Theme::default();
    };

    merge(&Theme::default(), &overrides)
}

/// A [`ThemeStore`] backed by a map, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryThemeStore {
    themes: BTreeMap<String, ThemeOverrides>,
}

impl InMemoryThemeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition.
    pub fn insert(&mut self, theme_id: impl Into<String>, overrides: ThemeOverrides) {
        self.themes.insert(theme_id.into(), overrides);
    }
}

impl ThemeStore for InMemoryThemeStore {
    fn load(&self, theme_id: &str) -> Option<ThemeOverrides> {
        self.themes.get(theme_id).cloned()
    }

    fn list(&self) -> Vec<String> {
        if self.themes.is_empty() {
            return vec![DEFAULT_THEME_ID.to_owned()];
        }
        self.themes.keys().cloned().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_noir() -> ThemeOverrides {
        ThemeOverrides::from_pairs([
            ("name", "Noir"),
            ("background", "#000000"),
            ("text", "#FFFFFF"),
            ("gradient_tint", "#000000"),
            ("water", "#0A0A0A"),
            ("parks", "#111111"),
            ("road_motorway", "#FFFFFF"),
            ("road_primary", "#EEEEEE"),
            ("road_secondary", "#DDDDDD"),
            ("road_tertiary", "#CCCCCC"),
            ("road_residential", "#BBBBBB"),
            ("road_default", "#AAAAAA"),
        ])
    }

    #[test]
    fn unknown_theme_resolves_to_default_unchanged() {
        let store = InMemoryThemeStore::new();
        for id in ["feature_based", "missing", "", "NOIR"] {
            assert_eq!(resolve(id, &store), Theme::default());
        }
    }

    #[test]
    fn complete_theme_overrides_every_role() {
        let mut store = InMemoryThemeStore::new();
        store.insert("noir", full_noir());
        let theme = resolve("noir", &store);
        assert_eq!(theme.name, "Noir");
        assert_eq!(theme.background, Color::rgb(0, 0, 0));
        assert_eq!(theme.road_default, Color::rgb(0xAA, 0xAA, 0xAA));
    }

    #[test]
    fn missing_role_comes_from_default() {
        for missing in ThemeRole::ALL {
            let mut overrides = full_noir();
            overrides.0.remove(missing.key());
            let mut store = InMemoryThemeStore::new();
            store.insert("noir", overrides);

            let theme = resolve("noir", &store);
            let reference = merge(&Theme::default(), &full_noir());
            for role in ThemeRole::ALL {
                let expected = if role == missing {
                    Theme::default().color(role)
                } else {
                    reference.color(role)
                };
                assert_eq!(theme.color(role), expected, "role {}", role.key());
            }
        }
    }

    #[test]
    fn malformed_roles_are_rejected_individually() {
        let overrides = ThemeOverrides::from_json(
            r##"{"water": "blue", "parks": 42, "text": "#123456", "unknown": "#FFFFFF"}"##,
        )
        .unwrap();
        let theme = merge(&Theme::default(), &overrides);
        assert_eq!(theme.water, Theme::default().water);
        assert_eq!(theme.parks, Theme::default().parks);
        assert_eq!(theme.text, Color::rgb(0x12, 0x34, 0x56));
    }

    #[test]
    fn legacy_aliases_are_accepted() {
        let overrides = ThemeOverrides::from_pairs([("bg", "#102030"), ("gradient_color", "#405060")]);
        let theme = merge(&Theme::default(), &overrides);
        assert_eq!(theme.background, Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(theme.gradient_tint, Color::rgb(0x40, 0x50, 0x60));
    }

    #[test]
    fn canonical_key_wins_over_alias() {
        let overrides = ThemeOverrides::from_pairs([("bg", "#102030"), ("background", "#FFFFFF")]);
        let theme = merge(&Theme::default(), &overrides);
        assert_eq!(theme.background, Color::WHITE);
    }

    #[test]
    fn stored_theme_without_name_keeps_default_name() {
        let mut store = InMemoryThemeStore::new();
        store.insert("sepia", ThemeOverrides::from_pairs([("water", "#704214")]));
        let theme = resolve("sepia", &store);
        assert_eq!(theme.name, DEFAULT_THEME_ID);
        assert_eq!(theme.description, Theme::default().description);
        assert_eq!(theme.water, Color::rgb(0x70, 0x42, 0x14));
    }

    #[test]
    fn merge_is_pure_over_empty_overrides() {
        let theme = merge(&Theme::default(), &ThemeOverrides::default());
        assert_eq!(theme, Theme::default());
    }

    #[test]
    fn in_memory_list_is_sorted_and_never_empty() {
        let mut store = InMemoryThemeStore::new();
        assert_eq!(store.list(), vec![DEFAULT_THEME_ID.to_owned()]);
        store.insert("zen", ThemeOverrides::default());
        store.insert("autumn", ThemeOverrides::default());
        assert_eq!(store.list(), vec!["autumn".to_owned(), "zen".to_owned()]);
    }

    #[test]
    fn role_keys_match_serde_names() {
        for role in ThemeRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.key()));
        }
    }
}
