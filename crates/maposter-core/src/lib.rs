//! maposter-core: Pure poster composition pipeline (sans-IO).
//!
//! Turns a street graph, optional water and park layers and a theme
//! into a [`Canvas`]:
//! theme -> geocode -> fetch layers -> classify roads -> compose layers
//! -> captions.
//!
//! Paper sizing ([`paper`]) and crop marks ([`crop_marks`]) are applied
//! afterwards by the exporters.
//!
//! This crate has **no I/O dependencies**. The geocoder, the geodata
//! provider and the theme store are traits; concrete HTTP and
//! filesystem implementations live in `maposter-io`, serializers in
//! `maposter-export`.

pub mod canvas;
pub mod caption;
pub mod classify;
pub mod compose;
pub mod crop_marks;
pub mod events;
pub mod geodata;
pub mod paper;
pub mod pipeline;
pub mod projection;
pub mod theme;
pub mod types;

pub use canvas::{
    Canvas, CanvasSize, ContentRegion, DrawOp, FadeBand, FadeEdge, FontWeight, GradientFade,
    HAlign, Layer, MapView, Primitive, RuleItem, TextItem, VAlign,
};
pub use classify::{HighwayTag, RawTagValue, RoadClass, RoadStyle, classify_edge, style_for};
pub use compose::{MapData, compose_layers};
pub use crop_marks::{CropMark, CropMarks, crop_marks};
pub use events::{LogObserver, NoopObserver, PipelineEvent, PipelineObserver};
pub use geodata::{FeatureCollection, GeodataProvider, Geocoder, StreetEdge, StreetGraph};
pub use paper::{
    Orientation, PaperSize, PaperSpec, apply_to_canvas, aspect_ratio, resolve_dimensions,
};
pub use pipeline::{ComposedPoster, PosterRequest, create_poster};
pub use projection::LocalProjection;
pub use theme::{
    DEFAULT_THEME_ID, InMemoryThemeStore, Theme, ThemeOverrides, ThemeRole, ThemeStore, merge,
    resolve,
};
pub use types::{
    Color, ColorParseError, GeoLayer, GeocodeError, GeodataError, LatLon, MM_PER_INCH,
    POINTS_PER_INCH, PosterError,
};
