//! Request-level orchestration: theme, geocoding, layer fetches,
//! composition and captions.

use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, CanvasSize};
use crate::caption::{CaptionText, add_captions};
use crate::compose::{MapData, compose_layers};
use crate::events::{PipelineEvent, PipelineObserver};
use crate::geodata::{FeatureCollection, GeodataProvider, Geocoder};
use crate::theme::{DEFAULT_THEME_ID, Theme, ThemeStore, resolve};
use crate::types::{GeoLayer, GeocodeError, GeodataError, LatLon, PosterError};

/// Default map radius in metres.
pub const DEFAULT_RADIUS_M: u32 = 29_000;

/// Parameters of one poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterRequest {
    /// City name, shown in the caption.
    pub city: String,
    /// Country name, shown in the caption.
    pub country: String,
    /// Theme identifier; unknown ids use the default theme.
    pub theme_id: String,
    /// Map radius in metres.
    pub radius_m: u32,
    /// Width/height ratio of the preview canvas. `None` gives 12 × 16 in.
    pub aspect_ratio: Option<f64>,
}

impl Default for PosterRequest {
    fn default() -> Self {
        Self {
            city: String::new(),
            country: String::new(),
            theme_id: DEFAULT_THEME_ID.to_owned(),
            radius_m: DEFAULT_RADIUS_M,
            aspect_ratio: None,
        }
    }
}

impl PosterRequest {
    /// A request for `city` in `country` with default settings.
    #[must_use]
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            ..Self::default()
        }
    }
}

/// The result of [`create_poster`]: a finished canvas plus what the
/// exporters and file naming need to know about it.
#[derive(Debug, Clone)]
pub struct ComposedPoster {
    /// The composited canvas.
    pub canvas: Canvas,
    /// The theme it was drawn with.
    pub theme: Theme,
    /// The geocoded poster center.
    pub location: LatLon,
}

/// Build a poster canvas for `request`.
///
/// Steps, each reported to `observer`:
///
/// 1. Resolve the theme (never fails).
/// 2. Geocode the place.
/// 3. Fetch the street network (required), water and parks (optional).
/// 4. Compose the layers, then add the captions.
///
/// # Errors
///
/// - [`PosterError::InvalidRadius`] if `request.radius_m` is zero.
/// - [`PosterError::LocationNotFound`] if the geocoder has no match.
/// - [`PosterError::Geocoding`] if the geocoder fails otherwise.
/// - [`PosterError::StreetsUnavailable`] if the street network cannot be
///   fetched or is empty.
///
/// Failures of the optional layers are reported as
/// [`PipelineEvent::LayerUnavailable`] and the layer is omitted.
pub fn create_poster<G, P, S, O>(
    request: &PosterRequest,
    geocoder: &G,
    provider: &P,
    themes: &S,
    observer: &mut O,
) -> Result<ComposedPoster, PosterError>
where
    G: Geocoder + ?Sized,
    P: GeodataProvider + ?Sized,
    S: ThemeStore + ?Sized,
    O: PipelineObserver + ?Sized,
{
    if request.radius_m == 0 {
        return Err(PosterError::InvalidRadius(request.radius_m));
    }

    let theme = resolve(&request.theme_id, themes);
    observer.notify(&PipelineEvent::ThemeResolved {
        name: theme.name.clone(),
    });

    observer.notify(&PipelineEvent::Geocoding {
        city: request.city.clone(),
        country: request.country.clone(),
    });
    let location = geocoder
        .locate(&request.city, &request.country)
        .map_err(|err| match err {
            GeocodeError::NotFound { .. } => PosterError::LocationNotFound {
                city: request.city.clone(),
                country: request.country.clone(),
            },
            GeocodeError::Failed(message) => PosterError::Geocoding(message),
        })?;
    observer.notify(&PipelineEvent::Located(location));

    let radius = request.radius_m;
    observer.notify(&PipelineEvent::FetchingLayer(GeoLayer::StreetGraph));
    let streets = provider
        .street_graph(location, radius)
        .and_then(|graph| {
            if graph.is_empty() {
                Err(GeodataError::Empty)
            } else {
                Ok(graph)
            }
        })
        .map_err(PosterError::StreetsUnavailable)?;
    observer.notify(&PipelineEvent::LayerFetched {
        layer: GeoLayer::StreetGraph,
        count: streets.edge_count(),
    });

    let water = fetch_optional(GeoLayer::WaterFeatures, observer, || {
        provider.water_features(location, radius)
    });
    let parks = fetch_optional(GeoLayer::ParkFeatures, observer, || {
        provider.park_features(location, radius)
    });

    observer.notify(&PipelineEvent::Rendering);
    let data = MapData {
        streets,
        water,
        parks,
    };
    let mut canvas = compose_layers(
        &theme,
        location,
        f64::from(radius),
        &data,
        CanvasSize::preview(request.aspect_ratio),
    );
    add_captions(
        &mut canvas,
        &CaptionText {
            city: request.city.clone(),
            country: request.country.clone(),
            location,
        },
        &theme,
    );
    observer.notify(&PipelineEvent::Composed {
        operations: canvas.len(),
    });

    Ok(ComposedPoster {
        canvas,
        theme,
        location,
    })
}

fn fetch_optional<O>(
    layer: GeoLayer,
    observer: &mut O,
    fetch: impl FnOnce() -> Result<FeatureCollection, GeodataError>,
) -> Option<FeatureCollection>
where
    O: PipelineObserver + ?Sized,
{
    observer.notify(&PipelineEvent::FetchingLayer(layer));
    match fetch() {
        Ok(features) => {
            observer.notify(&PipelineEvent::LayerFetched {
                layer,
                count: features.len(),
            });
            Some(features)
        }
        Err(err) => {
            log::debug!("{layer}: {err:?}");
            observer.notify(&PipelineEvent::LayerUnavailable {
                layer,
                reason: err.to_string(),
            });
            None
        }
    }
}
