//! Progress events emitted while a poster is built.

use std::fmt;

use crate::types::{GeoLayer, LatLon};

/// One step of poster construction, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The theme has been resolved.
    ThemeResolved {
        /// Name of the resolved theme.
        name: String,
    },
    /// The geocoder is being asked for the place.
    Geocoding {
        /// Requested city.
        city: String,
        /// Requested country.
        country: String,
    },
    /// The place was found.
    Located(LatLon),
    /// A layer fetch is starting.
    FetchingLayer(GeoLayer),
    /// A layer arrived.
    LayerFetched {
        /// The layer.
        layer: GeoLayer,
        /// Number of edges (streets) or features (water, parks).
        count: usize,
    },
    /// An optional layer could not be fetched and is left out.
    LayerUnavailable {
        /// The layer.
        layer: GeoLayer,
        /// Provider message.
        reason: String,
    },
    /// Layers are being composed onto the canvas.
    Rendering,
    /// The canvas is complete.
    Composed {
        /// Number of draw operations on the canvas.
        operations: usize,
    },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThemeResolved { name } => write!(f, "loaded theme: {name}"),
            Self::Geocoding { city, country } => write!(f, "looking up {city}, {country}"),
            Self::Located(at) => write!(f, "found {:.4}, {:.4}", at.lat, at.lon),
            Self::FetchingLayer(layer) => write!(f, "downloading {layer}"),
            Self::LayerFetched { layer, count } => write!(f, "{layer}: {count} items"),
            Self::LayerUnavailable { layer, reason } => {
                write!(f, "{layer} unavailable ({reason}); skipping")
            }
            Self::Rendering => f.write_str("rendering map"),
            Self::Composed { operations } => write!(f, "composed {operations} draw operations"),
        }
    }
}

/// Receives [`PipelineEvent`]s as they happen.
pub trait PipelineObserver {
    /// Called once per event, synchronously.
    fn notify(&mut self, event: &PipelineEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn notify(&mut self, _event: &PipelineEvent) {}
}

/// Forwards events to the `log` facade. Unavailable layers are logged at
/// `warn`, everything else at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn notify(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::LayerUnavailable { .. } => log::warn!("{event}"),
            _ => log::info!("{event}"),
        }
    }
}

/// Records events, mostly for tests.
impl PipelineObserver for Vec<PipelineEvent> {
    fn notify(&mut self, event: &PipelineEvent) {
        self.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_records_in_order() {
        let mut log: Vec<PipelineEvent> = Vec::new();
        log.notify(&PipelineEvent::Rendering);
        log.notify(&PipelineEvent::Composed { operations: 3 });
        assert_eq!(
            log,
            vec![PipelineEvent::Rendering, PipelineEvent::Composed { operations: 3 }]
        );
    }

    #[test]
    fn display_is_human_readable() {
        let event = PipelineEvent::LayerUnavailable {
            layer: GeoLayer::WaterFeatures,
            reason: "timeout".to_owned(),
        };
        assert_eq!(event.to_string(), "water features unavailable (timeout); skipping");
        assert_eq!(
            PipelineEvent::Located(LatLon::new(48.85661, 2.35222)).to_string(),
            "found 48.8566, 2.3522"
        );
    }
}
