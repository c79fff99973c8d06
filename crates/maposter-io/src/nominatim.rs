//! Geocoding through the Nominatim search API.

use std::time::Duration;

use maposter_core::{GeocodeError, Geocoder, LatLon};
use serde::Deserialize;

use crate::IoError;

/// Public Nominatim endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// User agent sent with every request; Nominatim rejects anonymous ones.
pub const USER_AGENT: &str = concat!("maposter/", env!("CARGO_PKG_VERSION"));

const TIMEOUT: Duration = Duration::from_secs(30);

/// One search hit. Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// A [`Geocoder`] that asks a Nominatim server for the first match of
/// `"<city>, <country>"`.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    agent: ureq::Agent,
    endpoint: String,
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl NominatimGeocoder {
    /// A geocoder for the server at `endpoint` (the `/search` URL).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(TIMEOUT)
                .user_agent(USER_AGENT)
                .build(),
            endpoint: endpoint.into(),
        }
    }

    fn search(&self, query: &str) -> Result<String, IoError> {
        self.agent
            .get(&self.endpoint)
            .query("q", query)
            .query("format", "json")
            .query("limit", "1")
            .call()
            .map_err(|err| IoError::Http(err.to_string()))?
            .into_string()
            .map_err(|err| IoError::Http(err.to_string()))
    }
}

impl Geocoder for NominatimGeocoder {
    fn locate(&self, city: &str, country: &str) -> Result<LatLon, GeocodeError> {
        let query = format!("{city}, {country}");
        log::debug!("geocoding {query:?} via {}", self.endpoint);
        let body = self
            .search(&query)
            .map_err(|err| GeocodeError::Failed(err.to_string()))?;
        parse_search(&body, &query)
    }
}

/// Parse a Nominatim `format=json` search response.
///
/// # Errors
///
/// [`GeocodeError::NotFound`] for an empty result list,
/// [`GeocodeError::Failed`] for anything that is not a search response.
pub fn parse_search(body: &str, query: &str) -> Result<LatLon, GeocodeError> {
    let places: Vec<Place> = serde_json::from_str(body)
        .map_err(|err| GeocodeError::Failed(IoError::Decode(err.to_string()).to_string()))?;
    let Some(place) = places.first() else {
        return Err(GeocodeError::NotFound {
            query: query.to_owned(),
        });
    };
    let coordinate = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|err| GeocodeError::Failed(format!("bad coordinate {value:?}: {err}")))
    };
    Ok(LatLon::new(coordinate(&place.lat)?, coordinate(&place.lon)?))
}
