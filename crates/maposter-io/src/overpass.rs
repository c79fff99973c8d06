//! Geodata from the Overpass API.
//!
//! Every layer is one Overpass QL query answered with `out geom`, so
//! ways and relation members arrive with their coordinates inline and
//! no node lookups are needed.
//!
//! - Streets: every `highway` way except areas and non-existent roads.
//!   Each way becomes one edge between its end nodes carrying the full
//!   way geometry.
//! - Water: `natural=water|bay` and `waterway=*`.
//! - Parks: `leisure=park` and `landuse=grass|forest`.
//!
//! Closed ways become polygons, open ways lines. Multipolygon relations
//! have their member ways stitched into rings.

use std::collections::BTreeMap;
use std::time::Duration;

use geo::{
    Coord, Geometry, Intersects, LineString, MultiLineString, MultiPolygon, Point, Polygon,
};
use maposter_core::{
    FeatureCollection, GeodataError, GeodataProvider, HighwayTag, LatLon, RawTagValue, StreetEdge,
    StreetGraph,
};
use serde::Deserialize;

use crate::IoError;
use crate::nominatim::USER_AGENT;

/// Public Overpass endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Server-side query timeout, in seconds.
const QUERY_TIMEOUT_S: u32 = 180;

/// `highway` values that are not drivable or walkable streets.
const STREET_EXCLUDE: &str = "abandoned|bus_guideway|construction|corridor|elevator|escalator|\
                              no|planned|platform|proposed|raceway|razed";

/// A [`GeodataProvider`] backed by an Overpass server.
#[derive(Debug, Clone)]
pub struct OverpassProvider {
    agent: ureq::Agent,
    endpoint: String,
}

impl Default for OverpassProvider {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl OverpassProvider {
    /// A provider for the interpreter at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(u64::from(QUERY_TIMEOUT_S) + 20))
                .user_agent(USER_AGENT)
                .build(),
            endpoint: endpoint.into(),
        }
    }

    fn run(&self, query: &str) -> Result<String, IoError> {
        log::debug!("overpass query: {query}");
        self.agent
            .post(&self.endpoint)
            .send_form(&[("data", query)])
            .map_err(|err| IoError::Http(err.to_string()))?
            .into_string()
            .map_err(|err| IoError::Http(err.to_string()))
    }

    fn features(&self, query: &str) -> Result<FeatureCollection, GeodataError> {
        let body = self.run(query).map_err(unavailable)?;
        parse_features(&body)
    }
}

fn unavailable(err: impl std::fmt::Display) -> GeodataError {
    GeodataError::Unavailable(err.to_string())
}

fn around(radius_m: u32, center: LatLon) -> String {
    format!("(around:{radius_m},{},{})", center.lat, center.lon)
}

/// Overpass QL for the street network.
#[must_use]
pub fn street_query(center: LatLon, radius_m: u32) -> String {
    format!(
        "[out:json][timeout:{QUERY_TIMEOUT_S}];\
         way[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"{STREET_EXCLUDE}\"]{};\
         out geom;",
        around(radius_m, center)
    )
}

/// Overpass QL for ways and relations matching any of `filters`.
#[must_use]
pub fn feature_query(filters: &[&str], center: LatLon, radius_m: u32) -> String {
    let area = around(radius_m, center);
    let mut query = format!("[out:json][timeout:{QUERY_TIMEOUT_S}];(");
    for filter in filters {
        query.push_str(&format!("way{filter}{area};relation{filter}{area};"));
    }
    query.push_str(");out geom;");
    query
}

const WATER_FILTERS: [&str; 2] = ["[\"natural\"~\"^(water|bay)$\"]", "[\"waterway\"]"];

const PARK_FILTERS: [&str; 2] = [
    "[\"leisure\"=\"park\"]",
    "[\"landuse\"~\"^(grass|forest)$\"]",
];

impl GeodataProvider for OverpassProvider {
    fn street_graph(&self, center: LatLon, radius_m: u32) -> Result<StreetGraph, GeodataError> {
        let body = self
            .run(&street_query(center, radius_m))
            .map_err(unavailable)?;
        parse_street_graph(&body)
    }

    fn water_features(
        &self,
        center: LatLon,
        radius_m: u32,
    ) -> Result<FeatureCollection, GeodataError> {
        self.features(&feature_query(&WATER_FILTERS, center, radius_m))
    }

    fn park_features(
        &self,
        center: LatLon,
        radius_m: u32,
    ) -> Result<FeatureCollection, GeodataError> {
        self.features(&feature_query(&PARK_FILTERS, center, radius_m))
    }
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    elements: Vec<Element>,
    /// Set when the server gave up, for example on a timeout.
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Way {
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        geometry: Vec<Option<GeomPoint>>,
        #[serde(default)]
        tags: BTreeMap<String, RawTagValue>,
    },
    Relation {
        #[serde(default)]
        members: Vec<Member>,
        #[serde(default)]
        tags: BTreeMap<String, RawTagValue>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<Option<GeomPoint>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct GeomPoint {
    lat: f64,
    lon: f64,
}

impl From<GeomPoint> for Coord<f64> {
    fn from(p: GeomPoint) -> Self {
        Self { x: p.lon, y: p.lat }
    }
}

fn decode(body: &str) -> Result<Response, GeodataError> {
    let response: Response = serde_json::from_str(body)
        .map_err(|err| unavailable(IoError::Decode(err.to_string())))?;
    match &response.remark {
        Some(remark) if response.elements.is_empty() => {
            Err(GeodataError::Unavailable(remark.clone()))
        }
        _ => Ok(response),
    }
}

fn coords(points: &[Option<GeomPoint>]) -> Vec<Coord<f64>> {
    points.iter().flatten().map(|p| Coord::from(*p)).collect()
}

fn tag<'a>(tags: &'a BTreeMap<String, RawTagValue>, key: &str) -> Option<&'a str> {
    match tags.get(key)? {
        RawTagValue::Single(value) => Some(value.as_str()),
        RawTagValue::List(values) => values.first().map(String::as_str),
    }
}

/// Build a street graph from an Overpass JSON response.
///
/// # Errors
///
/// [`GeodataError::Unavailable`] if the body is not an Overpass response
/// or the server reported an error instead of data.
pub fn parse_street_graph(body: &str) -> Result<StreetGraph, GeodataError> {
    let response = decode(body)?;
    let mut graph = StreetGraph::new();
    let mut nodes = BTreeMap::new();

    for element in response.elements {
        let Element::Way {
            nodes: ids,
            geometry,
            tags,
        } = element
        else {
            continue;
        };
        let line = coords(&geometry);
        if line.len() < 2 || ids.len() != line.len() {
            continue;
        }
        let (Some(&first_id), Some(&last_id)) = (ids.first(), ids.last()) else {
            continue;
        };
        let first = line[0];
        let last = line[line.len() - 1];
        let from = *nodes
            .entry(first_id)
            .or_insert_with(|| graph.add_node(LatLon::new(first.y, first.x)));
        let to = *nodes
            .entry(last_id)
            .or_insert_with(|| graph.add_node(LatLon::new(last.y, last.x)));
        graph.add_edge(from, to, StreetEdge {
            highway: HighwayTag::from_raw(tags.get("highway")),
            geometry: Some(LineString::new(line)),
        });
    }

    log::debug!(
        "street graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Build area and line features from an Overpass JSON response.
///
/// # Errors
///
/// [`GeodataError::Unavailable`] if the body is not an Overpass response
/// or the server reported an error instead of data.
pub fn parse_features(body: &str) -> Result<FeatureCollection, GeodataError> {
    let response = decode(body)?;
    let features: FeatureCollection = response
        .elements
        .into_iter()
        .filter_map(|element| match element {
            Element::Way { geometry, tags, .. } => way_feature(coords(&geometry), &tags),
            Element::Relation { members, tags } => relation_feature(&members, &tags),
            Element::Other => None,
        })
        .collect();
    log::debug!("parsed {} features", features.len());
    Ok(features)
}

fn is_closed(ring: &[Coord<f64>]) -> bool {
    ring.len() >= 4 && ring.first() == ring.last()
}

/// Waterways are lines even when they happen to close on themselves;
/// only the area-like ones are filled.
fn is_linear(tags: &BTreeMap<String, RawTagValue>) -> bool {
    tag(tags, "waterway").is_some_and(|w| !matches!(w, "riverbank" | "dock" | "boatyard"))
}

fn way_feature(
    line: Vec<Coord<f64>>,
    tags: &BTreeMap<String, RawTagValue>,
) -> Option<Geometry<f64>> {
    if line.len() < 2 {
        return None;
    }
    if is_closed(&line) && !is_linear(tags) {
        Some(Geometry::Polygon(Polygon::new(LineString::new(line), vec![])))
    } else {
        Some(Geometry::LineString(LineString::new(line)))
    }
}

fn relation_feature(
    members: &[Member],
    tags: &BTreeMap<String, RawTagValue>,
) -> Option<Geometry<f64>> {
    let ways = members.iter().filter(|m| m.kind == "way");
    if tag(tags, "type") != Some("multipolygon") {
        let lines: Vec<LineString<f64>> = ways
            .map(|m| LineString::new(coords(&m.geometry)))
            .filter(|l| l.0.len() >= 2)
            .collect();
        return (!lines.is_empty()).then(|| Geometry::MultiLineString(MultiLineString::new(lines)));
    }

    let (outer, inner): (Vec<&Member>, Vec<&Member>) = ways.partition(|m| m.role != "inner");
    let outers = stitch(outer.iter().map(|m| coords(&m.geometry)).collect());
    let inners = stitch(inner.iter().map(|m| coords(&m.geometry)).collect());

    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> =
        outers.into_iter().map(|ring| (ring, Vec::new())).collect();
    for hole in inners {
        let Some(&start) = hole.0.first() else {
            continue;
        };
        let owner = polygons.iter_mut().find(|(ring, _)| {
            Polygon::new(ring.clone(), vec![]).intersects(&Point::from(start))
        });
        if let Some((_, holes)) = owner {
            holes.push(hole);
        }
    }

    let mut polygons: Vec<Polygon<f64>> = polygons
        .into_iter()
        .map(|(ring, holes)| Polygon::new(ring, holes))
        .collect();
    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(MultiPolygon::new(polygons))),
    }
}

/// Join way fragments end to end into closed rings. Fragments that never
/// close are dropped.
fn stitch(mut parts: Vec<Vec<Coord<f64>>>) -> Vec<LineString<f64>> {
    parts.retain(|p| p.len() >= 2);
    let mut rings = Vec::new();
    while let Some(mut ring) = parts.pop() {
        while !is_closed(&ring) {
            let Some(&end) = ring.last() else {
                break;
            };
            let Some(index) = parts
                .iter()
                .position(|p| p.first() == Some(&end) || p.last() == Some(&end))
            else {
                break;
            };
            let mut next = parts.swap_remove(index);
            if next.first() != Some(&end) {
                next.reverse();
            }
            ring.extend(next.into_iter().skip(1));
        }
        if is_closed(&ring) {
            rings.push(LineString::new(ring));
        } else {
            log::debug!("dropping unclosed ring of {} points", ring.len());
        }
    }
    rings
}
