//! Geographic input data and the collaborators that supply it.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, the
//! convention `geo` uses for geographic data.

use geo::{Coord, Geometry, LineString};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use crate::classify::{HighwayTag, RoadClass, classify_edge};
use crate::types::{GeocodeError, GeodataError, LatLon};

/// An edge of the street network.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetEdge {
    /// Normalized `highway` tag.
    pub highway: HighwayTag,
    /// Full way geometry between the two endpoint nodes. When `None`
    /// the edge is drawn as a straight segment.
    pub geometry: Option<LineString<f64>>,
}

impl StreetEdge {
    /// Road class of this edge.
    #[must_use]
    pub fn class(&self) -> RoadClass {
        classify_edge(&self.highway)
    }
}

/// A routable street network: nodes are positions, edges are street
/// segments between them.
#[derive(Debug, Clone, Default)]
pub struct StreetGraph {
    graph: DiGraph<Coord<f64>, StreetEdge>,
}

impl StreetGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at `position`.
    pub fn add_node(&mut self, position: LatLon) -> NodeIndex {
        self.graph.add_node(Coord {
            x: position.lon,
            y: position.lat,
        })
    }

    /// Add a street segment from `from` to `to`.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: StreetEdge) -> EdgeIndex {
        self.graph.add_edge(from, to, edge)
    }

    /// Number of street segments.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph has no street segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Iterate over every segment as `(edge, line)`, where `line` is the
    /// edge's own geometry or the straight segment between its nodes.
    pub fn segments(&self) -> impl Iterator<Item = (&StreetEdge, LineString<f64>)> + '_ {
        self.graph.edge_indices().filter_map(move |index| {
            let (from, to) = self.graph.edge_endpoints(index)?;
            let edge = &self.graph[index];
            let line = edge
                .geometry
                .clone()
                .unwrap_or_else(|| LineString::new(vec![self.graph[from], self.graph[to]]));
            Some((edge, line))
        })
    }
}

/// A collection of area or line features (water, parks).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection(Vec<Geometry<f64>>);

impl FeatureCollection {
    /// Wrap a list of geometries.
    #[must_use]
    pub const fn new(features: Vec<Geometry<f64>>) -> Self {
        Self(features)
    }

    /// Returns `true` if there are no features.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of features.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The features.
    #[must_use]
    pub fn features(&self) -> &[Geometry<f64>] {
        &self.0
    }
}

impl FromIterator<Geometry<f64>> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Geometry<f64>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Turns a place name into coordinates.
pub trait Geocoder {
    /// Locate `city` in `country`.
    ///
    /// # Errors
    ///
    /// [`GeocodeError::NotFound`] when there is no match, and
    /// [`GeocodeError::Failed`] for transport or decoding failures.
    fn locate(&self, city: &str, country: &str) -> Result<LatLon, GeocodeError>;
}

/// Supplies the geographic layers around a point.
///
/// Calls may block for seconds; the pipeline treats them as opaque
/// synchronous calls and imposes no timeout of its own.
pub trait GeodataProvider {
    /// The street network within `radius_m` of `center`.
    ///
    /// # Errors
    ///
    /// Any [`GeodataError`]; the pipeline treats it as fatal.
    fn street_graph(&self, center: LatLon, radius_m: u32) -> Result<StreetGraph, GeodataError>;

    /// Water bodies and waterways within `radius_m` of `center`.
    ///
    /// # Errors
    ///
    /// Any [`GeodataError`]; the pipeline drops the layer.
    fn water_features(&self, center: LatLon, radius_m: u32)
    -> Result<FeatureCollection, GeodataError>;

    /// Parks and green space within `radius_m` of `center`.
    ///
    /// # Errors
    ///
    /// Any [`GeodataError`]; the pipeline drops the layer.
    fn park_features(&self, center: LatLon, radius_m: u32)
    -> Result<FeatureCollection, GeodataError>;
}
