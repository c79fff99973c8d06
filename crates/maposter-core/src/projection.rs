//! Local planar projection around the poster center.
//!
//! Posters cover at most a few tens of kilometres, so an
//! equirectangular projection scaled by the cosine of the center
//! latitude is indistinguishable from a proper conformal projection at
//! print resolution, and it keeps distances in metres.

use geo::{Coord, MapCoords};

use crate::types::LatLon;

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Projects WGS84 coordinates (`x = lon`, `y = lat`) to metres east and
/// north of an origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin: LatLon,
    metres_per_degree_x: f64,
    metres_per_degree_y: f64,
}

impl LocalProjection {
    /// A projection centered on `origin`.
    #[must_use]
    pub fn new(origin: LatLon) -> Self {
        let metres_per_degree_y = EARTH_RADIUS_M.to_radians();
        Self {
            origin,
            metres_per_degree_x: metres_per_degree_y * origin.lat.to_radians().cos(),
            metres_per_degree_y,
        }
    }

    /// The projection origin.
    #[must_use]
    pub const fn origin(&self) -> LatLon {
        self.origin
    }

    /// Project one geographic coordinate to metres.
    #[must_use]
    pub fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (coord.x - self.origin.lon) * self.metres_per_degree_x,
            y: (coord.y - self.origin.lat) * self.metres_per_degree_y,
        }
    }

    /// Project every coordinate of a geometry.
    #[must_use]
    pub fn project_geometry<G>(&self, geometry: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
    {
        let projection = *self;
        geometry.map_coords(move |coord| projection.project(coord))
    }
}
