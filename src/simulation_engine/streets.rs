use serde::{Deserialize, Serialize};

use crate::simulation_engine::intersections::IntersectionId;

/// Index of a street in the owning [`RoadNetwork`] arena.
///
/// [`RoadNetwork`]: crate::simulation_engine::network::RoadNetwork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreetId(pub usize);

/// A road segment connecting two intersections.
///
/// Streets are bidirectional: a vehicle's driving direction is given by its
/// current destination, not by the street itself.
#[derive(Debug, Clone)]
pub struct Street {
    pub id: StreetId,
    /// The two intersections this street touches.
    pub endpoints: (IntersectionId, IntersectionId),
    /// Length in meters.
    pub length: f64,
}

impl Street {
    pub fn new(id: StreetId, a: IntersectionId, b: IntersectionId, length: f64) -> Self {
        Self {
            id,
            endpoints: (a, b),
            length,
        }
    }

    /// The endpoint that is not the given one. Used when a vehicle picks its
    /// next destination after crossing.
    pub fn other_endpoint(&self, than: IntersectionId) -> IntersectionId {
        if self.endpoints.0 == than {
            self.endpoints.1
        } else {
            self.endpoints.0
        }
    }
}
