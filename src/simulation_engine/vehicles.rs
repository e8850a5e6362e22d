use std::time::Duration;

use crate::global_variables::INTERSECTION_SPEED_FACTOR;
use crate::simulation_engine::intersections::IntersectionId;
use crate::simulation_engine::network::RoadNetwork;
use crate::simulation_engine::streets::StreetId;

/// Where a vehicle stands in its crossing life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrivePhase {
    /// Moving along the current street; entry to the destination has not
    /// been granted yet.
    Traveling,
    /// Holding an admission grant and moving through the intersection.
    Crossing,
}

/// A vehicle traveling the road network.
///
/// Every vehicle mutates its own state only from its own drive task; the
/// struct itself carries no synchronization.
#[derive(Debug)]
pub struct Vehicle {
    pub id: u64,
    pub current_street: StreetId,
    /// The intersection this vehicle is currently driving toward.
    pub destination: IntersectionId,
    /// Scalar position along the current street, in meters.
    pub position: f64,
    /// Current speed in meters per second.
    pub speed: f64,
    pub phase: DrivePhase,
}

impl Vehicle {
    pub fn new(id: u64, street: StreetId, destination: IntersectionId, speed: f64) -> Self {
        Self {
            id,
            current_street: street,
            destination,
            position: 0.0,
            speed,
            phase: DrivePhase::Traveling,
        }
    }

    /// Advances the vehicle with a constant-velocity motion model and
    /// returns the completion fraction of the current street (1.0 means the
    /// destination intersection has been reached).
    pub fn advance(&mut self, elapsed: Duration, street_length: f64) -> f64 {
        self.position += self.speed * elapsed.as_secs_f64();
        self.position / street_length
    }

    /// Applies the entry grant: decelerate into the intersection.
    pub fn enter_intersection(&mut self) {
        self.speed /= INTERSECTION_SPEED_FACTOR;
        self.phase = DrivePhase::Crossing;
    }

    /// Moves the vehicle onto its next street after it has cleared the
    /// intersection, restoring cruise speed.
    pub fn exit_onto(&mut self, street: StreetId, destination: IntersectionId) {
        self.current_street = street;
        self.destination = destination;
        self.position = 0.0;
        self.speed *= INTERSECTION_SPEED_FACTOR;
        self.phase = DrivePhase::Traveling;
    }

    /// Interpolated 2-D world position, derived from the completion fraction
    /// between the street's endpoints.
    pub fn world_position(&self, network: &RoadNetwork) -> (f64, f64) {
        let street = network.street(self.current_street);
        let origin = street.other_endpoint(self.destination);
        let (x1, y1) = network.intersection(origin).position;
        let (x2, y2) = network.intersection(self.destination).position;
        let completion = (self.position / street.length).min(1.0);
        (x1 + completion * (x2 - x1), y1 + completion * (y2 - y1))
    }
}
