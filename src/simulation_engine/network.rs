use rand::seq::IndexedRandom;

use crate::simulation_engine::intersections::{Intersection, IntersectionId};
use crate::simulation_engine::streets::{Street, StreetId};

/// Owning arena for the whole road graph.
///
/// Intersections and streets reference each other by arena index instead of
/// by pointer, so the street/intersection graph stays free of reference
/// cycles. The network is built once at startup, then shared immutably
/// across all simulation tasks.
pub struct RoadNetwork {
    intersections: Vec<Intersection>,
    streets: Vec<Street>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self {
            intersections: Vec::new(),
            streets: Vec::new(),
        }
    }

    pub fn add_intersection(&mut self, x: f64, y: f64) -> IntersectionId {
        let id = IntersectionId(self.intersections.len());
        self.intersections.push(Intersection::new(id, (x, y)));
        id
    }

    /// Connects two intersections with a new street. The street's length is
    /// the Euclidean distance between their positions.
    pub fn add_street(&mut self, a: IntersectionId, b: IntersectionId) -> StreetId {
        let length = distance(self.intersections[a.0].position, self.intersections[b.0].position);
        let id = StreetId(self.streets.len());
        self.streets.push(Street::new(id, a, b, length));
        self.intersections[a.0].connect(id);
        self.intersections[b.0].connect(id);
        id
    }

    /// Looks up an intersection. Ids are arena indices handed out by this
    /// network, so the lookup is infallible.
    pub fn intersection(&self, id: IntersectionId) -> &Intersection {
        &self.intersections[id.0]
    }

    pub fn street(&self, id: StreetId) -> &Street {
        &self.streets[id.0]
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn streets(&self) -> &[Street] {
        &self.streets
    }

    /// Picks the street a vehicle leaves on after crossing `at`, uniformly
    /// at random among the streets other than the one it arrived on. A dead
    /// end reuses the arrival street in the reverse direction.
    pub fn choose_next_street(&self, at: IntersectionId, arrived_via: StreetId) -> StreetId {
        let options = self.intersection(at).other_streets(arrived_via);
        options
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(arrived_via)
    }
}

impl Default for RoadNetwork {
    fn default() -> Self {
        Self::new()
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Demo topology for the driver binary: a four-intersection ring, a central
/// hub connected to every corner, and one dead-end spur.
pub fn create_network() -> RoadNetwork {
    let mut network = RoadNetwork::new();

    let nw = network.add_intersection(0.0, 600.0);
    let ne = network.add_intersection(800.0, 600.0);
    let se = network.add_intersection(800.0, 0.0);
    let sw = network.add_intersection(0.0, 0.0);
    let hub = network.add_intersection(400.0, 300.0);
    let spur = network.add_intersection(1200.0, 300.0);

    network.add_street(nw, ne);
    network.add_street(ne, se);
    network.add_street(se, sw);
    network.add_street(sw, nw);
    network.add_street(nw, hub);
    network.add_street(ne, hub);
    network.add_street(se, hub);
    network.add_street(sw, hub);
    // spur only reaches the ring through one street, so vehicles turn back
    network.add_street(se, spur);

    network
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_length_is_euclidean() {
        let mut network = RoadNetwork::new();
        let a = network.add_intersection(0.0, 0.0);
        let b = network.add_intersection(3.0, 4.0);
        let street = network.add_street(a, b);

        assert!((network.street(street).length - 5.0).abs() < 1e-9);
    }

    #[test]
    fn next_street_avoids_the_arrival_street_when_possible() {
        let mut network = RoadNetwork::new();
        let center = network.add_intersection(0.0, 0.0);
        let east = network.add_intersection(10.0, 0.0);
        let north = network.add_intersection(0.0, 10.0);
        let west = network.add_intersection(-10.0, 0.0);
        let arrival = network.add_street(center, east);
        network.add_street(center, north);
        network.add_street(center, west);

        for _ in 0..20 {
            let next = network.choose_next_street(center, arrival);
            assert_ne!(next, arrival);
        }
    }

    #[test]
    fn dead_end_reverses_onto_the_same_street() {
        let mut network = RoadNetwork::new();
        let a = network.add_intersection(0.0, 0.0);
        let b = network.add_intersection(100.0, 0.0);
        let only = network.add_street(a, b);

        assert_eq!(network.choose_next_street(b, only), only);
        assert_eq!(network.street(only).other_endpoint(b), a);
    }

    #[test]
    fn demo_network_is_connected_both_ways() {
        let network = create_network();
        for street in network.streets() {
            let (a, b) = street.endpoints;
            assert!(network.intersection(a).connected_streets().contains(&street.id));
            assert!(network.intersection(b).connected_streets().contains(&street.id));
        }
    }
}
