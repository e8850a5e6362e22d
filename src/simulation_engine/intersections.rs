use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::global_variables::ADMISSION_POLL_INTERVAL_MS;
use crate::simulation_engine::admission::{AdmissionError, AdmissionQueue, EntryRequest};
use crate::simulation_engine::network::RoadNetwork;
use crate::simulation_engine::streets::StreetId;

/// Index of an intersection in the owning [`RoadNetwork`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntersectionId(pub usize);

/// A single-capacity intersection (node) of the road network.
///
/// At most one vehicle holds an entry grant at any moment. Vehicles queue
/// for entry in arrival order and are woken one at a time by the admission
/// loop; the departing vehicle clears the occupied flag on its way out.
pub struct Intersection {
    pub id: IntersectionId,
    /// 2-D world position in meters.
    pub position: (f64, f64),
    /// Streets touching this intersection. Filled while the network is
    /// built, immutable afterwards.
    connected: Vec<StreetId>,
    queue: AdmissionQueue,
    occupied: Mutex<bool>,
}

impl Intersection {
    pub(crate) fn new(id: IntersectionId, position: (f64, f64)) -> Self {
        Self {
            id,
            position,
            connected: Vec::new(),
            queue: AdmissionQueue::new(),
            occupied: Mutex::new(false),
        }
    }

    pub(crate) fn connect(&mut self, street: StreetId) {
        self.connected.push(street);
    }

    pub fn connected_streets(&self) -> &[StreetId] {
        &self.connected
    }

    /// All streets touching this intersection except the one supplied.
    pub fn other_streets(&self, excluding: StreetId) -> Vec<StreetId> {
        self.connected
            .iter()
            .copied()
            .filter(|&street| street != excluding)
            .collect()
    }

    /// Number of vehicles currently waiting for entry.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_occupied(&self) -> bool {
        *self.occupied.lock().unwrap()
    }

    fn set_occupied(&self, value: bool) {
        *self.occupied.lock().unwrap() = value;
    }

    /// Queues the calling vehicle for entry and suspends it until the
    /// admission loop resolves its grant. Safe to call concurrently from any
    /// number of vehicle tasks; arrival order is the enqueue order.
    pub async fn request_entry(&self, vehicle_id: u64) -> Result<(), AdmissionError> {
        let (request, granted) = EntryRequest::new(vehicle_id);
        self.queue.enqueue(request);
        log::debug!(
            "intersection {}: vehicle {} waiting for entry ({} queued)",
            self.id.0,
            vehicle_id,
            self.queue.len()
        );
        granted
            .await
            .map_err(|_| AdmissionError::GrantDropped(vehicle_id))
    }

    /// Marks the intersection free again. Idempotent: calling it while
    /// already free leaves the state unchanged.
    pub fn notify_departure(&self) {
        let mut occupied = self.occupied.lock().unwrap();
        *occupied = false;
    }
}

/// Perpetual arbitration task for one intersection, spawned once per
/// intersection when the simulation starts.
///
/// Each pass sleeps a fixed quantum, then grants entry to the queue head if
/// the intersection is free. The occupied flag is raised BEFORE the head is
/// released: a vehicle woken by the grant can never race a second grant,
/// because the flag is already set when it resumes.
pub async fn run_admission_loop(
    network: Arc<RoadNetwork>,
    id: IntersectionId,
) -> Result<(), AdmissionError> {
    let intersection = network.intersection(id);
    loop {
        sleep(Duration::from_millis(ADMISSION_POLL_INTERVAL_MS)).await;

        if !intersection.is_occupied() && !intersection.queue.is_empty() {
            intersection.set_occupied(true);
            let vehicle_id = intersection.queue.release_head()?;
            log::debug!("intersection {}: granted entry to vehicle {}", id.0, vehicle_id);
        }
    }
}
