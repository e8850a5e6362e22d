use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::IndexedRandom;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::global_variables::{APPROACH_THRESHOLD, VEHICLE_UPDATE_INTERVAL_MS};
use crate::monitoring::crossing_monitor::run_crossing_monitor;
use crate::shared_data::{current_timestamp, CrossingRecord, SimulationConfig};
use crate::simulation_engine::admission::AdmissionError;
use crate::simulation_engine::intersections::run_admission_loop;
use crate::simulation_engine::network::RoadNetwork;
use crate::simulation_engine::vehicles::{DrivePhase, Vehicle};

/// Places a new vehicle on a random street with a random cruise speed.
pub fn spawn_vehicle(network: &RoadNetwork, id: u64, config: &SimulationConfig) -> Vehicle {
    let mut rng = rand::rng();
    let street = network.streets().choose(&mut rng).unwrap();
    let destination = if rng.random_bool(0.5) {
        street.endpoints.0
    } else {
        street.endpoints.1
    };
    let speed = rng.random_range(config.min_speed_mps..=config.max_speed_mps);
    Vehicle::new(id, street.id, destination, speed)
}

/// Perpetual drive task for one vehicle.
///
/// Each pass sleeps a fixed quantum, advances the vehicle by the elapsed
/// wall-clock time, then applies the two crossing triggers in order: the
/// approach check (request entry, decelerate) strictly before the completion
/// check (cross, pick the next street, notify departure). Keeping that order
/// means an update step that overshoots the street end still decelerates
/// through the intersection before leaving it.
pub async fn drive_vehicle(
    mut vehicle: Vehicle,
    network: Arc<RoadNetwork>,
    records: mpsc::UnboundedSender<CrossingRecord>,
) -> Result<(), AdmissionError> {
    let mut last_update = Instant::now();
    let mut waited = Duration::ZERO;

    loop {
        sleep(Duration::from_millis(VEHICLE_UPDATE_INTERVAL_MS)).await;
        let elapsed = last_update.elapsed();
        last_update = Instant::now();

        let street_length = network.street(vehicle.current_street).length;
        let completion = vehicle.advance(elapsed, street_length);

        if completion >= APPROACH_THRESHOLD && vehicle.phase == DrivePhase::Traveling {
            let destination = network.intersection(vehicle.destination);
            let (x, y) = vehicle.world_position(&network);
            log::debug!(
                "vehicle {} approaching intersection {} at ({:.1}, {:.1})",
                vehicle.id,
                destination.id.0,
                x,
                y
            );

            let wait_started = Instant::now();
            destination.request_entry(vehicle.id).await?;
            waited = wait_started.elapsed();
            vehicle.enter_intersection();
            // the stopwatch must not count the time spent suspended
            last_update = Instant::now();
        }

        if completion >= 1.0 && vehicle.phase == DrivePhase::Crossing {
            let crossed = vehicle.destination;
            let next_street = network.choose_next_street(crossed, vehicle.current_street);
            let next_destination = network.street(next_street).other_endpoint(crossed);

            network.intersection(crossed).notify_departure();

            let _ = records.send(CrossingRecord {
                timestamp: current_timestamp(),
                vehicle_id: vehicle.id,
                intersection: crossed,
                waited_ms: waited.as_millis() as u64,
            });
            log::info!(
                "vehicle {} crossed intersection {} (waited {} ms), continuing on street {}",
                vehicle.id,
                crossed.0,
                waited.as_millis(),
                next_street.0
            );

            vehicle.exit_onto(next_street, next_destination);
        }
    }
}

/// Spawns every simulation task: one admission loop per intersection, the
/// crossing monitor, and one drive task per vehicle. Returns once all tasks
/// are running; they then run for the lifetime of the process.
pub async fn run_simulation(network: Arc<RoadNetwork>, config: SimulationConfig) {
    let (records_tx, records_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_crossing_monitor(records_rx, config.crossing_log.clone()));

    for intersection in network.intersections() {
        let id = intersection.id;
        let network = Arc::clone(&network);
        tokio::spawn(async move {
            if let Err(e) = run_admission_loop(network, id).await {
                log::error!("admission loop for intersection {} failed: {}", id.0, e);
            }
        });
    }

    for vehicle_id in 0..config.vehicle_count as u64 {
        let vehicle = spawn_vehicle(&network, vehicle_id, &config);
        log::info!(
            "spawned vehicle {} on street {} toward intersection {} at {:.0} m/s",
            vehicle.id,
            vehicle.current_street.0,
            vehicle.destination.0,
            vehicle.speed
        );

        let network = Arc::clone(&network);
        let records = records_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = drive_vehicle(vehicle, network, records).await {
                log::error!("drive task failed: {}", e);
            }
        });
    }
}
