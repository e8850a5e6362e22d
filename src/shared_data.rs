use std::error::Error;
use std::fs::File;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::global_variables::{DEFAULT_MAX_SPEED_MPS, DEFAULT_MIN_SPEED_MPS};
use crate::simulation_engine::intersections::IntersectionId;

/// One completed intersection crossing, emitted by a vehicle task and
/// consumed by the monitoring task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossingRecord {
    pub timestamp: u64,
    pub vehicle_id: u64,
    pub intersection: IntersectionId,
    /// How long the vehicle waited for its entry grant, in milliseconds.
    pub waited_ms: u64,
}

/// Runtime settings for the driver binary. Loaded from an optional JSON
/// file; missing fields fall back to the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub vehicle_count: usize,
    pub min_speed_mps: f64,
    pub max_speed_mps: f64,
    /// When set, crossing records are appended to this CSV file.
    pub crossing_log: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            vehicle_count: 6,
            min_speed_mps: DEFAULT_MIN_SPEED_MPS,
            max_speed_mps: DEFAULT_MAX_SPEED_MPS,
            crossing_log: None,
        }
    }
}

pub fn load_config(path: &str) -> Result<SimulationConfig, Box<dyn Error>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Seconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
