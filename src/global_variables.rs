// Simulation policy values shared across the engine.

/// Fraction of its current street a vehicle must cover before it requests
/// entry to the destination intersection.
pub const APPROACH_THRESHOLD: f64 = 0.9;

/// Divisor applied to a vehicle's speed while it moves through an
/// intersection, and re-applied inversely once it exits.
pub const INTERSECTION_SPEED_FACTOR: f64 = 10.0;

/// Sleep quantum of each intersection's admission loop, in milliseconds.
pub const ADMISSION_POLL_INTERVAL_MS: u64 = 1;

/// Sleep quantum of each vehicle's drive loop, in milliseconds.
pub const VEHICLE_UPDATE_INTERVAL_MS: u64 = 5;

// Default speed range for newly spawned vehicles, in meters per second.
pub const DEFAULT_MIN_SPEED_MPS: f64 = 200.0;
pub const DEFAULT_MAX_SPEED_MPS: f64 = 500.0;
