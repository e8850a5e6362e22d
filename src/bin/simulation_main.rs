// simulation_main.rs
use std::sync::Arc;
use std::time::Duration;

use junction_sim::shared_data::{load_config, SimulationConfig};
use junction_sim::simulation_engine::network::create_network;
use junction_sim::simulation_engine::simulation::run_simulation;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("could not load config from {}: {}; using defaults", path, e);
                SimulationConfig::default()
            }
        },
        None => SimulationConfig::default(),
    };

    let network = Arc::new(create_network());
    log::info!(
        "road network ready: {} intersections, {} streets",
        network.intersections().len(),
        network.streets().len()
    );

    run_simulation(network, config).await;

    loop {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}
