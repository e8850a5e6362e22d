use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::shared_data::CrossingRecord;

/// Appends a record to a CSV file, writing the header only when the file is
/// first created.
fn log_to_csv<T: Serialize>(filename: &str, record: &T) -> Result<(), Box<dyn Error>> {
    let file_exists = Path::new(filename).exists();
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(filename)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()?;
    Ok(())
}

/// Drains crossing records from the simulation and logs each one, optionally
/// appending it to a CSV file. Runs until every record sender is gone.
pub async fn run_crossing_monitor(
    mut records: mpsc::UnboundedReceiver<CrossingRecord>,
    csv_path: Option<String>,
) {
    while let Some(record) = records.recv().await {
        log::info!(
            "vehicle {} cleared intersection {} after waiting {} ms",
            record.vehicle_id,
            record.intersection.0,
            record.waited_ms
        );
        if let Some(path) = &csv_path {
            if let Err(e) = log_to_csv(path, &record) {
                log::warn!("could not append crossing record to {}: {}", path, e);
            }
        }
    }
}
