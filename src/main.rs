//! Hawaii Climate Data Service - Main Entry Point
//!
//! A small read-only HTTP API over the frozen Hawaii climate dataset
//! (daily precipitation and temperature observations per station):
//! 1. Validates dataset connectivity and shape on startup (fatal if absent)
//! 2. Serves the JSON query endpoints with a worker pool
//!
//! The dataset is historical and never mutated; all queries anchor on the
//! dataset's own latest date, not on wall-clock time.
//!
//! Usage:
//!   cargo run --release
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string for the loaded dataset
//!
//! Optional:
//!   service.toml - bind address, port, workers, dataset overrides

use climate_service::config::ServiceConfig;
use climate_service::logging::{self, Component, LogLevel};
use climate_service::{db, endpoint};

fn main() {
    println!("🌺 Hawaii Climate Data Service");
    println!("==============================\n");

    logging::init_logger(LogLevel::Info, None);

    // Load runtime configuration (defaults when service.toml is absent)
    let config = ServiceConfig::load();
    logging::info(
        Component::System,
        &format!(
            "anchor date {}, most active station {}",
            config.anchor_date, config.most_active_station
        ),
    );

    // Fail fast: the process must not serve requests without the dataset.
    println!("📊 Verifying dataset...");
    match db::connect_and_verify() {
        Ok(_probe) => {
            println!("✓ Dataset reachable and well-shaped\n");
        }
        Err(e) => {
            eprintln!("\n❌ Dataset verification failed: {}\n", e);
            std::process::exit(1);
        }
    }

    println!("🚀 Starting HTTP endpoint server...");
    println!("   GET /                            - API help");
    println!("   GET /health                      - Service health check");
    println!("   GET /api/v1.0/precipitation      - Rolling-year precipitation");
    println!("   GET /api/v1.0/stations           - Station ids");
    println!("   GET /api/v1.0/tobs               - Rolling-year observations");
    println!("   GET /api/v1.0/temp/{{start}}       - Stats from a start date");
    println!("   GET /api/v1.0/temp/{{start}}/{{end}} - Stats for a date range\n");

    if let Err(e) = endpoint::start_endpoint_server(&config) {
        eprintln!("\n❌ Endpoint server error: {}\n", e);
        std::process::exit(1);
    }
}
