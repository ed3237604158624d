/// Service configuration loader - parses service.toml
///
/// Separates runtime parameters from code: where to listen, how many
/// workers to run, and the two dataset facts (anchor date, most active
/// station) that would change if the service were ever pointed at a
/// refreshed dataset snapshot.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::model;

/// Runtime configuration, loaded from `service.toml` when present.
///
/// Every field has a default, so a missing file yields a fully working
/// configuration. The anchor date and station id default to the constants
/// in `model` — they describe the frozen dataset, not this deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of request-serving workers, each with its own database
    /// connection.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Latest observation date in the dataset; rolling-window queries look
    /// back 365 days from here. Never derived from wall-clock time.
    #[serde(default = "default_anchor_date")]
    pub anchor_date: NaiveDate,

    /// Station id used by the temperature-observations endpoint.
    #[serde(default = "default_most_active_station")]
    pub most_active_station: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_workers() -> usize {
    4
}

fn default_anchor_date() -> NaiveDate {
    model::dataset_latest_date()
}

fn default_most_active_station() -> String {
    model::MOST_ACTIVE_STATION.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            bind_address: default_bind_address(),
            port: default_port(),
            workers: default_workers(),
            anchor_date: default_anchor_date(),
            most_active_station: default_most_active_station(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from `service.toml` in the working directory,
    /// falling back to defaults when the file does not exist.
    ///
    /// # Panics
    /// Panics if the file exists but cannot be read or parsed. This is
    /// intentional — serving with a half-applied configuration would be
    /// worse than refusing to start.
    pub fn load() -> ServiceConfig {
        let config_path = "service.toml";

        if !Path::new(config_path).exists() {
            return ServiceConfig::default();
        }

        let contents = fs::read_to_string(config_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path, e));

        Self::from_toml_str(&contents)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", config_path, e))
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<ServiceConfig, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The socket address the HTTP server should bind.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
