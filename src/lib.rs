/// climate_service: read-only HTTP/JSON API over the Hawaii climate dataset.
///
/// # Module structure
///
/// ```text
/// climate_service
/// ├── model    — shared data types (PrecipReading, TempSummary, DateParseError)
/// │              and frozen-dataset constants (anchor date, most active station)
/// ├── config   — runtime configuration loader (service.toml)
/// ├── db       — dataset connection bootstrap + startup schema introspection
/// ├── query    — the four read operations and MMDDYYYY date parsing
/// ├── endpoint — route parsing, JSON response shaping, worker-pool HTTP server
/// └── logging  — leveled, component-tagged logger
/// ```

/// Public modules
pub mod config;
pub mod db;
pub mod endpoint;
pub mod logging;
pub mod model;
pub mod query;
