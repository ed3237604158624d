/// Core data types for the Hawaii climate data service.
///
/// This module defines the shared domain model imported by all other
/// modules, along with the two facts about the frozen dataset that the
/// queries depend on (anchor date, most active station). It contains no
/// I/O — database access lives in `db` and `query`.

use chrono::NaiveDate;
use std::fmt;

// ---------------------------------------------------------------------------
// Dataset constants
// ---------------------------------------------------------------------------

/// Station with the highest observation count in the dataset.
///
/// Derived offline by counting measurement rows per station across the full
/// dataset. The temperature-observations endpoint is pinned to this
/// station. It is a property of the frozen dataset, never recomputed at
/// query time; `ServiceConfig` can override it.
pub const MOST_ACTIVE_STATION: &str = "USC00519281";

/// Latest observation date present in the dataset.
///
/// The dataset is historical and frozen, so rolling-window queries anchor
/// on this date rather than on wall-clock "today". `ServiceConfig` can
/// override it.
pub fn dataset_latest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 8, 23).expect("dataset anchor is a valid date")
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One daily precipitation reading, projected from a measurement row.
///
/// `inches` is `None` where the station reported no precipitation value for
/// that day (a NULL in the dataset, distinct from a 0.0 reading).
#[derive(Debug, Clone, PartialEq)]
pub struct PrecipReading {
    pub date: NaiveDate,
    pub inches: Option<f64>,
}

/// Min/avg/max summary over a set of temperature observations.
///
/// All three fields are `None` when the summarized set is empty — a stats
/// query over an empty date range is a well-formed result, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempSummary {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

impl TempSummary {
    /// Reduces a flat list of temperature observations to min/avg/max.
    ///
    /// Each observation is weighted once — the average is the arithmetic
    /// mean over rows, not normalized per station.
    pub fn from_observations(values: &[f64]) -> Self {
        if values.is_empty() {
            return TempSummary { min: None, avg: None, max: None };
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }

        TempSummary {
            min: Some(min),
            avg: Some(sum / values.len() as f64),
            max: Some(max),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A `start`/`end` path parameter that is not a valid MMDDYYYY date.
///
/// Carries the field name so the HTTP layer can tell the client which
/// parameter was bad.
#[derive(Debug, Clone, PartialEq)]
pub struct DateParseError {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} date '{}': expected MMDDYYYY (e.g. 08232017)",
            self.field, self.value
        )
    }
}

impl std::error::Error for DateParseError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
