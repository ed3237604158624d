/// Read operations over the climate dataset.
///
/// The four queries behind the HTTP API, plus the date handling they share.
/// All of them are read-only projections over the frozen dataset: filtering
/// happens in SQL (the store supports predicates on station and date range),
/// while the min/avg/max reduction happens in Rust via
/// `TempSummary::from_observations` so the aggregation logic is testable
/// without a database.
///
/// None of these queries applies an ORDER BY — response ordering follows
/// storage iteration order, which is all the API promises.

use chrono::{Duration, NaiveDate};
use postgres::Client;

use crate::model::{DateParseError, PrecipReading, TempSummary};

// ---------------------------------------------------------------------------
// Date handling
// ---------------------------------------------------------------------------

/// Length of the rolling lookback window, in days.
pub const ROLLING_WINDOW_DAYS: i64 = 365;

/// First date inside the rolling window ending at `anchor`.
pub fn rolling_window_start(anchor: NaiveDate) -> NaiveDate {
    anchor - Duration::days(ROLLING_WINDOW_DAYS)
}

/// Parses a `start`/`end` path parameter in MMDDYYYY form.
///
/// The format is strict: exactly eight ASCII digits, zero-padded month and
/// day. `field` is carried into the error so the HTTP layer can tell the
/// client which parameter was malformed.
pub fn parse_report_date(field: &'static str, raw: &str) -> Result<NaiveDate, DateParseError> {
    if raw.len() != 8 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(DateParseError { field, value: raw.to_string() });
    }

    NaiveDate::parse_from_str(raw, "%m%d%Y")
        .map_err(|_| DateParseError { field, value: raw.to_string() })
}

// ---------------------------------------------------------------------------
// Query operations
// ---------------------------------------------------------------------------

/// All precipitation readings within the rolling year ending at `anchor`.
///
/// No station filter: every station's reading for a qualifying date appears
/// as its own entry, so a date shared by several stations yields several
/// readings here. Collapsing to one value per date is the response
/// formatter's concern, not this query's.
pub fn precipitation_since(
    client: &mut Client,
    anchor: NaiveDate,
) -> Result<Vec<PrecipReading>, postgres::Error> {
    let window_start = rolling_window_start(anchor);

    let rows = client.query(
        "SELECT date, prcp FROM climate.measurement WHERE date >= $1",
        &[&window_start],
    )?;

    Ok(rows
        .iter()
        .map(|row| PrecipReading { date: row.get(0), inches: row.get(1) })
        .collect())
}

/// Every station id in the dataset, one per station row.
///
/// Stations appear once each in the collection by definition, so no
/// deduplication is applied.
pub fn list_stations(client: &mut Client) -> Result<Vec<String>, postgres::Error> {
    let rows = client.query("SELECT station FROM climate.station", &[])?;
    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Temperature observations from one station within the rolling year
/// ending at `anchor`.
///
/// In production `station_id` is `model::MOST_ACTIVE_STATION` (or its
/// config override) — a fact about the dataset computed offline, not
/// rederived per request.
pub fn temperature_observations_since(
    client: &mut Client,
    anchor: NaiveDate,
    station_id: &str,
) -> Result<Vec<f64>, postgres::Error> {
    let window_start = rolling_window_start(anchor);

    let rows = client.query(
        "SELECT tobs FROM climate.measurement WHERE station = $1 AND date >= $2",
        &[&station_id, &window_start],
    )?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Min/avg/max of temperature observations from `start` onward, bounded by
/// `end` when given (inclusive on both sides).
///
/// An empty match set — including `end < start` — reduces to a summary of
/// three `None`s rather than an error.
pub fn temperature_stats(
    client: &mut Client,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<TempSummary, postgres::Error> {
    let rows = match end {
        Some(end) => client.query(
            "SELECT tobs FROM climate.measurement WHERE date >= $1 AND date <= $2",
            &[&start, &end],
        )?,
        None => client.query(
            "SELECT tobs FROM climate.measurement WHERE date >= $1",
            &[&start],
        )?,
    };

    let observations: Vec<f64> = rows.iter().map(|row| row.get(0)).collect();
    Ok(TempSummary::from_observations(&observations))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
