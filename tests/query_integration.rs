/// Integration tests for the climate query operations
///
/// These tests exercise the query layer against a live PostgreSQL database
/// with the climate schema loaded (sql/001_climate_schema.sql). They seed
/// rows under TEST% station ids in the far future so the real dataset
/// never interferes with window assertions, and clean them up afterwards.
///
/// All tests are #[ignore]d because they need a reachable database.
///
/// Prerequisites:
/// - PostgreSQL running with the climate schema loaded
/// - DATABASE_URL set in .env
///
/// Run with: cargo test --test query_integration -- --ignored --test-threads=1

use chrono::NaiveDate;
use climate_service::model::TempSummary;
use climate_service::{db, endpoint, query};
use postgres::{Client, NoTls};
use serde_json::json;
use std::env;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Anchor far beyond the real dataset (which ends in 2017), so windowed
/// queries only see seeded rows.
fn test_anchor() -> NaiveDate {
    date(2099, 8, 23)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_test_db() -> Client {
    dotenv::dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    Client::connect(&database_url, NoTls).expect("Failed to connect to test database")
}

fn cleanup_test_data(client: &mut Client) {
    let _ = client.execute("DELETE FROM climate.measurement WHERE station LIKE 'TEST%'", &[]);
    let _ = client.execute("DELETE FROM climate.station WHERE station LIKE 'TEST%'", &[]);
}

fn seed_station(client: &mut Client, station: &str) {
    client
        .execute(
            "INSERT INTO climate.station (station, name, latitude, longitude, elevation)
             VALUES ($1, 'Test Station', 21.27, -157.82, 3.0)
             ON CONFLICT (station) DO NOTHING",
            &[&station],
        )
        .expect("Failed to seed station");
}

fn seed_measurement(
    client: &mut Client,
    station: &str,
    day: NaiveDate,
    prcp: Option<f64>,
    tobs: f64,
) {
    client
        .execute(
            "INSERT INTO climate.measurement (station, date, prcp, tobs)
             VALUES ($1, $2, $3, $4)",
            &[&station, &day, &prcp, &tobs],
        )
        .expect("Failed to seed measurement");
}

// ---------------------------------------------------------------------------
// 1. Startup Verification
// ---------------------------------------------------------------------------

#[test]
#[ignore] // requires live database
fn test_startup_verification_against_live_schema() {
    let result = db::connect_and_verify();
    assert!(
        result.is_ok(),
        "Startup verification should pass against a loaded dataset: {:?}",
        result.err()
    );
}

// ---------------------------------------------------------------------------
// 2. Precipitation Window
// ---------------------------------------------------------------------------

#[test]
#[ignore] // requires live database
fn test_precipitation_window_excludes_older_readings() {
    let mut client = setup_test_db();
    cleanup_test_data(&mut client);

    let anchor = test_anchor();
    let inside = anchor - chrono::Duration::days(364);
    let outside = anchor - chrono::Duration::days(366);

    seed_station(&mut client, "TEST0000001");
    seed_measurement(&mut client, "TEST0000001", inside, Some(0.5), 75.0);
    seed_measurement(&mut client, "TEST0000001", outside, Some(9.9), 75.0);

    let readings = query::precipitation_since(&mut client, anchor)
        .expect("precipitation query should succeed");

    assert!(
        readings.iter().any(|r| r.date == inside),
        "reading 364 days back should be inside the window"
    );
    assert!(
        readings.iter().all(|r| r.date != outside),
        "reading 366 days back must be excluded"
    );

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // requires live database
fn test_precipitation_is_unaggregated_across_stations() {
    let mut client = setup_test_db();
    cleanup_test_data(&mut client);

    // Two stations reporting the same date: the query returns both
    // readings; collapsing to one entry per date happens only in the
    // response formatter.
    let anchor = test_anchor();
    let shared_date = anchor - chrono::Duration::days(10);

    seed_station(&mut client, "TEST0000001");
    seed_station(&mut client, "TEST0000002");
    seed_measurement(&mut client, "TEST0000001", shared_date, Some(0.1), 75.0);
    seed_measurement(&mut client, "TEST0000002", shared_date, Some(0.7), 75.0);

    let readings = query::precipitation_since(&mut client, anchor)
        .expect("precipitation query should succeed");
    let on_shared_date = readings.iter().filter(|r| r.date == shared_date).count();
    assert_eq!(on_shared_date, 2, "one entry per qualifying measurement, not per date");

    // The formatted response collapses them to a single date key.
    let body = endpoint::precipitation_body(&readings);
    let map = body.as_object().expect("precipitation body should be an object");
    let key = shared_date.format("%Y-%m-%d").to_string();
    assert!(map.contains_key(&key));
    assert_eq!(map.len(), 1, "formatter should collapse to one entry per date");

    cleanup_test_data(&mut client);
}

// ---------------------------------------------------------------------------
// 3. Station Listing
// ---------------------------------------------------------------------------

#[test]
#[ignore] // requires live database
fn test_list_stations_returns_each_station_once() {
    let mut client = setup_test_db();
    cleanup_test_data(&mut client);

    seed_station(&mut client, "TEST0000001");

    let station_ids = query::list_stations(&mut client).expect("station query should succeed");

    let seeded = station_ids.iter().filter(|id| id.as_str() == "TEST0000001").count();
    assert_eq!(seeded, 1, "seeded station should appear exactly once");
    assert!(
        station_ids.iter().all(|id| !id.is_empty()),
        "every returned id should be non-empty"
    );

    cleanup_test_data(&mut client);
}

// ---------------------------------------------------------------------------
// 4. Temperature Observations
// ---------------------------------------------------------------------------

#[test]
#[ignore] // requires live database
fn test_tobs_filters_by_station_and_window() {
    let mut client = setup_test_db();
    cleanup_test_data(&mut client);

    let anchor = test_anchor();
    let inside = anchor - chrono::Duration::days(30);
    let outside = anchor - chrono::Duration::days(400);

    seed_station(&mut client, "TEST0000001");
    seed_station(&mut client, "TEST0000002");
    seed_measurement(&mut client, "TEST0000001", inside, None, 71.0);
    seed_measurement(&mut client, "TEST0000001", outside, None, 50.0);
    seed_measurement(&mut client, "TEST0000002", inside, None, 99.0);

    let observations =
        query::temperature_observations_since(&mut client, anchor, "TEST0000001")
            .expect("tobs query should succeed");

    assert_eq!(observations, vec![71.0], "only the fixed station inside the window");

    cleanup_test_data(&mut client);
}

// ---------------------------------------------------------------------------
// 5. Temperature Statistics
// ---------------------------------------------------------------------------

#[test]
#[ignore] // requires live database
fn test_temperature_stats_min_avg_max_over_range() {
    let mut client = setup_test_db();
    cleanup_test_data(&mut client);

    seed_station(&mut client, "TEST0000001");
    seed_measurement(&mut client, "TEST0000001", date(2099, 8, 5), None, 70.0);
    seed_measurement(&mut client, "TEST0000001", date(2099, 8, 15), None, 75.0);
    seed_measurement(&mut client, "TEST0000001", date(2099, 8, 25), None, 80.0);

    let summary =
        query::temperature_stats(&mut client, date(2099, 8, 1), Some(date(2099, 8, 31)))
            .expect("stats query should succeed");

    assert_eq!(summary, TempSummary { min: Some(70.0), avg: Some(75.0), max: Some(80.0) });
    assert_eq!(endpoint::temp_stats_body(&summary), json!([70.0, 75.0, 80.0]));

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // requires live database
fn test_temperature_stats_end_before_start_is_empty_not_error() {
    let mut client = setup_test_db();
    cleanup_test_data(&mut client);

    seed_station(&mut client, "TEST0000001");
    seed_measurement(&mut client, "TEST0000001", date(2099, 8, 15), None, 75.0);

    let summary =
        query::temperature_stats(&mut client, date(2099, 8, 31), Some(date(2099, 8, 1)))
            .expect("inverted range should not error");

    assert_eq!(summary, TempSummary { min: None, avg: None, max: None });

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // requires live database
fn test_temperature_stats_no_matching_rows_returns_nulls() {
    let mut client = setup_test_db();
    cleanup_test_data(&mut client);

    // Far beyond anything seeded or real.
    let summary = query::temperature_stats(&mut client, date(2150, 1, 1), None)
        .expect("empty match set should not error");

    assert_eq!(summary, TempSummary { min: None, avg: None, max: None });
    assert_eq!(endpoint::temp_stats_body(&summary), json!([null, null, null]));

    cleanup_test_data(&mut client);
}
