/// HTTP endpoint for the climate data API
///
/// Serves the read-only query surface over the frozen dataset:
///
/// - GET /                          - HTML help text listing the routes
/// - GET /health                    - Service health check
/// - GET /api/v1.0/precipitation    - Rolling-year precipitation by date
/// - GET /api/v1.0/stations         - All station ids
/// - GET /api/v1.0/tobs             - Rolling-year observations, most active station
/// - GET /api/v1.0/temp/{start}     - Min/avg/max temperature from a start date
/// - GET /api/v1.0/temp/{start}/{end} - Min/avg/max temperature for a date range
///
/// Requests are served by a pool of workers sharing the listener; each
/// worker owns its own dataset connection, so no session is ever shared
/// across concurrent requests.

use crate::config::ServiceConfig;
use crate::db::{self, DbConfigError};
use crate::logging::{self, Component};
use crate::model::{DateParseError, PrecipReading, TempSummary};
use crate::query;
use postgres::Client;
use serde_json::{json, Value};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;
use threadpool::ThreadPool;
use tiny_http::{Method, Request, Response, Server};

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// Help text served at the root, mirroring the JSON routes below it.
const HELP_HTML: &str = "<h1>Hawaii Climate Data API</h1>\
<p>Use the routes below to access the climate data:</p>\
<ul>\
<li>/api/v1.0/precipitation - Last year's precipitation</li>\
<li>/api/v1.0/stations - List of weather stations</li>\
<li>/api/v1.0/tobs - Last year's temperature observations</li>\
<li>/api/v1.0/temp/start - Min, Avg, Max temperature from a start date</li>\
<li>/api/v1.0/temp/start/end - Min, Avg, Max temperature for a date range</li>\
</ul>\
<p>Format dates as MMDDYYYY for 'start' and 'end'.</p>";

/// Endpoints listed in 404 responses.
const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/",
    "/health",
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/temp/{start}",
    "/api/v1.0/temp/{start}/{end}",
];

/// A parsed request path. Date parameters stay raw strings here — routing
/// only splits the path; validation belongs to the query layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Home,
    Health,
    Precipitation,
    Stations,
    Tobs,
    TempStats { start: String, end: Option<String> },
    Unknown,
}

/// Maps a request path (query string already stripped) to a `Route`.
///
/// A single trailing slash is tolerated on every route except the root.
pub fn parse_route(path: &str) -> Route {
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };

    match path {
        "/" => Route::Home,
        "/health" => Route::Health,
        "/api/v1.0/precipitation" => Route::Precipitation,
        "/api/v1.0/stations" => Route::Stations,
        "/api/v1.0/tobs" => Route::Tobs,
        _ => match path.strip_prefix("/api/v1.0/temp/") {
            Some(params) => {
                let mut segments = params.split('/');
                let start = segments.next().unwrap_or("");
                let end = segments.next();
                if start.is_empty() || end == Some("") || segments.next().is_some() {
                    return Route::Unknown;
                }
                Route::TempStats {
                    start: start.to_string(),
                    end: end.map(String::from),
                }
            }
            None => Route::Unknown,
        },
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Request-scoped failures, each mapping to one HTTP status.
#[derive(Debug)]
pub enum ApiError {
    /// A start/end parameter was not a valid MMDDYYYY date (400).
    BadDate(DateParseError),
    /// The dataset store failed mid-request (500).
    Db(postgres::Error),
    /// No route matches the request path (404).
    UnknownPath(String),
    /// The route exists but only as GET (405).
    MethodNotAllowed(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadDate(_) => 400,
            ApiError::Db(_) => 500,
            ApiError::UnknownPath(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
        }
    }

    /// JSON body returned to the client. Database detail stays in the logs;
    /// the client only learns that the query failed.
    fn body(&self) -> Value {
        match self {
            ApiError::BadDate(e) => json!({
                "error": e.to_string(),
                "field": e.field,
            }),
            ApiError::Db(_) => json!({
                "error": "dataset query failed; try again",
            }),
            ApiError::UnknownPath(path) => json!({
                "error": "Not found",
                "path": path,
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
            ApiError::MethodNotAllowed(method) => json!({
                "error": format!("method {} not allowed; all endpoints are GET", method),
            }),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadDate(e) => write!(f, "{}", e),
            ApiError::Db(e) => write!(f, "dataset query failed: {}", e),
            ApiError::UnknownPath(path) => write!(f, "no route for {}", path),
            ApiError::MethodNotAllowed(method) => write!(f, "method {} not allowed", method),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DateParseError> for ApiError {
    fn from(e: DateParseError) -> Self {
        ApiError::BadDate(e)
    }
}

impl From<postgres::Error> for ApiError {
    fn from(e: postgres::Error) -> Self {
        ApiError::Db(e)
    }
}

// ---------------------------------------------------------------------------
// Response Formatting
// ---------------------------------------------------------------------------

/// Builds the precipitation response: a JSON object keyed by ISO date.
///
/// Several stations can report the same date; inserting in iteration order
/// means the last reading processed for a date wins. That collapse is part
/// of the response contract — the object carries one value per date, not
/// one per station-date.
pub fn precipitation_body(readings: &[PrecipReading]) -> Value {
    let mut by_date = serde_json::Map::with_capacity(readings.len());
    for reading in readings {
        by_date.insert(reading.date.format("%Y-%m-%d").to_string(), json!(reading.inches));
    }
    Value::Object(by_date)
}

/// Builds the stations response: a bare array of station ids.
pub fn stations_body(station_ids: &[String]) -> Value {
    json!(station_ids)
}

/// Builds the temperature-observations response: a bare array of numbers.
pub fn tobs_body(observations: &[f64]) -> Value {
    json!(observations)
}

/// Builds the temperature-stats response: always the 3-element array
/// `[min, avg, max]`, with nulls when no rows matched. Never an object.
pub fn temp_stats_body(summary: &TempSummary) -> Value {
    json!([summary.min, summary.avg, summary.max])
}

// ---------------------------------------------------------------------------
// Request Handling
// ---------------------------------------------------------------------------

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// Runs the query behind a data route and shapes its response body.
///
/// `Home`, `Health`, and `Unknown` are settled by `dispatch` before a
/// connection is acquired; reaching here with one of them is a 404.
fn handle_query(
    client: &mut Client,
    config: &ServiceConfig,
    route: &Route,
) -> Result<Value, ApiError> {
    match route {
        Route::Precipitation => {
            let readings = query::precipitation_since(client, config.anchor_date)?;
            Ok(precipitation_body(&readings))
        }
        Route::Stations => {
            let station_ids = query::list_stations(client)?;
            Ok(stations_body(&station_ids))
        }
        Route::Tobs => {
            let observations = query::temperature_observations_since(
                client,
                config.anchor_date,
                &config.most_active_station,
            )?;
            Ok(tobs_body(&observations))
        }
        Route::TempStats { start, end } => {
            let start = query::parse_report_date("start", start)?;
            let end = match end {
                Some(raw) => Some(query::parse_report_date("end", raw)?),
                None => None,
            };
            let summary = query::temperature_stats(client, start, end)?;
            Ok(temp_stats_body(&summary))
        }
        Route::Home | Route::Health | Route::Unknown => {
            Err(ApiError::UnknownPath(format!("{:?}", route)))
        }
    }
}

/// Returns the worker's connection, opening one if the worker has none.
///
/// The dataset shape was verified at startup, so reconnects use the simple
/// path.
fn acquire_client(slot: &mut Option<Client>) -> Result<&mut Client, DbConfigError> {
    match slot {
        Some(client) => Ok(client),
        None => {
            logging::info(Component::Db, "opening dataset connection for worker");
            let client = db::connect_simple()?;
            Ok(slot.insert(client))
        }
    }
}

/// Routes one request to its handler and produces the response.
///
/// On a database failure the worker's connection is dropped so the next
/// request reconnects; the process keeps serving.
fn dispatch(slot: &mut Option<Client>, config: &ServiceConfig, request: &Request) -> HttpResponse {
    if *request.method() != Method::Get {
        let err = ApiError::MethodNotAllowed(request.method().to_string());
        return json_response(err.status_code(), &err.body());
    }

    let path = request.url().split('?').next().unwrap_or("/");

    match parse_route(path) {
        Route::Home => html_response(HELP_HTML),
        Route::Health => json_response(
            200,
            &json!({
                "status": "ok",
                "service": "climate_service",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        ),
        Route::Unknown => {
            let err = ApiError::UnknownPath(path.to_string());
            json_response(err.status_code(), &err.body())
        }
        route => {
            let client = match acquire_client(slot) {
                Ok(client) => client,
                Err(e) => {
                    logging::error(Component::Db, &format!("connection unavailable: {}", e));
                    return json_response(500, &json!({"error": "dataset unavailable; try again"}));
                }
            };

            match handle_query(client, config, &route) {
                Ok(body) => json_response(200, &body),
                Err(err) => {
                    if matches!(err, ApiError::Db(_)) {
                        logging::error(Component::Db, &err.to_string());
                        // Connection may be dead; reconnect on the next request.
                        *slot = None;
                    }
                    json_response(err.status_code(), &err.body())
                }
            }
        }
    }
}

/// Create HTTP response with JSON body
fn json_response(status_code: u16, body: &Value) -> HttpResponse {
    let bytes = serde_json::to_string_pretty(body).unwrap().into_bytes();

    Response::from_data(bytes)
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
        )
}

/// Create HTTP response with HTML body (root help page only)
fn html_response(body: &str) -> HttpResponse {
    Response::from_data(body.as_bytes().to_vec())
        .with_status_code(tiny_http::StatusCode::from(200))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
                .unwrap(),
        )
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start the HTTP server and serve requests until the process exits.
///
/// Workers share the listener behind an `Arc`; the pool join only returns
/// if every worker loop ends (listener shut down).
pub fn start_endpoint_server(config: &ServiceConfig) -> Result<(), String> {
    let server = Server::http(config.listen_address())
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;
    let server = Arc::new(server);

    // A zero-worker config would serve nothing; floor at one.
    let workers = config.workers.max(1);

    logging::info(
        Component::Http,
        &format!(
            "listening on http://{} with {} workers",
            config.listen_address(),
            workers
        ),
    );

    let pool = ThreadPool::new(workers);
    for worker_id in 0..workers {
        let server = Arc::clone(&server);
        let config = config.clone();
        pool.execute(move || worker_loop(worker_id, &server, &config));
    }

    pool.join();
    Ok(())
}

/// One worker: receive, dispatch, respond, repeat.
fn worker_loop(worker_id: usize, server: &Server, config: &ServiceConfig) {
    // Connection owned by this worker alone, opened on first use.
    let mut client: Option<Client> = None;

    for request in server.incoming_requests() {
        let response = dispatch(&mut client, config, &request);
        if let Err(e) = request.respond(response) {
            logging::warn(
                Component::Http,
                &format!("worker {}: failed to send response: {}", worker_id, e),
            );
        }
    }

    logging::info(Component::Http, &format!("worker {} shutting down", worker_id));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
