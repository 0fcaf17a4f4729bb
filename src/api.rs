//! HTTP routes of the climate API
//!
//! Each handler issues exactly one query through the [`ClimateStore`] and
//! shapes the rows into the JSON records the API has always returned. Dates
//! in paths are passed through untouched: a malformed date simply matches
//! nothing and yields an empty list.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, State},
    response::{Html, Redirect},
    routing::get,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::QueryConfig;
use crate::models::{Station, TemperatureSummary};
use crate::store::ClimateStore;
use crate::{ClimateError, Result};

const INDEX: &str = "Available Routes:<br/>\
/api/v1.0/precipitation<br/>\
- Query dates and temperature from the last year. <br/>\
/api/v1.0/stations<br/>\
- Returns a json list of stations. <br/>\
/api/v1.0/tobs<br/>\
- Returns list of Temperature Observations(tobs) for previous year. <br/>\
/api/v1.0/yyyy-mm-dd/<br/>\
- Returns an Average, Max, and Min temperature for given date.<br/>\
/api/v1.0/yyyy-mm-dd/yyyy-mm-dd/<br/>\
- Returns an Average, Max, and Min temperature for given period.<br/>";

type ApiResult<T> = std::result::Result<Json<T>, ClimateError>;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClimateStore>,
    pub queries: Arc<QueryConfig>,
}

impl AppState {
    pub fn new(store: impl ClimateStore + 'static, queries: QueryConfig) -> Self {
        Self {
            store: Arc::new(store),
            queries: Arc::new(queries),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub name: Option<String>,
    pub station: String,
    pub elevation: Option<f64>,
}

impl From<Station> for StationRecord {
    fn from(station: Station) -> Self {
        Self {
            name: station.name,
            station: station.station,
            elevation: station.elevation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Station")]
    pub station: Option<String>,
    #[serde(rename = "Temperature")]
    pub temperature: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummaryRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Average Temperature")]
    pub average: f64,
    #[serde(rename = "Highest Temperature")]
    pub highest: f64,
    #[serde(rename = "Lowest Temperature")]
    pub lowest: f64,
}

impl DailySummaryRecord {
    fn new(date: String, summary: TemperatureSummary) -> Self {
        Self {
            date,
            average: summary.average,
            highest: summary.highest,
            lowest: summary.lowest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSummaryRecord {
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "Average Temperature")]
    pub average: f64,
    #[serde(rename = "Highest Temperature")]
    pub highest: f64,
    #[serde(rename = "Lowest Temperature")]
    pub lowest: f64,
}

impl RangeSummaryRecord {
    fn new(start_date: String, end_date: String, summary: TemperatureSummary) -> Self {
        Self {
            start_date,
            end_date,
            average: summary.average,
            highest: summary.highest,
            lowest: summary.lowest,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/{start}/", get(summary_on_date))
        .route("/api/v1.0/{start}/{end}/", get(summary_between_dates))
        .route("/api/v1.0/{start}", get(add_trailing_slash))
        .route("/api/v1.0/{start}/{end}", get(add_trailing_slash))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX)
}

/// Date/temperature pairs of the configured precipitation window, wrapped in
/// a single-element outer list.
#[instrument(skip(state))]
async fn precipitation(
    State(state): State<AppState>,
) -> ApiResult<Vec<Vec<(String, Option<f64>)>>> {
    let rows = state
        .store
        .temperatures_between(&state.queries.precipitation)
        .await?;
    info!(rows = rows.len(), "Serving precipitation window");

    let pairs = rows
        .into_iter()
        .map(|row| (row.date, row.temperature))
        .collect();
    Ok(Json(vec![pairs]))
}

#[instrument(skip(state))]
async fn stations(State(state): State<AppState>) -> ApiResult<Vec<StationRecord>> {
    let stations = state.store.stations().await?;
    info!(rows = stations.len(), "Serving stations");
    Ok(Json(stations.into_iter().map(StationRecord::from).collect()))
}

#[instrument(skip(state))]
async fn tobs(State(state): State<AppState>) -> ApiResult<Vec<TemperatureRecord>> {
    let rows = state
        .store
        .station_temperatures_between(&state.queries.tobs)
        .await?;
    info!(rows = rows.len(), "Serving temperature observations");

    let records = rows
        .into_iter()
        .map(|row| {
            Ok(TemperatureRecord {
                temperature: row.whole_degrees()?,
                date: row.date,
                station: row.station_name,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(records))
}

#[instrument(skip(state))]
async fn summary_on_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Vec<DailySummaryRecord>> {
    let summary = state.store.summary_on(&date).await?;
    info!(found = summary.is_some(), "Serving daily summary");

    Ok(Json(
        summary
            .map(|summary| DailySummaryRecord::new(date, summary))
            .into_iter()
            .collect(),
    ))
}

#[instrument(skip(state))]
async fn summary_between_dates(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
) -> ApiResult<Vec<RangeSummaryRecord>> {
    let summary = state.store.summary_between(&start, &end).await?;
    info!(found = summary.is_some(), "Serving range summary");

    Ok(Json(
        summary
            .map(|summary| RangeSummaryRecord::new(start, end, summary))
            .into_iter()
            .collect(),
    ))
}

/// Date routes are canonical with a trailing slash
async fn add_trailing_slash(OriginalUri(uri): OriginalUri) -> Redirect {
    let target = match uri.query() {
        Some(query) => format!("{}/?{}", uri.path(), query),
        None => format!("{}/", uri.path()),
    };
    Redirect::permanent(&target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DateRange;
    use crate::models::{DatedTemperature, StationTemperature};
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubStore {
        temperatures: Vec<DatedTemperature>,
        stations: Vec<Station>,
        station_temperatures: Vec<StationTemperature>,
        summary: Option<TemperatureSummary>,
        calls: Mutex<Vec<String>>,
    }

    impl StubStore {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl ClimateStore for StubStore {
        async fn temperatures_between(&self, range: &DateRange) -> Result<Vec<DatedTemperature>> {
            self.record(format!("temperatures {}..{}", range.start, range.end));
            Ok(self.temperatures.clone())
        }

        async fn stations(&self) -> Result<Vec<Station>> {
            self.record("stations".to_string());
            Ok(self.stations.clone())
        }

        async fn station_temperatures_between(
            &self,
            range: &DateRange,
        ) -> Result<Vec<StationTemperature>> {
            self.record(format!("station temperatures {}..{}", range.start, range.end));
            Ok(self.station_temperatures.clone())
        }

        async fn summary_on(&self, date: &str) -> Result<Option<TemperatureSummary>> {
            self.record(format!("summary {date}"));
            Ok(self.summary.clone())
        }

        async fn summary_between(
            &self,
            start: &str,
            end: &str,
        ) -> Result<Option<TemperatureSummary>> {
            self.record(format!("summary {start}..{end}"));
            Ok(self.summary.clone())
        }
    }

    fn summary() -> TemperatureSummary {
        TemperatureSummary {
            average: 75.0,
            highest: 80.0,
            lowest: 70.0,
            observations: 3,
        }
    }

    async fn get(store: StubStore, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let app = router(AppState::new(store, QueryConfig::default()));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn get_json(store: StubStore, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = get(store, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_index_lists_routes() {
        let (status, headers, body) = get(StubStore::default(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            headers[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        let text = String::from_utf8(body).unwrap();
        for route in [
            "/api/v1.0/precipitation",
            "/api/v1.0/stations",
            "/api/v1.0/tobs",
            "/api/v1.0/yyyy-mm-dd/",
            "/api/v1.0/yyyy-mm-dd/yyyy-mm-dd/",
        ] {
            assert!(text.contains(route), "missing {route}");
        }
    }

    #[tokio::test]
    async fn test_precipitation_nests_pairs_in_one_list() {
        let store = StubStore {
            temperatures: vec![
                DatedTemperature {
                    date: "2016-01-01".to_string(),
                    temperature: Some(62.0),
                },
                DatedTemperature {
                    date: "2016-01-01".to_string(),
                    temperature: None,
                },
            ],
            ..StubStore::default()
        };
        let (status, body) = get_json(store, "/api/v1.0/precipitation").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([[["2016-01-01", 62.0], ["2016-01-01", null]]]));
    }

    #[tokio::test]
    async fn test_precipitation_empty_window() {
        let (status, body) = get_json(StubStore::default(), "/api/v1.0/precipitation").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([[]]));
    }

    #[tokio::test]
    async fn test_list_routes_use_configured_windows() {
        let store = Arc::new(StubStore::default());
        let state = AppState {
            store: store.clone(),
            queries: Arc::new(QueryConfig::default()),
        };
        let app = router(state);
        for uri in ["/api/v1.0/precipitation", "/api/v1.0/tobs"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(
            *store.calls.lock().unwrap(),
            vec![
                "temperatures 2016-01-01..2016-01-01".to_string(),
                "station temperatures 2016-01-01..2017-01-01".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_stations_shape() {
        let store = StubStore {
            stations: vec![Station::new("S1", "A", 10.0), Station::new("S2", "B", 5.0)],
            ..StubStore::default()
        };
        let (status, body) = get_json(store, "/api/v1.0/stations").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"name": "A", "station": "S1", "elevation": 10.0},
                {"name": "B", "station": "S2", "elevation": 5.0}
            ])
        );
    }

    #[tokio::test]
    async fn test_tobs_truncates_temperatures() {
        let store = StubStore {
            station_temperatures: vec![StationTemperature {
                station_name: Some("A".to_string()),
                date: "2016-03-04".to_string(),
                temperature: Some(71.8),
            }],
            ..StubStore::default()
        };
        let (status, body) = get_json(store, "/api/v1.0/tobs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"Date": "2016-03-04", "Station": "A", "Temperature": 71}])
        );
    }

    #[tokio::test]
    async fn test_tobs_null_reading_is_server_error() {
        let store = StubStore {
            station_temperatures: vec![StationTemperature {
                station_name: Some("A".to_string()),
                date: "2016-03-04".to_string(),
                temperature: None,
            }],
            ..StubStore::default()
        };
        let (status, body) = get_json(store, "/api/v1.0/tobs").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], json!(500));
        assert!(body["error"].as_str().unwrap().contains("tobs"));
    }

    #[tokio::test]
    async fn test_daily_summary_record() {
        let store = StubStore {
            summary: Some(summary()),
            ..StubStore::default()
        };
        let (status, body) = get_json(store, "/api/v1.0/2016-06-01/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "Date": "2016-06-01",
                "Average Temperature": 75.0,
                "Highest Temperature": 80.0,
                "Lowest Temperature": 70.0
            }])
        );
    }

    #[tokio::test]
    async fn test_daily_summary_without_rows_is_empty() {
        let (status, body) = get_json(StubStore::default(), "/api/v1.0/not-a-date/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_range_summary_record() {
        let store = StubStore {
            summary: Some(summary()),
            ..StubStore::default()
        };
        let (status, body) = get_json(store, "/api/v1.0/2016-06-01/2016-06-30/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "Start Date": "2016-06-01",
                "End Date": "2016-06-30",
                "Average Temperature": 75.0,
                "Highest Temperature": 80.0,
                "Lowest Temperature": 70.0
            }])
        );
    }

    #[tokio::test]
    async fn test_range_summary_without_rows_is_empty() {
        let (status, body) =
            get_json(StubStore::default(), "/api/v1.0/2017-01-01/2016-01-01/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_missing_trailing_slash_redirects() {
        let (status, headers, _) = get(StubStore::default(), "/api/v1.0/2016-06-01").await;
        assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
        assert_eq!(headers[header::LOCATION], "/api/v1.0/2016-06-01/");

        let (status, headers, _) =
            get(StubStore::default(), "/api/v1.0/2016-06-01/2016-06-30").await;
        assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
        assert_eq!(headers[header::LOCATION], "/api/v1.0/2016-06-01/2016-06-30/");
    }

    #[tokio::test]
    async fn test_static_routes_win_over_dates() {
        let store = StubStore {
            stations: vec![Station::new("S1", "A", 10.0)],
            ..StubStore::default()
        };
        let (status, body) = get_json(store, "/api/v1.0/stations").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
