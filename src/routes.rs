use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use logger::{now_iso, CacheClearedEvent, ScrapeCompletedEvent, ScrapeFailedEvent};
use match_scraper::{live_viewer_url, ScrapeError, ScrapeResult, VlrFeed};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::state::AppState;

const MATCHES_KEY: &str = "matches";
const MATCHES_BASIC_KEY: &str = "matches_basic";
const VLR_LIVE_KEY: &str = "vlr_live";

const SERVICE_NAME: &str = "Esports Feed API";

const ENDPOINTS: &[(&str, &str)] = &[
    ("GET /hltv", "CS2 live and upcoming matches from HLTV"),
    ("GET /hltv/basic", "Match data with matchId and isLive"),
    ("GET /hltv/streams/{matchId}", "Streams for a specific match"),
    ("GET /hltv/match/{matchId}", "Match details with streams"),
    ("GET /live-matches", "Live Valorant matches from VLR.gg"),
    ("GET /health", "Health check"),
    ("POST /clear-cache", "Clear cached results"),
];

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/hltv", get(hltv_matches))
        .route("/hltv/basic", get(hltv_basic))
        .route("/hltv/streams/{match_id}", get(hltv_streams))
        .route("/hltv/match/{match_id}", get(hltv_match))
        .route("/live-matches", get(vlr_live_matches))
        .route("/clear-cache", post(clear_cache))
        .fallback(not_found)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

// --- Errors ---

/// Error body shared by every non-2xx response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: String,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: details.into(),
        }
    }

    fn scrape(error: &str, err: &ScrapeError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "details": self.details,
            "timestamp": now_iso(),
        });
        (self.status, Json(body)).into_response()
    }
}

fn endpoint_map() -> Value {
    ENDPOINTS
        .iter()
        .map(|(route, what)| (route.to_string(), Value::from(*what)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn validate_match_id(match_id: &str) -> Result<(), ApiError> {
    if !match_id.is_empty() && match_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Invalid match id",
            format!("match id must be numeric, got {match_id:?}"),
        ))
    }
}

// --- Cached scrapes ---

async fn cached_hltv(state: &AppState, key: &str) -> Result<ScrapeResult, ScrapeError> {
    if let Some(hit) = state.hltv_cache.get(key).await {
        debug!("Serving {key} from cache");
        return Ok(hit);
    }

    let started = Instant::now();
    match state.hltv.scrape().await {
        Ok(result) => {
            let _ = state.events.log(&ScrapeCompletedEvent {
                ts: now_iso(),
                event: "SCRAPE_COMPLETED",
                source: "hltv".to_string(),
                cache_key: key.to_string(),
                live_matches: result.live_matches.len(),
                upcoming_matches: result.upcoming_matches.len(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
            state.hltv_cache.insert(key, result.clone()).await;
            Ok(result)
        }
        Err(e) => {
            log_failure(state, "hltv", key, &e, started);
            Err(e)
        }
    }
}

async fn cached_vlr(state: &AppState) -> Result<VlrFeed, ScrapeError> {
    if let Some(hit) = state.vlr_cache.get(VLR_LIVE_KEY).await {
        debug!("Serving {VLR_LIVE_KEY} from cache");
        return Ok(hit);
    }

    let started = Instant::now();
    match state.vlr.scrape_live().await {
        Ok(feed) => {
            let _ = state.events.log(&ScrapeCompletedEvent {
                ts: now_iso(),
                event: "SCRAPE_COMPLETED",
                source: "vlr".to_string(),
                cache_key: VLR_LIVE_KEY.to_string(),
                live_matches: feed.count,
                upcoming_matches: 0,
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
            state.vlr_cache.insert(VLR_LIVE_KEY, feed.clone()).await;
            Ok(feed)
        }
        Err(e) => {
            log_failure(state, "vlr", VLR_LIVE_KEY, &e, started);
            Err(e)
        }
    }
}

fn log_failure(state: &AppState, source: &str, key: &str, err: &ScrapeError, started: Instant) {
    let _ = state.events.log(&ScrapeFailedEvent {
        ts: now_iso(),
        event: "SCRAPE_FAILED",
        source: source.to_string(),
        cache_key: key.to_string(),
        message: err.to_string(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    });
}

// --- Handlers ---

async fn index() -> Json<Value> {
    Json(json!({
        "message": format!("{SERVICE_NAME} is running"),
        "endpoints": endpoint_map(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "timestamp": now_iso(),
        "endpoints": endpoint_map(),
    }))
}

async fn hltv_matches(State(state): State<Arc<AppState>>) -> Result<Json<ScrapeResult>, ApiError> {
    cached_hltv(&state, MATCHES_KEY)
        .await
        .map(Json)
        .map_err(|e| ApiError::scrape("Failed to fetch HLTV matches", &e))
}

async fn hltv_basic(State(state): State<Arc<AppState>>) -> Result<Json<ScrapeResult>, ApiError> {
    cached_hltv(&state, MATCHES_BASIC_KEY)
        .await
        .map(Json)
        .map_err(|e| ApiError::scrape("Failed to fetch HLTV matches", &e))
}

#[derive(Debug, Serialize)]
struct StreamLink {
    platform: &'static str,
    url: String,
    language: &'static str,
    name: &'static str,
}

fn hltv_live_streams(base_url: &str, match_id: &str) -> Vec<StreamLink> {
    vec![StreamLink {
        platform: "hltv",
        url: live_viewer_url(base_url, match_id),
        language: "HLTV Live",
        name: "HLTV Live",
    }]
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamsResponse {
    match_id: String,
    match_url: String,
    streams: Vec<StreamLink>,
    live_url: String,
}

async fn hltv_streams(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<String>,
) -> Result<Json<StreamsResponse>, ApiError> {
    validate_match_id(&match_id)?;
    let base = state.hltv.config().hltv_base_url.as_str();

    Ok(Json(StreamsResponse {
        match_url: format!("{base}/matches/{match_id}"),
        streams: hltv_live_streams(base, &match_id),
        live_url: live_viewer_url(base, &match_id),
        match_id,
    }))
}

async fn hltv_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    validate_match_id(&match_id)?;
    let result = cached_hltv(&state, MATCHES_KEY)
        .await
        .map_err(|e| ApiError::scrape("Failed to fetch match details", &e))?;
    let base = state.hltv.config().hltv_base_url.as_str();

    let mut body = serde_json::Map::new();
    body.insert("matchId".into(), Value::from(match_id.as_str()));
    body.insert("matchUrl".into(), Value::from(format!("{base}/matches/{match_id}")));
    body.insert("liveUrl".into(), Value::from(live_viewer_url(base, &match_id)));

    if let Some(record) = result.find_by_match_id(&match_id) {
        if let Ok(Value::Object(fields)) = serde_json::to_value(record) {
            body.extend(fields);
        }
    }

    body.insert(
        "streams".into(),
        serde_json::to_value(hltv_live_streams(base, &match_id)).unwrap_or_default(),
    );
    Ok(Json(Value::Object(body)))
}

async fn vlr_live_matches(State(state): State<Arc<AppState>>) -> Result<Json<VlrFeed>, ApiError> {
    cached_vlr(&state)
        .await
        .map(Json)
        .map_err(|e| ApiError::scrape("Failed to fetch live matches", &e))
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    let removed = state.hltv_cache.clear().await + state.vlr_cache.clear().await;
    let _ = state.events.log(&CacheClearedEvent {
        ts: now_iso(),
        event: "CACHE_CLEARED",
        entries_removed: removed,
    });
    info!("Cache cleared ({removed} entries)");

    Json(json!({
        "message": "Cache cleared successfully",
        "timestamp": now_iso(),
    }))
}

async fn not_found() -> ApiError {
    let available: Vec<&str> = ENDPOINTS.iter().map(|(route, _)| *route).collect();
    ApiError::new(
        StatusCode::NOT_FOUND,
        "Endpoint not found",
        format!("available endpoints: {}", available.join(", ")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use match_scraper::{BestOf, MapScore, MatchRecord, ScraperConfig};
    use tower::ServiceExt;

    use crate::config::ServerConfig;

    fn state_with(scraper: ScraperConfig) -> Arc<AppState> {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cache_ttl: Duration::from_secs(60),
            log_dir: std::env::temp_dir().join(format!("esports-feed-routes-{}", std::process::id())),
            scraper,
        };
        Arc::new(AppState::new(&config).expect("state builds without network"))
    }

    fn test_state() -> Arc<AppState> {
        state_with(ScraperConfig::default())
    }

    /// Both sources are unreachable: VLR points at a closed port, Chrome at a
    /// missing binary.
    fn unreachable_state() -> Arc<AppState> {
        state_with(ScraperConfig {
            vlr_base_url: "http://127.0.0.1:1".into(),
            chrome_path: Some("/nonexistent/chrome".into()),
            http_timeout: Duration::from_secs(2),
            ..ScraperConfig::default()
        })
    }

    fn assert_error_body(body: &Value, error: &str) {
        assert_eq!(body["error"], error);
        assert!(!body["details"].as_str().unwrap().is_empty());
        assert!(body["timestamp"].is_string());
    }

    fn sample_result() -> ScrapeResult {
        ScrapeResult {
            live_matches: vec![MatchRecord {
                team1: "Vitality".into(),
                team2: "FaZe".into(),
                logo1: None,
                logo2: None,
                event: "IEM Cologne".into(),
                best_of: BestOf::Bo(3),
                map_score: Some(MapScore {
                    team1: Some("1".into()),
                    team2: Some("0".into()),
                }),
                time: Some("14 Jul, 18:00".into()),
                link: Some("https://www.hltv.org/matches/2373737/vitality-vs-faze".into()),
                match_id: Some("2373737".into()),
                stream_url: Some("https://www.hltv.org/live?matchId=2373737".into()),
                stream: None,
                is_live: true,
            }],
            upcoming_matches: vec![],
        }
    }

    async fn send(state: Arc<AppState>, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = router(state)
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_lists_endpoints() {
        let (status, body) = send(test_state(), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["endpoints"]["GET /hltv"].is_string());
    }

    #[tokio::test]
    async fn hltv_is_served_from_cache() {
        let state = test_state();
        state.hltv_cache.insert(MATCHES_KEY, sample_result()).await;

        let (status, body) = send(state, "GET", "/hltv").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["liveMatches"][0]["team1"], "Vitality");
        assert_eq!(body["liveMatches"][0]["mapScore"], "1 - 0");
        assert_eq!(body["upcomingMatches"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn streams_are_derived_without_scraping() {
        let (status, body) = send(test_state(), "GET", "/hltv/streams/2373737").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["liveUrl"], "https://www.hltv.org/live?matchId=2373737");
        assert_eq!(body["matchUrl"], "https://www.hltv.org/matches/2373737");
        assert_eq!(body["streams"][0]["platform"], "hltv");
    }

    #[tokio::test]
    async fn non_numeric_match_id_is_rejected() {
        let (status, body) = send(test_state(), "GET", "/hltv/streams/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid match id");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn match_details_merge_cached_record() {
        let state = test_state();
        state.hltv_cache.insert(MATCHES_KEY, sample_result()).await;

        let (status, body) = send(state.clone(), "GET", "/hltv/match/2373737").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["team1"], "Vitality");
        assert_eq!(body["matchId"], "2373737");
        assert_eq!(body["streams"][0]["url"], "https://www.hltv.org/live?matchId=2373737");

        let (_, unknown) = send(state, "GET", "/hltv/match/1").await;
        assert_eq!(unknown["matchId"], "1");
        assert!(unknown.get("team1").is_none());
    }

    #[tokio::test]
    async fn clear_cache_empties_every_cache() {
        let state = test_state();
        state.hltv_cache.insert(MATCHES_KEY, sample_result()).await;
        state.vlr_cache.insert(VLR_LIVE_KEY, VlrFeed::new(vec![])).await;

        let (status, body) = send(state.clone(), "POST", "/clear-cache").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Cache cleared successfully");
        assert!(state.hltv_cache.get(MATCHES_KEY).await.is_none());
        assert!(state.vlr_cache.get(VLR_LIVE_KEY).await.is_none());
    }

    #[tokio::test]
    async fn vlr_failure_is_a_server_error() {
        let state = unreachable_state();
        let (status, body) = send(state.clone(), "GET", "/live-matches").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_error_body(&body, "Failed to fetch live matches");
        assert!(body["details"].as_str().unwrap().contains("http://127.0.0.1:1/"));
        assert!(state.vlr_cache.get(VLR_LIVE_KEY).await.is_none());
    }

    #[tokio::test]
    async fn hltv_failure_is_a_server_error() {
        let state = unreachable_state();
        let (status, body) = send(state.clone(), "GET", "/hltv").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_error_body(&body, "Failed to fetch HLTV matches");
        assert!(state.hltv_cache.get(MATCHES_KEY).await.is_none());
    }

    #[tokio::test]
    async fn match_details_fail_when_scrape_fails() {
        let (status, body) = send(unreachable_state(), "GET", "/hltv/match/123").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_error_body(&body, "Failed to fetch match details");
    }

    #[tokio::test]
    async fn unknown_routes_get_error_body() {
        let (status, body) = send(test_state(), "GET", "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint not found");
        assert!(body["details"].as_str().unwrap().contains("/hltv"));
    }
}
