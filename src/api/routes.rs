use crate::analyzer::range::{self, RangeRequest, TimeFrame};
use crate::analyzer::report::AggregatedReport;
use crate::config::Config;
use crate::export::{self, ExportLinks};
use crate::source;
use crate::store::{LoadState, ReportStore, SharedStore};
use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

const REFRESH_PATH: &str = "/api/v1/refresh";

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    pub store: Arc<SharedStore>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/summary", get(summary))
        .route("/api/v1/date-range", get(date_range))
        .route("/api/v1/export", get(export_links))
        .route(REFRESH_PATH, post(refresh))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    time_frame: Option<String>,
    start: Option<String>,
    end: Option<String>,
    today: Option<String>,
}

impl SummaryQuery {
    fn to_request(&self, config: &Config) -> ApiResult<RangeRequest> {
        let frame = self
            .time_frame
            .as_deref()
            .map(str::parse::<TimeFrame>)
            .transpose()
            .map_err(|error| ApiError::BadRequest(error.to_string()))?
            .unwrap_or(TimeFrame::ThisWeek);
        let week_start = config.parse_week_start()?;

        range::request_from_inputs(
            frame,
            self.start.as_deref(),
            self.end.as_deref(),
            self.today.as_deref(),
            week_start,
        )
        .map_err(|error| ApiError::BadRequest(error.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct StatusPayload {
    state: &'static str,
    failure_kind: Option<&'static str>,
    generated_at: Option<String>,
    rows: Option<usize>,
    cached_summaries: usize,
    data_url: String,
}

#[derive(Debug, Serialize)]
struct DateRangePayload {
    earliest: Option<String>,
    latest: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExportPayload {
    period_start: String,
    #[serde(flatten)]
    links: ExportLinks,
}

async fn status(State(state): State<ApiState>) -> ApiResult<Json<StatusPayload>> {
    Ok(Json(status_payload(&state.config, &state.store.current())))
}

async fn summary(
    State(state): State<ApiState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<AggregatedReport>> {
    let request = query.to_request(&state.config)?;
    let store = loaded_store(&state)?;
    let summary = store.summary(&request);

    Ok(Json(summary.as_ref().clone()))
}

async fn date_range(State(state): State<ApiState>) -> ApiResult<Json<DateRangePayload>> {
    let store = loaded_store(&state)?;
    let hint = store.raw().date_range.clone().unwrap_or_default();

    Ok(Json(DateRangePayload {
        earliest: Some(hint.earliest).filter(|value| !value.is_empty()),
        latest: Some(hint.latest).filter(|value| !value.is_empty()),
    }))
}

async fn export_links(
    State(state): State<ApiState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<ExportPayload>> {
    let request = query.to_request(&state.config)?;
    let resolved = range::resolve(&request);
    let links = export::export_links(&state.config, &resolved.current.start)?;

    Ok(Json(ExportPayload {
        period_start: resolved.current.start,
        links,
    }))
}

async fn refresh(State(state): State<ApiState>) -> ApiResult<Json<StatusPayload>> {
    let config = Arc::clone(&state.config);
    let outcome = tokio::task::spawn_blocking(move || source::load_document(&config))
        .await
        .context("Refresh task failed")?;

    let next = state.store.replace(outcome);
    match &next {
        LoadState::Loaded(_) => info!("report document refreshed"),
        LoadState::Failed { kind, .. } => warn!(kind = *kind, "report document refresh failed"),
    }

    loaded_store(&state)?;
    Ok(Json(status_payload(&state.config, &next)))
}

fn loaded_store(state: &ApiState) -> ApiResult<Arc<ReportStore>> {
    match state.store.current() {
        LoadState::Loaded(store) => Ok(store),
        LoadState::Failed { message, .. } => Err(ApiError::Unavailable(message)),
    }
}

fn status_payload(config: &Config, state: &LoadState) -> StatusPayload {
    match state {
        LoadState::Loaded(store) => StatusPayload {
            state: "loaded",
            failure_kind: None,
            generated_at: Some(store.raw().generated_at.clone()),
            rows: Some(store.raw().row_count()),
            cached_summaries: store.cached_summaries(),
            data_url: config.data_url.clone(),
        },
        LoadState::Failed { kind, .. } => StatusPayload {
            state: "failed",
            failure_kind: Some(*kind),
            generated_at: None,
            rows: None,
            cached_summaries: 0,
            data_url: config.data_url.clone(),
        },
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Unavailable(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Unavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": message, "retry": REFRESH_PATH })),
            )
                .into_response(),
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
        }
    }
}
