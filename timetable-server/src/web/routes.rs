//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::domain::Coordinate;
use crate::lookup::{LookupParams, LookupResponse, lookup};
use crate::proximity::{DEFAULT_NEAREST, ProximityError};
use crate::source::Dataset;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Upper bound on `k` for the nearest-stops endpoint.
const MAX_NEAREST: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/lookup", get(lookup_json))
        .route("/api/stops/nearest", get(nearest_stops))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Fetch the memoized dataset without blocking the runtime on file reads.
async fn current_dataset(state: &AppState) -> Result<Dataset, AppError> {
    let source = state.source.clone();
    tokio::task::spawn_blocking(move || source.dataset())
        .await
        .map_err(|e| AppError::Internal {
            message: format!("dataset load panicked: {e}"),
        })
}

/// A query string that can't be read at all is treated as an empty one.
fn lookup_params(params: Result<Query<LookupParams>, QueryRejection>) -> LookupParams {
    match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "ignoring unreadable lookup query");
            LookupParams::default()
        }
    }
}

async fn run_lookup(
    state: &AppState,
    params: Result<Query<LookupParams>, QueryRejection>,
) -> Result<LookupResponse, AppError> {
    let request = lookup_params(params).into_request();
    let dataset = current_dataset(state).await?;
    Ok(lookup(&dataset, &request, &state.lookup))
}

/// Search page. Renders the form plus whatever the query string asks for.
async fn index_page(
    State(state): State<AppState>,
    params: Result<Query<LookupParams>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let response = run_lookup(&state, params).await?;
    let template = IndexTemplate {
        view: LookupView::from_response(&response),
    };
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;
    Ok(Html(html))
}

/// The same lookup as the page, as JSON.
async fn lookup_json(
    State(state): State<AppState>,
    params: Result<Query<LookupParams>, QueryRejection>,
) -> Result<Json<LookupResponse>, AppError> {
    Ok(Json(run_lookup(&state, params).await?))
}

/// Closest stops to a point.
async fn nearest_stops(
    State(state): State<AppState>,
    req: Result<Query<NearestStopsRequest>, QueryRejection>,
) -> Result<Json<NearestStopsResponse>, AppError> {
    let Query(req) = req.map_err(|rejection| AppError::BadRequest {
        message: rejection.body_text(),
    })?;
    let (Some(lat), Some(lon)) = (req.lat, req.lon) else {
        return Err(AppError::BadRequest {
            message: "lat and lon are required".to_string(),
        });
    };
    let point = Coordinate::new(lat, lon).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let k = req.k.unwrap_or(DEFAULT_NEAREST).min(MAX_NEAREST);

    let dataset = current_dataset(&state).await?;
    let Some(timetable) = dataset.timetable() else {
        let message = dataset
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "timetable unavailable".to_string());
        return Err(AppError::ServiceUnavailable { message });
    };

    let stops = timetable.stops.nearest_to(point, k)?;
    Ok(Json(NearestStopsResponse { stops }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl From<ProximityError> for AppError {
    fn from(e: ProximityError) -> Self {
        match e {
            ProximityError::NoStops => AppError::ServiceUnavailable {
                message: e.to_string(),
            },
            ProximityError::InvalidPoint { .. } => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::ServiceUnavailable { message } => {
                (StatusCode::SERVICE_UNAVAILABLE, message)
            }
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
