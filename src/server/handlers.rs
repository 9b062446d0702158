use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::acquisition::{AcquisitionOutcome, PositionEvent, ReplaySource};
use crate::geography::Region;
use crate::location::{check_coordinates, DetectedLocation, LocateError};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

fn log_request(route: &str, loc: &DetectedLocation, start: Instant) {
    info!(
        route,
        region = %loc.region,
        confidence = loc.confidence_score,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Location updated"
    );
}

// ─── GET / DELETE /api/location ──────────────────────────────────

pub async fn current_location(State(state): State<Arc<AppState>>) -> Result<Json<DetectedLocation>, ApiError> {
    state
        .current_or_stored()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "No location detected yet"))
}

pub async fn clear_location(State(state): State<Arc<AppState>>) -> StatusCode {
    state.clear();
    info!("Location cleared");
    StatusCode::NO_CONTENT
}

// ─── POST /api/location/manual ───────────────────────────────────

#[derive(Deserialize)]
pub struct ManualBody {
    pub lat: f64,
    pub lon: f64,
}

pub async fn manual_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ManualBody>,
) -> Result<Json<DetectedLocation>, ApiError> {
    let start = Instant::now();
    check_coordinates(body.lat, body.lon).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let loc = state.assembler.manual(body.lat, body.lon);
    state.set_current(loc.clone());
    log_request("POST /api/location/manual", &loc, start);
    Ok(Json(loc))
}

// ─── POST /api/location/image ────────────────────────────────────

pub async fn image_location(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<DetectedLocation>, ApiError> {
    let start = Instant::now();
    let loc = state
        .assembler
        .from_image(&body)
        .ok_or_else(|| api_error(StatusCode::UNPROCESSABLE_ENTITY, LocateError::NoGpsInImage.to_string()))?;

    state.set_current(loc.clone());
    log_request("POST /api/location/image", &loc, start);
    Ok(Json(loc))
}

// ─── POST /api/location/gps ──────────────────────────────────────

#[derive(Deserialize)]
pub struct GpsBody {
    pub events: Vec<PositionEvent>,
    /// Deliver fixes at their timestamps.
    #[serde(default)]
    pub realtime: bool,
}

pub async fn gps_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GpsBody>,
) -> Result<Json<DetectedLocation>, ApiError> {
    let start = Instant::now();
    let source = ReplaySource::new(body.events).realtime(body.realtime);

    let outcome = {
        let mut session = state.session.lock().await;
        let _running = state.track_running(session.canceller());
        session.start(&source).await
    };

    match outcome {
        AcquisitionOutcome::Ready(fix) => {
            let loc = state.assembler.from_gps(&fix);
            state.set_current(loc.clone());
            log_request("POST /api/location/gps", &loc, start);
            Ok(Json(loc))
        }
        AcquisitionOutcome::Failed(err) => Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())),
        AcquisitionOutcome::Cancelled => Err(api_error(StatusCode::CONFLICT, "Acquisition cancelled")),
    }
}

// ─── POST /api/location/gps/cancel ───────────────────────────────

pub async fn cancel_gps(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    if state.cancel_acquisition() {
        info!("GPS acquisition cancel requested");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, "No GPS acquisition in progress"))
    }
}

// ─── GET /api/regions ────────────────────────────────────────────

pub async fn region_list(State(state): State<Arc<AppState>>) -> Json<Vec<Region>> {
    Json(state.assembler.resolver().geography().regions.clone())
}
