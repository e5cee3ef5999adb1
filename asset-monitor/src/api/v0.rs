//! API v0 endpoints.
//!
//! Version 0 signals an unstable API -- breaking changes are expected.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::server::SharedState;
use crate::api_client::types::MonitorStatus;
use crate::sink;
use crate::tracing::prelude::*;
use crate::types::Alert;

const DEFAULT_ALERT_LIMIT: usize = 50;
const MAX_ALERT_LIMIT: usize = 1000;

/// Build the v0 API routes with OpenAPI metadata.
pub fn routes() -> OpenApiRouter<SharedState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(get_monitor))
        .routes(routes!(get_alerts))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = OK, description = "Server is running", body = String),
    ),
)]
async fn health() -> &'static str {
    "OK"
}

/// Return the current monitor status snapshot.
#[utoipa::path(
    get,
    path = "/monitor",
    tag = "monitor",
    responses(
        (status = OK, description = "Current monitor status", body = MonitorStatus),
    ),
)]
async fn get_monitor(State(state): State<SharedState>) -> Json<MonitorStatus> {
    Json(state.status())
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(super) struct AlertsQuery {
    /// Maximum number of alerts to return (1--1000, default 50).
    limit: Option<usize>,
}

/// Return the most recent alerts from the alert log, oldest first.
#[utoipa::path(
    get,
    path = "/alerts",
    tag = "alerts",
    params(AlertsQuery),
    responses(
        (status = OK, description = "Recent alerts", body = Vec<Alert>),
        (status = INTERNAL_SERVER_ERROR, description = "Alert log unreadable"),
    ),
)]
pub(super) async fn get_alerts(
    State(state): State<SharedState>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<Vec<Alert>>, StatusCode> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ALERT_LIMIT)
        .clamp(1, MAX_ALERT_LIMIT);
    let path = state.alerts_file().clone();

    tokio::task::spawn_blocking(move || sink::read_recent(&path, limit))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map(Json)
        .map_err(|e| {
            warn!(event = "alert_log_unreadable", error = %e, "Failed to read alert log");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
