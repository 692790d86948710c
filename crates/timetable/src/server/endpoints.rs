//! HTTP endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::types::{ApiError, SharedState};
use crate::export::CalendarExporter;
use crate::grid;

/// GET /health
pub async fn get_health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct EventRangeParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// GET /events?from=&to=
/// Returns stored events, optionally restricted to a start-time range.
pub async fn get_events(
    Query(params): Query<EventRangeParams>,
    State(s): State<SharedState>,
) -> Response {
    let result = match (params.from, params.to) {
        (Some(from), Some(to)) => s.db.events_between(from, to),
        _ => s.db.all_events(),
    };

    match result {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(e) => ApiError::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch events",
            Some(e.to_string()),
        ))
        .into_response(),
    }
}

/// DELETE /events/:event_id
pub async fn delete_event(
    Path(event_id): Path<i64>,
    State(s): State<SharedState>,
) -> Response {
    info!("DELETE /events/{event_id}");

    match s.db.remove(event_id) {
        Ok(true) => (StatusCode::OK, Json(json!({ "removed": event_id }))).into_response(),
        Ok(false) => {
            ApiError::from((StatusCode::NOT_FOUND, "No such event", None)).into_response()
        }
        Err(e) => ApiError::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to remove event",
            Some(e.to_string()),
        ))
        .into_response(),
    }
}

/// POST /import
/// Runs the configured schedule source through the importer.
pub async fn post_import(State(s): State<SharedState>) -> Response {
    info!("POST /import");

    match s.importer.import(s.source.as_ref(), &s.db).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => ApiError::from((
            StatusCode::BAD_GATEWAY,
            "Import failed",
            Some(e.to_string()),
        ))
        .into_response(),
    }
}

/// POST /export
/// Exports all stored events to the configured destination.
pub async fn post_export(State(s): State<SharedState>) -> Response {
    info!("POST /export");

    let events = match s.db.all_events() {
        Ok(events) => events,
        Err(e) => {
            return ApiError::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch events",
                Some(e.to_string()),
            ))
            .into_response()
        }
    };

    if events.is_empty() {
        return ApiError::from((StatusCode::NOT_FOUND, "No events to export", None))
            .into_response();
    }

    let records: Vec<_> = events.into_iter().map(Into::into).collect();
    let outcome = s.exporter.export(&records).await;

    (StatusCode::OK, Json(outcome)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct GridParams {
    pub date: NaiveDate,
}

/// GET /grid/week?date=
pub async fn get_week_grid(Query(params): Query<GridParams>) -> Response {
    (StatusCode::OK, Json(grid::week_dates(params.date))).into_response()
}

/// GET /grid/month?date=
pub async fn get_month_grid(
    Query(params): Query<GridParams>,
    State(s): State<SharedState>,
) -> Response {
    let days = grid::month_grid(params.date, s.first_weekday);
    (StatusCode::OK, Json(days)).into_response()
}

/// GET /grid/year?date=
pub async fn get_year_grid(Query(params): Query<GridParams>) -> Response {
    (StatusCode::OK, Json(grid::months_in_year(params.date))).into_response()
}
