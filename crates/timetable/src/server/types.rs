//! Shared types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use crate::db::EventDb;
use crate::export::IcsFileExporter;
use crate::importer::Importer;
use crate::source::ScheduleSource;
use chrono::Weekday;

/// Application state shared by all handlers.
pub struct AppState {
    pub db: EventDb,
    pub importer: Importer,
    pub source: Box<dyn ScheduleSource>,
    pub exporter: IcsFileExporter,
    pub first_weekday: Weekday,
}

pub type SharedState = Arc<AppState>;

/// JSON error envelope returned by every failing endpoint.
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    detail: Option<String>,
}

impl From<(StatusCode, &'static str, Option<String>)> for ApiError {
    fn from((status, message, detail): (StatusCode, &'static str, Option<String>)) -> Self {
        Self {
            status,
            message,
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "detail": self.detail,
        });
        (self.status, Json(body)).into_response()
    }
}
