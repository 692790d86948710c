use axum::routing::{delete, get, post};
use axum::Router;

use crate::server::endpoints::*;
use crate::server::types::SharedState;

mod endpoints;
mod types;

pub use types::AppState;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: SharedState) -> Router {
    let grid_router = Router::new()
        .route("/grid/week", get(get_week_grid))
        .route("/grid/month", get(get_month_grid))
        .route("/grid/year", get(get_year_grid));

    Router::new()
        .route("/health", get(get_health))
        .route("/events", get(get_events))
        .route("/events/:event_id", delete(delete_event))
        .route("/import", post(post_import))
        .route("/export", post(post_export))
        .merge(grid_router)
        .with_state(app_state)
}
