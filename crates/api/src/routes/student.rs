//! Route definitions for the `/students` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::student;
use crate::state::AppState;

/// Routes mounted at `/students`.
///
/// ```text
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// GET    /{id}/transfers   -> list_transfers
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(student::create))
        .route("/{id}", get(student::get_by_id))
        .route("/{id}/transfers", get(student::list_transfers))
}
