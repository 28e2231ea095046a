//! Route definitions for the `/enrollments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::enrollment;
use crate::state::AppState;

/// Routes mounted at `/enrollments`.
///
/// ```text
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// DELETE /{id}             -> withdraw
/// POST   /{id}/transfer    -> transfer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(enrollment::create))
        .route("/{id}", get(enrollment::get_by_id).delete(enrollment::withdraw))
        .route("/{id}/transfer", post(enrollment::transfer))
}
