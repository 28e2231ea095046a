//! Route definitions for the `/classes` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::class;
use crate::state::AppState;

/// Routes mounted at `/classes`.
///
/// ```text
/// GET    /                   -> list
/// POST   /                   -> create
/// GET    /{id}               -> get_by_id
/// GET    /{id}/enrollments   -> list_enrollments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(class::list).post(class::create))
        .route("/{id}", get(class::get_by_id))
        .route("/{id}/enrollments", get(class::list_enrollments))
}
