pub mod class;
pub mod enrollment;
pub mod health;
pub mod student;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Every route requires a Bearer token; writes additionally require the
/// `admin` or staff (`admin`/`teacher`) role.
///
/// ```text
/// /students                              create (admin)
/// /students/{id}                         get
/// /students/{id}/transfers               transfer history
///
/// /classes                               list, create (admin)
/// /classes/{id}                          get
/// /classes/{id}/enrollments              list enrollments
///
/// /enrollments                           enroll (staff)
/// /enrollments/{id}                      get detail, withdraw (staff)
/// /enrollments/{id}/transfer             transfer to another class (staff)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/students", student::router())
        .nest("/classes", class::router())
        .nest("/enrollments", enrollment::router())
}
