//! Handlers for the `/students` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use campus_core::error::CoreError;
use campus_core::types::{parse_id, DbId};
use campus_db::models::student::{CreateStudent, Student};
use campus_db::models::transfer_log::TransferLog;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/students
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    let student = state.store.create_student(&input).await?;
    tracing::info!(student_id = student.id, user_id = admin.user_id, "Student created");
    Ok((StatusCode::CREATED, Json(student)))
}

/// GET /api/students/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Student>> {
    let student = find_student(&state, parse_id("Student", &raw_id)?).await?;
    Ok(Json(student))
}

/// GET /api/students/{id}/transfers
///
/// Transfer history for a student, most recent first.
pub async fn list_transfers(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Json<DataResponse<Vec<TransferLog>>>> {
    let id = parse_id("Student", &raw_id)?;
    find_student(&state, id).await?;
    let logs = state.store.list_transfer_logs_for_student(id).await?;
    Ok(Json(DataResponse { data: logs }))
}

async fn find_student(state: &AppState, id: DbId) -> AppResult<Student> {
    state
        .store
        .find_student(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Student", id).into())
}
