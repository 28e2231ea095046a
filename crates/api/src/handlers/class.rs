//! Handlers for the `/classes` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use campus_core::error::CoreError;
use campus_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use campus_core::types::{parse_id, DbId};
use campus_db::models::class::{Class, CreateClass};
use campus_db::models::enrollment::Enrollment;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/classes
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateClass>,
) -> AppResult<(StatusCode, Json<Class>)> {
    let class = state.store.create_class(&input).await?;
    tracing::info!(
        class_id = class.id,
        capacity = class.capacity,
        user_id = admin.user_id,
        "Class created",
    );
    Ok((StatusCode::CREATED, Json(class)))
}

/// GET /api/classes?limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Class>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let classes = state.store.list_classes(limit, offset).await?;
    Ok(Json(DataResponse { data: classes }))
}

/// GET /api/classes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Class>> {
    let class = find_class(&state, parse_id("Class", &raw_id)?).await?;
    Ok(Json(class))
}

/// GET /api/classes/{id}/enrollments
pub async fn list_enrollments(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Json<DataResponse<Vec<Enrollment>>>> {
    let id = parse_id("Class", &raw_id)?;
    find_class(&state, id).await?;
    let enrollments = state.store.list_enrollments_for_class(id).await?;
    Ok(Json(DataResponse { data: enrollments }))
}

async fn find_class(state: &AppState, id: DbId) -> AppResult<Class> {
    state
        .store
        .find_class(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Class", id).into())
}
