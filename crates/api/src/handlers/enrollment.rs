//! Handlers for the `/enrollments` resource, including transfers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use campus_core::enrollment::{
    carried_steps, duplicate_enrollment_message, ensure_capacity, ensure_different_class,
    normalize_reason, TransferRequest,
};
use campus_core::error::CoreError;
use campus_core::types::{parse_id, DbId, Timestamp};
use campus_db::models::class::Class;
use campus_db::models::enrollment::{CreateEnrollment, Enrollment, EnrollmentDetail, NewTransfer};
use campus_db::models::status::EnrollmentStatus;
use campus_db::models::transfer_log::CreateTransferLog;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A class as referenced from a transfer summary.
#[derive(Debug, Serialize)]
pub struct ClassRef {
    pub id: DbId,
    pub name: String,
}

impl From<&Class> for ClassRef {
    fn from(class: &Class) -> Self {
        Self {
            id: class.id,
            name: class.name.clone(),
        }
    }
}

/// What a completed transfer did.
#[derive(Debug, Serialize)]
pub struct TransferSummary {
    pub previous_enrollment_id: DbId,
    pub new_enrollment_id: DbId,
    pub from_class: ClassRef,
    pub to_class: ClassRef,
    pub reason: Option<String>,
    pub preserve_progress: bool,
    pub steps_carried: usize,
    pub transferred_by: DbId,
    pub transferred_at: Timestamp,
}

/// Body of a successful `POST /api/enrollments/{id}/transfer`.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub enrollment: EnrollmentDetail,
    pub transfer: TransferSummary,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/enrollments
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ValidatedJson(input): ValidatedJson<CreateEnrollment>,
) -> AppResult<(StatusCode, Json<Enrollment>)> {
    if let Some(status_id) = input.status_id {
        if EnrollmentStatus::from_id(status_id).is_none() {
            return Err(CoreError::Validation(format!(
                "Unknown enrollment status id {status_id}"
            ))
            .into());
        }
    }

    let enrollment = state.store.enroll(&input).await?;

    tracing::info!(
        enrollment_id = enrollment.id,
        student_id = enrollment.student_id,
        class_id = enrollment.class_id,
        user_id = staff.user_id,
        "Student enrolled",
    );
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// GET /api/enrollments/{id}
///
/// Returns the enrollment with its student and status expanded.
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Json<EnrollmentDetail>> {
    let id = parse_id("Enrollment", &raw_id)?;
    let detail = state
        .store
        .find_enrollment_detail(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Enrollment", id))?;
    Ok(Json(detail))
}

/// DELETE /api/enrollments/{id}
///
/// Withdraws the student and frees the seat.
pub async fn withdraw(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id("Enrollment", &raw_id)?;
    if !state.store.withdraw_enrollment(id).await? {
        return Err(CoreError::not_found("Enrollment", id).into());
    }
    tracing::info!(enrollment_id = id, user_id = staff.user_id, "Enrollment withdrawn");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// POST /api/enrollments/{id}/transfer
///
/// Moves an enrollment to another class. The body has already been validated
/// by the extractor, so nothing is read for a malformed request. Ids are
/// opaque text; one that is not a stored id is reported as not found. The
/// pre-checks here give precise error messages; the store repeats the
/// capacity and uniqueness checks inside its atomic write. The audit log is
/// written afterwards and its failure never fails the request.
pub async fn transfer(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(raw_id): Path<String>,
    ValidatedJson(input): ValidatedJson<TransferRequest>,
) -> AppResult<Json<TransferResponse>> {
    let store = &state.store;

    let id = parse_id("Enrollment", &raw_id)?;
    let source = store
        .find_enrollment(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Enrollment", id))?;

    // Unparseable text names no class: same outcome as a missing row.
    let target_class_id = parse_id("Class", input.target_class_id.as_deref().unwrap_or_default())?;

    ensure_different_class(source.class_id, target_class_id)?;

    if store
        .find_enrollment_for_student_in_class(source.student_id, target_class_id)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(duplicate_enrollment_message(
            source.student_id,
            target_class_id,
        ))
        .into());
    }

    let target_class = store
        .find_class(target_class_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Class", target_class_id))?;
    ensure_capacity(
        target_class.id,
        target_class.current_enrollment,
        target_class.capacity,
    )?;

    let source_class = store
        .find_class(source.class_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Class", source.class_id))?;

    let steps = carried_steps(&source.steps.0, input.preserve_progress);
    let steps_carried = steps.len();
    let plan = NewTransfer {
        source_enrollment_id: source.id,
        student_id: source.student_id,
        from_class_id: source_class.id,
        to_class_id: target_class.id,
        status_id: source.status_id,
        steps,
        enrolled_at: chrono::Utc::now(),
    };
    let created = store.apply_transfer(&plan).await?;

    let reason = normalize_reason(input.reason.as_deref());
    let log = CreateTransferLog {
        previous_enrollment_id: source.id,
        new_enrollment_id: created.id,
        student_id: source.student_id,
        from_class_id: source_class.id,
        to_class_id: target_class.id,
        reason: reason.clone(),
        preserve_progress: input.preserve_progress,
        transferred_by: staff.user_id,
    };
    if let Err(err) = store.create_transfer_log(&log).await {
        tracing::warn!(
            error = %err,
            previous_enrollment_id = source.id,
            new_enrollment_id = created.id,
            "Failed to write transfer log",
        );
    }

    let enrollment = store
        .find_enrollment_detail(created.id)
        .await?
        .ok_or_else(|| CoreError::not_found("Enrollment", created.id))?;

    tracing::info!(
        previous_enrollment_id = source.id,
        new_enrollment_id = created.id,
        student_id = source.student_id,
        from_class_id = source_class.id,
        to_class_id = target_class.id,
        preserve_progress = input.preserve_progress,
        user_id = staff.user_id,
        "Enrollment transferred",
    );

    Ok(Json(TransferResponse {
        enrollment,
        transfer: TransferSummary {
            previous_enrollment_id: source.id,
            new_enrollment_id: created.id,
            from_class: ClassRef::from(&source_class),
            to_class: ClassRef::from(&target_class),
            reason,
            preserve_progress: input.preserve_progress,
            steps_carried,
            transferred_by: staff.user_id,
            transferred_at: created.created_at,
        },
    }))
}
