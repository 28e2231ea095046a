//! Enrollment entity model, DTOs and the transfer write plan.

use campus_core::enrollment::ProgressStep;
use campus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::{StatusId, StatusInfo};
use crate::models::student::Student;

/// An enrollment row from the `enrollments` table.
///
/// `steps` is stored as a JSONB array; its order is meaningful.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub student_id: DbId,
    pub class_id: DbId,
    pub status_id: StatusId,
    pub enrolled_at: Timestamp,
    pub steps: Json<Vec<ProgressStep>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An enrollment with its student and status expanded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student: Student,
    pub status: StatusInfo,
}

/// DTO for enrolling a student in a class.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEnrollment {
    #[validate(range(min = 1, message = "student_id must be a positive id"))]
    pub student_id: DbId,
    #[validate(range(min = 1, message = "class_id must be a positive id"))]
    pub class_id: DbId,
    /// Defaults to 2 (Active) if omitted.
    pub status_id: Option<StatusId>,
    #[serde(default)]
    pub steps: Vec<ProgressStep>,
}

/// Everything needed to move an enrollment in one atomic write.
///
/// Built by the transfer handler after its pre-checks; storage backends
/// re-verify the source row, capacity and uniqueness while holding their
/// locks.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub source_enrollment_id: DbId,
    pub student_id: DbId,
    pub from_class_id: DbId,
    pub to_class_id: DbId,
    pub status_id: StatusId,
    pub steps: Vec<ProgressStep>,
    pub enrolled_at: Timestamp,
}
