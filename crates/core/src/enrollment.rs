//! Enrollment and transfer rules.
//!
//! Pure functions used by both storage backends and the HTTP handlers so the
//! same checks run whether a class is read outside or inside a transaction.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum length (in characters) of a free-text transfer reason.
pub const MAX_TRANSFER_REASON_LEN: usize = 500;

// `validator`'s `length` rule takes a `u64` bound.
const MAX_TRANSFER_REASON_LEN_U64: u64 = MAX_TRANSFER_REASON_LEN as u64;

// ---------------------------------------------------------------------------
// Progress steps
// ---------------------------------------------------------------------------

/// One entry in an enrollment's ordered progress history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStep {
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

/// Steps the new enrollment starts with after a transfer.
///
/// Either the full history in its original order, or nothing.
pub fn carried_steps(steps: &[ProgressStep], preserve_progress: bool) -> Vec<ProgressStep> {
    if preserve_progress {
        steps.to_vec()
    } else {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Transfer request
// ---------------------------------------------------------------------------

fn default_preserve_progress() -> bool {
    true
}

/// Body of `POST /api/enrollments/{id}/transfer`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Opaque class id. Absent and `null` both fail the `required` rule.
    #[validate(
        required(message = "targetClassId is required"),
        length(min = 1, message = "targetClassId must not be empty")
    )]
    pub target_class_id: Option<String>,

    #[validate(length(
        max = MAX_TRANSFER_REASON_LEN_U64,
        message = "reason must be at most 500 characters"
    ))]
    pub reason: Option<String>,

    #[serde(default = "default_preserve_progress")]
    pub preserve_progress: bool,
}

/// Trim a reason and drop it entirely if nothing is left.
pub fn normalize_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Class rules
// ---------------------------------------------------------------------------

/// A transfer must move the enrollment somewhere else.
pub fn ensure_different_class(source_class_id: DbId, target_class_id: DbId) -> Result<(), CoreError> {
    if source_class_id == target_class_id {
        return Err(CoreError::Validation(
            "Cannot transfer an enrollment to the class it is already in".into(),
        ));
    }
    Ok(())
}

/// Reject when the class has no free seat.
pub fn ensure_capacity(class_id: DbId, current_enrollment: i32, capacity: i32) -> Result<(), CoreError> {
    if current_enrollment >= capacity {
        return Err(CoreError::Conflict(format!(
            "Class {class_id} is at capacity ({current_enrollment}/{capacity})"
        )));
    }
    Ok(())
}

/// Counter value after one enrollment leaves a class. Never negative.
pub fn decrement_enrollment(current_enrollment: i32) -> i32 {
    (current_enrollment - 1).max(0)
}

/// Message used when a student already holds a seat in the class.
pub fn duplicate_enrollment_message(student_id: DbId, class_id: DbId) -> String {
    format!("Student {student_id} is already enrolled in class {class_id}")
}
