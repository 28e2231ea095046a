//! Transfer audit log model and DTO.
//!
//! Rows are append-only; there is no `updated_at`.

use campus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `transfer_logs` table.
///
/// `previous_enrollment_id` points at a row that no longer exists once the
/// transfer has completed, so it carries no foreign key.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TransferLog {
    pub id: DbId,
    pub previous_enrollment_id: DbId,
    pub new_enrollment_id: DbId,
    pub student_id: DbId,
    pub from_class_id: DbId,
    pub to_class_id: DbId,
    pub reason: Option<String>,
    pub preserve_progress: bool,
    pub transferred_by: DbId,
    pub created_at: Timestamp,
}

/// DTO for appending a transfer log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransferLog {
    pub previous_enrollment_id: DbId,
    pub new_enrollment_id: DbId,
    pub student_id: DbId,
    pub from_class_id: DbId,
    pub to_class_id: DbId,
    pub reason: Option<String>,
    pub preserve_progress: bool,
    pub transferred_by: DbId,
}
