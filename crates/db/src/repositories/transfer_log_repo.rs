//! Repository for the append-only `transfer_logs` table.

use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::transfer_log::{CreateTransferLog, TransferLog};

const COLUMNS: &str = "id, previous_enrollment_id, new_enrollment_id, student_id, \
    from_class_id, to_class_id, reason, preserve_progress, transferred_by, created_at";

/// Insert and query operations for transfer logs.
pub struct TransferLogRepo;

impl TransferLogRepo {
    /// Append a transfer log entry.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransferLog,
    ) -> Result<TransferLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO transfer_logs \
                (previous_enrollment_id, new_enrollment_id, student_id, from_class_id, \
                 to_class_id, reason, preserve_progress, transferred_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TransferLog>(&query)
            .bind(input.previous_enrollment_id)
            .bind(input.new_enrollment_id)
            .bind(input.student_id)
            .bind(input.from_class_id)
            .bind(input.to_class_id)
            .bind(&input.reason)
            .bind(input.preserve_progress)
            .bind(input.transferred_by)
            .fetch_one(pool)
            .await
    }

    /// All transfers for a student, most recent first.
    pub async fn list_by_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<TransferLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transfer_logs WHERE student_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, TransferLog>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }
}
