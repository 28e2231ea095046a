//! Repository for the `enrollments` table.

use campus_core::enrollment::ProgressStep;
use campus_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use super::PgTx;
use crate::models::enrollment::{Enrollment, EnrollmentDetail};
use crate::models::status::{StatusId, StatusInfo};
use crate::repositories::StudentRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, student_id, class_id, status_id, enrolled_at, steps, created_at, updated_at";

/// Values for a single enrollment insert.
pub struct EnrollmentInsert<'a> {
    pub student_id: DbId,
    pub class_id: DbId,
    pub status_id: StatusId,
    pub steps: &'a [ProgressStep],
    pub enrolled_at: Timestamp,
}

/// Provides lookup and transactional write operations for enrollments.
///
/// Writes only exist in transaction-scoped form: every insert or delete
/// must also move a class seat counter in the same transaction.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Find an enrollment by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the enrollment a student holds in a class, if any.
    pub async fn find_for_student_in_class(
        pool: &PgPool,
        student_id: DbId,
        class_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM enrollments WHERE student_id = $1 AND class_id = $2");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(class_id)
            .fetch_optional(pool)
            .await
    }

    /// List a class's enrollments, oldest first.
    pub async fn list_by_class(
        pool: &PgPool,
        class_id: DbId,
    ) -> Result<Vec<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments WHERE class_id = $1 ORDER BY enrolled_at, id"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(class_id)
            .fetch_all(pool)
            .await
    }

    /// Find an enrollment with its student and status rows expanded.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EnrollmentDetail>, sqlx::Error> {
        let Some(enrollment) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let student = StudentRepo::find_by_id(pool, enrollment.student_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let status = sqlx::query_as::<_, StatusInfo>(
            "SELECT id, name, label FROM enrollment_statuses WHERE id = $1",
        )
        .bind(enrollment.status_id)
        .fetch_one(pool)
        .await?;

        Ok(Some(EnrollmentDetail {
            enrollment,
            student,
            status,
        }))
    }

    /// Lock an enrollment row for the rest of the transaction.
    pub async fn lock_by_id(tx: &mut PgTx<'_>, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert an enrollment inside an open transaction.
    ///
    /// Fails with a unique violation on `uq_enrollments_student_class` when
    /// the student already holds a seat in the class.
    pub async fn insert(
        tx: &mut PgTx<'_>,
        input: &EnrollmentInsert<'_>,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (student_id, class_id, status_id, steps, enrolled_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(input.student_id)
            .bind(input.class_id)
            .bind(input.status_id)
            .bind(Json(input.steps))
            .bind(input.enrolled_at)
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete an enrollment inside an open transaction. Returns `true` if a row was removed.
    pub async fn delete(tx: &mut PgTx<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
