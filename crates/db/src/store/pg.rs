//! PostgreSQL-backed [`SchoolStore`].

use async_trait::async_trait;
use campus_core::enrollment::duplicate_enrollment_message;
use campus_core::types::DbId;

use super::{unique_violation, SchoolStore, StoreError, StoreResult};
use crate::models::class::{Class, CreateClass};
use crate::models::enrollment::{CreateEnrollment, Enrollment, EnrollmentDetail, NewTransfer};
use crate::models::status::EnrollmentStatus;
use crate::models::student::{CreateStudent, Student};
use crate::models::transfer_log::{CreateTransferLog, TransferLog};
use crate::repositories::enrollment_repo::EnrollmentInsert;
use crate::repositories::{ClassRepo, EnrollmentRepo, StudentRepo, TransferLogRepo};
use crate::DbPool;

/// Store that delegates to the repository structs over a connection pool.
///
/// Multi-record writes run in one transaction with the touched enrollment
/// and class rows locked, so capacity and uniqueness hold under concurrent
/// requests.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map an insert failure on `enrollments` to a domain conflict where possible.
fn map_enrollment_insert(err: sqlx::Error, student_id: DbId, class_id: DbId) -> StoreError {
    match unique_violation(&err) {
        Some("uq_enrollments_student_class") => {
            StoreError::Conflict(duplicate_enrollment_message(student_id, class_id))
        }
        Some(constraint) => {
            StoreError::Conflict(format!("Duplicate value violates unique constraint: {constraint}"))
        }
        None => StoreError::Database(err),
    }
}

/// Map a generic write failure, surfacing `uq_*` violations as conflicts.
fn map_write(err: sqlx::Error) -> StoreError {
    match unique_violation(&err) {
        Some(constraint) => {
            StoreError::Conflict(format!("Duplicate value violates unique constraint: {constraint}"))
        }
        None => StoreError::Database(err),
    }
}

#[async_trait]
impl SchoolStore for PgStore {
    async fn create_student(&self, input: &CreateStudent) -> StoreResult<Student> {
        StudentRepo::create(&self.pool, input).await.map_err(map_write)
    }

    async fn find_student(&self, id: DbId) -> StoreResult<Option<Student>> {
        Ok(StudentRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_class(&self, input: &CreateClass) -> StoreResult<Class> {
        ClassRepo::create(&self.pool, input).await.map_err(map_write)
    }

    async fn find_class(&self, id: DbId) -> StoreResult<Option<Class>> {
        Ok(ClassRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_classes(&self, limit: i64, offset: i64) -> StoreResult<Vec<Class>> {
        Ok(ClassRepo::list(&self.pool, limit, offset).await?)
    }

    async fn enroll(&self, input: &CreateEnrollment) -> StoreResult<Enrollment> {
        if StudentRepo::find_by_id(&self.pool, input.student_id)
            .await?
            .is_none()
        {
            return Err(StoreError::NotFound {
                entity: "Student",
                id: input.student_id,
            });
        }

        let mut tx = self.pool.begin().await?;

        let class = ClassRepo::lock_many(&mut tx, &[input.class_id])
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound {
                entity: "Class",
                id: input.class_id,
            })?;

        if class.current_enrollment >= class.capacity {
            return Err(StoreError::CapacityExceeded { class_id: class.id });
        }

        let insert = EnrollmentInsert {
            student_id: input.student_id,
            class_id: class.id,
            status_id: input.status_id.unwrap_or(EnrollmentStatus::Active.id()),
            steps: &input.steps,
            enrolled_at: chrono::Utc::now(),
        };
        let enrollment = EnrollmentRepo::insert(&mut tx, &insert)
            .await
            .map_err(|e| map_enrollment_insert(e, input.student_id, class.id))?;

        ClassRepo::adjust_enrollment(&mut tx, class.id, 1).await?;

        tx.commit().await?;
        Ok(enrollment)
    }

    async fn find_enrollment(&self, id: DbId) -> StoreResult<Option<Enrollment>> {
        Ok(EnrollmentRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_enrollment_for_student_in_class(
        &self,
        student_id: DbId,
        class_id: DbId,
    ) -> StoreResult<Option<Enrollment>> {
        Ok(EnrollmentRepo::find_for_student_in_class(&self.pool, student_id, class_id).await?)
    }

    async fn list_enrollments_for_class(&self, class_id: DbId) -> StoreResult<Vec<Enrollment>> {
        Ok(EnrollmentRepo::list_by_class(&self.pool, class_id).await?)
    }

    async fn find_enrollment_detail(&self, id: DbId) -> StoreResult<Option<EnrollmentDetail>> {
        Ok(EnrollmentRepo::find_detail(&self.pool, id).await?)
    }

    async fn withdraw_enrollment(&self, id: DbId) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let Some(enrollment) = EnrollmentRepo::lock_by_id(&mut tx, id).await? else {
            return Ok(false);
        };

        // Lock the class before touching its counter, same order as transfers.
        ClassRepo::lock_many(&mut tx, &[enrollment.class_id]).await?;
        EnrollmentRepo::delete(&mut tx, enrollment.id).await?;
        ClassRepo::adjust_enrollment(&mut tx, enrollment.class_id, -1).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn apply_transfer(&self, transfer: &NewTransfer) -> StoreResult<Enrollment> {
        let mut tx = self.pool.begin().await?;

        let source = EnrollmentRepo::lock_by_id(&mut tx, transfer.source_enrollment_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "Enrollment",
                id: transfer.source_enrollment_id,
            })?;

        if source.class_id != transfer.from_class_id || source.student_id != transfer.student_id {
            return Err(StoreError::Conflict(format!(
                "Enrollment {} changed while the transfer was in progress",
                source.id
            )));
        }

        let classes =
            ClassRepo::lock_many(&mut tx, &[transfer.from_class_id, transfer.to_class_id]).await?;
        let target = classes
            .iter()
            .find(|c| c.id == transfer.to_class_id)
            .ok_or(StoreError::NotFound {
                entity: "Class",
                id: transfer.to_class_id,
            })?;

        if target.current_enrollment >= target.capacity {
            return Err(StoreError::CapacityExceeded {
                class_id: target.id,
            });
        }

        let insert = EnrollmentInsert {
            student_id: source.student_id,
            class_id: target.id,
            status_id: transfer.status_id,
            steps: &transfer.steps,
            enrolled_at: transfer.enrolled_at,
        };
        let created = EnrollmentRepo::insert(&mut tx, &insert)
            .await
            .map_err(|e| map_enrollment_insert(e, source.student_id, target.id))?;

        EnrollmentRepo::delete(&mut tx, source.id).await?;
        ClassRepo::adjust_enrollment(&mut tx, source.class_id, -1).await?;
        ClassRepo::adjust_enrollment(&mut tx, target.id, 1).await?;

        tx.commit().await?;

        tracing::debug!(
            previous_enrollment_id = source.id,
            new_enrollment_id = created.id,
            from_class_id = source.class_id,
            to_class_id = target.id,
            "Transfer committed",
        );
        Ok(created)
    }

    async fn create_transfer_log(&self, input: &CreateTransferLog) -> StoreResult<TransferLog> {
        Ok(TransferLogRepo::create(&self.pool, input).await?)
    }

    async fn list_transfer_logs_for_student(
        &self,
        student_id: DbId,
    ) -> StoreResult<Vec<TransferLog>> {
        Ok(TransferLogRepo::list_by_student(&self.pool, student_id).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
