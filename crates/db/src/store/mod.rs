//! The storage abstraction handlers are written against.
//!
//! [`SchoolStore`] hides whether records live in PostgreSQL ([`PgStore`]) or
//! in process memory ([`MemoryStore`]). Operations that touch more than one
//! record (enroll, withdraw, transfer) are atomic in both backends.

mod memory;
mod pg;

use async_trait::async_trait;
use campus_core::types::DbId;

use crate::models::class::{Class, CreateClass};
use crate::models::enrollment::{CreateEnrollment, Enrollment, EnrollmentDetail, NewTransfer};
use crate::models::student::{CreateStudent, Student};
use crate::models::transfer_log::{CreateTransferLog, TransferLog};

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Errors raised by any [`SchoolStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// A uniqueness rule would be broken by the write.
    #[error("{0}")]
    Conflict(String),

    #[error("Class {class_id} is at capacity")]
    CapacityExceeded { class_id: DbId },

    /// The backend refused the operation for a reason other than the data.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Name of the violated `uq_*` constraint if `err` is a PostgreSQL unique violation.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        // PostgreSQL unique constraint violation: error code 23505
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            db_err.constraint().filter(|c| c.starts_with("uq_"))
        }
        _ => None,
    }
}

/// Persistence operations for students, classes, enrollments and transfer logs.
#[async_trait]
pub trait SchoolStore: Send + Sync {
    // -- Students --

    async fn create_student(&self, input: &CreateStudent) -> StoreResult<Student>;
    async fn find_student(&self, id: DbId) -> StoreResult<Option<Student>>;

    // -- Classes --

    async fn create_class(&self, input: &CreateClass) -> StoreResult<Class>;
    async fn find_class(&self, id: DbId) -> StoreResult<Option<Class>>;
    async fn list_classes(&self, limit: i64, offset: i64) -> StoreResult<Vec<Class>>;

    // -- Enrollments --

    /// Enroll a student, taking one seat in the class.
    ///
    /// Fails with `NotFound` for an unknown student or class, `Conflict` when
    /// the student already holds a seat, `CapacityExceeded` when the class is full.
    async fn enroll(&self, input: &CreateEnrollment) -> StoreResult<Enrollment>;
    async fn find_enrollment(&self, id: DbId) -> StoreResult<Option<Enrollment>>;
    async fn find_enrollment_for_student_in_class(
        &self,
        student_id: DbId,
        class_id: DbId,
    ) -> StoreResult<Option<Enrollment>>;
    async fn list_enrollments_for_class(&self, class_id: DbId) -> StoreResult<Vec<Enrollment>>;
    async fn find_enrollment_detail(&self, id: DbId) -> StoreResult<Option<EnrollmentDetail>>;

    /// Delete an enrollment and free its seat. Returns `false` if it did not exist.
    async fn withdraw_enrollment(&self, id: DbId) -> StoreResult<bool>;

    /// Move an enrollment to another class as one atomic unit: insert the new
    /// row, delete the old one, free the source seat (floored at zero) and
    /// take a target seat.
    async fn apply_transfer(&self, transfer: &NewTransfer) -> StoreResult<Enrollment>;

    // -- Transfer logs --

    async fn create_transfer_log(&self, input: &CreateTransferLog) -> StoreResult<TransferLog>;
    async fn list_transfer_logs_for_student(&self, student_id: DbId)
        -> StoreResult<Vec<TransferLog>>;

    async fn health_check(&self) -> StoreResult<()>;
}
