//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or an open transaction) as the first argument.

pub mod class_repo;
pub mod enrollment_repo;
pub mod student_repo;
pub mod transfer_log_repo;

pub use class_repo::ClassRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use student_repo::StudentRepo;
pub use transfer_log_repo::TransferLogRepo;

/// Open transaction handle used by the multi-statement workflows.
pub type PgTx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
