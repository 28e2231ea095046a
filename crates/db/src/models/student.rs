//! Student entity model and DTOs.

use campus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A student row from the `students` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub grade_level: Option<i16>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new student.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(length(min = 1, max = 100, message = "first_name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last_name must be 1-100 characters"))]
    pub last_name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(range(min = 0, max = 13, message = "grade_level must be between 0 and 13"))]
    pub grade_level: Option<i16>,
}
