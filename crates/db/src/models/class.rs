//! Class entity model and DTOs.

use campus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A class row from the `classes` table.
///
/// `current_enrollment` is a denormalized seat counter maintained by the
/// enroll, withdraw and transfer operations.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Class {
    pub id: DbId,
    pub name: String,
    pub code: Option<String>,
    pub capacity: i32,
    pub current_enrollment: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Class {
    /// Seats still available. Zero when the class is full or over-full.
    pub fn seats_available(&self) -> i32 {
        (self.capacity - self.current_enrollment).max(0)
    }
}

/// DTO for creating a new class. The counter always starts at zero.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClass {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "code must be 1-50 characters"))]
    pub code: Option<String>,
    #[validate(range(min = 0, message = "capacity must not be negative"))]
    pub capacity: i32,
}
