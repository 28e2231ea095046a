//! Well-known role name constants carried in access-token claims.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_PARENT: &str = "parent";

/// Roles allowed to change enrollments (enroll, withdraw, transfer).
pub const STAFF_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_TEACHER];

/// Whether `role` may modify enrollments.
pub fn is_staff(role: &str) -> bool {
    STAFF_ROLES.contains(&role)
}
