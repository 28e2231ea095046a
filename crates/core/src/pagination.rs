//! Limit/offset clamping shared by list endpoints.

/// Default page size when the client omits `limit`.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Upper bound on page size.
pub const MAX_PAGE_LIMIT: i64 = 200;

/// Clamp a user-provided limit into `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
