use crate::error::CoreError;

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Resolve an id that arrived as text, from a URL segment or a JSON string.
///
/// Clients treat ids as opaque strings. Text that is not a positive integer
/// cannot name a stored row, so it resolves to `NotFound` for `entity`.
pub fn parse_id(entity: &'static str, raw: &str) -> Result<DbId, CoreError> {
    raw.trim()
        .parse::<DbId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CoreError::not_found(entity, raw))
}
