//! Shared response envelope types for API handlers.
//!
//! Collection responses use a `{ "data": [...] }` envelope. Single records
//! are returned bare, and the transfer endpoint returns its own
//! `{ enrollment, transfer }` shape.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
