//! Domain types and rules for the campus enrollment service.
//!
//! Everything here is pure logic with no I/O so it can be shared by the
//! persistence layer and the HTTP layer.

pub mod enrollment;
pub mod error;
pub mod pagination;
pub mod roles;
pub mod types;
