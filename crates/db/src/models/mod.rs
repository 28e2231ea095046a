//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts, validated with `validator`

pub mod class;
pub mod enrollment;
pub mod status;
pub mod student;
pub mod transfer_log;
