//! HTTP handlers, one module per resource.

pub mod class;
pub mod enrollment;
pub mod student;
