//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token generation and validation.
//!
//! Tokens are issued by the school's identity provider; this service only
//! verifies them and uses the subject as the acting user.

pub mod jwt;
