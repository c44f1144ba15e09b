//! Authentication system
//!
//! Validates HTTP basic-auth credentials against the runtime account table.

pub mod validator;

pub use validator::{AuthUser, validate_credentials};
