//! Type-safe wrappers for domain primitives.

pub mod email;
pub mod id;

pub use email::{Email, EmailError};
pub use id::*;
