//! Session-stored models.

pub mod session;

pub use session::{CustomerAccessToken, keys as session_keys};
