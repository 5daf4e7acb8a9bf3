//! Core types for Bien Miches.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod countdown;
pub mod email;
pub mod gid;
pub mod money;

pub use countdown::TimeLeft;
pub use email::{Email, EmailError};
pub use gid::*;
pub use money::{CurrencyCode, Money, MoneyError};
