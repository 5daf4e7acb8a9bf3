//! Bien Miches Core - Shared types library.
//!
//! This crate provides common types used across the Bien Miches workspace:
//! - `storefront` - Public-facing michelada shop and launch landing page
//! - `cli` - Command-line tools for migrations and credential checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Shopify global IDs, money, emails, and the launch countdown

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
