//! Business logic services for storefront.
//!
//! # Services
//!
//! - `calendar` - iCalendar export for the launch event
//! - `customer_forms` - Login, profile and address form validation
//! - `klaviyo` - Launch sign-up list subscriptions
//! - `product_options` - Variant selection from query parameters

pub mod calendar;
pub mod customer_forms;
pub mod klaviyo;
pub mod product_options;

pub use klaviyo::{KlaviyoClient, KlaviyoError};
