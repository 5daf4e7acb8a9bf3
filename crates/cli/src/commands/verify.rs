//! Shopify credential check.
//!
//! # Usage
//!
//! ```bash
//! bm-cli verify
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE`, `SHOPIFY_STOREFRONT_PUBLIC_TOKEN`,
//!   `SHOPIFY_STOREFRONT_PRIVATE_TOKEN` and the optional
//!   `SHOPIFY_API_VERSION` / `SHOPIFY_STOREFRONT_ENDPOINT`

use bien_miches_storefront::config::{ConfigError, ShopifyStorefrontConfig};
use bien_miches_storefront::shopify::{ShopifyError, StorefrontClient};
use thiserror::Error;

/// Errors that can occur while verifying credentials.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Shopify settings are missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The Storefront API rejected the request.
    #[error("Storefront API error: {0}")]
    Shopify(#[from] ShopifyError),
}

/// Fetch the shop through the Storefront API and log what it returns.
///
/// # Errors
///
/// Returns an error if the Shopify settings are incomplete or the request
/// fails.
pub async fn shopify() -> Result<(), VerifyError> {
    let config = ShopifyStorefrontConfig::from_env()?;
    tracing::info!(endpoint = %config.graphql_endpoint(), "Querying Storefront API...");

    let client = StorefrontClient::new(&config);
    let shop = client.get_shop().await?;

    tracing::info!(
        name = %shop.name,
        domain = %shop.primary_domain_url,
        "Storefront API credentials verified"
    );
    Ok(())
}
