//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{KlaviyoClient, KlaviyoError};
use crate::shopify::StorefrontClient;

/// Application state shared across all handlers.
///
/// Cheap to clone. Holds no database handle: sessions are reached through
/// the session layer and the readiness check gets the pool separately.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    klaviyo: Option<KlaviyoClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The Klaviyo client is built only when both the API key and list id
    /// are configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the Klaviyo client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, KlaviyoError> {
        let storefront = StorefrontClient::new(&config.shopify);
        let klaviyo = config
            .klaviyo
            .subscription()
            .map(|(api_key, list_id)| KlaviyoClient::new(api_key, list_id))
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                klaviyo,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// The Klaviyo client, when list subscriptions are configured.
    #[must_use]
    pub fn klaviyo(&self) -> Option<&KlaviyoClient> {
        self.inner.klaviyo.as_ref()
    }
}
