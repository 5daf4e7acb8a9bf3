//! Klaviyo API client for launch sign-ups.
//!
//! Subscribes an email to the configured list through a bulk subscription
//! job. Only used when both `KLAVIYO_API_KEY` and `KLAVIYO_LIST_ID` are set.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Klaviyo API version.
const API_REVISION: &str = "2024-10-15";

/// Klaviyo API base URL.
const BASE_URL: &str = "https://a.klaviyo.com/api";

/// Source recorded on profiles created by the landing page.
const CUSTOM_SOURCE: &str = "Bien Miches Launch Page";

/// Errors that can occur when interacting with Klaviyo API.
#[derive(Debug, Error)]
pub enum KlaviyoError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Klaviyo API client.
#[derive(Clone)]
pub struct KlaviyoClient {
    client: reqwest::Client,
    base_url: String,
    list_id: String,
}

impl KlaviyoClient {
    /// Create a new Klaviyo API client.
    ///
    /// # Errors
    ///
    /// Returns `Api` if the key is not a valid header value, or `Http` if the
    /// HTTP client fails to build.
    pub fn new(api_key: &SecretString, list_id: &str) -> Result<Self, KlaviyoError> {
        Self::with_base_url(api_key, list_id, BASE_URL)
    }

    /// Create a client against a different API root.
    ///
    /// # Errors
    ///
    /// Same as [`KlaviyoClient::new`].
    pub fn with_base_url(
        api_key: &SecretString,
        list_id: &str,
        base_url: &str,
    ) -> Result<Self, KlaviyoError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Klaviyo-API-Key {}", api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value).map_err(|e| KlaviyoError::Api {
                status: 0,
                message: format!("Invalid API key format: {e}"),
            })?,
        );

        // Revision header for API versioning
        headers.insert("revision", HeaderValue::from_static(API_REVISION));

        // Content-Type for JSON:API
        headers.insert(
            "Content-Type",
            HeaderValue::from_static("application/vnd.api+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            list_id: list_id.to_string(),
        })
    }

    /// Subscribe an email to the launch list.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[tracing::instrument(skip(self, email))]
    pub async fn subscribe_email(&self, email: &str) -> Result<(), KlaviyoError> {
        let url = format!("{}/profile-subscription-bulk-create-jobs", self.base_url);

        let body = subscription_body(email, &self.list_id);

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        // 202 Accepted is the expected response for bulk jobs
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Klaviyo subscription rejected");
            return Err(KlaviyoError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

fn subscription_body(email: &str, list_id: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "type": "profile-subscription-bulk-create-job",
            "attributes": {
                "custom_source": CUSTOM_SOURCE,
                "profiles": {
                    "data": [{
                        "type": "profile",
                        "attributes": {
                            "email": email,
                            "subscriptions": {
                                "email": {
                                    "marketing": {
                                        "consent": "SUBSCRIBED"
                                    }
                                }
                            }
                        }
                    }]
                }
            },
            "relationships": {
                "list": {
                    "data": {
                        "type": "list",
                        "id": list_id
                    }
                }
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_body_targets_list() {
        let body = subscription_body("fan@example.com", "XyZ123");
        assert_eq!(body["data"]["relationships"]["list"]["data"]["id"], "XyZ123");
        assert_eq!(
            body["data"]["attributes"]["profiles"]["data"][0]["attributes"]["email"],
            "fan@example.com"
        );
        assert_eq!(
            body["data"]["attributes"]["profiles"]["data"][0]["attributes"]["subscriptions"]
                ["email"]["marketing"]["consent"],
            "SUBSCRIBED"
        );
    }

    #[test]
    fn test_new_rejects_invalid_header_key() {
        let key = SecretString::from("bad\nkey");
        assert!(matches!(
            KlaviyoClient::new(&key, "list"),
            Err(KlaviyoError::Api { .. })
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let key = SecretString::from("pk_live_abc");
        let client = KlaviyoClient::with_base_url(&key, "list", "http://127.0.0.1:9/api/").unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9/api");
    }
}
