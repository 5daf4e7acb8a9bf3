//! Session-related types.
//!
//! The session is the only local state: the customer's access token, the
//! cart id and the last known cart quantity for the header badge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customer access token issued by `customerAccessTokenCreate`.
///
/// The token is opaque; it is stored and forwarded, never inspected.
/// Implements `Debug` manually to redact the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAccessToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CustomerAccessToken {
    /// Whether the token's expiry has passed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl std::fmt::Debug for CustomerAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerAccessToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for the customer's [`CustomerAccessToken`](super::CustomerAccessToken).
    pub const CUSTOMER_ACCESS_TOKEN: &str = "customer_access_token";

    /// Key for storing the Shopify cart ID.
    pub const CART_ID: &str = "cart_id";

    /// Key for the cart's total quantity shown in the header.
    pub const CART_COUNT: &str = "cart_count";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let token = CustomerAccessToken {
            access_token: "shpat_secret_value".to_string(),
            expires_at: Utc::now(),
        };
        let debug = format!("{token:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("shpat_secret_value"));
    }

    #[test]
    fn test_is_expired_at() {
        let now = Utc::now();
        let token = CustomerAccessToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::days(1),
        };
        assert!(!token.is_expired_at(now));
        assert!(token.is_expired_at(now + Duration::days(2)));
    }

    #[test]
    fn test_serde_roundtrip_keeps_expiry() {
        let json = r#"{"access_token":"abc","expires_at":"2030-01-01T00:00:00Z"}"#;
        let token: CustomerAccessToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.expires_at.to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }
}
