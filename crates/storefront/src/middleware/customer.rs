//! Session-backed customer state and page context extractors.
//!
//! The session holds the Shopify customer access token, the cart id and the
//! last known cart quantity. Tokens are stored and forwarded, never
//! inspected beyond their expiry.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use bien_miches_core::CartId;

use crate::error::AppError;
use crate::middleware::CspNonce;
use crate::models::{CustomerAccessToken, session_keys};
use crate::shopify::Cart;
use crate::state::AppState;

/// Where signed-out customers are sent.
pub const LOGIN_PATH: &str = "/account/login";

/// Customer state read from the session.
#[derive(Clone)]
pub struct CustomerSession {
    pub session: Session,
    token: Option<CustomerAccessToken>,
    cart_id: Option<CartId>,
    cart_count: i64,
}

impl CustomerSession {
    /// Load customer state from `session`.
    ///
    /// An expired token is treated as absent. Unreadable values are treated
    /// as missing.
    pub async fn load(session: Session) -> Self {
        let token = session
            .get::<CustomerAccessToken>(session_keys::CUSTOMER_ACCESS_TOKEN)
            .await
            .ok()
            .flatten()
            .filter(|token| !token.is_expired_at(Utc::now()));
        let cart_id = session
            .get::<CartId>(session_keys::CART_ID)
            .await
            .ok()
            .flatten();
        let cart_count = session
            .get::<i64>(session_keys::CART_COUNT)
            .await
            .ok()
            .flatten()
            .unwrap_or(0);

        Self {
            session,
            token,
            cart_id,
            cart_count,
        }
    }

    /// The customer access token, if signed in.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.access_token.as_str())
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub const fn cart_id(&self) -> Option<&CartId> {
        self.cart_id.as_ref()
    }

    /// Total quantity of the cart as of the last mutation.
    #[must_use]
    pub const fn cart_count(&self) -> i64 {
        self.cart_count
    }
}

impl<S> FromRequestParts<S> for CustomerSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer not installed".to_string()))?;
        Ok(Self::load(session).await)
    }
}

/// Extractor that requires a signed-in customer.
///
/// Signed-out requests have any stale token cleared and are redirected to
/// the login page.
pub struct RequireCustomer {
    pub customer: CustomerSession,
    pub access_token: String,
}

/// Redirect to the login page.
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let customer = CustomerSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let Some(access_token) = customer.access_token().map(str::to_string) else {
            if let Err(e) = clear_customer_token(&customer.session).await {
                tracing::warn!(error = %e, "Failed to clear customer token");
            }
            return Err(LoginRedirect.into_response());
        };

        Ok(Self {
            customer,
            access_token,
        })
    }
}

/// Store a customer access token in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_customer_token(
    session: &Session,
    token: &CustomerAccessToken,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CUSTOMER_ACCESS_TOKEN, token)
        .await
}

/// Remove the customer access token from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_customer_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CustomerAccessToken>(session_keys::CUSTOMER_ACCESS_TOKEN)
        .await?;
    Ok(())
}

/// Remember the cart id and its total quantity.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART_ID, &cart.id).await?;
    session
        .insert(session_keys::CART_COUNT, cart.total_quantity)
        .await
}

/// Forget the cart badge count.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_cart_count(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<i64>(session_keys::CART_COUNT).await?;
    Ok(())
}

/// Forget the cart entirely, so the next add starts a new one.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_cart(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CartId>(session_keys::CART_ID).await?;
    clear_cart_count(session).await
}

/// Request path before any `nest` stripped its prefix.
fn original_path(parts: &Parts) -> &str {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |uri| uri.path())
}

/// Data every page template needs for the layout.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub nonce: String,
    pub logged_in: bool,
    pub cart_count: i64,
    /// Login and activation pages show the header without navigation.
    pub plain_header: bool,
    pub klaviyo_company_id: Option<String>,
}

impl PageContext {
    /// Whether `path` gets the plain header.
    #[must_use]
    pub fn is_plain_header_path(path: &str) -> bool {
        path.starts_with("/account/login") || path.starts_with("/account/activate")
    }

    /// Replace the cart count after a mutation in the same request.
    #[must_use]
    pub const fn with_cart_count(mut self, cart_count: i64) -> Self {
        self.cart_count = cart_count;
        self
    }

    /// Mark the customer as signed out after logout or a stale token.
    #[must_use]
    pub const fn signed_out(mut self) -> Self {
        self.logged_in = false;
        self
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CspNonce(nonce) = CspNonce::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        let customer = CustomerSession::from_request_parts(parts, state).await?;

        Ok(Self {
            nonce,
            logged_in: customer.is_logged_in(),
            cart_count: customer.cart_count(),
            plain_header: Self::is_plain_header_path(original_path(parts)),
            klaviyo_company_id: state.config().klaviyo.company_id.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[test]
    fn test_plain_header_paths() {
        assert!(PageContext::is_plain_header_path("/account/login"));
        assert!(PageContext::is_plain_header_path("/account/activate/1/abc"));
        assert!(!PageContext::is_plain_header_path("/account/orders"));
        assert!(!PageContext::is_plain_header_path("/"));
    }

    #[tokio::test]
    async fn test_expired_token_is_logged_out() {
        let session = session();
        let token = CustomerAccessToken {
            access_token: "expired".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
        };
        set_customer_token(&session, &token).await.unwrap();

        let customer = CustomerSession::load(session).await;
        assert!(!customer.is_logged_in());
        assert_eq!(customer.access_token(), None);
    }

    #[tokio::test]
    async fn test_token_and_cart_round_trip_through_session() {
        let session = session();
        let token = CustomerAccessToken {
            access_token: "live-token".to_string(),
            expires_at: Utc::now() + Duration::days(30),
        };
        set_customer_token(&session, &token).await.unwrap();
        session
            .insert(session_keys::CART_ID, CartId::new("gid://shopify/Cart/c1?key=k"))
            .await
            .unwrap();
        session.insert(session_keys::CART_COUNT, 3_i64).await.unwrap();

        let customer = CustomerSession::load(session.clone()).await;
        assert!(customer.is_logged_in());
        assert_eq!(customer.access_token(), Some("live-token"));
        assert_eq!(
            customer.cart_id().map(CartId::as_str),
            Some("gid://shopify/Cart/c1?key=k")
        );
        assert_eq!(customer.cart_count(), 3);

        clear_customer_token(&session).await.unwrap();
        clear_cart_count(&session).await.unwrap();
        let customer = CustomerSession::load(session).await;
        assert!(!customer.is_logged_in());
        assert_eq!(customer.cart_count(), 0);
        assert!(customer.cart_id().is_some());
    }

    #[tokio::test]
    async fn test_clear_cart_forgets_id_and_count() {
        let session = session();
        session
            .insert(session_keys::CART_ID, CartId::new("gid://shopify/Cart/gone"))
            .await
            .unwrap();
        session.insert(session_keys::CART_COUNT, 2_i64).await.unwrap();

        clear_cart(&session).await.unwrap();

        let customer = CustomerSession::load(session).await;
        assert!(customer.cart_id().is_none());
        assert_eq!(customer.cart_count(), 0);
    }
}
