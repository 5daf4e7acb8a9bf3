//! Authentication route handlers.
//!
//! Sign-in, registration, recovery, reset and activation all pass the
//! customer's credentials straight to the Shopify Storefront API. The
//! session only keeps the resulting customer access token.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::found;
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    CustomerSession, PageContext, clear_cart_count, clear_customer_token, set_customer_token,
};
use crate::models::CustomerAccessToken;
use crate::services::customer_forms::{LoginAction, LoginForm, PasswordForm};
use crate::shopify::{CustomerCreateInput, ShopifyError};
use crate::state::AppState;

const ACCOUNT_PATH: &str = "/account";

const RECOVER_MESSAGE: &str = "If that email address is in our system, you will receive an email with instructions about how to reset your password in a few minutes.";

/// Message for a failed Shopify call made on behalf of a form.
///
/// User errors are shown verbatim; transport failures get a generic retry
/// prompt and are logged.
pub(crate) fn form_error(error: &ShopifyError) -> String {
    if let ShopifyError::UserError(message) = error {
        return message.clone();
    }
    tracing::error!(error = %error, "Storefront API request failed");
    "Something went wrong. Please try again.".to_string()
}

// =============================================================================
// Form Types
// =============================================================================

/// Recovery form data.
#[derive(Debug, Deserialize)]
pub struct RecoverForm {
    pub email: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in and register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub email: String,
}

/// Password recovery page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/recover.html")]
pub struct RecoverTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub message: Option<&'static str>,
}

/// Which emailed link a password form completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordFlow {
    Reset,
    Activate,
}

impl PasswordFlow {
    const fn segment(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Activate => "activate",
        }
    }

    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Reset => "Reset Password",
            Self::Activate => "Activate Account",
        }
    }

    #[must_use]
    pub const fn submit_label(self) -> &'static str {
        match self {
            Self::Reset => "Reset",
            Self::Activate => "Save",
        }
    }
}

/// New password page template (reset and activation).
#[derive(Template, WebTemplate)]
#[template(path = "auth/password.html")]
pub struct PasswordTemplate {
    pub ctx: PageContext,
    pub flow: PasswordFlow,
    pub action: String,
    pub error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the sign-in and register forms.
#[instrument(skip(ctx, customer))]
pub async fn login_page(ctx: PageContext, customer: CustomerSession) -> Response {
    if customer.is_logged_in() {
        return Redirect::to(ACCOUNT_PATH).into_response();
    }

    LoginTemplate {
        ctx,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Sign in or register, dispatched on `_action`.
#[instrument(skip(state, ctx, customer, form), fields(action = ?form.action))]
pub async fn login(
    State(state): State<AppState>,
    ctx: PageContext,
    customer: CustomerSession,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.clone().unwrap_or_default();
    let rejected = |error: String| {
        (
            StatusCode::BAD_REQUEST,
            LoginTemplate {
                ctx: ctx.clone(),
                error: Some(error),
                email: email.clone(),
            },
        )
            .into_response()
    };

    let action = match form.validate() {
        Ok(action) => action,
        Err(error) => return Ok(rejected(error)),
    };
    let storefront = state.storefront();

    match action {
        LoginAction::SignIn { email, password } => {
            let token = match storefront.create_access_token(&email, &password).await {
                Ok(token) => token,
                Err(e) => return Ok(rejected(form_error(&e))),
            };
            sign_in(&customer, &token, &email).await?;
            Ok(Redirect::to(ACCOUNT_PATH).into_response())
        }
        LoginAction::Register { email, password } => {
            let input = CustomerCreateInput {
                email: email.clone(),
                password: password.clone(),
                first_name: None,
                last_name: None,
                accepts_marketing: None,
            };
            if let Err(e) = storefront.create_customer(input).await {
                return Ok(rejected(form_error(&e)));
            }
            add_breadcrumb("auth", "Customer registered", None);

            let token = match storefront.create_access_token(&email, &password).await {
                Ok(token) => token,
                Err(e) => return Ok(rejected(form_error(&e))),
            };
            sign_in(&customer, &token, &email).await?;
            Ok(found(ACCOUNT_PATH))
        }
    }
}

async fn sign_in(
    customer: &CustomerSession,
    token: &CustomerAccessToken,
    email: &str,
) -> Result<()> {
    set_customer_token(&customer.session, token).await?;
    customer.session.cycle_id().await?;
    set_sentry_user(email);
    add_breadcrumb("auth", "Customer signed in", None);
    tracing::info!("Customer signed in");
    Ok(())
}

/// Sign out.
///
/// The Shopify token is revoked on a best-effort basis; the session is
/// cleared regardless.
#[instrument(skip(state, customer))]
pub async fn logout(State(state): State<AppState>, customer: CustomerSession) -> Result<Response> {
    if let Some(token) = customer.access_token()
        && let Err(e) = state.storefront().delete_access_token(token).await
    {
        tracing::warn!(error = %e, "Failed to revoke customer access token");
    }

    clear_customer_token(&customer.session).await?;
    clear_cart_count(&customer.session).await?;
    clear_sentry_user();
    add_breadcrumb("auth", "Customer signed out", None);

    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Recovery Routes
// =============================================================================

/// Display the password recovery form.
#[instrument(skip(ctx, customer))]
pub async fn recover_page(ctx: PageContext, customer: CustomerSession) -> Response {
    if customer.is_logged_in() {
        return Redirect::to(ACCOUNT_PATH).into_response();
    }

    RecoverTemplate {
        ctx,
        error: None,
        message: None,
    }
    .into_response()
}

/// Request a password reset email.
///
/// The response never reveals whether the email belongs to a customer.
#[instrument(skip(state, ctx, form))]
pub async fn recover(
    State(state): State<AppState>,
    ctx: PageContext,
    Form(form): Form<RecoverForm>,
) -> Response {
    let Some(email) = form.email.filter(|e| !e.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            RecoverTemplate {
                ctx,
                error: Some("Please provide an email.".to_string()),
                message: None,
            },
        )
            .into_response();
    };

    if let Err(e) = state.storefront().recover_customer(email.trim()).await {
        tracing::info!(error = %e, "Customer recovery request failed");
    }

    RecoverTemplate {
        ctx,
        error: None,
        message: Some(RECOVER_MESSAGE),
    }
    .into_response()
}

// =============================================================================
// Reset and Activation Routes
// =============================================================================

fn password_page(
    ctx: PageContext,
    flow: PasswordFlow,
    id: &str,
    token: &str,
    error: Option<String>,
) -> PasswordTemplate {
    PasswordTemplate {
        ctx,
        flow,
        action: format!("/account/{}/{id}/{token}", flow.segment()),
        error,
    }
}

/// Display the new password form from a reset email.
#[instrument(skip(ctx, token))]
pub async fn reset_page(
    ctx: PageContext,
    Path((id, token)): Path<(String, String)>,
) -> impl IntoResponse {
    password_page(ctx, PasswordFlow::Reset, &id, &token, None)
}

/// Set a new password from a reset email.
#[instrument(skip(state, ctx, customer, token, form))]
pub async fn reset(
    State(state): State<AppState>,
    ctx: PageContext,
    customer: CustomerSession,
    Path((id, token)): Path<(String, String)>,
    Form(form): Form<PasswordForm>,
) -> Result<Response> {
    complete_password_flow(&state, ctx, &customer, PasswordFlow::Reset, &id, &token, form).await
}

/// Display the activation form from an invitation email.
#[instrument(skip(ctx, token))]
pub async fn activate_page(
    ctx: PageContext,
    Path((id, token)): Path<(String, String)>,
) -> impl IntoResponse {
    password_page(ctx, PasswordFlow::Activate, &id, &token, None)
}

/// Activate an invited account.
#[instrument(skip(state, ctx, customer, token, form))]
pub async fn activate(
    State(state): State<AppState>,
    ctx: PageContext,
    customer: CustomerSession,
    Path((id, token)): Path<(String, String)>,
    Form(form): Form<PasswordForm>,
) -> Result<Response> {
    complete_password_flow(&state, ctx, &customer, PasswordFlow::Activate, &id, &token, form)
        .await
}

async fn complete_password_flow(
    state: &AppState,
    ctx: PageContext,
    customer: &CustomerSession,
    flow: PasswordFlow,
    id: &str,
    token: &str,
    form: PasswordForm,
) -> Result<Response> {
    let password = match form.validate() {
        Ok(password) => password,
        Err(error) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                password_page(ctx, flow, id, token, Some(error)),
            )
                .into_response());
        }
    };

    let url = format!(
        "{}/account/{}/{id}/{token}",
        state.config().base_url,
        flow.segment()
    );
    let storefront = state.storefront();
    let result = match flow {
        PasswordFlow::Reset => storefront.reset_customer_by_url(&url, &password).await,
        PasswordFlow::Activate => storefront.activate_customer_by_url(&url, &password).await,
    };

    match result {
        Ok(access_token) => {
            set_customer_token(&customer.session, &access_token).await?;
            customer.session.cycle_id().await?;
            add_breadcrumb("auth", flow.heading(), None);
            Ok(Redirect::to(ACCOUNT_PATH).into_response())
        }
        Err(e) => Ok((
            StatusCode::BAD_REQUEST,
            password_page(ctx, flow, id, token, Some(form_error(&e))),
        )
            .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_error_passes_user_errors_through() {
        let error = ShopifyError::UserError("Unidentified customer".to_string());
        assert_eq!(form_error(&error), "Unidentified customer");
    }

    #[test]
    fn test_form_error_hides_transport_details() {
        let error = ShopifyError::RateLimited(2);
        assert_eq!(form_error(&error), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_password_flow_paths() {
        assert_eq!(PasswordFlow::Reset.segment(), "reset");
        assert_eq!(PasswordFlow::Activate.segment(), "activate");
    }
}
