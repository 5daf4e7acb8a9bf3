//! Launch landing page and shop home.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use tracing::instrument;

use bien_miches_core::{Email, TimeLeft};

use super::{DIRECTIONS_URL, ImageView, ProductCardView};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::PageContext;
use crate::services::calendar::CalendarEvent;
use crate::shopify::{CollectionSummary, CustomerCreateInput, ShopifyError};
use crate::state::AppState;

/// Outline logo shown beside the countdown.
pub const LOGO_URL: &str =
    "https://cdn.shopify.com/s/files/1/0814/6478/7227/files/BienMiches_Outline.svg?v=1693602361";

/// Hero image on the shop home.
pub const HERO_IMAGE_URL: &str = "https://cdn.shopify.com/s/files/1/0814/6478/7227/files/Screenshot_2023-08-23_at_1.02_1.png?v=1695306779";

/// Product the SHOP ONLINE button links to.
const FEATURED_PRODUCT_PATH: &str = "/products/bien-miches-michelada-mix";

const SUBSCRIBED_MESSAGE: &str = "Thanks! You're on the list. See you at the party.";
const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
const SUBSCRIBE_FAILED_MESSAGE: &str = "We couldn't sign you up right now. Please try again.";

// =============================================================================
// View Types
// =============================================================================

/// Initial countdown frame. `countdown.js` takes over from `target_ms`.
#[derive(Clone)]
pub struct CountdownView {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub done: bool,
    /// Target instant in Unix milliseconds.
    pub target_ms: i64,
}

impl CountdownView {
    #[must_use]
    pub fn new(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let left = TimeLeft::until(target, now);
        Self {
            days: left.days,
            hours: left.hours,
            minutes: left.minutes,
            seconds: left.seconds,
            done: left.is_done(),
            target_ms: target.timestamp_millis(),
        }
    }
}

/// Featured collection banner.
#[derive(Clone)]
pub struct CollectionCardView {
    pub handle: String,
    pub title: String,
    pub image: Option<ImageView>,
}

impl From<&CollectionSummary> for CollectionCardView {
    fn from(collection: &CollectionSummary) -> Self {
        Self {
            handle: collection.handle.clone(),
            title: collection.title.clone(),
            image: collection
                .image
                .as_ref()
                .map(|image| ImageView::new(image, &collection.title)),
        }
    }
}

/// Launch sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    pub email: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Launch landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/launch.html")]
pub struct LaunchTemplate {
    pub ctx: PageContext,
    pub date_line: String,
    pub countdown: CountdownView,
    pub klaviyo_form_id: Option<String>,
    pub directions_url: &'static str,
    pub logo_url: &'static str,
    pub email: String,
    pub message: Option<String>,
    pub success: bool,
}

/// Shop home template.
#[derive(Template, WebTemplate)]
#[template(path = "home/shop.html")]
pub struct ShopTemplate {
    pub ctx: PageContext,
    pub hero_image_url: &'static str,
    pub featured_product_path: &'static str,
    pub directions_url: &'static str,
    pub featured_collection: Option<CollectionCardView>,
    pub products: Vec<ProductCardView>,
}

impl LaunchTemplate {
    fn new(state: &AppState, ctx: PageContext) -> Self {
        let config = state.config();
        Self {
            ctx,
            date_line: config.launch.date_line(),
            countdown: CountdownView::new(config.launch.starts_at, Utc::now()),
            klaviyo_form_id: config.klaviyo.form_id.clone(),
            directions_url: DIRECTIONS_URL,
            logo_url: LOGO_URL,
            email: String::new(),
            message: None,
            success: false,
        }
    }
}

// =============================================================================
// Launch Routes
// =============================================================================

/// Display the launch landing page.
#[instrument(skip(state, ctx))]
pub async fn launch(State(state): State<AppState>, ctx: PageContext) -> impl IntoResponse {
    LaunchTemplate::new(&state, ctx)
}

/// Download the launch event as an iCalendar file.
#[instrument(skip(state))]
pub async fn calendar(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config();
    let event = CalendarEvent::launch(
        config.launch.starts_at,
        config.launch.ends_at,
        Some(&config.base_url),
    );

    (
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bien-miches-launch.ics\"",
            ),
        ],
        event.to_ics(Utc::now()),
    )
}

/// Sign up for launch news.
///
/// Goes to the Klaviyo list when configured, otherwise creates a Shopify
/// customer who accepts marketing.
#[instrument(skip(state, ctx, form))]
pub async fn subscribe(
    State(state): State<AppState>,
    ctx: PageContext,
    Form(form): Form<SubscribeForm>,
) -> Response {
    let mut page = LaunchTemplate::new(&state, ctx);
    let raw = form.email.unwrap_or_default();

    let email = match Email::parse(&raw) {
        Ok(email) => email,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected launch sign-up email");
            page.email = raw;
            page.message = Some(INVALID_EMAIL_MESSAGE.to_string());
            return (StatusCode::BAD_REQUEST, page).into_response();
        }
    };

    match subscribe_email(&state, &email).await {
        Ok(()) => {
            add_breadcrumb("launch", "Launch sign-up", Some(&[("domain", email.domain())]));
            page.message = Some(SUBSCRIBED_MESSAGE.to_string());
            page.success = true;
            page.into_response()
        }
        Err(message) => {
            page.email = raw;
            page.message = Some(message);
            (StatusCode::BAD_REQUEST, page).into_response()
        }
    }
}

async fn subscribe_email(state: &AppState, email: &Email) -> Result<(), String> {
    if let Some(klaviyo) = state.klaviyo() {
        return klaviyo.subscribe_email(email.as_str()).await.map_err(|e| {
            tracing::error!(error = %e, "Klaviyo subscription failed");
            SUBSCRIBE_FAILED_MESSAGE.to_string()
        });
    }

    let input = CustomerCreateInput {
        email: email.to_string(),
        password: random_password(),
        first_name: None,
        last_name: None,
        accepts_marketing: Some(true),
    };

    match state.storefront().create_customer(input).await {
        Ok(_) => Ok(()),
        Err(ShopifyError::UserError(message)) if is_already_subscribed(&message) => Ok(()),
        Err(ShopifyError::UserError(message)) => Err(message),
        Err(e) => {
            tracing::error!(error = %e, "Launch sign-up failed");
            Err(SUBSCRIBE_FAILED_MESSAGE.to_string())
        }
    }
}

/// Shopify reports an existing customer as "Email has already been taken".
fn is_already_subscribed(message: &str) -> bool {
    message.contains("already been taken")
}

/// Throwaway password for marketing-only customers. They never sign in with it.
fn random_password() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

// =============================================================================
// Shop Home
// =============================================================================

/// Display the shop home.
///
/// The featured collection and recommended products load concurrently; a
/// failure in either leaves that section out.
#[instrument(skip(state, ctx))]
pub async fn shop(State(state): State<AppState>, ctx: PageContext) -> impl IntoResponse {
    let storefront = state.storefront();
    let (featured, recommended) = tokio::join!(
        storefront.get_featured_collection(),
        storefront.get_recommended_products()
    );

    let featured_collection = featured
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load featured collection"))
        .ok()
        .flatten()
        .as_ref()
        .map(CollectionCardView::from);

    let products = recommended
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load recommended products"))
        .unwrap_or_default()
        .iter()
        .map(ProductCardView::from)
        .collect();

    ShopTemplate {
        ctx,
        hero_image_url: HERO_IMAGE_URL,
        featured_product_path: FEATURED_PRODUCT_PATH,
        directions_url: DIRECTIONS_URL,
        featured_collection,
        products,
    }
}
