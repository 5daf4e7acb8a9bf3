//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                - Launch landing page (countdown)
//! GET  /launch/calendar.ics             - Launch event calendar file
//! POST /launch/subscribe                - Launch sign-up
//! GET  /shop                            - Shop home
//!
//! # Catalog
//! GET  /products/{handle}               - Product detail (options in query)
//! GET  /collections                     - Collection listing
//! GET  /collections/{handle}            - Collection detail
//! GET  /search                          - Product search
//!
//! # Cart
//! GET  /cart                            - Cart page
//! POST /cart                            - Cart mutation (dispatched on cart_action)
//! GET  /checkout                        - Redirect to Shopify checkout
//!
//! # Auth (POSTs rate limited)
//! GET  /account/login                   - Sign-in and register forms
//! POST /account/login                   - Sign in or register (dispatched on _action)
//! POST /account/logout                  - Sign out
//! GET  /account/recover                 - Password recovery form
//! POST /account/recover                 - Send recovery email
//! GET  /account/reset/{id}/{token}      - New password form
//! POST /account/reset/{id}/{token}      - Reset password
//! GET  /account/activate/{id}/{token}   - Activation form
//! POST /account/activate/{id}/{token}   - Activate account
//!
//! # Account (requires sign-in)
//! GET  /account                         - Redirects to orders
//! GET  /account/orders                  - Order history
//! GET  /account/orders/{id}             - Order detail (base64 order GID)
//! GET  /account/profile                 - Profile form
//! POST /account/profile                 - Update profile
//! GET  /account/addresses               - Address book
//! POST /account/addresses               - Address mutation (dispatched on _method)
//!
//! # Pages
//! GET  /pages/contact                   - Contact page
//! GET  /pages/{handle}                  - Shopify page
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod collections;
pub mod home;
pub mod pages;
pub mod products;
pub mod search;

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, post},
};

use crate::middleware::rate_limit::{RateLimiterLayer, auth_rate_limiter};
use crate::shopify::{Image, ProductCard};
use crate::state::AppState;

// =============================================================================
// Shared View Types
// =============================================================================

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl ImageView {
    fn new(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.url.clone(),
            alt: image.alt_or(fallback_alt).to_string(),
        }
    }
}

/// Product tile shown in grids.
#[derive(Clone)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    pub price: String,
    pub image: Option<ImageView>,
}

impl From<&ProductCard> for ProductCardView {
    fn from(product: &ProductCard) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            price: product.min_price.display_without_trailing_zeros(),
            image: product
                .image
                .as_ref()
                .map(|image| ImageView::new(image, &product.title)),
        }
    }
}

/// A `302 Found` redirect.
#[must_use]
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Google Maps directions to the launch venue.
pub const DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/?api=1&destination=Get%20Faded%20Barbershop,%201007%20Cedar%20St,%20Santa%20Cruz,%20CA%2095060";

// =============================================================================
// Routers
// =============================================================================

/// A POST route behind the credential rate limiter.
fn limited_post<H, T>(handler: H, limiter: &RateLimiterLayer) -> MethodRouter<AppState>
where
    H: axum::handler::Handler<T, AppState>,
    T: 'static,
{
    post(handler).layer(limiter.clone())
}

/// Create the launch and home routes router.
pub fn home_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::launch))
        .route("/launch/calendar.ics", get(home::calendar))
        .route("/launch/subscribe", post(home::subscribe))
        .route("/shop", get(home::shop))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products/{handle}", get(products::show))
        .route("/collections", get(collections::index))
        .route("/collections/{handle}", get(collections::show))
        .route("/search", get(search::search))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show).post(cart::update))
        .route("/checkout", get(cart::checkout))
}

/// Create the account routes router, nested under `/account`.
pub fn account_routes() -> Router<AppState> {
    let limiter = auth_rate_limiter();

    Router::new()
        .route("/", get(account::index))
        .route(
            "/login",
            get(auth::login_page).merge(limited_post(auth::login, &limiter)),
        )
        .route("/logout", post(auth::logout))
        .route(
            "/recover",
            get(auth::recover_page).merge(limited_post(auth::recover, &limiter)),
        )
        .route(
            "/reset/{id}/{token}",
            get(auth::reset_page).merge(limited_post(auth::reset, &limiter)),
        )
        .route(
            "/activate/{id}/{token}",
            get(auth::activate_page).merge(limited_post(auth::activate, &limiter)),
        )
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
        .route(
            "/profile",
            get(account::profile).post(account::update_profile),
        )
        .route(
            "/addresses",
            get(account::addresses).post(account::update_addresses),
        )
}

/// Create the content page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/pages/contact", get(pages::contact))
        .route("/pages/{handle}", get(pages::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(home_routes())
        .merge(catalog_routes())
        .merge(cart_routes())
        .nest("/account", account_routes())
        .merge(page_routes())
}
