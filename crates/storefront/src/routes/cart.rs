//! Cart route handlers.
//!
//! The cart lives in Shopify; the session only remembers its id and the
//! last known quantity for the header badge. Mutations are plain form posts
//! dispatched on `cart_action`, answered with a redirect back to the page
//! that submitted them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use bien_miches_core::{CartId, CartLineId, VariantId};

use super::ImageView;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CustomerSession, PageContext, clear_cart, set_cart};
use crate::services::customer_forms::merge_discount_codes;
use crate::shopify::{Cart, CartLine, CartLineInput, CartLineUpdateInput, ShopifyError};
use crate::state::AppState;

const CART_PATH: &str = "/cart";

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub handle: String,
    pub product_title: String,
    /// `Name: Value` pairs, without Shopify's `Title: Default Title`.
    pub options: Vec<String>,
    pub quantity: i64,
    pub decrease_quantity: i64,
    pub can_decrease: bool,
    pub increase_quantity: i64,
    pub total: String,
    pub image: Option<ImageView>,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let merchandise = &line.merchandise;
        Self {
            id: line.id.to_string(),
            handle: merchandise.product_handle.clone(),
            product_title: merchandise.product_title.clone(),
            options: merchandise
                .selected_options
                .iter()
                .filter(|o| !(o.name == "Title" && o.value == "Default Title"))
                .map(|o| format!("{}: {}", o.name, o.value))
                .collect(),
            quantity: line.quantity,
            decrease_quantity: (line.quantity - 1).max(0),
            can_decrease: line.quantity > 1,
            increase_quantity: line.quantity + 1,
            total: line.total.display(),
            image: merchandise
                .image
                .as_ref()
                .map(|image| ImageView::new(image, &merchandise.product_title)),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    /// Subtotal, or `-` while Shopify has not priced the cart.
    pub subtotal: String,
    pub discount_codes: Vec<String>,
    /// Applied codes as submitted back by the discount form.
    pub discount_codes_value: String,
    pub checkout_url: Option<String>,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let discount_codes = cart.applicable_codes();
        Self {
            lines: cart.lines.iter().map(CartLineView::from).collect(),
            subtotal: cart
                .subtotal
                .as_ref()
                .map_or_else(|| "-".to_string(), bien_miches_core::Money::display),
            discount_codes_value: discount_codes.join(","),
            discount_codes,
            checkout_url: cart.checkout_url.clone(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Cart mutation form, dispatched on `cart_action`.
#[derive(Debug, Default, Deserialize)]
pub struct CartForm {
    pub cart_action: Option<String>,
    pub merchandise_id: Option<String>,
    pub quantity: Option<String>,
    pub line_id: Option<String>,
    pub discount_code: Option<String>,
    /// Codes already on the cart, comma separated.
    pub discount_codes: Option<String>,
    pub redirect_to: Option<String>,
}

/// A validated cart mutation.
#[derive(Debug, Clone)]
pub enum CartAction {
    LinesAdd(Vec<CartLineInput>),
    LinesUpdate(Vec<CartLineUpdateInput>),
    LinesRemove(Vec<CartLineId>),
    DiscountCodesUpdate(Vec<String>),
}

impl CartAction {
    /// Name used in breadcrumbs and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LinesAdd(_) => "LinesAdd",
            Self::LinesUpdate(_) => "LinesUpdate",
            Self::LinesRemove(_) => "LinesRemove",
            Self::DiscountCodesUpdate(_) => "DiscountCodesUpdate",
        }
    }
}

impl CartForm {
    /// Validate the submitted mutation.
    ///
    /// # Errors
    ///
    /// Returns the message to show on the cart page.
    pub fn action(&self) -> std::result::Result<CartAction, String> {
        let action = self.cart_action.as_deref().unwrap_or_default();
        match action {
            "LinesAdd" => {
                let merchandise_id =
                    required(self.merchandise_id.as_deref(), "Missing merchandise id")?;
                let quantity = self.quantity()?.unwrap_or(1);
                Ok(CartAction::LinesAdd(vec![CartLineInput {
                    merchandise_id: VariantId::new(merchandise_id),
                    quantity,
                }]))
            }
            "LinesUpdate" => {
                let line_id = required(self.line_id.as_deref(), "Missing line id")?;
                let quantity = self.quantity()?.ok_or("Missing quantity")?;
                Ok(CartAction::LinesUpdate(vec![CartLineUpdateInput {
                    id: CartLineId::new(line_id),
                    quantity,
                }]))
            }
            "LinesRemove" => {
                let line_id = required(self.line_id.as_deref(), "Missing line id")?;
                Ok(CartAction::LinesRemove(vec![CartLineId::new(line_id)]))
            }
            "DiscountCodesUpdate" => Ok(CartAction::DiscountCodesUpdate(merge_discount_codes(
                self.discount_code.as_deref(),
                self.discount_codes.as_deref(),
            ))),
            other => Err(format!("{other} cart action is not defined")),
        }
    }

    fn quantity(&self) -> std::result::Result<Option<i64>, String> {
        self.quantity
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| {
                q.parse::<i64>()
                    .ok()
                    .filter(|q| *q >= 0)
                    .ok_or_else(|| "Invalid quantity".to_string())
            })
            .transpose()
    }
}

fn required<'a>(value: Option<&'a str>, message: &str) -> std::result::Result<&'a str, String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| message.to_string())
}

/// Where to go after a mutation: `redirect_to` when it is a same-site path.
#[must_use]
pub fn redirect_target(redirect_to: Option<&str>) -> &str {
    match redirect_to {
        Some(path) if is_same_site_path(path) => path,
        _ => CART_PATH,
    }
}

/// A rooted path that cannot be read as another host and is safe to put in
/// a `Location` header.
fn is_same_site_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && path.chars().all(|c| c.is_ascii_graphic() && c != '\\')
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub cart: Option<CartView>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Fetch the session cart. A cart Shopify no longer knows is forgotten:
/// the session drops its id and the badge is reset.
async fn load_cart(state: &AppState, customer: &CustomerSession) -> Result<Option<Cart>> {
    let Some(cart_id) = customer.cart_id() else {
        return Ok(None);
    };

    match state.storefront().get_cart(cart_id).await {
        Ok(cart) => {
            set_cart(&customer.session, &cart).await?;
            Ok(Some(cart))
        }
        Err(ShopifyError::NotFound(_)) => {
            tracing::info!(cart_id = %cart_id, "Cart no longer exists");
            clear_cart(&customer.session).await?;
            Ok(None)
        }
        Err(e) => {
            tracing::warn!(error = %e, cart_id = %cart_id, "Failed to fetch cart");
            Ok(None)
        }
    }
}

fn cart_page(ctx: PageContext, cart: Option<&Cart>, error: Option<String>) -> CartTemplate {
    let cart_count = cart.map_or(0, |cart| cart.total_quantity);
    CartTemplate {
        ctx: ctx.with_cart_count(cart_count),
        cart: cart.map(CartView::from).filter(|cart| !cart.is_empty()),
        error,
    }
}

/// Display cart page.
#[instrument(skip(state, ctx, customer))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    customer: CustomerSession,
) -> Result<impl IntoResponse> {
    let cart = load_cart(&state, &customer).await?;
    Ok(cart_page(ctx, cart.as_ref(), None))
}

/// Apply a cart mutation.
#[instrument(skip(state, ctx, customer, form), fields(cart_action = ?form.cart_action))]
pub async fn update(
    State(state): State<AppState>,
    ctx: PageContext,
    customer: CustomerSession,
    Form(form): Form<CartForm>,
) -> Result<Response> {
    let action = match form.action() {
        Ok(action) => action,
        Err(message) => {
            let cart = load_cart(&state, &customer).await?;
            return Ok((
                StatusCode::BAD_REQUEST,
                cart_page(ctx, cart.as_ref(), Some(message)),
            )
                .into_response());
        }
    };
    let action_name = action.name();

    let result = match (action, customer.cart_id()) {
        (CartAction::LinesAdd(lines), None) => state.storefront().create_cart(lines).await,
        (CartAction::LinesAdd(lines), Some(cart_id)) => add_lines(&state, cart_id, lines).await,
        (_, None) => return Ok(Redirect::to(CART_PATH).into_response()),
        (CartAction::LinesUpdate(lines), Some(cart_id)) => {
            state.storefront().update_cart_lines(cart_id, lines).await
        }
        (CartAction::LinesRemove(line_ids), Some(cart_id)) => {
            state.storefront().remove_cart_lines(cart_id, line_ids).await
        }
        (CartAction::DiscountCodesUpdate(codes), Some(cart_id)) => {
            state.storefront().update_discount_codes(cart_id, codes).await
        }
    };

    match result {
        Ok(cart) => {
            set_cart(&customer.session, &cart).await?;
            add_breadcrumb(
                "cart",
                action_name,
                Some(&[("cart_id", cart.id.resource_id())]),
            );
            tracing::info!(cart_id = %cart.id, quantity = cart.total_quantity, "Cart updated");
            Ok(Redirect::to(redirect_target(form.redirect_to.as_deref())).into_response())
        }
        Err(ShopifyError::NotFound(_)) => {
            tracing::info!(action = action_name, "Cart no longer exists");
            clear_cart(&customer.session).await?;
            Ok(Redirect::to(CART_PATH).into_response())
        }
        Err(ShopifyError::UserError(message)) => {
            tracing::info!(message = %message, "Cart mutation rejected");
            let cart = load_cart(&state, &customer).await?;
            Ok((
                StatusCode::BAD_REQUEST,
                cart_page(ctx, cart.as_ref(), Some(message)),
            )
                .into_response())
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// Add lines, starting a fresh cart when the remembered one has expired.
async fn add_lines(
    state: &AppState,
    cart_id: &CartId,
    lines: Vec<CartLineInput>,
) -> std::result::Result<Cart, ShopifyError> {
    match state.storefront().add_cart_lines(cart_id, lines.clone()).await {
        Err(ShopifyError::NotFound(_)) => {
            tracing::info!(cart_id = %cart_id, "Cart expired, creating a new one");
            state.storefront().create_cart(lines).await
        }
        result => result,
    }
}

/// Redirect to Shopify checkout.
#[instrument(skip(state, customer))]
pub async fn checkout(State(state): State<AppState>, customer: CustomerSession) -> Response {
    let Some(cart_id) = customer.cart_id() else {
        return Redirect::to(CART_PATH).into_response();
    };

    match state.storefront().get_cart(cart_id).await {
        Ok(Cart {
            checkout_url: Some(url),
            ..
        }) => Redirect::to(&url).into_response(),
        Ok(_) => Redirect::to(CART_PATH).into_response(),
        Err(e) => {
            tracing::error!(error = %e, cart_id = %cart_id, "Failed to get cart for checkout");
            Redirect::to(CART_PATH).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(action: &str) -> CartForm {
        CartForm {
            cart_action: Some(action.to_string()),
            ..CartForm::default()
        }
    }

    #[test]
    fn test_lines_add_defaults_quantity_to_one() {
        let form = CartForm {
            merchandise_id: Some("gid://shopify/ProductVariant/1".to_string()),
            ..form("LinesAdd")
        };
        let CartAction::LinesAdd(lines) = form.action().unwrap() else {
            panic!("expected LinesAdd");
        };
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().quantity, 1);
    }

    #[test]
    fn test_lines_update_accepts_zero() {
        let form = CartForm {
            line_id: Some("gid://shopify/CartLine/1".to_string()),
            quantity: Some("0".to_string()),
            ..form("LinesUpdate")
        };
        let CartAction::LinesUpdate(lines) = form.action().unwrap() else {
            panic!("expected LinesUpdate");
        };
        assert_eq!(lines.first().unwrap().quantity, 0);
    }

    #[test]
    fn test_invalid_quantity_is_rejected() {
        let form = CartForm {
            line_id: Some("gid://shopify/CartLine/1".to_string()),
            quantity: Some("-2".to_string()),
            ..form("LinesUpdate")
        };
        assert_eq!(form.action().unwrap_err(), "Invalid quantity");
    }

    #[test]
    fn test_discount_codes_new_code_first() {
        let form = CartForm {
            discount_code: Some("SUMMER".to_string()),
            discount_codes: Some("MICHES,SUMMER".to_string()),
            ..form("DiscountCodesUpdate")
        };
        let CartAction::DiscountCodesUpdate(codes) = form.action().unwrap() else {
            panic!("expected DiscountCodesUpdate");
        };
        assert_eq!(codes, vec!["SUMMER", "MICHES"]);
    }

    #[test]
    fn test_unknown_action_message() {
        assert_eq!(
            form("Explode").action().unwrap_err(),
            "Explode cart action is not defined"
        );
    }

    #[test]
    fn test_redirect_target_only_allows_same_site_paths() {
        assert_eq!(redirect_target(Some("/products/mix")), "/products/mix");
        assert_eq!(redirect_target(Some("//evil.example")), "/cart");
        assert_eq!(redirect_target(Some("https://evil.example")), "/cart");
        assert_eq!(redirect_target(Some("/\\evil.example")), "/cart");
        assert_eq!(redirect_target(Some("/products/mix\r\nSet-Cookie: x=1")), "/cart");
        assert_eq!(redirect_target(Some("/\t/evil.example")), "/cart");
        assert_eq!(redirect_target(Some("/productos/café")), "/cart");
        assert_eq!(redirect_target(Some("/products/mix?Size=32+oz")), "/products/mix?Size=32+oz");
        assert_eq!(redirect_target(None), "/cart");
    }
}
