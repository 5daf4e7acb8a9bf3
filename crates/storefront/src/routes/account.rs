//! Account route handlers.
//!
//! Every page here needs a signed-in customer. A missing token, or one
//! Shopify no longer accepts, clears the session token and sends the
//! customer to the login page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use serde_json::{Map, Value};
use tracing::instrument;

use bien_miches_core::{AddressId, OrderId};

use super::ImageView;
use super::auth::form_error;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::customer::LoginRedirect;
use crate::middleware::{
    CustomerSession, PageContext, RequireCustomer, clear_customer_token, set_customer_token,
};
use crate::services::customer_forms::{
    AddressForm, AddressMethod, NEW_ADDRESS_ID, ProfileForm, decode_address_id,
};
use crate::shopify::{Address, Customer, Order, OrderSummary, ShopifyError};
use crate::state::AppState;

const ORDERS_PATH: &str = "/account/orders";
const ADDRESSES_PATH: &str = "/account/addresses";

/// Processed dates are shown as `September 16, 2023`.
const ORDER_DATE_FORMAT: &str = "%B %d, %Y";

// =============================================================================
// Helpers
// =============================================================================

/// Attach `Cache-Control: no-cache` to an account response.
fn no_cache(response: impl IntoResponse) -> Response {
    ([(header::CACHE_CONTROL, "no-cache")], response).into_response()
}

/// Fetch the signed-in customer, or the redirect to send instead.
async fn load_customer(
    state: &AppState,
    auth: &RequireCustomer,
) -> std::result::Result<Customer, Response> {
    match state.storefront().get_customer(&auth.access_token).await {
        Ok(customer) => Ok(customer),
        Err(e) => {
            tracing::info!(error = %e, "Customer token rejected, signing out");
            if let Err(e) = clear_customer_token(&auth.customer.session).await {
                tracing::warn!(error = %e, "Failed to clear customer token");
            }
            Err(LoginRedirect.into_response())
        }
    }
}

/// `{"<address id>": message}`, for errors with no page to render into.
fn keyed_error(address_id: String, message: &str) -> Value {
    Value::Object(Map::from_iter([(
        address_id,
        Value::String(message.to_string()),
    )]))
}

/// Account page heading.
#[must_use]
pub fn welcome_heading(first_name: Option<&str>) -> String {
    match first_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("Welcome, {name}"),
        None => "Welcome to your account.".to_string(),
    }
}

/// URL-safe path segment for an order GID.
#[must_use]
pub fn encode_order_id(order_id: &OrderId) -> String {
    URL_SAFE_NO_PAD.encode(order_id.as_str())
}

/// Decode an order path segment back into its GID.
///
/// Standard base64 is accepted as well so older links keep working.
#[must_use]
pub fn decode_order_id(segment: &str) -> Option<OrderId> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .or_else(|_| STANDARD.decode(segment))
        .ok()?;
    let gid = String::from_utf8(bytes).ok()?;
    gid.starts_with("gid://shopify/Order/")
        .then(|| OrderId::new(gid))
}

// =============================================================================
// View Types
// =============================================================================

/// Order history row.
#[derive(Clone)]
pub struct OrderSummaryView {
    pub name: String,
    pub path: String,
    pub processed_at: String,
    pub financial_status: Option<String>,
    pub fulfillment_status: String,
    pub total: String,
}

impl From<&OrderSummary> for OrderSummaryView {
    fn from(order: &OrderSummary) -> Self {
        Self {
            name: order.name.clone(),
            path: format!("{ORDERS_PATH}/{}", encode_order_id(&order.id)),
            processed_at: order.processed_at.format(ORDER_DATE_FORMAT).to_string(),
            financial_status: order.financial_status.clone(),
            fulfillment_status: order.fulfillment_status.clone(),
            total: order.total.display(),
        }
    }
}

/// Order line display data.
#[derive(Clone)]
pub struct OrderLineView {
    /// `"2 x "` for multiples, empty for a single item.
    pub quantity_prefix: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub price: String,
    pub handle: Option<String>,
    pub image: Option<ImageView>,
}

/// Mailing address display data, also used to prefill edit forms.
#[derive(Clone, Default)]
pub struct AddressView {
    pub id: String,
    pub name: Option<String>,
    pub formatted: Vec<String>,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub province: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
}

impl AddressView {
    /// Whether this is the blank form for a new address.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id == NEW_ADDRESS_ID
    }

    fn new(address: &Address, default_id: Option<&AddressId>) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            id: address
                .id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            name: address.full_name(),
            formatted: address.formatted.clone(),
            first_name: text(&address.first_name),
            last_name: text(&address.last_name),
            company: text(&address.company),
            address1: text(&address.address1),
            address2: text(&address.address2),
            city: text(&address.city),
            province: text(&address.province),
            zip: text(&address.zip),
            country: text(&address.country),
            phone: text(&address.phone),
            is_default: address.id.is_some() && address.id.as_ref() == default_id,
        }
    }
}

/// Full order display data.
#[derive(Clone)]
pub struct OrderView {
    pub name: String,
    pub processed_at: String,
    pub lines: Vec<OrderLineView>,
    pub discount: Option<String>,
    pub subtotal: Option<String>,
    pub tax: Option<String>,
    pub total: String,
    pub shipping_address: Option<AddressView>,
    pub fulfillment_status: String,
    pub status_url: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let lines = order
            .line_items
            .iter()
            .map(|item| OrderLineView {
                quantity_prefix: if item.quantity > 1 {
                    format!("{} x ", item.quantity)
                } else {
                    String::new()
                },
                title: item.title.clone(),
                variant_title: item
                    .variant_title
                    .clone()
                    .filter(|t| t != "Default Title"),
                price: item
                    .display_price()
                    .map(bien_miches_core::Money::display)
                    .unwrap_or_default(),
                handle: item.product_handle.clone(),
                image: item
                    .image
                    .as_ref()
                    .map(|image| ImageView::new(image, &item.title)),
            })
            .collect();

        Self {
            name: order.name.clone(),
            processed_at: order.processed_at.format(ORDER_DATE_FORMAT).to_string(),
            lines,
            discount: order.discount_applications.first().map(|d| d.display()),
            subtotal: order.subtotal.as_ref().map(bien_miches_core::Money::display),
            tax: order.total_tax.as_ref().map(bien_miches_core::Money::display),
            total: order.total.display(),
            shipping_address: order
                .shipping_address
                .as_ref()
                .map(|address| AddressView::new(address, None)),
            fulfillment_status: order.fulfillment_status.clone(),
            status_url: order.status_url.clone(),
        }
    }
}

/// Profile form values.
#[derive(Clone, Default)]
pub struct ProfileView {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub accepts_marketing: bool,
}

impl From<&Customer> for ProfileView {
    fn from(customer: &Customer) -> Self {
        Self {
            first_name: customer.first_name.clone().unwrap_or_default(),
            last_name: customer.last_name.clone().unwrap_or_default(),
            email: customer.email.clone().unwrap_or_default(),
            phone: customer.phone.clone().unwrap_or_default(),
            accepts_marketing: customer.accepts_marketing,
        }
    }
}

/// An address form error, shown next to the form it came from.
#[derive(Clone)]
pub struct AddressError {
    pub address_id: String,
    pub message: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub ctx: PageContext,
    pub heading: String,
    pub orders: Vec<OrderSummaryView>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub ctx: PageContext,
    pub order: OrderView,
}

/// Profile template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub heading: String,
    pub profile: ProfileView,
    pub error: Option<String>,
    pub success: bool,
}

/// Address book template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub ctx: PageContext,
    pub heading: String,
    pub addresses: Vec<AddressView>,
    pub new_address: AddressView,
    pub error: Option<AddressError>,
}

impl AddressesTemplate {
    fn new(ctx: PageContext, customer: &Customer, error: Option<AddressError>) -> Self {
        let default_id = customer
            .default_address
            .as_ref()
            .and_then(|address| address.id.as_ref());
        Self {
            ctx,
            heading: welcome_heading(customer.first_name.as_deref()),
            addresses: customer
                .addresses
                .iter()
                .map(|address| AddressView::new(address, default_id))
                .collect(),
            new_address: AddressView {
                id: NEW_ADDRESS_ID.to_string(),
                ..AddressView::default()
            },
            error,
        }
    }

    /// The saved default address.
    #[must_use]
    pub fn default_address(&self) -> Option<&AddressView> {
        self.addresses.iter().find(|address| address.is_default)
    }

    /// Edit forms for every saved address, then the new-address form.
    #[must_use]
    pub fn address_forms(&self) -> Vec<&AddressView> {
        self.addresses
            .iter()
            .chain(std::iter::once(&self.new_address))
            .collect()
    }

    /// The error for the form editing `address_id`, if any.
    #[must_use]
    pub fn error_for(&self, address_id: &str) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|e| e.address_id == address_id)
            .map(|e| e.message.as_str())
    }
}

// =============================================================================
// Routes
// =============================================================================

/// `/account` sends signed-in customers to their orders.
#[instrument(skip(_auth))]
pub async fn index(_auth: RequireCustomer) -> Response {
    no_cache(Redirect::to(ORDERS_PATH))
}

/// Display the order history.
#[instrument(skip(state, ctx, auth))]
pub async fn orders(
    State(state): State<AppState>,
    ctx: PageContext,
    auth: RequireCustomer,
) -> Response {
    let customer = match load_customer(&state, &auth).await {
        Ok(customer) => customer,
        Err(redirect) => return redirect,
    };

    no_cache(OrdersTemplate {
        ctx,
        heading: welcome_heading(customer.first_name.as_deref()),
        orders: customer.orders.iter().map(OrderSummaryView::from).collect(),
    })
}

/// Display one order.
///
/// `id` is the base64-encoded order GID. An undecodable id goes back to the
/// order history.
#[instrument(skip(state, ctx, customer, id))]
pub async fn order(
    State(state): State<AppState>,
    ctx: PageContext,
    customer: CustomerSession,
    Path(id): Path<String>,
) -> Result<Response> {
    let Some(order_id) = decode_order_id(&id) else {
        return Ok(Redirect::to(ORDERS_PATH).into_response());
    };
    if !customer.is_logged_in() {
        return Ok(LoginRedirect.into_response());
    }

    let order = state
        .storefront()
        .get_order(&order_id)
        .await
        .map_err(AppError::from_lookup)?;

    Ok(no_cache(OrderTemplate {
        ctx,
        order: OrderView::from(&order),
    }))
}

/// Display the profile form.
#[instrument(skip(state, ctx, auth))]
pub async fn profile(
    State(state): State<AppState>,
    ctx: PageContext,
    auth: RequireCustomer,
) -> Response {
    let customer = match load_customer(&state, &auth).await {
        Ok(customer) => customer,
        Err(redirect) => return redirect,
    };

    no_cache(ProfileTemplate {
        ctx,
        heading: welcome_heading(customer.first_name.as_deref()),
        profile: ProfileView::from(&customer),
        error: None,
        success: false,
    })
}

/// Update the profile.
#[instrument(skip(state, ctx, auth, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    ctx: PageContext,
    auth: RequireCustomer,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let customer = match load_customer(&state, &auth).await {
        Ok(customer) => customer,
        Err(redirect) => return Ok(redirect),
    };
    let rejected = |error: String| {
        no_cache((
            StatusCode::BAD_REQUEST,
            ProfileTemplate {
                ctx: ctx.clone(),
                heading: welcome_heading(customer.first_name.as_deref()),
                profile: ProfileView::from(&customer),
                error: Some(error),
                success: false,
            },
        ))
    };

    let input = match form.into_update() {
        Ok(input) => input,
        Err(error) => return Ok(rejected(error)),
    };

    match state
        .storefront()
        .update_customer(&auth.access_token, input)
        .await
    {
        Ok(update) => {
            if let Some(token) = &update.access_token {
                set_customer_token(&auth.customer.session, token).await?;
            }
            add_breadcrumb("account", "Profile updated", None);
            Ok(no_cache(ProfileTemplate {
                ctx: ctx.clone(),
                heading: welcome_heading(update.customer.first_name.as_deref()),
                profile: ProfileView::from(&update.customer),
                error: None,
                success: true,
            }))
        }
        Err(e) => Ok(rejected(form_error(&e))),
    }
}

/// Display the address book.
#[instrument(skip(state, ctx, auth))]
pub async fn addresses(
    State(state): State<AppState>,
    ctx: PageContext,
    auth: RequireCustomer,
) -> Response {
    match load_customer(&state, &auth).await {
        Ok(customer) => no_cache(AddressesTemplate::new(ctx, &customer, None)),
        Err(redirect) => redirect,
    }
}

/// Create, update or delete an address, dispatched on `_method`.
#[instrument(skip(state, ctx, customer, form), fields(method = ?form.method))]
pub async fn update_addresses(
    State(state): State<AppState>,
    ctx: PageContext,
    customer: CustomerSession,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let Some(address_id) = form.address_id.clone().filter(|id| !id.trim().is_empty()) else {
        return Err(AppError::BadRequest(
            "You must provide an address id.".to_string(),
        ));
    };
    let Some(access_token) = customer.access_token().map(str::to_string) else {
        return Ok(no_cache((
            StatusCode::UNAUTHORIZED,
            Json(keyed_error(address_id, "Unauthorized")),
        )));
    };
    let Some(method) = AddressMethod::parse(form.method.as_deref()) else {
        return Ok(no_cache((
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
        )));
    };

    let result = apply_address_change(&state, &access_token, method, &address_id, &form).await;

    match result {
        Ok(()) => {
            add_breadcrumb("account", "Address book updated", None);
            Ok(Redirect::to(ADDRESSES_PATH).into_response())
        }
        Err(e) => {
            let error = AddressError {
                address_id,
                message: form_error(&e),
            };
            let auth = RequireCustomer {
                customer,
                access_token,
            };
            let customer = match load_customer(&state, &auth).await {
                Ok(customer) => customer,
                Err(redirect) => return Ok(redirect),
            };
            Ok(no_cache((
                StatusCode::BAD_REQUEST,
                AddressesTemplate::new(ctx, &customer, Some(error)),
            )))
        }
    }
}

async fn apply_address_change(
    state: &AppState,
    access_token: &str,
    method: AddressMethod,
    address_id: &str,
    form: &AddressForm,
) -> std::result::Result<(), ShopifyError> {
    let storefront = state.storefront();
    match method {
        AddressMethod::Create => {
            let id = storefront
                .create_address(access_token, form.address_input())
                .await?;
            if form.make_default() {
                storefront.set_default_address(access_token, &id).await?;
            }
        }
        AddressMethod::Update => {
            let id = AddressId::new(decode_address_id(address_id));
            let id = storefront
                .update_address(access_token, &id, form.address_input())
                .await?;
            if form.make_default() {
                storefront.set_default_address(access_token, &id).await?;
            }
        }
        AddressMethod::Delete => {
            let id = AddressId::new(decode_address_id(address_id));
            storefront.delete_address(access_token, &id).await?;
        }
    }
    Ok(())
}
