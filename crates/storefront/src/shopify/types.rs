//! Domain types for the Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the wire types
//! in `storefront::queries`. Money is parsed into [`Money`] and IDs into the
//! typed global-ID wrappers from `bien-miches-core`.

use chrono::{DateTime, Utc};

use bien_miches_core::{
    AddressId, CartId, CartLineId, CollectionId, CustomerId, Money, OrderId, ProductId,
    VariantId,
};

// =============================================================================
// Shared Types
// =============================================================================

/// Product, variant or collection image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

impl Image {
    /// Alt text, falling back to the given title.
    #[must_use]
    pub fn alt_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.alt_text.as_deref().unwrap_or(fallback)
    }
}

/// SEO metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seo {
    /// Page title for search engines.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
}

/// Cursor pagination state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Cursor for the next page, if there is one.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }
}

/// Basic shop information.
#[derive(Debug, Clone)]
pub struct Shop {
    pub name: String,
    pub description: Option<String>,
    pub primary_domain_url: String,
}

// =============================================================================
// Product Types
// =============================================================================

/// A name/value option pair (e.g. `Size = 32 oz`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductOption {
    /// Option name (e.g., "Flavor").
    pub name: String,
    /// Available values in display order.
    pub values: Vec<String>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone)]
pub struct ProductVariant {
    pub id: VariantId,
    pub title: String,
    pub available_for_sale: bool,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    pub unit_price: Option<Money>,
    pub image: Option<Image>,
    pub selected_options: Vec<SelectedOption>,
    pub sku: Option<String>,
    /// Title of the parent product.
    pub product_title: String,
    /// Handle of the parent product.
    pub product_handle: String,
}

impl ProductVariant {
    /// Whether this is the single implicit variant of a product without options.
    #[must_use]
    pub fn is_default_variant(&self) -> bool {
        self.selected_options
            .iter()
            .any(|o| o.name == "Title" && o.value == "Default Title")
    }

    /// Value selected for the named option, if any.
    #[must_use]
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.selected_options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }
}

/// A product page.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub vendor: String,
    pub handle: String,
    pub description: String,
    pub description_html: String,
    pub options: Vec<ProductOption>,
    pub images: Vec<Image>,
    /// Variant matching the requested options, when they match one.
    pub selected_variant: Option<ProductVariant>,
    /// First variant of the product.
    pub first_variant: Option<ProductVariant>,
    pub seo: Seo,
}

/// Product summary shown in grids (recommended products, collections, search).
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub title: String,
    pub handle: String,
    pub min_price: Money,
    pub image: Option<Image>,
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection without its products.
#[derive(Debug, Clone)]
pub struct CollectionSummary {
    pub id: CollectionId,
    pub title: String,
    pub handle: String,
    pub description: String,
    pub image: Option<Image>,
}

/// One page of the collection list.
#[derive(Debug, Clone, Default)]
pub struct CollectionList {
    pub collections: Vec<CollectionSummary>,
    pub page_info: PageInfo,
}

/// A collection with one page of its products.
#[derive(Debug, Clone)]
pub struct CollectionPage {
    pub collection: CollectionSummary,
    pub description_html: String,
    pub products: Vec<ProductCard>,
    pub page_info: PageInfo,
}

// =============================================================================
// Content Types
// =============================================================================

/// An online-store page managed in Shopify.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: String,
    pub title: String,
    /// Body HTML.
    pub body: String,
    pub seo: Seo,
}

// =============================================================================
// Cart Types
// =============================================================================

/// The variant a cart line refers to.
#[derive(Debug, Clone)]
pub struct CartMerchandise {
    pub id: VariantId,
    pub title: String,
    pub product_title: String,
    pub product_handle: String,
    pub image: Option<Image>,
    pub selected_options: Vec<SelectedOption>,
}

/// One line of a cart.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: CartLineId,
    pub quantity: i64,
    /// Total for the line after line-level discounts.
    pub total: Money,
    pub merchandise: CartMerchandise,
}

/// A discount code entered on the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartDiscountCode {
    pub code: String,
    /// Whether Shopify applied the code to this cart.
    pub applicable: bool,
}

/// A cart snapshot as returned by the latest query or mutation.
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: CartId,
    pub checkout_url: Option<String>,
    pub total_quantity: i64,
    pub lines: Vec<CartLine>,
    pub subtotal: Option<Money>,
    pub total: Option<Money>,
    pub discount_codes: Vec<CartDiscountCode>,
}

impl Cart {
    /// Codes Shopify accepted for this cart.
    #[must_use]
    pub fn applicable_codes(&self) -> Vec<String> {
        self.discount_codes
            .iter()
            .filter(|c| c.applicable)
            .map(|c| c.code.clone())
            .collect()
    }
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone)]
pub struct CartLineInput {
    pub merchandise_id: VariantId,
    pub quantity: i64,
}

/// Input for changing the quantity of a cart line.
#[derive(Debug, Clone)]
pub struct CartLineUpdateInput {
    pub id: CartLineId,
    pub quantity: i64,
}

// =============================================================================
// Customer Types
// =============================================================================

/// A customer mailing address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub id: Option<AddressId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    /// Full name as Shopify renders it.
    pub name: Option<String>,
    /// Address lines formatted by Shopify.
    pub formatted: Vec<String>,
}

impl Address {
    /// `"First Last"`, or `None` when neither is set.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return Some(name.to_string());
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!joined.is_empty()).then_some(joined)
    }
}

/// Fields of a `MailingAddressInput`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressInput {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
}

/// Order summary shown in the order history.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: OrderId,
    pub name: String,
    pub order_number: i64,
    pub processed_at: DateTime<Utc>,
    pub financial_status: Option<String>,
    pub fulfillment_status: String,
    pub total: Money,
}

/// A customer profile with addresses and recent orders.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub accepts_marketing: bool,
    pub number_of_orders: String,
    pub default_address: Option<Address>,
    pub addresses: Vec<Address>,
    pub orders: Vec<OrderSummary>,
}

/// Fields for `customerCreate`.
#[derive(Debug, Clone)]
pub struct CustomerCreateInput {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub accepts_marketing: Option<bool>,
}

/// Fields for `customerUpdate`. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerUpdateInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub accepts_marketing: Option<bool>,
    pub password: Option<String>,
}

/// Result of a profile update.
#[derive(Debug, Clone)]
pub struct CustomerUpdate {
    pub customer: Customer,
    /// Shopify rotates the token when the password changes.
    pub access_token: Option<crate::models::CustomerAccessToken>,
}

// =============================================================================
// Order Types
// =============================================================================

/// Value of a discount application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountValue {
    Money(Money),
    Percentage(String),
}

impl DiscountValue {
    /// `-$5` or `-10% OFF`.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Money(money) => format!("-{}", money.display_without_trailing_zeros()),
            Self::Percentage(percentage) => format!("-{percentage}% OFF"),
        }
    }
}

/// One line item of an order.
#[derive(Debug, Clone)]
pub struct OrderLineItem {
    pub title: String,
    pub quantity: i64,
    pub variant_title: Option<String>,
    pub variant_price: Option<Money>,
    pub discounted_total: Option<Money>,
    pub image: Option<Image>,
    pub product_handle: Option<String>,
}

impl OrderLineItem {
    /// Price shown for the line: the discounted total, else the variant price.
    #[must_use]
    pub fn display_price(&self) -> Option<&Money> {
        self.discounted_total.as_ref().or(self.variant_price.as_ref())
    }
}

/// A full order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    pub order_number: i64,
    pub status_url: String,
    pub processed_at: DateTime<Utc>,
    pub fulfillment_status: String,
    pub subtotal: Option<Money>,
    pub total_tax: Option<Money>,
    pub total: Money,
    pub shipping_address: Option<Address>,
    pub discount_applications: Vec<DiscountValue>,
    pub line_items: Vec<OrderLineItem>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_value_display() {
        let five = DiscountValue::Money(Money::parse("5.0", "USD").unwrap());
        assert_eq!(five.display(), "-$5");
        let ten = DiscountValue::Percentage("10".to_string());
        assert_eq!(ten.display(), "-10% OFF");
    }

    #[test]
    fn test_address_full_name() {
        let address = Address {
            first_name: Some("Juan".into()),
            last_name: Some("Cosalá".into()),
            ..Address::default()
        };
        assert_eq!(address.full_name().as_deref(), Some("Juan Cosalá"));
        assert_eq!(Address::default().full_name(), None);
    }

    #[test]
    fn test_page_info_next_cursor() {
        let info = PageInfo {
            has_next_page: false,
            end_cursor: Some("abc".into()),
        };
        assert_eq!(info.next_cursor(), None);
        let info = PageInfo {
            has_next_page: true,
            end_cursor: Some("abc".into()),
        };
        assert_eq!(info.next_cursor(), Some("abc"));
    }

    #[test]
    fn test_order_line_display_price_falls_back_to_variant() {
        let item = OrderLineItem {
            title: "Michelada Mix".into(),
            quantity: 2,
            variant_title: None,
            variant_price: Some(Money::parse("12", "USD").unwrap()),
            discounted_total: None,
            image: None,
            product_handle: None,
        };
        assert_eq!(item.display_price().unwrap().display(), "$12.00");
    }
}
