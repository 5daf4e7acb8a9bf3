//! Storefront API response bodies shaped like Shopify's.

use serde_json::{Value, json};

pub const ACCESS_TOKEN: &str = "c5d1f0e2a9b84f7e9d3c2b1a0f9e8d7c";
pub const CUSTOMER_EMAIL: &str = "paloma@example.com";
pub const CART_ID: &str = "gid://shopify/Cart/Z2NwLXVzLWVhc3QxOjAxSDhR";
pub const CHECKOUT_URL: &str = "https://bien-miches.myshopify.com/cart/c/Z2NwLXVzLWVhc3QxOjAxSDhR";
pub const ORDER_ID: &str = "gid://shopify/Order/5512345678";
pub const VARIANT_ID: &str = "gid://shopify/ProductVariant/44120311234";
pub const PRODUCT_HANDLE: &str = "bien-miches-michelada-mix";

/// `MoneyV2` in USD.
#[must_use]
pub fn money(amount: &str) -> Value {
    json!({ "amount": amount, "currencyCode": "USD" })
}

fn image(alt: &str) -> Value {
    json!({
        "url": "https://cdn.shopify.com/s/files/1/0814/6478/7227/files/mix.png",
        "altText": alt,
        "width": 800,
        "height": 800,
    })
}

/// A cart holding `quantity` of the 32 oz michelada mix.
#[must_use]
pub fn cart(quantity: i64, discount_codes: &[&str]) -> Value {
    let codes: Vec<Value> = discount_codes
        .iter()
        .map(|code| json!({ "code": code, "applicable": true }))
        .collect();

    json!({
        "id": CART_ID,
        "checkoutUrl": CHECKOUT_URL,
        "totalQuantity": quantity,
        "cost": {
            "subtotalAmount": money("24.0"),
            "totalAmount": money("24.0"),
        },
        "discountCodes": codes,
        "lines": { "nodes": [{
            "id": "gid://shopify/CartLine/7c1f3b2e-1",
            "quantity": quantity,
            "cost": { "totalAmount": money("24.0") },
            "merchandise": {
                "id": VARIANT_ID,
                "title": "32 oz",
                "image": image("Michelada mix"),
                "selectedOptions": [{ "name": "Size", "value": "32 oz" }],
                "product": { "title": "Michelada Mix", "handle": PRODUCT_HANDLE },
            },
        }] },
    })
}

/// A cart mutation payload under `field`, e.g. `cartCreate`.
#[must_use]
pub fn cart_payload(field: &str, cart: Value) -> Value {
    json!({ field: { "cart": cart, "userErrors": [] } })
}

/// A `customerAccessTokenCreate` payload carrying `token`.
#[must_use]
pub fn access_token_created(token: &str) -> Value {
    json!({
        "customerAccessTokenCreate": {
            "customerAccessToken": {
                "accessToken": token,
                "expiresAt": "2030-01-01T00:00:00Z",
            },
            "customerUserErrors": [],
        }
    })
}

/// A `customerAccessTokenCreate` payload rejecting the credentials.
#[must_use]
pub fn access_token_rejected(message: &str) -> Value {
    json!({
        "customerAccessTokenCreate": {
            "customerAccessToken": null,
            "customerUserErrors": [{
                "code": "UNIDENTIFIED_CUSTOMER",
                "field": null,
                "message": message,
            }],
        }
    })
}

fn address() -> Value {
    json!({
        "id": "gid://shopify/MailingAddress/9012?model_name=CustomerAddress",
        "name": "Paloma Reyes",
        "firstName": "Paloma",
        "lastName": "Reyes",
        "company": null,
        "address1": "1007 Cedar St",
        "address2": null,
        "city": "Santa Cruz",
        "province": "California",
        "country": "United States",
        "zip": "95060",
        "phone": null,
        "formatted": ["1007 Cedar St", "Santa Cruz CA 95060", "United States"],
    })
}

/// The signed-in customer with one address and one order.
#[must_use]
pub fn customer() -> Value {
    json!({
        "id": "gid://shopify/Customer/7001234",
        "acceptsMarketing": true,
        "email": CUSTOMER_EMAIL,
        "firstName": "Paloma",
        "lastName": "Reyes",
        "phone": null,
        "numberOfOrders": "1",
        "defaultAddress": address(),
        "addresses": { "nodes": [address()] },
        "orders": { "nodes": [{
            "id": ORDER_ID,
            "name": "#1001",
            "orderNumber": 1001,
            "processedAt": "2023-09-16T19:30:00Z",
            "financialStatus": "PAID",
            "fulfillmentStatus": "FULFILLED",
            "totalPrice": money("26.0"),
        }] },
    })
}

/// The customer's order, as returned by `node(id:)`.
#[must_use]
pub fn order() -> Value {
    json!({
        "__typename": "Order",
        "id": ORDER_ID,
        "name": "#1001",
        "orderNumber": 1001,
        "statusUrl": "https://bien-miches.myshopify.com/orders/5512345678/authenticate",
        "processedAt": "2023-09-16T19:30:00Z",
        "fulfillmentStatus": "FULFILLED",
        "subtotalPrice": money("24.0"),
        "totalTax": money("2.0"),
        "totalPrice": money("26.0"),
        "shippingAddress": address(),
        "discountApplications": { "nodes": [] },
        "lineItems": { "nodes": [{
            "title": "Michelada Mix",
            "quantity": 2,
            "discountedTotalPrice": money("24.0"),
            "variant": {
                "title": "32 oz",
                "price": money("12.0"),
                "image": image("Michelada mix"),
                "product": { "handle": PRODUCT_HANDLE },
            },
        }] },
    })
}

fn variant(id: &str, size: &str, available: bool) -> Value {
    json!({
        "id": id,
        "title": size,
        "availableForSale": available,
        "sku": null,
        "price": money("12.0"),
        "compareAtPrice": null,
        "unitPrice": null,
        "image": image("Michelada mix"),
        "selectedOptions": [{ "name": "Size", "value": size }],
        "product": { "title": "Michelada Mix", "handle": PRODUCT_HANDLE },
    })
}

/// Both sizes of the michelada mix; the gallon is sold out.
#[must_use]
pub fn variants() -> Vec<Value> {
    vec![
        variant(VARIANT_ID, "32 oz", true),
        variant("gid://shopify/ProductVariant/44120311299", "1 gal", false),
    ]
}

/// The michelada mix. `selected` is the variant matching the query, if any.
#[must_use]
pub fn product(selected: Option<Value>) -> Value {
    json!({
        "id": "gid://shopify/Product/8712345",
        "title": "Michelada Mix",
        "vendor": "Bien Miches",
        "handle": PRODUCT_HANDLE,
        "description": "Our house michelada mix.",
        "descriptionHtml": "<p>Our house <strong>michelada</strong> mix.</p>",
        "options": [{ "name": "Size", "values": ["32 oz", "1 gal"] }],
        "images": { "nodes": [image("Michelada mix")] },
        "selectedVariant": selected,
        "variants": { "nodes": [variants().remove(0)] },
        "seo": { "title": null, "description": "Michelada mix made in Santa Cruz." },
    })
}

/// `GetProductVariants` data for the michelada mix.
#[must_use]
pub fn product_variants() -> Value {
    json!({ "product": { "variants": { "nodes": variants() } } })
}

/// A product tile as returned by collection and search queries.
#[must_use]
pub fn product_card() -> Value {
    json!({
        "id": "gid://shopify/Product/8712345",
        "title": "Michelada Mix",
        "handle": PRODUCT_HANDLE,
        "priceRange": { "minVariantPrice": money("12.0") },
        "images": { "nodes": [image("Michelada mix")] },
    })
}

/// The mixers collection, without its products.
#[must_use]
pub fn collection() -> Value {
    json!({
        "id": "gid://shopify/Collection/4410001",
        "title": "Mixers",
        "handle": "mixers",
        "description": "Everything you need for a proper michelada.",
        "image": image("Mixers"),
    })
}

/// `pageInfo` for a connection. `end_cursor` set means another page follows.
#[must_use]
pub fn page_info(end_cursor: Option<&str>) -> Value {
    json!({ "hasNextPage": end_cursor.is_some(), "endCursor": end_cursor })
}

/// An online-store page.
#[must_use]
pub fn page(handle: &str, title: &str, seo_title: Option<&str>) -> Value {
    json!({
        "id": format!("gid://shopify/Page/{handle}"),
        "title": title,
        "body": "<p>Hecho en <em>Santa Cruz</em>.</p>",
        "seo": { "title": seo_title, "description": null },
    })
}
