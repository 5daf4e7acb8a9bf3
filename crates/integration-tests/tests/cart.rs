//! Cart mutations, the cart page and checkout.

#![allow(clippy::unwrap_used)]

use bien_miches_integration_tests::{
    TestStorefront,
    fixtures::{self, CART_ID, CHECKOUT_URL, VARIANT_ID},
    location,
};
use reqwest::StatusCode;
use serde_json::json;

/// Add one 32 oz mix, starting a new cart.
async fn add_to_cart(app: &TestStorefront) {
    app.shopify
        .respond(
            "CartCreate",
            fixtures::cart_payload("cartCreate", fixtures::cart(1, &[])),
        )
        .await;

    let response = app
        .post_form(
            "/cart",
            &[
                ("cart_action", "LinesAdd"),
                ("merchandise_id", VARIANT_ID),
                ("quantity", "1"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));
}

#[tokio::test]
async fn test_first_add_creates_cart() {
    let app = TestStorefront::start().await.unwrap();

    add_to_cart(&app).await;

    let variables = app.shopify.last_variables("CartCreate").await.unwrap();
    assert_eq!(
        variables["input"]["lines"],
        json!([{ "merchandiseId": VARIANT_ID, "quantity": 1 }])
    );
    assert!(app.shopify.requests("CartLinesAdd").await.is_empty());
}

#[tokio::test]
async fn test_second_add_goes_to_existing_cart() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond(
            "CartLinesAdd",
            fixtures::cart_payload("cartLinesAdd", fixtures::cart(2, &[])),
        )
        .await;

    let response = app
        .post_form(
            "/cart",
            &[
                ("cart_action", "LinesAdd"),
                ("merchandise_id", VARIANT_ID),
                ("redirect_to", "/products/bien-miches-michelada-mix"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("/products/bien-miches-michelada-mix")
    );
    let variables = app.shopify.last_variables("CartLinesAdd").await.unwrap();
    assert_eq!(variables["cartId"], CART_ID);
}

#[tokio::test]
async fn test_cart_page_lists_lines_and_badge() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond("GetCart", json!({ "cart": fixtures::cart(1, &["MICHE10"]) }))
        .await;

    let response = app.get("/cart").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Michelada Mix"));
    assert!(html.contains("Quantity: 1"));
    assert!(html.contains("<span class=\"badge\">1</span>"));
    assert!(html.contains("MICHE10"));
    assert!(html.contains(CHECKOUT_URL));
}

#[tokio::test]
async fn test_empty_cart_page() {
    let app = TestStorefront::start().await.unwrap();

    let response = app.get("/cart").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.shopify.requests("GetCart").await.is_empty());
    assert!(!response.text().await.unwrap().contains("class=\"badge\""));
}

#[tokio::test]
async fn test_discount_code_merges_with_existing_codes() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond(
            "CartDiscountCodesUpdate",
            fixtures::cart_payload(
                "cartDiscountCodesUpdate",
                fixtures::cart(1, &["LAUNCH", "MICHE10"]),
            ),
        )
        .await;

    let response = app
        .post_form(
            "/cart",
            &[
                ("cart_action", "DiscountCodesUpdate"),
                ("discount_code", " LAUNCH "),
                ("discount_codes", "MICHE10,LAUNCH"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let variables = app
        .shopify
        .last_variables("CartDiscountCodesUpdate")
        .await
        .unwrap();
    assert_eq!(variables["discountCodes"], json!(["LAUNCH", "MICHE10"]));
}

#[tokio::test]
async fn test_unknown_cart_action_is_rejected() {
    let app = TestStorefront::start().await.unwrap();

    let response = app
        .post_form("/cart", &[("cart_action", "Explode")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Explode cart action is not defined")
    );
}

#[tokio::test]
async fn test_checkout_redirects_to_shopify() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond("GetCart", json!({ "cart": fixtures::cart(1, &[]) }))
        .await;

    let response = app.get("/checkout").await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(CHECKOUT_URL));
}

#[tokio::test]
async fn test_checkout_without_cart_returns_to_cart() {
    let app = TestStorefront::start().await.unwrap();

    let response = app.get("/checkout").await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));
}

/// `cartLinesAdd` and friends when Shopify has dropped the cart.
fn expired_cart(field: &str) -> serde_json::Value {
    json!({ field: {
        "cart": null,
        "userErrors": [{
            "field": ["cartId"],
            "message": "The specified cart does not exist.",
        }],
    } })
}

#[tokio::test]
async fn test_add_to_expired_cart_starts_new_cart() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond("CartLinesAdd", expired_cart("cartLinesAdd"))
        .await;

    let response = app
        .post_form(
            "/cart",
            &[("cart_action", "LinesAdd"), ("merchandise_id", VARIANT_ID)],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));
    assert_eq!(app.shopify.requests("CartLinesAdd").await.len(), 1);
    assert_eq!(app.shopify.requests("CartCreate").await.len(), 2);
}

#[tokio::test]
async fn test_expired_cart_is_forgotten() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify.respond("GetCart", json!({ "cart": null })).await;

    let response = app.get("/cart").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.text().await.unwrap().contains("class=\"badge\""));

    let response = app.get("/cart").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.shopify.requests("GetCart").await.len(), 1);

    add_to_cart(&app).await;
    assert_eq!(app.shopify.requests("CartCreate").await.len(), 2);
    assert!(app.shopify.requests("CartLinesAdd").await.is_empty());
}

#[tokio::test]
async fn test_update_on_expired_cart_returns_to_empty_cart() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond("CartLinesUpdate", expired_cart("cartLinesUpdate"))
        .await;

    let response = app
        .post_form(
            "/cart",
            &[
                ("cart_action", "LinesUpdate"),
                ("line_id", "gid://shopify/CartLine/7c1f3b2e-1"),
                ("quantity", "2"),
                ("redirect_to", "/products/bien-miches-michelada-mix"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));

    let response = app.get("/cart").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.shopify.requests("GetCart").await.is_empty());
}

#[tokio::test]
async fn test_redirect_with_line_break_returns_to_cart() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond(
            "CartLinesAdd",
            fixtures::cart_payload("cartLinesAdd", fixtures::cart(2, &[])),
        )
        .await;

    let response = app
        .post_form(
            "/cart",
            &[
                ("cart_action", "LinesAdd"),
                ("merchandise_id", VARIANT_ID),
                ("redirect_to", "/products/mix\r\nSet-Cookie: session=x"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));
}

#[tokio::test]
async fn test_quantity_update_sends_line_and_quantity() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond(
            "CartLinesUpdate",
            fixtures::cart_payload("cartLinesUpdate", fixtures::cart(3, &[])),
        )
        .await;

    let response = app
        .post_form(
            "/cart",
            &[
                ("cart_action", "LinesUpdate"),
                ("line_id", "gid://shopify/CartLine/7c1f3b2e-1"),
                ("quantity", "3"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));
    let variables = app.shopify.last_variables("CartLinesUpdate").await.unwrap();
    assert_eq!(variables["cartId"], CART_ID);
    assert_eq!(
        variables["lines"],
        json!([{ "id": "gid://shopify/CartLine/7c1f3b2e-1", "quantity": 3 }])
    );
}

#[tokio::test]
async fn test_remove_sends_line_ids() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond(
            "CartLinesRemove",
            fixtures::cart_payload("cartLinesRemove", fixtures::cart(0, &[])),
        )
        .await;

    let response = app
        .post_form(
            "/cart",
            &[
                ("cart_action", "LinesRemove"),
                ("line_id", "gid://shopify/CartLine/7c1f3b2e-1"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let variables = app.shopify.last_variables("CartLinesRemove").await.unwrap();
    assert_eq!(variables["cartId"], CART_ID);
    assert_eq!(
        variables["lineIds"],
        json!(["gid://shopify/CartLine/7c1f3b2e-1"])
    );
}

#[tokio::test]
async fn test_rejected_mutation_rerenders_cart_with_message() {
    let app = TestStorefront::start().await.unwrap();
    add_to_cart(&app).await;
    app.shopify
        .respond(
            "CartLinesUpdate",
            json!({ "cartLinesUpdate": {
                "cart": null,
                "userErrors": [{
                    "field": ["lines", "0", "quantity"],
                    "message": "Only 4 items were added to your cart due to availability.",
                }],
            } }),
        )
        .await;
    app.shopify
        .respond("GetCart", json!({ "cart": fixtures::cart(1, &[]) }))
        .await;

    let response = app
        .post_form(
            "/cart",
            &[
                ("cart_action", "LinesUpdate"),
                ("line_id", "gid://shopify/CartLine/7c1f3b2e-1"),
                ("quantity", "40"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = response.text().await.unwrap();
    assert!(html.contains("Only 4 items were added to your cart due to availability."));
    assert!(html.contains("Michelada Mix"));
}
