//! Product detail pages.

#![allow(clippy::unwrap_used)]

use bien_miches_integration_tests::{
    TestStorefront,
    fixtures::{self, PRODUCT_HANDLE},
    location,
};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_product_without_selection_redirects_to_first_variant() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond("GetProduct", json!({ "product": fixtures::product(None) }))
        .await;
    app.shopify
        .respond("GetProductVariants", fixtures::product_variants())
        .await;

    let response = app
        .get(&format!("/products/{PRODUCT_HANDLE}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        Some("/products/bien-miches-michelada-mix?Size=32+oz")
    );
}

#[tokio::test]
async fn test_product_renders_selected_variant() {
    let app = TestStorefront::start().await.unwrap();
    let selected = fixtures::variants().remove(0);
    app.shopify
        .respond(
            "GetProduct",
            json!({ "product": fixtures::product(Some(selected)) }),
        )
        .await;
    app.shopify
        .respond("GetProductVariants", fixtures::product_variants())
        .await;

    let response = app
        .get(&format!("/products/{PRODUCT_HANDLE}?Size=32+oz"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Michelada Mix"));
    assert!(html.contains("Add to cart"));
    assert!(html.contains(fixtures::VARIANT_ID));
    assert!(html.contains("<strong>michelada</strong>"));

    let variables = app.shopify.last_variables("GetProduct").await.unwrap();
    assert_eq!(
        variables["selectedOptions"],
        json!([{ "name": "Size", "value": "32 oz" }])
    );
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond("GetProduct", json!({ "product": null }))
        .await;
    app.shopify
        .respond("GetProductVariants", json!({ "product": null }))
        .await;

    let response = app.get("/products/no-such-thing").await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
