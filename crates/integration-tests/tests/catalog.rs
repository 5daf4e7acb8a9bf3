//! Collections, search and online-store pages.

#![allow(clippy::unwrap_used)]

use bien_miches_integration_tests::{TestStorefront, fixtures};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_collections_index_links_collections_and_next_page() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "GetCollections",
            json!({ "collections": {
                "nodes": [fixtures::collection()],
                "pageInfo": fixtures::page_info(Some("cursor-12")),
            } }),
        )
        .await;

    let response = app.get("/collections").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("href=\"/collections/mixers\""));
    assert!(html.contains("Everything you need for a proper michelada."));
    assert!(html.contains("/collections?after=cursor-12"));

    let variables = app.shopify.last_variables("GetCollections").await.unwrap();
    assert_eq!(variables["first"], 12);
    assert_eq!(variables["after"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_collection_page_lists_products() {
    let app = TestStorefront::start().await.unwrap();
    let mut collection = fixtures::collection();
    collection["descriptionHtml"] = json!("<p>Everything for a <strong>michelada</strong>.</p>");
    collection["products"] = json!({
        "nodes": [fixtures::product_card()],
        "pageInfo": fixtures::page_info(None),
    });
    app.shopify
        .respond("GetCollection", json!({ "collection": collection }))
        .await;

    let response = app.get("/collections/mixers?after=cursor-12").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("<h1>Mixers</h1>"));
    assert!(html.contains("<strong>michelada</strong>"));
    assert!(html.contains("/products/bien-miches-michelada-mix"));
    assert!(!html.contains("pagination__next"));

    let variables = app.shopify.last_variables("GetCollection").await.unwrap();
    assert_eq!(variables["handle"], "mixers");
    assert_eq!(variables["after"], "cursor-12");
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond("GetCollection", json!({ "collection": null }))
        .await;

    let response = app.get("/collections/hot-sauces").await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_sends_trimmed_query() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "SearchProducts",
            json!({ "products": { "nodes": [fixtures::product_card()] } }),
        )
        .await;

    let response = app.get("/search?q=%20michelada%20").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Michelada Mix"));
    assert!(html.contains("value=\"michelada\""));

    let variables = app.shopify.last_variables("SearchProducts").await.unwrap();
    assert_eq!(variables["query"], "michelada");
    assert_eq!(variables["first"], 24);
}

#[tokio::test]
async fn test_empty_search_skips_shopify() {
    let app = TestStorefront::start().await.unwrap();

    let response = app.get("/search?q=++").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.shopify.requests("SearchProducts").await.is_empty());
}

#[tokio::test]
async fn test_search_without_results() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond("SearchProducts", json!({ "products": { "nodes": [] } }))
        .await;

    let response = app.get("/search?q=tequila").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("No results for"));
}

#[tokio::test]
async fn test_contact_page_shows_title_and_contact_details() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "GetPage",
            json!({ "page": fixtures::page("contact", "Contact", Some("Contact Bien Miches")) }),
        )
        .await;

    let response = app.get("/pages/contact").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("<h1>Contact</h1>"));
    assert!(html.contains("<title>Contact Bien Miches | Bien Miches</title>"));
    assert!(html.contains("help@bienmiches.com"));
    assert!(html.contains("<em>Santa Cruz</em>"));

    let variables = app.shopify.last_variables("GetPage").await.unwrap();
    assert_eq!(variables["handle"], "contact");
}

#[tokio::test]
async fn test_pages_are_cached() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "GetPage",
            json!({ "page": fixtures::page("about", "About Us", None) }),
        )
        .await;

    for _ in 0..2 {
        let response = app.get("/pages/about").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.text().await.unwrap().contains("<h1>About Us</h1>"));
    }

    assert_eq!(app.shopify.requests("GetPage").await.len(), 1);
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify.respond("GetPage", json!({ "page": null })).await;

    let contact = app.get("/pages/contact").await.unwrap();
    let other = app.get("/pages/wholesale").await.unwrap();

    assert_eq!(contact.status(), StatusCode::NOT_FOUND);
    assert_eq!(other.status(), StatusCode::NOT_FOUND);
}
