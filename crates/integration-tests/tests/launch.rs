//! Launch landing page, calendar download and sign-up.

#![allow(clippy::unwrap_used)]

use bien_miches_integration_tests::TestStorefront;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_launch_page_shows_event_details() {
    let app = TestStorefront::start().await.unwrap();

    let response = app.get("/").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains("FREE DRINK!"));
    assert!(html.contains("SAT, 9/16/23 @ 5pm"));
    assert!(html.contains("id=\"countdown\""));
    assert!(html.contains("/launch/calendar.ics"));
}

#[tokio::test]
async fn test_calendar_is_an_attachment() {
    let app = TestStorefront::start().await.unwrap();

    let response = app.get("/launch/calendar.ics").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));

    let ics = response.text().await.unwrap();
    assert!(ics.contains("BEGIN:VEVENT"));
    assert!(ics.contains("DTSTART:20230917T000000Z"));
    assert!(ics.trim_end().ends_with("END:VCALENDAR"));
}

#[tokio::test]
async fn test_subscribe_rejects_invalid_email() {
    let app = TestStorefront::start().await.unwrap();

    let response = app
        .post_form("/launch/subscribe", &[("email", "not-an-email")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("valid email address"));
    assert!(app.shopify.requests("CustomerCreate").await.is_empty());
}

#[tokio::test]
async fn test_subscribe_creates_marketing_customer() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "CustomerCreate",
            json!({ "customerCreate": {
                "customer": { "id": "gid://shopify/Customer/7009999" },
                "customerUserErrors": [],
            } }),
        )
        .await;

    let response = app
        .post_form("/launch/subscribe", &[("email", " Fan@Example.com ")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("on the list"));

    let variables = app.shopify.last_variables("CustomerCreate").await.unwrap();
    assert_eq!(variables["input"]["acceptsMarketing"], true);
    assert_eq!(variables["input"]["email"], "Fan@example.com");
    assert!(variables["input"]["password"].as_str().unwrap().len() >= 5);
}

#[tokio::test]
async fn test_subscribe_existing_customer_counts_as_success() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "CustomerCreate",
            json!({ "customerCreate": {
                "customer": null,
                "customerUserErrors": [{
                    "code": "TAKEN",
                    "field": ["input", "email"],
                    "message": "Email has already been taken",
                }],
            } }),
        )
        .await;

    let response = app
        .post_form("/launch/subscribe", &[("email", "fan@example.com")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("on the list"));
}
