//! Registration, password recovery, reset and activation.

#![allow(clippy::unwrap_used)]

use bien_miches_integration_tests::{
    TestStorefront,
    fixtures::{self, ACCESS_TOKEN, CUSTOMER_EMAIL},
    location,
};
use reqwest::StatusCode;
use serde_json::json;

const RESET_PATH: &str = "/account/reset/7001234/c2f9a1e4b7";
const ACTIVATE_PATH: &str = "/account/activate/7001234/9b3e0d72aa";

fn customer_user_error(code: &str, message: &str) -> serde_json::Value {
    json!([{ "code": code, "field": null, "message": message }])
}

#[tokio::test]
async fn test_register_creates_customer_then_signs_in() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "CustomerCreate",
            json!({ "customerCreate": {
                "customer": { "id": "gid://shopify/Customer/7001234" },
                "customerUserErrors": [],
            } }),
        )
        .await;
    app.shopify
        .respond(
            "CustomerAccessTokenCreate",
            fixtures::access_token_created(ACCESS_TOKEN),
        )
        .await;

    let response = app
        .post_form(
            "/account/login",
            &[
                ("_action", "register"),
                ("email", CUSTOMER_EMAIL),
                ("password", "salsa valentina"),
                ("password_confirm", "salsa valentina"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/account"));

    let created = app.shopify.last_variables("CustomerCreate").await.unwrap();
    assert_eq!(created["input"]["email"], CUSTOMER_EMAIL);
    assert_eq!(created["input"]["password"], "salsa valentina");
    let signed_in = app
        .shopify
        .last_variables("CustomerAccessTokenCreate")
        .await
        .unwrap();
    assert_eq!(signed_in["input"]["password"], "salsa valentina");

    let response = app.get("/account").await.unwrap();
    assert_eq!(location(&response), Some("/account/orders"));
}

#[tokio::test]
async fn test_register_with_taken_email_stays_signed_out() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "CustomerCreate",
            json!({ "customerCreate": {
                "customer": null,
                "customerUserErrors": customer_user_error("TAKEN", "Email has already been taken"),
            } }),
        )
        .await;

    let response = app
        .post_form(
            "/account/login",
            &[
                ("_action", "register"),
                ("email", CUSTOMER_EMAIL),
                ("password", "salsa valentina"),
                ("password_confirm", "salsa valentina"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Email has already been taken")
    );
    assert!(
        app.shopify
            .requests("CustomerAccessTokenCreate")
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn test_register_requires_matching_passwords() {
    let app = TestStorefront::start().await.unwrap();

    let response = app
        .post_form(
            "/account/login",
            &[
                ("_action", "register"),
                ("email", CUSTOMER_EMAIL),
                ("password", "salsa valentina"),
                ("password_confirm", "salsa huichol"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Passwords do not match"));
    assert!(app.shopify.requests("CustomerCreate").await.is_empty());
}

#[tokio::test]
async fn test_recover_message_does_not_reveal_unknown_email() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "CustomerRecover",
            json!({ "customerRecover": {
                "customerUserErrors": customer_user_error(
                    "UNIDENTIFIED_CUSTOMER",
                    "Could not find customer",
                ),
            } }),
        )
        .await;

    let response = app
        .post_form("/account/recover", &[("email", " nobody@example.com ")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("If that email address is in our system"));
    assert!(!html.contains("Could not find customer"));

    let variables = app.shopify.last_variables("CustomerRecover").await.unwrap();
    assert_eq!(variables["email"], "nobody@example.com");
}

#[tokio::test]
async fn test_recover_requires_email() {
    let app = TestStorefront::start().await.unwrap();

    let response = app
        .post_form("/account/recover", &[("email", "")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Please provide an email."));
    assert!(app.shopify.requests("CustomerRecover").await.is_empty());
}

#[tokio::test]
async fn test_reset_sends_link_on_this_site_and_signs_in() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "CustomerResetByUrl",
            json!({ "customerResetByUrl": {
                "customerAccessToken": {
                    "accessToken": ACCESS_TOKEN,
                    "expiresAt": "2030-01-01T00:00:00Z",
                },
                "customerUserErrors": [],
            } }),
        )
        .await;

    let page = app.get(RESET_PATH).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(
        page.text()
            .await
            .unwrap()
            .contains(&format!("action=\"{RESET_PATH}\""))
    );

    let response = app
        .post_form(
            RESET_PATH,
            &[("password", "chamoy y limon"), ("password_confirm", "chamoy y limon")],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/account"));
    let variables = app
        .shopify
        .last_variables("CustomerResetByUrl")
        .await
        .unwrap();
    assert_eq!(variables["resetUrl"], app.url(RESET_PATH));
    assert_eq!(variables["password"], "chamoy y limon");

    let response = app.get("/account").await.unwrap();
    assert_eq!(location(&response), Some("/account/orders"));
}

#[tokio::test]
async fn test_rejected_activation_rerenders_form() {
    let app = TestStorefront::start().await.unwrap();
    app.shopify
        .respond(
            "CustomerActivateByUrl",
            json!({ "customerActivateByUrl": {
                "customerAccessToken": null,
                "customerUserErrors": customer_user_error("TOKEN_INVALID", "Invalid activation url"),
            } }),
        )
        .await;

    let response = app
        .post_form(
            ACTIVATE_PATH,
            &[("password", "tajin everywhere"), ("password_confirm", "tajin everywhere")],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = response.text().await.unwrap();
    assert!(html.contains("Invalid activation url"));
    assert!(html.contains("Activate Account"));

    let variables = app
        .shopify
        .last_variables("CustomerActivateByUrl")
        .await
        .unwrap();
    assert_eq!(variables["activationUrl"], app.url(ACTIVATE_PATH));

    let response = app.get("/account").await.unwrap();
    assert_eq!(location(&response), Some("/account/login"));
}

#[tokio::test]
async fn test_activation_requires_matching_passwords() {
    let app = TestStorefront::start().await.unwrap();

    let response = app
        .post_form(
            ACTIVATE_PATH,
            &[("password", "tajin everywhere"), ("password_confirm", "tajin")],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Passwords do not match"));
    assert!(
        app.shopify
            .requests("CustomerActivateByUrl")
            .await
            .is_empty()
    );
}
