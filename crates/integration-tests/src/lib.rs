//! End-to-end tests for the Bien Miches storefront.
//!
//! Each test starts the real storefront router on a random port, backed by
//! an in-memory session store and a fake Shopify Storefront API. The fake
//! answers by `operationName` with canned JSON and records every request so
//! tests can assert on the variables the storefront sent.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bien-miches-integration-tests
//! ```
//!
//! No database or Shopify credentials are needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod fixtures;

use std::collections::HashMap;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_sessions::MemoryStore;

use bien_miches_storefront::{build_router, config::StorefrontConfig, state::AppState};

/// Path the fake Storefront API listens on.
const GRAPHQL_PATH: &str = "/api/2026-01/graphql.json";

/// One request received by the fake Storefront API.
#[derive(Debug, Clone)]
pub struct RecordedOperation {
    pub operation_name: String,
    pub variables: Value,
    /// `Shopify-Storefront-Private-Token` header, if sent.
    pub private_token: Option<String>,
}

#[derive(Default)]
struct FakeShopifyState {
    responses: HashMap<String, Value>,
    requests: Vec<RecordedOperation>,
}

/// Fake Shopify Storefront API.
#[derive(Clone)]
pub struct FakeShopify {
    inner: Arc<Mutex<FakeShopifyState>>,
    endpoint: String,
}

impl FakeShopify {
    /// Start the fake on a random local port.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let inner = Arc::new(Mutex::new(FakeShopifyState::default()));
        let app = Router::new()
            .route(GRAPHQL_PATH, post(graphql))
            .with_state(Arc::clone(&inner));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log_server_error(&e);
            }
        });

        Ok(Self {
            inner,
            endpoint: format!("http://{addr}{GRAPHQL_PATH}"),
        })
    }

    /// GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Answer `operation` with `{"data": data}`.
    pub async fn respond(&self, operation: &str, data: Value) {
        self.respond_raw(operation, json!({ "data": data })).await;
    }

    /// Answer `operation` with a complete GraphQL response body.
    pub async fn respond_raw(&self, operation: &str, body: Value) {
        self.inner
            .lock()
            .await
            .responses
            .insert(operation.to_string(), body);
    }

    /// Requests received for `operation`, oldest first.
    pub async fn requests(&self, operation: &str) -> Vec<RecordedOperation> {
        self.inner
            .lock()
            .await
            .requests
            .iter()
            .filter(|request| request.operation_name == operation)
            .cloned()
            .collect()
    }

    /// Variables of the most recent `operation` request.
    pub async fn last_variables(&self, operation: &str) -> Option<Value> {
        self.requests(operation)
            .await
            .pop()
            .map(|request| request.variables)
    }
}

#[allow(clippy::print_stderr)]
fn log_server_error(error: &dyn Error) {
    eprintln!("test server stopped: {error}");
}

async fn graphql(
    State(state): State<Arc<Mutex<FakeShopifyState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let operation_name = body
        .get("operationName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let variables = body.get("variables").cloned().unwrap_or(Value::Null);
    let private_token = headers
        .get("shopify-storefront-private-token")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut state = state.lock().await;
    state.requests.push(RecordedOperation {
        operation_name: operation_name.clone(),
        variables,
        private_token,
    });

    Json(state.responses.get(&operation_name).cloned().unwrap_or_else(|| {
        json!({ "errors": [{ "message": format!("No fake response for {operation_name}") }] })
    }))
}

/// A running storefront wired to a [`FakeShopify`].
pub struct TestStorefront {
    pub shopify: FakeShopify,
    /// Cookie-keeping client that does not follow redirects.
    pub client: reqwest::Client,
    base_url: String,
}

impl TestStorefront {
    /// Start a storefront and its fake Storefront API.
    ///
    /// # Errors
    ///
    /// Returns an error if a port cannot be bound or the state cannot be
    /// built.
    pub async fn start() -> Result<Self, Box<dyn Error>> {
        let shopify = FakeShopify::start().await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let config = StorefrontConfig::local(&base_url, shopify.endpoint());
        let state = AppState::new(config)?;
        let app = build_router(state, MemoryStore::default());

        tokio::spawn(async move {
            let service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, service).await {
                log_server_error(&e);
            }
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            shopify,
            client,
            base_url,
        })
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(self.url(path)).send().await
    }

    /// POST `form` to `path` as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> reqwest::Result<reqwest::Response> {
        self.client.post(self.url(path)).form(form).send().await
    }

    /// Sign in as the fixture customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sign_in(&self) -> reqwest::Result<reqwest::Response> {
        self.shopify
            .respond(
                "CustomerAccessTokenCreate",
                fixtures::access_token_created(fixtures::ACCESS_TOKEN),
            )
            .await;
        self.shopify
            .respond("GetCustomer", json!({ "customer": fixtures::customer() }))
            .await;

        self.post_form(
            "/account/login",
            &[
                ("_action", "sign-in"),
                ("email", fixtures::CUSTOMER_EMAIL),
                ("password", "correct horse battery"),
            ],
        )
        .await
    }
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
