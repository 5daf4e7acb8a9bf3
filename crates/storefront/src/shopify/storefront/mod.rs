//! Shopify Storefront API client implementation.
//!
//! Uses hand-declared `graphql_client` operations with `reqwest` 0.13 for
//! HTTP. Caches catalog data using `moka` (5-minute TTL); carts, customers
//! and orders always go to the API.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use bien_miches_core::{AddressId, CartId, CartLineId, CustomerId, OrderId};

use crate::config::ShopifyStorefrontConfig;
use crate::models::CustomerAccessToken;
use crate::shopify::types::{
    AddressInput, Cart, CartLineInput, CartLineUpdateInput, CollectionList, CollectionPage,
    CollectionSummary, Customer, CustomerCreateInput, CustomerUpdate, CustomerUpdateInput, Order,
    Page, Product, ProductCard, ProductVariant, SelectedOption, Shop,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

use cache::CacheValue;
use conversions::{
    convert_access_token, convert_address_input, convert_cart, convert_collection_list,
    convert_collection_page, convert_collection_summary, convert_customer, convert_order,
    convert_product, convert_product_card, convert_seo, convert_variant,
};
use queries::cart::{
    CartCreate, CartCreateVariables, CartDiscountCodesUpdate, CartDiscountCodesUpdateVariables,
    CartIdVariables, CartInputNode, CartLineInputNode, CartLineUpdateInputNode, CartLinesAdd,
    CartLinesAddVariables, CartLinesRemove, CartLinesRemoveVariables, CartLinesUpdate,
    CartLinesUpdateVariables, CartPayload, GetCart,
};
use queries::collections::{
    FeaturedCollection, GetCollection, GetCollectionVariables, GetCollections,
    GetCollectionsVariables,
};
use queries::customer::{
    AccessTokenPayload, AccessTokenVariables, CustomerAccessTokenCreate,
    CustomerAccessTokenCreateInputNode, CustomerAccessTokenCreateVariables,
    CustomerAccessTokenDelete, CustomerActivateByUrl, CustomerActivateByUrlVariables,
    CustomerAddressCreate, CustomerAddressCreateVariables, CustomerAddressDelete,
    CustomerAddressDeleteVariables, CustomerAddressUpdate, CustomerAddressUpdateVariables,
    CustomerCreate, CustomerCreateInputNode, CustomerCreateVariables,
    CustomerDefaultAddressUpdate, CustomerDefaultAddressUpdateVariables, CustomerRecover,
    CustomerRecoverVariables, CustomerResetByUrl, CustomerResetByUrlVariables, CustomerUpdate as
    CustomerUpdateMutation, CustomerUpdateInputNode, CustomerUpdateVariables, GetCustomer,
    first_message,
};
use queries::orders::{GetOrder, GetOrderVariables, OrderLookup};
use queries::pages::{GetPage, GetPageVariables};
use queries::products::{
    GetProduct, GetProductVariables, GetProductVariants, GetProductVariantsVariables,
    RecommendedProducts, SearchProducts, SearchProductsVariables,
};
use queries::shop::GetShop;
use queries::{NoVariables, SelectedOptionNode, UserError};

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone. Catalog reads are cached for 5 minutes.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<String, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.graphql_endpoint(),
                access_token: config.storefront_private_token.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header(
                "Shopify-Storefront-Private-Token",
                &self.inner.access_token,
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = request_body.operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::message(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = request_body.operation_name,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");

            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: e.locations.map_or_else(Vec::new, |locs| {
                            locs.into_iter()
                                .map(|l| GraphQLErrorLocation {
                                    line: i64::from(l.line),
                                    column: i64::from(l.column),
                                })
                                .collect()
                        }),
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation = request_body.operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::message("No data in response")
        })
    }

    // =========================================================================
    // Shop
    // =========================================================================

    /// Get the shop name and primary domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_shop(&self) -> Result<Shop, ShopifyError> {
        let data = self.execute::<GetShop>(NoVariables::default()).await?;
        Ok(Shop {
            name: data.shop.name,
            description: data.shop.description,
            primary_domain_url: data.shop.primary_domain.url,
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by handle, resolving the variant for `selected_options`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist, or an error if the
    /// API request fails.
    #[instrument(skip(self, selected_options), fields(handle = %handle))]
    pub async fn get_product(
        &self,
        handle: &str,
        selected_options: &[SelectedOption],
    ) -> Result<Product, ShopifyError> {
        let options_key = selected_options
            .iter()
            .map(|o| format!("{}={}", o.name, o.value))
            .collect::<Vec<_>>()
            .join("&");
        let cache_key = format!("product:{handle}:{options_key}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = GetProductVariables {
            handle: handle.to_string(),
            selected_options: selected_options
                .iter()
                .map(|o| SelectedOptionNode {
                    name: o.name.clone(),
                    value: o.value.clone(),
                })
                .collect(),
        };

        let data = self.execute::<GetProduct>(variables).await?;

        let product = data
            .product
            .map(convert_product)
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get every variant of a product (up to 250).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_variants(
        &self,
        handle: &str,
    ) -> Result<Vec<ProductVariant>, ShopifyError> {
        let cache_key = format!("variants:{handle}");

        if let Some(CacheValue::Variants(variants)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for variants");
            return Ok(variants);
        }

        let data = self
            .execute::<GetProductVariants>(GetProductVariantsVariables {
                handle: handle.to_string(),
            })
            .await?;

        let variants: Vec<ProductVariant> = data
            .product
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?
            .variants
            .nodes
            .into_iter()
            .map(convert_variant)
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Variants(variants.clone()))
            .await;

        Ok(variants)
    }

    /// Get the four most recently updated products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_recommended_products(&self) -> Result<Vec<ProductCard>, ShopifyError> {
        let cache_key = "recommended-products".to_string();

        if let Some(CacheValue::ProductCards(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for recommended products");
            return Ok(products);
        }

        let data = self
            .execute::<RecommendedProducts>(NoVariables::default())
            .await?;

        let products: Vec<ProductCard> = data
            .products
            .nodes
            .into_iter()
            .map(convert_product_card)
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::ProductCards(products.clone()))
            .await;

        Ok(products)
    }

    /// Search products by free-text query. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_products(
        &self,
        query: &str,
        first: i64,
    ) -> Result<Vec<ProductCard>, ShopifyError> {
        let data = self
            .execute::<SearchProducts>(SearchProductsVariables {
                query: query.to_string(),
                first,
            })
            .await?;

        Ok(data
            .products
            .nodes
            .into_iter()
            .map(convert_product_card)
            .collect())
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get the most recently updated collection, if the shop has any.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_featured_collection(
        &self,
    ) -> Result<Option<CollectionSummary>, ShopifyError> {
        let cache_key = "featured-collection".to_string();

        if let Some(CacheValue::FeaturedCollection(collection)) =
            self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for featured collection");
            return Ok(collection);
        }

        let data = self
            .execute::<FeaturedCollection>(NoVariables::default())
            .await?;

        let collection = data
            .collections
            .nodes
            .into_iter()
            .next()
            .map(convert_collection_summary);

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::FeaturedCollection(collection.clone()),
            )
            .await;

        Ok(collection)
    }

    /// Get a page of collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_collections(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<CollectionList, ShopifyError> {
        let cache_key = format!("collections:{first}:{}", after.as_deref().unwrap_or(""));

        if let Some(CacheValue::Collections(collections)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for collections");
            return Ok(collections);
        }

        let data = self
            .execute::<GetCollections>(GetCollectionsVariables { first, after })
            .await?;

        let list = convert_collection_list(data.collections);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Collections(list.clone()))
            .await;

        Ok(list)
    }

    /// Get a collection with one page of its products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the collection does not exist, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection(
        &self,
        handle: &str,
        first: i64,
        after: Option<String>,
    ) -> Result<CollectionPage, ShopifyError> {
        let cache_key = format!(
            "collection:{handle}:{first}:{}",
            after.as_deref().unwrap_or("")
        );

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(*collection);
        }

        let data = self
            .execute::<GetCollection>(GetCollectionVariables {
                handle: handle.to_string(),
                first,
                after,
            })
            .await?;

        let page = data
            .collection
            .map(convert_collection_page)
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Collection(Box::new(page.clone())))
            .await;

        Ok(page)
    }

    // =========================================================================
    // Content Methods
    // =========================================================================

    /// Get an online-store page by handle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the page does not exist, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_page(&self, handle: &str) -> Result<Page, ShopifyError> {
        let cache_key = format!("page:{handle}");

        if let Some(CacheValue::Page(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for page");
            return Ok(*page);
        }

        let data = self
            .execute::<GetPage>(GetPageVariables {
                handle: handle.to_string(),
            })
            .await?;

        let page = data
            .page
            .map(|p| Page {
                id: p.id,
                title: p.title,
                body: p.body,
                seo: convert_seo(p.seo),
            })
            .ok_or_else(|| ShopifyError::NotFound(format!("Page not found: {handle}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Page(Box::new(page.clone())))
            .await;

        Ok(page)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the joined user errors, or an error if the
    /// API request fails.
    #[instrument(skip(self, lines))]
    pub async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CartCreate>(CartCreateVariables {
                input: CartInputNode {
                    lines: lines.into_iter().map(line_input).collect(),
                },
            })
            .await?;

        cart_from_payload(data.cart_create, "create cart")
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the cart no longer exists, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<GetCart>(CartIdVariables {
                cart_id: cart_id.to_string(),
            })
            .await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when Shopify no longer knows the cart, `UserError`
    /// with the joined user errors, or an error if the API request fails.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CartLinesAdd>(CartLinesAddVariables {
                cart_id: cart_id.to_string(),
                lines: lines.into_iter().map(line_input).collect(),
            })
            .await?;

        cart_from_payload(data.cart_lines_add, "add to cart")
    }

    /// Change line quantities.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when Shopify no longer knows the cart, `UserError`
    /// with the joined user errors, or an error if the API request fails.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CartLinesUpdate>(CartLinesUpdateVariables {
                cart_id: cart_id.to_string(),
                lines: lines
                    .into_iter()
                    .map(|line| CartLineUpdateInputNode {
                        id: line.id.into_inner(),
                        quantity: line.quantity,
                    })
                    .collect(),
            })
            .await?;

        cart_from_payload(data.cart_lines_update, "update cart")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when Shopify no longer knows the cart, `UserError`
    /// with the joined user errors, or an error if the API request fails.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_cart_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CartLinesRemove>(CartLinesRemoveVariables {
                cart_id: cart_id.to_string(),
                line_ids: line_ids.into_iter().map(CartLineId::into_inner).collect(),
            })
            .await?;

        cart_from_payload(data.cart_lines_remove, "remove from cart")
    }

    /// Replace the cart's discount codes. An empty list removes all codes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when Shopify no longer knows the cart, `UserError`
    /// with the joined user errors, or an error if the API request fails.
    #[instrument(skip(self, discount_codes), fields(cart_id = %cart_id))]
    pub async fn update_discount_codes(
        &self,
        cart_id: &CartId,
        discount_codes: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CartDiscountCodesUpdate>(CartDiscountCodesUpdateVariables {
                cart_id: cart_id.to_string(),
                discount_codes,
            })
            .await?;

        cart_from_payload(data.cart_discount_codes_update, "update discount codes")
    }

    // =========================================================================
    // Customer Methods (not cached)
    // =========================================================================

    /// Exchange email and password for a customer access token.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error (for example
    /// "Unidentified customer"), or an error if the API request fails.
    #[instrument(skip(self, email, password))]
    pub async fn create_access_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        let data = self
            .execute::<CustomerAccessTokenCreate>(CustomerAccessTokenCreateVariables {
                input: CustomerAccessTokenCreateInputNode {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            })
            .await?;

        token_from_payload(data.customer_access_token_create, "Missing access token")
    }

    /// Invalidate a customer access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or Shopify reports a user error.
    #[instrument(skip(self, access_token))]
    pub async fn delete_access_token(&self, access_token: &str) -> Result<(), ShopifyError> {
        let data = self
            .execute::<CustomerAccessTokenDelete>(AccessTokenVariables {
                customer_access_token: access_token.to_string(),
            })
            .await?;

        if let Some(error) = data
            .customer_access_token_delete
            .and_then(|p| p.user_errors.into_iter().next())
        {
            return Err(ShopifyError::UserError(error.message));
        }
        Ok(())
    }

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error (for example
    /// "Email has already been taken"), or an error if the API request fails.
    #[instrument(skip(self, input))]
    pub async fn create_customer(
        &self,
        input: CustomerCreateInput,
    ) -> Result<CustomerId, ShopifyError> {
        let data = self
            .execute::<CustomerCreate>(CustomerCreateVariables {
                input: CustomerCreateInputNode {
                    email: input.email,
                    password: input.password,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    accepts_marketing: input.accepts_marketing,
                },
            })
            .await?;

        let payload = data
            .customer_create
            .ok_or_else(|| ShopifyError::UserError("Could not create customer".to_string()))?;
        if let Some(message) = first_message(&payload.customer_user_errors) {
            return Err(ShopifyError::UserError(message));
        }
        payload
            .customer
            .map(|c| CustomerId::new(c.id))
            .ok_or_else(|| ShopifyError::UserError("Could not create customer".to_string()))
    }

    /// Get the signed-in customer's profile, addresses and recent orders.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the token no longer identifies a customer, or
    /// an error if the API request fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_customer(&self, access_token: &str) -> Result<Customer, ShopifyError> {
        let data = self
            .execute::<GetCustomer>(AccessTokenVariables {
                customer_access_token: access_token.to_string(),
            })
            .await?;

        data.customer
            .map(convert_customer)
            .ok_or_else(|| ShopifyError::NotFound("Customer not found".to_string()))
    }

    /// Update the customer's profile.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error, or an error
    /// if the API request fails.
    #[instrument(skip(self, access_token, input))]
    pub async fn update_customer(
        &self,
        access_token: &str,
        input: CustomerUpdateInput,
    ) -> Result<CustomerUpdate, ShopifyError> {
        let data = self
            .execute::<CustomerUpdateMutation>(CustomerUpdateVariables {
                customer_access_token: access_token.to_string(),
                customer: CustomerUpdateInputNode {
                    first_name: input.first_name,
                    last_name: input.last_name,
                    email: input.email,
                    phone: input.phone,
                    accepts_marketing: input.accepts_marketing,
                    password: input.password,
                },
            })
            .await?;

        let payload = data
            .customer_update
            .ok_or_else(|| ShopifyError::message("Failed to update customer"))?;
        if let Some(message) = first_message(&payload.customer_user_errors) {
            return Err(ShopifyError::UserError(message));
        }
        let customer = payload
            .customer
            .map(convert_customer)
            .ok_or_else(|| ShopifyError::message("Failed to update customer"))?;

        Ok(CustomerUpdate {
            customer,
            access_token: payload.customer_access_token.map(convert_access_token),
        })
    }

    /// Add an address to the customer's address book.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error, or an error
    /// if the API request fails.
    #[instrument(skip(self, access_token, address))]
    pub async fn create_address(
        &self,
        access_token: &str,
        address: AddressInput,
    ) -> Result<AddressId, ShopifyError> {
        let data = self
            .execute::<CustomerAddressCreate>(CustomerAddressCreateVariables {
                address: convert_address_input(address),
                customer_access_token: access_token.to_string(),
            })
            .await?;

        let payload = data.customer_address_create.ok_or_else(|| {
            ShopifyError::UserError(
                "Expected customer address to be created, but the id is missing".to_string(),
            )
        })?;
        if let Some(message) = first_message(&payload.customer_user_errors) {
            return Err(ShopifyError::UserError(message));
        }
        payload
            .customer_address
            .map(|a| AddressId::new(a.id))
            .ok_or_else(|| {
                ShopifyError::UserError(
                    "Expected customer address to be created, but the id is missing".to_string(),
                )
            })
    }

    /// Replace the fields of an existing address.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error, or an error
    /// if the API request fails.
    #[instrument(skip(self, access_token, address), fields(address_id = %address_id))]
    pub async fn update_address(
        &self,
        access_token: &str,
        address_id: &AddressId,
        address: AddressInput,
    ) -> Result<AddressId, ShopifyError> {
        let data = self
            .execute::<CustomerAddressUpdate>(CustomerAddressUpdateVariables {
                address: convert_address_input(address),
                customer_access_token: access_token.to_string(),
                id: address_id.to_string(),
            })
            .await?;

        let payload = data
            .customer_address_update
            .ok_or_else(|| ShopifyError::message("Failed to update address"))?;
        if let Some(message) = first_message(&payload.customer_user_errors) {
            return Err(ShopifyError::UserError(message));
        }
        Ok(payload
            .customer_address
            .map_or_else(|| address_id.clone(), |a| AddressId::new(a.id)))
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error, or an error
    /// if the API request fails.
    #[instrument(skip(self, access_token), fields(address_id = %address_id))]
    pub async fn delete_address(
        &self,
        access_token: &str,
        address_id: &AddressId,
    ) -> Result<(), ShopifyError> {
        let data = self
            .execute::<CustomerAddressDelete>(CustomerAddressDeleteVariables {
                customer_access_token: access_token.to_string(),
                id: address_id.to_string(),
            })
            .await?;

        if let Some(message) = data
            .customer_address_delete
            .and_then(|p| first_message(&p.customer_user_errors))
        {
            return Err(ShopifyError::UserError(message));
        }
        Ok(())
    }

    /// Make an address the customer's default.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error, or an error
    /// if the API request fails.
    #[instrument(skip(self, access_token), fields(address_id = %address_id))]
    pub async fn set_default_address(
        &self,
        access_token: &str,
        address_id: &AddressId,
    ) -> Result<(), ShopifyError> {
        let data = self
            .execute::<CustomerDefaultAddressUpdate>(CustomerDefaultAddressUpdateVariables {
                address_id: address_id.to_string(),
                customer_access_token: access_token.to_string(),
            })
            .await?;

        if let Some(message) = data
            .customer_default_address_update
            .and_then(|p| first_message(&p.customer_user_errors))
        {
            return Err(ShopifyError::UserError(message));
        }
        Ok(())
    }

    /// Get one order by its global id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("Order not found")` when the id does not resolve to
    /// an order, or an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, ShopifyError> {
        let data = self
            .execute::<GetOrder>(GetOrderVariables {
                order_id: order_id.to_string(),
            })
            .await?;

        match data.order {
            Some(OrderLookup::Order(order)) => Ok(convert_order(*order)),
            _ => Err(ShopifyError::NotFound("Order not found".to_string())),
        }
    }

    /// Send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error, or an error
    /// if the API request fails.
    #[instrument(skip(self, email))]
    pub async fn recover_customer(&self, email: &str) -> Result<(), ShopifyError> {
        let data = self
            .execute::<CustomerRecover>(CustomerRecoverVariables {
                email: email.to_string(),
            })
            .await?;

        if let Some(message) = data
            .customer_recover
            .and_then(|p| first_message(&p.customer_user_errors))
        {
            return Err(ShopifyError::UserError(message));
        }
        Ok(())
    }

    /// Set a new password from the emailed reset link.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error, or an error
    /// if the API request fails.
    #[instrument(skip(self, reset_url, password))]
    pub async fn reset_customer_by_url(
        &self,
        reset_url: &str,
        password: &str,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        let data = self
            .execute::<CustomerResetByUrl>(CustomerResetByUrlVariables {
                reset_url: reset_url.to_string(),
                password: password.to_string(),
            })
            .await?;

        token_from_payload(data.customer_reset_by_url, "Missing access token")
    }

    /// Activate an invited account and set its password.
    ///
    /// # Errors
    ///
    /// Returns `UserError` with the first customer user error, or an error
    /// if the API request fails.
    #[instrument(skip(self, activation_url, password))]
    pub async fn activate_customer_by_url(
        &self,
        activation_url: &str,
        password: &str,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        let data = self
            .execute::<CustomerActivateByUrl>(CustomerActivateByUrlVariables {
                activation_url: activation_url.to_string(),
                password: password.to_string(),
            })
            .await?;

        token_from_payload(data.customer_activate_by_url, "Missing access token")
    }
}

fn line_input(line: CartLineInput) -> CartLineInputNode {
    CartLineInputNode {
        merchandise_id: line.merchandise_id.into_inner(),
        quantity: line.quantity,
    }
}

/// Unwrap a cart mutation payload: user errors first, then the cart.
fn cart_from_payload(payload: Option<CartPayload>, action: &str) -> Result<Cart, ShopifyError> {
    if let Some(result) = payload {
        if result.cart.is_none()
            && let Some(error) = result.user_errors.iter().find(|e| names_cart_id(e))
        {
            return Err(ShopifyError::NotFound(error.message.clone()));
        }

        if !result.user_errors.is_empty() {
            return Err(ShopifyError::UserError(
                result
                    .user_errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            ));
        }

        if let Some(cart) = result.cart {
            return Ok(convert_cart(cart));
        }
    }

    Err(ShopifyError::message(format!("Failed to {action}")))
}

/// Shopify reports an expired or unknown cart as a user error on `cartId`.
fn names_cart_id(error: &UserError) -> bool {
    error
        .field
        .as_deref()
        .is_some_and(|field| field.iter().any(|f| f == "cartId"))
}

/// Unwrap a payload that carries a new customer access token.
fn token_from_payload(
    payload: Option<AccessTokenPayload>,
    missing: &str,
) -> Result<CustomerAccessToken, ShopifyError> {
    let payload = payload.ok_or_else(|| ShopifyError::UserError(missing.to_string()))?;
    if let Some(message) = first_message(&payload.customer_user_errors) {
        return Err(ShopifyError::UserError(message));
    }
    payload
        .customer_access_token
        .map(convert_access_token)
        .ok_or_else(|| ShopifyError::UserError(missing.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_from_payload_joins_user_errors() {
        let payload = CartPayload {
            cart: None,
            user_errors: vec![
                UserError {
                    field: Some(vec!["lines".into()]),
                    message: "Quantity too high".into(),
                },
                UserError {
                    field: None,
                    message: "Variant sold out".into(),
                },
            ],
        };
        let err = cart_from_payload(Some(payload), "add to cart").unwrap_err();
        assert!(
            matches!(err, ShopifyError::UserError(ref m) if m == "Quantity too high; Variant sold out")
        );
    }

    #[test]
    fn test_cart_from_payload_unknown_cart_is_not_found() {
        let payload = CartPayload {
            cart: None,
            user_errors: vec![UserError {
                field: Some(vec!["cartId".into()]),
                message: "The specified cart does not exist.".into(),
            }],
        };
        let err = cart_from_payload(Some(payload), "add to cart").unwrap_err();
        assert!(matches!(err, ShopifyError::NotFound(_)));
    }

    #[test]
    fn test_cart_from_payload_missing_cart() {
        let err = cart_from_payload(None, "update cart").unwrap_err();
        assert_eq!(err.user_message(), "Failed to update cart");
    }

    #[test]
    fn test_token_from_payload_missing_token() {
        let payload = AccessTokenPayload {
            customer_access_token: None,
            customer_user_errors: vec![],
        };
        let err = token_from_payload(Some(payload), "Missing access token").unwrap_err();
        assert_eq!(err.user_message(), "Missing access token");
    }
}
