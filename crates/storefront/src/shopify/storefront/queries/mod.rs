//! GraphQL operation definitions for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] through
//! `storefront_operation!`. Documents are assembled at compile time with
//! `concat!` from fragment macros, so every operation ships exactly the
//! fragments it spreads.
//!
//! Wire types mirror the selection sets field-for-field and are converted to
//! domain types in `conversions`.
//!
//! [`GraphQLQuery`]: graphql_client::GraphQLQuery

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Declare an operation type implementing `graphql_client::GraphQLQuery`.
macro_rules! storefront_operation {
    (
        $(#[$meta:meta])*
        $name:ident {
            operation: $operation:literal,
            document: $document:expr,
            variables: $variables:ty,
            response: $response:ty $(,)?
        }
    ) => {
        $(#[$meta])*
        pub struct $name;

        impl ::graphql_client::GraphQLQuery for $name {
            type Variables = $variables;
            type ResponseData = $response;

            fn build_query(
                variables: Self::Variables,
            ) -> ::graphql_client::QueryBody<Self::Variables> {
                ::graphql_client::QueryBody {
                    variables,
                    query: $document,
                    operation_name: $operation,
                }
            }
        }
    };
}

macro_rules! money_fields {
    () => {
        "amount currencyCode"
    };
}

macro_rules! image_fields {
    () => {
        "url altText width height"
    };
}

/// `ProductCardFields` fragment shared by grids.
macro_rules! product_card_fragment {
    () => {
        concat!(
            "fragment ProductCardFields on Product {
  id
  title
  handle
  priceRange { minVariantPrice { ",
            money_fields!(),
            " } }
  images(first: 1) { nodes { ",
            image_fields!(),
            " } }
}
"
        )
    };
}

/// `AddressFields` fragment shared by the customer and order queries.
macro_rules! address_fragment {
    () => {
        "fragment AddressFields on MailingAddress {
  id
  name
  firstName
  lastName
  company
  address1
  address2
  city
  province
  country
  zip
  phone
  formatted
}
"
    };
}

pub mod cart;
pub mod collections;
pub mod customer;
pub mod orders;
pub mod pages;
pub mod products;
pub mod shop;

// =============================================================================
// Shared wire types
// =============================================================================

/// Variables for operations that take none.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoVariables {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    pub amount: Decimal,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Nodes<T> {
    pub nodes: Vec<T>,
}

impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoNode {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeoNode {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectedOptionNode {
    pub name: String,
    pub value: String,
}

/// `CartUserError` and friends.
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// `CustomerUserError`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerUserError {
    pub code: Option<String>,
    pub field: Option<Vec<String>>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressNode {
    pub id: String,
    pub name: Option<String>,
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
    #[serde(default)]
    pub formatted: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccessTokenNode {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use graphql_client::GraphQLQuery;

    use super::*;

    #[test]
    fn test_query_body_serializes_operation_name() {
        let body = shop::GetShop::build_query(NoVariables::default());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["operationName"], "GetShop");
        assert_eq!(json["variables"], serde_json::json!({}));
        assert!(json["query"].as_str().unwrap().contains("primaryDomain"));
    }

    #[test]
    fn test_documents_include_spread_fragments() {
        let body = cart::CartLinesAdd::build_query(cart::CartLinesAddVariables {
            cart_id: "gid://shopify/Cart/1".into(),
            lines: vec![],
        });
        assert!(body.query.contains("...CartFields"));
        assert!(body.query.contains("fragment CartFields on Cart"));

        let body = products::GetProduct::build_query(products::GetProductVariables {
            handle: "mix".into(),
            selected_options: vec![],
        });
        assert!(body.query.contains("fragment ProductVariantFields on ProductVariant"));
        assert!(body.query.contains("variantBySelectedOptions"));
    }

    #[test]
    fn test_money_deserializes_decimal_strings() {
        let money: MoneyV2 =
            serde_json::from_str(r#"{"amount":"12.50","currencyCode":"USD"}"#).unwrap();
        assert_eq!(money.amount.to_string(), "12.50");
    }
}
