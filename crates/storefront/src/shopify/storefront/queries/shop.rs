//! Shop metadata.

use serde::Deserialize;

use super::NoVariables;

const GET_SHOP: &str = "query GetShop {
  shop {
    name
    description
    primaryDomain { url }
  }
}";

storefront_operation! {
    /// `shop` query, used to verify credentials.
    GetShop {
        operation: "GetShop",
        document: GET_SHOP,
        variables: NoVariables,
        response: GetShopData,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetShopData {
    pub shop: ShopNode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopNode {
    pub name: String,
    pub description: Option<String>,
    pub primary_domain: DomainNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DomainNode {
    pub url: String,
}
