//! Order lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AddressNode, ImageNode, MoneyV2, Nodes};

const GET_ORDER: &str = concat!(
    "query GetOrder($orderId: ID!) {
  order: node(id: $orderId) {
    __typename
    ... on Order {
      id
      name
      orderNumber
      statusUrl
      processedAt
      fulfillmentStatus
      subtotalPrice { ",
    money_fields!(),
    " }
      totalTax { ",
    money_fields!(),
    " }
      totalPrice { ",
    money_fields!(),
    " }
      shippingAddress { ...AddressFields }
      discountApplications(first: 100) {
        nodes {
          value {
            __typename
            ... on MoneyV2 { ",
    money_fields!(),
    " }
            ... on PricingPercentageValue { percentage }
          }
        }
      }
      lineItems(first: 100) {
        nodes {
          title
          quantity
          discountedTotalPrice { ",
    money_fields!(),
    " }
          variant {
            title
            price { ",
    money_fields!(),
    " }
            image { ",
    image_fields!(),
    " }
            product { handle }
          }
        }
      }
    }
  }
}
",
    address_fragment!()
);

storefront_operation! {
    /// `node(id:)` narrowed to `Order`.
    GetOrder {
        operation: "GetOrder",
        document: GET_ORDER,
        variables: GetOrderVariables,
        response: GetOrderData,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOrderVariables {
    pub order_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetOrderData {
    pub order: Option<OrderLookup>,
}

/// `node` result: an order, or some other node type the id pointed at.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum OrderLookup {
    Order(Box<OrderNode>),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNode {
    pub id: String,
    pub name: String,
    pub order_number: i64,
    pub status_url: String,
    pub processed_at: DateTime<Utc>,
    pub fulfillment_status: String,
    pub subtotal_price: Option<MoneyV2>,
    pub total_tax: Option<MoneyV2>,
    pub total_price: MoneyV2,
    pub shipping_address: Option<AddressNode>,
    #[serde(default)]
    pub discount_applications: Nodes<DiscountApplicationNode>,
    #[serde(default)]
    pub line_items: Nodes<OrderLineItemNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscountApplicationNode {
    pub value: PricingValueNode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum PricingValueNode {
    MoneyV2(MoneyV2),
    PricingPercentageValue { percentage: f64 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemNode {
    pub title: String,
    pub quantity: i64,
    pub discounted_total_price: Option<MoneyV2>,
    pub variant: Option<OrderVariantNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderVariantNode {
    pub title: String,
    pub price: Option<MoneyV2>,
    pub image: Option<ImageNode>,
    pub product: Option<OrderVariantProductNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderVariantProductNode {
    pub handle: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_non_order_node_is_other() {
        let data: GetOrderData =
            serde_json::from_str(r#"{"order":{"__typename":"Product"}}"#).unwrap();
        assert!(matches!(data.order, Some(OrderLookup::Other)));

        let data: GetOrderData = serde_json::from_str(r#"{"order":null}"#).unwrap();
        assert!(data.order.is_none());
    }

    #[test]
    fn test_pricing_value_variants() {
        let pct: PricingValueNode = serde_json::from_str(
            r#"{"__typename":"PricingPercentageValue","percentage":10.0}"#,
        )
        .unwrap();
        assert!(matches!(pct, PricingValueNode::PricingPercentageValue { percentage } if (percentage - 10.0).abs() < f64::EPSILON));

        let money: PricingValueNode = serde_json::from_str(
            r#"{"__typename":"MoneyV2","amount":"5.0","currencyCode":"USD"}"#,
        )
        .unwrap();
        assert!(matches!(money, PricingValueNode::MoneyV2(_)));
    }
}
