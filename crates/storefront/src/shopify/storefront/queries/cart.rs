//! Cart query and mutations. None of these are cached.

use serde::{Deserialize, Serialize};

use super::{ImageNode, MoneyV2, Nodes, SelectedOptionNode, UserError};

macro_rules! cart_fragment {
    () => {
        concat!(
            "fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  cost {
    subtotalAmount { ",
            money_fields!(),
            " }
    totalAmount { ",
            money_fields!(),
            " }
  }
  discountCodes { code applicable }
  lines(first: 100) {
    nodes {
      id
      quantity
      cost { totalAmount { ",
            money_fields!(),
            " } }
      merchandise {
        ... on ProductVariant {
          id
          title
          image { ",
            image_fields!(),
            " }
          selectedOptions { name value }
          product { title handle }
        }
      }
    }
  }
}
"
        )
    };
}

/// Declare a cart mutation document returning `cart` and `userErrors`.
macro_rules! cart_mutation {
    ($signature:literal, $call:literal) => {
        concat!(
            "mutation ",
            $signature,
            " {\n  ",
            $call,
            " {\n    cart { ...CartFields }\n    userErrors { field message }\n  }\n}\n",
            cart_fragment!()
        )
    };
}

const GET_CART: &str = concat!(
    "query GetCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFields }
}
",
    cart_fragment!()
);

const CART_CREATE: &str = cart_mutation!(
    "CartCreate($input: CartInput!)",
    "cartCreate(input: $input)"
);

const CART_LINES_ADD: &str = cart_mutation!(
    "CartLinesAdd($cartId: ID!, $lines: [CartLineInput!]!)",
    "cartLinesAdd(cartId: $cartId, lines: $lines)"
);

const CART_LINES_UPDATE: &str = cart_mutation!(
    "CartLinesUpdate($cartId: ID!, $lines: [CartLineUpdateInput!]!)",
    "cartLinesUpdate(cartId: $cartId, lines: $lines)"
);

const CART_LINES_REMOVE: &str = cart_mutation!(
    "CartLinesRemove($cartId: ID!, $lineIds: [ID!]!)",
    "cartLinesRemove(cartId: $cartId, lineIds: $lineIds)"
);

const CART_DISCOUNT_CODES_UPDATE: &str = cart_mutation!(
    "CartDiscountCodesUpdate($cartId: ID!, $discountCodes: [String!])",
    "cartDiscountCodesUpdate(cartId: $cartId, discountCodes: $discountCodes)"
);

storefront_operation! {
    GetCart {
        operation: "GetCart",
        document: GET_CART,
        variables: CartIdVariables,
        response: GetCartData,
    }
}

storefront_operation! {
    CartCreate {
        operation: "CartCreate",
        document: CART_CREATE,
        variables: CartCreateVariables,
        response: CartCreateData,
    }
}

storefront_operation! {
    CartLinesAdd {
        operation: "CartLinesAdd",
        document: CART_LINES_ADD,
        variables: CartLinesAddVariables,
        response: CartLinesAddData,
    }
}

storefront_operation! {
    CartLinesUpdate {
        operation: "CartLinesUpdate",
        document: CART_LINES_UPDATE,
        variables: CartLinesUpdateVariables,
        response: CartLinesUpdateData,
    }
}

storefront_operation! {
    CartLinesRemove {
        operation: "CartLinesRemove",
        document: CART_LINES_REMOVE,
        variables: CartLinesRemoveVariables,
        response: CartLinesRemoveData,
    }
}

storefront_operation! {
    CartDiscountCodesUpdate {
        operation: "CartDiscountCodesUpdate",
        document: CART_DISCOUNT_CODES_UPDATE,
        variables: CartDiscountCodesUpdateVariables,
        response: CartDiscountCodesUpdateData,
    }
}

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartIdVariables {
    pub cart_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInputNode {
    pub merchandise_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdateInputNode {
    pub id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartInputNode {
    pub lines: Vec<CartLineInputNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartCreateVariables {
    pub input: CartInputNode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesAddVariables {
    pub cart_id: String,
    pub lines: Vec<CartLineInputNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesUpdateVariables {
    pub cart_id: String,
    pub lines: Vec<CartLineUpdateInputNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesRemoveVariables {
    pub cart_id: String,
    pub line_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDiscountCodesUpdateVariables {
    pub cart_id: String,
    pub discount_codes: Vec<String>,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GetCartData {
    pub cart: Option<CartNode>,
}

/// Payload shared by every cart mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub cart: Option<CartNode>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCreateData {
    pub cart_create: Option<CartPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesAddData {
    pub cart_lines_add: Option<CartPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesUpdateData {
    pub cart_lines_update: Option<CartPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinesRemoveData {
    pub cart_lines_remove: Option<CartPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDiscountCodesUpdateData {
    pub cart_discount_codes_update: Option<CartPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartNode {
    pub id: String,
    pub checkout_url: Option<String>,
    pub total_quantity: i64,
    pub cost: Option<CartCostNode>,
    #[serde(default)]
    pub discount_codes: Vec<DiscountCodeNode>,
    #[serde(default)]
    pub lines: Nodes<CartLineNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCostNode {
    pub subtotal_amount: Option<MoneyV2>,
    pub total_amount: Option<MoneyV2>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscountCodeNode {
    pub code: String,
    pub applicable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLineNode {
    pub id: String,
    pub quantity: i64,
    pub cost: CartLineCostNode,
    pub merchandise: MerchandiseNode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCostNode {
    pub total_amount: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchandiseNode {
    pub id: String,
    pub title: String,
    pub image: Option<ImageNode>,
    #[serde(default)]
    pub selected_options: Vec<SelectedOptionNode>,
    pub product: MerchandiseProductNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchandiseProductNode {
    pub title: String,
    pub handle: String,
}
