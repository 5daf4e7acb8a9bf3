//! Product queries.

use serde::{Deserialize, Serialize};

use super::{ImageNode, MoneyV2, NoVariables, Nodes, SelectedOptionNode, SeoNode};

macro_rules! product_variant_fragment {
    () => {
        concat!(
            "fragment ProductVariantFields on ProductVariant {
  id
  title
  availableForSale
  sku
  price { ",
            money_fields!(),
            " }
  compareAtPrice { ",
            money_fields!(),
            " }
  unitPrice { ",
            money_fields!(),
            " }
  image { ",
            image_fields!(),
            " }
  selectedOptions { name value }
  product { title handle }
}
"
        )
    };
}

const GET_PRODUCT: &str = concat!(
    "query GetProduct($handle: String!, $selectedOptions: [SelectedOptionInput!]!) {
  product(handle: $handle) {
    id
    title
    vendor
    handle
    description
    descriptionHtml
    options { name values }
    images(first: 5) { nodes { ",
    image_fields!(),
    " } }
    selectedVariant: variantBySelectedOptions(selectedOptions: $selectedOptions) {
      ...ProductVariantFields
    }
    variants(first: 1) { nodes { ...ProductVariantFields } }
    seo { title description }
  }
}
",
    product_variant_fragment!()
);

const GET_PRODUCT_VARIANTS: &str = concat!(
    "query GetProductVariants($handle: String!) {
  product(handle: $handle) {
    variants(first: 250) { nodes { ...ProductVariantFields } }
  }
}
",
    product_variant_fragment!()
);

const RECOMMENDED_PRODUCTS: &str = concat!(
    "query RecommendedProducts {
  products(first: 4, sortKey: UPDATED_AT, reverse: true) {
    nodes { ...ProductCardFields }
  }
}
",
    product_card_fragment!()
);

const SEARCH_PRODUCTS: &str = concat!(
    "query SearchProducts($query: String!, $first: Int!) {
  products(first: $first, query: $query) {
    nodes { ...ProductCardFields }
  }
}
",
    product_card_fragment!()
);

storefront_operation! {
    /// `product(handle:)` with the variant matching the selected options.
    GetProduct {
        operation: "GetProduct",
        document: GET_PRODUCT,
        variables: GetProductVariables,
        response: GetProductData,
    }
}

storefront_operation! {
    /// Up to 250 variants of a product.
    GetProductVariants {
        operation: "GetProductVariants",
        document: GET_PRODUCT_VARIANTS,
        variables: GetProductVariantsVariables,
        response: GetProductVariantsData,
    }
}

storefront_operation! {
    /// Four most recently updated products.
    RecommendedProducts {
        operation: "RecommendedProducts",
        document: RECOMMENDED_PRODUCTS,
        variables: NoVariables,
        response: ProductCardsData,
    }
}

storefront_operation! {
    SearchProducts {
        operation: "SearchProducts",
        document: SEARCH_PRODUCTS,
        variables: SearchProductsVariables,
        response: ProductCardsData,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductVariables {
    pub handle: String,
    pub selected_options: Vec<SelectedOptionNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetProductVariantsVariables {
    pub handle: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchProductsVariables {
    pub query: String,
    pub first: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetProductData {
    pub product: Option<ProductNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetProductVariantsData {
    pub product: Option<ProductVariantsNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductCardsData {
    pub products: Nodes<ProductCardNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    pub vendor: String,
    pub handle: String,
    pub description: String,
    pub description_html: String,
    pub options: Vec<ProductOptionNode>,
    pub images: Nodes<ImageNode>,
    pub selected_variant: Option<VariantNode>,
    pub variants: Nodes<VariantNode>,
    pub seo: Option<SeoNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductOptionNode {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductVariantsNode {
    pub variants: Nodes<VariantNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub sku: Option<String>,
    pub price: MoneyV2,
    pub compare_at_price: Option<MoneyV2>,
    pub unit_price: Option<MoneyV2>,
    pub image: Option<ImageNode>,
    pub selected_options: Vec<SelectedOptionNode>,
    pub product: VariantProductNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantProductNode {
    pub title: String,
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCardNode {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub price_range: PriceRangeNode,
    pub images: Nodes<ImageNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeNode {
    pub min_variant_price: MoneyV2,
}
