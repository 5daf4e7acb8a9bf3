//! Collection queries.

use serde::{Deserialize, Serialize};

use super::products::ProductCardNode;
use super::{ImageNode, NoVariables, Nodes, PageInfoNode};

macro_rules! collection_fragment {
    () => {
        concat!(
            "fragment CollectionFields on Collection {
  id
  title
  handle
  description
  image { ",
            image_fields!(),
            " }
}
"
        )
    };
}

const FEATURED_COLLECTION: &str = concat!(
    "query FeaturedCollection {
  collections(first: 1, sortKey: UPDATED_AT, reverse: true) {
    nodes { ...CollectionFields }
  }
}
",
    collection_fragment!()
);

const GET_COLLECTIONS: &str = concat!(
    "query GetCollections($first: Int!, $after: String) {
  collections(first: $first, after: $after) {
    nodes { ...CollectionFields }
    pageInfo { hasNextPage endCursor }
  }
}
",
    collection_fragment!()
);

const GET_COLLECTION: &str = concat!(
    "query GetCollection($handle: String!, $first: Int!, $after: String) {
  collection(handle: $handle) {
    ...CollectionFields
    descriptionHtml
    products(first: $first, after: $after) {
      nodes { ...ProductCardFields }
      pageInfo { hasNextPage endCursor }
    }
  }
}
",
    collection_fragment!(),
    product_card_fragment!()
);

storefront_operation! {
    /// The most recently updated collection.
    FeaturedCollection {
        operation: "FeaturedCollection",
        document: FEATURED_COLLECTION,
        variables: NoVariables,
        response: FeaturedCollectionData,
    }
}

storefront_operation! {
    GetCollections {
        operation: "GetCollections",
        document: GET_COLLECTIONS,
        variables: GetCollectionsVariables,
        response: GetCollectionsData,
    }
}

storefront_operation! {
    GetCollection {
        operation: "GetCollection",
        document: GET_COLLECTION,
        variables: GetCollectionVariables,
        response: GetCollectionData,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetCollectionsVariables {
    pub first: i64,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetCollectionVariables {
    pub handle: String,
    pub first: i64,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedCollectionData {
    pub collections: Nodes<CollectionNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetCollectionsData {
    pub collections: CollectionConnectionNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetCollectionData {
    pub collection: Option<CollectionWithProductsNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionNode {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<ImageNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConnectionNode {
    pub nodes: Vec<CollectionNode>,
    pub page_info: PageInfoNode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWithProductsNode {
    #[serde(flatten)]
    pub collection: CollectionNode,
    pub description_html: String,
    pub products: ProductConnectionNode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnectionNode {
    pub nodes: Vec<ProductCardNode>,
    pub page_info: PageInfoNode,
}
