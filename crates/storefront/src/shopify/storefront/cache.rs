//! Cache types for Storefront API responses.

use crate::shopify::types::{
    CollectionList, CollectionPage, CollectionSummary, Page, Product, ProductCard, ProductVariant,
};

/// Cached value types.
///
/// Carts, customers and orders are never cached.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Variants(Vec<ProductVariant>),
    FeaturedCollection(Option<CollectionSummary>),
    ProductCards(Vec<ProductCard>),
    Collections(CollectionList),
    Collection(Box<CollectionPage>),
    Page(Box<Page>),
}
