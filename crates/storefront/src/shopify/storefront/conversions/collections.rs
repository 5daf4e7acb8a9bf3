//! Collection type conversion functions.

use bien_miches_core::CollectionId;

use crate::shopify::types::{CollectionList, CollectionPage, CollectionSummary};

use super::super::queries::collections::{
    CollectionConnectionNode, CollectionNode, CollectionWithProductsNode,
};
use super::{convert_image, convert_page_info, convert_product_card};

pub fn convert_collection_summary(collection: CollectionNode) -> CollectionSummary {
    CollectionSummary {
        id: CollectionId::new(collection.id),
        title: collection.title,
        handle: collection.handle,
        description: collection.description,
        image: collection.image.map(convert_image),
    }
}

pub fn convert_collection_list(connection: CollectionConnectionNode) -> CollectionList {
    CollectionList {
        collections: connection
            .nodes
            .into_iter()
            .map(convert_collection_summary)
            .collect(),
        page_info: convert_page_info(connection.page_info),
    }
}

pub fn convert_collection_page(collection: CollectionWithProductsNode) -> CollectionPage {
    CollectionPage {
        collection: convert_collection_summary(collection.collection),
        description_html: collection.description_html,
        products: collection
            .products
            .nodes
            .into_iter()
            .map(convert_product_card)
            .collect(),
        page_info: convert_page_info(collection.products.page_info),
    }
}
