//! Product type conversion functions.

use bien_miches_core::{ProductId, VariantId};

use crate::shopify::types::{Product, ProductCard, ProductOption, ProductVariant};

use super::super::queries::products::{ProductCardNode, ProductNode, VariantNode};
use super::{convert_image, convert_money, convert_selected_option, convert_seo};

pub fn convert_variant(variant: VariantNode) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(variant.id),
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        price: convert_money(variant.price),
        compare_at_price: variant.compare_at_price.map(convert_money),
        unit_price: variant.unit_price.map(convert_money),
        image: variant.image.map(convert_image),
        selected_options: variant
            .selected_options
            .into_iter()
            .map(convert_selected_option)
            .collect(),
        sku: variant.sku.filter(|s| !s.is_empty()),
        product_title: variant.product.title,
        product_handle: variant.product.handle,
    }
}

pub fn convert_product(product: ProductNode) -> Product {
    Product {
        id: ProductId::new(product.id),
        title: product.title,
        vendor: product.vendor,
        handle: product.handle,
        description: product.description,
        description_html: product.description_html,
        options: product
            .options
            .into_iter()
            .map(|o| ProductOption {
                name: o.name,
                values: o.values,
            })
            .collect(),
        images: product.images.nodes.into_iter().map(convert_image).collect(),
        selected_variant: product.selected_variant.map(convert_variant),
        first_variant: product
            .variants
            .nodes
            .into_iter()
            .next()
            .map(convert_variant),
        seo: convert_seo(product.seo),
    }
}

pub fn convert_product_card(product: ProductCardNode) -> ProductCard {
    ProductCard {
        id: ProductId::new(product.id),
        title: product.title,
        handle: product.handle,
        min_price: convert_money(product.price_range.min_variant_price),
        image: product.images.nodes.into_iter().next().map(convert_image),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn variant_json() -> serde_json::Value {
        serde_json::json!({
            "id": "gid://shopify/ProductVariant/1",
            "title": "32 oz",
            "availableForSale": true,
            "sku": "",
            "price": { "amount": "12.0", "currencyCode": "USD" },
            "compareAtPrice": { "amount": "15.0", "currencyCode": "USD" },
            "unitPrice": null,
            "image": null,
            "selectedOptions": [{ "name": "Size", "value": "32 oz" }],
            "product": { "title": "Michelada Mix", "handle": "bien-miches-michelada-mix" }
        })
    }

    #[test]
    fn test_convert_variant() {
        let node: VariantNode = serde_json::from_value(variant_json()).unwrap();
        let variant = convert_variant(node);
        assert_eq!(variant.id.resource_id(), "1");
        assert_eq!(variant.price.display_without_trailing_zeros(), "$12");
        assert_eq!(
            variant.compare_at_price.as_ref().unwrap().display_without_trailing_zeros(),
            "$15"
        );
        assert_eq!(variant.sku, None);
        assert_eq!(variant.option_value("Size"), Some("32 oz"));
        assert!(!variant.is_default_variant());
    }

    #[test]
    fn test_convert_product_takes_first_variant() {
        let json = serde_json::json!({
            "id": "gid://shopify/Product/9",
            "title": "Michelada Mix",
            "vendor": "Bien Miches",
            "handle": "bien-miches-michelada-mix",
            "description": "Mix",
            "descriptionHtml": "<p>Mix</p>",
            "options": [{ "name": "Size", "values": ["32 oz"] }],
            "images": { "nodes": [] },
            "selectedVariant": null,
            "variants": { "nodes": [variant_json()] },
            "seo": null
        });
        let product = convert_product(serde_json::from_value(json).unwrap());
        assert!(product.selected_variant.is_none());
        assert_eq!(product.first_variant.unwrap().title, "32 oz");
        assert_eq!(product.options.len(), 1);
        assert_eq!(product.seo.title, None);
    }
}
