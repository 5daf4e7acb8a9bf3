//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, RawQuery, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::{ImageView, found};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::services::product_options::{
    OptionView, option_views, selected_options_from_query, variant_url,
};
use crate::shopify::{Product, ProductVariant};
use crate::state::AppState;

const VARIANTS_ERROR_MESSAGE: &str = "There was a problem loading product variants";

/// Price display data for templates.
#[derive(Clone)]
pub struct PriceView {
    pub price: String,
    /// Set when the variant is on sale.
    pub compare_at: Option<String>,
}

impl From<&ProductVariant> for PriceView {
    fn from(variant: &ProductVariant) -> Self {
        Self {
            price: variant.price.display_without_trailing_zeros(),
            compare_at: variant
                .compare_at_price
                .as_ref()
                .map(bien_miches_core::Money::display_without_trailing_zeros),
        }
    }
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub handle: String,
    pub title: String,
    pub vendor: String,
    pub description_html: String,
    pub seo_description: String,
    pub images: Vec<ImageView>,
    pub price: Option<PriceView>,
    /// Variant the add-to-cart form submits.
    pub variant_id: Option<String>,
    pub available: bool,
}

impl ProductView {
    fn new(product: &Product, selected: Option<&ProductVariant>) -> Self {
        let images = selected
            .and_then(|variant| variant.image.as_ref())
            .into_iter()
            .chain(product.images.iter())
            .map(|image| ImageView::new(image, &product.title))
            .fold(Vec::<ImageView>::new(), |mut images, image| {
                if !images.iter().any(|i| i.url == image.url) {
                    images.push(image);
                }
                images
            });

        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            vendor: product.vendor.clone(),
            description_html: product.description_html.clone(),
            seo_description: product
                .seo
                .description
                .clone()
                .unwrap_or_else(|| product.description.clone()),
            images,
            price: selected.map(PriceView::from),
            variant_id: selected.map(|variant| variant.id.to_string()),
            available: selected.is_some_and(|variant| variant.available_for_sale),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: ProductView,
    pub options: Vec<OptionView>,
    pub error: Option<String>,
}

/// Display product detail page.
///
/// Selected options come from the query string. A product with real
/// options and no matching variant redirects to its first variant.
#[instrument(skip(state, ctx, raw_query), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(handle): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response> {
    let params: Vec<(String, String)> =
        url::form_urlencoded::parse(raw_query.unwrap_or_default().as_bytes())
            .into_owned()
            .collect();
    let requested = selected_options_from_query(&params);

    let storefront = state.storefront();
    let (product, variants) = tokio::join!(
        storefront.get_product(&handle, &requested),
        storefront.get_product_variants(&handle)
    );
    let product = product.map_err(AppError::from_lookup)?;

    let selected = match product.first_variant.as_ref() {
        Some(first) if first.is_default_variant() => Some(first),
        first => match (product.selected_variant.as_ref(), first) {
            (Some(selected), _) => Some(selected),
            (None, Some(first)) => {
                let location = variant_url(&handle, &first.selected_options, &params);
                tracing::debug!(location = %location, "Redirecting to first variant");
                return Ok(found(&location));
            }
            (None, None) => None,
        },
    };

    let (variants, error) = match variants {
        Ok(variants) => (Some(variants), None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load product variants");
            (None, Some(VARIANTS_ERROR_MESSAGE.to_string()))
        }
    };

    let selection = selected.map_or(requested, |variant| variant.selected_options.clone());
    let options = option_views(&product, &selection, variants.as_deref(), &params);

    Ok(ProductShowTemplate {
        ctx,
        product: ProductView::new(&product, selected),
        options,
        error,
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bien_miches_core::{Money, ProductId, VariantId};

    use super::*;
    use crate::shopify::{Image, ProductOption, SelectedOption, Seo};

    fn variant(size: &str, compare_at: Option<&str>, available: bool) -> ProductVariant {
        ProductVariant {
            id: VariantId::from_resource_id(size),
            title: size.to_string(),
            available_for_sale: available,
            price: Money::parse("12.00", "USD").unwrap(),
            compare_at_price: compare_at.map(|amount| Money::parse(amount, "USD").unwrap()),
            unit_price: None,
            image: Some(Image {
                url: format!("https://cdn.shopify.com/{size}.png"),
                alt_text: None,
                width: None,
                height: None,
            }),
            selected_options: vec![SelectedOption {
                name: "Size".to_string(),
                value: size.to_string(),
            }],
            sku: None,
            product_title: "Michelada Mix".to_string(),
            product_handle: "mix".to_string(),
        }
    }

    fn product(selected: Option<ProductVariant>) -> Product {
        Product {
            id: ProductId::from_resource_id("1"),
            title: "Michelada Mix".to_string(),
            vendor: "Bien Miches".to_string(),
            handle: "mix".to_string(),
            description: "Pour. Mix. Enjoy.".to_string(),
            description_html: "<p>Pour. Mix. Enjoy.</p>".to_string(),
            options: vec![ProductOption {
                name: "Size".to_string(),
                values: vec!["16oz".to_string(), "32oz".to_string()],
            }],
            images: vec![Image {
                url: "https://cdn.shopify.com/32oz.png".to_string(),
                alt_text: Some("Jar".to_string()),
                width: None,
                height: None,
            }],
            first_variant: selected.clone(),
            selected_variant: selected,
            seo: Seo::default(),
        }
    }

    #[test]
    fn test_sale_price_view() {
        let price = PriceView::from(&variant("32oz", Some("15.50"), true));
        assert_eq!(price.price, "$12");
        assert_eq!(price.compare_at.as_deref(), Some("$15.50"));

        let price = PriceView::from(&variant("32oz", None, true));
        assert_eq!(price.compare_at, None);
    }

    #[test]
    fn test_product_view_puts_variant_image_first_without_duplicates() {
        let selected = variant("32oz", None, true);
        let product = product(Some(selected.clone()));
        let view = ProductView::new(&product, Some(&selected));
        assert_eq!(view.images.len(), 1);
        assert_eq!(view.images.first().unwrap().alt, "Michelada Mix");
        assert_eq!(view.seo_description, "Pour. Mix. Enjoy.");
        assert!(view.available);
    }

    #[test]
    fn test_product_view_without_variant_is_sold_out() {
        let view = ProductView::new(&product(None), None);
        assert!(!view.available);
        assert!(view.variant_id.is_none());
        assert!(view.price.is_none());
    }
}
