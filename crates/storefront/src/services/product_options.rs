//! Variant selection for the product page.
//!
//! Selected options travel in the query string (`?Size=32+oz&Flavor=Spicy`).
//! This module turns them into `SelectedOption`s, builds variant URLs and
//! the per-value state of the option selector.

use url::form_urlencoded;

use crate::shopify::{Product, ProductVariant, SelectedOption};

/// Query parameters added by Shopify predictive search and analytics.
const IGNORED_PARAM_PREFIXES: [&str; 5] = ["_sid", "_pos", "_psq", "_ss", "_v"];

/// Selected options from the query string, without tracking parameters.
#[must_use]
pub fn selected_options_from_query(params: &[(String, String)]) -> Vec<SelectedOption> {
    params
        .iter()
        .filter(|(name, _)| {
            !IGNORED_PARAM_PREFIXES
                .iter()
                .any(|prefix| name.starts_with(prefix))
        })
        .map(|(name, value)| SelectedOption {
            name: name.clone(),
            value: value.clone(),
        })
        .collect()
}

/// URL of the product page with `options` selected.
///
/// Unrelated parameters in `existing` are kept; parameters named like one of
/// the options are replaced.
#[must_use]
pub fn variant_url(
    handle: &str,
    options: &[SelectedOption],
    existing: &[(String, String)],
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (name, value) in existing {
        if !options.iter().any(|o| &o.name == name) {
            query.append_pair(name, value);
        }
    }
    for option in options {
        query.append_pair(&option.name, &option.value);
    }

    let query = query.finish();
    if query.is_empty() {
        format!("/products/{handle}")
    } else {
        format!("/products/{handle}?{query}")
    }
}

/// Find the variant whose options match every entry of `options`.
#[must_use]
pub fn find_variant<'a>(
    variants: &'a [ProductVariant],
    options: &[SelectedOption],
) -> Option<&'a ProductVariant> {
    variants.iter().find(|variant| {
        options
            .iter()
            .all(|o| variant.option_value(&o.name) == Some(o.value.as_str()))
    })
}

/// One value button in the option selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValueView {
    pub value: String,
    /// A variant with this value is in stock (true while variants are unknown).
    pub available: bool,
    /// The value is part of the current selection.
    pub active: bool,
    pub url: String,
}

/// One option row in the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub name: String,
    pub values: Vec<OptionValueView>,
}

/// Build the option selector for `product`.
///
/// `selection` is the current selection (usually the selected variant's
/// options). Options with a single value are not shown.
#[must_use]
pub fn option_views(
    product: &Product,
    selection: &[SelectedOption],
    variants: Option<&[ProductVariant]>,
    existing: &[(String, String)],
) -> Vec<OptionView> {
    product
        .options
        .iter()
        .filter(|option| option.values.len() > 1)
        .map(|option| {
            let values = option
                .values
                .iter()
                .map(|value| {
                    let candidate = replace_option(selection, &option.name, value);
                    let available = variants.is_none_or(|variants| {
                        find_variant(variants, &candidate).is_some_and(|v| v.available_for_sale)
                    });
                    let active = selection
                        .iter()
                        .any(|o| o.name == option.name && &o.value == value);

                    OptionValueView {
                        value: value.clone(),
                        available,
                        active,
                        url: variant_url(&product.handle, &candidate, existing),
                    }
                })
                .collect();

            OptionView {
                name: option.name.clone(),
                values,
            }
        })
        .collect()
}

/// `selection` with the named option set to `value`.
fn replace_option(selection: &[SelectedOption], name: &str, value: &str) -> Vec<SelectedOption> {
    let mut options: Vec<SelectedOption> = selection
        .iter()
        .filter(|o| o.name != name)
        .cloned()
        .collect();
    options.push(SelectedOption {
        name: name.to_string(),
        value: value.to_string(),
    });
    options
}
