//! Conversions from wire types to the domain types in `shopify::types`.

pub mod cart;
pub mod collections;
pub mod customer;
pub mod products;

pub use cart::convert_cart;
pub use collections::{convert_collection_list, convert_collection_page, convert_collection_summary};
pub use customer::{convert_access_token, convert_address_input, convert_customer, convert_order};
pub use products::{convert_product, convert_product_card, convert_variant};

use bien_miches_core::{CurrencyCode, Money};

use crate::shopify::types::{Image, PageInfo, SelectedOption, Seo};

use super::queries::{ImageNode, MoneyV2, PageInfoNode, SelectedOptionNode, SeoNode};

pub fn convert_money(money: MoneyV2) -> Money {
    Money::new(money.amount, CurrencyCode::parse(&money.currency_code))
}

pub fn convert_image(image: ImageNode) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
        width: image.width,
        height: image.height,
    }
}

pub fn convert_page_info(info: PageInfoNode) -> PageInfo {
    PageInfo {
        has_next_page: info.has_next_page,
        end_cursor: info.end_cursor,
    }
}

pub fn convert_seo(seo: Option<SeoNode>) -> Seo {
    seo.map(|s| Seo {
        title: s.title,
        description: s.description,
    })
    .unwrap_or_default()
}

pub fn convert_selected_option(option: SelectedOptionNode) -> SelectedOption {
    SelectedOption {
        name: option.name,
        value: option.value,
    }
}
