//! Cart type conversion functions.

use bien_miches_core::{CartId, CartLineId, VariantId};

use crate::shopify::types::{Cart, CartDiscountCode, CartLine, CartMerchandise};

use super::super::queries::cart::{CartLineNode, CartNode};
use super::{convert_image, convert_money, convert_selected_option};

pub fn convert_cart(cart: CartNode) -> Cart {
    let (subtotal, total) = cart.cost.map_or((None, None), |cost| {
        (
            cost.subtotal_amount.map(convert_money),
            cost.total_amount.map(convert_money),
        )
    });

    Cart {
        id: CartId::new(cart.id),
        checkout_url: cart.checkout_url,
        total_quantity: cart.total_quantity,
        lines: cart.lines.nodes.into_iter().map(convert_cart_line).collect(),
        subtotal,
        total,
        discount_codes: cart
            .discount_codes
            .into_iter()
            .map(|d| CartDiscountCode {
                code: d.code,
                applicable: d.applicable,
            })
            .collect(),
    }
}

fn convert_cart_line(line: CartLineNode) -> CartLine {
    let merchandise = line.merchandise;
    CartLine {
        id: CartLineId::new(line.id),
        quantity: line.quantity,
        total: convert_money(line.cost.total_amount),
        merchandise: CartMerchandise {
            id: VariantId::new(merchandise.id),
            title: merchandise.title,
            product_title: merchandise.product.title,
            product_handle: merchandise.product.handle,
            image: merchandise.image.map(convert_image),
            selected_options: merchandise
                .selected_options
                .into_iter()
                .map(convert_selected_option)
                .collect(),
        },
    }
}
