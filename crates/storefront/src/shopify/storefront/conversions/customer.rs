//! Customer, address and order conversion functions.

use bien_miches_core::{AddressId, CustomerId, OrderId};

use crate::models::CustomerAccessToken;
use crate::shopify::types::{
    Address, AddressInput, Customer, DiscountValue, Order, OrderLineItem, OrderSummary,
};

use super::super::queries::customer::{CustomerNode, MailingAddressInputNode, OrderSummaryNode};
use super::super::queries::orders::{OrderLineItemNode, OrderNode, PricingValueNode};
use super::super::queries::{AddressNode, CustomerAccessTokenNode};
use super::{convert_image, convert_money};

pub fn convert_access_token(token: CustomerAccessTokenNode) -> CustomerAccessToken {
    CustomerAccessToken {
        access_token: token.access_token,
        expires_at: token.expires_at,
    }
}

pub fn convert_address(address: AddressNode) -> Address {
    Address {
        id: Some(AddressId::new(address.id)),
        first_name: address.first_name,
        last_name: address.last_name,
        company: address.company,
        address1: address.address1,
        address2: address.address2,
        city: address.city,
        province: address.province,
        country: address.country,
        zip: address.zip,
        phone: address.phone,
        name: address.name,
        formatted: address.formatted,
    }
}

pub fn convert_address_input(address: AddressInput) -> MailingAddressInputNode {
    MailingAddressInputNode {
        address1: address.address1,
        address2: address.address2,
        city: address.city,
        company: address.company,
        country: address.country,
        first_name: address.first_name,
        last_name: address.last_name,
        phone: address.phone,
        province: address.province,
        zip: address.zip,
    }
}

fn convert_order_summary(order: OrderSummaryNode) -> OrderSummary {
    OrderSummary {
        id: OrderId::new(order.id),
        name: order.name,
        order_number: order.order_number,
        processed_at: order.processed_at,
        financial_status: order.financial_status,
        fulfillment_status: order.fulfillment_status,
        total: convert_money(order.total_price),
    }
}

pub fn convert_customer(customer: CustomerNode) -> Customer {
    Customer {
        id: CustomerId::new(customer.id),
        email: customer.email,
        first_name: customer.first_name.filter(|n| !n.is_empty()),
        last_name: customer.last_name.filter(|n| !n.is_empty()),
        phone: customer.phone,
        accepts_marketing: customer.accepts_marketing,
        number_of_orders: customer.number_of_orders,
        default_address: customer.default_address.map(convert_address),
        addresses: customer
            .addresses
            .nodes
            .into_iter()
            .map(convert_address)
            .collect(),
        orders: customer
            .orders
            .nodes
            .into_iter()
            .map(convert_order_summary)
            .collect(),
    }
}

fn convert_discount_value(value: PricingValueNode) -> DiscountValue {
    match value {
        PricingValueNode::MoneyV2(money) => DiscountValue::Money(convert_money(money)),
        PricingValueNode::PricingPercentageValue { percentage } => {
            DiscountValue::Percentage(percentage.to_string())
        }
    }
}

fn convert_order_line_item(item: OrderLineItemNode) -> OrderLineItem {
    let (variant_title, variant_price, image, product_handle) =
        item.variant.map_or((None, None, None, None), |v| {
            (
                Some(v.title).filter(|t| t != "Default Title"),
                v.price.map(convert_money),
                v.image.map(convert_image),
                v.product.map(|p| p.handle),
            )
        });

    OrderLineItem {
        title: item.title,
        quantity: item.quantity,
        variant_title,
        variant_price,
        discounted_total: item.discounted_total_price.map(convert_money),
        image,
        product_handle,
    }
}

pub fn convert_order(order: OrderNode) -> Order {
    Order {
        id: OrderId::new(order.id),
        name: order.name,
        order_number: order.order_number,
        status_url: order.status_url,
        processed_at: order.processed_at,
        fulfillment_status: order.fulfillment_status,
        subtotal: order.subtotal_price.map(convert_money),
        total_tax: order.total_tax.map(convert_money),
        total: convert_money(order.total_price),
        shipping_address: order.shipping_address.map(convert_address),
        discount_applications: order
            .discount_applications
            .nodes
            .into_iter()
            .map(|d| convert_discount_value(d.value))
            .collect(),
        line_items: order
            .line_items
            .nodes
            .into_iter()
            .map(convert_order_line_item)
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_order() {
        let json = serde_json::json!({
            "id": "gid://shopify/Order/5551234?key=abc",
            "name": "#1001",
            "orderNumber": 1001,
            "statusUrl": "https://bienmiches.com/orders/abc",
            "processedAt": "2023-09-16T20:00:00Z",
            "fulfillmentStatus": "FULFILLED",
            "subtotalPrice": { "amount": "24.0", "currencyCode": "USD" },
            "totalTax": { "amount": "2.1", "currencyCode": "USD" },
            "totalPrice": { "amount": "26.1", "currencyCode": "USD" },
            "shippingAddress": null,
            "discountApplications": { "nodes": [
                { "value": { "__typename": "PricingPercentageValue", "percentage": 10.0 } }
            ]},
            "lineItems": { "nodes": [{
                "title": "Michelada Mix",
                "quantity": 2,
                "discountedTotalPrice": null,
                "variant": {
                    "title": "Default Title",
                    "price": { "amount": "12.0", "currencyCode": "USD" },
                    "image": null,
                    "product": { "handle": "bien-miches-michelada-mix" }
                }
            }]}
        });
        let order = convert_order(serde_json::from_value(json).unwrap());
        assert_eq!(order.id.resource_id(), "5551234");
        assert_eq!(order.discount_applications.first().unwrap().display(), "-10% OFF");
        let item = order.line_items.first().unwrap();
        assert_eq!(item.variant_title, None);
        assert_eq!(item.display_price().unwrap().display(), "$12.00");
        assert_eq!(order.total.display(), "$26.10");
    }

    #[test]
    fn test_convert_address_input_keeps_fields() {
        let node = convert_address_input(AddressInput {
            address1: Some("907 Cedar St".into()),
            city: Some("Santa Cruz".into()),
            ..AddressInput::default()
        });
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "address1": "907 Cedar St", "city": "Santa Cruz" })
        );
    }
}
