//! Shopify global ID newtypes.
//!
//! The Storefront API identifies every node with a global ID of the form
//! `gid://shopify/{Type}/{id}`, sometimes followed by a query string (cart
//! IDs carry `?key=...`). Use the `define_gid!` macro to create wrappers that
//! keep IDs of different resources from being mixed up.

/// Prefix shared by all Shopify global IDs.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Macro to define a type-safe Shopify global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `as_str()`, `into_inner()` and `resource_id()`
/// - `Display`, `AsRef<str>` and `From<String>`
///
/// # Example
///
/// ```rust
/// # use bien_miches_core::define_gid;
/// define_gid!(ProductId, "Product");
///
/// let id = ProductId::new("gid://shopify/Product/8123");
/// assert_eq!(id.resource_id(), "8123");
/// assert_eq!(ProductId::RESOURCE, "Product");
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Shopify resource type name embedded in the global ID.
            pub const RESOURCE: &'static str = $resource;

            /// Wrap a global ID string as returned by the API.
            #[must_use]
            pub fn new(gid: impl Into<String>) -> Self {
                Self(gid.into())
            }

            /// Build a global ID from a bare numeric or opaque resource id.
            #[must_use]
            pub fn from_resource_id(id: &str) -> Self {
                Self(format!("{}{}/{id}", $crate::types::gid::GID_PREFIX, $resource))
            }

            /// The full global ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the global ID string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// The trailing resource id (`8123` for `gid://shopify/Product/8123`).
            #[must_use]
            pub fn resource_id(&self) -> &str {
                $crate::types::gid::resource_id(&self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(gid: String) -> Self {
                Self(gid)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Return the last path segment of a global ID, without any query string.
///
/// Inputs that are not global IDs are returned unchanged (minus a query string).
#[must_use]
pub fn resource_id(gid: &str) -> &str {
    let without_query = gid.split_once('?').map_or(gid, |(head, _)| head);
    without_query
        .rsplit_once('/')
        .map_or(without_query, |(_, tail)| tail)
}

/// Return the resource type of a global ID (`Order` for `gid://shopify/Order/1`).
#[must_use]
pub fn resource_type(gid: &str) -> Option<&str> {
    gid.strip_prefix(GID_PREFIX)?.split('/').next()
}

define_gid!(ProductId, "Product");
define_gid!(VariantId, "ProductVariant");
define_gid!(CollectionId, "Collection");
define_gid!(CartId, "Cart");
define_gid!(CartLineId, "CartLine");
define_gid!(CustomerId, "Customer");
define_gid!(AddressId, "MailingAddress");
define_gid!(OrderId, "Order");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_strips_prefix_and_query() {
        let cart = CartId::new("gid://shopify/Cart/c1-abc123?key=deadbeef");
        assert_eq!(cart.resource_id(), "c1-abc123");

        let address = AddressId::new("gid://shopify/MailingAddress/99?model_name=CustomerAddress");
        assert_eq!(address.resource_id(), "99");
    }

    #[test]
    fn test_from_resource_id() {
        let order = OrderId::from_resource_id("5551234");
        assert_eq!(order.as_str(), "gid://shopify/Order/5551234");
        assert_eq!(resource_type(order.as_str()), Some("Order"));
    }

    #[test]
    fn test_resource_type_rejects_non_gid() {
        assert_eq!(resource_type("not-a-gid"), None);
        assert_eq!(resource_id("plain"), "plain");
    }

    #[test]
    fn test_serde_transparent() {
        let id = VariantId::new("gid://shopify/ProductVariant/42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gid://shopify/ProductVariant/42\"");
        let back: VariantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
