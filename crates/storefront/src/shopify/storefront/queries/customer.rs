//! Customer authentication, profile and address operations.
//!
//! Customer mutations report failures in `customerUserErrors`; the first
//! message is shown to the customer verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AddressNode, CustomerAccessTokenNode, CustomerUserError, MoneyV2, Nodes, UserError};

macro_rules! customer_fragment {
    () => {
        concat!(
            "fragment CustomerFields on Customer {
  id
  acceptsMarketing
  email
  firstName
  lastName
  phone
  numberOfOrders
  defaultAddress { ...AddressFields }
  addresses(first: 6) { nodes { ...AddressFields } }
  orders(first: 20, sortKey: PROCESSED_AT, reverse: true) {
    nodes {
      id
      name
      orderNumber
      processedAt
      financialStatus
      fulfillmentStatus
      totalPrice { ",
            money_fields!(),
            " }
    }
  }
}
",
            address_fragment!()
        )
    };
}

const CUSTOMER_ACCESS_TOKEN_CREATE: &str = "mutation CustomerAccessTokenCreate($input: CustomerAccessTokenCreateInput!) {
  customerAccessTokenCreate(input: $input) {
    customerAccessToken { accessToken expiresAt }
    customerUserErrors { code field message }
  }
}";

const CUSTOMER_ACCESS_TOKEN_DELETE: &str = "mutation CustomerAccessTokenDelete($customerAccessToken: String!) {
  customerAccessTokenDelete(customerAccessToken: $customerAccessToken) {
    deletedAccessToken
    userErrors { field message }
  }
}";

const CUSTOMER_CREATE: &str = "mutation CustomerCreate($input: CustomerCreateInput!) {
  customerCreate(input: $input) {
    customer { id }
    customerUserErrors { code field message }
  }
}";

const GET_CUSTOMER: &str = concat!(
    "query GetCustomer($customerAccessToken: String!) {
  customer(customerAccessToken: $customerAccessToken) { ...CustomerFields }
}
",
    customer_fragment!()
);

const CUSTOMER_UPDATE: &str = concat!(
    "mutation CustomerUpdate($customerAccessToken: String!, $customer: CustomerUpdateInput!) {
  customerUpdate(customerAccessToken: $customerAccessToken, customer: $customer) {
    customer { ...CustomerFields }
    customerAccessToken { accessToken expiresAt }
    customerUserErrors { code field message }
  }
}
",
    customer_fragment!()
);

const CUSTOMER_ADDRESS_CREATE: &str = "mutation CustomerAddressCreate($address: MailingAddressInput!, $customerAccessToken: String!) {
  customerAddressCreate(address: $address, customerAccessToken: $customerAccessToken) {
    customerAddress { id }
    customerUserErrors { code field message }
  }
}";

const CUSTOMER_ADDRESS_UPDATE: &str = "mutation CustomerAddressUpdate($address: MailingAddressInput!, $customerAccessToken: String!, $id: ID!) {
  customerAddressUpdate(address: $address, customerAccessToken: $customerAccessToken, id: $id) {
    customerAddress { id }
    customerUserErrors { code field message }
  }
}";

const CUSTOMER_ADDRESS_DELETE: &str = "mutation CustomerAddressDelete($customerAccessToken: String!, $id: ID!) {
  customerAddressDelete(customerAccessToken: $customerAccessToken, id: $id) {
    deletedCustomerAddressId
    customerUserErrors { code field message }
  }
}";

const CUSTOMER_DEFAULT_ADDRESS_UPDATE: &str = "mutation CustomerDefaultAddressUpdate($addressId: ID!, $customerAccessToken: String!) {
  customerDefaultAddressUpdate(addressId: $addressId, customerAccessToken: $customerAccessToken) {
    customer { defaultAddress { id } }
    customerUserErrors { code field message }
  }
}";

const CUSTOMER_RECOVER: &str = "mutation CustomerRecover($email: String!) {
  customerRecover(email: $email) {
    customerUserErrors { code field message }
  }
}";

const CUSTOMER_RESET_BY_URL: &str = "mutation CustomerResetByUrl($resetUrl: URL!, $password: String!) {
  customerResetByUrl(resetUrl: $resetUrl, password: $password) {
    customerAccessToken { accessToken expiresAt }
    customerUserErrors { code field message }
  }
}";

const CUSTOMER_ACTIVATE_BY_URL: &str = "mutation CustomerActivateByUrl($activationUrl: URL!, $password: String!) {
  customerActivateByUrl(activationUrl: $activationUrl, password: $password) {
    customerAccessToken { accessToken expiresAt }
    customerUserErrors { code field message }
  }
}";

storefront_operation! {
    /// Sign in with email and password.
    CustomerAccessTokenCreate {
        operation: "CustomerAccessTokenCreate",
        document: CUSTOMER_ACCESS_TOKEN_CREATE,
        variables: CustomerAccessTokenCreateVariables,
        response: CustomerAccessTokenCreateData,
    }
}

storefront_operation! {
    CustomerAccessTokenDelete {
        operation: "CustomerAccessTokenDelete",
        document: CUSTOMER_ACCESS_TOKEN_DELETE,
        variables: AccessTokenVariables,
        response: CustomerAccessTokenDeleteData,
    }
}

storefront_operation! {
    CustomerCreate {
        operation: "CustomerCreate",
        document: CUSTOMER_CREATE,
        variables: CustomerCreateVariables,
        response: CustomerCreateData,
    }
}

storefront_operation! {
    /// Profile, addresses and recent orders for a signed-in customer.
    GetCustomer {
        operation: "GetCustomer",
        document: GET_CUSTOMER,
        variables: AccessTokenVariables,
        response: GetCustomerData,
    }
}

storefront_operation! {
    CustomerUpdate {
        operation: "CustomerUpdate",
        document: CUSTOMER_UPDATE,
        variables: CustomerUpdateVariables,
        response: CustomerUpdateData,
    }
}

storefront_operation! {
    CustomerAddressCreate {
        operation: "CustomerAddressCreate",
        document: CUSTOMER_ADDRESS_CREATE,
        variables: CustomerAddressCreateVariables,
        response: CustomerAddressCreateData,
    }
}

storefront_operation! {
    CustomerAddressUpdate {
        operation: "CustomerAddressUpdate",
        document: CUSTOMER_ADDRESS_UPDATE,
        variables: CustomerAddressUpdateVariables,
        response: CustomerAddressUpdateData,
    }
}

storefront_operation! {
    CustomerAddressDelete {
        operation: "CustomerAddressDelete",
        document: CUSTOMER_ADDRESS_DELETE,
        variables: CustomerAddressDeleteVariables,
        response: CustomerAddressDeleteData,
    }
}

storefront_operation! {
    CustomerDefaultAddressUpdate {
        operation: "CustomerDefaultAddressUpdate",
        document: CUSTOMER_DEFAULT_ADDRESS_UPDATE,
        variables: CustomerDefaultAddressUpdateVariables,
        response: CustomerDefaultAddressUpdateData,
    }
}

storefront_operation! {
    /// Send a password reset email.
    CustomerRecover {
        operation: "CustomerRecover",
        document: CUSTOMER_RECOVER,
        variables: CustomerRecoverVariables,
        response: CustomerRecoverData,
    }
}

storefront_operation! {
    CustomerResetByUrl {
        operation: "CustomerResetByUrl",
        document: CUSTOMER_RESET_BY_URL,
        variables: CustomerResetByUrlVariables,
        response: CustomerResetByUrlData,
    }
}

storefront_operation! {
    CustomerActivateByUrl {
        operation: "CustomerActivateByUrl",
        document: CUSTOMER_ACTIVATE_BY_URL,
        variables: CustomerActivateByUrlVariables,
        response: CustomerActivateByUrlData,
    }
}

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenVariables {
    pub customer_access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerAccessTokenCreateInputNode {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerAccessTokenCreateVariables {
    pub input: CustomerAccessTokenCreateInputNode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateInputNode {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepts_marketing: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerCreateVariables {
    pub input: CustomerCreateInputNode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdateInputNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepts_marketing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdateVariables {
    pub customer_access_token: String,
    pub customer: CustomerUpdateInputNode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingAddressInputNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddressCreateVariables {
    pub address: MailingAddressInputNode,
    pub customer_access_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddressUpdateVariables {
    pub address: MailingAddressInputNode,
    pub customer_access_token: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddressDeleteVariables {
    pub customer_access_token: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDefaultAddressUpdateVariables {
    pub address_id: String,
    pub customer_access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerRecoverVariables {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResetByUrlVariables {
    pub reset_url: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerActivateByUrlVariables {
    pub activation_url: String,
    pub password: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Payload of the mutations that hand out a new access token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    pub customer_access_token: Option<CustomerAccessTokenNode>,
    #[serde(default)]
    pub customer_user_errors: Vec<CustomerUserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccessTokenCreateData {
    pub customer_access_token_create: Option<AccessTokenPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccessTokenDeletePayload {
    pub deleted_access_token: Option<String>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccessTokenDeleteData {
    pub customer_access_token_delete: Option<CustomerAccessTokenDeletePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdNode {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreatePayload {
    pub customer: Option<IdNode>,
    #[serde(default)]
    pub customer_user_errors: Vec<CustomerUserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateData {
    pub customer_create: Option<CustomerCreatePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetCustomerData {
    pub customer: Option<CustomerNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNode {
    pub id: String,
    #[serde(default)]
    pub accepts_marketing: bool,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// `UnsignedInt64` scalar, sent as a string.
    pub number_of_orders: String,
    pub default_address: Option<AddressNode>,
    #[serde(default)]
    pub addresses: Nodes<AddressNode>,
    #[serde(default)]
    pub orders: Nodes<OrderSummaryNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryNode {
    pub id: String,
    pub name: String,
    pub order_number: i64,
    pub processed_at: DateTime<Utc>,
    pub financial_status: Option<String>,
    pub fulfillment_status: String,
    pub total_price: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdatePayload {
    pub customer: Option<CustomerNode>,
    pub customer_access_token: Option<CustomerAccessTokenNode>,
    #[serde(default)]
    pub customer_user_errors: Vec<CustomerUserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdateData {
    pub customer_update: Option<CustomerUpdatePayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddressPayload {
    pub customer_address: Option<IdNode>,
    #[serde(default)]
    pub customer_user_errors: Vec<CustomerUserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddressCreateData {
    pub customer_address_create: Option<CustomerAddressPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddressUpdateData {
    pub customer_address_update: Option<CustomerAddressPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddressDeletePayload {
    pub deleted_customer_address_id: Option<String>,
    #[serde(default)]
    pub customer_user_errors: Vec<CustomerUserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddressDeleteData {
    pub customer_address_delete: Option<CustomerAddressDeletePayload>,
}

/// Payload of the mutations whose only interesting output is the error list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUserErrorsPayload {
    #[serde(default)]
    pub customer_user_errors: Vec<CustomerUserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDefaultAddressUpdateData {
    pub customer_default_address_update: Option<CustomerUserErrorsPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecoverData {
    pub customer_recover: Option<CustomerUserErrorsPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResetByUrlData {
    pub customer_reset_by_url: Option<AccessTokenPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerActivateByUrlData {
    pub customer_activate_by_url: Option<AccessTokenPayload>,
}

/// First customer-facing message of a `customerUserErrors` list.
pub fn first_message(errors: &[CustomerUserError]) -> Option<String> {
    errors.first().map(|e| e.message.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use graphql_client::GraphQLQuery;

    use super::*;

    #[test]
    fn test_update_input_omits_unset_fields() {
        let body = CustomerUpdate::build_query(CustomerUpdateVariables {
            customer_access_token: "tok".into(),
            customer: CustomerUpdateInputNode {
                first_name: Some("Juan".into()),
                last_name: None,
                email: None,
                phone: None,
                accepts_marketing: Some(false),
                password: None,
            },
        });
        let json = serde_json::to_value(&body.variables).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "customerAccessToken": "tok",
                "customer": { "firstName": "Juan", "acceptsMarketing": false }
            })
        );
    }

    #[test]
    fn test_customer_document_carries_address_fragment() {
        let body = GetCustomer::build_query(AccessTokenVariables {
            customer_access_token: "tok".into(),
        });
        assert!(body.query.contains("fragment AddressFields on MailingAddress"));
        assert!(body.query.contains("addresses(first: 6)"));
    }

    #[test]
    fn test_customer_node_parses_number_of_orders_string() {
        let json = serde_json::json!({
            "id": "gid://shopify/Customer/1",
            "acceptsMarketing": true,
            "email": "juan@example.com",
            "firstName": "Juan",
            "lastName": null,
            "phone": null,
            "numberOfOrders": "3",
            "defaultAddress": null,
            "addresses": { "nodes": [] },
            "orders": { "nodes": [] }
        });
        let node: CustomerNode = serde_json::from_value(json).unwrap();
        assert_eq!(node.number_of_orders, "3");
        assert!(node.accepts_marketing);
    }
}
