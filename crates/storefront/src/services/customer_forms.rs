//! Validation and mapping for the customer-facing forms.
//!
//! Form structs deserialize straight from `application/x-www-form-urlencoded`
//! bodies. Everything here is pure so handlers only wire results to
//! templates.

use serde::Deserialize;

use crate::shopify::{AddressInput, CustomerUpdateInput};

/// Sentinel `addressId` for the new-address form.
pub const NEW_ADDRESS_ID: &str = "NEW_ADDRESS_ID";

// =============================================================================
// Login / Register
// =============================================================================

/// Combined sign-in and register form, dispatched on `_action`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "_action")]
    pub action: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

/// Validated login action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    SignIn { email: String, password: String },
    Register { email: String, password: String },
}

impl LoginForm {
    /// Validate the form for its `_action`.
    ///
    /// # Errors
    ///
    /// Returns the message to show in the form.
    pub fn validate(self) -> Result<LoginAction, String> {
        let email = non_empty(self.email);
        let password = non_empty(self.password);

        match self.action.as_deref() {
            Some("sign-in") => match (email, password) {
                (Some(email), Some(password)) => Ok(LoginAction::SignIn { email, password }),
                _ => Err("Please provide both an email and a password.".to_string()),
            },
            Some("register") => {
                let confirm = non_empty(self.password_confirm);
                let Some(password) = password.filter(|p| confirm.as_ref() == Some(p)) else {
                    return Err("Passwords do not match".to_string());
                };
                let Some(email) = email else {
                    return Err("Please provide both an email and a password.".to_string());
                };
                Ok(LoginAction::Register { email, password })
            }
            _ => Err("Invalid form action".to_string()),
        }
    }
}

/// New password form used by reset and activation links.
#[derive(Debug, Default, Deserialize)]
pub struct PasswordForm {
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

impl PasswordForm {
    /// The new password, once both fields are present and equal.
    ///
    /// # Errors
    ///
    /// Returns "Passwords do not match" otherwise.
    pub fn validate(self) -> Result<String, String> {
        let confirm = non_empty(self.password_confirm);
        non_empty(self.password)
            .filter(|p| confirm.as_ref() == Some(p))
            .ok_or_else(|| "Passwords do not match".to_string())
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Profile form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Checkbox: present as `on` when checked.
    pub accepts_marketing: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub new_password_confirm: Option<String>,
}

impl ProfileForm {
    /// Build the `customerUpdate` input.
    ///
    /// # Errors
    ///
    /// Returns the message of the last failing password rule.
    pub fn into_update(self) -> Result<CustomerUpdateInput, String> {
        let password = profile_password(
            non_empty(self.current_password),
            non_empty(self.new_password),
            non_empty(self.new_password_confirm),
        )?;

        Ok(CustomerUpdateInput {
            first_name: non_empty(self.first_name),
            last_name: non_empty(self.last_name),
            email: non_empty(self.email),
            phone: non_empty(self.phone),
            accepts_marketing: Some(self.accepts_marketing.as_deref() == Some("on")),
            password,
        })
    }
}

/// Decide which password (if any) to send with a profile update.
fn profile_password(
    current: Option<String>,
    new: Option<String>,
    confirm: Option<String>,
) -> Result<Option<String>, String> {
    let mut error = None;

    if new.is_some() && current.is_none() {
        error = Some("Current password is required.");
    }
    if new.is_some() && new != confirm {
        error = Some("New passwords must match.");
    }
    if new.is_some() && current.is_some() && new == current {
        error = Some("New password must be different than current password.");
    }

    if let Some(message) = error {
        return Err(message.to_string());
    }

    Ok(if current.is_some() && new.is_some() {
        new
    } else {
        current
    })
}

// =============================================================================
// Addresses
// =============================================================================

/// Address book form, dispatched on `_method`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    #[serde(rename = "_method")]
    pub method: Option<String>,
    pub address_id: Option<String>,
    pub default_address: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
}

/// What an address form submission asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMethod {
    Create,
    Update,
    Delete,
}

impl AddressMethod {
    /// Parse `_method`, defaulting to `POST`.
    #[must_use]
    pub fn parse(method: Option<&str>) -> Option<Self> {
        match method.map(str::to_ascii_uppercase).as_deref() {
            None | Some("POST") => Some(Self::Create),
            Some("PUT") => Some(Self::Update),
            Some("DELETE") => Some(Self::Delete),
            _ => None,
        }
    }
}

impl AddressForm {
    /// Whether the address should become the default.
    #[must_use]
    pub fn make_default(&self) -> bool {
        self.default_address.as_deref() == Some("on")
    }

    /// The mailing address fields that were submitted.
    #[must_use]
    pub fn address_input(&self) -> AddressInput {
        AddressInput {
            address1: self.address1.clone(),
            address2: self.address2.clone(),
            city: self.city.clone(),
            company: self.company.clone(),
            country: self.country.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            province: self.province.clone(),
            zip: self.zip.clone(),
        }
    }
}

/// Percent-decode an address id taken from a form.
#[must_use]
pub fn decode_address_id(id: &str) -> String {
    urlencoding::decode(id).map_or_else(|_| id.to_string(), std::borrow::Cow::into_owned)
}

// =============================================================================
// Discount codes
// =============================================================================

/// Merge a newly entered code with the codes already on the cart.
///
/// The new code comes first; blanks and duplicates are dropped. `existing`
/// is the comma-separated list rendered into the form.
#[must_use]
pub fn merge_discount_codes(new_code: Option<&str>, existing: Option<&str>) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    let candidates = new_code
        .into_iter()
        .chain(existing.into_iter().flat_map(|list| list.split(',')));

    for code in candidates.map(str::trim).filter(|c| !c.is_empty()) {
        if !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }
    codes
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
