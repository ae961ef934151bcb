//! Shipping address domain types.
//!
//! Each user has a single "default" address record that the address form
//! overwrites in place; there is no multi-address support.

use serde::{Deserialize, Serialize};

use sattva_core::{Phone, PhoneError, Pincode, PincodeError};

/// A validated shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: Phone,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: Pincode,
    pub landmark: Option<String>,
}

/// Raw address form input, as posted by the browser.
///
/// Browser-side `pattern`/`required` constraints catch these errors first;
/// the server-side validation here is the backstop and never reaches the
/// database when it fails.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressForm {
    pub full_name: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub landmark: Option<String>,
}

/// Errors produced by address form validation.
#[derive(Debug, thiserror::Error)]
pub enum AddressFormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0}")]
    Phone(#[from] PhoneError),
    #[error("{0}")]
    Pincode(#[from] PincodeError),
}

impl AddressForm {
    /// Validate the form into a [`ShippingAddress`].
    ///
    /// # Errors
    ///
    /// Returns the first field-level failure: a missing required field, a
    /// phone that is not exactly 10 digits, or a pincode that is not exactly
    /// 6 digits.
    pub fn validate(self) -> Result<ShippingAddress, AddressFormError> {
        let full_name = required(self.full_name, "Full name")?;
        let address_line = required(self.address_line, "Address")?;
        let city = required(self.city, "City")?;
        let state = required(self.state, "State")?;
        let phone = Phone::parse(self.phone.trim())?;
        let pincode = Pincode::parse(self.pincode.trim())?;
        let landmark = self
            .landmark
            .map(|l| l.trim().to_owned())
            .filter(|l| !l.is_empty());

        Ok(ShippingAddress {
            full_name,
            phone,
            address_line,
            city,
            state,
            pincode,
            landmark,
        })
    }
}

fn required(value: String, field: &'static str) -> Result<String, AddressFormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AddressFormError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> AddressForm {
        AddressForm {
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            address_line: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            landmark: Some("Opposite the park".to_string()),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let address = valid_form().validate().unwrap();
        assert_eq!(address.full_name, "Asha Rao");
        assert_eq!(address.phone.as_str(), "9876543210");
        assert_eq!(address.pincode.as_str(), "560001");
        assert_eq!(address.landmark.as_deref(), Some("Opposite the park"));
    }

    #[test]
    fn test_landmark_is_optional() {
        let mut form = valid_form();
        form.landmark = None;
        assert!(form.validate().unwrap().landmark.is_none());

        let mut form = valid_form();
        form.landmark = Some("   ".to_string());
        assert!(form.validate().unwrap().landmark.is_none());
    }

    #[test]
    fn test_missing_required_field() {
        let mut form = valid_form();
        form.city = "  ".to_string();
        assert!(matches!(
            form.validate(),
            Err(AddressFormError::MissingField("City"))
        ));
    }

    #[test]
    fn test_phone_must_be_ten_digits() {
        let mut form = valid_form();
        form.phone = "12345".to_string();
        assert!(matches!(form.validate(), Err(AddressFormError::Phone(_))));
    }

    #[test]
    fn test_pincode_must_be_six_digits() {
        let mut form = valid_form();
        form.pincode = "56000".to_string();
        assert!(matches!(form.validate(), Err(AddressFormError::Pincode(_))));
    }
}
