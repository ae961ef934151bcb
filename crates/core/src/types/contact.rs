//! Phone number and postal code types for Indian shipping addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not exactly ten digits.
    #[error("phone number must be exactly 10 digits")]
    InvalidLength,
    /// The input contains a non-digit character.
    #[error("phone number must contain only digits")]
    NonDigit,
}

/// A ten-digit Indian mobile number.
///
/// Validation is purely structural (exactly ten ASCII digits); the identity
/// provider and payment gateway perform their own reachability checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Required number of digits.
    pub const LENGTH: usize = 10;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not exactly ten characters,
    /// or contains a non-digit character.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if s.len() != Self::LENGTH {
            return Err(PhoneError::InvalidLength);
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PincodeError {
    /// The input string is empty.
    #[error("pincode cannot be empty")]
    Empty,
    /// The input is not exactly six digits.
    #[error("pincode must be exactly 6 digits")]
    InvalidLength,
    /// The input contains a non-digit character.
    #[error("pincode must contain only digits")]
    NonDigit,
}

/// A six-digit Indian postal index number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Required number of digits.
    pub const LENGTH: usize = 6;

    /// Parse a `Pincode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not exactly six characters,
    /// or contains a non-digit character.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        if s.is_empty() {
            return Err(PincodeError::Empty);
        }

        if s.len() != Self::LENGTH {
            return Err(PincodeError::InvalidLength);
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PincodeError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Pincode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Pincode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_phone() {
        let phone = Phone::parse("9876543210").unwrap();
        assert_eq!(phone.as_str(), "9876543210");
    }

    #[test]
    fn test_phone_rejects_short_input() {
        assert!(matches!(
            Phone::parse("98765"),
            Err(PhoneError::InvalidLength)
        ));
    }

    #[test]
    fn test_phone_rejects_eleven_digits() {
        assert!(matches!(
            Phone::parse("98765432101"),
            Err(PhoneError::InvalidLength)
        ));
    }

    #[test]
    fn test_phone_rejects_non_digits() {
        assert!(matches!(
            Phone::parse("98765abc10"),
            Err(PhoneError::NonDigit)
        ));
        // A country prefix is not accepted; the form strips it upstream
        assert!(matches!(
            Phone::parse("+919876543"),
            Err(PhoneError::NonDigit)
        ));
    }

    #[test]
    fn test_phone_rejects_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_valid_pincode() {
        let pin = Pincode::parse("560001").unwrap();
        assert_eq!(pin.as_str(), "560001");
    }

    #[test]
    fn test_pincode_rejects_bad_length() {
        assert!(matches!(
            Pincode::parse("5600"),
            Err(PincodeError::InvalidLength)
        ));
        assert!(matches!(
            Pincode::parse("5600012"),
            Err(PincodeError::InvalidLength)
        ));
    }

    #[test]
    fn test_pincode_rejects_non_digits() {
        assert!(matches!(
            Pincode::parse("56A001"),
            Err(PincodeError::NonDigit)
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let phone = Phone::parse("9876543210").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"9876543210\"");
        let parsed: Phone = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, phone);
    }
}
