//! Core types for Sattva Wellness.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use contact::{Phone, PhoneError, Pincode, PincodeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, to_minor_units};
pub use status::*;
