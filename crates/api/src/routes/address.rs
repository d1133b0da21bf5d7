//! Address request bodies.

use serde::Deserialize;
use validator::Validate;

use artisania_core::{Address, Coordinates, ShippingAddress, address::DEFAULT_COUNTRY};

use super::extract::{clean, validate_not_blank, validate_phone};

/// A profile address. Every part is optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[validate(length(max = 200, message = "Street must be less than 200 characters"))]
    pub street: Option<String>,
    #[validate(length(max = 100, message = "City must be less than 100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 20, message = "Postal code must be less than 20 characters"))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100, message = "Country must be less than 100 characters"))]
    pub country: Option<String>,
}

impl From<AddressInput> for Address {
    fn from(input: AddressInput) -> Self {
        Self {
            street: clean(input.street),
            city: clean(input.city),
            postal_code: clean(input.postal_code),
            country: clean(input.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            coordinates: None,
        }
    }
}

/// A shop's workshop address. Street, city and postal code are required.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ShopAddressInput {
    #[validate(
        length(min = 1, max = 200, message = "Street is required"),
        custom(function = "validate_not_blank")
    )]
    pub street: String,
    #[validate(
        length(min = 1, max = 100, message = "City is required"),
        custom(function = "validate_not_blank")
    )]
    pub city: String,
    #[validate(
        length(min = 1, max = 20, message = "Postal code is required"),
        custom(function = "validate_not_blank")
    )]
    pub postal_code: String,
    #[validate(length(max = 100, message = "Country must be less than 100 characters"))]
    pub country: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl From<ShopAddressInput> for Address {
    fn from(input: ShopAddressInput) -> Self {
        Self {
            street: Some(input.street.trim().to_string()),
            city: Some(input.city.trim().to_string()),
            postal_code: Some(input.postal_code.trim().to_string()),
            country: clean(input.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            coordinates: input.coordinates,
        }
    }
}

/// Where an order goes. Everything but the country is required.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddressInput {
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 200, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 20, message = "Postal code is required"))]
    pub postal_code: String,
    #[validate(length(max = 100, message = "Country must be less than 100 characters"))]
    pub country: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
}

impl From<ShippingAddressInput> for ShippingAddress {
    fn from(input: ShippingAddressInput) -> Self {
        Self {
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            street: input.street.trim().to_string(),
            city: input.city.trim().to_string(),
            postal_code: input.postal_code.trim().to_string(),
            country: clean(input.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            phone: input.phone.trim().to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_address_requires_fields() {
        let input: ShippingAddressInput =
            serde_json::from_str(r#"{"firstName":"Amina","phone":"0612345678"}"#).unwrap();
        let errs = input.validate().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("street"));
        assert!(fields.contains_key("city"));
        assert!(fields.contains_key("postal_code"));
        assert!(!fields.contains_key("first_name"));
    }

    #[test]
    fn test_shipping_address_country_defaults() {
        let input = ShippingAddressInput {
            first_name: " Amina ".to_string(),
            last_name: "Alaoui".to_string(),
            street: "12 Derb Sidi".to_string(),
            city: "Fes".to_string(),
            postal_code: "30000".to_string(),
            country: Some("  ".to_string()),
            phone: "0612345678".to_string(),
        };
        assert!(input.validate().is_ok());
        let address = ShippingAddress::from(input);
        assert_eq!(address.first_name, "Amina");
        assert_eq!(address.country, "Morocco");
    }

    #[test]
    fn test_shop_address_rejects_blank_street() {
        let input = ShopAddressInput {
            street: "   ".to_string(),
            city: "Safi".to_string(),
            postal_code: "46000".to_string(),
            ..ShopAddressInput::default()
        };
        assert!(input.validate().is_err());
    }
}
