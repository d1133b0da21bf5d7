//! Postal addresses for users, shops, and orders.
//!
//! These are plain data carriers. Field validation happens on the request
//! types in the API crate; the structs here are what gets stored (as JSONB)
//! and returned.

use serde::{Deserialize, Serialize};

/// Country used when an address does not name one.
pub const DEFAULT_COUNTRY: &str = "Morocco";

fn default_country() -> String {
    DEFAULT_COUNTRY.to_owned()
}

/// A general postal address. Every part is optional because profiles are
/// filled in gradually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            street: None,
            city: None,
            postal_code: None,
            country: default_country(),
            coordinates: None,
        }
    }
}

/// Latitude/longitude of a shop's workshop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where an order is delivered. All fields except the country are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Recipient name as printed on the parcel.
    #[must_use]
    pub fn recipient(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_country_defaults_to_morocco() {
        let address: Address = serde_json::from_str(r#"{"city":"Fes"}"#).unwrap();
        assert_eq!(address.country, DEFAULT_COUNTRY);
        assert_eq!(address.city.as_deref(), Some("Fes"));

        let shipping: ShippingAddress = serde_json::from_str(
            r#"{"firstName":"Amina","lastName":"Idrissi","street":"12 Derb Sidi Ahmed",
                "city":"Marrakech","postalCode":"40000","phone":"+212600000000"}"#,
        )
        .unwrap();
        assert_eq!(shipping.country, "Morocco");
        assert_eq!(shipping.recipient(), "Amina Idrissi");
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let json = serde_json::to_value(Address::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "country": "Morocco" }));
    }
}
