//! Product domain types.

use artisania_core::{Category, Money, ProductId, ShopId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A handmade item listed by a shop.
///
/// Products are never deleted; `is_active = false` hides them from the
/// catalogue while keeping order history intact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub shop: ShopSummary,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: Category,
    pub images: Vec<ProductImage>,
    pub stock: i32,
    pub specifications: Specifications,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub average_rating: Decimal,
    pub total_reviews: i32,
    pub total_sales: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can currently be ordered.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.is_active && self.stock > 0
    }

    #[must_use]
    pub fn main_image(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }

    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            stock: self.stock,
            is_active: self.is_active,
            main_image: self.main_image().map(str::to_owned),
        }
    }
}

/// The shop a product belongs to, as embedded in product responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSummary {
    pub id: ShopId,
    pub name: String,
    pub logo: Option<String>,
}

/// A compact product view used in shop pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: i32,
    pub is_active: bool,
    pub main_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// Physical details of a product. Stored as JSONB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(default)]
    pub unit: LengthUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    #[serde(default)]
    pub unit: WeightUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Cm,
    M,
    Inch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    G,
    Kg,
    Lb,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_specifications_defaults() {
        let spec: Specifications = serde_json::from_str(
            r#"{"materials":["cedar"],"dimensions":{"length":30,"width":20},"weight":{"value":1.5}}"#,
        )
        .unwrap();
        assert_eq!(spec.materials, vec!["cedar"]);
        assert_eq!(spec.dimensions.unwrap().unit, LengthUnit::Cm);
        assert_eq!(spec.weight.unwrap().unit, WeightUnit::G);
        assert!(spec.colors.is_empty());
    }

    #[test]
    fn test_unknown_unit_is_rejected() {
        assert!(serde_json::from_str::<Weight>(r#"{"value":1,"unit":"stone"}"#).is_err());
    }
}
