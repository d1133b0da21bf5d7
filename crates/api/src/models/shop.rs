//! Shop domain types.

use artisania_core::{Address, BusinessType, Category, Money, ShopId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An artisan's storefront. Each seller owns at most one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub owner_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub logo: Option<String>,
    pub banner: Option<String>,
    pub contact: ShopContact,
    pub address: Address,
    pub social_media: SocialMedia,
    pub business_info: BusinessInfo,
    pub categories: Vec<Category>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_featured: bool,
    pub rating: Rating,
    pub settings: ShopSettings,
    pub stats: ShopStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopContact {
    pub email: Option<String>,
    pub phone: String,
    pub website: Option<String>,
}

/// Links to the shop's social profiles. Stored as JSONB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    #[serde(default)]
    pub business_type: BusinessType,
    pub tax_id: Option<String>,
    pub registration_number: Option<String>,
    pub founded_year: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub average: Decimal,
    pub total_reviews: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSettings {
    pub auto_accept_orders: bool,
    pub allow_messages: bool,
    pub show_contact_info: bool,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            auto_accept_orders: false,
            allow_messages: true,
            show_contact_info: true,
        }
    }
}

/// Denormalized counters, refreshed by [`crate::db::shops::ShopRepository::recompute_stats`].
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopStats {
    /// Active products.
    pub total_products: i32,
    /// Delivered orders.
    pub total_sales: i32,
    /// Sum of delivered order totals.
    pub total_revenue: Money,
}

/// Product counts shown on the seller's own shop page.
#[derive(Debug, Clone, Copy, Default, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductCounts {
    pub total_products: i64,
    pub active_products: i64,
    pub inactive_products: i64,
}
