//! Shop repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use artisania_core::{Address, BusinessType, Category, Money, ShopId, UserId, slugify};

use super::RepositoryError;
use crate::models::{
    BusinessInfo, Page, PageParams, ProductCounts, Rating, Shop, ShopContact, ShopSettings,
    ShopStats, SocialMedia,
};

const SHOP_COLUMNS: &str = "id, owner_id, name, slug, description, logo, banner, \
     contact_email, contact_phone, website, address, social_media, \
     business_type, tax_id, registration_number, founded_year, categories, \
     is_active, is_verified, is_featured, rating_average, rating_count, \
     auto_accept_orders, allow_messages, show_contact_info, \
     total_products, total_sales, total_revenue, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ShopRow {
    id: ShopId,
    owner_id: UserId,
    name: String,
    slug: String,
    description: String,
    logo: Option<String>,
    banner: Option<String>,
    contact_email: Option<String>,
    contact_phone: String,
    website: Option<String>,
    address: Json<Address>,
    social_media: Json<SocialMedia>,
    business_type: BusinessType,
    tax_id: Option<String>,
    registration_number: Option<String>,
    founded_year: Option<i32>,
    categories: Vec<Category>,
    is_active: bool,
    is_verified: bool,
    is_featured: bool,
    rating_average: Decimal,
    rating_count: i32,
    auto_accept_orders: bool,
    allow_messages: bool,
    show_contact_info: bool,
    total_products: i32,
    total_sales: i32,
    total_revenue: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShopRow> for Shop {
    fn from(r: ShopRow) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            name: r.name,
            slug: r.slug,
            description: r.description,
            logo: r.logo,
            banner: r.banner,
            contact: ShopContact {
                email: r.contact_email,
                phone: r.contact_phone,
                website: r.website,
            },
            address: r.address.0,
            social_media: r.social_media.0,
            business_info: BusinessInfo {
                business_type: r.business_type,
                tax_id: r.tax_id,
                registration_number: r.registration_number,
                founded_year: r.founded_year,
            },
            categories: r.categories,
            is_active: r.is_active,
            is_verified: r.is_verified,
            is_featured: r.is_featured,
            rating: Rating {
                average: r.rating_average,
                total_reviews: r.rating_count,
            },
            settings: ShopSettings {
                auto_accept_orders: r.auto_accept_orders,
                allow_messages: r.allow_messages,
                show_contact_info: r.show_contact_info,
            },
            stats: ShopStats {
                total_products: r.total_products,
                total_sales: r.total_sales,
                total_revenue: r.total_revenue,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Fields for a new shop.
#[derive(Debug, Clone)]
pub struct NewShop {
    pub name: String,
    pub description: String,
    pub logo: Option<String>,
    pub banner: Option<String>,
    pub contact: ShopContact,
    pub address: Address,
    pub social_media: SocialMedia,
    pub business_info: BusinessInfo,
    pub categories: Vec<Category>,
    pub settings: ShopSettings,
}

/// A partial shop update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ShopUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub banner: Option<String>,
    pub contact: Option<ShopContact>,
    pub address: Option<Address>,
    pub social_media: Option<SocialMedia>,
    pub business_info: Option<BusinessInfo>,
    pub categories: Option<Vec<Category>>,
    pub settings: Option<ShopSettings>,
}

/// Repository for shop database operations.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a shop for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner already has a shop.
    pub async fn create(&self, owner: UserId, shop: &NewShop) -> Result<Shop, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            r"
            INSERT INTO shops (
                owner_id, name, slug, description, logo, banner,
                contact_email, contact_phone, website, address, social_media,
                business_type, tax_id, registration_number, founded_year, categories,
                auto_accept_orders, allow_messages, show_contact_info
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {SHOP_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(&shop.name)
        .bind(slugify(&shop.name))
        .bind(&shop.description)
        .bind(shop.logo.as_deref())
        .bind(shop.banner.as_deref())
        .bind(shop.contact.email.as_deref())
        .bind(&shop.contact.phone)
        .bind(shop.contact.website.as_deref())
        .bind(Json(&shop.address))
        .bind(Json(&shop.social_media))
        .bind(shop.business_info.business_type)
        .bind(shop.business_info.tax_id.as_deref())
        .bind(shop.business_info.registration_number.as_deref())
        .bind(shop.business_info.founded_year)
        .bind(&shop.categories)
        .bind(shop.settings.auto_accept_orders)
        .bind(shop.settings.allow_messages)
        .bind(shop.settings.show_contact_info)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "shop for this owner"))?;

        Ok(row.into())
    }

    /// Get a shop by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Shop::from))
    }

    /// Get the shop owned by `owner`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_owner(&self, owner: UserId) -> Result<Option<Shop>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE owner_id = $1"
        ))
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Shop::from))
    }

    /// List active shops, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, params: PageParams) -> Result<Page<Shop>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE is_active \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(params.sql_limit())
        .bind(params.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM shops WHERE is_active")
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Shop::from).collect(),
            params,
            total,
        ))
    }

    /// Apply a partial update. The slug follows the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    pub async fn update(&self, id: ShopId, update: &ShopUpdate) -> Result<Shop, RepositoryError> {
        let contact = update.contact.as_ref();
        let business = update.business_info.as_ref();
        let settings = update.settings.as_ref();

        let row = sqlx::query_as::<_, ShopRow>(&format!(
            r"
            UPDATE shops SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                logo = COALESCE($5, logo),
                banner = COALESCE($6, banner),
                contact_email = CASE WHEN $7 THEN $8 ELSE contact_email END,
                contact_phone = COALESCE($9, contact_phone),
                website = CASE WHEN $7 THEN $10 ELSE website END,
                address = COALESCE($11, address),
                social_media = COALESCE($12, social_media),
                business_type = COALESCE($13, business_type),
                tax_id = CASE WHEN $14 THEN $15 ELSE tax_id END,
                registration_number = CASE WHEN $14 THEN $16 ELSE registration_number END,
                founded_year = CASE WHEN $14 THEN $17 ELSE founded_year END,
                categories = COALESCE($18, categories),
                auto_accept_orders = COALESCE($19, auto_accept_orders),
                allow_messages = COALESCE($20, allow_messages),
                show_contact_info = COALESCE($21, show_contact_info),
                updated_at = now()
            WHERE id = $1
            RETURNING {SHOP_COLUMNS}
            "
        ))
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.name.as_deref().map(slugify))
        .bind(update.description.as_deref())
        .bind(update.logo.as_deref())
        .bind(update.banner.as_deref())
        .bind(contact.is_some())
        .bind(contact.and_then(|c| c.email.as_deref()))
        .bind(contact.map(|c| c.phone.as_str()))
        .bind(contact.and_then(|c| c.website.as_deref()))
        .bind(update.address.as_ref().map(Json))
        .bind(update.social_media.as_ref().map(Json))
        .bind(business.map(|b| b.business_type))
        .bind(business.is_some())
        .bind(business.and_then(|b| b.tax_id.as_deref()))
        .bind(business.and_then(|b| b.registration_number.as_deref()))
        .bind(business.and_then(|b| b.founded_year))
        .bind(update.categories.as_deref())
        .bind(settings.map(|s| s.auto_accept_orders))
        .bind(settings.map(|s| s.allow_messages))
        .bind(settings.map(|s| s.show_contact_info))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Count a shop's products by state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_counts(&self, id: ShopId) -> Result<ProductCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, ProductCounts>(
            r"
            SELECT COUNT(*) AS total_products,
                   COUNT(*) FILTER (WHERE is_active) AS active_products,
                   COUNT(*) FILTER (WHERE NOT is_active) AS inactive_products
            FROM products
            WHERE shop_id = $1
            ",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }

    /// Recompute the shop's denormalized stats from products and orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    pub async fn recompute_stats(&self, id: ShopId) -> Result<ShopStats, RepositoryError> {
        recompute_stats(self.pool, id).await
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_products: i32,
    total_sales: i32,
    total_revenue: Money,
}

/// Recompute shop stats on any executor, so order transitions can refresh
/// them inside their own transaction.
pub(crate) async fn recompute_stats(
    executor: impl PgExecutor<'_>,
    id: ShopId,
) -> Result<ShopStats, RepositoryError> {
    let row = sqlx::query_as::<_, StatsRow>(
        r"
        UPDATE shops SET
            total_products = (
                SELECT COUNT(*) FROM products WHERE shop_id = $1 AND is_active
            ),
            total_sales = (
                SELECT COUNT(*) FROM orders WHERE shop_id = $1 AND status = 'delivered'
            ),
            total_revenue = (
                SELECT COALESCE(SUM(total), 0) FROM orders
                WHERE shop_id = $1 AND status = 'delivered'
            ),
            updated_at = now()
        WHERE id = $1
        RETURNING total_products, total_sales, total_revenue
        ",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(ShopStats {
        total_products: row.total_products,
        total_sales: row.total_sales,
        total_revenue: row.total_revenue,
    })
}
