//! Product repository.
//!
//! Every query joins the owning shop so products come back with the
//! [`ShopSummary`] clients show next to them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use artisania_core::{Category, Money, ProductId, ShopId, UserId, derive_tags};

use super::RepositoryError;
use crate::models::{Page, PageParams, Product, ProductImage, ShopSummary, Specifications};

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.shop_id, s.name AS shop_name, s.logo AS shop_logo, p.owner_id,
           p.name, p.description, p.price, p.category, p.images, p.stock,
           p.specifications, p.tags, p.is_active, p.is_featured,
           p.average_rating, p.total_reviews, p.total_sales, p.created_at, p.updated_at
";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    shop_id: ShopId,
    shop_name: String,
    shop_logo: Option<String>,
    owner_id: UserId,
    name: String,
    description: String,
    price: Money,
    category: Category,
    images: Json<Vec<ProductImage>>,
    stock: i32,
    specifications: Json<Specifications>,
    tags: Vec<String>,
    is_active: bool,
    is_featured: bool,
    average_rating: Decimal,
    total_reviews: i32,
    total_sales: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            shop: ShopSummary {
                id: r.shop_id,
                name: r.shop_name,
                logo: r.shop_logo,
            },
            owner_id: r.owner_id,
            name: r.name,
            description: r.description,
            price: r.price,
            category: r.category,
            images: r.images.0,
            stock: r.stock,
            specifications: r.specifications.0,
            tags: r.tags,
            is_active: r.is_active,
            is_featured: r.is_featured,
            average_rating: r.average_rating,
            total_reviews: r.total_reviews,
            total_sales: r.total_sales,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Fields for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: Category,
    pub images: Vec<ProductImage>,
    pub stock: i32,
    pub specifications: Specifications,
    pub is_featured: bool,
}

/// A partial product update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub category: Option<Category>,
    pub images: Option<Vec<ProductImage>>,
    pub stock: Option<i32>,
    pub specifications: Option<Specifications>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    /// Recomputed by the caller whenever the name or description changes.
    pub tags: Option<Vec<String>>,
}

/// Which of an owner's products to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter {
    Any,
    Active,
    Inactive,
}

impl ActiveFilter {
    const fn as_option(self) -> Option<bool> {
        match self {
            Self::Any => None,
            Self::Active => Some(true),
            Self::Inactive => Some(false),
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product in `shop` owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: UserId,
        shop: ShopId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let tags = derive_tags(&product.name, &product.description);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            WITH p AS (
                INSERT INTO products (
                    shop_id, owner_id, name, description, price, category,
                    images, stock, specifications, tags, is_featured
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING *
            )
            {PRODUCT_SELECT}
            FROM p JOIN shops s ON s.id = p.shop_id
            "
        ))
        .bind(shop)
        .bind(owner)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.category)
        .bind(Json(&product.images))
        .bind(product.stock)
        .bind(Json(&product.specifications))
        .bind(&tags)
        .bind(product.is_featured)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT} FROM products p JOIN shops s ON s.id = p.shop_id WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// List active products of active shops, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, params: PageParams) -> Result<Page<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            {PRODUCT_SELECT}
            FROM products p JOIN shops s ON s.id = p.shop_id
            WHERE p.is_active AND s.is_active
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1 OFFSET $2
            "
        ))
        .bind(params.sql_limit())
        .bind(params.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products p JOIN shops s ON s.id = p.shop_id \
             WHERE p.is_active AND s.is_active",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Product::from).collect(),
            params,
            total,
        ))
    }

    /// List a shop's active products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_shop(
        &self,
        shop: ShopId,
        params: PageParams,
    ) -> Result<Page<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            {PRODUCT_SELECT}
            FROM products p JOIN shops s ON s.id = p.shop_id
            WHERE p.shop_id = $1 AND p.is_active
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(shop)
        .bind(params.sql_limit())
        .bind(params.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE shop_id = $1 AND is_active",
        )
        .bind(shop)
        .fetch_one(self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Product::from).collect(),
            params,
            total,
        ))
    }

    /// List every product an owner created, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(
        &self,
        owner: UserId,
        filter: ActiveFilter,
        params: PageParams,
    ) -> Result<Page<Product>, RepositoryError> {
        let active = filter.as_option();

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            {PRODUCT_SELECT}
            FROM products p JOIN shops s ON s.id = p.shop_id
            WHERE p.owner_id = $1 AND ($2::boolean IS NULL OR p.is_active = $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(owner)
        .bind(active)
        .bind(params.sql_limit())
        .bind(params.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products \
             WHERE owner_id = $1 AND ($2::boolean IS NULL OR is_active = $2)",
        )
        .bind(owner)
        .bind(active)
        .fetch_one(self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Product::from).collect(),
            params,
            total,
        ))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            WITH p AS (
                UPDATE products SET
                    name = COALESCE($2, name),
                    description = COALESCE($3, description),
                    price = COALESCE($4, price),
                    category = COALESCE($5, category),
                    images = COALESCE($6, images),
                    stock = COALESCE($7, stock),
                    specifications = COALESCE($8, specifications),
                    is_active = COALESCE($9, is_active),
                    is_featured = COALESCE($10, is_featured),
                    tags = COALESCE($11, tags),
                    updated_at = now()
                WHERE id = $1
                RETURNING *
            )
            {PRODUCT_SELECT}
            FROM p JOIN shops s ON s.id = p.shop_id
            "
        ))
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.price)
        .bind(update.category)
        .bind(update.images.as_ref().map(Json))
        .bind(update.stock)
        .bind(update.specifications.as_ref().map(Json))
        .bind(update.is_active)
        .bind(update.is_featured)
        .bind(update.tags.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Hide a product from the catalogue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn soft_delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
