//! Product service.

use sqlx::PgPool;
use thiserror::Error;

use artisania_core::{ProductId, derive_tags};

use super::Actor;
use crate::db::RepositoryError;
use crate::db::products::{ActiveFilter, NewProduct, ProductRepository, ProductUpdate};
use crate::db::shops::ShopRepository;
use crate::models::{Page, PageParams, Product};

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("product not found")]
    NotFound,

    #[error("you must create a shop first before adding products")]
    NoShop,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct ProductService<'a> {
    products: ProductRepository<'a>,
    shops: ShopRepository<'a>,
}

impl<'a> ProductService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
            shops: ShopRepository::new(pool),
        }
    }

    /// Add a product to the actor's shop.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NoShop` if the actor has no shop.
    pub async fn create(&self, actor: Actor, product: &NewProduct) -> Result<Product, ProductError> {
        let shop = self
            .shops
            .get_by_owner(actor.id)
            .await?
            .ok_or(ProductError::NoShop)?;

        let created = self.products.create(actor.id, shop.id, product).await?;
        self.shops.recompute_stats(shop.id).await?;

        tracing::info!(product_id = %created.id, shop_id = %shop.id, "Product created");
        Ok(created)
    }

    /// Active products of active shops, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` on database failure.
    pub async fn list(&self, params: PageParams) -> Result<Page<Product>, ProductError> {
        Ok(self.products.list_active(params).await?)
    }

    /// An active product. Inactive products read as missing.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if missing or inactive.
    pub async fn get_active(&self, id: ProductId) -> Result<Product, ProductError> {
        self.products
            .get_by_id(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(ProductError::NotFound)
    }

    async fn load_owned(
        &self,
        actor: Actor,
        id: ProductId,
        denied: &'static str,
    ) -> Result<Product, ProductError> {
        let product = self
            .products
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)?;
        if !actor.owns_or_admin(product.owner_id) {
            return Err(ProductError::Forbidden(denied));
        }
        Ok(product)
    }

    /// Update a product as its owner or an admin. Tags follow the name and
    /// description.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` or `ProductError::Forbidden`.
    pub async fn update(
        &self,
        actor: Actor,
        id: ProductId,
        mut update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        let current = self
            .load_owned(actor, id, "Not authorized to update this product")
            .await?;

        if update.name.is_some() || update.description.is_some() {
            let name = update.name.as_deref().unwrap_or(&current.name);
            let description = update.description.as_deref().unwrap_or(&current.description);
            update.tags = Some(derive_tags(name, description));
        }

        let updated = self.products.update(id, &update).await?;
        if update.is_active.is_some() {
            self.shops.recompute_stats(updated.shop.id).await?;
        }
        Ok(updated)
    }

    /// Soft-delete a product as its owner or an admin.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` or `ProductError::Forbidden`.
    pub async fn delete(&self, actor: Actor, id: ProductId) -> Result<(), ProductError> {
        let product = self
            .load_owned(actor, id, "Not authorized to delete this product")
            .await?;

        self.products.soft_delete(id).await?;
        self.shops.recompute_stats(product.shop.id).await?;

        tracing::info!(product_id = %id, actor = %actor.id, "Product deactivated");
        Ok(())
    }

    /// Products the actor created, optionally filtered by state.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` on database failure.
    pub async fn list_mine(
        &self,
        actor: Actor,
        filter: ActiveFilter,
        params: PageParams,
    ) -> Result<Page<Product>, ProductError> {
        Ok(self.products.list_by_owner(actor.id, filter, params).await?)
    }
}
