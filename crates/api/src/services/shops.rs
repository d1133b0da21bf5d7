//! Shop service.

use sqlx::PgPool;
use thiserror::Error;

use artisania_core::{ShopId, UserRole};

use super::Actor;
use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::db::shops::{NewShop, ShopRepository, ShopUpdate};
use crate::models::{Page, PageParams, Product, ProductCounts, Shop, ShopStats};

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("shop not found")]
    NotFound,

    #[error("only sellers can create shops")]
    NotSeller,

    #[error("you already have a shop")]
    AlreadyHasShop,

    /// The caller needs a shop for this action and has none.
    #[error("you don't have a shop yet")]
    NoShop,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct ShopService<'a> {
    shops: ShopRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> ShopService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            shops: ShopRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Open a shop for a seller. Each seller gets exactly one.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::AlreadyHasShop` if the seller already owns one and
    /// `ShopError::NotSeller` for other roles.
    pub async fn create(&self, actor: Actor, shop: &NewShop) -> Result<Shop, ShopError> {
        if self.shops.get_by_owner(actor.id).await?.is_some() {
            return Err(ShopError::AlreadyHasShop);
        }
        if actor.role != UserRole::Seller {
            return Err(ShopError::NotSeller);
        }

        let created = self
            .shops
            .create(actor.id, shop)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ShopError::AlreadyHasShop,
                other => ShopError::Repository(other),
            })?;

        tracing::info!(shop_id = %created.id, owner_id = %actor.id, slug = %created.slug, "Shop created");
        Ok(created)
    }

    /// An active shop. Inactive shops read as missing.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the shop is missing or inactive.
    pub async fn get_active(&self, id: ShopId) -> Result<Shop, ShopError> {
        self.shops
            .get_by_id(id)
            .await?
            .filter(|s| s.is_active)
            .ok_or(ShopError::NotFound)
    }

    /// Active shops, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Repository` on database failure.
    pub async fn list(&self, params: PageParams) -> Result<Page<Shop>, ShopError> {
        Ok(self.shops.list_active(params).await?)
    }

    /// An active shop's active products.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the shop is missing or inactive.
    pub async fn products(
        &self,
        id: ShopId,
        params: PageParams,
    ) -> Result<(Shop, Page<Product>), ShopError> {
        let shop = self.get_active(id).await?;
        let products = self.products.list_by_shop(shop.id, params).await?;
        Ok((shop, products))
    }

    /// The actor's own shop with its product counts.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NoShop` if the actor has none.
    pub async fn mine(&self, actor: Actor) -> Result<(Shop, ProductCounts), ShopError> {
        let shop = self
            .shops
            .get_by_owner(actor.id)
            .await?
            .ok_or(ShopError::NoShop)?;
        let counts = self.shops.product_counts(shop.id).await?;
        Ok((shop, counts))
    }

    /// Update a shop as its owner or an admin.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` or `ShopError::Forbidden`.
    pub async fn update(
        &self,
        actor: Actor,
        id: ShopId,
        update: &ShopUpdate,
    ) -> Result<Shop, ShopError> {
        let shop = self.shops.get_by_id(id).await?.ok_or(ShopError::NotFound)?;
        if !actor.owns_or_admin(shop.owner_id) {
            return Err(ShopError::Forbidden("Not authorized to update this shop"));
        }
        Ok(self.shops.update(id, update).await?)
    }

    /// Recompute a shop's statistics as its owner or an admin.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` or `ShopError::Forbidden`.
    pub async fn refresh_stats(&self, actor: Actor, id: ShopId) -> Result<ShopStats, ShopError> {
        let shop = self.shops.get_by_id(id).await?.ok_or(ShopError::NotFound)?;
        if !actor.owns_or_admin(shop.owner_id) {
            return Err(ShopError::Forbidden(
                "Not authorized to update this shop stats",
            ));
        }
        Ok(self.shops.recompute_stats(id).await?)
    }
}
