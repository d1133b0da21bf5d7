//! Order service: who may do what to an order, and the retry around order
//! number allocation. The transactional work lives in
//! [`crate::db::orders::OrderRepository`].

use chrono::Utc;
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;

use artisania_core::{
    OrderId, OrderNumber, OrderStatus, PaymentStatus, PricingPolicy, ShopId, UserId, UserRole,
};

use super::Actor;
use crate::db::RepositoryError;
use crate::db::orders::{OrderRepository, OrderWriteError};
use crate::db::shops::ShopRepository;
use crate::models::{
    NewOrder, NewOrderLine, Order, OrderDetail, OrderScope, OrderStats, OrderWithItems, Page,
    PageParams, StatusChange, TimelineEntry,
};

/// How many order numbers to try before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Errors from [`OrderService`].
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order not found")]
    NotFound,

    /// The caller may not perform this action on this order.
    #[error("{0}")]
    Forbidden(&'static str),

    /// The caller needs a shop for this action and has none.
    #[error("{0}")]
    NoShop(&'static str),

    #[error("order cannot be cancelled at this stage")]
    NotCancellable,

    #[error("could not allocate a unique order number")]
    NumberExhausted,

    #[error(transparent)]
    Write(#[from] OrderWriteError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Buyer, selling shop's owner, or admin.
#[must_use]
pub fn can_view(order: &Order, actor: Actor, actor_shop: Option<ShopId>) -> bool {
    actor.is_admin() || order.is_buyer(actor.id) || actor_shop == Some(order.shop_id)
}

/// Selling shop's owner or admin.
#[must_use]
pub fn can_manage(order: &Order, actor: Actor, actor_shop: Option<ShopId>) -> bool {
    actor.is_admin() || actor_shop == Some(order.shop_id)
}

/// Buyer or admin.
#[must_use]
pub fn can_cancel(order: &Order, actor: Actor) -> bool {
    actor.is_admin() || order.is_buyer(actor.id)
}

/// Combine lines for the same product, keeping first-seen order.
#[must_use]
pub fn merge_lines(lines: &[NewOrderLine]) -> Vec<NewOrderLine> {
    let mut merged: Vec<NewOrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(existing) = merged.iter_mut().find(|l| l.product_id == line.product_id) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            merged.push(*line);
        }
    }
    merged
}

fn next_order_number() -> Option<OrderNumber> {
    let suffix = rand::rng().random_range(0..10_000u16);
    OrderNumber::compose(Utc::now().date_naive(), suffix).ok()
}

/// Order use cases.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    shops: ShopRepository<'a>,
    policy: &'a PricingPolicy,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, policy: &'a PricingPolicy) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            shops: ShopRepository::new(pool),
            policy,
        }
    }

    async fn shop_of(&self, actor: Actor) -> Result<Option<ShopId>, OrderError> {
        if !actor.role.can_sell() {
            return Ok(None);
        }
        Ok(self.shops.get_by_owner(actor.id).await?.map(|s| s.id))
    }

    async fn load(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders.get_by_id(id).await?.ok_or(OrderError::NotFound)
    }

    /// Place an order for `order.customer_id`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Write` when a product is unavailable or short on
    /// stock, or the lines span several shops.
    pub async fn place(&self, mut order: NewOrder) -> Result<OrderDetail, OrderError> {
        order.lines = merge_lines(&order.lines);

        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            let number = next_order_number().ok_or(OrderError::NumberExhausted)?;
            match self.orders.place(&order, &number, self.policy).await {
                Ok(detail) => {
                    tracing::info!(
                        order_id = %detail.order.id,
                        order_number = %detail.order.order_number,
                        customer_id = %order.customer_id,
                        total = %detail.order.pricing.total,
                        "Order placed"
                    );
                    return Ok(detail);
                }
                Err(OrderWriteError::Repository(RepositoryError::Conflict(_))) => {
                    tracing::debug!(attempt, order_number = %number, "Order number taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(OrderError::NumberExhausted)
    }

    /// An order with items and timeline, if the actor may see it.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` or `OrderError::Forbidden`.
    pub async fn get(&self, actor: Actor, id: OrderId) -> Result<OrderDetail, OrderError> {
        let detail = self
            .orders
            .get_detail(id)
            .await?
            .ok_or(OrderError::NotFound)?;

        let shop = self.shop_of(actor).await?;
        if !can_view(&detail.order, actor, shop) {
            return Err(OrderError::Forbidden("Not authorized to view this order"));
        }
        Ok(detail)
    }

    /// An order's timeline, if the actor may see the order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` or `OrderError::Forbidden`.
    pub async fn timeline(
        &self,
        actor: Actor,
        id: OrderId,
    ) -> Result<Vec<TimelineEntry>, OrderError> {
        let order = self.load(id).await?;
        let shop = self.shop_of(actor).await?;
        if !can_view(&order, actor, shop) {
            return Err(OrderError::Forbidden("Not authorized to view this order"));
        }
        Ok(self.orders.timeline(id).await?)
    }

    /// Every order. Callers must already have checked for admin.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` on database failure.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        params: PageParams,
    ) -> Result<Page<OrderWithItems>, OrderError> {
        Ok(self.orders.list(OrderScope::All, status, params).await?)
    }

    /// Orders the actor placed.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` on database failure.
    pub async fn list_mine(
        &self,
        actor: Actor,
        status: Option<OrderStatus>,
        params: PageParams,
    ) -> Result<Page<OrderWithItems>, OrderError> {
        Ok(self
            .orders
            .list(OrderScope::Customer(actor.id), status, params)
            .await?)
    }

    /// Orders received by the actor's shop.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NoShop` if the actor has no shop.
    pub async fn list_for_shop(
        &self,
        actor: Actor,
        status: Option<OrderStatus>,
        params: PageParams,
    ) -> Result<Page<OrderWithItems>, OrderError> {
        let shop = self
            .shop_of(actor)
            .await?
            .ok_or(OrderError::NoShop("You must have a shop to view shop orders"))?;
        Ok(self
            .orders
            .list(OrderScope::Shop(shop), status, params)
            .await?)
    }

    /// Move an order along the state machine as its seller or an admin.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Forbidden` for anyone else and
    /// `OrderError::Write(Transition)` for an illegal move.
    pub async fn update_status(
        &self,
        actor: Actor,
        id: OrderId,
        change: &StatusChange,
    ) -> Result<OrderDetail, OrderError> {
        let order = self.load(id).await?;
        let shop = self.shop_of(actor).await?;
        if !can_manage(&order, actor, shop) {
            return Err(OrderError::Forbidden("Not authorized to update this order"));
        }

        let detail = self.orders.transition(id, change).await?;
        tracing::info!(
            order_id = %id,
            from = %order.status,
            to = %detail.order.status,
            actor = %actor.id,
            "Order status changed"
        );
        Ok(detail)
    }

    /// Cancel an order as its buyer or an admin. Stock is restored.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Forbidden` for anyone else and
    /// `OrderError::NotCancellable` once the order has shipped.
    pub async fn cancel(
        &self,
        actor: Actor,
        id: OrderId,
        reason: Option<String>,
    ) -> Result<OrderDetail, OrderError> {
        let order = self.load(id).await?;
        if !can_cancel(&order, actor) {
            return Err(OrderError::Forbidden("Not authorized to cancel this order"));
        }
        if !order.status.is_cancellable() {
            return Err(OrderError::NotCancellable);
        }

        let note = reason.unwrap_or_else(|| "Order cancelled by customer".to_string());
        let change = StatusChange::new(OrderStatus::Cancelled, actor.id, Some(note));
        match self.orders.transition(id, &change).await {
            Ok(detail) => {
                tracing::info!(order_id = %id, actor = %actor.id, "Order cancelled");
                Ok(detail)
            }
            // Lost a race with a concurrent status change.
            Err(OrderWriteError::Transition(_)) => Err(OrderError::NotCancellable),
            Err(e) => Err(e.into()),
        }
    }

    /// Record a payment outcome as the seller or an admin.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Forbidden` for anyone else.
    pub async fn update_payment(
        &self,
        actor: Actor,
        id: OrderId,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> Result<Order, OrderError> {
        let order = self.load(id).await?;
        let shop = self.shop_of(actor).await?;
        if !can_manage(&order, actor, shop) {
            return Err(OrderError::Forbidden("Not authorized to update this order"));
        }
        Ok(self
            .orders
            .set_payment_status(id, status, transaction_id)
            .await?)
    }

    /// Statistics scoped to the actor: everything for admins, the shop for
    /// sellers, own purchases for customers.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NoShop` for a seller without a shop.
    pub async fn stats(&self, actor: Actor) -> Result<OrderStats, OrderError> {
        let scope = match actor.role {
            UserRole::Admin => OrderScope::All,
            UserRole::Seller => OrderScope::Shop(self.shop_of(actor).await?.ok_or(
                OrderError::NoShop("You must have a shop to view order statistics"),
            )?),
            UserRole::Customer => OrderScope::Customer(actor.id),
        };
        Ok(self.orders.stats(scope).await?)
    }

    /// Purchase statistics for one customer, for profile pages.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` on database failure.
    pub async fn customer_stats(&self, customer: UserId) -> Result<OrderStats, OrderError> {
        Ok(self.orders.stats(OrderScope::Customer(customer)).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use artisania_core::{Money, PaymentMethod, PricingBreakdown, ProductId, ShippingAddress};

    use super::*;
    use crate::models::order::{PaymentDetails, ShippingDetails};

    fn order(customer: i32, shop: i32) -> Order {
        Order {
            id: OrderId::new(1),
            order_number: OrderNumber::parse("ART2503140427").unwrap(),
            customer_id: UserId::new(customer),
            shop_id: ShopId::new(shop),
            shipping_address: ShippingAddress {
                first_name: "Amina".to_string(),
                last_name: "Benali".to_string(),
                street: "12 Rue des Potiers".to_string(),
                city: "Fes".to_string(),
                postal_code: "30000".to_string(),
                country: "Morocco".to_string(),
                phone: "+212600000000".to_string(),
            },
            billing_address: None,
            pricing: PricingBreakdown {
                subtotal: Money::ZERO,
                shipping_cost: Money::ZERO,
                tax: Money::ZERO,
                total: Money::ZERO,
            },
            status: OrderStatus::Pending,
            payment: PaymentDetails {
                status: PaymentStatus::Pending,
                method: PaymentMethod::CashOnDelivery,
                transaction_id: None,
                paid_at: None,
            },
            shipping_details: ShippingDetails::default(),
            customer_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    const fn actor(id: i32, role: UserRole) -> Actor {
        Actor {
            id: UserId::new(id),
            role,
        }
    }

    #[test]
    fn test_buyer_can_view_and_cancel_but_not_manage() {
        let o = order(10, 1);
        let buyer = actor(10, UserRole::Customer);
        assert!(can_view(&o, buyer, None));
        assert!(can_cancel(&o, buyer));
        assert!(!can_manage(&o, buyer, None));
    }

    #[test]
    fn test_shop_owner_can_view_and_manage_but_not_cancel() {
        let o = order(10, 1);
        let seller = actor(20, UserRole::Seller);
        let shop = Some(ShopId::new(1));
        assert!(can_view(&o, seller, shop));
        assert!(can_manage(&o, seller, shop));
        assert!(!can_cancel(&o, seller));
    }

    #[test]
    fn test_other_seller_is_locked_out() {
        let o = order(10, 1);
        let seller = actor(30, UserRole::Seller);
        let other_shop = Some(ShopId::new(2));
        assert!(!can_view(&o, seller, other_shop));
        assert!(!can_manage(&o, seller, other_shop));
        assert!(!can_cancel(&o, seller));
    }

    #[test]
    fn test_stranger_is_locked_out() {
        let o = order(10, 1);
        let stranger = actor(11, UserRole::Customer);
        assert!(!can_view(&o, stranger, None));
        assert!(!can_manage(&o, stranger, None));
        assert!(!can_cancel(&o, stranger));
    }

    #[test]
    fn test_admin_can_do_everything() {
        let o = order(10, 1);
        let admin = actor(1, UserRole::Admin);
        assert!(can_view(&o, admin, None));
        assert!(can_manage(&o, admin, None));
        assert!(can_cancel(&o, admin));
    }

    #[test]
    fn test_merge_lines_sums_duplicates_in_order() {
        let line = |id, quantity| NewOrderLine {
            product_id: ProductId::new(id),
            quantity,
        };
        let merged = merge_lines(&[line(3, 1), line(1, 2), line(3, 4)]);
        assert_eq!(merged, vec![line(3, 5), line(1, 2)]);
    }

    #[test]
    fn test_next_order_number_is_for_today() {
        let number = next_order_number().unwrap();
        let today = Utc::now().format("%y%m%d").to_string();
        assert!(number.as_str().starts_with(&format!("ART{today}")));
        assert_eq!(number.as_str().len(), 13);
    }
}
