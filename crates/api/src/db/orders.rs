//! Order repository.
//!
//! Placing an order and changing its status each run in a single
//! transaction. Product rows are locked (`FOR UPDATE`) in id order before
//! stock is checked, so two concurrent orders for the last unit cannot both
//! succeed, and the stock decrement is additionally guarded by
//! `stock >= quantity`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use artisania_core::{
    LineAmount, Money, MoneyError, OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentMethod,
    PaymentStatus, PricingBreakdown, PricingPolicy, ProductId, ShippingAddress, ShopId,
    TimelineEntryId, TransitionError, UserId,
};

use super::RepositoryError;
use super::shops::recompute_stats;
use crate::models::order::{PaymentDetails, ProductSnapshot, ShippingDetails};
use crate::models::{
    NewOrder, Order, OrderDetail, OrderItem, OrderScope, OrderStats, OrderWithItems, Page,
    PageParams, ProductImage, StatusChange, TimelineEntry,
};

/// Errors from the write paths of [`OrderRepository`].
#[derive(Debug, Error)]
pub enum OrderWriteError {
    /// The product does not exist, is inactive, or belongs to an inactive shop.
    #[error("product {0} is not available")]
    ProductUnavailable(ProductId),

    #[error("insufficient stock for {name}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: i32,
        requested: u32,
    },

    /// The lines reference products from more than one shop.
    #[error("all products in an order must come from the same shop")]
    MixedShops,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Pricing(#[from] MoneyError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderWriteError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

const ORDER_COLUMNS: &str = "id, order_number, customer_id, shop_id, shipping_address, \
     billing_address, subtotal, shipping_cost, tax, total, status, payment_status, \
     payment_method, transaction_id, paid_at, tracking_number, carrier, \
     estimated_delivery, actual_delivery, customer_notes, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, quantity, unit_price, product_name, product_image, shop_name";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    customer_id: UserId,
    shop_id: ShopId,
    shipping_address: Json<ShippingAddress>,
    billing_address: Option<Json<ShippingAddress>>,
    subtotal: Money,
    shipping_cost: Money,
    tax: Money,
    total: Money,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_method: PaymentMethod,
    transaction_id: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    tracking_number: Option<String>,
    carrier: Option<String>,
    estimated_delivery: Option<DateTime<Utc>>,
    actual_delivery: Option<DateTime<Utc>>,
    customer_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        let order_number = OrderNumber::parse(&r.order_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
        })?;

        Ok(Self {
            id: r.id,
            order_number,
            customer_id: r.customer_id,
            shop_id: r.shop_id,
            shipping_address: r.shipping_address.0,
            billing_address: r.billing_address.map(|a| a.0),
            pricing: PricingBreakdown {
                subtotal: r.subtotal,
                shipping_cost: r.shipping_cost,
                tax: r.tax,
                total: r.total,
            },
            status: r.status,
            payment: PaymentDetails {
                status: r.payment_status,
                method: r.payment_method,
                transaction_id: r.transaction_id,
                paid_at: r.paid_at,
            },
            shipping_details: ShippingDetails {
                tracking_number: r.tracking_number,
                carrier: r.carrier,
                estimated_delivery: r.estimated_delivery,
                actual_delivery: r.actual_delivery,
            },
            customer_notes: r.customer_notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    unit_price: Money,
    product_name: String,
    product_image: Option<String>,
    shop_name: String,
}

impl From<ItemRow> for OrderItem {
    fn from(r: ItemRow) -> Self {
        Self {
            id: r.id,
            product_id: r.product_id,
            quantity: r.quantity,
            price: r.unit_price,
            product_snapshot: ProductSnapshot {
                name: r.product_name,
                image: r.product_image,
                shop_name: r.shop_name,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct TimelineRow {
    id: TimelineEntryId,
    status: OrderStatus,
    note: Option<String>,
    updated_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl From<TimelineRow> for TimelineEntry {
    fn from(r: TimelineRow) -> Self {
        Self {
            id: r.id,
            status: r.status,
            note: r.note,
            updated_by: r.updated_by,
            timestamp: r.created_at,
        }
    }
}

/// A product row locked for the duration of order placement.
#[derive(Debug, sqlx::FromRow)]
struct LockedProduct {
    id: ProductId,
    shop_id: ShopId,
    name: String,
    price: Money,
    stock: i32,
    images: Json<Vec<ProductImage>>,
    is_active: bool,
    shop_name: String,
    shop_active: bool,
}

/// A checked order line ready to be written.
#[derive(Debug)]
struct PricedLine<'p> {
    product: &'p LockedProduct,
    quantity: i32,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_orders: i64,
    pending_orders: i64,
    delivered_orders: i64,
    revenue_orders: i64,
    total_revenue: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order: lock and check the products, price the lines,
    /// decrement stock, and write the order, its items, and its first
    /// timeline entry.
    ///
    /// Lines for the same product must already be merged.
    ///
    /// # Errors
    ///
    /// - `ProductUnavailable` / `InsufficientStock` / `MixedShops` when the
    ///   order cannot be fulfilled; nothing is written.
    /// - `Repository(Conflict)` if `number` is already taken.
    pub async fn place(
        &self,
        order: &NewOrder,
        number: &OrderNumber,
        policy: &PricingPolicy,
    ) -> Result<OrderDetail, OrderWriteError> {
        let mut tx = self.pool.begin().await?;

        let ids: Vec<i32> = order.lines.iter().map(|l| l.product_id.as_i32()).collect();
        let products = sqlx::query_as::<_, LockedProduct>(
            r"
            SELECT p.id, p.shop_id, p.name, p.price, p.stock, p.images, p.is_active,
                   s.name AS shop_name, s.is_active AS shop_active
            FROM products p JOIN shops s ON s.id = p.shop_id
            WHERE p.id = ANY($1)
            ORDER BY p.id
            FOR UPDATE OF p
            ",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        let lines = check_lines(order, &products)?;
        let Some(shop_id) = lines.first().map(|l| l.product.shop_id) else {
            return Err(MoneyError::NoLines.into());
        };

        let amounts: Vec<LineAmount> = lines
            .iter()
            .map(|l| LineAmount {
                unit_price: l.product.price,
                quantity: l.quantity.unsigned_abs(),
            })
            .collect();
        let pricing = policy.quote(&amounts)?;

        for line in &lines {
            let result =
                sqlx::query("UPDATE products SET stock = stock - $2, updated_at = now() WHERE id = $1 AND stock >= $2")
                    .bind(line.product.id)
                    .bind(line.quantity)
                    .execute(&mut *tx)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(OrderWriteError::InsufficientStock {
                    product_id: line.product.id,
                    name: line.product.name.clone(),
                    available: line.product.stock,
                    requested: line.quantity.unsigned_abs(),
                });
            }
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (
                order_number, customer_id, shop_id, shipping_address, billing_address,
                subtotal, shipping_cost, tax, total, payment_method, customer_notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(number.as_str())
        .bind(order.customer_id)
        .bind(shop_id)
        .bind(Json(&order.shipping_address))
        .bind(order.billing_address.as_ref().map(Json))
        .bind(pricing.subtotal)
        .bind(pricing.shipping_cost)
        .bind(pricing.tax)
        .bind(pricing.total)
        .bind(order.payment_method)
        .bind(order.customer_notes.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "order number"))?;
        let placed = Order::try_from(row)?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let image = line.product.images.0.first().map(|i| i.url.clone());
            let item = sqlx::query_as::<_, ItemRow>(&format!(
                r"
                INSERT INTO order_items (
                    order_id, product_id, quantity, unit_price, product_name, product_image, shop_name
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {ITEM_COLUMNS}
                "
            ))
            .bind(placed.id)
            .bind(line.product.id)
            .bind(line.quantity)
            .bind(line.product.price)
            .bind(&line.product.name)
            .bind(image)
            .bind(&line.product.shop_name)
            .fetch_one(&mut *tx)
            .await?;
            items.push(OrderItem::from(item));
        }

        let entry = insert_timeline(
            &mut tx,
            placed.id,
            OrderStatus::Pending,
            Some("Order placed"),
            Some(order.customer_id),
        )
        .await?;

        tx.commit().await?;

        Ok(OrderDetail {
            order: placed,
            items,
            timeline: vec![entry],
        })
    }

    /// Get an order without its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Get an order with its items and timeline.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.items(id).await?;
        let timeline = self.timeline(id).await?;
        Ok(Some(OrderDetail {
            order,
            items,
            timeline,
        }))
    }

    /// Lines of an order, in the order they were written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// Status history of an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn timeline(&self, id: OrderId) -> Result<Vec<TimelineEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, TimelineRow>(
            "SELECT id, status, note, updated_by, created_at FROM order_timeline \
             WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(TimelineEntry::from).collect())
    }

    /// List orders in `scope`, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        scope: OrderScope,
        status: Option<OrderStatus>,
        params: PageParams,
    ) -> Result<Page<OrderWithItems>, RepositoryError> {
        let (shop, customer) = scope_binds(scope);

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::integer IS NULL OR shop_id = $1)
              AND ($2::integer IS NULL OR customer_id = $2)
              AND ($3::order_status IS NULL OR status = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "
        ))
        .bind(shop)
        .bind(customer)
        .bind(status)
        .bind(params.sql_limit())
        .bind(params.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM orders
            WHERE ($1::integer IS NULL OR shop_id = $1)
              AND ($2::integer IS NULL OR customer_id = $2)
              AND ($3::order_status IS NULL OR status = $3)
            ",
        )
        .bind(shop)
        .bind(customer)
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let item_rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, id"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            by_order.entry(row.order_id).or_default().push(row.into());
        }

        let items = orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect();

        Ok(Page::new(items, params, total))
    }

    /// Move an order to a new status.
    ///
    /// The order row is locked, the transition checked against the current
    /// status, and the side effects applied in the same transaction:
    /// cancellation restocks, delivery stamps `actual_delivery` and counts
    /// product sales, refund takes those sales back and marks a collected
    /// payment refunded. Shop statistics are recomputed when the order enters
    /// a state they depend on.
    ///
    /// # Errors
    ///
    /// - `Repository(NotFound)` if the order does not exist.
    /// - `Transition` if the move is not allowed from the current status.
    pub async fn transition(
        &self,
        id: OrderId,
        change: &StatusChange,
    ) -> Result<OrderDetail, OrderWriteError> {
        let mut tx = self.pool.begin().await?;

        let (current, payment, shop_id) =
            sqlx::query_as::<_, (OrderStatus, PaymentStatus, ShopId)>(
                "SELECT status, payment_status, shop_id FROM orders WHERE id = $1 FOR UPDATE",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let next = current.transition_to(change.to)?;
        let payment = if next == OrderStatus::Refunded {
            payment.refunded()
        } else {
            payment
        };

        sqlx::query(
            r"
            UPDATE orders SET
                status = $2,
                tracking_number = COALESCE($3, tracking_number),
                carrier = COALESCE($4, carrier),
                estimated_delivery = COALESCE($5, estimated_delivery),
                actual_delivery = CASE WHEN $2 = 'delivered'::order_status
                                       THEN now() ELSE actual_delivery END,
                payment_status = $6,
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(next)
        .bind(change.tracking_number.as_deref())
        .bind(change.carrier.as_deref())
        .bind(change.estimated_delivery)
        .bind(payment)
        .execute(&mut *tx)
        .await?;

        if next.restores_stock() {
            sqlx::query(
                r"
                UPDATE products p SET stock = p.stock + i.quantity, updated_at = now()
                FROM (
                    SELECT product_id, SUM(quantity)::integer AS quantity
                    FROM order_items WHERE order_id = $1 GROUP BY product_id
                ) i
                WHERE p.id = i.product_id
                ",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let sales_delta = next.sales_delta();
        if sales_delta != 0 {
            sqlx::query(
                r"
                UPDATE products p
                SET total_sales = GREATEST(p.total_sales + $2 * i.quantity, 0)
                FROM (
                    SELECT product_id, SUM(quantity)::integer AS quantity
                    FROM order_items WHERE order_id = $1 GROUP BY product_id
                ) i
                WHERE p.id = i.product_id
                ",
            )
            .bind(id)
            .bind(sales_delta)
            .execute(&mut *tx)
            .await?;
        }

        insert_timeline(
            &mut tx,
            id,
            next,
            change.note.as_deref(),
            Some(change.actor),
        )
        .await?;

        if matches!(next, OrderStatus::Delivered | OrderStatus::Refunded) {
            recompute_stats(&mut *tx, shop_id).await?;
        }

        tx.commit().await?;

        self.get_detail(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound.into())
    }

    /// Record a payment outcome. `paid_at` is stamped the first time the
    /// order is marked paid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn set_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders SET
                payment_status = $2,
                transaction_id = COALESCE($3, transaction_id),
                paid_at = CASE WHEN $2 = 'paid'::payment_status
                               THEN COALESCE(paid_at, now()) ELSE paid_at END,
                updated_at = now()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .bind(transaction_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Order::try_from(row)
    }

    /// Aggregate figures over the orders in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self, scope: OrderScope) -> Result<OrderStats, RepositoryError> {
        let (shop, customer) = scope_binds(scope);

        let row = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_orders,
                COUNT(*) FILTER (WHERE status = 'delivered') AS delivered_orders,
                COUNT(*) FILTER (WHERE status NOT IN ('cancelled', 'refunded')) AS revenue_orders,
                COALESCE(SUM(total) FILTER (WHERE status NOT IN ('cancelled', 'refunded')), 0)
                    AS total_revenue
            FROM orders
            WHERE ($1::integer IS NULL OR shop_id = $1)
              AND ($2::integer IS NULL OR customer_id = $2)
            ",
        )
        .bind(shop)
        .bind(customer)
        .fetch_one(self.pool)
        .await?;

        summarize(&row)
    }
}

/// Match each requested line to its locked product and check it can be
/// fulfilled.
fn check_lines<'p>(
    order: &NewOrder,
    products: &'p [LockedProduct],
) -> Result<Vec<PricedLine<'p>>, OrderWriteError> {
    let mut shop: Option<ShopId> = None;
    let mut lines = Vec::with_capacity(order.lines.len());

    for line in &order.lines {
        let product = products
            .iter()
            .find(|p| p.id == line.product_id)
            .filter(|p| p.is_active && p.shop_active)
            .ok_or(OrderWriteError::ProductUnavailable(line.product_id))?;

        match shop {
            Some(s) if s != product.shop_id => return Err(OrderWriteError::MixedShops),
            _ => shop = Some(product.shop_id),
        }

        let quantity = i32::try_from(line.quantity)
            .ok()
            .filter(|q| *q <= product.stock)
            .ok_or_else(|| OrderWriteError::InsufficientStock {
                product_id: product.id,
                name: product.name.clone(),
                available: product.stock,
                requested: line.quantity,
            })?;

        lines.push(PricedLine { product, quantity });
    }

    Ok(lines)
}

async fn insert_timeline(
    conn: &mut PgConnection,
    order: OrderId,
    status: OrderStatus,
    note: Option<&str>,
    updated_by: Option<UserId>,
) -> Result<TimelineEntry, sqlx::Error> {
    let row = sqlx::query_as::<_, TimelineRow>(
        r"
        INSERT INTO order_timeline (order_id, status, note, updated_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id, status, note, updated_by, created_at
        ",
    )
    .bind(order)
    .bind(status)
    .bind(note)
    .bind(updated_by)
    .fetch_one(conn)
    .await?;

    Ok(row.into())
}

const fn scope_binds(scope: OrderScope) -> (Option<ShopId>, Option<UserId>) {
    match scope {
        OrderScope::All => (None, None),
        OrderScope::Shop(shop) => (Some(shop), None),
        OrderScope::Customer(customer) => (None, Some(customer)),
    }
}

fn summarize(row: &StatsRow) -> Result<OrderStats, RepositoryError> {
    let corrupt = |e: MoneyError| RepositoryError::DataCorruption(format!("order totals: {e}"));

    let total_revenue = Money::new(row.total_revenue).map_err(corrupt)?;
    let average_order_value = if row.revenue_orders == 0 {
        Money::ZERO
    } else {
        let average = row
            .total_revenue
            .checked_div(Decimal::from(row.revenue_orders))
            .unwrap_or_default();
        Money::new(average).map_err(corrupt)?
    };

    Ok(OrderStats {
        total_orders: row.total_orders,
        total_revenue,
        pending_orders: row.pending_orders,
        delivered_orders: row.delivered_orders,
        average_order_value,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::models::NewOrderLine;

    fn product(id: i32, shop: i32, stock: i32) -> LockedProduct {
        LockedProduct {
            id: ProductId::new(id),
            shop_id: ShopId::new(shop),
            name: format!("Product {id}"),
            price: Money::from_cents(1250),
            stock,
            images: Json(Vec::new()),
            is_active: true,
            shop_name: "Atelier".to_owned(),
            shop_active: true,
        }
    }

    fn order(lines: &[(i32, u32)]) -> NewOrder {
        NewOrder {
            customer_id: UserId::new(7),
            lines: lines
                .iter()
                .map(|&(id, quantity)| NewOrderLine {
                    product_id: ProductId::new(id),
                    quantity,
                })
                .collect(),
            shipping_address: ShippingAddress {
                first_name: "Amina".to_owned(),
                last_name: "Benali".to_owned(),
                street: "12 Rue des Potiers".to_owned(),
                city: "Fes".to_owned(),
                postal_code: "30000".to_owned(),
                country: "Morocco".to_owned(),
                phone: "+212 600 000 000".to_owned(),
            },
            billing_address: None,
            payment_method: PaymentMethod::CashOnDelivery,
            customer_notes: None,
        }
    }

    #[test]
    fn test_check_lines_accepts_available_products() {
        let products = vec![product(1, 1, 5), product(2, 1, 1)];
        let lines = check_lines(&order(&[(1, 5), (2, 1)]), &products).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 5);
    }

    #[test]
    fn test_check_lines_rejects_missing_product() {
        let products = vec![product(1, 1, 5)];
        let err = check_lines(&order(&[(9, 1)]), &products).unwrap_err();
        assert!(matches!(err, OrderWriteError::ProductUnavailable(id) if id.as_i32() == 9));
    }

    #[test]
    fn test_check_lines_rejects_inactive_product_and_shop() {
        let mut inactive = product(1, 1, 5);
        inactive.is_active = false;
        let mut closed = product(2, 1, 5);
        closed.shop_active = false;
        let products = vec![inactive, closed];

        assert!(matches!(
            check_lines(&order(&[(1, 1)]), &products),
            Err(OrderWriteError::ProductUnavailable(_))
        ));
        assert!(matches!(
            check_lines(&order(&[(2, 1)]), &products),
            Err(OrderWriteError::ProductUnavailable(_))
        ));
    }

    #[test]
    fn test_check_lines_rejects_insufficient_stock() {
        let products = vec![product(1, 1, 2)];
        let err = check_lines(&order(&[(1, 3)]), &products).unwrap_err();
        match err {
            OrderWriteError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_lines_rejects_mixed_shops() {
        let products = vec![product(1, 1, 5), product(2, 2, 5)];
        let err = check_lines(&order(&[(1, 1), (2, 1)]), &products).unwrap_err();
        assert!(matches!(err, OrderWriteError::MixedShops));
    }

    #[test]
    fn test_summarize_excludes_nothing_when_empty() {
        let stats = summarize(&StatsRow {
            total_orders: 0,
            pending_orders: 0,
            delivered_orders: 0,
            revenue_orders: 0,
            total_revenue: Decimal::ZERO,
        })
        .unwrap();
        assert_eq!(stats, OrderStats::default());
    }

    #[test]
    fn test_summarize_averages_over_revenue_orders() {
        let stats = summarize(&StatsRow {
            total_orders: 4,
            pending_orders: 1,
            delivered_orders: 2,
            revenue_orders: 3,
            total_revenue: Decimal::from_str("100.00").unwrap(),
        })
        .unwrap();
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.average_order_value.to_string(), "33.33");
        assert_eq!(stats.total_revenue.to_string(), "100.00");
    }

    #[test]
    fn test_scope_binds() {
        assert_eq!(scope_binds(OrderScope::All), (None, None));
        assert_eq!(
            scope_binds(OrderScope::Shop(ShopId::new(3))),
            (Some(ShopId::new(3)), None)
        );
        assert_eq!(
            scope_binds(OrderScope::Customer(UserId::new(4))),
            (None, Some(UserId::new(4)))
        );
    }
}
