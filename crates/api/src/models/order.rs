//! Order domain types.

use artisania_core::{
    Money, OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentMethod, PaymentStatus,
    PricingBreakdown, ProductId, ShippingAddress, ShopId, TimelineEntryId, UserId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// An order placed by a customer with a single shop.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer_id: UserId,
    pub shop_id: ShopId,
    pub shipping_address: ShippingAddress,
    pub billing_address: Option<ShippingAddress>,
    pub pricing: PricingBreakdown,
    pub status: OrderStatus,
    pub payment: PaymentDetails,
    pub shipping_details: ShippingDetails,
    pub customer_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub fn is_buyer(&self, user: UserId) -> bool {
        self.customer_id == user
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
}

/// A line of an order with the product as it was when ordered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price at the time of ordering.
    pub price: Money,
    pub product_snapshot: ProductSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub name: String,
    pub image: Option<String>,
    pub shop_name: String,
}

/// One status change in an order's history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: TimelineEntryId,
    pub status: OrderStatus,
    pub note: Option<String>,
    pub updated_by: Option<UserId>,
    pub timestamp: DateTime<Utc>,
}

/// An order with its lines and full timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub timeline: Vec<TimelineEntry>,
}

/// An order with its lines, as returned by list endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Aggregate order figures. Cancelled and refunded orders are counted in
/// `total_orders` but excluded from the revenue figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: i64,
    pub total_revenue: Money,
    pub pending_orders: i64,
    pub delivered_orders: i64,
    pub average_order_value: Money,
}

/// Which orders a list or statistics query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    All,
    Shop(ShopId),
    Customer(UserId),
}

/// An order about to be placed, after request validation.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: UserId,
    pub lines: Vec<NewOrderLine>,
    pub shipping_address: ShippingAddress,
    pub billing_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
    pub customer_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A requested status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub to: OrderStatus,
    pub note: Option<String>,
    pub actor: UserId,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl StatusChange {
    /// A bare status change with no shipping details.
    #[must_use]
    pub const fn new(to: OrderStatus, actor: UserId, note: Option<String>) -> Self {
        Self {
            to,
            note,
            actor,
            tracking_number: None,
            carrier: None,
            estimated_delivery: None,
        }
    }
}
