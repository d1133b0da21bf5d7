//! Order endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use artisania_core::{
    OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, ShippingAddress, UserId,
};

use super::address::ShippingAddressInput;
use super::extract::{QueryParams, ValidatedJson, clean, parse_id};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAdmin, RequireAuth, RequireSeller};
use crate::models::{NewOrder, NewOrderLine, PageParams, StatusChange};
use crate::services::orders::OrderService;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub product_id: ProductId,
    #[validate(range(min = 1, max = 1000, message = "Quantity must be between 1 and 1000"))]
    pub quantity: u32,
}

/// POST /api/orders body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(
        length(min = 1, message = "Order must contain at least one item"),
        nested
    )]
    #[serde(default)]
    pub items: Vec<OrderLineInput>,
    #[validate(nested)]
    #[serde(default)]
    pub shipping_address: ShippingAddressInput,
    #[validate(nested)]
    pub billing_address: Option<ShippingAddressInput>,
    pub payment_method: Option<PaymentMethod>,
    #[validate(length(max = 500, message = "Customer notes must be less than 500 characters"))]
    pub customer_notes: Option<String>,
}

impl CreateOrderRequest {
    fn into_new_order(self, customer: UserId) -> NewOrder {
        NewOrder {
            customer_id: customer,
            lines: self
                .items
                .iter()
                .map(|line| NewOrderLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
            shipping_address: ShippingAddress::from(self.shipping_address),
            billing_address: self.billing_address.map(ShippingAddress::from),
            payment_method: self.payment_method.unwrap_or_default(),
            customer_notes: clean(self.customer_notes),
        }
    }
}

/// PUT /api/orders/{id}/status body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[validate(length(max = 200, message = "Note must be less than 200 characters"))]
    pub note: Option<String>,
    #[validate(length(max = 100, message = "Tracking number must be less than 100 characters"))]
    pub tracking_number: Option<String>,
    #[validate(length(max = 100, message = "Carrier must be less than 100 characters"))]
    pub carrier: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// PUT /api/orders/{id}/cancel body. The body itself is optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CancelRequest {
    #[validate(length(max = 200, message = "Reason must be less than 200 characters"))]
    pub reason: Option<String>,
}

impl CancelRequest {
    fn from_body(body: &Bytes) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let req: Self = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
        req.validate()?;
        Ok(req)
    }
}

/// PUT /api/orders/{id}/payment body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub payment_status: PaymentStatus,
    #[validate(length(max = 100, message = "Transaction ID must be less than 100 characters"))]
    pub transaction_id: Option<String>,
}

/// `?page=&limit=&status=` on order lists.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub status: Option<OrderStatus>,
}

fn default_page() -> u32 {
    PageParams::default().page
}

fn default_limit() -> u32 {
    PageParams::default().limit
}

impl OrderListQuery {
    const fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

fn service(state: &AppState) -> OrderService<'_> {
    OrderService::new(state.pool(), &state.config().pricing)
}

/// Every order.
///
/// GET /api/orders
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    QueryParams(query): QueryParams<OrderListQuery>,
) -> Result<Json<Value>> {
    let page = service(&state)
        .list_all(query.status, query.page_params())
        .await?;
    Ok(Json(json!({
        "orders": page.items,
        "pagination": page.pagination,
    })))
}

/// Statistics scoped to the caller's role.
///
/// GET /api/orders/stats
pub async fn stats(State(state): State<AppState>, auth: RequireAuth) -> Result<Json<Value>> {
    let stats = service(&state).stats(auth.actor()).await?;
    Ok(Json(json!({ "stats": stats })))
}

/// GET /api/orders/my-orders
pub async fn mine(
    State(state): State<AppState>,
    auth: RequireAuth,
    QueryParams(query): QueryParams<OrderListQuery>,
) -> Result<Json<Value>> {
    let page = service(&state)
        .list_mine(auth.actor(), query.status, query.page_params())
        .await?;
    Ok(Json(json!({
        "orders": page.items,
        "pagination": page.pagination,
    })))
}

/// Orders placed with the caller's shop.
///
/// GET /api/orders/shop-orders
pub async fn for_shop(
    State(state): State<AppState>,
    seller: RequireSeller,
    QueryParams(query): QueryParams<OrderListQuery>,
) -> Result<Json<Value>> {
    let page = service(&state)
        .list_for_shop(seller.actor(), query.status, query.page_params())
        .await?;
    Ok(Json(json!({
        "orders": page.items,
        "pagination": page.pagination,
    })))
}

/// An order with its items and timeline.
///
/// GET /api/orders/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let order = service(&state).get(auth.actor(), id).await?;
    Ok(Json(json!({ "order": order })))
}

/// GET /api/orders/{id}/timeline
pub async fn timeline(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let timeline = service(&state).timeline(auth.actor(), id).await?;
    Ok(Json(json!({ "timeline": timeline })))
}

/// Place an order with a single shop.
///
/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let order = service(&state)
        .place(req.into_new_order(customer.id))
        .await?;

    let number = order.order.order_number.to_string();
    add_breadcrumb("order", "Order placed", Some(&[("order_number", number.as_str())]));

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order created successfully",
            "order": order,
        })),
    ))
}

/// Move an order along its lifecycle.
///
/// PUT /api/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let actor = auth.actor();
    let change = StatusChange {
        to: req.status,
        note: clean(req.note),
        actor: actor.id,
        tracking_number: clean(req.tracking_number),
        carrier: clean(req.carrier),
        estimated_delivery: req.estimated_delivery,
    };

    let order = service(&state).update_status(actor, id, &change).await?;
    Ok(Json(json!({
        "message": "Order status updated successfully",
        "order": order,
    })))
}

/// Cancel an order before it ships.
///
/// PUT /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let req = CancelRequest::from_body(&body)?;

    let order = service(&state)
        .cancel(auth.actor(), id, clean(req.reason))
        .await?;
    Ok(Json(json!({
        "message": "Order cancelled successfully",
        "order": order,
    })))
}

/// Record a payment outcome.
///
/// PUT /api/orders/{id}/payment
pub async fn update_payment(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PaymentRequest>,
) -> Result<Json<Value>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let transaction_id = clean(req.transaction_id);
    let order = service(&state)
        .update_payment(auth.actor(), id, req.payment_status, transaction_id.as_deref())
        .await?;
    Ok(Json(json!({
        "message": "Payment status updated successfully",
        "order": order,
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shipping() -> Value {
        json!({
            "firstName": "Salma",
            "lastName": "Tazi",
            "street": "7 Rue des Potiers",
            "city": "Safi",
            "postalCode": "46000",
            "phone": "0661000000"
        })
    }

    #[test]
    fn test_create_order_request() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "items": [{ "productId": 4, "quantity": 2 }, { "productId": 9, "quantity": 1 }],
            "shippingAddress": shipping(),
            "paymentMethod": "bank_transfer",
            "customerNotes": "  Please wrap as a gift  "
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let order = req.into_new_order(UserId::new(12));
        assert_eq!(order.customer_id, UserId::new(12));
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines.first().unwrap().product_id, ProductId::new(4));
        assert_eq!(order.payment_method, PaymentMethod::BankTransfer);
        assert_eq!(order.customer_notes.as_deref(), Some("Please wrap as a gift"));
        assert_eq!(order.shipping_address.country, "Morocco");
    }

    #[test]
    fn test_create_order_request_errors() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "items": [{ "productId": 4, "quantity": 0 }],
            "shippingAddress": { "firstName": "Salma" }
        }))
        .unwrap();
        let fields: Vec<String> = crate::error::field_errors(&req.validate().unwrap_err())
            .into_iter()
            .map(|f| f.field)
            .collect();
        assert!(fields.contains(&"items[0].quantity".to_string()));
        assert!(fields.contains(&"shippingAddress.city".to_string()));
        assert!(fields.contains(&"shippingAddress.phone".to_string()));

        let empty: CreateOrderRequest =
            serde_json::from_value(json!({ "items": [], "shippingAddress": shipping() })).unwrap();
        assert!(empty.validate().unwrap_err().field_errors().contains_key("items"));
    }

    #[test]
    fn test_cancel_body_is_optional() {
        assert!(CancelRequest::from_body(&Bytes::new()).unwrap().reason.is_none());
        let req = CancelRequest::from_body(&Bytes::from_static(br#"{"reason":"Changed my mind"}"#))
            .unwrap();
        assert_eq!(req.reason.as_deref(), Some("Changed my mind"));
        assert!(CancelRequest::from_body(&Bytes::from_static(b"{oops")).is_err());
    }

    #[test]
    fn test_status_request_parses_dates() {
        let req: UpdateStatusRequest = serde_json::from_value(json!({
            "status": "shipped",
            "trackingNumber": "AMANA-123",
            "carrier": "Amana",
            "estimatedDelivery": "2025-03-14T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(req.status, OrderStatus::Shipped);
        assert!(req.estimated_delivery.is_some());
        assert!(serde_json::from_value::<UpdateStatusRequest>(json!({ "status": "lost" })).is_err());
    }
}
