//! Order ledger routes.
//!
//! Every endpoint requires a token. Owners see and pay their own orders;
//! admins additionally see everyone's and record delivery. A foreign order
//! answers 404, not 403, so order IDs cannot be probed.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use orchard_core::{Envelope, OrderId};

use crate::authz::{Identity, Requirement, authorize};
use crate::db::RepositoryError;
use crate::db::orders::{CreateOrder, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Order, OrderItem, PaymentResult, ShippingAddress};
use crate::services::verify_order_totals;
use crate::state::AppState;

/// Payment gateway result as the client forwards it.
///
/// Field names follow the gateway's own wire shape (`update_time`, nested
/// `payer.email_address`). Only the transaction id is required; whatever
/// else the gateway sent is recorded verbatim, absent fields as empty.
#[derive(Debug, Deserialize)]
pub struct PaymentNotice {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub update_time: String,
    #[serde(default)]
    pub payer: PayerInfo,
}

/// Payer block of a gateway result.
#[derive(Debug, Default, Deserialize)]
pub struct PayerInfo {
    #[serde(default)]
    pub email_address: String,
}

impl From<PaymentNotice> for PaymentResult {
    fn from(notice: PaymentNotice) -> Self {
        Self {
            id: notice.id,
            status: notice.status,
            update_time: notice.update_time,
            email_address: notice.payer.email_address,
        }
    }
}

/// Order placement body. Totals are client-computed and re-verified here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
}

/// Load an order the caller is allowed to see, or 404.
async fn load_visible_order(
    state: &AppState,
    id: OrderId,
    identity: Identity,
) -> Result<Order> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order Not Found".to_owned()))?;

    if !authorize(&identity, Requirement::Owner(order.user_id)) {
        // Indistinguishable from a nonexistent order.
        return Err(AppError::NotFound("Order Not Found".to_owned()));
    }

    Ok(order)
}

/// Place an order from the client's cart snapshot.
///
/// POST /api/orders
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse> {
    if body.order_items.is_empty() {
        return Err(AppError::EmptyCart);
    }
    if body.order_items.iter().any(|item| item.qty <= 0) {
        return Err(AppError::BadRequest(
            "item quantities must be positive".to_owned(),
        ));
    }

    verify_order_totals(
        &body.order_items,
        body.items_price,
        body.tax_price,
        body.shipping_price,
        body.total_price,
    )?;

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .create(CreateOrder {
            user_id: identity.user_id,
            items: body.order_items,
            shipping_address: body.shipping_address,
            payment_method: body.payment_method,
            items_price: body.items_price,
            tax_price: body.tax_price,
            shipping_price: body.shipping_price,
            total_price: body.total_price,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("Order Placed Successfully", order)),
    ))
}

/// The caller's own order history, oldest first.
///
/// GET /api/orders/myorders
pub async fn my_orders(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool());
    let mine = orders.list_mine(identity.user_id).await?;

    Ok(Json(Envelope::success("Orders Fetched Successfully", mine)))
}

/// Every order in the ledger (admin).
///
/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool());
    let all = orders.list_all().await?;

    Ok(Json(Envelope::success("Orders Fetched Successfully", all)))
}

/// One order, visible to its owner and to admins.
///
/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = load_visible_order(&state, id, identity).await?;

    Ok(Json(Envelope::success("Order Fetched Successfully", order)))
}

/// Record a payment gateway result against an order.
///
/// PUT /api/orders/{id}/pay
pub async fn pay_order(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(id): Path<OrderId>,
    Json(notice): Json<PaymentNotice>,
) -> Result<impl IntoResponse> {
    // Ownership gate first; the visible-or-404 rule applies to writes too.
    load_visible_order(&state, id, identity).await?;

    let orders = OrderRepository::new(state.pool());
    let order = orders.mark_paid(id, &notice.into()).await?;

    Ok(Json(Envelope::success("Order Paid Successfully", order)))
}

/// Record delivery of an order (admin).
///
/// PUT /api/orders/{id}/deliver
pub async fn deliver_order(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool());
    let order = orders.mark_delivered(id).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("Order Not Found".to_owned()),
        other => AppError::Repository(other),
    })?;

    Ok(Json(Envelope::success("Order Delivered Successfully", order)))
}
