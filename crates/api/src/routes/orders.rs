//! Order route handlers.
//!
//! Checkout and order reads require authentication. A single order is
//! visible to its owner or an admin; payment capture follows the same
//! rule, while delivery marking is admin-only.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use tamarind_core::OrderId;

use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::{Order, User};
use crate::services::OrderService;
use crate::services::orders::CheckoutRequest;
use crate::state::AppState;

/// `POST /api/orders` - create an order from the caller's cart.
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<Response> {
    let order = OrderService::new(state.pool()).create(user.id, body).await?;
    Ok((StatusCode::CREATED, Json(order)).into_response())
}

/// `GET /api/orders/mine` - the caller's own orders, newest first.
pub async fn list_my_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool()).list_mine(user.id).await?;
    Ok(Json(orders))
}

/// `GET /api/orders` - all orders in the store (admin).
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}` - one order, for its owner or an admin.
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool()).get(id).await?;
    authorize_order_access(&user, &order)?;

    Ok(Json(order))
}

/// `PUT /api/orders/{id}/pay` - capture payment, for the owner or an admin.
///
/// The body is the payment processor's result record and is stored
/// verbatim. Repeating the call on a paid order changes nothing.
pub async fn pay_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
    Json(payment_result): Json<serde_json::Value>,
) -> Result<Json<Order>> {
    let service = OrderService::new(state.pool());

    let order = service.get(id).await?;
    authorize_order_access(&user, &order)?;

    let order = service.capture_payment(id, payment_result).await?;
    Ok(Json(order))
}

/// `PUT /api/orders/{id}/deliver` - mark an order delivered (admin).
///
/// Requires the order to be paid. Repeating the call changes nothing.
pub async fn deliver_order(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool()).mark_delivered(id).await?;
    Ok(Json(order))
}

/// An order is visible to its owner or any admin.
fn authorize_order_access(user: &User, order: &Order) -> Result<()> {
    if order.user.id == user.id || user.role.is_admin() {
        Ok(())
    } else {
        // Hide the order's existence from other customers.
        Err(AppError::NotFound("Order".to_string()))
    }
}
