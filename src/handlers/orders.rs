use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::errors::ServiceError;
use crate::models::{NewOrder, NewOrderItem, Order};
use crate::AppState;

/// Order payload accepted by create and update.
///
/// `id`, `orderDate`, `status` and item ids may be present in the body; they
/// are ignored because the server owns them.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[validate(length(min = 1, message = "customerName must not be empty"))]
    #[schema(example = "Ann")]
    pub customer_name: String,

    #[validate(email(message = "customerEmail must be a valid email address"))]
    #[schema(example = "ann@example.com")]
    pub customer_email: String,

    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = String, example = "30.00")]
    pub total_amount: Decimal,

    #[serde(default)]
    #[validate]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[validate(length(min = 1, message = "flowerName must not be empty"))]
    #[schema(example = "Rose")]
    pub flower_name: String,

    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    #[schema(example = 2)]
    pub quantity: i32,

    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = String, example = "15.00")]
    pub unit_price: Decimal,
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

impl From<OrderRequest> for NewOrder {
    fn from(request: OrderRequest) -> Self {
        NewOrder {
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            total_amount: request.total_amount,
            items: request
                .items
                .into_iter()
                .map(|item| NewOrderItem {
                    flower_name: item.flower_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
        }
    }
}

/// Creates the router for order endpoints
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).put(update_order))
        .route("/:id/cancel", post(cancel_order))
}

/// Get an order by id
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    summary = "Get order",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved successfully", body = Order,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Order>, ServiceError> {
    let order = state
        .store
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::order_not_found(id))?;
    Ok(Json(order))
}

/// List all orders
#[utoipa::path(
    get,
    path = "/api/orders",
    summary = "List orders",
    description = "Every order with its items, ordered by id",
    responses(
        (status = 200, description = "Orders retrieved successfully", body = [Order]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ServiceError> {
    let orders = state.store.list_orders().await?;
    Ok(Json(orders))
}

/// Create a new order
#[utoipa::path(
    post,
    path = "/api/orders",
    summary = "Create order",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = Order,
            headers(("Location" = String, description = "URL of the created order"))
        ),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Order>), ServiceError> {
    request.validate()?;

    let order = state.store.create_order(request.into()).await?;
    info!(order_id = order.id, "Order created");

    let location = format!("/api/orders/{}", order.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(order),
    ))
}

/// Replace an order's customer details, total and items
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    summary = "Update order",
    description = "Id, order date and status are kept; any id in the body is ignored",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order updated successfully", body = Order),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<OrderRequest>,
) -> Result<Json<Order>, ServiceError> {
    request.validate()?;

    let order = state
        .store
        .update_order(id, request.into())
        .await?
        .ok_or_else(|| ServiceError::order_not_found(id))?;
    info!(order_id = id, "Order updated");
    Ok(Json(order))
}

/// Cancel an order
#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    summary = "Cancel order",
    description = "Sets the status to Cancelled. Cancelling twice succeeds both times.",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order cancelled"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServiceError> {
    if !state.store.cancel_order(id).await? {
        return Err(ServiceError::order_not_found(id));
    }
    info!(order_id = id, "Order cancelled");
    Ok(StatusCode::NO_CONTENT)
}
