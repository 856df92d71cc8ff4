use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::handlers::orders::{OrderItemRequest, OrderRequest};
use crate::models::{Order, OrderItem, OrderStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Flower Shop API",
        version = "1.0.0",
        description = r#"
# Flower Shop Order API

Create, read, update and cancel flower orders. Each order carries its line
items; cancelling an order only changes its status.

## Error Handling

Missing orders return `404` with an empty body. Other failures use a JSON body:

```json
{
  "error": "Bad Request",
  "message": "Validation error: ...",
  "request_id": "3f6b0d8e-...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

Every response carries an `x-request-id` header.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "orders", description = "Order management endpoints")
    ),
    paths(
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::cancel_order,
    ),
    components(
        schemas(
            Order,
            OrderItem,
            OrderStatus,
            OrderRequest,
            OrderItemRequest,
            ErrorResponse,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Flower Shop API"));
        assert!(json.contains("/api/orders/{id}/cancel"));
        assert!(json.contains("OrderRequest"));
    }
}
