use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{NewOrder, Order};

pub mod in_memory;
pub mod order_repository;

pub use in_memory::InMemoryOrderStore;
pub use order_repository::OrderRepository;

/// Persistence capability for orders and their line items.
///
/// Absence is reported as `None`/`false`; only failures of the storage
/// engine itself come back as `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch one order with its items in insertion order.
    async fn get_order(&self, id: i32) -> Result<Option<Order>, ServiceError>;

    /// Every order with its items, ascending by id.
    async fn list_orders(&self) -> Result<Vec<Order>, ServiceError>;

    /// Persist a new `Pending` order stamped with the current time.
    async fn create_order(&self, new_order: NewOrder) -> Result<Order, ServiceError>;

    /// Replace the mutable fields and the full item set of an existing order.
    async fn update_order(&self, id: i32, new_order: NewOrder)
        -> Result<Option<Order>, ServiceError>;

    /// Mark an order `Cancelled`. Returns `false` when the order does not exist.
    async fn cancel_order(&self, id: i32) -> Result<bool, ServiceError>;

    /// Reachability check for readiness probes.
    async fn ping(&self) -> Result<(), ServiceError>;
}
