use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::errors::ServiceError;
use crate::models::{money, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};

use super::OrderStore;

#[derive(Debug, Default)]
struct Inner {
    orders: BTreeMap<i32, Order>,
    next_order_id: i32,
    next_item_id: i32,
}

impl Inner {
    fn allocate_order_id(&mut self) -> i32 {
        self.next_order_id += 1;
        self.next_order_id
    }

    fn build_items(&mut self, order_id: i32, items: Vec<NewOrderItem>) -> Vec<OrderItem> {
        items
            .into_iter()
            .map(|item| {
                self.next_item_id += 1;
                OrderItem {
                    id: self.next_item_id,
                    order_id,
                    flower_name: item.flower_name,
                    quantity: item.quantity,
                    unit_price: money(item.unit_price),
                }
            })
            .collect()
    }
}

/// Process-local order store. Ids are assigned sequentially from 1, the same
/// way the database's auto-increment columns hand them out.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<Inner>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders, cancelled ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_order(&self, id: i32) -> Result<Option<Order>, ServiceError> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ServiceError> {
        Ok(self.inner.read().await.orders.values().cloned().collect())
    }

    #[instrument(skip(self, new_order), fields(item_count = new_order.items.len()))]
    async fn create_order(&self, new_order: NewOrder) -> Result<Order, ServiceError> {
        let mut inner = self.inner.write().await;
        let id = inner.allocate_order_id();
        let items = inner.build_items(id, new_order.items);
        let order = Order {
            id,
            customer_name: new_order.customer_name,
            customer_email: new_order.customer_email,
            order_date: Utc::now(),
            total_amount: money(new_order.total_amount),
            status: OrderStatus::Pending,
            items,
        };
        inner.orders.insert(id, order.clone());
        info!(order_id = id, "Order created in memory");
        Ok(order)
    }

    #[instrument(skip(self, new_order), fields(order_id = id))]
    async fn update_order(
        &self,
        id: i32,
        new_order: NewOrder,
    ) -> Result<Option<Order>, ServiceError> {
        let mut inner = self.inner.write().await;
        if !inner.orders.contains_key(&id) {
            warn!("Order not found for update");
            return Ok(None);
        }

        let items = inner.build_items(id, new_order.items);
        let Some(order) = inner.orders.get_mut(&id) else {
            return Ok(None);
        };
        order.customer_name = new_order.customer_name;
        order.customer_email = new_order.customer_email;
        order.total_amount = money(new_order.total_amount);
        order.items = items;
        debug!("Order updated in memory");
        Ok(Some(order.clone()))
    }

    #[instrument(skip(self), fields(order_id = id))]
    async fn cancel_order(&self, id: i32) -> Result<bool, ServiceError> {
        let mut inner = self.inner.write().await;
        match inner.orders.get_mut(&id) {
            Some(order) => {
                order.status = OrderStatus::Cancelled;
                Ok(true)
            }
            None => {
                warn!("Order not found for cancellation");
                Ok(false)
            }
        }
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}
