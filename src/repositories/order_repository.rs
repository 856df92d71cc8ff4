use async_trait::async_trait;
use chrono::Utc;
use metrics::{counter, histogram};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::entities::{order, order_item};
use crate::errors::ServiceError;
use crate::models::{money, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};

use super::OrderStore;

/// SeaORM-backed order store (SQLite or PostgreSQL)
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: Arc<DatabaseConnection>,
}

impl OrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn load_items<C: ConnectionTrait>(
        conn: &C,
        order_id: i32,
    ) -> Result<Vec<order_item::Model>, DbErr> {
        order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Id)
            .all(conn)
            .await
    }

    async fn insert_items<C: ConnectionTrait>(
        conn: &C,
        order_id: i32,
        items: Vec<NewOrderItem>,
    ) -> Result<Vec<order_item::Model>, DbErr> {
        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            let model = order_item::ActiveModel {
                order_id: Set(order_id),
                flower_name: Set(item.flower_name),
                quantity: Set(item.quantity),
                unit_price: Set(money(item.unit_price)),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            inserted.push(model);
        }
        Ok(inserted)
    }
}

fn model_to_order(model: order::Model, items: Vec<order_item::Model>) -> Order {
    Order {
        id: model.id,
        customer_name: model.customer_name,
        customer_email: model.customer_email,
        order_date: model.order_date,
        total_amount: money(model.total_amount),
        status: model.status,
        items: items.into_iter().map(model_to_item).collect(),
    }
}

fn model_to_item(model: order_item::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        flower_name: model.flower_name,
        quantity: model.quantity,
        unit_price: money(model.unit_price),
    }
}

fn record_operation<T>(operation: &'static str, started: Instant, result: &Result<T, ServiceError>) {
    histogram!(
        "flowershop_db.operation.duration_ms",
        started.elapsed().as_secs_f64() * 1000.0,
        "operation" => operation
    );
    match result {
        Ok(_) => counter!("flowershop_db.operation.success", 1, "operation" => operation),
        Err(_) => counter!("flowershop_db.operation.failure", 1, "operation" => operation),
    }
}

impl OrderRepository {
    async fn fetch_order(&self, id: i32) -> Result<Option<Order>, ServiceError> {
        let db = self.get_db();
        let Some(model) = order::Entity::find_by_id(id).one(db).await? else {
            debug!("Order not found");
            return Ok(None);
        };
        let items = Self::load_items(db, id).await?;
        Ok(Some(model_to_order(model, items)))
    }

    async fn fetch_all(&self) -> Result<Vec<Order>, ServiceError> {
        let db = self.get_db();
        let orders = order::Entity::find()
            .order_by_asc(order::Column::Id)
            .all(db)
            .await?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let mut items_by_order: HashMap<i32, Vec<order_item::Model>> = HashMap::new();
        for item in order_item::Entity::find()
            .order_by_asc(order_item::Column::OrderId)
            .order_by_asc(order_item::Column::Id)
            .all(db)
            .await?
        {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|model| {
                let items = items_by_order.remove(&model.id).unwrap_or_default();
                model_to_order(model, items)
            })
            .collect())
    }

    async fn insert_order(&self, new_order: NewOrder) -> Result<Order, ServiceError> {
        let txn = self.get_db().begin().await.map_err(|e| {
            error!(error = %e, "Failed to begin order creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        let model = order::ActiveModel {
            customer_name: Set(new_order.customer_name),
            customer_email: Set(new_order.customer_email),
            order_date: Set(Utc::now()),
            total_amount: Set(money(new_order.total_amount)),
            status: Set(OrderStatus::Pending),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let items = Self::insert_items(&txn, model.id, new_order.items).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = model.id, "Failed to commit order creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = model.id, "Order created successfully");
        Ok(model_to_order(model, items))
    }

    async fn replace_order(
        &self,
        id: i32,
        new_order: NewOrder,
    ) -> Result<Option<Order>, ServiceError> {
        let txn = self.get_db().begin().await.map_err(|e| {
            error!(error = %e, "Failed to begin order update transaction");
            ServiceError::DatabaseError(e)
        })?;

        let Some(existing) = order::Entity::find_by_id(id).one(&txn).await? else {
            warn!("Order not found for update");
            txn.rollback().await?;
            return Ok(None);
        };

        let mut active: order::ActiveModel = existing.into();
        active.customer_name = Set(new_order.customer_name);
        active.customer_email = Set(new_order.customer_email);
        active.total_amount = Set(money(new_order.total_amount));
        let updated = active.update(&txn).await?;

        let removed = order_item::Entity::delete_many()
            .filter(order_item::Column::OrderId.eq(id))
            .exec(&txn)
            .await?;
        let items = Self::insert_items(&txn, id, new_order.items).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit order update transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            replaced_items = removed.rows_affected,
            "Order updated successfully"
        );
        Ok(Some(model_to_order(updated, items)))
    }

    async fn mark_cancelled(&self, id: i32) -> Result<bool, ServiceError> {
        let txn = self.get_db().begin().await.map_err(|e| {
            error!(error = %e, "Failed to begin order cancellation transaction");
            ServiceError::DatabaseError(e)
        })?;

        let Some(existing) = order::Entity::find_by_id(id).one(&txn).await? else {
            warn!("Order not found for cancellation");
            txn.rollback().await?;
            return Ok(false);
        };

        if existing.status == OrderStatus::Cancelled {
            debug!("Order already cancelled");
            txn.rollback().await?;
            return Ok(true);
        }

        let mut active: order::ActiveModel = existing.into();
        active.status = Set(OrderStatus::Cancelled);
        active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit order cancellation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!("Order cancelled successfully");
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    #[instrument(skip(self), fields(order_id = id))]
    async fn get_order(&self, id: i32) -> Result<Option<Order>, ServiceError> {
        let started = Instant::now();
        let result = self.fetch_order(id).await;
        record_operation("get_order", started, &result);
        result
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, ServiceError> {
        let started = Instant::now();
        let result = self.fetch_all().await;
        record_operation("list_orders", started, &result);
        result
    }

    #[instrument(skip(self, new_order), fields(customer_email = %new_order.customer_email, item_count = new_order.items.len()))]
    async fn create_order(&self, new_order: NewOrder) -> Result<Order, ServiceError> {
        let started = Instant::now();
        let result = self.insert_order(new_order).await;
        record_operation("create_order", started, &result);
        result
    }

    #[instrument(skip(self, new_order), fields(order_id = id, item_count = new_order.items.len()))]
    async fn update_order(
        &self,
        id: i32,
        new_order: NewOrder,
    ) -> Result<Option<Order>, ServiceError> {
        let started = Instant::now();
        let result = self.replace_order(id, new_order).await;
        record_operation("update_order", started, &result);
        result
    }

    #[instrument(skip(self), fields(order_id = id))]
    async fn cancel_order(&self, id: i32) -> Result<bool, ServiceError> {
        let started = Instant::now();
        let result = self.mark_cancelled(id).await;
        record_operation("cancel_order", started, &result);
        result
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        crate::db::check_connection(self.get_db()).await
    }
}
