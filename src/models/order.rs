use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of an order. Stored as its variant name.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum OrderStatus {
    #[default]
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// A customer's purchase together with its line items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    #[schema(example = "Ann")]
    pub customer_name: String,
    #[schema(example = "ann@example.com")]
    pub customer_email: String,
    pub order_date: DateTime<Utc>,
    #[schema(value_type = String, example = "30.00")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

/// One purchased line belonging to exactly one order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    #[schema(example = "Rose")]
    pub flower_name: String,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(value_type = String, example = "15.00")]
    pub unit_price: Decimal,
}

/// Caller-owned fields of an order, as handed to the store on create and update.
#[derive(Clone, Debug, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub total_amount: Decimal,
    pub items: Vec<NewOrderItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewOrderItem {
    pub flower_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Decimal places carried by every money amount.
pub const MONEY_SCALE: u32 = 2;

/// Normalizes a money amount to `MONEY_SCALE` places, rounding any extra digits.
pub fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(MONEY_SCALE);
    amount
}

impl Order {
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }
}
