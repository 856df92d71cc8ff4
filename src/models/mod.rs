pub mod order;

pub use order::{money, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, MONEY_SCALE};
