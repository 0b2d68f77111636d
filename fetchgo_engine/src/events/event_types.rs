use serde::{Deserialize, Serialize};

use crate::db_types::{ChatMessage, Order, OrderStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderEvent {
    pub order: Order,
}

impl NewOrderEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order: Order,
    pub old_status: OrderStatus,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, old_status: OrderStatus) -> Self {
        Self { order, old_status }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSentEvent {
    pub message: ChatMessage,
}

impl MessageSentEvent {
    pub fn new(message: ChatMessage) -> Self {
        Self { message }
    }
}
