use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId, OrderStatus};

/// Search criteria for admin order queries. Empty fields do not constrain the result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub order_id: Option<OrderId>,
    pub customer_id: Option<i64>,
    pub rider_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn is_empty(&self) -> bool {
        self.order_id.is_none()
            && self.customer_id.is_none()
            && self.rider_id.is_none()
            && self.status.is_none()
            && self.since.is_none()
            && self.until.is_none()
    }

    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_customer_id(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn with_rider_id(mut self, rider_id: i64) -> Self {
        self.rider_id = Some(rider_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut terms = vec![];
        if let Some(id) = &self.order_id {
            terms.push(format!("order_id={id}"));
        }
        if let Some(id) = self.customer_id {
            terms.push(format!("customer_id={id}"));
        }
        if let Some(id) = self.rider_id {
            terms.push(format!("rider_id={id}"));
        }
        if let Some(status) = self.status {
            terms.push(format!("status={status}"));
        }
        if let Some(since) = self.since {
            terms.push(format!("since={since}"));
        }
        if let Some(until) = self.until {
            terms.push(format!("until={until}"));
        }
        write!(f, "{}", terms.join(","))
    }
}

/// A listing of orders together with the running total of their fares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub total_price: fg_common::Centavos,
    pub orders: Vec<Order>,
}

impl From<Vec<Order>> for OrderResult {
    fn from(orders: Vec<Order>) -> Self {
        let total_price = orders.iter().map(|o| o.price).sum();
        Self { total_price, orders }
    }
}
