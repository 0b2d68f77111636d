use chrono::Duration;
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    traits::{AccountApiError, AccountManagement},
};

/// The order lifecycle contract.
///
/// Every transition is expressed as a *conditional* write: the guard (current status, and for rider
/// transitions the assigned rider) is part of the statement, so two concurrent callers cannot both
/// succeed. The loser gets an explicit error rather than a silently stale view.
#[allow(async_fn_in_trait)]
pub trait DeliveryDatabase: Clone + AccountManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new order with `pending` status. The `order_id` must be fresh.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    /// `pending → accepted`. Records the accepting rider and `accepted_at`.
    ///
    /// If another rider won the race, fails with [`OrderFlowError::OrderAlreadyTaken`].
    async fn accept_order(&self, order_id: &OrderId, rider_id: i64, rider_name: &str) -> Result<Order, OrderFlowError>;

    /// `accepted → in_progress`. Only the assigned rider may start the delivery.
    async fn start_delivery(&self, order_id: &OrderId, rider_id: i64) -> Result<Order, OrderFlowError>;

    /// `in_progress → delivered`. Only the assigned rider may complete the delivery.
    async fn complete_delivery(&self, order_id: &OrderId, rider_id: i64) -> Result<Order, OrderFlowError>;

    /// `{pending, accepted} → cancelled`, restricted to the statuses in `from`.
    ///
    /// Cancellation is always a status write. Deleting the row instead would silently break the
    /// rider's and customer's view of the order, so cancelled orders stay in the table.
    async fn cancel_order(&self, order_id: &OrderId, from: &[OrderStatus]) -> Result<Order, OrderFlowError>;

    /// Replace the delivery details. Only while `pending`.
    async fn update_delivery_details(&self, order_id: &OrderId, details: &str) -> Result<Order, OrderFlowError>;

    /// Cancels `pending` orders that have not been updated for longer than `older_than`.
    /// Returns the orders that were cancelled.
    async fn expire_stale_pending_orders(&self, older_than: Duration) -> Result<Vec<Order>, OrderFlowError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} has already been taken by another rider")]
    OrderAlreadyTaken(OrderId),
    #[error("Order {order_id} is {status}, which does not permit this transition")]
    IllegalTransition { order_id: OrderId, status: OrderStatus },
    #[error("Order {0} is assigned to a different rider")]
    NotAssignedRider(OrderId),
    #[error("Delivery details cannot be empty")]
    EmptyDeliveryDetails,
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}
