use thiserror::Error;

use crate::{
    db_types::{Customer, Order, OrderId, Rider},
    fge_api::order_objects::OrderQueryFilter,
};

/// Read-side queries over accounts and orders.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    async fn fetch_customer(&self, customer_id: i64) -> Result<Option<Customer>, AccountApiError>;

    async fn fetch_rider(&self, rider_id: i64) -> Result<Option<Rider>, AccountApiError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError>;

    /// All orders placed by the customer, newest first.
    async fn fetch_orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, AccountApiError>;

    /// All orders assigned to the rider, newest first.
    async fn fetch_orders_for_rider(&self, rider_id: i64) -> Result<Vec<Order>, AccountApiError>;

    /// All `pending` orders, newest first. This is the rider's "available" tab.
    async fn fetch_available_orders(&self) -> Result<Vec<Order>, AccountApiError>;

    /// Fetches orders according to criteria specified in the `OrderQueryFilter`.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Customer account {0} does not exist")]
    CustomerNotFound(i64),
    #[error("Rider account {0} does not exist")]
    RiderNotFound(i64),
    #[error("Order {0} does not exist")]
    OrderDoesNotExist(OrderId),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

impl AccountApiError {
    pub fn dne(order_id: OrderId) -> Self {
        AccountApiError::OrderDoesNotExist(order_id)
    }
}
