use crate::{
    db_types::{Customer, Order, OrderId, OrderStatus, Rider},
    fge_api::order_objects::OrderQueryFilter,
    traits::{AccountApiError, AccountManagement},
};

/// Read-side API over accounts and orders.
pub struct AccountApi<B> {
    db: B,
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub async fn fetch_customer(&self, customer_id: i64) -> Result<Customer, AccountApiError> {
        self.db.fetch_customer(customer_id).await?.ok_or(AccountApiError::CustomerNotFound(customer_id))
    }

    pub async fn fetch_rider(&self, rider_id: i64) -> Result<Rider, AccountApiError> {
        self.db.fetch_rider(rider_id).await?.ok_or(AccountApiError::RiderNotFound(rider_id))
    }

    pub async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    pub async fn orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, AccountApiError> {
        self.db.fetch_orders_for_customer(customer_id).await
    }

    /// The rider's deliveries, optionally narrowed to one status (the dashboard tabs).
    pub async fn orders_for_rider(
        &self,
        rider_id: i64,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, AccountApiError> {
        let orders = self.db.fetch_orders_for_rider(rider_id).await?;
        let orders = match status {
            Some(status) => orders.into_iter().filter(|o| o.status == status).collect(),
            None => orders,
        };
        Ok(orders)
    }

    pub async fn available_orders(&self) -> Result<Vec<Order>, AccountApiError> {
        self.db.fetch_available_orders().await
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError> {
        self.db.search_orders(query).await
    }
}
