//! `SqliteDatabase` is a concrete implementation of a FetchGo engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::Duration;
use log::*;
use sqlx::SqlitePool;

use super::db::{accounts, db_url, messages, new_pool, orders, roles};
use crate::{
    db_types::{
        AccountKind,
        ChatMessage,
        Customer,
        NewCustomer,
        NewMessage,
        NewOrder,
        NewRider,
        Order,
        OrderId,
        OrderStatus,
        Rider,
        Role,
    },
    fge_api::order_objects::OrderQueryFilter,
    traits::{
        AccountApiError,
        AccountManagement,
        AuthApiError,
        AuthManagement,
        ChatApiError,
        ChatManagement,
        DeliveryDatabase,
        OrderFlowError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Re-reads an order so that a failed conditional transition can be diagnosed precisely.
    async fn diagnose_transition_failure(
        &self,
        order_id: &OrderId,
        rider_id: Option<i64>,
    ) -> OrderFlowError {
        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => return OrderFlowError::DatabaseError(e.to_string()),
        };
        match orders::fetch_order_by_order_id(order_id, &mut conn).await {
            Ok(None) => OrderFlowError::OrderNotFound(order_id.clone()),
            Ok(Some(order)) => match rider_id {
                Some(rider) if order.rider_id.is_some() && order.rider_id != Some(rider) => {
                    OrderFlowError::NotAssignedRider(order_id.clone())
                },
                _ => OrderFlowError::IllegalTransition { order_id: order_id.clone(), status: order.status },
            },
            Err(e) => OrderFlowError::DatabaseError(e.to_string()),
        }
    }
}

impl DeliveryDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order {} has been saved with status {}", order.order_id, order.status);
        Ok(order)
    }

    async fn accept_order(&self, order_id: &OrderId, rider_id: i64, rider_name: &str) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        match orders::accept_order(order_id, rider_id, rider_name, &mut conn).await? {
            Some(order) => {
                debug!("🗃️ Order {order_id} accepted by rider #{rider_id}");
                Ok(order)
            },
            // The guard failed. Either the order is gone, or someone else got there first.
            None => match self.diagnose_transition_failure(order_id, None).await {
                OrderFlowError::IllegalTransition { order_id, status }
                    if matches!(status, OrderStatus::Accepted | OrderStatus::InProgress | OrderStatus::Delivered) =>
                {
                    Err(OrderFlowError::OrderAlreadyTaken(order_id))
                },
                other => Err(other),
            },
        }
    }

    async fn start_delivery(&self, order_id: &OrderId, rider_id: i64) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        match orders::start_delivery(order_id, rider_id, &mut conn).await? {
            Some(order) => {
                debug!("🗃️ Delivery for order {order_id} started");
                Ok(order)
            },
            None => Err(self.diagnose_transition_failure(order_id, Some(rider_id)).await),
        }
    }

    async fn complete_delivery(&self, order_id: &OrderId, rider_id: i64) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        match orders::complete_delivery(order_id, rider_id, &mut conn).await? {
            Some(order) => {
                debug!("🗃️ Order {order_id} delivered");
                Ok(order)
            },
            None => Err(self.diagnose_transition_failure(order_id, Some(rider_id)).await),
        }
    }

    async fn cancel_order(&self, order_id: &OrderId, from: &[OrderStatus]) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        match orders::cancel_order(order_id, from, &mut conn).await? {
            Some(order) => {
                debug!("🗃️ Order {order_id} cancelled");
                Ok(order)
            },
            None => Err(self.diagnose_transition_failure(order_id, None).await),
        }
    }

    async fn update_delivery_details(&self, order_id: &OrderId, details: &str) -> Result<Order, OrderFlowError> {
        if details.trim().is_empty() {
            return Err(OrderFlowError::EmptyDeliveryDetails);
        }
        let mut conn = self.pool.acquire().await?;
        match orders::update_delivery_details(order_id, details.trim(), &mut conn).await? {
            Some(order) => Ok(order),
            None => Err(self.diagnose_transition_failure(order_id, None).await),
        }
    }

    async fn expire_stale_pending_orders(&self, older_than: Duration) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let expired = orders::expire_stale_pending_orders(older_than, &mut conn).await?;
        Ok(expired)
    }

    async fn close(&mut self) -> Result<(), OrderFlowError> {
        self.pool.close().await;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_customer(&self, customer_id: i64) -> Result<Option<Customer>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let customer = accounts::customer_by_id(customer_id, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_rider(&self, rider_id: i64) -> Result<Option<Rider>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let rider = accounts::rider_by_id(rider_id, &mut conn).await?;
        Ok(rider)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::orders_for_customer(customer_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_rider(&self, rider_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::orders_for_rider(rider_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_available_orders(&self) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::available_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        accounts::insert_customer(customer, &mut conn).await
    }

    async fn insert_rider(&self, rider: NewRider) -> Result<Rider, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        accounts::insert_rider(rider, &mut conn).await
    }

    async fn fetch_customer_credentials(
        &self,
        phone_number: &str,
    ) -> Result<Option<(Customer, String)>, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        let credentials = accounts::customer_credentials_by_phone(phone_number, &mut conn).await?;
        Ok(credentials)
    }

    async fn fetch_rider_credentials(&self, phone_number: &str) -> Result<Option<(Rider, String)>, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        let credentials = accounts::rider_credentials_by_phone(phone_number, &mut conn).await?;
        Ok(credentials)
    }

    async fn fetch_extra_roles(&self, kind: AccountKind, account_id: i64) -> Result<Vec<Role>, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        roles::extra_roles_for_account(kind, account_id, &mut conn).await
    }

    async fn assign_roles(&self, kind: AccountKind, account_id: i64, new_roles: &[Role]) -> Result<(), AuthApiError> {
        let mut tx = self.pool.begin().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        roles::assign_roles(kind, account_id, new_roles, &mut tx).await?;
        tx.commit().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        debug!("🔑️ Roles {new_roles:?} assigned to {kind} #{account_id}");
        Ok(())
    }

    async fn remove_roles(&self, kind: AccountKind, account_id: i64, old_roles: &[Role]) -> Result<u64, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        roles::remove_roles(kind, account_id, old_roles, &mut conn).await
    }
}

impl ChatManagement for SqliteDatabase {
    async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage, ChatApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| ChatApiError::DatabaseError(e.to_string()))?;
        let message = messages::insert_message(message, &mut conn).await?;
        Ok(message)
    }

    async fn fetch_messages_for_order(&self, order_id: &OrderId) -> Result<Vec<ChatMessage>, ChatApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| ChatApiError::DatabaseError(e.to_string()))?;
        let messages = messages::messages_for_order(order_id, &mut conn).await?;
        Ok(messages)
    }
}
