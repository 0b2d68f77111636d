use std::fmt::Debug;

use chrono::Duration;
use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    events::{EventProducers, NewOrderEvent, OrderStatusChangedEvent},
    traits::{DeliveryDatabase, OrderFlowError},
};

/// `OrderFlowApi` is the primary API for moving orders through their lifecycle:
/// `pending → accepted → in_progress → delivered`, with cancellation out of `pending` (customers)
/// or `pending`/`accepted` (admins).
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: DeliveryDatabase
{
    /// Submit a brand-new order. The order starts `pending` and is immediately visible to riders.
    pub async fn place_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        if order.delivery_details.trim().is_empty() {
            return Err(OrderFlowError::EmptyDeliveryDetails);
        }
        let order = self.db.insert_order(order).await?;
        debug!("🔄️📦️ Order {} placed by customer #{}", order.order_id, order.customer_id);
        self.call_new_order_hook(&order).await;
        Ok(order)
    }

    /// A rider claims a pending order. Exactly one rider can win; the others get
    /// [`OrderFlowError::OrderAlreadyTaken`].
    pub async fn accept_order(
        &self,
        order_id: &OrderId,
        rider_id: i64,
        rider_name: &str,
    ) -> Result<Order, OrderFlowError> {
        let order = self.db.accept_order(order_id, rider_id, rider_name).await?;
        info!("🔄️🚴️ Order {order_id} accepted by rider #{rider_id}");
        self.call_status_changed_hook(&order, OrderStatus::Pending).await;
        Ok(order)
    }

    /// The assigned rider picks the parcel up and heads out.
    pub async fn start_delivery(&self, order_id: &OrderId, rider_id: i64) -> Result<Order, OrderFlowError> {
        let order = self.db.start_delivery(order_id, rider_id).await?;
        info!("🔄️🚴️ Delivery started for order {order_id}");
        self.call_status_changed_hook(&order, OrderStatus::Accepted).await;
        Ok(order)
    }

    /// The assigned rider drops the parcel off.
    pub async fn complete_delivery(&self, order_id: &OrderId, rider_id: i64) -> Result<Order, OrderFlowError> {
        let order = self.db.complete_delivery(order_id, rider_id).await?;
        info!("🔄️🎉️ Order {order_id} delivered");
        self.call_status_changed_hook(&order, OrderStatus::InProgress).await;
        Ok(order)
    }

    /// A customer cancels their own order. Only `pending` orders qualify, and only the customer who
    /// placed the order may do this.
    pub async fn cancel_order_as_customer(
        &self,
        order_id: &OrderId,
        customer_id: i64,
    ) -> Result<Order, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if order.customer_id != customer_id {
            // Same response as a missing order, so customers cannot probe for other people's ids.
            return Err(OrderFlowError::OrderNotFound(order_id.clone()));
        }
        let old_status = order.status;
        let order = self.db.cancel_order(order_id, &[OrderStatus::Pending]).await?;
        info!("🔄️❌️ Order {order_id} cancelled by its customer");
        self.call_status_changed_hook(&order, old_status).await;
        Ok(order)
    }

    /// An admin cancels an order. Allowed while `pending` or `accepted`.
    pub async fn cancel_order_as_admin(&self, order_id: &OrderId) -> Result<Order, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        let old_status = order.status;
        let order = self.db.cancel_order(order_id, &[OrderStatus::Pending, OrderStatus::Accepted]).await?;
        info!("🔄️❌️ Order {order_id} cancelled by an admin");
        self.call_status_changed_hook(&order, old_status).await;
        Ok(order)
    }

    /// Edit the delivery details of a pending order. Only the owning customer may do this.
    pub async fn update_delivery_details(
        &self,
        order_id: &OrderId,
        customer_id: i64,
        details: &str,
    ) -> Result<Order, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if order.customer_id != customer_id {
            return Err(OrderFlowError::OrderNotFound(order_id.clone()));
        }
        self.db.update_delivery_details(order_id, details).await
    }

    /// Cancels pending orders nobody has touched for `older_than`. Returns the cancelled orders.
    pub async fn expire_stale_orders(&self, older_than: Duration) -> Result<Vec<Order>, OrderFlowError> {
        let expired = self.db.expire_stale_pending_orders(older_than).await?;
        for order in &expired {
            self.call_status_changed_hook(order, OrderStatus::Pending).await;
        }
        Ok(expired)
    }

    async fn call_new_order_hook(&self, order: &Order) {
        for emitter in &self.producers.new_order_producer {
            debug!("🔄️📬️ Notifying new order hook subscribers");
            let event = NewOrderEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_status_changed_hook(&self, order: &Order, old_status: OrderStatus) {
        for emitter in &self.producers.status_changed_producer {
            debug!("🔄️📬️ Notifying status change hook subscribers");
            let event = OrderStatusChangedEvent::new(order.clone(), old_status);
            emitter.publish_event(event).await;
        }
    }
}
