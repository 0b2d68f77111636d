use log::*;

use crate::{
    db_types::{AccountKind, ChatMessage, NewMessage, Order, OrderId},
    events::{EventProducers, MessageSentEvent},
    traits::{AccountManagement, ChatApiError, ChatManagement},
};

/// The in-order chat between a customer and the rider who accepted their order.
///
/// Two rules, both enforced here rather than in any client:
/// * the chat only opens once a rider has accepted the order;
/// * only the order's customer and its assigned rider may read or post (admins with `ReadAll`
///   bypass the read check at the server layer).
pub struct ChatApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> ChatApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ChatApi<B>
where B: ChatManagement + AccountManagement
{
    /// Post a message to an order's chat.
    pub async fn send_message(
        &self,
        order_id: &OrderId,
        sender_id: i64,
        sender_kind: AccountKind,
        sender_name: &str,
        body: &str,
    ) -> Result<ChatMessage, ChatApiError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ChatApiError::EmptyMessage);
        }
        let order = self.fetch_open_order(order_id).await?;
        if !order.is_participant(sender_kind, sender_id) {
            return Err(ChatApiError::NotAParticipant(order_id.clone()));
        }
        let message = NewMessage {
            order_id: order_id.clone(),
            sender_id,
            sender_kind,
            sender_name: sender_name.to_string(),
            body: body.to_string(),
        };
        let message = self.db.insert_message(message).await?;
        debug!("💬️ Message {} posted to order {order_id}", message.id);
        self.call_message_sent_hook(&message).await;
        Ok(message)
    }

    /// The full message history for a participant, oldest first.
    pub async fn messages_for_participant(
        &self,
        order_id: &OrderId,
        viewer_id: i64,
        viewer_kind: AccountKind,
    ) -> Result<Vec<ChatMessage>, ChatApiError> {
        let order = self.fetch_open_order(order_id).await?;
        if !order.is_participant(viewer_kind, viewer_id) {
            return Err(ChatApiError::NotAParticipant(order_id.clone()));
        }
        self.db.fetch_messages_for_order(order_id).await
    }

    /// The full message history with no participant check. For `ReadAll` admins.
    pub async fn messages_unchecked(&self, order_id: &OrderId) -> Result<Vec<ChatMessage>, ChatApiError> {
        self.db.fetch_messages_for_order(order_id).await
    }

    /// Returns the order behind this chat once a rider is attached to it. Used by the server to
    /// run the same participant checks for the live stream.
    pub async fn fetch_open_order(&self, order_id: &OrderId) -> Result<Order, ChatApiError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await
            .map_err(|e| ChatApiError::DatabaseError(e.to_string()))?
            .ok_or_else(|| ChatApiError::OrderDoesNotExist(order_id.clone()))?;
        if order.rider_id.is_none() {
            return Err(ChatApiError::ChatNotOpen(order_id.clone()));
        }
        Ok(order)
    }

    async fn call_message_sent_hook(&self, message: &ChatMessage) {
        for emitter in &self.producers.message_sent_producer {
            debug!("💬️📬️ Notifying message hook subscribers");
            let event = MessageSentEvent::new(message.clone());
            emitter.publish_event(event).await;
        }
    }
}
