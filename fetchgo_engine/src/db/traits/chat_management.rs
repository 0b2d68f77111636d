use thiserror::Error;

use crate::db_types::{ChatMessage, NewMessage, OrderId};

/// Storage for the per-order chat stream.
#[allow(async_fn_in_trait)]
pub trait ChatManagement {
    /// Store a message. The caller has already verified the sender may post to this order.
    async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage, ChatApiError>;

    /// All messages for the order, oldest first, ties broken by message id.
    async fn fetch_messages_for_order(&self, order_id: &OrderId) -> Result<Vec<ChatMessage>, ChatApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum ChatApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderDoesNotExist(OrderId),
    #[error("Chat is only available after a rider accepts the order")]
    ChatNotOpen(OrderId),
    #[error("Only the order's customer and its assigned rider may use this chat")]
    NotAParticipant(OrderId),
    #[error("Message body cannot be empty")]
    EmptyMessage,
}

impl From<sqlx::Error> for ChatApiError {
    fn from(e: sqlx::Error) -> Self {
        ChatApiError::DatabaseError(e.to_string())
    }
}
