use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{ChatMessage, NewMessage, OrderId};

pub async fn insert_message(message: NewMessage, conn: &mut SqliteConnection) -> Result<ChatMessage, sqlx::Error> {
    let inserted: ChatMessage = sqlx::query_as(
        r#"
        INSERT INTO messages (order_id, sender_id, sender_kind, sender_name, body)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *"#,
    )
    .bind(message.order_id)
    .bind(message.sender_id)
    .bind(message.sender_kind)
    .bind(message.sender_name)
    .bind(message.body)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Message {} stored for order {}", inserted.id, inserted.order_id);
    Ok(inserted)
}

/// All messages for the order, oldest first. Ties on `created_at` (second resolution in SQLite) are
/// broken by insertion order.
pub async fn messages_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM messages WHERE order_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await
}
