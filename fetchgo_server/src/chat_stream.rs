//! Live chat fan-out.
//!
//! Chat messages land in the database first; the engine then emits a [`MessageSentEvent`], which the
//! server republishes onto a broadcast channel. Every open `GET /api/chat/{order_id}/live` request
//! holds a subscription on that channel and forwards the messages for its order as Server-Sent
//! Events. Clients reconcile the stream with snapshot loads via the engine's `ChatTimeline`.

use actix_web::web::Bytes;
use fetchgo_engine::db_types::{ChatMessage, OrderId};
use futures::Stream;
use log::*;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct MessageFeed {
    sender: broadcast::Sender<ChatMessage>,
}

impl MessageFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Push a freshly stored message to every connected listener. A send error only means nobody is
    /// listening right now, which is fine.
    pub fn publish(&self, message: ChatMessage) {
        let order_id = message.order_id.clone();
        match self.sender.send(message) {
            Ok(n) => trace!("📡️ Chat message for {order_id} fanned out to {n} listeners"),
            Err(_) => trace!("📡️ No listeners for chat message on {order_id}"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.sender.subscribe()
    }

    /// An SSE body streaming this order's messages. The stream ends when the feed is dropped
    /// (server shutdown); slow clients that lag behind the channel capacity skip the missed
    /// messages and carry on, and pick them up again from their next snapshot load.
    pub fn sse_stream(&self, order_id: OrderId) -> impl Stream<Item = Result<Bytes, actix_web::Error>> {
        let receiver = self.subscribe();
        futures::stream::unfold((receiver, order_id), |(mut receiver, order_id)| async move {
            loop {
                match receiver.recv().await {
                    Ok(message) if message.order_id == order_id => {
                        let payload = match serde_json::to_string(&message) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("📡️ Could not serialize chat message {}: {e}", message.id);
                                continue;
                            },
                        };
                        let event = Bytes::from(format!("event: message\ndata: {payload}\n\n"));
                        return Some((Ok(event), (receiver, order_id)));
                    },
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!("📡️ Chat listener for {order_id} lagged, skipped {missed} messages");
                        continue;
                    },
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use fetchgo_engine::db_types::AccountKind;
    use futures::StreamExt;

    use super::*;

    fn msg(id: i64, order: &str) -> ChatMessage {
        ChatMessage {
            id,
            order_id: OrderId(order.into()),
            sender_id: 1,
            sender_kind: AccountKind::Customer,
            sender_name: "Ana".into(),
            body: format!("message {id}"),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn stream_only_carries_its_own_order() {
        let feed = MessageFeed::new(16);
        let mut stream = Box::pin(feed.sse_stream(OrderId("order-a".into())));
        feed.publish(msg(1, "order-b"));
        feed.publish(msg(2, "order-a"));
        let event = stream.next().await.unwrap().unwrap();
        let text = String::from_utf8(event.to_vec()).unwrap();
        assert!(text.starts_with("event: message\ndata: "));
        assert!(text.contains("\"id\":2"), "unexpected event: {text}");
    }

    #[tokio::test]
    async fn stream_ends_when_feed_is_dropped() {
        let feed = MessageFeed::new(16);
        let mut stream = Box::pin(feed.sse_stream(OrderId("order-a".into())));
        drop(feed);
        assert!(stream.next().await.is_none());
    }
}
