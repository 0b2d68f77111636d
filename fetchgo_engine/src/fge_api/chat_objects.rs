//! Chat timeline reconciliation.
//!
//! A chat view is fed from two directions at once: a snapshot load when it opens (or reconnects)
//! and a live event stream while it is up. The two overlap (a message can arrive as an event and
//! then again inside the next snapshot) and events can be delivered out of order relative to the
//! snapshot. [`ChatTimeline`] folds that interleaving into a single sorted, deduplicated list.

use serde::Serialize;

use crate::db_types::{AccountKind, ChatMessage};

/// The identity a timeline renders for. Decides which messages count as "own".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub kind: AccountKind,
    pub account_id: i64,
}

impl Viewer {
    pub fn new(kind: AccountKind, account_id: i64) -> Self {
        Self { kind, account_id }
    }
}

/// A sorted, deduplicated view of one order's chat.
///
/// Invariants:
/// * a message id appears at most once, whatever order snapshots and events arrive in;
/// * messages are totally ordered by `(created_at, id)`;
/// * re-inserting an id replaces the stored copy (the newer delivery wins).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatTimeline {
    messages: Vec<ChatMessage>,
}

impl ChatTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one message, keeping the list sorted and free of duplicate ids.
    pub fn insert(&mut self, message: ChatMessage) {
        if let Some(pos) = self.messages.iter().position(|m| m.id == message.id) {
            self.messages.remove(pos);
        }
        let at = self
            .messages
            .partition_point(|m| (m.created_at, m.id) <= (message.created_at, message.id));
        self.messages.insert(at, message);
    }

    /// Fold a whole snapshot in. Equivalent to inserting each message in turn.
    pub fn merge_snapshot(&mut self, snapshot: Vec<ChatMessage>) {
        for message in snapshot {
            self.insert(message);
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether the viewer wrote this message. Ownership is decided by the sender's kind and id;
    /// display names are never compared, so two riders called "Ben" stay distinct.
    pub fn is_own(viewer: Viewer, message: &ChatMessage) -> bool {
        message.sender_kind == viewer.kind && message.sender_id == viewer.account_id
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::db_types::OrderId;

    fn msg(id: i64, at_secs: u32, kind: AccountKind, sender_id: i64, body: &str) -> ChatMessage {
        ChatMessage {
            id,
            order_id: OrderId("order1".into()),
            sender_id,
            sender_kind: kind,
            sender_name: "someone".into(),
            body: body.into(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(at_secs as i64),
        }
    }

    #[test]
    fn snapshot_then_events_stays_sorted() {
        let mut timeline = ChatTimeline::new();
        timeline.merge_snapshot(vec![
            msg(2, 10, AccountKind::Rider, 3, "on my way"),
            msg(1, 5, AccountKind::Customer, 7, "hello"),
        ]);
        timeline.insert(msg(3, 20, AccountKind::Customer, 7, "thanks"));
        let ids: Vec<i64> = timeline.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_delivery_is_deduplicated() {
        let mut timeline = ChatTimeline::new();
        // The live event lands first, then the reconnect snapshot replays the same message.
        timeline.insert(msg(5, 30, AccountKind::Rider, 3, "arrived"));
        timeline.merge_snapshot(vec![
            msg(4, 25, AccountKind::Customer, 7, "where are you?"),
            msg(5, 30, AccountKind::Rider, 3, "arrived"),
        ]);
        assert_eq!(timeline.len(), 2);
        let ids: Vec<i64> = timeline.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn replacement_keeps_latest_copy() {
        let mut timeline = ChatTimeline::new();
        timeline.insert(msg(1, 5, AccountKind::Customer, 7, "first delivery"));
        timeline.insert(msg(1, 5, AccountKind::Customer, 7, "second delivery"));
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.messages()[0].body, "second delivery");
    }

    #[test]
    fn equal_timestamps_order_by_id() {
        let mut timeline = ChatTimeline::new();
        timeline.insert(msg(9, 60, AccountKind::Customer, 7, "b"));
        timeline.insert(msg(8, 60, AccountKind::Rider, 3, "a"));
        let ids: Vec<i64> = timeline.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![8, 9]);
    }

    #[test]
    fn ownership_compares_kind_and_id() {
        let customer = Viewer::new(AccountKind::Customer, 7);
        let rider = Viewer::new(AccountKind::Rider, 7);
        let from_customer = msg(1, 5, AccountKind::Customer, 7, "hi");
        assert!(ChatTimeline::is_own(customer, &from_customer));
        // Same numeric id but the other kind: not the same account.
        assert!(!ChatTimeline::is_own(rider, &from_customer));
    }
}
