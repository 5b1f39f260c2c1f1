//! Live review notifications: the in-memory feed and the socket feeding it.
//!
//! The feed is local only. Read state is never sent anywhere and nothing
//! survives a restart.

mod channel;

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use uuid::Uuid;

pub use channel::{ChannelEvent, NotificationChannel, channel_url};

/// Text shown for every inbound event; the payload itself is not read.
pub const REVIEW_CREATED_MESSAGE: &str = "A new review was posted";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub received_at: DateTime<Local>,
    pub message: String,
    pub unread: bool,
}

/// Newest-first list of notifications, capped at `limit` entries.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    records: VecDeque<Notification>,
    limit: usize,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(crate::config::Config::DEFAULT_NOTIFICATION_LIMIT)
    }
}

impl NotificationFeed {
    /// A `limit` of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            records: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    /// Records one inbound event at the front, dropping the oldest record
    /// when the feed is full.
    pub fn push(&mut self, message: impl Into<String>) -> &Notification {
        self.push_at(message, Local::now())
    }

    fn push_at(&mut self, message: impl Into<String>, received_at: DateTime<Local>) -> &Notification {
        if self.records.len() == self.limit {
            self.records.pop_back();
        }
        self.records.push_front(Notification {
            id: Uuid::new_v4(),
            received_at,
            message: message.into(),
            unread: true,
        });
        &self.records[0]
    }

    pub fn mark_all_read(&mut self) {
        for record in &mut self.records {
            record.unread = false;
        }
    }

    pub fn unread_count(&self) -> usize {
        self.records.iter().filter(|n| n.unread).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn test_two_messages_newest_first_then_mark_all_read() {
        let mut feed = NotificationFeed::new(50);
        let t0 = Local::now();
        feed.push_at("first", t0);
        feed.push_at("second", t0 + TimeDelta::seconds(1));

        let before: Vec<_> = feed.iter().cloned().collect();
        assert_eq!(before.len(), 2);
        assert_eq!(before[0].message, "second");
        assert_eq!(before[1].message, "first");
        assert!(before.iter().all(|n| n.unread));
        assert_ne!(before[0].id, before[1].id);
        assert_eq!(feed.unread_count(), 2);

        feed.mark_all_read();

        let after: Vec<_> = feed.iter().cloned().collect();
        assert_eq!(feed.unread_count(), 0);
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(b.id, a.id);
            assert_eq!(b.message, a.message);
            assert_eq!(b.received_at, a.received_at);
            assert!(!a.unread);
        }
    }

    #[test]
    fn test_feed_drops_oldest_when_full() {
        let mut feed = NotificationFeed::new(3);
        for i in 0..5 {
            feed.push(format!("n{i}"));
        }
        let messages: Vec<_> = feed.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["n4", "n3", "n2"]);
        assert_eq!(feed.len(), 3);
    }

    #[test]
    fn test_zero_limit_keeps_one() {
        let mut feed = NotificationFeed::new(0);
        feed.push("a");
        feed.push("b");
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.iter().next().unwrap().message, "b");
    }

    #[test]
    fn test_new_records_are_unread_after_mark_all_read() {
        let mut feed = NotificationFeed::default();
        feed.push("a");
        feed.mark_all_read();
        feed.push("b");
        assert_eq!(feed.unread_count(), 1);
        assert!(feed.iter().next().unwrap().unread);
    }
}
