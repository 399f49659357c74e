#![forbid(unsafe_code)]
#![deny(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! UI event bus for user-facing notifications and alerts.
//!
//! One bus is created at startup and handed to every component that needs to
//! tell the user something. Internally it uses `tokio::broadcast` with a
//! bounded replay ring, so a renderer that attaches late still sees recent
//! messages; when the channel overflows the oldest events are dropped.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};

/// Identifier assigned to each published event.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Messages surfaced to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Transient confirmation that an action succeeded.
    Notification {
        /// Short heading, e.g. `Torrent Deleted`.
        title: String,
        /// Detail line.
        body: String,
    },
    /// Blocking message that an action was rejected.
    Alert {
        /// Heading naming the action, e.g. `Rename`.
        title: String,
        /// Reason, e.g. `Invalid name!`.
        body: String,
    },
}

impl UiEvent {
    /// Build a notification.
    #[must_use]
    pub fn notification(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Notification {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Build an alert.
    #[must_use]
    pub fn alert(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Alert {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Machine-friendly discriminator for log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Notification { .. } => "notification",
            Self::Alert { .. } => "alert",
        }
    }

    /// Heading of the message.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Notification { title, .. } | Self::Alert { title, .. } => title,
        }
    }

    /// Detail of the message.
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Notification { body, .. } | Self::Alert { body, .. } => body,
        }
    }
}

/// Event plus its id and emission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Sequential identifier.
    pub id: EventId,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// Payload.
    pub event: UiEvent,
}

/// Shared UI event bus built on top of `tokio::broadcast`.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a bus with the given capacity; zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish an event, assigning it the next identifier.
    pub fn publish(&self, event: UiEvent) -> EventId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(event_id = id, kind = event.kind(), title = event.title(), "ui event");
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.lock_buffer();
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        let _ = self.sender.send(envelope);
        id
    }

    /// Shorthand for publishing a notification.
    pub fn notify(&self, title: impl Into<String>, body: impl Into<String>) -> EventId {
        self.publish(UiEvent::notification(title, body))
    }

    /// Shorthand for publishing an alert.
    pub fn alert(&self, title: impl Into<String>, body: impl Into<String>) -> EventId {
        self.publish(UiEvent::alert(title, body))
    }

    /// Subscribe, replaying buffered events newer than `since_id`.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let mut backlog = VecDeque::new();
        if let Some(since) = since_id {
            let buffer = self.lock_buffer();
            backlog.extend(buffer.iter().filter(|item| item.id > since).cloned());
        }

        let receiver = self.sender.subscribe();
        EventStream { backlog, receiver }
    }

    /// Returns the last assigned identifier, if any events have been published.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.lock_buffer().back().map(|event| event.id)
    }

    /// Events still held in the replay ring, oldest first.
    #[must_use]
    pub fn recent(&self) -> Vec<EventEnvelope> {
        self.lock_buffer().iter().cloned().collect()
    }

    fn lock_buffer(&self) -> MutexGuard<'_, VecDeque<EventEnvelope>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream that yields events from the replay backlog first, then live.
#[derive(Debug)]
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
}

impl EventStream {
    /// Receive the next event; `None` once every bus handle is dropped.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "ui event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive an already-published event without waiting.
    pub fn try_next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::task;
    use tokio::time::timeout;

    const RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn sequential_ids_and_replay() {
        let bus = EventBus::with_capacity(16);

        let mut last_id = 0;
        for i in 0..5 {
            last_id = bus.notify("Torrent Deleted", format!("torrent {i}"));
        }
        assert_eq!(last_id, 5);
        assert_eq!(bus.last_event_id(), Some(5));

        let mut stream = bus.subscribe(Some(2));
        let mut received = Vec::new();
        for _ in 0..3 {
            if let Some(event) = stream.next().await {
                received.push(event);
            }
        }

        assert_eq!(received.len(), 3);
        assert_eq!(received.first().map(|event| event.id), Some(3));
        assert_eq!(received.last().map(|event| event.id), Some(5));
    }

    #[tokio::test]
    async fn live_subscribers_receive_alerts() {
        let bus = EventBus::new();
        let mut stream = bus.subscribe(None);

        let publisher = {
            let bus = bus.clone();
            task::spawn(async move { bus.alert("Rename", "Invalid name!") })
        };
        publisher.await.expect("publisher task panicked");

        let envelope = timeout(RECEIVE_TIMEOUT, stream.next())
            .await
            .expect("event should arrive")
            .expect("bus still open");
        assert_eq!(envelope.event, UiEvent::alert("Rename", "Invalid name!"));
        assert_eq!(envelope.event.kind(), "alert");
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn replay_ring_drops_oldest_events() {
        let bus = EventBus::with_capacity(2);
        bus.notify("a", "1");
        bus.notify("b", "2");
        bus.notify("c", "3");

        let titles: Vec<String> = bus
            .recent()
            .into_iter()
            .map(|envelope| envelope.event.title().to_string())
            .collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let value = serde_json::to_value(UiEvent::notification("Torrent Moved", "done"))
            .expect("event encodes");
        assert_eq!(
            value,
            serde_json::json!({"type": "notification", "title": "Torrent Moved", "body": "done"})
        );
    }
}
