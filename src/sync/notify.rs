//! Transient, dismissible user notifications.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Cap on queued notifications; the oldest is dropped beyond it.
const MAX_NOTIFICATIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: Level,
    pub text: String,
    created: Instant,
}

/// Notification queue with expiry.
#[derive(Debug)]
pub struct Notifications {
    items: VecDeque<Notification>,
    ttl: Duration,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Level::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Level::Error, text.into());
    }

    fn push(&mut self, level: Level, text: String) {
        if self.items.len() >= MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
        self.items.push_back(Notification {
            level,
            text,
            created: Instant::now(),
        });
    }

    /// Newest notification, the one shown on screen.
    pub fn current(&self) -> Option<&Notification> {
        self.items.back()
    }

    /// Dismiss the newest notification. Returns false when there was none.
    pub fn dismiss(&mut self) -> bool {
        self.items.pop_back().is_some()
    }

    /// Drop everything older than the TTL as of `now`.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created) < ttl);
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
