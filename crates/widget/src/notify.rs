//! Transient "added to cart" notifications.
//!
//! Each notice lives for a fixed time-to-live and is then pruned. Time comes
//! from `tokio::time::Instant`, so paused-clock tests can advance it.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// A visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

/// Queue of live notices, oldest first.
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    active: VecDeque<Notice>,
}

impl Notifications {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            active: VecDeque::new(),
        }
    }

    /// Show `message` until `now + ttl`.
    pub fn push(&mut self, message: impl Into<String>, now: Instant) {
        self.active.push_back(Notice {
            message: message.into(),
            expires_at: now + self.ttl,
        });
    }

    /// Drop notices that have expired at `now`. Returns whether any were removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.active.len();
        self.active.retain(|notice| notice.expires_at > now);
        self.active.len() != before
    }

    /// Live notices, oldest first.
    pub fn active(&self) -> impl Iterator<Item = &Notice> {
        self.active.iter()
    }

    /// When the next notice expires, if any are live.
    #[must_use]
    pub fn next_expiry(&self) -> Option<Instant> {
        self.active.iter().map(|notice| notice.expires_at).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Notification text for an added product.
#[must_use]
pub fn added_to_cart_message(product_name: &str) -> String {
    format!("{product_name} added to cart!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notices_expire_after_ttl() {
        let mut notices = Notifications::new(Duration::from_secs(3));
        notices.push(added_to_cart_message("Ear Pods"), Instant::now());

        tokio::time::advance(Duration::from_secs(1)).await;
        notices.push(added_to_cart_message("Smart Watch"), Instant::now());

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(!notices.prune(Instant::now()));
        assert_eq!(notices.len(), 2);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(notices.prune(Instant::now()));
        let left: Vec<&str> = notices.active().map(|n| n.message.as_str()).collect();
        assert_eq!(left, ["Smart Watch added to cart!"]);

        tokio::time::advance(Duration::from_secs(1)).await;
        notices.prune(Instant::now());
        assert!(notices.is_empty());
        assert!(notices.next_expiry().is_none());
    }
}
