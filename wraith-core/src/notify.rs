//! Refresh notifications.
//!
//! Fired after balances change (a withdrawal moved funds, a bridge claim
//! landed) so that whoever shows balances can re-query the indexer. Each
//! notifier is owned by the component that fires it; there is no global bus.

use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 16;

/// Payload-free broadcast signal.
#[derive(Clone, Debug)]
pub struct RefreshNotifier {
    sender: broadcast::Sender<()>,
}

impl RefreshNotifier {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Registers a new observer.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Signals every current observer.
    ///
    /// Returns the number of observers reached.
    pub fn notify(&self) -> usize {
        let reached = self.sender.send(()).unwrap_or(0);
        trace!(reached, "refresh notified");
        reached
    }
}

impl Default for RefreshNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_all_subscribers_notified() {
        let notifier = RefreshNotifier::new();
        let mut a = notifier.subscribe();
        let mut b = notifier.clone().subscribe();

        assert_eq!(notifier.notify(), 2);
        a.recv().await.unwrap();
        b.recv().await.unwrap();
    }

    #[test]
    fn test_notify_without_subscribers() {
        assert_eq!(RefreshNotifier::new().notify(), 0);
    }
}
