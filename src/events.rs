//! Notification bus connecting the core to a presentation layer.
//!
//! Earlier releases wired optional callback fields into each view model after
//! construction. The hooks are now a single explicit [`EventBus`] backed by a
//! `tokio::sync::broadcast` channel: every current subscriber receives every
//! published event, in publish order, at least once. Publishing with no
//! subscribers is a no-op so the core can run headless (e.g. in tests).

use tokio::sync::broadcast;

/// Events emitted by core operations so dependent views can refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A client was created, updated, or deleted
    ClientsChanged,
    /// A standalone lesson was created
    LessonCreated,
    /// A subscription and its lessons were created
    SubscriptionCreated(i64),
    /// A subscription and its lessons were deleted
    SubscriptionDeleted(i64),
    /// A subscription finished or was reactivated by lesson completion changes
    SubscriptionStatusChanged(i64),
}

/// Broadcast bus for [`AppEvent`] notifications.
///
/// Cheap to clone; clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// Creates a bus able to buffer `capacity` undelivered events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Registers a new subscriber receiving all events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to all current subscribers.
    pub fn publish(&self, event: AppEvent) {
        // send only fails when there are no subscribers, which is fine
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
