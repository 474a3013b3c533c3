use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, Weak};

use serde::Serialize;
use uuid::Uuid;

use crate::playback::PlaybackSnapshot;

/// Non-blocking messages for the user (toasts and the like).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    RouteLoaded { points: usize },
    LoadFailed { reason: String },
    RouteCompleted,
    // the recording has a step with a zero or negative time delta
    #[serde(rename_all = "camelCase")]
    DataAnomaly { index: usize, delta_seconds: f64 },
}

/// The control surface side of the playback. Called on the playback's own
/// thread, so implementations should not block.
pub trait PlaybackObserver: Send + Sync {
    fn on_snapshot(&self, snapshot: &PlaybackSnapshot);

    fn on_notification(&self, _notification: &Notification) {}
}

type ObserverMap = HashMap<Uuid, Arc<dyn PlaybackObserver>>;

/// Observers stay registered for as long as the returned `Subscription` is
/// alive.
#[derive(Default, Clone)]
pub struct ObserverRegistry {
    items: Arc<RwLock<ObserverMap>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn PlaybackObserver>) -> Subscription {
        let id = Uuid::new_v4();
        self.items.write().unwrap().insert(id, observer);
        debug!("[observer_registry] subscribed: {}", id);
        Subscription {
            id,
            registry: Arc::downgrade(&self.items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().unwrap().is_empty()
    }

    fn observers(&self) -> Vec<Arc<dyn PlaybackObserver>> {
        // clone them out so an observer may (un)subscribe while being called
        self.items.read().unwrap().values().cloned().collect()
    }

    pub fn publish_snapshot(&self, snapshot: &PlaybackSnapshot) {
        for observer in self.observers() {
            observer.on_snapshot(snapshot);
        }
    }

    pub fn notify(&self, notification: &Notification) {
        for observer in self.observers() {
            observer.on_notification(notification);
        }
    }
}

#[must_use = "the observer is unsubscribed as soon as this is dropped"]
pub struct Subscription {
    id: Uuid,
    registry: Weak<RwLock<ObserverMap>>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            debug!("[observer_registry] unsubscribed: {}", self.id);
            registry.write().unwrap().remove(&self.id);
        }
    }
}

/// Keeps everything it is told about.
#[derive(Default)]
pub struct RecordingObserver {
    snapshots: Mutex<Vec<PlaybackSnapshot>>,
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<PlaybackSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn last_snapshot(&self) -> Option<PlaybackSnapshot> {
        self.snapshots.lock().unwrap().last().cloned()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.snapshots.lock().unwrap().clear();
        self.notifications.lock().unwrap().clear();
    }
}

impl PlaybackObserver for RecordingObserver {
    fn on_snapshot(&self, snapshot: &PlaybackSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }

    fn on_notification(&self, notification: &Notification) {
        self.notifications.lock().unwrap().push(notification.clone());
    }
}
