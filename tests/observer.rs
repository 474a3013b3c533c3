pub mod test_utils;

use route_playback::observer::{
    Notification, ObserverRegistry, PlaybackObserver, RecordingObserver,
};
use route_playback::playback::{PlaybackSnapshot, PlaybackStatus};
use std::sync::Arc;

fn snapshot(revision: u64) -> PlaybackSnapshot {
    PlaybackSnapshot {
        cursor: 0,
        status: PlaybackStatus::Stopped,
        speed_kmh: 0.0,
        elapsed_seconds: 0,
        total_points: 2,
        progress_percent: 0.0,
        revision,
    }
}

#[test]
fn subscription_lifetime() {
    let registry = ObserverRegistry::new();
    let first = Arc::new(RecordingObserver::new());
    let second = Arc::new(RecordingObserver::new());

    let first_subscription = registry.subscribe(first.clone());
    let second_subscription = registry.subscribe(second.clone());
    assert_ne!(first_subscription.id(), second_subscription.id());
    assert_eq!(registry.len(), 2);

    registry.publish_snapshot(&snapshot(1));
    registry.notify(&Notification::RouteCompleted);

    drop(second_subscription);
    assert_eq!(registry.len(), 1);
    registry.publish_snapshot(&snapshot(2));

    assert_eq!(first.snapshots(), vec![snapshot(1), snapshot(2)]);
    assert_eq!(second.snapshots(), vec![snapshot(1)]);
    assert_eq!(second.notifications(), vec![Notification::RouteCompleted]);

    drop(first_subscription);
    assert!(registry.is_empty());
}

#[test]
fn subscription_outlives_registry() {
    let registry = ObserverRegistry::new();
    let subscription = registry.subscribe(Arc::new(RecordingObserver::new()));
    drop(registry);
    drop(subscription);
}

#[test]
fn unsubscribed_observer_misses_playback() {
    let mut h = test_utils::harness(test_utils::load_sample_route());
    let late = Arc::new(RecordingObserver::new());
    let late_subscription = h.engine.observers().subscribe(late.clone());

    h.engine.play();
    h.engine.tick();
    drop(late_subscription);
    h.engine.tick();

    assert_eq!(late.snapshots().len(), 2);
    assert_eq!(late.last_snapshot().unwrap().cursor, 1);
    assert_eq!(h.observer.last_snapshot().unwrap().cursor, 2);
}

struct CountingObserver {
    count: std::sync::atomic::AtomicUsize,
}

impl PlaybackObserver for CountingObserver {
    fn on_snapshot(&self, _snapshot: &PlaybackSnapshot) {
        self.count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[test]
fn notifications_are_optional() {
    let registry = ObserverRegistry::new();
    let observer = Arc::new(CountingObserver {
        count: Default::default(),
    });
    let _subscription = registry.subscribe(observer.clone());
    registry.notify(&Notification::LoadFailed {
        reason: "nope".to_string(),
    });
    registry.publish_snapshot(&snapshot(1));
    assert_eq!(
        observer.count.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[test]
fn snapshot_json() {
    let json = serde_json::to_string(&snapshot(3)).unwrap();
    assert_eq!(
        json,
        r#"{"cursor":0,"status":"stopped","speedKmh":0.0,"elapsedSeconds":0,"totalPoints":2,"progressPercent":0.0,"revision":3}"#
    );
    let json = serde_json::to_string(&Notification::DataAnomaly {
        index: 4,
        delta_seconds: 0.0,
    })
    .unwrap();
    assert_eq!(json, r#"{"type":"dataAnomaly","index":4,"deltaSeconds":0.0}"#);
}
