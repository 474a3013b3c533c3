#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use route_playback::config::PlaybackConfig;
use route_playback::map_view::MapCommandQueue;
use route_playback::observer::{ObserverRegistry, RecordingObserver, Subscription};
use route_playback::playback::{ManualTicker, PlaybackEngine};
use route_playback::route::{Route, RoutePoint, RouteSource, RouteStore};
use std::path::PathBuf;
use std::sync::Arc;

pub type TestEngine = PlaybackEngine<MapCommandQueue, ManualTicker>;

pub struct Harness {
    pub engine: TestEngine,
    pub map: MapCommandQueue,
    pub observer: Arc<RecordingObserver>,
    // keeps `observer` registered
    pub subscription: Subscription,
}

pub fn point(latitude: f64, longitude: f64, timestamp: &str) -> RoutePoint {
    RoutePoint {
        latitude,
        longitude,
        timestamp: DateTime::parse_from_rfc3339(timestamp)
            .unwrap()
            .with_timezone(&Utc),
    }
}

pub fn route_of(points: &[(f64, f64, &str)]) -> Route {
    Route::new(
        points
            .iter()
            .map(|(lat, lng, ts)| point(*lat, *lng, ts))
            .collect(),
    )
}

pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from("./tests/data").join(name)
}

/// 20 points, 5 seconds apart.
pub fn load_sample_route() -> Route {
    RouteStore::load(&RouteSource::JsonFile(data_path("route.json"))).unwrap()
}

/// Strictly increasing timestamps, 1 to 30 seconds apart.
pub fn random_route<R: Rng>(rng: &mut R, len: usize) -> Route {
    let mut timestamp = Utc::now();
    let mut latitude: f64 = rng.random_range(-60.0..60.0);
    let mut longitude: f64 = rng.random_range(-170.0..170.0);
    let points = (0..len)
        .map(|_| {
            let p = RoutePoint {
                latitude,
                longitude,
                timestamp,
            };
            timestamp += TimeDelta::seconds(rng.random_range(1..=30));
            latitude += rng.random_range(-0.001..0.001);
            longitude += rng.random_range(-0.001..0.001);
            p
        })
        .collect();
    Route::new(points)
}

pub fn harness_with_config(route: Route, config: &PlaybackConfig) -> Harness {
    let map = MapCommandQueue::new();
    let observers = ObserverRegistry::new();
    let observer = Arc::new(RecordingObserver::new());
    let subscription = observers.subscribe(observer.clone());
    let engine = PlaybackEngine::new(route, map.clone(), ManualTicker::new(), observers, config);
    Harness {
        engine,
        map,
        observer,
        subscription,
    }
}

pub fn harness(route: Route) -> Harness {
    harness_with_config(route, &PlaybackConfig::default())
}
