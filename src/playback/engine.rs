use std::time::Duration;

use crate::config::{PlaybackConfig, SpeedAnomalyPolicy};
use crate::distance;
use crate::map_view::MapView;
use crate::observer::{Notification, ObserverRegistry};
use crate::playback::state::{progress_percent, PlaybackSnapshot, PlaybackStatus};
use crate::playback::ticker::TickSource;
use crate::route::Route;

/// Steps a cursor through the route, one point per tick.
///
/// The engine is the only owner of the playback state. Commands (`play`,
/// `pause`, `reset`) and `tick` are expected to be called from a single
/// logical thread, one at a time; every call runs to completion, including
/// the map updates and observer notifications it causes.
pub struct PlaybackEngine<M: MapView, T: TickSource> {
    route: Route,
    map: M,
    ticker: T,
    observers: ObserverRegistry,
    tick_interval: Duration,
    speed_anomaly: SpeedAnomalyPolicy,

    cursor: usize,
    status: PlaybackStatus,
    speed_kmh: f64,
    elapsed_seconds: i64,
    revision: u64,
    released: bool,
}

impl<M: MapView, T: TickSource> PlaybackEngine<M, T> {
    /// Puts the whole route on the map and the vehicle on its first point. An
    /// empty route gives an inert engine: every command is a no-op.
    pub fn new(
        route: Route,
        mut map: M,
        ticker: T,
        observers: ObserverRegistry,
        config: &PlaybackConfig,
    ) -> Self {
        match route.first() {
            None => info!("[playback_engine] no route loaded, playback is disabled"),
            Some(first) => {
                let coordinates = route.coordinates();
                map.set_static_path(&coordinates);
                map.fit_bounds(&coordinates);
                map.set_vehicle_position(first.latitude, first.longitude);
                observers.notify(&Notification::RouteLoaded {
                    points: route.len(),
                });
            }
        }

        let mut engine = Self {
            route,
            map,
            ticker,
            observers,
            tick_interval: config.tick_interval,
            speed_anomaly: config.speed_anomaly,
            cursor: 0,
            status: PlaybackStatus::Stopped,
            speed_kmh: 0.,
            elapsed_seconds: 0,
            revision: 0,
            released: false,
        };
        engine.publish();
        engine
    }

    pub fn play(&mut self) {
        if !self.controls_enabled() {
            debug!("[playback_engine.play] ignored, no route");
            return;
        }
        if self.status == PlaybackStatus::Playing {
            return;
        }
        if self.status == PlaybackStatus::Completed || self.cursor == self.last_index() {
            self.rewind();
        }
        if self.route.len() == 1 {
            // nowhere to go
            self.complete();
            return;
        }
        self.status = PlaybackStatus::Playing;
        self.ticker.start(self.tick_interval);
        info!("[playback_engine.play] playing from #{}", self.cursor);
        self.publish();
    }

    pub fn pause(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        self.ticker.stop();
        self.status = PlaybackStatus::Stopped;
        info!("[playback_engine.pause] paused at #{}", self.cursor);
        self.publish();
    }

    pub fn reset(&mut self) {
        if !self.controls_enabled() {
            debug!("[playback_engine.reset] ignored, no route");
            return;
        }
        self.rewind();
        self.status = PlaybackStatus::Stopped;
        info!("[playback_engine.reset] back to the start");
        self.publish();
    }

    /// Advances by one point. Does nothing unless playing, so a tick that
    /// races with `pause` is harmless.
    pub fn tick(&mut self) {
        if self.status != PlaybackStatus::Playing {
            debug!("[playback_engine.tick] ignored, status: {}", self.status);
            return;
        }

        let next = self.cursor + 1;
        if next >= self.route.len() {
            self.complete();
            return;
        }

        let points = self.route.points();
        let (first, prev, curr) = (&points[0], &points[self.cursor], &points[next]);
        let delta_seconds = (curr.timestamp_ms() - prev.timestamp_ms()) as f64 / 1000.0;
        let speed = distance::speed_kmh(prev.distance_to(curr), delta_seconds);
        let elapsed_seconds = distance::round_half_up(
            (curr.timestamp_ms() - first.timestamp_ms()) as f64 / 1000.0,
        ) as i64;
        let position = curr.lat_lng();

        self.cursor = next;
        self.elapsed_seconds = elapsed_seconds;
        self.speed_kmh = if delta_seconds <= 0.0 || !speed.is_finite() {
            warn!(
                "[playback_engine.tick] bad time delta at #{}: {}s, speed: {}",
                next, delta_seconds, speed
            );
            self.observers.notify(&Notification::DataAnomaly {
                index: next,
                delta_seconds,
            });
            match self.speed_anomaly {
                SpeedAnomalyPolicy::Zero => 0.,
                SpeedAnomalyPolicy::HoldPrevious => self.speed_kmh,
            }
        } else {
            distance::round_to(speed, 2)
        };

        self.map.set_vehicle_position(position[0], position[1]);
        self.map.set_active_path(&self.route.prefix(self.cursor));
        self.publish();
    }

    /// Stops ticking and lets go of the map. Nothing is published any more,
    /// the observers may already be gone at this point.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.ticker.stop();
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Stopped;
        }
        self.map.release();
        self.released = true;
        info!("[playback_engine.shutdown] released");
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            cursor: self.cursor,
            status: self.status,
            speed_kmh: self.speed_kmh,
            elapsed_seconds: self.elapsed_seconds,
            total_points: self.route.len(),
            progress_percent: progress_percent(self.cursor, self.route.len()),
            revision: self.revision,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn controls_enabled(&self) -> bool {
        !self.route.is_empty() && !self.released
    }

    fn last_index(&self) -> usize {
        self.route.len().saturating_sub(1)
    }

    fn rewind(&mut self) {
        self.ticker.stop();
        self.cursor = 0;
        self.speed_kmh = 0.;
        self.elapsed_seconds = 0;
        if let Some(first) = self.route.first() {
            self.map.reset(first.lat_lng());
        }
    }

    fn complete(&mut self) {
        self.ticker.stop();
        self.status = PlaybackStatus::Completed;
        info!("[playback_engine] route completed at #{}", self.cursor);
        self.observers.notify(&Notification::RouteCompleted);
        self.publish();
    }

    fn publish(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.observers.publish_snapshot(&self.snapshot());
    }
}

impl<M: MapView, T: TickSource> Drop for PlaybackEngine<M, T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
