use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use serde::Serialize;

use crate::route::{bounds_of, LatLng};

/// The map the playback is shown on. The engine only ever talks to this
/// trait, so any map backend can sit behind it.
pub trait MapView {
    fn set_vehicle_position(&mut self, latitude: f64, longitude: f64);

    fn set_active_path(&mut self, path: &[LatLng]);

    fn set_static_path(&mut self, path: &[LatLng]);

    fn fit_bounds(&mut self, path: &[LatLng]);

    /// Back to the start: vehicle on the first point, nothing travelled yet.
    fn reset(&mut self, start: LatLng) {
        self.set_vehicle_position(start[0], start[1]);
        self.set_active_path(&[]);
    }

    /// Called once when the playback is torn down.
    fn release(&mut self) {}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MapCommand {
    SetVehiclePosition {
        latitude: f64,
        longitude: f64,
    },
    SetActivePath {
        path: Vec<LatLng>,
    },
    SetStaticPath {
        path: Vec<LatLng>,
    },
    #[serde(rename_all = "camelCase")]
    FitBounds {
        south_west: LatLng,
        north_east: LatLng,
    },
    Reset {
        start: LatLng,
    },
    Release,
}

/// Queues map commands so a map front-end can poll them and execute them in
/// sequence. Clones share the same queue.
#[derive(Clone, Default)]
pub struct MapCommandQueue {
    commands: Arc<Mutex<VecDeque<MapCommand>>>,
}

impl MapCommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: MapCommand) {
        self.commands.lock().unwrap().push_back(command);
    }

    pub fn len(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.lock().unwrap().is_empty()
    }

    pub fn drain(&self) -> Vec<MapCommand> {
        self.commands.lock().unwrap().drain(..).collect()
    }

    pub fn drain_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.drain())?)
    }
}

impl MapView for MapCommandQueue {
    fn set_vehicle_position(&mut self, latitude: f64, longitude: f64) {
        self.push(MapCommand::SetVehiclePosition {
            latitude,
            longitude,
        });
    }

    fn set_active_path(&mut self, path: &[LatLng]) {
        self.push(MapCommand::SetActivePath {
            path: path.to_vec(),
        });
    }

    fn set_static_path(&mut self, path: &[LatLng]) {
        self.push(MapCommand::SetStaticPath {
            path: path.to_vec(),
        });
    }

    fn fit_bounds(&mut self, path: &[LatLng]) {
        match bounds_of(path) {
            None => warn!("[map_command_queue] `fit_bounds` called with an empty path"),
            Some(rect) => self.push(MapCommand::FitBounds {
                south_west: [rect.min().y, rect.min().x],
                north_east: [rect.max().y, rect.max().x],
            }),
        }
    }

    // one command instead of two, the front-end knows what a reset means
    fn reset(&mut self, start: LatLng) {
        self.push(MapCommand::Reset { start });
    }

    fn release(&mut self) {
        self.push(MapCommand::Release);
    }
}

/// Only logs what would be drawn. Handy when there is no map at all.
pub struct LoggingMapView {
    active_path_len: usize,
}

impl LoggingMapView {
    pub fn new() -> Self {
        Self { active_path_len: 0 }
    }

    pub fn active_path_len(&self) -> usize {
        self.active_path_len
    }
}

impl MapView for LoggingMapView {
    fn set_vehicle_position(&mut self, latitude: f64, longitude: f64) {
        debug!("[map] vehicle at ({latitude:.6}, {longitude:.6})");
    }

    fn set_active_path(&mut self, path: &[LatLng]) {
        self.active_path_len = path.len();
        debug!("[map] active path has {} points", path.len());
    }

    fn set_static_path(&mut self, path: &[LatLng]) {
        info!("[map] static path has {} points", path.len());
    }

    fn fit_bounds(&mut self, path: &[LatLng]) {
        if let Some(rect) = bounds_of(path) {
            info!(
                "[map] fit bounds sw=({:.6}, {:.6}) ne=({:.6}, {:.6})",
                rect.min().y,
                rect.min().x,
                rect.max().y,
                rect.max().x
            );
        }
    }

    fn release(&mut self) {
        info!("[map] released");
    }
}
