#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod config;
pub mod distance;
pub mod error;
pub mod logs;
pub mod map_view;
pub mod observer;
pub mod playback;
pub mod route;
pub mod session;

pub use playback::{PlaybackEngine, PlaybackSnapshot, PlaybackStatus};
pub use route::{Route, RoutePoint, RouteSource, RouteStore};
