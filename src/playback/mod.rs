pub mod engine;
pub use engine::PlaybackEngine;

pub mod state;
pub use state::{PlaybackSnapshot, PlaybackStatus};

pub mod ticker;
pub use ticker::{IntervalTicker, ManualTicker, Tick, TickSource};
