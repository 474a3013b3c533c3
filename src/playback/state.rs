use serde::Serialize;
use strum_macros::{Display, EnumString};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    // terminal until `reset` (or `play`, which resets first)
    Completed,
}

/// What the control surface gets to see. Snapshots are published in
/// `revision` order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub cursor: usize,
    pub status: PlaybackStatus,
    pub speed_kmh: f64,
    pub elapsed_seconds: i64,
    pub total_points: usize,
    pub progress_percent: f64,
    pub revision: u64,
}

impl PlaybackSnapshot {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

pub fn progress_percent(cursor: usize, total_points: usize) -> f64 {
    if total_points < 2 {
        return 0.0;
    }
    cursor as f64 / (total_points - 1) as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::playback::state::{progress_percent, PlaybackStatus};

    #[test]
    fn progress() {
        assert_eq!(progress_percent(0, 0), 0.0);
        assert_eq!(progress_percent(0, 1), 0.0);
        assert_eq!(progress_percent(2, 5), 50.0);
        assert_eq!(progress_percent(4, 5), 100.0);
    }

    #[test]
    fn status_names() {
        assert_eq!(PlaybackStatus::Completed.to_string(), "completed");
        assert_eq!(
            PlaybackStatus::from_str("playing").unwrap(),
            PlaybackStatus::Playing
        );
    }
}
