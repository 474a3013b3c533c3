use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use strum_macros::{Display, EnumString};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// What to do with the speed of a step whose time delta is zero or negative
/// (duplicated or out of order timestamps in the recording).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SpeedAnomalyPolicy {
    #[default]
    Zero,
    HoldPrevious,
}

#[derive(Debug, Clone, Copy)]
pub enum Setting {
    TickIntervalMs,
    SpeedAnomalyPolicy,
    RoutePath,
}

impl Setting {
    fn to_key(self) -> &'static str {
        match self {
            Self::TickIntervalMs => "TICK_INTERVAL_MS",
            Self::SpeedAnomalyPolicy => "SPEED_ANOMALY_POLICY",
            Self::RoutePath => "ROUTE_PATH",
        }
    }
}

/// Flat key/value settings stored as a JSON object. Values are kept as
/// strings and parsed on read.
#[derive(Debug, Default, Clone)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// A missing file is not an error, it just means everything is default.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("[settings.open] {:?} not found, using defaults", path);
            return Ok(Settings::default());
        }
        let text =
            fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let object = match serde_json::from_str::<Value>(text)? {
            Value::Object(object) => object,
            other => bail!("settings must be a JSON object, got: {}", other),
        };
        let values = object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect();
        Ok(Settings { values })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, text).with_context(|| format!("failed to write {path:?}"))?;
        Ok(())
    }

    fn get_setting<T: FromStr>(&self, setting: Setting) -> Result<Option<T>>
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        match self.values.get(setting.to_key()) {
            None => Ok(None),
            Some(s) => {
                let v = FromStr::from_str(s)?;
                Ok(Some(v))
            }
        }
    }

    pub fn get_setting_with_default<T: FromStr>(&self, setting: Setting, default: T) -> T
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        match self.get_setting(setting) {
            Ok(v) => v,
            Err(error) => {
                warn!(
                    "[settings.get_setting_with_default] setting:{:?}, error:{}",
                    setting, error
                );
                None
            }
        }
        .unwrap_or(default)
    }

    pub fn set_setting<T: ToString>(&mut self, setting: Setting, value: T) {
        self.values
            .insert(setting.to_key().to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    pub tick_interval: Duration,
    pub speed_anomaly: SpeedAnomalyPolicy,
    pub route_path: Option<PathBuf>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            speed_anomaly: SpeedAnomalyPolicy::default(),
            route_path: None,
        }
    }
}

impl PlaybackConfig {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_settings(&Settings::open(path)?))
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let default = PlaybackConfig::default();
        let tick_interval_ms = settings.get_setting_with_default(
            Setting::TickIntervalMs,
            default.tick_interval.as_millis() as u64,
        );
        let tick_interval = if tick_interval_ms == 0 {
            warn!("[playback_config] tick interval of 0 ms is not allowed, using default");
            default.tick_interval
        } else {
            Duration::from_millis(tick_interval_ms)
        };
        let route_path = settings
            .get_setting_with_default(Setting::RoutePath, String::new())
            .trim()
            .to_owned();
        PlaybackConfig {
            tick_interval,
            speed_anomaly: settings
                .get_setting_with_default(Setting::SpeedAnomalyPolicy, default.speed_anomaly),
            route_path: if route_path.is_empty() {
                None
            } else {
                Some(PathBuf::from(route_path))
            },
        }
    }
}
