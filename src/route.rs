use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use geo_types::{coord, Rect};
use itertools::Itertools;
use serde::Deserialize;

use crate::distance;
use crate::error::LoadError;

/// `[latitude, longitude]`, the shape map front-ends expect.
pub type LatLng = [f64; 2];

#[derive(Clone, Debug, PartialEq)]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl RoutePoint {
    pub fn lat_lng(&self) -> LatLng {
        [self.latitude, self.longitude]
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    pub fn distance_to(&self, other: &RoutePoint) -> f64 {
        distance::distance_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// The recorded route, in chronological order. Never mutated after loading.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Route {
    points: Vec<RoutePoint>,
}

impl Route {
    pub fn new(points: Vec<RoutePoint>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RoutePoint> {
        self.points.get(index)
    }

    pub fn first(&self) -> Option<&RoutePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&RoutePoint> {
        self.points.last()
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn coordinates(&self) -> Vec<LatLng> {
        self.points.iter().map(RoutePoint::lat_lng).collect()
    }

    /// Coordinates of `route[0..=cursor]`, clamped to the route length.
    pub fn prefix(&self, cursor: usize) -> Vec<LatLng> {
        let end = (cursor + 1).min(self.points.len());
        self.points[..end].iter().map(RoutePoint::lat_lng).collect()
    }

    /// Bounding box with `x` as longitude and `y` as latitude.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        bounds_of(&self.coordinates())
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.points
            .iter()
            .tuple_windows()
            .map(|(a, b)| a.distance_to(b))
            .sum()
    }

    pub fn duration(&self) -> TimeDelta {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => TimeDelta::zero(),
        }
    }
}

pub fn bounds_of(path: &[LatLng]) -> Option<Rect<f64>> {
    let (first, rest) = path.split_first()?;
    let init = (first[0], first[1], first[0], first[1]);
    let (min_lat, min_lng, max_lat, max_lng) =
        rest.iter()
            .fold(init, |(min_lat, min_lng, max_lat, max_lng), [lat, lng]| {
                (
                    min_lat.min(*lat),
                    min_lng.min(*lng),
                    max_lat.max(*lat),
                    max_lng.max(*lng),
                )
            });
    Some(Rect::new(
        coord! { x: min_lng, y: min_lat },
        coord! { x: max_lng, y: max_lat },
    ))
}

pub enum RouteSource {
    /// The static JSON document the route is published as.
    JsonFile(PathBuf),
    /// A JSON payload that was already fetched by someone else.
    JsonText(String),
    GpxFile(PathBuf),
}

#[derive(Deserialize)]
struct RawRoutePoint {
    latitude: f64,
    longitude: f64,
    timestamp: String,
}

pub struct RouteStore {}

impl RouteStore {
    pub fn load(source: &RouteSource) -> Result<Route, LoadError> {
        let route = match source {
            RouteSource::JsonFile(path) => {
                let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                Self::parse_json(&text)?
            }
            RouteSource::JsonText(text) => Self::parse_json(text)?,
            RouteSource::GpxFile(path) => Self::load_gpx(path)?,
        };
        info!("[route_store.load] loaded {} points", route.len());
        Ok(route)
    }

    pub fn parse_json(text: &str) -> Result<Route, LoadError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let elements = match value {
            serde_json::Value::Array(elements) => elements,
            _ => return Err(LoadError::NotAnArray),
        };

        let points = elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let raw: RawRoutePoint =
                    serde_json::from_value(element).map_err(|e| LoadError::InvalidPoint {
                        index,
                        reason: e.to_string(),
                    })?;
                let timestamp =
                    parse_timestamp(&raw.timestamp).ok_or_else(|| LoadError::InvalidTimestamp {
                        index,
                        value: raw.timestamp.clone(),
                    })?;
                Ok(RoutePoint {
                    latitude: raw.latitude,
                    longitude: raw.longitude,
                    timestamp,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        Ok(Route::new(points))
    }

    pub fn load_gpx(file_path: &Path) -> Result<Route, LoadError> {
        let file = File::open(file_path).map_err(|source| LoadError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
        let gpx_data =
            gpx::read(BufReader::new(file)).map_err(|source| LoadError::Gpx { source })?;

        let mut points = Vec::new();
        for point in gpx_data
            .tracks
            .iter()
            .flat_map(|track| track.segments.iter())
            .flat_map(|segment| segment.points.iter())
        {
            let time = point
                .time
                .as_ref()
                .ok_or(LoadError::MissingTime {
                    index: points.len(),
                })?;
            let formatted = time.format().map_err(|source| LoadError::Gpx { source })?;
            let timestamp = parse_timestamp(&formatted).ok_or_else(|| {
                LoadError::InvalidTimestamp {
                    index: points.len(),
                    value: formatted.clone(),
                }
            })?;
            points.push(RoutePoint {
                latitude: point.point().y(),
                longitude: point.point().x(),
                timestamp,
            });
        }
        Ok(Route::new(points))
    }
}

/// RFC 3339 first, then a naive date time which is taken as UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(input) {
        return Some(time.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use crate::route::parse_timestamp;

    #[test]
    fn timestamp_formats() {
        let check = |input: &str, expected_ms: i64| {
            assert_eq!(
                parse_timestamp(input).unwrap().timestamp_millis(),
                expected_ms,
                "{input}"
            );
        };
        check("2024-01-01T00:00:00Z", 1704067200000);
        check("2024-01-01T08:00:00+08:00", 1704067200000);
        check("2024-01-01T00:00:00.250Z", 1704067200250);
        check("2024-01-01T00:00:05", 1704067205000);
        check("2024-01-01 00:00:05.5", 1704067205500);
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
