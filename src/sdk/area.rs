//! Geographic primitives: WGS84 coordinates and the sampling area.
//!
//! An [`Area`] is either a named preset or a user-drawn box. Both end up as a
//! validated simple polygon; nothing downstream cares which one it was.

use geo::{Contains, Distance, Haversine, Intersects, Line, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a coordinate, rejecting values outside the WGS84 ranges.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, ConfigError> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(ConfigError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        Haversine.distance(self.to_point(), other.to_point())
    }
}

/// Great-circle length of a polyline in meters.
pub fn path_length(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Named areas available without drawing a box.
const PRESETS: &[(&str, [f64; 4])] = &[
    // min_lon, min_lat, max_lon, max_lat
    ("stuttgart-weilimdorf", [9.10, 48.78, 9.20, 48.88]),
    ("unit-box", [0.0, 0.0, 1.0, 1.0]),
];

/// Names of all preset areas.
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}

/// A validated, simple, non-degenerate sampling region.
#[derive(Debug, Clone, Serialize)]
pub struct Area {
    name: Option<String>,
    /// Ring vertices, not closed.
    vertices: Vec<Coordinate>,
    #[serde(skip)]
    polygon: Polygon<f64>,
}

impl Area {
    /// Looks up a preset by name.
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        let (_, [min_lon, min_lat, max_lon, max_lat]) = PRESETS
            .iter()
            .find(|(preset, _)| *preset == name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
        let mut area = Self::from_bbox(*min_lon, *min_lat, *max_lon, *max_lat)?;
        area.name = Some(name.to_string());
        Ok(area)
    }

    /// A box given as `min_lon, min_lat, max_lon, max_lat`, the order the map UI sends.
    pub fn from_bbox(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Result<Self, ConfigError> {
        if min_lon >= max_lon || min_lat >= max_lat {
            return Err(ConfigError::InvalidArea(format!(
                "bounding box [{min_lon}, {min_lat}, {max_lon}, {max_lat}] has no extent"
            )));
        }
        Self::from_corners([
            Coordinate::checked(min_lat, min_lon)?,
            Coordinate::checked(min_lat, max_lon)?,
            Coordinate::checked(max_lat, max_lon)?,
            Coordinate::checked(max_lat, min_lon)?,
        ])
    }

    /// A user-drawn quadrilateral given by its four corners in ring order.
    pub fn from_corners(corners: [Coordinate; 4]) -> Result<Self, ConfigError> {
        Self::polygon(None, corners.to_vec())
    }

    /// An arbitrary polygon. A closing vertex equal to the first one is accepted and dropped.
    pub fn polygon(name: Option<String>, mut vertices: Vec<Coordinate>) -> Result<Self, ConfigError> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if let Some(bad) = vertices.iter().find(|c| !c.is_valid()) {
            return Err(ConfigError::InvalidCoordinate {
                latitude: bad.latitude,
                longitude: bad.longitude,
            });
        }
        if vertices.len() < 3 {
            return Err(ConfigError::InvalidArea(format!(
                "a polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }

        let ring: Vec<(f64, f64)> = vertices.iter().map(|c| (c.longitude, c.latitude)).collect();
        let polygon = Polygon::new(LineString::from(ring), vec![]);

        if geo::Area::unsigned_area(&polygon) <= f64::EPSILON {
            return Err(ConfigError::InvalidArea("polygon has zero area".to_string()));
        }
        if is_self_intersecting(&vertices) {
            return Err(ConfigError::InvalidArea(
                "polygon edges intersect each other".to_string(),
            ));
        }

        Ok(Self {
            name,
            vertices,
            polygon,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Strict interior test; points on the boundary are outside.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        self.polygon.contains(&coord.to_point())
    }

    /// `(min_lon, min_lat, max_lon, max_lat)` of the vertices.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        self.vertices.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(min_lon, min_lat, max_lon, max_lat), c| {
                (
                    min_lon.min(c.longitude),
                    min_lat.min(c.latitude),
                    max_lon.max(c.longitude),
                    max_lat.max(c.latitude),
                )
            },
        )
    }
}

fn is_self_intersecting(vertices: &[Coordinate]) -> bool {
    let n = vertices.len();
    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(vertices[i].to_point(), vertices[(i + 1) % n].to_point()))
        .collect();

    for i in 0..n {
        // consecutive edges may only share their common vertex
        if folds_back(&edges[(i + n - 1) % n], &edges[i]) {
            return true;
        }
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if !adjacent && edges[i].intersects(&edges[j]) {
                return true;
            }
        }
    }
    false
}

/// `incoming` ends where `outgoing` starts; true if the ring turns 180 degrees there.
fn folds_back(incoming: &Line<f64>, outgoing: &Line<f64>) -> bool {
    let (ax, ay) = (incoming.dx(), incoming.dy());
    let (bx, by) = (outgoing.dx(), outgoing.dy());
    let cross = ax * by - ay * bx;
    let dot = ax * bx + ay * by;
    let scale = ax.hypot(ay) * bx.hypot(by);
    dot < 0.0 && cross.abs() <= f64::EPSILON * scale
}
