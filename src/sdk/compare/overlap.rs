//! Corridor overlap between a reference route and a candidate route.
//!
//! Both routes are projected to a local planar system in meters. The
//! reference corridor is the set of points within `corridor_width_m` of the
//! reference polyline, i.e. a round-capped buffer. The ratio is the share of
//! the candidate's length lying inside that corridor.
//!
//! The measure is reference-relative: `overlap(a, b)` and `overlap(b, a)`
//! generally differ, because each is normalised by the candidate's length.

use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::sdk::area::Coordinate;
use crate::sdk::routing::route::Route;

/// Planar projection applied before buffering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Transverse Mercator in the UTM zone of the reference route's first point.
    LocalUtm,
    /// Equirectangular around the reference route's mean latitude. Cheaper, fine for city-scale areas.
    Equirectangular,
}

impl FromStr for Projection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utm" | "local-utm" => Ok(Projection::LocalUtm),
            "equirectangular" => Ok(Projection::Equirectangular),
            other => Err(format!(
                "unknown projection '{other}', expected 'utm' or 'equirectangular'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapSettings {
    /// Buffer distance from the reference line to the corridor edge, in meters.
    pub corridor_width_m: f64,
    pub projection: Projection,
}

impl Default for OverlapSettings {
    fn default() -> Self {
        Self {
            corridor_width_m: 30.0,
            projection: Projection::LocalUtm,
        }
    }
}

/// Overlap ratio of `candidate` against the corridor around `reference`, in `[0, 1]`.
pub fn compute_overlap(reference: &Route, candidate: &Route, settings: &OverlapSettings) -> f64 {
    overlap_ratio(reference.geometry(), candidate.geometry(), settings)
}

/// Geometry-level variant of [`compute_overlap`].
///
/// A candidate with fewer than two points or zero length yields 0.
pub fn overlap_ratio(
    reference: &[Coordinate],
    candidate: &[Coordinate],
    settings: &OverlapSettings,
) -> f64 {
    if reference.is_empty() || candidate.len() < 2 {
        return 0.0;
    }
    let width = settings.corridor_width_m.max(0.0);

    let projector = Projector::for_reference(reference, settings.projection);
    let reference_xy: Vec<[f64; 2]> = reference.iter().map(|c| projector.project(c)).collect();
    let candidate_xy: Vec<[f64; 2]> = candidate.iter().map(|c| projector.project(c)).collect();

    let corridor = Corridor::new(&reference_xy, width);

    let mut total = 0.0;
    let mut inside = 0.0;
    for w in candidate_xy.windows(2) {
        let length = distance(w[0], w[1]);
        if length == 0.0 {
            continue;
        }
        total += length;
        inside += corridor.covered_fraction(w[0], w[1]) * length;
    }

    if total <= 0.0 {
        return 0.0;
    }
    (inside / total).clamp(0.0, 1.0)
}

// ============================================================================
// Projection
// ============================================================================

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const UTM_K0: f64 = 0.9996;
const EARTH_RADIUS_M: f64 = 6_371_008.8;

enum Projector {
    Utm { central_meridian: f64, south: bool },
    Equirectangular { lat0: f64, lon0: f64, cos_lat0: f64 },
}

impl Projector {
    fn for_reference(reference: &[Coordinate], projection: Projection) -> Self {
        match projection {
            Projection::LocalUtm => {
                let anchor = reference[0];
                let zone = utm_zone(anchor.longitude);
                Projector::Utm {
                    central_meridian: f64::from(zone) * 6.0 - 183.0,
                    south: anchor.latitude < 0.0,
                }
            }
            Projection::Equirectangular => {
                let n = reference.len() as f64;
                let lat0 = reference.iter().map(|c| c.latitude).sum::<f64>() / n;
                let lon0 = reference.iter().map(|c| c.longitude).sum::<f64>() / n;
                Projector::Equirectangular {
                    lat0,
                    lon0,
                    cos_lat0: lat0.to_radians().cos(),
                }
            }
        }
    }

    fn project(&self, c: &Coordinate) -> [f64; 2] {
        match *self {
            Projector::Utm {
                central_meridian,
                south,
            } => utm_forward(c.latitude, c.longitude, central_meridian, south),
            Projector::Equirectangular {
                lat0,
                lon0,
                cos_lat0,
            } => [
                EARTH_RADIUS_M * (c.longitude - lon0).to_radians() * cos_lat0,
                EARTH_RADIUS_M * (c.latitude - lat0).to_radians(),
            ],
        }
    }
}

fn utm_zone(longitude: f64) -> u8 {
    let zone = ((longitude + 180.0) / 6.0).floor() as i32 + 1;
    zone.clamp(1, 60) as u8
}

/// Transverse Mercator forward projection on the WGS84 ellipsoid (Snyder, 8-9..8-15).
fn utm_forward(lat: f64, lon: f64, central_meridian: f64, south: bool) -> [f64; 2] {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let ep2 = e2 / (1.0 - e2);
    let phi = lat.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let tan_phi = phi.tan();

    let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * (lon - central_meridian).to_radians();

    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let m = WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

    let a2 = a * a;
    let x = UTM_K0
        * n
        * (a + (1.0 - t + c) * a2 * a / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a2 * a2 * a / 120.0)
        + 500_000.0;
    let mut y = UTM_K0
        * (m + n
            * tan_phi
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a2 * a2 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a2 * a2 * a2 / 720.0));
    if south {
        y += 10_000_000.0;
    }
    [x, y]
}

// ============================================================================
// Corridor geometry
// ============================================================================

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (b[0] - a[0]).hypot(b[1] - a[1])
}

fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

/// A reference segment indexed by its corridor envelope.
struct CorridorSegment {
    start: [f64; 2],
    end: [f64; 2],
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for CorridorSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

struct Corridor {
    tree: RTree<CorridorSegment>,
    width: f64,
}

impl Corridor {
    fn new(reference: &[[f64; 2]], width: f64) -> Self {
        let segment = |start: [f64; 2], end: [f64; 2]| CorridorSegment {
            start,
            end,
            envelope: AABB::from_corners(
                [start[0].min(end[0]) - width, start[1].min(end[1]) - width],
                [start[0].max(end[0]) + width, start[1].max(end[1]) + width],
            ),
        };

        let segments = if reference.len() == 1 {
            vec![segment(reference[0], reference[0])]
        } else {
            reference.windows(2).map(|w| segment(w[0], w[1])).collect()
        };

        Self {
            tree: RTree::bulk_load(segments),
            width,
        }
    }

    /// Fraction of the segment `p0 -> p1` that lies inside the corridor.
    fn covered_fraction(&self, p0: [f64; 2], p1: [f64; 2]) -> f64 {
        let query = AABB::from_corners(
            [p0[0].min(p1[0]), p0[1].min(p1[1])],
            [p0[0].max(p1[0]), p0[1].max(p1[1])],
        );

        let mut intervals: Vec<(f64, f64)> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .filter_map(|s| capsule_interval(p0, p1, s.start, s.end, self.width))
            .collect();
        if intervals.is_empty() {
            return 0.0;
        }

        intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut covered = 0.0;
        let (mut lo, mut hi) = intervals[0];
        for &(start, end) in &intervals[1..] {
            if start > hi {
                covered += hi - lo;
                lo = start;
            }
            hi = hi.max(end);
        }
        covered += hi - lo;
        covered.min(1.0)
    }
}

/// Parameter range `t` in `[0, 1]` where `p0 + t (p1 - p0)` lies within `r` of
/// segment `a-b`.
///
/// The capsule is convex, so the range is a single interval: the hull of the
/// ranges inside the two end discs and the central rectangle.
fn capsule_interval(
    p0: [f64; 2],
    p1: [f64; 2],
    a: [f64; 2],
    b: [f64; 2],
    r: f64,
) -> Option<(f64, f64)> {
    let pieces = [
        disc_interval(p0, p1, a, r),
        disc_interval(p0, p1, b, r),
        slab_interval(p0, p1, a, b, r),
    ];
    pieces
        .into_iter()
        .flatten()
        .reduce(|x, y| (x.0.min(y.0), x.1.max(y.1)))
}

fn disc_interval(p0: [f64; 2], p1: [f64; 2], center: [f64; 2], r: f64) -> Option<(f64, f64)> {
    let d = sub(p1, p0);
    let f = sub(p0, center);
    let qa = dot(d, d);
    let qb = 2.0 * dot(f, d);
    let qc = dot(f, f) - r * r;

    let discriminant = qb * qb - 4.0 * qa * qc;
    if qa == 0.0 || discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let t0 = ((-qb - root) / (2.0 * qa)).max(0.0);
    let t1 = ((-qb + root) / (2.0 * qa)).min(1.0);
    (t0 <= t1).then_some((t0, t1))
}

fn slab_interval(
    p0: [f64; 2],
    p1: [f64; 2],
    a: [f64; 2],
    b: [f64; 2],
    r: f64,
) -> Option<(f64, f64)> {
    let ab = sub(b, a);
    let len = dot(ab, ab).sqrt();
    if len == 0.0 {
        return None;
    }
    let along = [ab[0] / len, ab[1] / len];
    let across = [-along[1], along[0]];

    let d = sub(p1, p0);
    let f = sub(p0, a);

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    // 0 <= s(t) <= len and -r <= h(t) <= r, both linear in t
    for (offset, slope, min, max) in [
        (dot(f, along), dot(d, along), 0.0, len),
        (dot(f, across), dot(d, across), -r, r),
    ] {
        if slope.abs() < f64::EPSILON * len.max(1.0) {
            if offset < min || offset > max {
                return None;
            }
            continue;
        }
        let t_min = (min - offset) / slope;
        let t_max = (max - offset) / slope;
        lo = lo.max(t_min.min(t_max));
        hi = hi.min(t_min.max(t_max));
    }
    (lo <= hi).then_some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|&(lat, lon)| Coordinate::new(lat, lon)).collect()
    }

    fn settings(projection: Projection) -> OverlapSettings {
        OverlapSettings {
            projection,
            ..OverlapSettings::default()
        }
    }

    #[test]
    fn default_corridor_is_30m_utm() {
        let defaults = OverlapSettings::default();
        assert_eq!(defaults.corridor_width_m, 30.0);
        assert_eq!(defaults.projection, Projection::LocalUtm);
    }

    #[test]
    fn projection_names_parse() {
        assert_eq!("UTM".parse::<Projection>(), Ok(Projection::LocalUtm));
        assert_eq!(
            "equirectangular".parse::<Projection>(),
            Ok(Projection::Equirectangular)
        );
        assert!("mercator".parse::<Projection>().is_err());
    }

    #[test]
    fn identical_routes_overlap_fully() {
        let route = line(&[(48.80, 9.10), (48.81, 9.12), (48.83, 9.13), (48.85, 9.17)]);
        for projection in [Projection::LocalUtm, Projection::Equirectangular] {
            let ratio = overlap_ratio(&route, &route, &settings(projection));
            assert!((ratio - 1.0).abs() < 1e-12, "{projection:?}: {ratio}");
        }
    }

    #[test]
    fn empty_or_degenerate_candidate_is_zero() {
        let reference = line(&[(48.80, 9.10), (48.85, 9.17)]);
        let s = OverlapSettings::default();
        assert_eq!(overlap_ratio(&reference, &[], &s), 0.0);
        assert_eq!(overlap_ratio(&reference, &line(&[(48.80, 9.10)]), &s), 0.0);
        let stationary = line(&[(48.80, 9.10), (48.80, 9.10)]);
        assert_eq!(overlap_ratio(&reference, &stationary, &s), 0.0);
    }

    #[test]
    fn far_away_candidate_is_zero() {
        let reference = line(&[(48.80, 9.10), (48.80, 9.12)]);
        let candidate = line(&[(48.90, 9.10), (48.90, 9.12)]);
        assert_eq!(overlap_ratio(&reference, &candidate, &OverlapSettings::default()), 0.0);
    }

    #[test]
    fn parallel_offset_respects_corridor_width() {
        // ~11 m north of the reference
        let reference = line(&[(48.80, 9.10), (48.80, 9.12)]);
        let candidate = line(&[(48.8001, 9.10), (48.8001, 9.12)]);
        let within = overlap_ratio(&reference, &candidate, &OverlapSettings::default());
        assert!((within - 1.0).abs() < 1e-9, "{within}");

        let narrow = OverlapSettings {
            corridor_width_m: 5.0,
            ..OverlapSettings::default()
        };
        assert_eq!(overlap_ratio(&reference, &candidate, &narrow), 0.0);
    }

    #[test]
    fn half_shared_candidate_is_about_half() {
        // reference runs east; candidate follows it for ~1.47 km then turns north for the same distance
        let reference = line(&[(48.80, 9.10), (48.80, 9.14)]);
        let candidate = line(&[(48.80, 9.10), (48.80, 9.12), (48.81322, 9.12)]);
        let ratio = overlap_ratio(&reference, &candidate, &settings(Projection::Equirectangular));
        // the turn keeps ~30 m of the northbound leg inside the corridor
        assert!(ratio > 0.49 && ratio < 0.52, "{ratio}");
    }

    #[test]
    fn overlap_is_not_symmetric() {
        let long = line(&[(48.80, 9.10), (48.80, 9.14)]);
        let short = line(&[(48.80, 9.10), (48.80, 9.12)]);
        let s = OverlapSettings::default();
        let short_in_long = overlap_ratio(&long, &short, &s);
        let long_in_short = overlap_ratio(&short, &long, &s);
        assert!((short_in_long - 1.0).abs() < 1e-9);
        assert!(long_in_short > 0.49 && long_in_short < 0.52, "{long_in_short}");
    }

    #[test]
    fn reversed_candidate_still_overlaps() {
        let reference = line(&[(48.80, 9.10), (48.81, 9.12), (48.83, 9.13)]);
        let reversed: Vec<_> = reference.iter().rev().copied().collect();
        let ratio = overlap_ratio(&reference, &reversed, &OverlapSettings::default());
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_point_reference_acts_as_disc() {
        let reference = line(&[(48.80, 9.10)]);
        // 100 m east-west line centred on the point; 60 m of it is within 30 m
        let half = 50.0 / (111_195.0 * 48.80_f64.to_radians().cos());
        let candidate = line(&[(48.80, 9.10 - half), (48.80, 9.10 + half)]);
        let ratio = overlap_ratio(&reference, &candidate, &settings(Projection::Equirectangular));
        assert!((ratio - 0.6).abs() < 0.01, "{ratio}");
    }

    #[test]
    fn utm_zone_for_stuttgart_is_32() {
        assert_eq!(utm_zone(9.15), 32);
        assert_eq!(utm_zone(-180.0), 1);
        assert_eq!(utm_zone(180.0), 60);
    }

    #[test]
    fn utm_matches_known_easting_northing() {
        // on the central meridian northing is k0 * meridian arc (4_984_944.38 m at 45N)
        let [x, y] = utm_forward(45.0, 9.0, 9.0, false);
        assert!((x - 500_000.0).abs() < 1e-6, "{x}");
        assert!((y - 4_982_950.40).abs() < 0.5, "{y}");

        let [x, _] = utm_forward(48.7840, 9.1817, 9.0, false);
        assert!((x - 513_347.0).abs() < 5.0, "{x}");

        let [_, y] = utm_forward(-45.0, 9.0, 9.0, true);
        assert!((y - (10_000_000.0 - 4_982_950.40)).abs() < 0.5, "{y}");
    }

    #[test]
    fn capsule_interval_of_crossing_segment() {
        // vertical candidate crossing a horizontal reference of width 1
        let interval = capsule_interval([5.0, -10.0], [5.0, 10.0], [0.0, 0.0], [10.0, 0.0], 1.0)
            .unwrap();
        assert!((interval.0 - 0.45).abs() < 1e-12);
        assert!((interval.1 - 0.55).abs() < 1e-12);
    }
}
