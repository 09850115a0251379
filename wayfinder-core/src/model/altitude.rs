//! Floor heights: constant or linearly sloped altitude areas

use std::cmp::Ordering;
use std::f64::consts::TAU;

use geo::{
    Area as _, BooleanOps, Coord, Distance, Euclidean, LineString, MultiPolygon, Point, Polygon,
};

use crate::LevelId;

const PROBE_SEGMENTS: usize = 16;
const OVERLAP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum AltitudeProfile {
    Constant(f64),
    /// Altitude varies linearly along the line `from -> to` and stays
    /// constant beyond its ends
    Slope {
        from: Point<f64>,
        from_altitude: f64,
        to: Point<f64>,
        to_altitude: f64,
    },
}

impl AltitudeProfile {
    pub fn altitude_at(&self, point: &Point<f64>) -> f64 {
        match *self {
            AltitudeProfile::Constant(altitude) => altitude,
            AltitudeProfile::Slope {
                from,
                from_altitude,
                to,
                to_altitude,
            } => {
                let direction = to - from;
                let length_sq = direction.dot(direction);
                if length_sq <= f64::EPSILON {
                    return (from_altitude + to_altitude) / 2.0;
                }
                let t = ((*point - from).dot(direction) / length_sq).clamp(0.0, 1.0);
                from_altitude + t * (to_altitude - from_altitude)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AltitudeArea {
    pub id: u32,
    pub level: LevelId,
    pub geometry: MultiPolygon<f64>,
    pub profile: AltitudeProfile,
}

impl AltitudeArea {
    pub fn altitude_at(&self, point: &Point<f64>) -> f64 {
        self.profile.altitude_at(point)
    }

    pub fn distance_to(&self, point: &Point<f64>) -> f64 {
        self.geometry
            .iter()
            .map(|polygon| Euclidean.distance(point, polygon))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Resolves the altitude of `point` from the altitude areas of its level.
///
/// Areas within `tolerance` of the point are eligible. When several are,
/// the one overlapping most with a disk of `buffer_radius` around the point
/// wins; ties go to the greater absolute altitude, then to the lower id.
pub fn resolve_altitude<'a>(
    areas: impl IntoIterator<Item = &'a AltitudeArea>,
    point: &Point<f64>,
    tolerance: f64,
    buffer_radius: f64,
) -> Option<f64> {
    let eligible: Vec<&AltitudeArea> = areas
        .into_iter()
        .filter(|area| area.distance_to(point) <= tolerance)
        .collect();

    match eligible.as_slice() {
        [] => None,
        [single] => Some(single.altitude_at(point)),
        _ => {
            let probe = probe_disk(point, buffer_radius);
            eligible
                .into_iter()
                .map(|area| {
                    let overlap = probe.intersection(&area.geometry).unsigned_area();
                    (area, overlap, area.altitude_at(point))
                })
                .max_by(|a, b| {
                    compare_overlap(a.1, b.1)
                        .then(a.2.abs().total_cmp(&b.2.abs()))
                        .then(b.0.id.cmp(&a.0.id))
                })
                .map(|(_, _, altitude)| altitude)
        }
    }
}

fn compare_overlap(a: f64, b: f64) -> Ordering {
    if (a - b).abs() <= OVERLAP_EPSILON {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// Regular polygon approximating a disk
fn probe_disk(center: &Point<f64>, radius: f64) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = (0..PROBE_SEGMENTS)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = TAU * i as f64 / PROBE_SEGMENTS as f64;
            Coord {
                x: center.x() + radius * angle.cos(),
                y: center.y() + radius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

#[cfg(test)]
mod tests {
    use geo::{Rect, point};

    use super::*;

    fn square_area(id: u32, min: (f64, f64), max: (f64, f64), profile: AltitudeProfile) -> AltitudeArea {
        AltitudeArea {
            id,
            level: 0,
            geometry: MultiPolygon::new(vec![Rect::new(min, max).to_polygon()]),
            profile,
        }
    }

    #[test]
    fn slope_interpolates_along_projection() {
        let ramp = AltitudeProfile::Slope {
            from: point!(x: 0.0, y: 0.0),
            from_altitude: 0.0,
            to: point!(x: 10.0, y: 0.0),
            to_altitude: 2.0,
        };

        assert!((ramp.altitude_at(&point!(x: 5.0, y: 3.0)) - 1.0).abs() < 1e-9);
        assert!((ramp.altitude_at(&point!(x: -4.0, y: 0.0))).abs() < 1e-9);
        assert!((ramp.altitude_at(&point!(x: 14.0, y: 1.0)) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn larger_overlap_wins_on_shared_boundary() {
        // The point sits on the boundary but its probe disk reaches further into `wide`
        let narrow = square_area(1, (0.0, 0.0), (5.0, 0.05), AltitudeProfile::Constant(4.0));
        let wide = square_area(2, (0.0, 0.05), (5.0, 5.0), AltitudeProfile::Constant(1.0));
        let altitude = resolve_altitude([&narrow, &wide], &point!(x: 2.5, y: 0.05), 0.05, 0.1);
        assert_eq!(altitude, Some(1.0));
    }

    #[test]
    fn equal_overlap_prefers_greater_absolute_altitude() {
        let low = square_area(1, (0.0, 0.0), (5.0, 5.0), AltitudeProfile::Constant(1.0));
        let high = square_area(2, (5.0, 0.0), (10.0, 5.0), AltitudeProfile::Constant(-3.0));
        let altitude = resolve_altitude([&low, &high], &point!(x: 5.0, y: 2.5), 0.05, 0.1);
        assert_eq!(altitude, Some(-3.0));
    }

    #[test]
    fn no_eligible_area() {
        let far = square_area(1, (0.0, 0.0), (1.0, 1.0), AltitudeProfile::Constant(1.0));
        assert_eq!(resolve_altitude([&far], &point!(x: 3.0, y: 3.0), 0.05, 0.1), None);
    }
}
