//! Geometric containers: levels, spaces and areas

use geo::{Area as _, BoundingRect, Distance, Euclidean, Intersects, MultiPolygon, Point};
use rstar::{AABB, RTreeObject};

use crate::{AccessRestrictionId, AreaId, LevelId, SpaceId};

#[derive(Debug, Clone)]
pub struct Level {
    pub id: LevelId,
    pub short_label: String,
    pub title: Option<String>,
    pub base_altitude: f64,
    /// Level this one is stacked on, narrated as part of it
    pub on_top_of: Option<LevelId>,
    pub buildings: MultiPolygon<f64>,
}

impl Level {
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.short_label)
    }
}

#[derive(Debug, Clone)]
pub struct Space {
    pub id: SpaceId,
    pub level: LevelId,
    pub title: Option<String>,
    pub outside: bool,
    pub access_restriction: Option<AccessRestrictionId>,
    /// Walkable geometry after columns, holes and building footprints were removed
    pub accessible: MultiPolygon<f64>,
}

impl Space {
    pub fn display_name(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("space {}", self.id))
    }

    /// Inclusive of the boundary
    pub fn covers(&self, point: &Point<f64>) -> bool {
        self.accessible.intersects(point)
    }

    pub fn distance_to(&self, point: &Point<f64>) -> f64 {
        self.accessible
            .iter()
            .map(|polygon| Euclidean.distance(point, polygon))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn area(&self) -> f64 {
        self.accessible.unsigned_area()
    }
}

#[derive(Debug, Clone)]
pub struct Area {
    pub id: AreaId,
    pub space: SpaceId,
    pub title: Option<String>,
    pub access_restriction: Option<AccessRestrictionId>,
    pub geometry: MultiPolygon<f64>,
}

impl Area {
    pub fn covers(&self, point: &Point<f64>) -> bool {
        self.geometry.intersects(point)
    }
}

/// Picks the space enclosing `point`: a covering space if any (lowest id first),
/// otherwise the nearest one within `tolerance`.
pub fn locate_space<'a>(
    candidates: impl IntoIterator<Item = &'a Space>,
    point: &Point<f64>,
    tolerance: f64,
) -> Option<&'a Space> {
    let mut nearest: Option<(&Space, f64)> = None;
    for space in candidates {
        let distance = if space.covers(point) {
            0.0
        } else {
            space.distance_to(point)
        };
        if distance > tolerance {
            continue;
        }
        let closer = match nearest {
            None => true,
            Some((best, best_distance)) => {
                distance < best_distance || (distance == best_distance && space.id < best.id)
            }
        };
        if closer {
            nearest = Some((space, distance));
        }
    }
    nearest.map(|(space, _)| space)
}

/// Bounding box of a space, stored in the per-level spatial index
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceEnvelope {
    pub space: SpaceId,
    envelope: AABB<[f64; 2]>,
}

impl SpaceEnvelope {
    pub fn new(space: &Space) -> Option<Self> {
        let rect = space.accessible.bounding_rect()?;
        Some(Self {
            space: space.id,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        })
    }
}

impl RTreeObject for SpaceEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}
