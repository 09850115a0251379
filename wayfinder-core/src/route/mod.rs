//! Narrated routes built from search results.

mod assembler;
pub mod instructions;
mod to_geojson;

use std::ops::Range;

use serde::Serialize;

pub use assembler::assemble;
pub use instructions::{Instruction, InstructionTable, Transition};

use crate::routing::Location;
use crate::{Distance, LevelId, MapVersion, SpaceId, WayTypeId};

/// 3D position of a route item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub level: LevelId,
    pub x: f64,
    pub y: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEndpoint {
    pub location: Location,
    pub title: String,
}

/// A point of the route where something changes.
///
/// `waytype` is set where a way type starts, `space` and `level` where one is entered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteItem {
    pub coordinates: Coordinates,
    /// Space the item lies in
    pub in_space: SpaceId,
    pub waytype: Option<WayTypeId>,
    pub space: Option<SpaceId>,
    pub level: Option<LevelId>,
    /// `(icon, text)` pairs
    pub descriptions: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub version: MapVersion,
    pub origin: RouteEndpoint,
    pub destination: RouteEndpoint,
    /// Meters
    pub distance: Distance,
    /// Whole seconds
    pub duration: u32,
    pub distance_str: String,
    pub duration_str: String,
    pub summary: String,
    pub options_summary: String,
    pub items: Vec<RouteItem>,
}

impl Route {
    /// Item ranges that stay within one space and level
    pub fn segments(&self) -> Vec<Range<usize>> {
        let mut segments = Vec::new();
        let mut start = 0;
        for (idx, item) in self.items.iter().enumerate().skip(1) {
            if item.space.is_some() || item.level.is_some() {
                segments.push(start..idx);
                start = idx;
            }
        }
        if start < self.items.len() {
            segments.push(start..self.items.len());
        }
        segments
    }
}

pub(crate) fn format_distance(distance: Distance) -> String {
    format!("{} m", distance.round() as u64)
}

pub(crate) fn format_duration(seconds: u32) -> String {
    if seconds < 60 {
        format!("{seconds} s")
    } else {
        format!("{} min", (f64::from(seconds) / 60.0).round() as u32)
    }
}
