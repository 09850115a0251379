//! Serialized form of a map snapshot handed in by the map-authoring side

use serde::{Deserialize, Serialize};

use crate::{
    AccessRestrictionId, AreaId, LevelId, MapNodeId, MapVersion, SpaceId, WayTypeId,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapData {
    pub version: MapVersion,
    #[serde(default)]
    pub levels: Vec<RawLevel>,
    #[serde(default)]
    pub spaces: Vec<RawSpace>,
    #[serde(default)]
    pub areas: Vec<RawArea>,
    #[serde(default)]
    pub way_types: Vec<RawWayType>,
    #[serde(default)]
    pub altitude_areas: Vec<RawAltitudeArea>,
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPolygon {
    pub exterior: Vec<[f64; 2]>,
    #[serde(default)]
    pub holes: Vec<Vec<[f64; 2]>>,
}

impl RawPolygon {
    /// Axis-aligned rectangle
    pub fn rect(min: [f64; 2], max: [f64; 2]) -> Self {
        Self {
            exterior: vec![
                [min[0], min[1]],
                [max[0], min[1]],
                [max[0], max[1]],
                [min[0], max[1]],
            ],
            holes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLevel {
    pub id: LevelId,
    pub short_label: String,
    pub title: Option<String>,
    pub base_altitude: f64,
    pub on_top_of: Option<LevelId>,
    pub buildings: Vec<RawPolygon>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSpace {
    pub id: SpaceId,
    pub level: LevelId,
    pub title: Option<String>,
    pub geometry: RawPolygon,
    pub columns: Vec<RawPolygon>,
    pub holes: Vec<RawPolygon>,
    pub outside: bool,
    pub access_restriction: Option<AccessRestrictionId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawArea {
    pub id: AreaId,
    pub space: SpaceId,
    pub title: Option<String>,
    pub geometry: RawPolygon,
    pub access_restriction: Option<AccessRestrictionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWayType {
    pub id: WayTypeId,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_plural: String,
    #[serde(default)]
    pub icon_name: Option<String>,
    #[serde(default)]
    pub up_separate: bool,
    #[serde(default)]
    pub avoid_by_default: bool,
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Falls back to `speed`
    #[serde(default)]
    pub speed_up: Option<f64>,
    #[serde(default)]
    pub extra_seconds: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub up_description: Option<String>,
    #[serde(default)]
    pub down_description: Option<String>,
}

fn default_speed() -> f64 {
    1.0
}

impl RawWayType {
    pub fn new(id: WayTypeId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            title: String::new(),
            title_plural: String::new(),
            icon_name: None,
            up_separate: false,
            avoid_by_default: false,
            speed: default_speed(),
            speed_up: None,
            extra_seconds: 0.0,
            description: None,
            up_description: None,
            down_description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawAltitudeArea {
    pub id: u32,
    pub level: LevelId,
    pub geometry: RawPolygon,
    /// Constant altitude, ignored when `slope` is set
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub slope: Option<RawSlope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSlope {
    pub from: [f64; 2],
    pub from_altitude: f64,
    pub to: [f64; 2],
    pub to_altitude: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawNode {
    pub id: MapNodeId,
    pub level: LevelId,
    pub point: [f64; 2],
    #[serde(default)]
    pub space: Option<SpaceId>,
    #[serde(default)]
    pub access_restriction: Option<AccessRestrictionId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawEdge {
    pub from: MapNodeId,
    pub to: MapNodeId,
    /// Absent for plain walking
    #[serde(default)]
    pub waytype: Option<WayTypeId>,
    /// Absent to use the 3D distance between the endpoints
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub access_restriction: Option<AccessRestrictionId>,
    /// Also add the reverse edge
    #[serde(default)]
    pub both_ways: bool,
}
