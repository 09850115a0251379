//! Converts raw map entities into validated geometry and catalogs.
//!
//! Inconsistent entities are logged and skipped; they never fail the whole build.

use geo::{Area as _, BooleanOps, LineString, MultiPolygon, Point, Polygon};
use hashbrown::{HashMap, HashSet};
use log::warn;
use rayon::prelude::*;

use super::raw_types::{
    MapData, RawAltitudeArea, RawArea, RawLevel, RawPolygon, RawSpace, RawWayType,
};
use crate::model::{
    AltitudeArea, AltitudeProfile, Area, BuildStats, Level, Space, WayType, WayTypeCatalog,
};
use crate::{AreaId, LevelId, SpaceId};

/// Anything smaller is treated as no usable geometry
const MIN_USABLE_AREA: f64 = 1e-6;

pub(crate) struct ProcessedMap {
    pub levels: HashMap<LevelId, Level>,
    pub spaces: HashMap<SpaceId, Space>,
    pub areas: HashMap<AreaId, Area>,
    pub waytypes: WayTypeCatalog,
    pub altitude_areas: HashMap<LevelId, Vec<AltitudeArea>>,
}

pub(crate) fn process_map(map: &MapData, stats: &mut BuildStats) -> ProcessedMap {
    let levels = process_levels(&map.levels, stats);
    let spaces = process_spaces(&map.spaces, &levels, stats);
    let areas = process_areas(&map.areas, &spaces, stats);
    let waytypes = process_waytypes(&map.way_types, stats);
    let altitude_areas = process_altitude_areas(&map.altitude_areas, &levels, stats);

    ProcessedMap {
        levels,
        spaces,
        areas,
        waytypes,
        altitude_areas,
    }
}

pub(crate) fn to_polygon(raw: &RawPolygon) -> Option<Polygon<f64>> {
    fn ring(points: &[[f64; 2]]) -> Option<LineString<f64>> {
        let finite = points.iter().flatten().all(|c| c.is_finite());
        (points.len() >= 3 && finite).then(|| LineString::from(points.to_vec()))
    }

    let exterior = ring(&raw.exterior)?;
    let holes = raw.holes.iter().filter_map(|hole| ring(hole)).collect();
    let polygon = Polygon::new(exterior, holes);
    (polygon.unsigned_area() > MIN_USABLE_AREA).then_some(polygon)
}

fn to_multipolygon(raws: &[RawPolygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(raws.iter().filter_map(to_polygon).collect())
}

fn process_levels(raw_levels: &[RawLevel], stats: &mut BuildStats) -> HashMap<LevelId, Level> {
    let mut levels: HashMap<LevelId, Level> = HashMap::with_capacity(raw_levels.len());
    for raw in raw_levels {
        if levels.contains_key(&raw.id) {
            warn!("Skipping level {}: duplicate id", raw.id);
            stats.skipped_levels += 1;
            continue;
        }
        if !raw.base_altitude.is_finite() {
            warn!("Skipping level {}: invalid base altitude", raw.id);
            stats.skipped_levels += 1;
            continue;
        }
        levels.insert(
            raw.id,
            Level {
                id: raw.id,
                short_label: if raw.short_label.is_empty() {
                    raw.id.to_string()
                } else {
                    raw.short_label.clone()
                },
                title: raw.title.clone(),
                base_altitude: raw.base_altitude,
                on_top_of: raw.on_top_of,
                buildings: to_multipolygon(&raw.buildings),
            },
        );
    }

    // Stacking references must point at known levels and must not loop
    let mut ids: Vec<LevelId> = levels.keys().copied().collect();
    ids.sort_unstable();
    for id in ids {
        let mut seen = HashSet::new();
        seen.insert(id);
        let mut current = levels[&id].on_top_of;
        let broken = loop {
            match current {
                None => break false,
                Some(below) if !levels.contains_key(&below) || !seen.insert(below) => break true,
                Some(below) => current = levels[&below].on_top_of,
            }
        };
        if broken {
            warn!("Level {id}: ignoring unknown or cyclic on_top_of reference");
            if let Some(level) = levels.get_mut(&id) {
                level.on_top_of = None;
            }
        }
    }
    levels
}

fn process_spaces(
    raw_spaces: &[RawSpace],
    levels: &HashMap<LevelId, Level>,
    stats: &mut BuildStats,
) -> HashMap<SpaceId, Space> {
    let processed: Vec<Result<Space, String>> = raw_spaces
        .par_iter()
        .map(|raw| accessible_space(raw, levels))
        .collect();

    let mut spaces = HashMap::with_capacity(processed.len());
    for result in processed {
        match result {
            Ok(space) if spaces.contains_key(&space.id) => {
                warn!("Skipping space {}: duplicate id", space.id);
                stats.skipped_spaces += 1;
            }
            Ok(space) => {
                spaces.insert(space.id, space);
            }
            Err(reason) => {
                warn!("{reason}");
                stats.skipped_spaces += 1;
            }
        }
    }
    spaces
}

/// Space geometry minus columns and holes, and minus building footprints for outdoor spaces
fn accessible_space(raw: &RawSpace, levels: &HashMap<LevelId, Level>) -> Result<Space, String> {
    let level = levels
        .get(&raw.level)
        .ok_or_else(|| format!("Skipping space {}: unknown level {}", raw.id, raw.level))?;
    let outline = to_polygon(&raw.geometry)
        .ok_or_else(|| format!("Skipping space {}: invalid geometry", raw.id))?;

    let mut accessible = MultiPolygon::new(vec![outline]);
    let cutouts = raw
        .columns
        .iter()
        .chain(&raw.holes)
        .filter_map(to_polygon)
        .chain(
            raw.outside
                .then(|| level.buildings.0.iter().cloned())
                .into_iter()
                .flatten(),
        );
    for cutout in cutouts {
        accessible = accessible.difference(&cutout);
    }

    if accessible.unsigned_area() <= MIN_USABLE_AREA {
        return Err(format!("Skipping space {}: no usable geometry", raw.id));
    }

    Ok(Space {
        id: raw.id,
        level: raw.level,
        title: raw.title.clone(),
        outside: raw.outside,
        access_restriction: raw.access_restriction,
        accessible,
    })
}

fn process_areas(
    raw_areas: &[RawArea],
    spaces: &HashMap<SpaceId, Space>,
    stats: &mut BuildStats,
) -> HashMap<AreaId, Area> {
    let mut areas = HashMap::with_capacity(raw_areas.len());
    for raw in raw_areas {
        if areas.contains_key(&raw.id) {
            warn!("Skipping area {}: duplicate id", raw.id);
            stats.skipped_areas += 1;
            continue;
        }
        if !spaces.contains_key(&raw.space) {
            warn!("Skipping area {}: unknown space {}", raw.id, raw.space);
            stats.skipped_areas += 1;
            continue;
        }
        let Some(polygon) = to_polygon(&raw.geometry) else {
            warn!("Skipping area {}: invalid geometry", raw.id);
            stats.skipped_areas += 1;
            continue;
        };
        areas.insert(
            raw.id,
            Area {
                id: raw.id,
                space: raw.space,
                title: raw.title.clone(),
                access_restriction: raw.access_restriction,
                geometry: MultiPolygon::new(vec![polygon]),
            },
        );
    }
    areas
}

fn is_valid_slug(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

fn process_waytypes(raw_types: &[RawWayType], stats: &mut BuildStats) -> WayTypeCatalog {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    let mut types = Vec::with_capacity(raw_types.len());

    for raw in raw_types {
        let speed_up = raw.speed_up.unwrap_or(raw.speed);
        let problem = if !is_valid_slug(&raw.name) {
            Some("name must be a non-empty lowercase slug")
        } else if ids.contains(&raw.id) {
            Some("duplicate id")
        } else if names.contains(raw.name.as_str()) {
            Some("duplicate name")
        } else if !(raw.speed.is_finite() && raw.speed > 0.0 && speed_up.is_finite() && speed_up > 0.0)
        {
            Some("speeds must be positive")
        } else if !raw.extra_seconds.is_finite() || raw.extra_seconds < 0.0 {
            Some("extra_seconds must be non-negative")
        } else {
            None
        };
        if let Some(problem) = problem {
            warn!("Skipping way type {} ({}): {problem}", raw.id, raw.name);
            stats.skipped_waytypes += 1;
            continue;
        }

        ids.insert(raw.id);
        names.insert(raw.name.as_str());
        let title = if raw.title.is_empty() {
            raw.name.replace(['_', '-'], " ")
        } else {
            raw.title.clone()
        };
        let title_plural = if raw.title_plural.is_empty() {
            format!("{title}s")
        } else {
            raw.title_plural.clone()
        };
        types.push(WayType {
            id: raw.id,
            name: raw.name.clone(),
            title,
            title_plural,
            icon_name: raw.icon_name.clone(),
            up_separate: raw.up_separate,
            avoid_by_default: raw.avoid_by_default,
            speed: raw.speed,
            speed_up,
            extra_seconds: raw.extra_seconds,
            description: raw.description.clone(),
            up_description: raw.up_description.clone(),
            down_description: raw.down_description.clone(),
        });
    }

    WayTypeCatalog::from_types(types)
}

fn process_altitude_areas(
    raw_areas: &[RawAltitudeArea],
    levels: &HashMap<LevelId, Level>,
    stats: &mut BuildStats,
) -> HashMap<LevelId, Vec<AltitudeArea>> {
    let mut by_level: HashMap<LevelId, Vec<AltitudeArea>> = HashMap::new();
    for raw in raw_areas {
        if !levels.contains_key(&raw.level) {
            warn!("Skipping altitude area {}: unknown level {}", raw.id, raw.level);
            stats.skipped_altitude_areas += 1;
            continue;
        }
        let Some(polygon) = to_polygon(&raw.geometry) else {
            warn!("Skipping altitude area {}: invalid geometry", raw.id);
            stats.skipped_altitude_areas += 1;
            continue;
        };
        let profile = match &raw.slope {
            Some(slope) => AltitudeProfile::Slope {
                from: Point::from(slope.from),
                from_altitude: slope.from_altitude,
                to: Point::from(slope.to),
                to_altitude: slope.to_altitude,
            },
            None => AltitudeProfile::Constant(raw.altitude),
        };
        let finite = match &raw.slope {
            Some(slope) => slope.from_altitude.is_finite() && slope.to_altitude.is_finite(),
            None => raw.altitude.is_finite(),
        };
        if !finite {
            warn!("Skipping altitude area {}: invalid altitude", raw.id);
            stats.skipped_altitude_areas += 1;
            continue;
        }
        by_level.entry(raw.level).or_default().push(AltitudeArea {
            id: raw.id,
            level: raw.level,
            geometry: MultiPolygon::new(vec![polygon]),
            profile,
        });
    }
    for areas in by_level.values_mut() {
        areas.sort_by_key(|area| area.id);
    }
    by_level
}
