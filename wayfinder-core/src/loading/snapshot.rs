//! Versioned on-disk form of a map snapshot.
//!
//! Schema (JSON):
//!
//! ```text
//! { "schema_version": 1, "map": <MapData> }
//! ```
//!
//! Only the map data is stored; the router graph is rebuilt on load, so
//! files stay loadable when the in-memory graph layout changes.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::{BuildConfig, MapData, build_router_graph};
use crate::{BuildError, Error, RouterGraph};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub schema_version: u32,
    pub map: MapData,
}

impl SnapshotFile {
    pub fn new(map: MapData) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            map,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let snapshot: SnapshotFile = serde_json::from_str(json)?;
        snapshot.check_schema()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn read(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to open snapshot '{}': {}", path.display(), e),
            )
        })?;
        let snapshot: SnapshotFile = serde_json::from_reader(BufReader::new(file))?;
        snapshot.check_schema()?;
        info!(
            "Loaded map snapshot v{} from {}",
            snapshot.map.version,
            path.display()
        );
        Ok(snapshot)
    }

    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn build(&self, config: &BuildConfig) -> Result<RouterGraph, Error> {
        Ok(build_router_graph(&self.map, config)?)
    }

    fn check_schema(&self) -> Result<(), BuildError> {
        if self.schema_version == SNAPSHOT_SCHEMA_VERSION {
            Ok(())
        } else {
            Err(BuildError::UnsupportedSnapshot {
                found: self.schema_version,
                expected: SNAPSHOT_SCHEMA_VERSION,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::raw_types::{RawLevel, RawNode, RawPolygon, RawSpace};

    fn tiny_map() -> MapData {
        MapData {
            version: 4,
            levels: vec![RawLevel {
                id: 0,
                short_label: "0".into(),
                ..RawLevel::default()
            }],
            spaces: vec![RawSpace {
                id: 1,
                level: 0,
                geometry: RawPolygon::rect([0.0, 0.0], [4.0, 4.0]),
                ..RawSpace::default()
            }],
            nodes: vec![RawNode {
                id: 1,
                level: 0,
                point: [1.0, 1.0],
                ..RawNode::default()
            }],
            ..MapData::default()
        }
    }

    #[test]
    fn snapshot_reloads_and_rebuilds() {
        let json = SnapshotFile::new(tiny_map()).to_json().unwrap();
        let snapshot = SnapshotFile::from_json(&json).unwrap();
        assert_eq!(snapshot.map, tiny_map());

        let graph = snapshot.build(&BuildConfig::default()).unwrap();
        assert_eq!(graph.version(), 4);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn unknown_schema_is_rejected() {
        let mut snapshot = SnapshotFile::new(tiny_map());
        snapshot.schema_version = 99;
        let json = snapshot.to_json().unwrap();
        assert!(matches!(
            SnapshotFile::from_json(&json),
            Err(Error::Build(BuildError::UnsupportedSnapshot { found: 99, expected: 1 }))
        ));
    }
}
