use geo::{Coord, LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry};
use serde_json::json;

use super::{Route, RouteItem};
use crate::Error;

impl Route {
    /// Converts the route to a `GeoJSON` `FeatureCollection`: one `LineString`
    /// per segment, followed by a point for every described item.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = Vec::new();

        for (idx, range) in self.segments().into_iter().enumerate() {
            // Run into the next segment's first item so the lines connect
            let end = (range.end + 1).min(self.items.len());
            let coords: Vec<Coord<f64>> = self.items[range.start..end]
                .iter()
                .map(|item| Coord {
                    x: item.coordinates.x,
                    y: item.coordinates.y,
                })
                .collect();
            if coords.len() < 2 {
                continue;
            }
            let first = &self.items[range.start];
            features.push(segment_feature(idx, first, &LineString::new(coords))?);
        }

        for (idx, item) in self.items.iter().enumerate() {
            if !item.descriptions.is_empty() {
                features.push(item_feature(idx, item)?);
            }
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn segment_feature(idx: usize, first: &RouteItem, line: &LineString<f64>) -> Result<Feature, Error> {
    let value = json!({
        "type": "Feature",
        "geometry": Geometry::new(line.into()),
        "properties": {
            "feature_type": "segment",
            "segment_index": idx,
            "level": first.coordinates.level,
            "space": first.in_space,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn item_feature(idx: usize, item: &RouteItem) -> Result<Feature, Error> {
    let point = Point::new(item.coordinates.x, item.coordinates.y);
    let value = json!({
        "type": "Feature",
        "geometry": Geometry::new((&point).into()),
        "properties": {
            "feature_type": "item",
            "item_index": idx,
            "level": item.coordinates.level,
            "altitude": item.coordinates.altitude,
            "waytype": item.waytype,
            "descriptions": item.descriptions,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
