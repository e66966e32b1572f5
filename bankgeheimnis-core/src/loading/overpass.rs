//! Bulk feature retrieval from the Overpass API.
//!
//! One request fetches every element matching any taxonomy tag key inside
//! the region outline; classification into typed collections happens
//! later, locally. The response is decoded into transport DTOs first and
//! mapped into [`RawFeature`]s in one pass.

use geo::{Coord, Geometry, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use hashbrown::HashMap;
use itertools::Itertools;
use serde::Deserialize;

use crate::loading::{PipelineConfig, with_retry};
use crate::model::{RawFeature, taxonomy};
use crate::{Error, Result};

/// Server-side evaluation time limit for the bulk query, seconds.
const QUERY_TIMEOUT_SECS: u64 = 900;

/// Tag keys that make a closed way an area rather than a ring road.
const AREA_KEYS: &[&str] = &[
    "amenity",
    "leisure",
    "shop",
    "building",
    "landuse",
    "public_transport",
];

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<LatLon>,
    #[serde(default)]
    geometry: Vec<LatLon>,
    #[serde(default)]
    members: Vec<OverpassMember>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct LatLon {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OverpassMember {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<LatLon>,
}

impl From<LatLon> for Coord<f64> {
    fn from(value: LatLon) -> Self {
        Coord {
            x: value.lon,
            y: value.lat,
        }
    }
}

/// Downloads all candidate features inside the region outline. Geographic
/// CRS. Fails with [`Error::Extraction`] when the retrieval comes back
/// empty, which indicates a source or query failure rather than a sparse
/// region.
pub fn fetch_features(
    client: &reqwest::blocking::Client,
    config: &PipelineConfig,
    boundary: &MultiPolygon<f64>,
) -> Result<Vec<RawFeature>> {
    let query = build_query(boundary);
    log::debug!("Overpass query is {} bytes", query.len());

    let response: OverpassResponse = with_retry("feature download", config.retry_attempts, || {
        Ok(client
            .post(&config.overpass_url)
            .form(&[("data", query.as_str())])
            .send()?
            .error_for_status()?
            .json()?)
    })?;

    let element_count = response.elements.len();
    let features: Vec<RawFeature> = response
        .elements
        .into_iter()
        .filter_map(assemble_feature)
        .collect();
    if features.is_empty() {
        return Err(Error::Extraction(
            "Overpass returned no usable features for the region".to_string(),
        ));
    }
    log::info!("Downloaded {} features ({element_count} raw elements)", features.len());
    Ok(features)
}

/// One `nwr` clause per (tag key, outline ring) pair, unioned.
fn build_query(boundary: &MultiPolygon<f64>) -> String {
    let mut clauses = String::new();
    for polygon in boundary {
        let ring = polygon
            .exterior()
            .coords()
            .map(|c| format!("{} {}", c.y, c.x))
            .join(" ");
        for key in taxonomy::QUERY_KEYS {
            clauses.push_str(&format!("nwr[\"{key}\"](poly:\"{ring}\");\n"));
        }
    }
    format!("[out:json][timeout:{QUERY_TIMEOUT_SECS}];(\n{clauses});\nout geom;")
}

fn assemble_feature(element: OverpassElement) -> Option<RawFeature> {
    let geometry = match element.kind.as_str() {
        "node" => Some(Geometry::Point(Point::new(element.lon?, element.lat?))),
        "way" => way_geometry(&element),
        "relation" => relation_geometry(&element),
        other => {
            log::debug!("Skipping element {} of unknown kind '{other}'", element.id);
            None
        }
    }?;
    Some(RawFeature {
        id: element.id,
        geometry,
        tags: element.tags,
    })
}

fn way_geometry(element: &OverpassElement) -> Option<Geometry<f64>> {
    let coords: Vec<Coord<f64>> = element.geometry.iter().copied().map(Coord::from).collect();
    match coords.len() {
        0 => element
            .center
            .map(|c| Geometry::Point(Point::new(c.lon, c.lat))),
        1 => Some(Geometry::Point(Point::from(coords[0]))),
        _ if is_closed(&coords) && is_area(&element.tags) => Some(Geometry::Polygon(
            Polygon::new(LineString::from(coords), vec![]),
        )),
        _ => Some(Geometry::LineString(LineString::from(coords))),
    }
}

fn relation_geometry(element: &OverpassElement) -> Option<Geometry<f64>> {
    let mut rings = Vec::new();
    let mut lines = Vec::new();
    for member in &element.members {
        if member.kind != "way" || member.geometry.is_empty() {
            continue;
        }
        let coords: Vec<Coord<f64>> = member.geometry.iter().copied().map(Coord::from).collect();
        let outer = member.role == "outer" || member.role.is_empty();
        if outer && coords.len() >= 4 && is_closed(&coords) {
            rings.push(Polygon::new(LineString::from(coords), vec![]));
        } else if coords.len() >= 2 {
            lines.push(LineString::from(coords));
        }
    }
    if !rings.is_empty() {
        Some(Geometry::MultiPolygon(MultiPolygon::new(rings)))
    } else if !lines.is_empty() {
        Some(Geometry::MultiLineString(MultiLineString::new(lines)))
    } else {
        element
            .center
            .map(|c| Geometry::Point(Point::new(c.lon, c.lat)))
    }
}

fn is_closed(coords: &[Coord<f64>]) -> bool {
    coords.first() == coords.last()
}

/// OSM convention: a closed way is an area when an area-ish tag says so
/// and it is not an ordinary road loop.
fn is_area(tags: &HashMap<String, String>) -> bool {
    if tags.get("area").map(String::as_str) == Some("no") {
        return false;
    }
    if tags.contains_key("highway") {
        return tags.get("area").map(String::as_str) == Some("yes");
    }
    tags.get("area").map(String::as_str) == Some("yes")
        || AREA_KEYS.iter().any(|key| tags.contains_key(*key))
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    #[test]
    fn query_covers_every_taxonomy_key_per_ring() {
        let boundary = MultiPolygon::new(vec![polygon![
            (x: 6.0, y: 51.0),
            (x: 7.0, y: 51.0),
            (x: 7.0, y: 52.0),
        ]]);
        let query = build_query(&boundary);
        for key in taxonomy::QUERY_KEYS {
            assert!(query.contains(&format!("nwr[\"{key}\"]")), "missing {key}");
        }
        assert!(query.starts_with("[out:json]"));
        assert!(query.ends_with("out geom;"));
        assert!(query.contains("poly:\"51 6"));
    }

    #[test]
    fn nodes_decode_to_point_features() {
        let payload = r#"{"elements": [
            {"type": "node", "id": 42, "lat": 51.5, "lon": 7.1,
             "tags": {"amenity": "bench", "layer": "-1"}}
        ]}"#;
        let response: OverpassResponse = serde_json::from_str(payload).unwrap();
        let features: Vec<RawFeature> = response
            .elements
            .into_iter()
            .filter_map(assemble_feature)
            .collect();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, 42);
        assert_eq!(features[0].tag("layer"), Some("-1"));
        assert!(matches!(features[0].geometry, Geometry::Point(_)));
    }

    #[test]
    fn closed_tagged_ways_become_polygons() {
        let payload = r#"{"elements": [
            {"type": "way", "id": 7, "tags": {"leisure": "playground"},
             "geometry": [
                {"lat": 51.0, "lon": 7.0}, {"lat": 51.0, "lon": 7.001},
                {"lat": 51.001, "lon": 7.001}, {"lat": 51.0, "lon": 7.0}
             ]},
            {"type": "way", "id": 8, "tags": {"highway": "primary"},
             "geometry": [
                {"lat": 51.0, "lon": 7.0}, {"lat": 51.0, "lon": 7.002}
             ]}
        ]}"#;
        let response: OverpassResponse = serde_json::from_str(payload).unwrap();
        let features: Vec<RawFeature> = response
            .elements
            .into_iter()
            .filter_map(assemble_feature)
            .collect();
        assert!(matches!(features[0].geometry, Geometry::Polygon(_)));
        assert!(matches!(features[1].geometry, Geometry::LineString(_)));
    }

    #[test]
    fn relations_prefer_closed_outer_rings() {
        let payload = r#"{"elements": [
            {"type": "relation", "id": 9, "tags": {"amenity": "school"},
             "members": [
                {"type": "way", "role": "outer", "geometry": [
                    {"lat": 51.0, "lon": 7.0}, {"lat": 51.0, "lon": 7.01},
                    {"lat": 51.01, "lon": 7.01}, {"lat": 51.0, "lon": 7.0}
                ]},
                {"type": "node", "role": "admin_centre", "geometry": []}
             ]}
        ]}"#;
        let response: OverpassResponse = serde_json::from_str(payload).unwrap();
        let features: Vec<RawFeature> = response
            .elements
            .into_iter()
            .filter_map(assemble_feature)
            .collect();
        assert!(matches!(features[0].geometry, Geometry::MultiPolygon(_)));
    }

    #[test]
    fn geometryless_elements_fall_back_to_center_or_drop() {
        let payload = r#"{"elements": [
            {"type": "way", "id": 10, "tags": {"shop": "kiosk"},
             "center": {"lat": 51.2, "lon": 7.2}},
            {"type": "relation", "id": 11, "tags": {"amenity": "school"}, "members": []}
        ]}"#;
        let response: OverpassResponse = serde_json::from_str(payload).unwrap();
        let features: Vec<RawFeature> = response
            .elements
            .into_iter()
            .filter_map(assemble_feature)
            .collect();
        assert_eq!(features.len(), 1);
        assert!(matches!(features[0].geometry, Geometry::Point(_)));
    }
}
