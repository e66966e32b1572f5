//! Query adapter for the view layer.
//!
//! The map front end loads the exported bench file, turns its features
//! into [`BenchView`] records and filters them with [`filter_benches`].
//! Pure functions only; the caller owns all state.

use std::ops::RangeInclusive;

use geojson::FeatureCollection;

/// One bench as the view layer sees it. Distances are optional because
/// arbitrary GeoJSON input may lack them; a bench with a missing distance
/// never passes a filter on that distance.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchView {
    pub longitude: f64,
    pub latitude: f64,
    pub toilet_dist: Option<f64>,
    pub shop_dist: Option<f64>,
    pub street_dist: Option<f64>,
    pub shop_name: Option<String>,
    pub shop_opening_hours: Option<String>,
    pub kiffen_erlaubt: bool,
}

impl BenchView {
    /// Extracts a view record from one exported feature. Features without
    /// a point geometry are not benches and yield `None`.
    pub fn from_feature(feature: &geojson::Feature) -> Option<Self> {
        let position = match &feature.geometry {
            Some(geometry) => match &geometry.value {
                geojson::Value::Point(coords) if coords.len() >= 2 => (coords[0], coords[1]),
                _ => return None,
            },
            None => return None,
        };
        let property = |key: &str| feature.properties.as_ref()?.get(key).cloned();
        let number = |key: &str| property(key)?.as_f64();
        let text = |key: &str| property(key)?.as_str().map(str::to_string);

        Some(Self {
            longitude: position.0,
            latitude: position.1,
            toilet_dist: number("toilet_dist"),
            shop_dist: number("shop_dist"),
            street_dist: number("street_dist"),
            shop_name: text("shop_name"),
            shop_opening_hours: text("shop_opening_hours"),
            kiffen_erlaubt: property("kiffen_erlaubt")
                .and_then(|value| value.as_bool())
                .unwrap_or(false),
        })
    }
}

/// Loads every bench record from an exported feature collection.
pub fn load_bench_views(collection: &FeatureCollection) -> Vec<BenchView> {
    collection
        .features
        .iter()
        .filter_map(BenchView::from_feature)
        .collect()
}

/// Applies the view layer's filter predicate: every distance within its
/// inclusive range, and, when `smoking_only` is set, only benches where
/// smoking is allowed.
pub fn filter_benches<'a>(
    benches: &'a [BenchView],
    toilet_range: RangeInclusive<f64>,
    shop_range: RangeInclusive<f64>,
    street_range: RangeInclusive<f64>,
    smoking_only: bool,
) -> Vec<&'a BenchView> {
    benches
        .iter()
        .filter(|bench| {
            in_range(bench.toilet_dist, &toilet_range)
                && in_range(bench.shop_dist, &shop_range)
                && in_range(bench.street_dist, &street_range)
                && (bench.kiffen_erlaubt || !smoking_only)
        })
        .collect()
}

fn in_range(value: Option<f64>, range: &RangeInclusive<f64>) -> bool {
    value.is_some_and(|v| range.contains(&v))
}
