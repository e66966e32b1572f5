//! Bulk feature download, reprojection and partition into typed classes.

use crate::crs::{Crs, Projection};
use crate::loading::{PipelineConfig, overpass};
use crate::model::{FeatureClass, FeatureSet, RawFeature, RegionGeometry};
use crate::Result;

/// The six typed collections the rest of the pipeline works on, all in
/// the metric CRS.
#[derive(Debug, Clone)]
pub struct ExtractedFeatures {
    pub benches: FeatureSet,
    pub toilets: FeatureSet,
    pub shops: FeatureSet,
    pub smoking_sources: FeatureSet,
    pub streets: FeatureSet,
    pub platforms: FeatureSet,
}

/// Downloads all features inside the region outline, reprojects them to
/// the metric CRS and partitions them by class.
pub fn extract_features(
    client: &reqwest::blocking::Client,
    config: &PipelineConfig,
    projection: &Projection,
    region: &RegionGeometry,
) -> Result<ExtractedFeatures> {
    let raw = overpass::fetch_features(client, config, &region.boundary)?;

    log::info!("Reprojecting {} features to EPSG:{}", raw.len(), Crs::Utm32N.epsg());
    let projected: Vec<RawFeature> = raw
        .into_iter()
        .map(|feature| RawFeature {
            geometry: projection.to_metric(&feature.geometry),
            ..feature
        })
        .collect();

    Ok(partition(projected, Crs::Utm32N))
}

/// Splits features into the six classes. Predicates are evaluated
/// independently, so one feature can land in several collections.
pub fn partition(features: Vec<RawFeature>, crs: Crs) -> ExtractedFeatures {
    let collect = |class: FeatureClass| {
        let matching: Vec<RawFeature> = features
            .iter()
            .filter(|feature| class.matches(feature))
            .cloned()
            .collect();
        log::info!("Partitioned {} {}", matching.len(), class.label());
        FeatureSet::new(class, crs, matching)
    };

    ExtractedFeatures {
        benches: collect(FeatureClass::Bench),
        toilets: collect(FeatureClass::Toilet),
        shops: collect(FeatureClass::Shop),
        smoking_sources: collect(FeatureClass::SmokingRestricted),
        streets: collect(FeatureClass::Street),
        platforms: collect(FeatureClass::Platform),
    }
}
