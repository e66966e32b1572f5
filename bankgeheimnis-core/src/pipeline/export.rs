//! GeoJSON export of the derived layers.

use std::fs;
use std::path::{Path, PathBuf};

use geo::{MultiPolygon, Simplify};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::crs::Projection;
use crate::loading::PipelineConfig;
use crate::model::{EnrichedBench, RegionGeometry};
use crate::{Error, Result};

/// Simplification tolerance for the exported smoking zone, metres.
/// Applied in the metric CRS before reprojection to cap file size.
const ZONE_SIMPLIFY_M: f64 = 2.0;

/// Where one run's output landed.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub benches: PathBuf,
    pub smoking_zone: PathBuf,
    pub mask: PathBuf,
}

/// Writes the three region files. Geographic CRS throughout; rerunning
/// with unchanged inputs overwrites byte-equivalently.
pub fn export_region(
    config: &PipelineConfig,
    projection: &Projection,
    region: &RegionGeometry,
    benches: &[EnrichedBench],
    smoking_zone: &MultiPolygon<f64>,
) -> Result<ExportPaths> {
    fs::create_dir_all(&config.output_dir).map_err(|source| Error::Export {
        path: config.output_dir.clone(),
        source,
    })?;

    let paths = ExportPaths {
        benches: layer_path(config, "benches"),
        smoking_zone: layer_path(config, "nichtkiffen"),
        mask: layer_path(config, "mask"),
    };

    write_collection(&paths.benches, &bench_collection(projection, benches)?)?;

    let zone = projection.to_geographic(&smoking_zone.simplify(ZONE_SIMPLIFY_M));
    write_collection(&paths.smoking_zone, &polygon_collection(&zone))?;

    // The mask was derived in geographic coordinates and stays there.
    write_collection(&paths.mask, &polygon_collection(&region.mask))?;

    Ok(paths)
}

fn layer_path(config: &PipelineConfig, layer: &str) -> PathBuf {
    config
        .output_dir
        .join(format!("{}_{layer}.geojson", config.region_id))
}

fn bench_collection(
    projection: &Projection,
    benches: &[EnrichedBench],
) -> Result<FeatureCollection> {
    let features = benches
        .iter()
        .map(|bench| {
            let position = projection.to_geographic(&bench.position);
            let value = json!({
                "type": "Feature",
                "geometry": Geometry::new(GeoJsonValue::from(&position)),
                "properties": {
                    "toilet_dist": bench.toilet_dist,
                    "toilet_lon": bench.toilet_location.x(),
                    "toilet_lat": bench.toilet_location.y(),
                    "shop_dist": bench.shop_dist,
                    "shop_lon": bench.shop_location.x(),
                    "shop_lat": bench.shop_location.y(),
                    "shop_name": &bench.shop_name,
                    "shop_opening_hours": &bench.shop_opening_hours,
                    "street_dist": bench.street_dist,
                    "kiffen_erlaubt": bench.kiffen_erlaubt,
                }
            });
            Feature::from_json_value(value).map_err(|err| Error::InvalidData(err.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

fn polygon_collection(polygon: &MultiPolygon<f64>) -> FeatureCollection {
    let feature = Feature {
        id: None,
        properties: None,
        geometry: Some(Geometry::new(GeoJsonValue::from(polygon))),
        foreign_members: None,
        bbox: None,
    };
    FeatureCollection {
        features: vec![feature],
        bbox: None,
        foreign_members: None,
    }
}

fn write_collection(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let payload = serde_json::to_string(collection).map_err(|err| Error::Export {
        path: path.to_path_buf(),
        source: std::io::Error::other(err),
    })?;
    fs::write(path, payload).map_err(|source| Error::Export {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
