//! Place-name resolution against the Nominatim search API.

use geo::MultiPolygon;
use serde::Deserialize;

use crate::loading::{PipelineConfig, with_retry};
use crate::{Error, Result};

/// One search hit. Only the fields the resolver needs are decoded.
#[derive(Debug, Deserialize)]
struct SearchResult {
    display_name: String,
    geojson: Option<geojson::Geometry>,
}

/// Resolves one place name to its administrative boundary.
///
/// Nominatim may know several objects for a name; the first (best-ranked)
/// hit is used, a documented imprecision of the upstream lookup. Zero
/// hits or a non-areal geometry fail with [`Error::Resolution`].
pub fn resolve_boundary(
    client: &reqwest::blocking::Client,
    config: &PipelineConfig,
    place: &str,
) -> Result<MultiPolygon<f64>> {
    let results: Vec<SearchResult> = with_retry("boundary lookup", config.retry_attempts, || {
        Ok(client
            .get(&config.nominatim_url)
            .query(&[
                ("q", place),
                ("format", "jsonv2"),
                ("polygon_geojson", "1"),
                ("limit", "1"),
            ])
            .send()?
            .error_for_status()?
            .json()?)
    })?;

    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| resolution_error(place, "no results"))?;
    log::debug!("Resolved '{place}' as '{}'", first.display_name);

    let geometry = first
        .geojson
        .ok_or_else(|| resolution_error(place, "result carries no boundary geometry"))?;
    boundary_polygon(place, geometry)
}

fn boundary_polygon(place: &str, geometry: geojson::Geometry) -> Result<MultiPolygon<f64>> {
    let geometry = geo::Geometry::<f64>::try_from(geometry.value)
        .map_err(|err| resolution_error(place, &format!("unsupported geometry: {err}")))?;
    match geometry {
        geo::Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        geo::Geometry::MultiPolygon(multi) => Ok(multi),
        other => Err(resolution_error(
            place,
            &format!("boundary is not areal (got {other:?})"),
        )),
    }
}

fn resolution_error(place: &str, reason: &str) -> Error {
    Error::Resolution {
        place: place.to_string(),
        reason: reason.to_string(),
    }
}
