//! Region resolution: union of place boundaries, extraction outline, mask.

use geo::{BooleanOps, BoundingRect, Coord, MultiPolygon, Rect, Simplify};

use crate::crs::Crs;
use crate::geometry::union_all;
use crate::loading::{PipelineConfig, nominatim};
use crate::model::RegionGeometry;
use crate::{Error, Result};

/// Margin added around the region before cutting the display mask, degrees.
const MASK_MARGIN_DEG: f64 = 2.0;
/// Simplification tolerance for the extraction outline, degrees.
const BOUNDARY_SIMPLIFY_DEG: f64 = 0.0001;

/// Resolves every configured place name and derives the run's region
/// geometry. Everything here stays in geographic coordinates.
pub fn resolve_region(
    client: &reqwest::blocking::Client,
    config: &PipelineConfig,
) -> Result<RegionGeometry> {
    log::info!("Resolving {} place boundaries", config.place_names.len());

    let mut parts = Vec::with_capacity(config.place_names.len());
    for place in &config.place_names {
        let boundary = nominatim::resolve_boundary(client, config, place)?;
        log::debug!("'{place}' resolved to {} polygon(s)", boundary.0.len());
        parts.push(boundary);
    }

    let region = union_all(parts);
    let bounds = region.bounding_rect().ok_or_else(|| Error::Resolution {
        place: config.place_names.join(", "),
        reason: "resolved region is empty".to_string(),
    })?;

    let expanded = Rect::new(
        Coord {
            x: bounds.min().x - MASK_MARGIN_DEG,
            y: bounds.min().y - MASK_MARGIN_DEG,
        },
        Coord {
            x: bounds.max().x + MASK_MARGIN_DEG,
            y: bounds.max().y + MASK_MARGIN_DEG,
        },
    )
    .to_polygon();
    let mask = MultiPolygon::new(vec![expanded]).difference(&region);

    let boundary = region.simplify(BOUNDARY_SIMPLIFY_DEG);
    log::info!(
        "Region union has {} polygon(s); outline simplified to {} ring point(s)",
        region.0.len(),
        boundary
            .0
            .iter()
            .map(|polygon| polygon.exterior().0.len())
            .sum::<usize>()
    );

    Ok(RegionGeometry {
        crs: Crs::Wgs84,
        region,
        boundary,
        mask,
    })
}
