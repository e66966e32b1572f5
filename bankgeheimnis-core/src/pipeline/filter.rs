//! Bench filter stage: drop underground benches and platform seating.

use geo::Intersects;

use crate::crs::Crs;
use crate::geometry::buffer_all;
use crate::model::FeatureSet;
use crate::Result;

/// Benches within this distance of a transit platform are treated as
/// waiting-area seating, not park benches. Metres.
const PLATFORM_BUFFER_M: f64 = 2.0;

/// Applies both filter predicates and returns the surviving candidates,
/// geometry and tags untouched.
pub fn filter_candidates(benches: &FeatureSet, platforms: &FeatureSet) -> Result<FeatureSet> {
    benches.ensure_crs(Crs::Utm32N)?;
    platforms.ensure_crs(Crs::Utm32N)?;

    let surface: Vec<_> = benches
        .features
        .iter()
        .filter(|bench| bench.surface_level())
        .cloned()
        .collect();
    log::info!(
        "Removed {} below-surface benches, {} remain",
        benches.len() - surface.len(),
        surface.len()
    );

    let exclusion = buffer_all(
        platforms.features.iter().map(|platform| &platform.geometry),
        PLATFORM_BUFFER_M,
    );
    let surviving: Vec<_> = surface
        .into_iter()
        .filter(|bench| !bench.geometry.intersects(&exclusion))
        .collect();
    log::info!("{} benches remain after platform exclusion", surviving.len());

    Ok(FeatureSet::new(benches.class, benches.crs, surviving))
}
