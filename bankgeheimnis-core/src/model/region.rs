//! Resolved region geometry shared by extraction and export.

use geo::MultiPolygon;

use crate::crs::Crs;

/// The administrative outline of the run's region of interest.
///
/// Produced once by the region resolver, always in geographic
/// coordinates.
#[derive(Debug, Clone)]
pub struct RegionGeometry {
    pub crs: Crs,
    /// Union of all resolved place boundaries.
    pub region: MultiPolygon<f64>,
    /// Simplified outline used to restrict the bulk feature download.
    pub boundary: MultiPolygon<f64>,
    /// Expanded bounding rectangle minus the region; display occlusion aid.
    pub mask: MultiPolygon<f64>,
}
