//! The central bench entity in its two lifecycle states.

use geo::Point;

/// A bench that survived the filter stage, reduced to a metric point.
#[derive(Debug, Clone)]
pub struct Bench {
    pub id: i64,
    pub position: Point<f64>,
}

/// A fully annotated bench. Built in one pass by the proximity annotator
/// and immutable afterwards; the exporter reprojects `position` for
/// serialization.
#[derive(Debug, Clone)]
pub struct EnrichedBench {
    pub id: i64,
    /// Bench position in the metric CRS.
    pub position: Point<f64>,
    /// Distance to the nearest public toilet, metres.
    pub toilet_dist: f64,
    /// Nearest toilet in geographic coordinates (lon/lat).
    pub toilet_location: Point<f64>,
    /// Distance to the nearest listed shop, metres.
    pub shop_dist: f64,
    /// Nearest shop in geographic coordinates (lon/lat).
    pub shop_location: Point<f64>,
    pub shop_name: Option<String>,
    pub shop_opening_hours: Option<String>,
    /// Distance to the dissolved surface street network, metres.
    pub street_dist: f64,
    /// False when the bench falls inside the smoking-restriction zone.
    pub kiffen_erlaubt: bool,
}
