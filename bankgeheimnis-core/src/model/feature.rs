//! Raw map features and typed feature collections.

use geo::Geometry;
use hashbrown::HashMap;

use crate::crs::{Crs, ensure_matching};
use crate::model::taxonomy::FeatureClass;
use crate::Result;

/// One map feature: an element id, a geometry and its flat tag mapping.
#[derive(Debug, Clone)]
pub struct RawFeature {
    pub id: i64,
    pub geometry: Geometry<f64>,
    pub tags: HashMap<String, String>,
}

impl RawFeature {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// The `layer` tag parsed as a number. Missing or unparseable values
    /// mean layer 0, i.e. surface level.
    pub fn layer(&self) -> f64 {
        self.tag("layer")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    /// Surface rule shared by benches and streets: only strictly negative
    /// layers (underground) are excluded.
    pub fn surface_level(&self) -> bool {
        self.layer() >= 0.0
    }
}

/// A class-homogeneous feature collection tagged with its CRS.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub class: FeatureClass,
    pub crs: Crs,
    pub features: Vec<RawFeature>,
}

impl FeatureSet {
    pub fn new(class: FeatureClass, crs: Crs, features: Vec<RawFeature>) -> Self {
        Self {
            class,
            crs,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Guards the reprojection contract at a component boundary.
    pub fn ensure_crs(&self, expected: Crs) -> Result<()> {
        ensure_matching(self.crs, expected)
    }
}
