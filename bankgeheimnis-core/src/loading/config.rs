//! Per-run pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Everything one pipeline run needs to know. Constructed once per run
/// and passed down explicitly; there is no process-wide state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Identifier used to key the output file names.
    pub region_id: String,
    /// Place names resolved to administrative boundaries, in order.
    pub place_names: Vec<String>,
    /// Directory the GeoJSON files are written to.
    pub output_dir: PathBuf,
    /// Nominatim search endpoint.
    pub nominatim_url: String,
    /// Overpass interpreter endpoint.
    pub overpass_url: String,
    /// Timeout applied to every external request, seconds.
    pub request_timeout_secs: u64,
    /// Attempts per external request before the run aborts.
    pub retry_attempts: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            region_id: "rhein-ruhr".to_string(),
            place_names: [
                "Ruhrgebiet, Germany",
                "Düsseldorf, Germany",
                "Leverkusen, Germany",
                "Langenfeld (Rheinland), Germany",
                "Dormagen, Germany",
                "Monheim am Rhein, Germany",
                "Wuppertal, Germany",
                "Velbert, Germany",
                "Ratingen, Germany",
                "Mettmann, Germany",
                "Erkrath, Germany",
                "Solingen, Germany",
                "Köln, Germany",
            ]
            .map(String::from)
            .to_vec(),
            output_dir: PathBuf::from("geojson"),
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            request_timeout_secs: 180,
            retry_attempts: 3,
        }
    }
}

impl PipelineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.place_names.is_empty() {
            return Err(Error::InvalidData(
                "No place names configured for the region".to_string(),
            ));
        }
        if self.region_id.is_empty() {
            return Err(Error::InvalidData(
                "Region id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_region_is_complete() {
        let config = PipelineConfig::default();
        assert_eq!(config.region_id, "rhein-ruhr");
        assert_eq!(config.place_names.len(), 13);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_place_list_is_rejected() {
        let config = PipelineConfig {
            place_names: vec![],
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
