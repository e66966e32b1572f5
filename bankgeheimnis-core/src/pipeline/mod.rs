//! The sequential enrichment pipeline.
//!
//! Stages run strictly in order (resolve, extract, filter, annotate,
//! export) and any stage error aborts the run. Every run builds its own
//! context (config, HTTP client, projection); nothing is shared between
//! runs.

pub mod annotate;
pub mod export;
pub mod extract;
pub mod filter;
pub mod region;

pub use export::ExportPaths;
pub use extract::ExtractedFeatures;

use crate::crs::Projection;
use crate::loading::{self, PipelineConfig};
use crate::Result;

/// Counts and paths of one completed run.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub region_id: String,
    pub bench_count: usize,
    pub paths: ExportPaths,
}

/// Runs the whole pipeline for one region.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineSummary> {
    config.validate()?;
    let client = loading::http_client(config.request_timeout())?;
    let projection = Projection::utm_zone(32);

    let region = region::resolve_region(&client, config)?;
    let features = extract::extract_features(&client, config, &projection, &region)?;
    let candidates = filter::filter_candidates(&features.benches, &features.platforms)?;
    let zone = annotate::smoking_zone(&features.smoking_sources)?;
    let benches = annotate::annotate_benches(
        &candidates,
        &features.toilets,
        &features.shops,
        &features.streets,
        &zone,
        &projection,
    )?;
    let paths = export::export_region(config, &projection, &region, &benches, &zone)?;

    log::info!(
        "Pipeline finished: {} enriched benches for region '{}'",
        benches.len(),
        config.region_id
    );
    Ok(PipelineSummary {
        region_id: config.region_id.clone(),
        bench_count: benches.len(),
        paths,
    })
}
