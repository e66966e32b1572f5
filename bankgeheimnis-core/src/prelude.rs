// Re-export of the commonly used surface.
pub use crate::crs::{Crs, Projection};
pub use crate::error::{Error, Result};
pub use crate::loading::PipelineConfig;
pub use crate::model::{Bench, EnrichedBench, FeatureClass, FeatureSet, RawFeature, RegionGeometry};
pub use crate::pipeline::{ExportPaths, PipelineSummary, run_pipeline};
pub use crate::query::{BenchView, filter_benches, load_bench_views};
