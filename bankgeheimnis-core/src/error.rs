use std::path::PathBuf;

use thiserror::Error;

use crate::crs::Crs;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to resolve place '{place}': {reason}")]
    Resolution { place: String, reason: String },
    #[error("Feature extraction failed: {0}")]
    Extraction(String),
    #[error("No {0} available for proximity lookup")]
    NoTargets(&'static str),
    #[error("CRS mismatch: {left:?} vs {right:?}")]
    CrsMismatch { left: Crs, right: Crs },
    #[error("Failed to write {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
