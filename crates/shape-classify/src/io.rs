//! JSON configuration and report helpers for classification sessions.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use shape_classify_extract::RegionExtractorParams;

use crate::session::Observation;

#[cfg(feature = "image")]
use crate::segment::SegmentParams;

#[derive(thiserror::Error, Debug)]
pub enum SessionIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_store_path() -> PathBuf {
    PathBuf::from("training_set.csv")
}

/// Configuration for a classification session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// CSV training store location.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default)]
    pub extractor: RegionExtractorParams,
    #[cfg(feature = "image")]
    #[serde(default)]
    pub segment: SegmentParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            extractor: RegionExtractorParams::default(),
            #[cfg(feature = "image")]
            segment: SegmentParams::default(),
        }
    }
}

impl SessionConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SessionIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SessionIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Per-frame entry of a session report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    pub path: String,
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub error: Option<String>,
}

/// JSON report of a processed frame sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub store_path: String,
    /// Training set size when the report was written.
    pub num_examples: usize,
    pub frames: Vec<FrameReport>,
}

impl SessionReport {
    pub fn new(store_path: &Path) -> Self {
        Self {
            store_path: store_path.to_string_lossy().into_owned(),
            num_examples: 0,
            frames: Vec::new(),
        }
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SessionIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SessionIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
