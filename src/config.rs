use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How `merge_two_segments` resolves differing speakers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerMergePolicy {
    /// The earlier segment's speaker is kept
    #[default]
    FirstWins,
    /// Merging segments with different speakers fails
    Reject,
}

/// Tunables for the edit engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Joins word alignments into a segment transcript, and splits free text back
    pub split_delimiter: String,
    /// Inserted between two words merged into one token
    pub word_join: String,
    /// Decimal places kept when reading wire times
    pub time_precision: u32,
    pub speaker_merge: SpeakerMergePolicy,
}

impl EditConfig {
    pub const DEFAULT_SPLIT_DELIMITER: &'static str = " ";
    pub const DEFAULT_TIME_PRECISION: u32 = 2;

    /// Load a config from a JSON file; absent fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Round a wire time to `time_precision` decimal places
    pub fn round_time(&self, seconds: f64) -> f64 {
        let scale = 10f64.powi(self.time_precision as i32);
        (seconds * scale).round() / scale
    }
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            split_delimiter: Self::DEFAULT_SPLIT_DELIMITER.to_string(),
            word_join: String::new(),
            time_precision: Self::DEFAULT_TIME_PRECISION,
            speaker_merge: SpeakerMergePolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error in config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
