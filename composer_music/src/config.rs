// Composer configuration.
//
// Service and output settings live in `ComposerConfig`, optionally loaded
// from a JSON file. Every field has a default, so a partial file (or no file
// at all) is fine. The API credential is deliberately absent: it is read
// from `OPENAI_API_KEY` by the backend, never from disk.
//
// Tempo, time signature and bar count are not configurable; see
// compose.rs.

use std::path::{Path, PathBuf};

use composer_llm::OpenAiConfig;
use composer_llm::openai::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Where MIDI files are written, relative to the working directory
    /// unless absolute.
    pub output_dir: PathBuf,
    /// Chat-completions URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional whole-request timeout. `None` waits for the service
    /// indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            endpoint: DEFAULT_ENDPOINT.into(),
            model: "gpt-4o-mini".into(),
            temperature: 1.0,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ComposerConfig {
    /// Load a config from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Connection settings for the HTTP backend.
    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            endpoint: self.endpoint.clone(),
            timeout_secs: self.request_timeout_secs,
        }
    }
}
