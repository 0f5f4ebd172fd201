use serde::Deserialize;
use std::path::Path;

use crate::fingerprint::constants::DEFAULT_MIN_MAGNITUDE;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_chunk_seconds")]
    pub chunk_seconds: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_min_magnitude")]
    pub min_magnitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            chunk_seconds: default_chunk_seconds(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_magnitude: default_min_magnitude(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            country: default_country(),
            device: default_device(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_sample_rate() -> u32 { 16000 }
fn default_chunk_seconds() -> u64 { 10 }
fn default_read_timeout_ms() -> u64 { 100 }
fn default_min_magnitude() -> f64 { DEFAULT_MIN_MAGNITUDE }
fn default_language() -> String { "en".into() }
fn default_country() -> String { "US".into() }
fn default_device() -> String { "desktop_mac".into() }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36"
        .into()
}
fn default_timeout_secs() -> u64 { 20 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Invalid config {}: {}", path.display(), e);
            None
        }
    }
}
