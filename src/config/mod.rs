//! Configuration loading for memorial.

use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::images::DEFAULT_BASE_PATH;
use crate::search::{DEFAULT_THRESHOLD, FieldWeights, SearchConfig};
use crate::stats::FEATURED_IDS;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "MEMORIAL_CONFIG";

/// Top-level configuration loaded from config.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub featured: FeaturedConfig,
}

/// Where the testimonies come from.
#[derive(Debug, Default, Deserialize)]
pub struct CorpusConfig {
    /// JSON corpus file. The bundled testimonies are used when unset.
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub weights: FieldWeights,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            weights: FieldWeights::default(),
        }
    }
}

impl SearchSettings {
    #[must_use]
    pub fn to_search_config(&self) -> SearchConfig {
        SearchConfig {
            weights: self.weights,
            threshold: self.threshold,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Newline-separated list of image filenames replacing the built-in one.
    pub manifest: Option<String>,
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            manifest: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeaturedConfig {
    #[serde(default = "default_featured_ids")]
    pub ids: Vec<String>,
}

fn default_featured_ids() -> Vec<String> {
    FEATURED_IDS.iter().map(|id| (*id).to_string()).collect()
}

impl Default for FeaturedConfig {
    fn default() -> Self {
        Self {
            ids: default_featured_ids(),
        }
    }
}

impl Config {
    /// Load config from `$MEMORIAL_CONFIG`, else
    /// ~/.config/memorial/config.toml, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `$MEMORIAL_CONFIG` names a missing file, or if
    /// the config file cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Self::load_from(&path);
        }

        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::load_from(&path);
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Load config from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "memorial").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Expand ~ to the user's home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}
