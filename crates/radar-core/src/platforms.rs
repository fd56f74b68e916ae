use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Platform ids the pipeline knows how to fetch.
pub const KNOWN_PLATFORMS: &[&str] = &["hackernews", "reddit", "v2ex", "twitter"];

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Subreddits searched by the reddit adapter; ignored by other platforms.
    #[serde(default)]
    pub subreddits: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformsFile {
    pub platforms: Vec<PlatformConfig>,
}

impl PlatformsFile {
    /// Ids of all enabled platforms, in file order.
    #[must_use]
    pub fn enabled_ids(&self) -> Vec<String> {
        self.platforms
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Look up one platform's config by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PlatformConfig> {
        self.platforms.iter().find(|p| p.id == id)
    }
}

/// Load and validate the platform registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_platforms(path: &Path) -> Result<PlatformsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PlatformsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let platforms_file: PlatformsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::PlatformsFileParse)?;

    validate_platforms(&platforms_file)?;

    Ok(platforms_file)
}

fn validate_platforms(platforms_file: &PlatformsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for platform in &platforms_file.platforms {
        if platform.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "platform id must be non-empty".to_string(),
            ));
        }

        if !KNOWN_PLATFORMS.contains(&platform.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown platform id '{}'; known: {}",
                platform.id,
                KNOWN_PLATFORMS.join(", ")
            )));
        }

        if !seen.insert(platform.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate platform id: '{}'",
                platform.id
            )));
        }
    }

    Ok(())
}
