//! Shared configuration and error types for the demand radar.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod platforms;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use platforms::{load_platforms, PlatformConfig, PlatformsFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read platforms file at {path}")]
    PlatformsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse platforms file: {0}")]
    PlatformsFileParse(#[from] serde_yaml::Error),
    #[error("config validation failed: {0}")]
    Validation(String),
}
