//! Shared domain types and configuration for the vacspec workspace.

pub mod app_config;
pub mod config;
pub mod sources;
pub mod specs;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use sources::{load_sources, load_sources_or_builtin, SourcesFile};
pub use specs::{
    merge_preferring, ExtractionResult, ProductIdentity, SpecDetails, SpecField, SpecRequest,
    SpecValues,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
