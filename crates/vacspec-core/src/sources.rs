//! Domain allow-lists consumed by source discovery.
//!
//! Manufacturer domains are keyed by lower-cased brand name; secondary
//! domains are a flat list of UK retailer and press sites searched only when
//! the manufacturer tier yields nothing.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesFile {
    #[serde(default)]
    pub manufacturers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

impl SourcesFile {
    /// The allow-lists shipped with the application.
    #[must_use]
    pub fn builtin() -> Self {
        let manufacturers = [
            ("shark", &["sharkclean.co.uk", "sharkclean.com"][..]),
            ("roborock", &["roborock.com"][..]),
            ("eufy", &["eufylife.com"][..]),
            ("irobot", &["irobot.co.uk", "irobot.com"][..]),
            ("dreame", &["dreame.com", "dreame-technology.com"][..]),
            ("ecovacs", &["ecovacs.com"][..]),
            ("xiaomi", &["mi.com"][..]),
            ("samsung", &["samsung.com"][..]),
            ("dyson", &["dyson.co.uk", "dyson.com"][..]),
        ]
        .into_iter()
        .map(|(brand, domains)| {
            (
                brand.to_string(),
                domains.iter().map(|d| (*d).to_string()).collect(),
            )
        })
        .collect();

        let secondary = [
            "currys.co.uk",
            "argos.co.uk",
            "ao.com",
            "johnlewis.com",
            "very.co.uk",
        ]
        .iter()
        .map(|d| (*d).to_string())
        .collect();

        Self {
            manufacturers,
            secondary,
        }
    }

    /// Manufacturer domains for `brand`, matched case-insensitively after trimming.
    #[must_use]
    pub fn manufacturer_domains(&self, brand: &str) -> Option<&[String]> {
        let key = brand.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.manufacturers
            .get(&key)
            .map(Vec::as_slice)
            .filter(|domains| !domains.is_empty())
    }
}

/// Load and validate the allow-lists from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_sources(&content)
}

/// Like [`load_sources`], but returns [`SourcesFile::builtin`] when the file
/// does not exist. Any other failure is still an error.
///
/// # Errors
///
/// Returns `ConfigError` if an existing file cannot be read, parsed, or validated.
pub fn load_sources_or_builtin(path: &Path) -> Result<SourcesFile, ConfigError> {
    match load_sources(path) {
        Err(ConfigError::SourcesFileIo { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(SourcesFile::builtin())
        }
        other => other,
    }
}

fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let raw: SourcesFile = serde_yaml::from_str(content)?;

    // Brand keys are looked up lower-cased, so fold them here.
    let mut manufacturers = BTreeMap::new();
    for (brand, domains) in raw.manufacturers {
        let key = brand.trim().to_lowercase();
        if key.is_empty() {
            return Err(ConfigError::Validation(
                "manufacturer brand key must be non-empty".to_string(),
            ));
        }
        if manufacturers.insert(key.clone(), domains).is_some() {
            return Err(ConfigError::Validation(format!(
                "duplicate manufacturer brand: '{key}'"
            )));
        }
    }

    let sources = SourcesFile {
        manufacturers,
        secondary: raw.secondary,
    };
    validate_sources(&sources)?;
    Ok(sources)
}

fn validate_sources(sources: &SourcesFile) -> Result<(), ConfigError> {
    for (brand, domains) in &sources.manufacturers {
        if domains.is_empty() {
            return Err(ConfigError::Validation(format!(
                "manufacturer '{brand}' has no domains"
            )));
        }
        validate_domains(domains, &format!("manufacturer '{brand}'"))?;
    }
    validate_domains(&sources.secondary, "secondary")
}

fn validate_domains(domains: &[String], owner: &str) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for domain in domains {
        let trimmed = domain.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{owner} lists an empty domain"
            )));
        }
        if trimmed.contains("://") || trimmed.contains('/') || trimmed.contains(' ') {
            return Err(ConfigError::Validation(format!(
                "{owner} domain '{trimmed}' must be a bare host name"
            )));
        }
        if !seen.insert(trimmed.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "{owner} lists domain '{trimmed}' twice"
            )));
        }
    }
    Ok(())
}
