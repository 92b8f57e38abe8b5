//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading jurisdiction
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{
    BracketTableFile, ContributionRates, JurisdictionConfig, JurisdictionFile, JurisdictionKey,
    JurisdictionRegistry, TaxBracketTable,
};

/// Loads and provides access to jurisdiction configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates them, and exposes the resulting read-only
/// [`JurisdictionRegistry`].
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/
/// └── jurisdictions/
///     └── mx-2024/
///         ├── jurisdiction.yaml    # Metadata and deduction policy
///         ├── isr_monthly.yaml     # Monthly income tax brackets
///         └── contributions.yaml   # UMA, social-security and housing rates
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let mx = loader.registry().resolve("MX-2024").unwrap();
/// println!("Loaded {}", mx.metadata().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    registry: JurisdictionRegistry,
}

impl ConfigLoader {
    /// Loads every jurisdiction under `<path>/jurisdictions`.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The directory or any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML, a contribution rate is outside
    ///   `[0, 1)`, or two directories declare the same key (`ConfigParseError`)
    /// - A bracket table breaks its invariants (`BracketTableIntegrity`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let jurisdictions_dir = path.as_ref().join("jurisdictions");
        let dir_str = jurisdictions_dir.display().to_string();

        let entries = fs::read_dir(&jurisdictions_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            if entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut registry = JurisdictionRegistry::new();
        for dir in &dirs {
            let config = Self::load_jurisdiction(dir)?;
            let key = config.key().clone();
            if registry.insert(config).is_some() {
                return Err(EngineError::ConfigParseError {
                    path: dir.display().to_string(),
                    message: format!("jurisdiction {} is defined more than once", key),
                });
            }
        }

        if registry.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no jurisdictions found)", dir_str),
            });
        }

        Ok(Self { registry })
    }

    /// Loads and validates a single jurisdiction directory.
    pub fn load_jurisdiction<P: AsRef<Path>>(dir: P) -> EngineResult<JurisdictionConfig> {
        let dir = dir.as_ref();

        let jurisdiction = Self::load_yaml::<JurisdictionFile>(&dir.join("jurisdiction.yaml"))?;
        let key: JurisdictionKey = jurisdiction.jurisdiction.key.clone();

        let table_file = Self::load_yaml::<BracketTableFile>(&dir.join("isr_monthly.yaml"))?;
        let bracket_count = table_file.brackets.len();
        let income_tax = TaxBracketTable::new(&key, table_file.brackets)?;

        let contributions_path = dir.join("contributions.yaml");
        let contributions = Self::load_yaml::<ContributionRates>(&contributions_path)?;
        contributions
            .validate()
            .map_err(|message| EngineError::ConfigParseError {
                path: contributions_path.display().to_string(),
                message,
            })?;

        info!(
            jurisdiction = %key,
            brackets = bracket_count,
            source = table_file.source.as_deref().unwrap_or("unspecified"),
            "Loaded jurisdiction configuration"
        );

        Ok(JurisdictionConfig::new(
            jurisdiction.jurisdiction,
            income_tax,
            contributions,
            jurisdiction.deduction_policy,
        ))
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded registry.
    pub fn registry(&self) -> &JurisdictionRegistry {
        &self.registry
    }

    /// Consumes the loader, returning the registry.
    pub fn into_registry(self) -> JurisdictionRegistry {
        self.registry
    }
}
