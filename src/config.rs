//! Configuration file handling for finparse.
//!
//! The configuration file is stored at `<config dir>/finparse/config.json` unless `--config` or
//! `FINPARSE_CONFIG` points elsewhere. It holds the policy constants (two-digit-year pivot, fuzzy
//! thresholds, what to do with amounts that have no currency) and the reference tables (merchant
//! aliases, categories, FX rates). When the file does not exist the built-in defaults are used.

use crate::categorize::CategoryTable;
use crate::fx::{FxRateTable, NullCurrencyPolicy};
use crate::normalize::{AliasTable, FuzzyThresholds, DEFAULT_PIVOT};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "finparse";
const CONFIG_VERSION: u8 = 1;
pub(crate) const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app: the settings from the config file
/// (or the defaults) and the path they belong to.
#[derive(Debug, Clone, Default)]
pub struct Config {
    path: PathBuf,
    from_file: bool,
    config_file: ConfigFile,
}

impl Config {
    /// Writes a config file with the default settings to `path`, creating parent directories.
    ///
    /// # Errors
    /// - Returns an error if `path` exists and `force` is false.
    /// - Returns an error if any file operations fail.
    pub async fn create(path: impl Into<PathBuf>, force: bool) -> Result<Self> {
        let path = path.into();
        if path.exists() && !force {
            bail!(
                "A config file already exists at '{}', use --force to overwrite it",
                path.display()
            )
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::make_dir(parent)
                .await
                .context("Unable to create the config directory")?;
        }
        let config_file = ConfigFile::default();
        config_file.save(&path).await?;
        Ok(Self {
            path,
            from_file: true,
            config_file,
        })
    }

    /// Loads the config file at `path`, or the built-in defaults when there is no file there.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            debug!(
                "No config file at '{}', using built-in defaults",
                path.display()
            );
            return Ok(Self {
                path,
                from_file: false,
                config_file: ConfigFile::default(),
            });
        }
        let config_file = ConfigFile::load(&path).await?;
        debug!("Loaded config from '{}'", path.display());
        Ok(Self {
            path,
            from_file: true,
            config_file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// False when the built-in defaults are in use because no file was found.
    pub fn from_file(&self) -> bool {
        self.from_file
    }

    pub fn two_digit_year_pivot(&self) -> u32 {
        self.config_file.two_digit_year_pivot
    }

    pub fn null_currency(&self) -> NullCurrencyPolicy {
        self.config_file.null_currency
    }

    pub fn fuzzy(&self) -> FuzzyThresholds {
        self.config_file.fuzzy
    }

    pub fn merchants(&self) -> &AliasTable {
        &self.config_file.merchants
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.config_file.categories
    }

    pub fn fx_rates(&self) -> &FxRateTable {
        &self.config_file.fx_rates
    }

    #[cfg(test)]
    pub(crate) fn config_file_mut(&mut self) -> &mut ConfigFile {
        &mut self.config_file
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration (tables shortened):
/// ```json
/// {
///   "app_name": "finparse",
///   "config_version": 1,
///   "two_digit_year_pivot": 25,
///   "null_currency": "assume_usd",
///   "fuzzy": { "high": 85, "low": 70 },
///   "merchants": { "Uber": ["UBER *TRIP", "UBER TECHNOLOGIES"] },
///   "categories": {
///     "exact": { "Uber": "Transport" },
///     "keyword_rules": [{ "category": "Groceries", "keywords": ["MARKET", "GROCERY"] }]
///   },
///   "fx_rates": { "EUR": "1.08" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub(crate) struct ConfigFile {
    /// Application name, should always be "finparse"
    pub(crate) app_name: String,

    /// Configuration file version
    pub(crate) config_version: u8,

    /// Two-digit years at or below this are 20xx, above it 19xx
    #[serde(default = "default_pivot")]
    pub(crate) two_digit_year_pivot: u32,

    #[serde(default)]
    pub(crate) null_currency: NullCurrencyPolicy,

    #[serde(default)]
    pub(crate) fuzzy: FuzzyThresholds,

    #[serde(default = "AliasTable::builtin")]
    pub(crate) merchants: AliasTable,

    #[serde(default = "CategoryTable::builtin")]
    pub(crate) categories: CategoryTable,

    #[serde(default = "FxRateTable::builtin")]
    pub(crate) fx_rates: FxRateTable,
}

fn default_pivot() -> u32 {
    DEFAULT_PIVOT
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            two_digit_year_pivot: DEFAULT_PIVOT,
            null_currency: NullCurrencyPolicy::default(),
            fuzzy: FuzzyThresholds::default(),
            merchants: AliasTable::builtin(),
            categories: CategoryTable::builtin(),
            fx_rates: FxRateTable::builtin(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or holds invalid settings
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            self.app_name
        );
        anyhow::ensure!(
            self.two_digit_year_pivot <= 99,
            "Invalid two_digit_year_pivot {}: must be between 0 and 99",
            self.two_digit_year_pivot
        );
        let FuzzyThresholds { high, low } = self.fuzzy;
        anyhow::ensure!(
            low <= high && high <= 100,
            "Invalid fuzzy thresholds: expected low <= high <= 100, got low {low} and high {high}"
        );
        Ok(())
    }
}
