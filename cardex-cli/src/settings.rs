//! Settings file and environment overrides.
//!
//! Settings live in `~/.config/cardex/config.toml`. Every key is optional;
//! missing keys take their defaults. A few values can be overridden with
//! `CARDEX_*` environment variables, and the database path once more with
//! `--db`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cardex_cache::{CacheOptions, LocalObjectStore, ObjectStore};
use cardex_catalog::DEFAULT_STALE_AFTER_DAYS;
use cardex_import::{DEFAULT_MOXFIELD_URL, ResolveOptions};
use cardex_scryfall::ClientOptions;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::CliError;

pub(crate) const ENV_DB_PATH: &str = "CARDEX_DB_PATH";
pub(crate) const ENV_IMAGE_DIR: &str = "CARDEX_IMAGE_DIR";
pub(crate) const ENV_IMAGE_BASE_URL: &str = "CARDEX_IMAGE_BASE_URL";
pub(crate) const ENV_STALE_AFTER_DAYS: &str = "CARDEX_STALE_AFTER_DAYS";

/// Canonical path to the settings file: `~/.config/cardex/config.toml`.
pub(crate) fn config_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("cardex").join("config.toml")
}

fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("cardex").join("cards.db")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub database_path: PathBuf,
    /// Card records older than this are refreshed on read.
    pub stale_after_days: i64,
    pub user_agent: String,
    pub scryfall: ScryfallSettings,
    pub moxfield: MoxfieldSettings,
    pub images: ImageSettings,
    pub suggestions: SuggestionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ScryfallSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MoxfieldSettings {
    pub base_url: String,
}

/// Object storage for mirrored card images. Storage is only enabled when
/// both the directory and its public URL are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ImageSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
    pub fetch_timeout_secs: u64,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SuggestionSettings {
    pub max_lookups: usize,
    pub per_name: usize,
    pub delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
            user_agent: concat!("cardex/", env!("CARGO_PKG_VERSION")).to_string(),
            scryfall: ScryfallSettings::default(),
            moxfield: MoxfieldSettings::default(),
            images: ImageSettings::default(),
            suggestions: SuggestionSettings::default(),
        }
    }
}

impl Default for ScryfallSettings {
    fn default() -> Self {
        let client = ClientOptions::default();
        Self {
            base_url: client.base_url,
            timeout_secs: client.timeout.as_secs(),
            min_request_interval_ms: client.min_request_interval.as_millis() as u64,
        }
    }
}

impl Default for MoxfieldSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MOXFIELD_URL.to_string(),
        }
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            storage_dir: None,
            public_base_url: None,
            fetch_timeout_secs: cardex_cache::IMAGE_FETCH_TIMEOUT.as_secs(),
            concurrency: cardex_cache::IMAGE_CONCURRENCY,
        }
    }
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        let resolve = ResolveOptions::default();
        Self {
            max_lookups: resolve.max_suggestion_lookups,
            per_name: resolve.suggestions_per_name,
            delay_ms: resolve.suggestion_delay.as_millis() as u64,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub(crate) fn load(path: &Path) -> Result<Self, CliError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config file at {}; using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let settings: Self = toml::from_str(&contents)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `CARDEX_*` overrides, returning the variables that were set.
    pub(crate) fn apply_env(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Vec<&'static str>, CliError> {
        let mut applied = Vec::new();
        if let Some(v) = var(ENV_DB_PATH) {
            self.database_path = PathBuf::from(v);
            applied.push(ENV_DB_PATH);
        }
        if let Some(v) = var(ENV_IMAGE_DIR) {
            self.images.storage_dir = Some(PathBuf::from(v));
            applied.push(ENV_IMAGE_DIR);
        }
        if let Some(v) = var(ENV_IMAGE_BASE_URL) {
            self.images.public_base_url = Some(v);
            applied.push(ENV_IMAGE_BASE_URL);
        }
        if let Some(v) = var(ENV_STALE_AFTER_DAYS) {
            self.stale_after_days = v.trim().parse().map_err(|_| {
                CliError::config(format!("{ENV_STALE_AFTER_DAYS} must be a whole number of days, got '{v}'"))
            })?;
            applied.push(ENV_STALE_AFTER_DAYS);
        }
        self.validate()?;
        Ok(applied)
    }

    fn validate(&self) -> Result<(), CliError> {
        if self.stale_after_days < 1 {
            return Err(CliError::config("stale_after_days must be at least 1"));
        }
        if self.scryfall.base_url.is_empty() || self.moxfield.base_url.is_empty() {
            return Err(CliError::config("API base URLs must not be empty"));
        }
        Ok(())
    }

    pub(crate) fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.scryfall.base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.scryfall.timeout_secs),
            min_request_interval: Duration::from_millis(self.scryfall.min_request_interval_ms),
        }
    }

    pub(crate) fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            stale_after: chrono::Duration::days(self.stale_after_days),
        }
    }

    pub(crate) fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            max_suggestion_lookups: self.suggestions.max_lookups,
            suggestions_per_name: self.suggestions.per_name,
            suggestion_delay: Duration::from_millis(self.suggestions.delay_ms),
        }
    }

    /// The configured image store, or `None` when storage is not set up.
    pub(crate) fn object_store(&self) -> Option<Arc<dyn ObjectStore>> {
        match (&self.images.storage_dir, &self.images.public_base_url) {
            (Some(dir), Some(url)) => Some(Arc::new(LocalObjectStore::new(dir, url.as_str()))),
            (Some(_), None) | (None, Some(_)) => {
                log::warn!(
                    "Image storage needs both storage_dir and public_base_url; mirroring disabled"
                );
                None
            }
            (None, None) => None,
        }
    }

    pub(crate) fn to_toml(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self).map_err(|e| CliError::config(e.to_string()))
    }
}
