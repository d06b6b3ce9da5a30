//! Application configuration management.
//!
//! Holds the backend address, the optional newsletter endpoint, where tokens
//! are kept, how stale cache entries are treated and the last email used to
//! log in.
//!
//! Configuration is stored at `~/.config/uyd-web/config.json`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, DEFAULT_BASE_URL};
use crate::auth::{FileStore, KeyringStore, TokenStore};
use crate::cache::StalePolicy;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "uyd-web";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Overrides `base_url` when set
pub const BASE_URL_ENV: &str = "UYD_API_BASE_URL";

/// Where session tokens are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub newsletter_endpoint: Option<String>,
    #[serde(default)]
    pub token_store: TokenStoreKind,
    #[serde(default)]
    pub stale_policy: StalePolicy,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the file token store
    pub fn storage_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Backend address: environment, then config file, then the default
    pub fn api_base_url(&self) -> String {
        self.resolve_base_url(std::env::var(BASE_URL_ENV).ok())
    }

    fn resolve_base_url(&self, env: Option<String>) -> String {
        env.filter(|url| !url.trim().is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn open_token_store(&self) -> Result<Arc<dyn TokenStore>> {
        Ok(match self.token_store {
            TokenStoreKind::File => Arc::new(FileStore::new(self.storage_dir()?)),
            TokenStoreKind::Keyring => Arc::new(KeyringStore),
        })
    }

    /// API client for the configured backend and token store
    pub fn api_client(&self) -> Result<ApiClient> {
        let base_url = self.api_base_url();
        let client = ApiClient::new(&base_url, self.open_token_store()?)
            .with_context(|| format!("Failed to create API client for {}", base_url))?;
        Ok(client.with_newsletter_endpoint(self.newsletter_endpoint.clone()))
    }
}
