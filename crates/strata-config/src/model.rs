// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so misspelled keys are
//! rejected at startup rather than silently ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Strata configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrataConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub connectors: ConnectorsConfig,
}

/// Service identity and behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name used as the root tracing span.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Secret type attached to credentials created during registration.
    #[serde(default = "default_secret_type")]
    pub secret_type: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            secret_type: default_secret_type(),
        }
    }
}

fn default_service_name() -> String {
    "strata".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_secret_type() -> String {
    "CREDENTIALS".to_string()
}

/// SQLite persistence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("strata").join("strata.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("strata.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// External service connectors.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorsConfig {
    /// Plugin registry (endpoint resolution) and plugin runtime calls.
    #[serde(default)]
    pub plugin: PluginConnectorConfig,

    /// Plugin repository (published version listing).
    #[serde(default)]
    pub repository: ConnectorConfig,

    /// Credential store.
    #[serde(default)]
    pub secret: ConnectorConfig,
}

/// A connector pointing at a single versioned endpoint, e.g.
/// `endpoint = { v1 = "http://secret.local:50051" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub endpoint: BTreeMap<String, String>,

    /// Per-request timeout applied by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            endpoint: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConnectorConfig {
    #[serde(default)]
    pub endpoint: BTreeMap<String, String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pins every plugin resolution to this URI; the registry is not consulted.
    #[serde(default)]
    pub static_endpoint: Option<String>,
}

impl Default for PluginConnectorConfig {
    fn default() -> Self {
        Self {
            endpoint: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            static_endpoint: None,
        }
    }
}

impl PluginConnectorConfig {
    /// The registry connection settings without the plugin-only fields.
    pub fn connector(&self) -> ConnectorConfig {
        ConnectorConfig {
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
