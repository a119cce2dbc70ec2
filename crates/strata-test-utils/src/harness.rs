// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring mock collaborators together.
//!
//! `TestHarness` holds one instance of every collaborator. By default the
//! repository is an [`InMemoryRepository`]; `with_sqlite()` swaps in a
//! real `SqliteStorage` on a temporary database file.

use std::collections::BTreeMap;
use std::sync::Arc;

use strata_config::model::StorageConfig;
use strata_core::traits::StorageRepository;
use strata_core::{JsonMap, StrataError};
use strata_storage::SqliteStorage;

use crate::mock_credentials::{MockCredentialStore, StoredSecret};
use crate::mock_plugin::MockPluginConnector;
use crate::mock_registry::MockPluginRegistry;
use crate::mock_repository::InMemoryRepository;

/// Endpoint the mock registry returns for a plugin added with `with_plugin`.
pub fn plugin_endpoint_uri(plugin_id: &str) -> String {
    format!("http://{plugin_id}.plugins.local:50051")
}

pub struct TestHarnessBuilder {
    plugins: BTreeMap<String, Vec<String>>,
    metadata: JsonMap,
    secrets: Vec<StoredSecret>,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            plugins: BTreeMap::new(),
            metadata: JsonMap::new(),
            secrets: Vec::new(),
            sqlite: false,
        }
    }

    /// Publish `version` of `plugin_id` and give it a resolvable endpoint.
    pub fn with_plugin(mut self, plugin_id: &str, version: &str) -> Self {
        self.plugins
            .entry(plugin_id.to_string())
            .or_default()
            .push(version.to_string());
        self
    }

    /// Metadata every plugin returns from `initialize`.
    pub fn with_metadata(mut self, metadata: JsonMap) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_secret(mut self, secret: StoredSecret) -> Self {
        self.secrets.push(secret);
        self
    }

    /// Back the harness with SQLite in a temporary directory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub async fn build(self) -> Result<TestHarness, StrataError> {
        let mut registry = MockPluginRegistry::new();
        for (plugin_id, versions) in &self.plugins {
            for version in versions {
                registry = registry.with_endpoint(plugin_id, version, &plugin_endpoint_uri(plugin_id));
            }
            let versions: Vec<&str> = versions.iter().map(String::as_str).collect();
            registry = registry.with_versions(plugin_id, &versions);
        }

        let mut credentials = MockCredentialStore::new();
        for secret in self.secrets {
            credentials = credentials.with_secret(secret);
        }

        let memory = Arc::new(InMemoryRepository::new());
        let mut repository: Arc<dyn StorageRepository> = memory.clone();
        let mut sqlite = None;
        let mut temp_dir = None;
        if self.sqlite {
            let dir = tempfile::TempDir::new().map_err(|e| StrataError::Storage {
                source: Box::new(e),
            })?;
            let config = StorageConfig {
                database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
                wal_mode: true,
            };
            let storage = Arc::new(SqliteStorage::new(config));
            storage.initialize().await?;
            repository = storage.clone();
            sqlite = Some(storage);
            temp_dir = Some(dir);
        }

        Ok(TestHarness {
            repository,
            memory,
            sqlite,
            registry: Arc::new(registry),
            plugin: Arc::new(MockPluginConnector::new().with_metadata(self.metadata)),
            credentials: Arc::new(credentials),
            _temp_dir: temp_dir,
        })
    }
}

pub struct TestHarness {
    /// The active repository (SQLite when built `with_sqlite`, else `memory`).
    pub repository: Arc<dyn StorageRepository>,
    pub memory: Arc<InMemoryRepository>,
    pub sqlite: Option<Arc<SqliteStorage>>,
    pub registry: Arc<MockPluginRegistry>,
    pub plugin: Arc<MockPluginConnector>,
    pub credentials: Arc<MockCredentialStore>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Flush and close the SQLite database, if any.
    pub async fn shutdown(&self) -> Result<(), StrataError> {
        match &self.sqlite {
            Some(storage) => storage.close().await,
            None => Ok(()),
        }
    }
}
