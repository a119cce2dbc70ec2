// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock plugin registry backed by fixed endpoint and version tables.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use strata_core::traits::{Connector, PluginRegistryClient};
use strata_core::{ConnectorType, StrataError, Tags};

use crate::lock;

/// One recorded `resolve_endpoint` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveCall {
    pub plugin_id: String,
    pub version: String,
    pub domain_id: String,
    pub labels: Tags,
}

#[derive(Default)]
pub struct MockPluginRegistry {
    endpoints: Mutex<HashMap<(String, String), String>>,
    versions: Mutex<HashMap<String, Vec<String>>>,
    unreachable: AtomicBool,
    resolve_calls: Mutex<Vec<ResolveCall>>,
    version_calls: Mutex<Vec<(String, String)>>,
}

impl MockPluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(self, plugin_id: &str, version: &str, uri: &str) -> Self {
        self.set_endpoint(plugin_id, version, uri);
        self
    }

    pub fn with_versions(self, plugin_id: &str, versions: &[&str]) -> Self {
        lock(&self.versions).insert(
            plugin_id.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Every call fails with a transport error.
    pub fn unreachable(self) -> Self {
        self.set_unreachable(true);
        self
    }

    pub fn set_endpoint(&self, plugin_id: &str, version: &str, uri: &str) {
        lock(&self.endpoints).insert(
            (plugin_id.to_string(), version.to_string()),
            uri.to_string(),
        );
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn resolve_calls(&self) -> Vec<ResolveCall> {
        lock(&self.resolve_calls).clone()
    }

    /// `(plugin_id, domain_id)` of every `list_versions` call.
    pub fn version_calls(&self) -> Vec<(String, String)> {
        lock(&self.version_calls).clone()
    }

    fn check_reachable(&self) -> Result<(), StrataError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StrataError::Transport {
                service: "plugin registry".to_string(),
                message: "connection refused".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

impl Connector for MockPluginRegistry {
    fn name(&self) -> &str {
        "mock-registry"
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::PluginRegistry
    }
}

#[async_trait]
impl PluginRegistryClient for MockPluginRegistry {
    async fn resolve_endpoint(
        &self,
        plugin_id: &str,
        version: &str,
        domain_id: &str,
        labels: &Tags,
    ) -> Result<Option<String>, StrataError> {
        lock(&self.resolve_calls).push(ResolveCall {
            plugin_id: plugin_id.to_string(),
            version: version.to_string(),
            domain_id: domain_id.to_string(),
            labels: labels.clone(),
        });
        self.check_reachable()?;
        Ok(lock(&self.endpoints)
            .get(&(plugin_id.to_string(), version.to_string()))
            .cloned())
    }

    async fn list_versions(
        &self,
        plugin_id: &str,
        domain_id: &str,
    ) -> Result<Vec<String>, StrataError> {
        lock(&self.version_calls).push((plugin_id.to_string(), domain_id.to_string()));
        self.check_reachable()?;
        Ok(lock(&self.versions)
            .get(plugin_id)
            .cloned()
            .unwrap_or_default())
    }
}
