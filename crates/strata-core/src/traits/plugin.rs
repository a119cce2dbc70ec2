// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry and plugin runtime traits.

use async_trait::async_trait;

use crate::error::StrataError;
use crate::traits::connector::Connector;
use crate::types::{JsonMap, PluginEndpoint, Tags};

/// Registry that knows where plugin instances run and which versions exist.
#[async_trait]
pub trait PluginRegistryClient: Connector {
    /// Returns the endpoint URI for a plugin version, or `None` if the
    /// registry has no running instance for it.
    async fn resolve_endpoint(
        &self,
        plugin_id: &str,
        version: &str,
        domain_id: &str,
        labels: &Tags,
    ) -> Result<Option<String>, StrataError>;

    /// All versions published for a plugin in the domain's scope.
    async fn list_versions(
        &self,
        plugin_id: &str,
        domain_id: &str,
    ) -> Result<Vec<String>, StrataError>;
}

/// Factory for clients bound to one resolved endpoint.
pub trait PluginConnector: Connector {
    fn connect(&self, endpoint: &PluginEndpoint) -> Result<Box<dyn PluginClient>, StrataError>;
}

/// RPC handle to a single plugin instance.
///
/// Calls are single-attempt; retries are the caller's business.
#[async_trait]
pub trait PluginClient: Send + Sync {
    /// Asks the plugin for its metadata given the resource options.
    async fn initialize(&self, options: &JsonMap) -> Result<JsonMap, StrataError>;

    /// Exercises the plugin against a live credential.
    async fn verify(
        &self,
        options: &JsonMap,
        credential_data: &JsonMap,
        schema: Option<&str>,
    ) -> Result<(), StrataError>;
}
