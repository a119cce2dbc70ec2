// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of [`PluginRegistryClient`].
//!
//! Endpoint lookups go to the plugin service, version listings to the
//! repository service; each is configured with its own endpoint map.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_config::ConnectorConfig;
use strata_core::traits::{Connector, PluginRegistryClient};
use strata_core::{ConnectorType, StrataError, Tags};
use tracing::debug;

use crate::endpoint::single_endpoint;
use crate::transport::{JsonClient, Reply};

#[derive(Serialize)]
struct GetEndpointRequest<'a> {
    plugin_id: &'a str,
    version: &'a str,
    labels: &'a Tags,
    domain_id: &'a str,
}

#[derive(Deserialize)]
struct GetEndpointResponse {
    #[serde(default)]
    endpoint: Option<String>,
}

#[derive(Serialize)]
struct GetVersionsRequest<'a> {
    plugin_id: &'a str,
    domain_id: &'a str,
}

#[derive(Deserialize)]
struct GetVersionsResponse {
    #[serde(default)]
    results: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HttpPluginRegistry {
    plugin: JsonClient,
    repository: JsonClient,
}

impl HttpPluginRegistry {
    pub fn new(plugin: &ConnectorConfig, repository: &ConnectorConfig) -> Result<Self, StrataError> {
        let plugin_uri = single_endpoint("PluginConnector", &plugin.endpoint)?;
        let repository_uri = single_endpoint("RepositoryConnector", &repository.endpoint)?;
        Ok(Self {
            plugin: JsonClient::new("plugin registry", plugin_uri, plugin.timeout_secs)?,
            repository: JsonClient::new("repository", repository_uri, repository.timeout_secs)?,
        })
    }
}

impl Connector for HttpPluginRegistry {
    fn name(&self) -> &str {
        "http"
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::PluginRegistry
    }
}

#[async_trait]
impl PluginRegistryClient for HttpPluginRegistry {
    async fn resolve_endpoint(
        &self,
        plugin_id: &str,
        version: &str,
        domain_id: &str,
        labels: &Tags,
    ) -> Result<Option<String>, StrataError> {
        let request = GetEndpointRequest {
            plugin_id,
            version,
            labels,
            domain_id,
        };
        match self.plugin.post("/plugin/get-endpoint", &request).await? {
            Reply::Ok(GetEndpointResponse { endpoint }) => {
                Ok(endpoint.filter(|e| !e.trim().is_empty()))
            }
            Reply::Rejected { status, .. } if status == reqwest::StatusCode::NOT_FOUND => {
                debug!(plugin_id, version, "registry has no endpoint");
                Ok(None)
            }
            Reply::Rejected { status, message } => Err(StrataError::Transport {
                service: self.plugin.service().to_string(),
                message: format!("get-endpoint returned {status}: {message}"),
                source: None,
            }),
        }
    }

    async fn list_versions(
        &self,
        plugin_id: &str,
        domain_id: &str,
    ) -> Result<Vec<String>, StrataError> {
        let response: GetVersionsResponse = self
            .repository
            .post_ok(
                "/plugin/get-versions",
                &GetVersionsRequest {
                    plugin_id,
                    domain_id,
                },
            )
            .await?;
        Ok(response.results)
    }
}
