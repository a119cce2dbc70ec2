// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP plugin runtime client.
//!
//! [`HttpPluginConnector`] is the long-lived factory; it hands out one
//! [`HttpPluginClient`] per resolved endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_core::traits::{Connector, PluginClient, PluginConnector};
use strata_core::{ConnectorType, JsonMap, PluginEndpoint, StrataError};
use tracing::{debug, warn};

use crate::metadata::metadata_from_value;
use crate::transport::{JsonClient, Reply};

#[derive(Debug, Clone)]
pub struct HttpPluginConnector {
    timeout_secs: u64,
}

impl HttpPluginConnector {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl Connector for HttpPluginConnector {
    fn name(&self) -> &str {
        "http"
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::Plugin
    }
}

impl PluginConnector for HttpPluginConnector {
    fn connect(&self, endpoint: &PluginEndpoint) -> Result<Box<dyn PluginClient>, StrataError> {
        if !matches!(endpoint.scheme.as_str(), "http" | "https") {
            return Err(StrataError::connector_config(
                "PluginConnector",
                format!("unsupported endpoint scheme `{}`", endpoint.scheme),
            ));
        }
        let client = HttpPluginClient {
            http: JsonClient::new("plugin", &endpoint.base_url(), self.timeout_secs)?,
        };
        Ok(Box::new(client))
    }
}

#[derive(Serialize)]
struct InitRequest<'a> {
    options: &'a JsonMap,
}

#[derive(Deserialize)]
struct InitResponse {
    /// Absent or null metadata counts as an empty map.
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    options: &'a JsonMap,
    secret_data: &'a JsonMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
}

/// Client bound to one plugin instance.
#[derive(Debug, Clone)]
pub struct HttpPluginClient {
    http: JsonClient,
}

#[async_trait]
impl PluginClient for HttpPluginClient {
    async fn initialize(&self, options: &JsonMap) -> Result<JsonMap, StrataError> {
        match self.http.post("/plugin/init", &InitRequest { options }).await? {
            Reply::Ok(InitResponse { metadata }) => {
                debug!(endpoint = self.http.base_url(), "plugin initialized");
                metadata.map_or_else(|| Ok(JsonMap::new()), metadata_from_value)
            }
            Reply::Rejected { status, message } => Err(StrataError::Transport {
                service: "plugin".to_string(),
                message: format!("init returned {status}: {message}"),
                source: None,
            }),
        }
    }

    async fn verify(
        &self,
        options: &JsonMap,
        credential_data: &JsonMap,
        schema: Option<&str>,
    ) -> Result<(), StrataError> {
        let request = VerifyRequest {
            options,
            secret_data: credential_data,
            schema,
        };
        match self.http.post::<_, Value>("/plugin/verify", &request).await? {
            Reply::Ok(_) => Ok(()),
            Reply::Rejected { status, message } => {
                warn!(endpoint = self.http.base_url(), %status, "plugin rejected credential");
                Err(StrataError::Verification { reason: message })
            }
        }
    }
}
