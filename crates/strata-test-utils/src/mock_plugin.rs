// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock plugin runtime.
//!
//! `MockPluginConnector` hands out clients that share one state, so a test
//! can inspect every `initialize` and `verify` call after the fact.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use strata_core::traits::{Connector, PluginClient, PluginConnector};
use strata_core::{ConnectorType, JsonMap, PluginEndpoint, StrataError};

use crate::lock;

/// One recorded `verify` call.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyCall {
    pub endpoint: PluginEndpoint,
    pub options: JsonMap,
    pub credential_data: JsonMap,
    pub schema: Option<String>,
}

#[derive(Default)]
struct PluginState {
    metadata: Mutex<JsonMap>,
    init_error: Mutex<Option<String>>,
    verify_error: Mutex<Option<String>>,
    connected: Mutex<Vec<PluginEndpoint>>,
    init_calls: Mutex<Vec<JsonMap>>,
    verify_calls: Mutex<Vec<VerifyCall>>,
}

#[derive(Clone, Default)]
pub struct MockPluginConnector {
    state: Arc<PluginState>,
}

impl MockPluginConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata returned by every subsequent `initialize`.
    pub fn with_metadata(self, metadata: JsonMap) -> Self {
        self.set_metadata(metadata);
        self
    }

    pub fn set_metadata(&self, metadata: JsonMap) {
        *lock(&self.state.metadata) = metadata;
    }

    /// Make `initialize` fail with a transport error carrying `message`.
    pub fn set_init_error(&self, message: Option<&str>) {
        *lock(&self.state.init_error) = message.map(str::to_string);
    }

    /// Make `verify` fail with a verification error carrying `reason`.
    pub fn set_verify_error(&self, reason: Option<&str>) {
        *lock(&self.state.verify_error) = reason.map(str::to_string);
    }

    pub fn connected_endpoints(&self) -> Vec<PluginEndpoint> {
        lock(&self.state.connected).clone()
    }

    pub fn init_calls(&self) -> Vec<JsonMap> {
        lock(&self.state.init_calls).clone()
    }

    pub fn verify_calls(&self) -> Vec<VerifyCall> {
        lock(&self.state.verify_calls).clone()
    }
}

impl Connector for MockPluginConnector {
    fn name(&self) -> &str {
        "mock-plugin"
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::Plugin
    }
}

impl PluginConnector for MockPluginConnector {
    fn connect(&self, endpoint: &PluginEndpoint) -> Result<Box<dyn PluginClient>, StrataError> {
        lock(&self.state.connected).push(endpoint.clone());
        Ok(Box::new(MockPluginClient {
            endpoint: endpoint.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockPluginClient {
    endpoint: PluginEndpoint,
    state: Arc<PluginState>,
}

#[async_trait]
impl PluginClient for MockPluginClient {
    async fn initialize(&self, options: &JsonMap) -> Result<JsonMap, StrataError> {
        lock(&self.state.init_calls).push(options.clone());
        if let Some(message) = lock(&self.state.init_error).clone() {
            return Err(StrataError::Transport {
                service: "plugin".to_string(),
                message,
                source: None,
            });
        }
        Ok(lock(&self.state.metadata).clone())
    }

    async fn verify(
        &self,
        options: &JsonMap,
        credential_data: &JsonMap,
        schema: Option<&str>,
    ) -> Result<(), StrataError> {
        lock(&self.state.verify_calls).push(VerifyCall {
            endpoint: self.endpoint.clone(),
            options: options.clone(),
            credential_data: credential_data.clone(),
            schema: schema.map(str::to_string),
        });
        match lock(&self.state.verify_error).clone() {
            Some(reason) => Err(StrataError::Verification { reason }),
            None => Ok(()),
        }
    }
}
