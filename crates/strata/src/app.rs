// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configured connectors into a [`RegistrationOrchestrator`].

use std::sync::Arc;

use strata_config::StrataConfig;
use strata_core::{StrataError, Tags};
use strata_plugin::{HttpPluginConnector, HttpPluginRegistry};
use strata_secret::HttpCredentialStore;
use strata_service::{Collaborators, OrchestratorOptions, RegistrationOrchestrator};
use strata_storage::SqliteStorage;
use tracing::{debug, info_span};

pub struct App {
    pub orchestrator: RegistrationOrchestrator,
    storage: Arc<SqliteStorage>,
}

impl App {
    /// Build the HTTP connectors first so a connector misconfiguration is
    /// reported before the database is touched.
    pub async fn build(config: &StrataConfig) -> Result<Self, StrataError> {
        let connectors = &config.connectors;
        let registry = Arc::new(HttpPluginRegistry::new(
            &connectors.plugin.connector(),
            &connectors.repository,
        )?);
        let plugin_connector = Arc::new(HttpPluginConnector::new(connectors.plugin.timeout_secs));
        let credentials = Arc::new(HttpCredentialStore::new(&connectors.secret)?);

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;
        debug!(database = %config.storage.database_path, "storage ready");

        let orchestrator = RegistrationOrchestrator::new(Collaborators {
            repository: storage.clone(),
            registry,
            plugin_connector,
            credentials,
        })
        .with_options(OrchestratorOptions {
            secret_type: config.service.secret_type.clone(),
            labels: Tags::new(),
            static_endpoint: connectors.plugin.static_endpoint.clone(),
        })?
        .with_span(info_span!("orchestrator", service = %config.service.name));

        Ok(Self {
            orchestrator,
            storage,
        })
    }

    pub async fn shutdown(&self) -> Result<(), StrataError> {
        self.storage.close().await
    }
}
