// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The storage lifecycle state machine.
//!
//! States: `UNREGISTERED -> ENABLED <-> DISABLED`. Deregistration is a soft
//! delete (`DISABLED` plus `deleted_at`); a deregistered resource is
//! invisible to every operation afterwards.

use std::sync::Arc;

use chrono::Utc;
use strata_core::traits::{CredentialStore, PluginConnector, PluginRegistryClient, StorageRepository};
use strata_core::types::{CREDENTIALS_SECRET_TYPE, generate_storage_id};
use strata_core::{
    Capability, JsonMap, PluginInfo, StatBucket, StatQuery, StorageQuery, StorageResource,
    StorageState, StorageUpdate, StrataError, Tags,
};
use strata_plugin::{PluginMetadata, PluginResolver, VersionValidator, validate_plugin_metadata};
use strata_secret::CredentialProvisioner;
use tracing::{Instrument, debug, info, info_span};

use crate::compensation::{Compensation, CompensationLog, run_compensated};
use crate::request::{RegisterRequest, StorageRef, UpdatePluginRequest, UpdateRequest};

/// Every external collaborator the orchestrator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub repository: Arc<dyn StorageRepository>,
    pub registry: Arc<dyn PluginRegistryClient>,
    pub plugin_connector: Arc<dyn PluginConnector>,
    pub credentials: Arc<dyn CredentialStore>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Secret type of credentials created during registration.
    pub secret_type: String,
    /// Labels sent with every endpoint resolution.
    pub labels: Tags,
    /// Bypass the registry and send every plugin call here.
    pub static_endpoint: Option<String>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            secret_type: CREDENTIALS_SECRET_TYPE.to_string(),
            labels: Tags::new(),
            static_endpoint: None,
        }
    }
}

pub struct RegistrationOrchestrator {
    repository: Arc<dyn StorageRepository>,
    plugins: Arc<dyn PluginConnector>,
    resolver: PluginResolver,
    versions: VersionValidator,
    credentials: CredentialProvisioner,
    secret_type: String,
    span: tracing::Span,
}

impl RegistrationOrchestrator {
    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators {
            repository,
            registry,
            plugin_connector,
            credentials,
        } = collaborators;

        Self {
            resolver: PluginResolver::new(registry.clone()),
            versions: VersionValidator::new(registry),
            credentials: CredentialProvisioner::new(credentials),
            repository,
            plugins: plugin_connector,
            secret_type: CREDENTIALS_SECRET_TYPE.to_string(),
            span: tracing::Span::none(),
        }
        .with_span(info_span!("orchestrator"))
    }

    /// Apply non-default options. Fails if the static endpoint does not parse.
    pub fn with_options(mut self, options: OrchestratorOptions) -> Result<Self, StrataError> {
        let mut resolver = self.resolver.with_labels(options.labels);
        if let Some(uri) = &options.static_endpoint {
            resolver = resolver.with_static_endpoint(uri)?;
        }
        self.resolver = resolver;
        self.secret_type = options.secret_type;
        Ok(self)
    }

    /// Replace the orchestrator span. Component spans are re-created as its
    /// children so their events carry the orchestrator's fields.
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.resolver = self
            .resolver
            .with_span(info_span!(parent: &span, "plugin_resolver"));
        self.versions = self
            .versions
            .with_span(info_span!(parent: &span, "version_validator"));
        self.credentials = self
            .credentials
            .with_span(info_span!(parent: &span, "credentials"));
        self.span = span;
        self
    }

    /// Register a new storage resource bound to a plugin.
    ///
    /// Resolves and initializes the plugin, provisions the credential, then
    /// persists the resource as `ENABLED`. The raw secret is discarded once
    /// the credential exists.
    pub async fn register(&self, request: RegisterRequest) -> Result<StorageResource, StrataError> {
        async {
            let RegisterRequest {
                name,
                tags,
                plugin_info,
                domain_id,
                user_id,
            } = request;

            let plugin_id = present("plugin_info.plugin_id", plugin_info.plugin_id)?;
            let version = present("plugin_info.version", plugin_info.version)?;
            let secret_data = plugin_info
                .secret_data
                .ok_or_else(|| StrataError::required("plugin_info.secret_data"))?;
            let name = present("name", Some(name))?;
            let domain_id = present("domain_id", Some(domain_id))?;
            let user_id = present("user_id", Some(user_id))?;
            let options = plugin_info.options;
            let provider = plugin_info.provider;

            run_compensated(self.repository.as_ref(), async |log: &mut CompensationLog| {
                let metadata = self
                    .initialize_plugin(&plugin_id, &version, &domain_id, &options)
                    .await?;
                let credential_id = self
                    .credentials
                    .create(&secret_data, &self.secret_type, &domain_id)
                    .await?;

                let resource = StorageResource {
                    storage_id: generate_storage_id(),
                    name,
                    state: StorageState::Enabled,
                    tags,
                    capability: metadata.capability_map(),
                    plugin_info: PluginInfo {
                        plugin_id,
                        version,
                        credential_id: Some(credential_id),
                        options,
                        metadata: metadata.raw,
                        provider,
                    },
                    domain_id,
                    user_id,
                    created_at: Utc::now(),
                    deleted_at: None,
                };

                let stored = self.repository.create(&resource).await?;
                log.push(Compensation::RemoveStorage {
                    storage_id: stored.storage_id.clone(),
                    domain_id: stored.domain_id.clone(),
                });
                info!(
                    storage_id = %stored.storage_id,
                    plugin_id = %stored.plugin_info.plugin_id,
                    version = %stored.plugin_info.version,
                    "storage registered"
                );
                Ok(stored)
            })
            .await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Rename a resource and/or replace its tags.
    pub async fn update(&self, request: UpdateRequest) -> Result<StorageResource, StrataError> {
        async {
            let current = self.load_active(&request.storage_id, &request.domain_id).await?;
            let update = StorageUpdate {
                name: request.name,
                tags: request.tags,
                ..StorageUpdate::default()
            };
            if update.is_empty() {
                debug!(storage_id = %current.storage_id, "nothing to update");
                return Ok(current);
            }

            run_compensated(self.repository.as_ref(), async |log: &mut CompensationLog| {
                let updated = self
                    .repository
                    .update(&current.storage_id, &current.domain_id, update)
                    .await?;
                log.push(Compensation::RestoreStorage(Box::new(current.clone())));
                info!(storage_id = %updated.storage_id, "storage updated");
                Ok(updated)
            })
            .await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Change the plugin version and/or options of a resource.
    ///
    /// A version change is checked against the published versions, then the
    /// plugin is re-initialized with the effective options and the stored
    /// metadata and capability are replaced.
    pub async fn update_plugin(
        &self,
        request: UpdatePluginRequest,
    ) -> Result<StorageResource, StrataError> {
        async {
            let current = self.load_active(&request.storage_id, &request.domain_id).await?;
            let version = request.version.clone().filter(|v| !v.trim().is_empty());
            if version.is_none() && request.options.is_none() {
                debug!(storage_id = %current.storage_id, "nothing to update");
                return Ok(current);
            }

            run_compensated(self.repository.as_ref(), async |log: &mut CompensationLog| {
                let mut plugin_info = current.plugin_info.clone();
                let mut update = StorageUpdate::default();
                // Re-initialization sees the options being written.
                let options = request
                    .options
                    .clone()
                    .unwrap_or_else(|| plugin_info.options.clone());

                if let Some(version) = &version {
                    self.versions
                        .check_version(&plugin_info.plugin_id, version, &current.domain_id)
                        .await?;
                    let metadata = self
                        .initialize_plugin(&plugin_info.plugin_id, version, &current.domain_id, &options)
                        .await?;
                    update.capability = Some(metadata.capability_map());
                    plugin_info.version = version.clone();
                    plugin_info.metadata = metadata.raw;
                }
                if request.options.is_some() {
                    plugin_info.options = options;
                }
                update.plugin_info = Some(plugin_info);

                let updated = self
                    .repository
                    .update(&current.storage_id, &current.domain_id, update)
                    .await?;
                log.push(Compensation::RestoreStorage(Box::new(current.clone())));
                info!(
                    storage_id = %updated.storage_id,
                    version = %updated.plugin_info.version,
                    "storage plugin updated"
                );
                Ok(updated)
            })
            .await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Ask the plugin to exercise the resource's credential. Changes nothing.
    pub async fn verify_plugin(&self, target: &StorageRef) -> Result<(), StrataError> {
        async {
            let resource = self.load_active(&target.storage_id, &target.domain_id).await?;
            let info = &resource.plugin_info;
            let capability = Capability::from_map(resource.capability.as_ref());

            let (credential_data, schema) = self
                .credentials
                .select_for_plugin(
                    &info.plugin_id,
                    info.credential_id.as_deref(),
                    info.provider.as_deref(),
                    &capability,
                    &resource.domain_id,
                )
                .await?;

            let endpoint = self
                .resolver
                .resolve(&info.plugin_id, &info.version, &resource.domain_id)
                .await?;
            let client = self.plugins.connect(&endpoint)?;
            client
                .verify(&info.options, &credential_data, schema.as_deref())
                .await?;

            info!(storage_id = %resource.storage_id, %endpoint, "storage plugin verified");
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Set the state to `ENABLED`. Enabling an enabled resource is allowed.
    pub async fn enable(&self, target: &StorageRef) -> Result<StorageResource, StrataError> {
        async {
            let resource = self.load_active(&target.storage_id, &target.domain_id).await?;
            let updated = self
                .repository
                .update(
                    &resource.storage_id,
                    &resource.domain_id,
                    StorageUpdate::state(StorageState::Enabled),
                )
                .await?;
            info!(storage_id = %updated.storage_id, "storage enabled");
            Ok(updated)
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn disable(&self, target: &StorageRef) -> Result<StorageResource, StrataError> {
        async {
            let resource = self.load_enabled(target).await?;
            let updated = self
                .repository
                .update(
                    &resource.storage_id,
                    &resource.domain_id,
                    StorageUpdate::state(StorageState::Disabled),
                )
                .await?;
            info!(storage_id = %updated.storage_id, "storage disabled");
            Ok(updated)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Soft-delete a resource: `DISABLED` with `deleted_at` set.
    pub async fn deregister(&self, target: &StorageRef) -> Result<(), StrataError> {
        async {
            let resource = self.load_enabled(target).await?;
            let update = StorageUpdate {
                state: Some(StorageState::Disabled),
                deleted_at: Some(Some(Utc::now())),
                ..StorageUpdate::default()
            };
            self.repository
                .update(&resource.storage_id, &resource.domain_id, update)
                .await?;
            info!(storage_id = %resource.storage_id, "storage deregistered");
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn get(&self, target: &StorageRef) -> Result<StorageResource, StrataError> {
        self.load_active(&target.storage_id, &target.domain_id)
            .instrument(self.span.clone())
            .await
    }

    /// Matching resources and the total count before pagination.
    pub async fn list(
        &self,
        query: &StorageQuery,
    ) -> Result<(Vec<StorageResource>, u64), StrataError> {
        if query.domain_id.is_empty() {
            return Err(StrataError::required("domain_id"));
        }
        self.repository
            .query(query)
            .instrument(self.span.clone())
            .await
    }

    pub async fn stat(&self, query: &StatQuery) -> Result<Vec<StatBucket>, StrataError> {
        if query.domain_id.is_empty() {
            return Err(StrataError::required("domain_id"));
        }
        self.repository
            .stat(query)
            .instrument(self.span.clone())
            .await
    }

    async fn initialize_plugin(
        &self,
        plugin_id: &str,
        version: &str,
        domain_id: &str,
        options: &JsonMap,
    ) -> Result<PluginMetadata, StrataError> {
        let endpoint = self.resolver.resolve(plugin_id, version, domain_id).await?;
        let client = self.plugins.connect(&endpoint)?;
        let metadata = validate_plugin_metadata(client.initialize(options).await?)?;
        debug!(plugin_id, version, %endpoint, "plugin initialized");
        Ok(metadata)
    }

    /// Load a resource that has not been deregistered.
    async fn load_active(
        &self,
        storage_id: &str,
        domain_id: &str,
    ) -> Result<StorageResource, StrataError> {
        if storage_id.is_empty() {
            return Err(StrataError::required("storage_id"));
        }
        if domain_id.is_empty() {
            return Err(StrataError::required("domain_id"));
        }
        self.repository
            .get(storage_id, domain_id)
            .await?
            .filter(|r| !r.is_deleted())
            .ok_or_else(|| StrataError::not_found("storage_id", storage_id))
    }

    async fn load_enabled(&self, target: &StorageRef) -> Result<StorageResource, StrataError> {
        let resource = self.load_active(&target.storage_id, &target.domain_id).await?;
        if resource.state == StorageState::Disabled {
            return Err(StrataError::AlreadyDisabled {
                storage_id: resource.storage_id,
            });
        }
        Ok(resource)
    }
}

fn present(key: &str, value: Option<String>) -> Result<String, StrataError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| StrataError::required(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RegisterPluginInfo;
    use strata_core::SecretData;
    use strata_test_utils::{TestHarness, json_map};

    fn orchestrator(h: &TestHarness) -> RegistrationOrchestrator {
        RegistrationOrchestrator::new(Collaborators {
            repository: h.repository.clone(),
            registry: h.registry.clone(),
            plugin_connector: h.plugin.clone(),
            credentials: h.credentials.clone(),
        })
    }

    fn request() -> RegisterRequest {
        RegisterRequest {
            name: "s1".into(),
            domain_id: "dom-1".into(),
            user_id: "u-1".into(),
            plugin_info: RegisterPluginInfo {
                plugin_id: Some("plugin-abc".into()),
                version: Some("1.1".into()),
                secret_data: Some(SecretData {
                    name: Some("cred".into()),
                    data: Some(json_map(serde_json::json!({"token": "do-not-log-me"}))),
                    schema: None,
                }),
                ..RegisterPluginInfo::default()
            },
            ..RegisterRequest::default()
        }
    }

    #[test]
    fn present_rejects_blank_values() {
        assert!(present("name", Some("  ".into())).is_err());
        assert!(present("name", None).is_err());
        assert_eq!(present("name", Some("s1".into())).unwrap(), "s1");
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn registration_is_logged_without_secrets() {
        let h = TestHarness::builder()
            .with_plugin("plugin-abc", "1.1")
            .build()
            .await
            .unwrap();
        let stored = orchestrator(&h).register(request()).await.unwrap();

        assert!(logs_contain("storage registered"));
        assert!(logs_contain(&stored.storage_id));
        assert!(!logs_contain("do-not-log-me"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn failed_registration_after_persist_is_rolled_back() {
        let h = TestHarness::builder()
            .with_plugin("plugin-abc", "1.1")
            .build()
            .await
            .unwrap();
        let orchestrator = orchestrator(&h);

        let err = run_compensated(orchestrator.repository.as_ref(), async |log: &mut CompensationLog| {
            let stored = orchestrator.register(request()).await?;
            log.push(Compensation::RemoveStorage {
                storage_id: stored.storage_id.clone(),
                domain_id: stored.domain_id.clone(),
            });
            Err::<(), _>(StrataError::Internal("later step failed".into()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, StrataError::Internal(_)));
        assert!(h.memory.is_empty());
        assert!(logs_contain("rolling back"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn component_spans_follow_replaced_span() {
        let h = TestHarness::builder().build().await.unwrap();
        let orchestrator = orchestrator(&h).with_span(info_span!("orchestrator", service = "svc-a"));

        for component in [
            orchestrator.resolver.span(),
            orchestrator.versions.span(),
            orchestrator.credentials.span(),
        ] {
            component.in_scope(|| info!("component event"));
        }

        assert!(logs_contain(r#"orchestrator{service="svc-a"}:plugin_resolver"#));
        assert!(logs_contain(r#"orchestrator{service="svc-a"}:version_validator"#));
        assert!(logs_contain(r#"orchestrator{service="svc-a"}:credentials"#));
    }
}
