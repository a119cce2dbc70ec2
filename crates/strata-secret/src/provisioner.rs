// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential creation and the two credential lookup policies.

use std::sync::Arc;

use strata_core::traits::CredentialStore;
use strata_core::types::{Capability, NewCredential, SecretData};
use strata_core::{JsonMap, StrataError};
use tracing::{Instrument, debug, info, info_span};

use crate::query::SecretFilter;

/// Creates credential records and resolves credential data for plugins.
pub struct CredentialProvisioner {
    store: Arc<dyn CredentialStore>,
    span: tracing::Span,
}

impl CredentialProvisioner {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let span = info_span!("credentials", store = store.name());
        Self { store, span }
    }

    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Create a credential record from request secret material and return its id.
    ///
    /// Both `name` and `data` must be present; the payload is never logged.
    pub async fn create(
        &self,
        secret: &SecretData,
        secret_type: &str,
        domain_id: &str,
    ) -> Result<String, StrataError> {
        let name = secret
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| StrataError::required("plugin_info.secret_data.name"))?;
        let data = secret
            .data
            .clone()
            .ok_or_else(|| StrataError::required("plugin_info.secret_data.data"))?;

        let credential = NewCredential {
            name: name.to_string(),
            data,
            secret_type: secret_type.to_string(),
            domain_id: domain_id.to_string(),
            schema: secret.schema.clone(),
        };

        async {
            let secret_id = self.store.create(credential).await?;
            info!(secret_id = %secret_id, name, "credential created");
            Ok(secret_id)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Fetch a credential's payload by id.
    pub async fn fetch_by_id(
        &self,
        secret_id: &str,
        domain_id: &str,
    ) -> Result<JsonMap, StrataError> {
        self.store
            .get_data(secret_id, domain_id)
            .instrument(self.span.clone())
            .await?
            .ok_or_else(|| StrataError::not_found("secret_id", secret_id))
    }

    /// Resource-scoped lookup: the first credential matching `filter`.
    ///
    /// Returns the payload together with the matched record's schema.
    pub async fn fetch_for_resource(
        &self,
        resource_id: &str,
        filter: &SecretFilter,
        domain_id: &str,
    ) -> Result<(JsonMap, Option<String>), StrataError> {
        async {
            let list = self.store.list(&filter.to_query(), domain_id).await?;
            debug!(resource_id, total = list.total_count, "resource credentials listed");
            let first = list
                .results
                .into_iter()
                .next()
                .ok_or_else(|| StrataError::ResourceSecretsNotExist {
                    resource_id: resource_id.to_string(),
                })?;
            let data = self.fetch_by_id(&first.secret_id, domain_id).await?;
            Ok((data, first.schema))
        }
        .instrument(self.span.clone())
        .await
    }

    /// Plugin-scoped lookup driven by the plugin's capability.
    ///
    /// With `use_resource_secret` the credential is chosen by `provider`,
    /// otherwise by the stored `credential_id`. Either way the candidate must
    /// carry one of the plugin's supported schemas.
    pub async fn select_for_plugin(
        &self,
        plugin_id: &str,
        credential_id: Option<&str>,
        provider: Option<&str>,
        capability: &Capability,
        domain_id: &str,
    ) -> Result<(JsonMap, Option<String>), StrataError> {
        let mut filter = SecretFilter {
            schemas: capability.supported_schema.clone(),
            ..SecretFilter::default()
        };
        if capability.use_resource_secret {
            let provider = provider
                .filter(|p| !p.is_empty())
                .ok_or_else(|| StrataError::required("plugin_info.provider"))?;
            filter.provider = Some(provider.to_string());
        } else {
            let credential_id = credential_id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| StrataError::required("plugin_info.credential_id"))?;
            filter.secret_id = Some(credential_id.to_string());
        }

        async {
            let list = self.store.list(&filter.to_query(), domain_id).await?;
            let Some(first) = list.results.into_iter().next() else {
                return Err(match (&filter.provider, &filter.secret_id) {
                    (Some(provider), _) => StrataError::SupportedSecretsNotExist {
                        plugin_id: plugin_id.to_string(),
                        provider: provider.clone(),
                    },
                    (None, secret_id) => StrataError::not_found(
                        "plugin_info.credential_id",
                        secret_id.clone().unwrap_or_default(),
                    ),
                });
            };
            debug!(plugin_id, secret_id = %first.secret_id, schema = ?first.schema, "credential selected");
            let data = self.fetch_by_id(&first.secret_id, domain_id).await?;
            Ok((data, first.schema))
        }
        .instrument(self.span.clone())
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_core::types::Operator;
    use strata_test_utils::{MockCredentialStore, StoredSecret, json_map};

    fn secret(id: &str, schema: &str, provider: &str) -> StoredSecret {
        StoredSecret {
            secret_id: id.into(),
            name: format!("{id}-name"),
            data: json_map(json!({"token": id})),
            schema: Some(schema.into()),
            provider: Some(provider.into()),
            domain_id: "dom-1".into(),
            ..StoredSecret::default()
        }
    }

    fn provisioner(store: &Arc<MockCredentialStore>) -> CredentialProvisioner {
        CredentialProvisioner::new(store.clone())
    }

    #[tokio::test]
    async fn create_requires_name_and_data() {
        let store = Arc::new(MockCredentialStore::new());
        let p = provisioner(&store);

        let err = p
            .create(&SecretData::default(), "CREDENTIALS", "dom-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::RequiredParameter { ref key } if key == "plugin_info.secret_data.name"));

        let no_data = SecretData {
            name: Some("sec".into()),
            ..SecretData::default()
        };
        let err = p.create(&no_data, "CREDENTIALS", "dom-1").await.unwrap_err();
        assert!(matches!(err, StrataError::RequiredParameter { ref key } if key == "plugin_info.secret_data.data"));
        assert!(store.created().is_empty());
    }

    #[tokio::test]
    async fn create_passes_secret_type_and_domain() {
        let store = Arc::new(MockCredentialStore::new());
        let data = SecretData {
            name: Some("sec".into()),
            data: Some(json_map(json!({"key": "v"}))),
            schema: Some("aws_access_key".into()),
        };
        let id = provisioner(&store)
            .create(&data, "CREDENTIALS", "dom-1")
            .await
            .unwrap();
        assert_eq!(id, "secret-0001");

        let created = store.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].secret_type, "CREDENTIALS");
        assert_eq!(created[0].domain_id, "dom-1");
        assert_eq!(created[0].schema.as_deref(), Some("aws_access_key"));
    }

    #[tokio::test]
    async fn fetch_by_id_reports_missing_secret() {
        let store = Arc::new(MockCredentialStore::new().with_secret(secret("s1", "a", "aws")));
        let p = provisioner(&store);
        assert_eq!(
            p.fetch_by_id("s1", "dom-1").await.unwrap(),
            json_map(json!({"token": "s1"}))
        );
        let err = p.fetch_by_id("s9", "dom-1").await.unwrap_err();
        assert!(matches!(err, StrataError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn resource_lookup_takes_first_match() {
        let store = Arc::new(
            MockCredentialStore::new()
                .with_secret(secret("s1", "aws_access_key", "aws"))
                .with_secret(secret("s2", "aws_access_key", "aws")),
        );
        let filter = SecretFilter {
            provider: Some("aws".into()),
            ..SecretFilter::default()
        };
        let (data, schema) = provisioner(&store)
            .fetch_for_resource("sto-1", &filter, "dom-1")
            .await
            .unwrap();
        assert_eq!(data, json_map(json!({"token": "s1"})));
        assert_eq!(schema.as_deref(), Some("aws_access_key"));
    }

    #[tokio::test]
    async fn resource_lookup_without_results_fails() {
        let store = Arc::new(MockCredentialStore::new());
        let filter = SecretFilter {
            provider: Some("gcp".into()),
            ..SecretFilter::default()
        };
        let err = provisioner(&store)
            .fetch_for_resource("sto-1", &filter, "dom-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::ResourceSecretsNotExist { ref resource_id } if resource_id == "sto-1"));
    }

    #[tokio::test]
    async fn plugin_lookup_by_credential_id_honors_supported_schema() {
        let store = Arc::new(
            MockCredentialStore::new()
                .with_secret(secret("s1", "gcp_service_account", "gcp"))
                .with_secret(secret("s2", "aws_access_key", "aws")),
        );
        let capability = Capability {
            supported_schema: vec!["aws_access_key".into()],
            use_resource_secret: false,
        };
        let p = provisioner(&store);

        let (data, schema) = p
            .select_for_plugin("plugin-abc", Some("s2"), None, &capability, "dom-1")
            .await
            .unwrap();
        assert_eq!(data, json_map(json!({"token": "s2"})));
        assert_eq!(schema.as_deref(), Some("aws_access_key"));

        // s1 exists but its schema is not supported.
        let err = p
            .select_for_plugin("plugin-abc", Some("s1"), None, &capability, "dom-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::ResourceNotFound { ref value, .. } if value == "s1"));

        let query = store.queries().pop().unwrap();
        assert_eq!(query.filter[0].k, "schema");
        assert_eq!(query.filter[0].o, Operator::In);
        assert_eq!(query.filter[1].k, "secret_id");
    }

    #[tokio::test]
    async fn plugin_lookup_by_provider() {
        let store = Arc::new(
            MockCredentialStore::new()
                .with_secret(secret("s1", "aws_access_key", "aws"))
                .with_secret(secret("s2", "gcp_service_account", "gcp")),
        );
        let capability = Capability {
            supported_schema: vec!["gcp_service_account".into()],
            use_resource_secret: true,
        };
        let p = provisioner(&store);

        let (data, _) = p
            .select_for_plugin("plugin-abc", None, Some("gcp"), &capability, "dom-1")
            .await
            .unwrap();
        assert_eq!(data, json_map(json!({"token": "s2"})));

        let err = p
            .select_for_plugin("plugin-abc", None, Some("aws"), &capability, "dom-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StrataError::SupportedSecretsNotExist { ref plugin_id, ref provider }
                if plugin_id == "plugin-abc" && provider == "aws"
        ));
    }

    #[tokio::test]
    async fn plugin_lookup_requires_policy_input() {
        let store = Arc::new(MockCredentialStore::new());
        let p = provisioner(&store);

        let by_provider = Capability {
            use_resource_secret: true,
            ..Capability::default()
        };
        let err = p
            .select_for_plugin("plugin-abc", Some("s1"), None, &by_provider, "dom-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::RequiredParameter { ref key } if key == "plugin_info.provider"));

        let err = p
            .select_for_plugin("plugin-abc", None, Some("aws"), &Capability::default(), "dom-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::RequiredParameter { ref key } if key == "plugin_info.credential_id"));
        assert!(store.queries().is_empty());
    }
}
