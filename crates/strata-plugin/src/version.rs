// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin version membership check.

use std::sync::Arc;

use strata_core::StrataError;
use strata_core::traits::PluginRegistryClient;
use tracing::{Instrument, debug};

#[derive(Clone)]
pub struct VersionValidator {
    registry: Arc<dyn PluginRegistryClient>,
    span: tracing::Span,
}

impl VersionValidator {
    pub fn new(registry: Arc<dyn PluginRegistryClient>) -> Self {
        Self {
            registry,
            span: tracing::info_span!("version_validator"),
        }
    }

    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Fails with `InvalidPluginVersion` unless `version` is published for
    /// `plugin_id` in the domain's scope.
    pub async fn check_version(
        &self,
        plugin_id: &str,
        version: &str,
        domain_id: &str,
    ) -> Result<(), StrataError> {
        async {
            let versions = self.registry.list_versions(plugin_id, domain_id).await?;
            if versions.iter().any(|v| v == version) {
                debug!(plugin_id, version, "plugin version is published");
                Ok(())
            } else {
                debug!(plugin_id, version, published = ?versions, "plugin version not published");
                Err(StrataError::InvalidPluginVersion {
                    plugin_id: plugin_id.to_string(),
                    version: version.to_string(),
                })
            }
        }
        .instrument(self.span.clone())
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_test_utils::MockPluginRegistry;

    #[tokio::test]
    async fn published_version_passes() {
        let registry = Arc::new(MockPluginRegistry::new().with_versions("plugin-abc", &["1.0", "1.1"]));
        VersionValidator::new(registry.clone())
            .check_version("plugin-abc", "1.1", "dom-1")
            .await
            .unwrap();
        assert_eq!(registry.version_calls(), vec![("plugin-abc".to_string(), "dom-1".to_string())]);
    }

    #[tokio::test]
    async fn unpublished_version_is_rejected() {
        let registry = Arc::new(MockPluginRegistry::new().with_versions("plugin-abc", &["1.1"]));
        let err = VersionValidator::new(registry)
            .check_version("plugin-abc", "2.0", "dom-1")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "plugin version is invalid (plugin_id = plugin-abc, version = 2.0)"
        );
    }

    #[tokio::test]
    async fn registry_failure_propagates() {
        let registry = Arc::new(
            MockPluginRegistry::new()
                .with_versions("plugin-abc", &["1.1"])
                .unreachable(),
        );
        let err = VersionValidator::new(registry)
            .check_version("plugin-abc", "1.1", "dom-1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ERROR_TRANSPORT");
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn logs_inside_component_span() {
        let registry = Arc::new(MockPluginRegistry::new().with_versions("plugin-abc", &["1.1"]));
        let validator = VersionValidator::new(registry)
            .with_span(tracing::info_span!("req", request_id = "r-42"));
        validator
            .check_version("plugin-abc", "1.1", "dom-1")
            .await
            .unwrap();
        assert!(logs_contain("r-42"));
        assert!(logs_contain("plugin version is published"));
    }
}
