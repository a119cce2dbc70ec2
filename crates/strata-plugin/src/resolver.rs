// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin endpoint resolution.

use std::sync::Arc;

use strata_core::traits::PluginRegistryClient;
use strata_core::{PluginEndpoint, StrataError, Tags};
use tracing::{Instrument, debug, warn};

use crate::endpoint::parse_endpoint;

/// Resolves `(plugin_id, version, domain_id)` to a [`PluginEndpoint`].
///
/// No caching: every call asks the registry. With a static endpoint set,
/// the registry is never consulted.
#[derive(Clone)]
pub struct PluginResolver {
    registry: Arc<dyn PluginRegistryClient>,
    labels: Tags,
    static_endpoint: Option<PluginEndpoint>,
    span: tracing::Span,
}

impl PluginResolver {
    pub fn new(registry: Arc<dyn PluginRegistryClient>) -> Self {
        Self {
            registry,
            labels: Tags::new(),
            static_endpoint: None,
            span: tracing::info_span!("plugin_resolver"),
        }
    }

    /// Labels attached to every resolution request.
    pub fn with_labels(mut self, labels: Tags) -> Self {
        self.labels = labels;
        self
    }

    /// Pin every resolution to `uri`.
    pub fn with_static_endpoint(mut self, uri: &str) -> Result<Self, StrataError> {
        let endpoint = parse_endpoint(uri)
            .map_err(|reason| StrataError::connector_config("PluginConnector", reason))?;
        self.static_endpoint = Some(endpoint);
        Ok(self)
    }

    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub async fn resolve(
        &self,
        plugin_id: &str,
        version: &str,
        domain_id: &str,
    ) -> Result<PluginEndpoint, StrataError> {
        async {
            if let Some(endpoint) = &self.static_endpoint {
                debug!(plugin_id, version, %endpoint, "using static plugin endpoint");
                return Ok(endpoint.clone());
            }

            let failed = |reason: String| StrataError::Resolution {
                plugin_id: plugin_id.to_string(),
                version: version.to_string(),
                reason,
            };

            let uri = self
                .registry
                .resolve_endpoint(plugin_id, version, domain_id, &self.labels)
                .await
                .map_err(|e| {
                    warn!(plugin_id, version, error = %e, "plugin registry call failed");
                    failed(e.to_string())
                })?
                .ok_or_else(|| failed("registry returned no endpoint".to_string()))?;

            let endpoint = parse_endpoint(&uri).map_err(failed)?;
            debug!(plugin_id, version, %endpoint, "plugin endpoint resolved");
            Ok(endpoint)
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
    async fn resolves_through_registry() {
        let registry = Arc::new(
            MockPluginRegistry::new().with_endpoint("plugin-abc", "1.1", "http://p1.local:8080"),
        );
        let resolver = PluginResolver::new(registry.clone());

        let endpoint = resolver.resolve("plugin-abc", "1.1", "dom-1").await.unwrap();
        assert_eq!(endpoint.host, "p1.local");
        assert_eq!(endpoint.port, 8080);

        let calls = registry.resolve_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].domain_id, "dom-1");
        assert!(calls[0].labels.is_empty());
    }

    #[tokio::test]
    async fn repeated_resolution_is_not_cached() {
        let registry = Arc::new(
            MockPluginRegistry::new().with_endpoint("plugin-abc", "1.1", "http://p1.local:8080"),
        );
        let resolver = PluginResolver::new(registry.clone());

        let first = resolver.resolve("plugin-abc", "1.1", "dom-1").await.unwrap();
        let second = resolver.resolve("plugin-abc", "1.1", "dom-1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.resolve_calls().len(), 2);
    }

    #[tokio::test]
    async fn labels_are_forwarded() {
        let registry = Arc::new(
            MockPluginRegistry::new().with_endpoint("plugin-abc", "1.1", "http://p1.local:8080"),
        );
        let labels = Tags::from([("region".to_string(), "eu".to_string())]);
        let resolver = PluginResolver::new(registry.clone()).with_labels(labels.clone());

        resolver.resolve("plugin-abc", "1.1", "dom-1").await.unwrap();
        assert_eq!(registry.resolve_calls()[0].labels, labels);
    }

    #[tokio::test]
    async fn unknown_plugin_is_resolution_error() {
        let resolver = PluginResolver::new(Arc::new(MockPluginRegistry::new()));
        let err = resolver.resolve("plugin-abc", "9.9", "dom-1").await.unwrap_err();
        assert_eq!(err.code(), "ERROR_PLUGIN_RESOLUTION");
        assert!(err.to_string().contains("no endpoint"));
    }

    #[tokio::test]
    async fn unreachable_registry_is_resolution_error() {
        let registry = Arc::new(
            MockPluginRegistry::new()
                .with_endpoint("plugin-abc", "1.1", "http://p1.local:8080")
                .unreachable(),
        );
        let err = PluginResolver::new(registry)
            .resolve("plugin-abc", "1.1", "dom-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::Resolution { .. }));
    }

    #[tokio::test]
    async fn unparseable_endpoint_is_resolution_error() {
        let registry =
            Arc::new(MockPluginRegistry::new().with_endpoint("plugin-abc", "1.1", "p1.local"));
        let err = PluginResolver::new(registry)
            .resolve("plugin-abc", "1.1", "dom-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::Resolution { .. }));
    }

    #[tokio::test]
    async fn static_endpoint_skips_registry() {
        let registry = Arc::new(MockPluginRegistry::new());
        let resolver = PluginResolver::new(registry.clone())
            .with_static_endpoint("http://127.0.0.1:50060")
            .unwrap();

        let endpoint = resolver.resolve("plugin-abc", "1.1", "dom-1").await.unwrap();
        assert_eq!(endpoint.port, 50060);
        assert!(registry.resolve_calls().is_empty());
    }

    #[test]
    fn bad_static_endpoint_is_configuration_error() {
        let err = PluginResolver::new(Arc::new(MockPluginRegistry::new()))
            .with_static_endpoint("127.0.0.1")
            .err()
            .unwrap();
        assert_eq!(err.code(), "ERROR_CONNECTOR_CONFIGURATION");
    }
}
