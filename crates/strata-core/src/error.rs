// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Strata storage service.

use thiserror::Error;

/// The primary error type used across collaborator traits and the orchestrator.
#[derive(Debug, Error)]
pub enum StrataError {
    /// A mandatory request field is missing or empty.
    #[error("required parameter is missing (key = {key})")]
    RequiredParameter { key: String },

    /// The requested plugin version is not published by the registry.
    #[error("plugin version is invalid (plugin_id = {plugin_id}, version = {version})")]
    InvalidPluginVersion { plugin_id: String, version: String },

    /// Metadata returned by a plugin failed structural validation.
    #[error("the options received from the plugin are invalid (reason = {reason})")]
    InvalidPluginOptions { reason: String },

    /// A referenced storage resource or credential does not exist.
    #[error("resource not found ({key} = {value})")]
    ResourceNotFound { key: String, value: String },

    /// A resource-scoped secret search returned no results.
    #[error("secrets for resource do not exist (resource_id = {resource_id})")]
    ResourceSecretsNotExist { resource_id: String },

    /// No credential matches the plugin's supported schemas and provider.
    #[error("supported secrets do not exist (plugin_id = {plugin_id}, provider = {provider})")]
    SupportedSecretsNotExist { plugin_id: String, provider: String },

    /// Disable or deregister was requested on a resource that is already disabled.
    #[error("storage is already disabled (storage_id = {storage_id})")]
    AlreadyDisabled { storage_id: String },

    /// The plugin endpoint could not be resolved.
    #[error("failed to resolve plugin endpoint (plugin_id = {plugin_id}, version = {version}): {reason}")]
    Resolution {
        plugin_id: String,
        version: String,
        reason: String,
    },

    /// An external-service connector is misconfigured.
    #[error("connector configuration error ({backend}): {reason}")]
    ConnectorConfiguration { backend: String, reason: String },

    /// The plugin rejected the credential during verification.
    #[error("plugin verification failed: {reason}")]
    Verification { reason: String },

    /// A request body could not be decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport-level failure talking to an external service.
    #[error("{service} request failed: {message}")]
    Transport {
        service: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StrataError {
    #[must_use]
    pub fn required(key: impl Into<String>) -> Self {
        Self::RequiredParameter { key: key.into() }
    }

    #[must_use]
    pub fn not_found(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn connector_config(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectorConfiguration {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code exposed to callers of the service boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequiredParameter { .. } => "ERROR_REQUIRED_PARAMETER",
            Self::InvalidPluginVersion { .. } => "ERROR_INVALID_PLUGIN_VERSION",
            Self::InvalidPluginOptions { .. } => "ERROR_INVALID_PLUGIN_OPTIONS",
            Self::ResourceNotFound { .. } => "ERROR_NOT_FOUND",
            Self::ResourceSecretsNotExist { .. } => "ERROR_RESOURCE_SECRETS_NOT_EXISTS",
            Self::SupportedSecretsNotExist { .. } => "ERROR_SUPPORTED_SECRETS_NOT_EXISTS",
            Self::AlreadyDisabled { .. } => "ERROR_ALREADY_DISABLED",
            Self::Resolution { .. } => "ERROR_PLUGIN_RESOLUTION",
            Self::ConnectorConfiguration { .. } => "ERROR_CONNECTOR_CONFIGURATION",
            Self::Verification { .. } => "ERROR_PLUGIN_VERIFICATION",
            Self::InvalidRequest(_) => "ERROR_INVALID_REQUEST",
            Self::Config(_) => "ERROR_CONFIGURATION",
            Self::Storage { .. } => "ERROR_STORAGE",
            Self::Transport { .. } => "ERROR_TRANSPORT",
            Self::Internal(_) => "ERROR_INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = StrataError::InvalidPluginVersion {
            plugin_id: "plugin-abc".into(),
            version: "2.0".into(),
        };
        assert_eq!(
            err.to_string(),
            "plugin version is invalid (plugin_id = plugin-abc, version = 2.0)"
        );

        let err = StrataError::required("plugin_info.secret_data");
        assert!(err.to_string().contains("plugin_info.secret_data"));
    }

    #[test]
    fn codes_are_distinct_per_kind() {
        let errors = [
            StrataError::required("k"),
            StrataError::not_found("storage_id", "sto-1"),
            StrataError::AlreadyDisabled {
                storage_id: "sto-1".into(),
            },
            StrataError::connector_config("PluginConnector", "no endpoint"),
            StrataError::Verification {
                reason: "denied".into(),
            },
        ];
        let codes: std::collections::HashSet<&str> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }
}
