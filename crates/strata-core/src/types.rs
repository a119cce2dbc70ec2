// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the orchestrator and its collaborators.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque JSON object (plugin options, metadata, capability, credential data).
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Caller-supplied tags. Keys are unique, values are plain strings.
pub type Tags = BTreeMap<String, String>;

/// Secret type used when provisioning plugin credentials.
pub const CREDENTIALS_SECRET_TYPE: &str = "CREDENTIALS";

/// Lifecycle state of a registered storage resource.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageState {
    #[default]
    Enabled,
    Disabled,
}

/// Plugin binding embedded in a storage resource.
///
/// Only the credential reference is kept here; the secret itself lives in
/// the external credential store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub plugin_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(default)]
    pub options: JsonMap,
    #[serde(default)]
    pub metadata: JsonMap,
    /// Provider used by the resource-secret lookup policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// The aggregate root: a tenant's binding to a plugin-backed storage backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageResource {
    pub storage_id: String,
    pub name: String,
    pub state: StorageState,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<JsonMap>,
    pub plugin_info: PluginInfo,
    pub domain_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StorageResource {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Generate a new storage identifier (`sto-` followed by 12 hex digits).
pub fn generate_storage_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("sto-{}", &hex[..12])
}

/// Capability flags read from a plugin's metadata.
///
/// Parsing is lenient: structural checks happen when plugin metadata is
/// validated, so a stored capability map is trusted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capability {
    pub supported_schema: Vec<String>,
    pub use_resource_secret: bool,
}

impl Capability {
    pub fn from_map(map: Option<&JsonMap>) -> Self {
        let Some(map) = map else {
            return Self::default();
        };
        let supported_schema = map
            .get("supported_schema")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|s| s.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let use_resource_secret = map
            .get("use_resource_secret")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Self {
            supported_schema,
            use_resource_secret,
        }
    }
}

/// Secret material supplied with a register request.
///
/// Never persisted on a storage resource. `Debug` output omits the data.
#[derive(Clone, Default, Deserialize)]
pub struct SecretData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<JsonMap>,
    #[serde(default)]
    pub schema: Option<String>,
}

impl std::fmt::Debug for SecretData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretData")
            .field("name", &self.name)
            .field("data", &self.data.as_ref().map(|_| "[REDACTED]"))
            .field("schema", &self.schema)
            .finish()
    }
}

/// A credential record to be created in the external credential store.
#[derive(Clone, Serialize)]
pub struct NewCredential {
    pub name: String,
    pub data: JsonMap,
    pub secret_type: String,
    pub domain_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl std::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCredential")
            .field("name", &self.name)
            .field("data", &"[REDACTED]")
            .field("secret_type", &self.secret_type)
            .field("domain_id", &self.domain_id)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Summary of a credential record returned by a credential-store listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSummary {
    pub secret_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

/// Result of a credential-store listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretList {
    #[serde(default)]
    pub results: Vec<SecretSummary>,
    #[serde(default)]
    pub total_count: u64,
}

/// Comparison operator of a secret query condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    In,
}

/// A single `{k, v, o}` filter condition sent to the credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub k: String,
    pub v: serde_json::Value,
    pub o: Operator,
}

/// Filter query sent to the credential store's `list` operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretQuery {
    pub filter: Vec<Condition>,
}

/// Network location of a plugin instance, resolved per operation and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginEndpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl PluginEndpoint {
    /// Base URL for HTTP calls against this endpoint.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl std::fmt::Display for PluginEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// Identifies the kind of external collaborator behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ConnectorType {
    Repository,
    PluginRegistry,
    Plugin,
    CredentialStore,
}
