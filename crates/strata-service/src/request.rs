// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request payloads accepted by the orchestrator.
//!
//! Presence checks happen in the orchestrator so that a missing field is
//! reported as `RequiredParameter` rather than a decode error.

use serde::Deserialize;
use strata_core::{JsonMap, SecretData, Tags};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub plugin_info: RegisterPluginInfo,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default)]
    pub user_id: String,
}

/// Plugin section of a register request. Carries the raw secret material,
/// which never reaches the stored `PluginInfo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterPluginInfo {
    #[serde(default)]
    pub plugin_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub options: JsonMap,
    #[serde(default)]
    pub secret_data: Option<SecretData>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequest {
    #[serde(default)]
    pub storage_id: String,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Replaces the tag map wholesale.
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePluginRequest {
    #[serde(default)]
    pub storage_id: String,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default)]
    pub version: Option<String>,
    /// `Some({})` clears the options, `None` keeps them.
    #[serde(default)]
    pub options: Option<JsonMap>,
}

/// Addresses a single storage resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageRef {
    pub storage_id: String,
    pub domain_id: String,
}

impl StorageRef {
    pub fn new(storage_id: impl Into<String>, domain_id: impl Into<String>) -> Self {
        Self {
            storage_id: storage_id.into(),
            domain_id: domain_id.into(),
        }
    }
}
