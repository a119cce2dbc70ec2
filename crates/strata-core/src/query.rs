// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update, query, and statistics request types for the persistence collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{JsonMap, PluginInfo, StorageResource, StorageState, Tags};

/// Field-level update applied to a stored resource. `None` leaves a field untouched;
/// for nullable columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageUpdate {
    pub name: Option<String>,
    pub state: Option<StorageState>,
    pub tags: Option<Tags>,
    pub capability: Option<Option<JsonMap>>,
    pub plugin_info: Option<PluginInfo>,
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

impl StorageUpdate {
    pub fn state(state: StorageState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// An update that writes every mutable field back from a snapshot.
    pub fn from_snapshot(snapshot: &StorageResource) -> Self {
        Self {
            name: Some(snapshot.name.clone()),
            state: Some(snapshot.state),
            tags: Some(snapshot.tags.clone()),
            capability: Some(snapshot.capability.clone()),
            plugin_info: Some(snapshot.plugin_info.clone()),
            deleted_at: Some(snapshot.deleted_at),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply this update to an in-memory resource.
    pub fn apply(self, resource: &mut StorageResource) {
        if let Some(name) = self.name {
            resource.name = name;
        }
        if let Some(state) = self.state {
            resource.state = state;
        }
        if let Some(tags) = self.tags {
            resource.tags = tags;
        }
        if let Some(capability) = self.capability {
            resource.capability = capability;
        }
        if let Some(plugin_info) = self.plugin_info {
            resource.plugin_info = plugin_info;
        }
        if let Some(deleted_at) = self.deleted_at {
            resource.deleted_at = deleted_at;
        }
    }
}

/// Sortable columns for storage listings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    StorageId,
    Name,
    State,
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    #[serde(default)]
    pub key: SortKey,
    #[serde(default)]
    pub desc: bool,
}

/// Offset pagination; `start` is 1-based like the listing API it serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default = "default_start")]
    pub start: u64,
    pub limit: u64,
}

fn default_start() -> u64 {
    1
}

/// Listing filter for storage resources within one domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageQuery {
    pub domain_id: String,
    #[serde(default)]
    pub storage_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<StorageState>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub plugin_id: Option<String>,
    /// Every listed tag must match exactly.
    #[serde(default)]
    pub tags: Tags,
    /// Case-insensitive substring match on `storage_id` or `name`.
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub page: Option<Page>,
}

impl StorageQuery {
    pub fn for_domain(domain_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            ..Self::default()
        }
    }
}

/// Column a statistics request groups by.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatGroupBy {
    #[default]
    State,
    PluginId,
    UserId,
}

/// Group-by count aggregation over one domain's storages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatQuery {
    pub domain_id: String,
    #[serde(default)]
    pub group_by: StatGroupBy,
    #[serde(default)]
    pub state: Option<StorageState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBucket {
    pub key: String,
    pub count: u64,
}
