// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `StorageRepository` with a write log.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use strata_core::query::{SortKey, StatGroupBy};
use strata_core::traits::{Connector, StorageRepository};
use strata_core::{
    ConnectorType, StatBucket, StatQuery, StorageQuery, StorageResource, StorageUpdate,
    StrataError,
};

use crate::lock;

/// One mutating call that reached the repository.
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryWrite {
    Create(String),
    Update(String, StorageUpdate),
    Remove(String),
}

#[derive(Default)]
pub struct InMemoryRepository {
    records: Mutex<BTreeMap<String, StorageResource>>,
    writes: Mutex<Vec<RepositoryWrite>>,
    fail_writes: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every create, update, and remove fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<RepositoryWrite> {
        lock(&self.writes).clone()
    }

    /// The raw stored record, soft-deleted or not.
    pub fn record(&self, storage_id: &str) -> Option<StorageResource> {
        lock(&self.records).get(storage_id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), StrataError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StrataError::Storage {
                source: "injected write failure".into(),
            });
        }
        Ok(())
    }
}

impl Connector for InMemoryRepository {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::Repository
    }
}

fn matches(resource: &StorageResource, query: &StorageQuery) -> bool {
    if resource.domain_id != query.domain_id || resource.is_deleted() {
        return false;
    }
    let eq = |want: &Option<String>, have: &str| want.as_deref().is_none_or(|w| w == have);
    if !eq(&query.storage_id, &resource.storage_id)
        || !eq(&query.name, &resource.name)
        || !eq(&query.user_id, &resource.user_id)
        || !eq(&query.plugin_id, &resource.plugin_info.plugin_id)
    {
        return false;
    }
    if query.state.is_some_and(|s| s != resource.state) {
        return false;
    }
    if !query
        .tags
        .iter()
        .all(|(k, v)| resource.tags.get(k) == Some(v))
    {
        return false;
    }
    match &query.keyword {
        Some(keyword) => {
            let keyword = keyword.to_lowercase();
            resource.storage_id.to_lowercase().contains(&keyword)
                || resource.name.to_lowercase().contains(&keyword)
        }
        None => true,
    }
}

#[async_trait]
impl StorageRepository for InMemoryRepository {
    async fn create(&self, resource: &StorageResource) -> Result<StorageResource, StrataError> {
        self.check_writable()?;
        lock(&self.records).insert(resource.storage_id.clone(), resource.clone());
        lock(&self.writes).push(RepositoryWrite::Create(resource.storage_id.clone()));
        Ok(resource.clone())
    }

    async fn get(
        &self,
        storage_id: &str,
        domain_id: &str,
    ) -> Result<Option<StorageResource>, StrataError> {
        Ok(lock(&self.records)
            .get(storage_id)
            .filter(|r| r.domain_id == domain_id)
            .cloned())
    }

    async fn update(
        &self,
        storage_id: &str,
        domain_id: &str,
        update: StorageUpdate,
    ) -> Result<StorageResource, StrataError> {
        self.check_writable()?;
        let mut records = lock(&self.records);
        let record = records
            .get_mut(storage_id)
            .filter(|r| r.domain_id == domain_id)
            .ok_or_else(|| StrataError::not_found("storage_id", storage_id))?;
        lock(&self.writes).push(RepositoryWrite::Update(storage_id.to_string(), update.clone()));
        update.apply(record);
        Ok(record.clone())
    }

    async fn remove(&self, storage_id: &str, domain_id: &str) -> Result<(), StrataError> {
        self.check_writable()?;
        let mut records = lock(&self.records);
        if records
            .get(storage_id)
            .is_some_and(|r| r.domain_id == domain_id)
        {
            records.remove(storage_id);
        }
        lock(&self.writes).push(RepositoryWrite::Remove(storage_id.to_string()));
        Ok(())
    }

    async fn query(
        &self,
        query: &StorageQuery,
    ) -> Result<(Vec<StorageResource>, u64), StrataError> {
        let mut found: Vec<StorageResource> = lock(&self.records)
            .values()
            .filter(|r| matches(r, query))
            .cloned()
            .collect();

        let sort = query.sort.unwrap_or_default();
        found.sort_by(|a, b| {
            let ord = match sort.key {
                SortKey::StorageId => a.storage_id.cmp(&b.storage_id),
                SortKey::Name => a.name.cmp(&b.name),
                SortKey::State => a.state.to_string().cmp(&b.state.to_string()),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            if sort.desc { ord.reverse() } else { ord }
        });

        let total = found.len() as u64;
        if let Some(page) = query.page {
            let skip = page.start.saturating_sub(1) as usize;
            found = found.into_iter().skip(skip).take(page.limit as usize).collect();
        }
        Ok((found, total))
    }

    async fn stat(&self, query: &StatQuery) -> Result<Vec<StatBucket>, StrataError> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for record in lock(&self.records).values() {
            if record.domain_id != query.domain_id || record.is_deleted() {
                continue;
            }
            if query.state.is_some_and(|s| s != record.state) {
                continue;
            }
            let key = match query.group_by {
                StatGroupBy::State => record.state.to_string(),
                StatGroupBy::PluginId => record.plugin_info.plugin_id.clone(),
                StatGroupBy::UserId => record.user_id.clone(),
            };
            *counts.entry(key).or_default() += 1;
        }
        let mut buckets: Vec<StatBucket> = counts
            .into_iter()
            .map(|(key, count)| StatBucket { key, count })
            .collect();
        buckets.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(buckets)
    }
}
