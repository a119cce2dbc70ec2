// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence collaborator for storage resources.

use async_trait::async_trait;

use crate::error::StrataError;
use crate::query::{StatBucket, StatQuery, StorageQuery, StorageUpdate};
use crate::traits::connector::Connector;
use crate::types::StorageResource;

/// Keyed store of [`StorageResource`] records scoped by domain.
///
/// Soft-deleted records (`deleted_at` set) are only reachable through
/// [`StorageRepository::get`]; `query` and `stat` skip them.
#[async_trait]
pub trait StorageRepository: Connector {
    /// Inserts a new record and returns it as stored.
    async fn create(&self, resource: &StorageResource) -> Result<StorageResource, StrataError>;

    /// Fetches one record, or `None` when the id is unknown in this domain.
    async fn get(
        &self,
        storage_id: &str,
        domain_id: &str,
    ) -> Result<Option<StorageResource>, StrataError>;

    /// Applies a field-level update and returns the new record.
    ///
    /// Fails with `ResourceNotFound` if the record does not exist.
    async fn update(
        &self,
        storage_id: &str,
        domain_id: &str,
        update: StorageUpdate,
    ) -> Result<StorageResource, StrataError>;

    /// Physically removes a record. Removing an unknown id is not an error.
    async fn remove(&self, storage_id: &str, domain_id: &str) -> Result<(), StrataError>;

    /// Filtered, sorted, paginated listing plus the total match count.
    async fn query(
        &self,
        query: &StorageQuery,
    ) -> Result<(Vec<StorageResource>, u64), StrataError>;

    /// Group-by counts.
    async fn stat(&self, query: &StatQuery) -> Result<Vec<StatBucket>, StrataError>;
}
