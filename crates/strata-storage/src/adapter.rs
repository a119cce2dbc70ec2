// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`StorageRepository`].

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use strata_config::model::StorageConfig;
use strata_core::traits::{Connector, StorageRepository};
use strata_core::{
    ConnectorType, StatBucket, StatQuery, StorageQuery, StorageResource, StorageUpdate,
    StrataError,
};

use crate::database::Database;
use crate::queries::storages;

/// SQLite-backed storage repository.
///
/// The database is opened by [`SqliteStorage::initialize`]; every other
/// call fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, StrataError> {
        self.db.get().ok_or_else(|| StrataError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Open the database and run migrations. Fails if called twice.
    pub async fn initialize(&self) -> Result<(), StrataError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| StrataError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), StrataError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

impl Connector for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::Repository
    }
}

#[async_trait]
impl StorageRepository for SqliteStorage {
    async fn create(&self, resource: &StorageResource) -> Result<StorageResource, StrataError> {
        storages::insert_storage(self.db()?, resource).await?;
        debug!(storage_id = %resource.storage_id, "storage row inserted");
        Ok(resource.clone())
    }

    async fn get(
        &self,
        storage_id: &str,
        domain_id: &str,
    ) -> Result<Option<StorageResource>, StrataError> {
        storages::get_storage(self.db()?, storage_id, domain_id).await
    }

    async fn update(
        &self,
        storage_id: &str,
        domain_id: &str,
        update: StorageUpdate,
    ) -> Result<StorageResource, StrataError> {
        storages::update_storage(self.db()?, storage_id, domain_id, update)
            .await?
            .ok_or_else(|| StrataError::not_found("storage_id", storage_id))
    }

    async fn remove(&self, storage_id: &str, domain_id: &str) -> Result<(), StrataError> {
        let removed = storages::delete_storage(self.db()?, storage_id, domain_id).await?;
        debug!(storage_id, removed, "storage row removed");
        Ok(())
    }

    async fn query(
        &self,
        query: &StorageQuery,
    ) -> Result<(Vec<StorageResource>, u64), StrataError> {
        storages::query_storages(self.db()?, query).await
    }

    async fn stat(&self, query: &StatQuery) -> Result<Vec<StatBucket>, StrataError> {
        storages::stat_storages(self.db()?, query).await
    }
}
