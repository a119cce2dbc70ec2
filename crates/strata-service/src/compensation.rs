// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-call undo log for repository writes.
//!
//! An orchestrator call records one [`Compensation`] after each repository
//! write it makes. If the call fails, the entries run newest first; on
//! success the log is dropped. Only local persisted state is undone; calls
//! already made to external services stay made.

use strata_core::traits::StorageRepository;
use strata_core::{StorageResource, StorageUpdate, StrataError};
use tracing::{error, info, warn};

/// A single undo step.
#[derive(Debug, Clone, PartialEq)]
pub enum Compensation {
    /// Physically remove a record created by this call.
    RemoveStorage {
        storage_id: String,
        domain_id: String,
    },
    /// Write back every mutable field from a snapshot taken before this call.
    RestoreStorage(Box<StorageResource>),
}

impl Compensation {
    fn storage_id(&self) -> &str {
        match self {
            Self::RemoveStorage { storage_id, .. } => storage_id,
            Self::RestoreStorage(snapshot) => &snapshot.storage_id,
        }
    }

    async fn apply(&self, repository: &dyn StorageRepository) -> Result<(), StrataError> {
        match self {
            Self::RemoveStorage {
                storage_id,
                domain_id,
            } => repository.remove(storage_id, domain_id).await,
            Self::RestoreStorage(snapshot) => repository
                .update(
                    &snapshot.storage_id,
                    &snapshot.domain_id,
                    StorageUpdate::from_snapshot(snapshot),
                )
                .await
                .map(|_| ()),
        }
    }
}

#[derive(Debug, Default)]
pub struct CompensationLog {
    entries: Vec<Compensation>,
}

impl CompensationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, compensation: Compensation) {
        self.entries.push(compensation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every entry newest first. Failures are logged and skipped.
    pub async fn unwind(self, repository: &dyn StorageRepository) {
        for compensation in self.entries.into_iter().rev() {
            let storage_id = compensation.storage_id().to_string();
            match compensation.apply(repository).await {
                Ok(()) => info!(storage_id = %storage_id, ?compensation, "compensation applied"),
                Err(e) => error!(
                    storage_id = %storage_id,
                    error = %e,
                    "compensation failed, record may be left inconsistent"
                ),
            }
        }
    }
}

/// Run `body` with a fresh [`CompensationLog`], unwinding it if `body` fails.
///
/// The original error is always returned, whatever the undo steps do.
pub async fn run_compensated<T, F>(
    repository: &dyn StorageRepository,
    body: F,
) -> Result<T, StrataError>
where
    F: AsyncFnOnce(&mut CompensationLog) -> Result<T, StrataError>,
{
    let mut log = CompensationLog::new();
    match body(&mut log).await {
        Ok(value) => Ok(value),
        Err(e) => {
            if !log.is_empty() {
                warn!(error = %e, steps = log.len(), "operation failed, rolling back");
                log.unwind(repository).await;
            }
            Err(e)
        }
    }
}
