// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Strata.
//!
//! Recording in-memory implementations of every collaborator trait, plus a
//! [`TestHarness`] that wires them together (optionally over a temporary
//! SQLite database) so tests run without external services.
//!
//! - [`InMemoryRepository`] - `StorageRepository` with a write log and failure injection
//! - [`MockPluginRegistry`] - endpoint and version lookups from fixed tables
//! - [`MockPluginConnector`] - plugin runtime returning configured metadata
//! - [`MockCredentialStore`] - credential store evaluating `{k, v, o}` filters

pub mod harness;
pub mod mock_credentials;
pub mod mock_plugin;
pub mod mock_registry;
pub mod mock_repository;

pub use harness::{TestHarness, TestHarnessBuilder, plugin_endpoint_uri};
pub use mock_credentials::{MockCredentialStore, StoredSecret};
pub use mock_plugin::{MockPluginConnector, VerifyCall};
pub use mock_registry::{MockPluginRegistry, ResolveCall};
pub use mock_repository::{InMemoryRepository, RepositoryWrite};

use std::sync::{Mutex, MutexGuard};

use strata_core::JsonMap;

/// Build a [`JsonMap`] from a `json!` object literal. Non-objects yield an empty map.
pub fn json_map(value: serde_json::Value) -> JsonMap {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

/// Lock a mock's state, ignoring poisoning from a panicked test thread.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
