// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Strata storage registration service.
//!
//! This crate provides the error taxonomy, the domain types, and the
//! collaborator traits that the orchestrator is written against. Concrete
//! connectors and repositories live in their own crates and implement the
//! traits defined here.

pub mod error;
pub mod query;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StrataError;
pub use query::{StatBucket, StatQuery, StorageQuery, StorageUpdate};
pub use types::{
    Capability, ConnectorType, JsonMap, PluginEndpoint, PluginInfo, SecretData, StorageResource,
    StorageState, Tags,
};

pub use traits::{
    Connector, CredentialStore, PluginClient, PluginConnector, PluginRegistryClient,
    StorageRepository,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_type_round_trips_through_strings() {
        use std::str::FromStr;

        let variants = [
            ConnectorType::Repository,
            ConnectorType::PluginRegistry,
            ConnectorType::Plugin,
            ConnectorType::CredentialStore,
        ];
        for variant in &variants {
            let parsed = ConnectorType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn all_collaborator_traits_are_object_safe() {
        fn _repository(_: &dyn StorageRepository) {}
        fn _registry(_: &dyn PluginRegistryClient) {}
        fn _connector(_: &dyn PluginConnector) {}
        fn _client(_: &dyn PluginClient) {}
        fn _store(_: &dyn CredentialStore) {}
    }
}
