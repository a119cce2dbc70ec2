// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! Every external dependency of the orchestrator is reached through one of
//! these traits. All of them use `#[async_trait]` so they can be held as
//! `Arc<dyn Trait>`.

pub mod connector;
pub mod plugin;
pub mod secret;
pub mod storage;

pub use connector::Connector;
pub use plugin::{PluginClient, PluginConnector, PluginRegistryClient};
pub use secret::CredentialStore;
pub use storage::StorageRepository;
