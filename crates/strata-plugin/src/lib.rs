// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin-side collaborators of the registration orchestrator.
//!
//! - [`PluginResolver`] turns a plugin id and version into a network endpoint.
//! - [`VersionValidator`] checks a version against the published list.
//! - [`validate_plugin_metadata`] checks what a plugin returns from `initialize`.
//! - [`HttpPluginRegistry`] and [`HttpPluginConnector`] are the JSON-over-HTTP
//!   implementations of the registry and plugin runtime traits.

pub mod client;
pub mod endpoint;
pub mod metadata;
pub mod registry;
pub mod resolver;
pub mod transport;
pub mod version;

pub use client::{HttpPluginClient, HttpPluginConnector};
pub use endpoint::{parse_endpoint, single_endpoint};
pub use metadata::{PluginMetadata, validate_plugin_metadata};
pub use registry::HttpPluginRegistry;
pub use resolver::PluginResolver;
pub use version::VersionValidator;
