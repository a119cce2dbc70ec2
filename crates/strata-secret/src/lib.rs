// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential provisioning and lookup.
//!
//! [`CredentialProvisioner`] creates credential records during registration
//! and resolves credential data for verification under two lookup policies.
//! [`HttpCredentialStore`] is the JSON-over-HTTP credential store connector.

pub mod http;
pub mod provisioner;
pub mod query;

pub use http::HttpCredentialStore;
pub use provisioner::CredentialProvisioner;
pub use query::SecretFilter;
