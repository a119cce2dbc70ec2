// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External credential store.

use async_trait::async_trait;

use crate::error::StrataError;
use crate::traits::connector::Connector;
use crate::types::{JsonMap, NewCredential, SecretList, SecretQuery};

/// Store that owns credential records. Strata only ever creates and reads.
#[async_trait]
pub trait CredentialStore: Connector {
    /// Creates a credential record and returns its `secret_id`.
    async fn create(&self, credential: NewCredential) -> Result<String, StrataError>;

    async fn list(&self, query: &SecretQuery, domain_id: &str) -> Result<SecretList, StrataError>;

    /// Returns the credential payload, or `None` if no such record exists.
    async fn get_data(
        &self,
        secret_id: &str,
        domain_id: &str,
    ) -> Result<Option<JsonMap>, StrataError>;
}
