// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock credential store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use strata_core::traits::{Connector, CredentialStore};
use strata_core::types::{
    Condition, NewCredential, Operator, SecretList, SecretQuery, SecretSummary,
};
use strata_core::{ConnectorType, JsonMap, StrataError};

use crate::lock;

/// A credential record held by [`MockCredentialStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredSecret {
    pub secret_id: String,
    pub name: String,
    pub data: JsonMap,
    pub schema: Option<String>,
    pub provider: Option<String>,
    pub service_account_id: Option<String>,
    pub domain_id: String,
}

impl StoredSecret {
    fn field(&self, key: &str) -> Option<&str> {
        match key {
            "secret_id" => Some(&self.secret_id),
            "name" => Some(&self.name),
            "schema" => self.schema.as_deref(),
            "provider" => self.provider.as_deref(),
            "service_account_id" => self.service_account_id.as_deref(),
            _ => None,
        }
    }

    fn matches(&self, condition: &Condition) -> bool {
        let Some(actual) = self.field(&condition.k) else {
            return false;
        };
        match (&condition.o, &condition.v) {
            (Operator::Eq, Value::String(expected)) => actual == expected,
            (Operator::In, Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(actual)),
            _ => false,
        }
    }
}

#[derive(Default)]
pub struct MockCredentialStore {
    secrets: Mutex<Vec<StoredSecret>>,
    created: Mutex<Vec<NewCredential>>,
    queries: Mutex<Vec<SecretQuery>>,
    next_id: AtomicU64,
    fail_create: AtomicBool,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, secret: StoredSecret) -> Self {
        lock(&self.secrets).push(secret);
        self
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Every credential passed to `create`, in call order.
    pub fn created(&self) -> Vec<NewCredential> {
        lock(&self.created).clone()
    }

    /// Every query passed to `list`, in call order.
    pub fn queries(&self) -> Vec<SecretQuery> {
        lock(&self.queries).clone()
    }

    pub fn secrets(&self) -> Vec<StoredSecret> {
        lock(&self.secrets).clone()
    }
}

impl Connector for MockCredentialStore {
    fn name(&self) -> &str {
        "mock-credentials"
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::CredentialStore
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn create(&self, credential: NewCredential) -> Result<String, StrataError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(StrataError::Transport {
                service: "secret".to_string(),
                message: "credential store unavailable".to_string(),
                source: None,
            });
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let secret_id = format!("secret-{n:04}");
        lock(&self.secrets).push(StoredSecret {
            secret_id: secret_id.clone(),
            name: credential.name.clone(),
            data: credential.data.clone(),
            schema: credential.schema.clone(),
            provider: None,
            service_account_id: None,
            domain_id: credential.domain_id.clone(),
        });
        lock(&self.created).push(credential);
        Ok(secret_id)
    }

    async fn list(&self, query: &SecretQuery, domain_id: &str) -> Result<SecretList, StrataError> {
        lock(&self.queries).push(query.clone());
        let results: Vec<SecretSummary> = lock(&self.secrets)
            .iter()
            .filter(|s| s.domain_id == domain_id)
            .filter(|s| query.filter.iter().all(|c| s.matches(c)))
            .map(|s| SecretSummary {
                secret_id: s.secret_id.clone(),
                name: s.name.clone(),
                schema: s.schema.clone(),
                provider: s.provider.clone(),
            })
            .collect();
        Ok(SecretList {
            total_count: results.len() as u64,
            results,
        })
    }

    async fn get_data(
        &self,
        secret_id: &str,
        domain_id: &str,
    ) -> Result<Option<JsonMap>, StrataError> {
        Ok(lock(&self.secrets)
            .iter()
            .find(|s| s.secret_id == secret_id && s.domain_id == domain_id)
            .map(|s| s.data.clone()))
    }
}
