// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filter builder for credential-store listings.

use serde_json::Value;
use strata_core::types::{Condition, Operator, SecretQuery};

/// Criteria for a credential-store search. Unset fields add no condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretFilter {
    /// Accepted schemas (`schema IN ...`). Empty means any schema.
    pub schemas: Vec<String>,
    pub secret_id: Option<String>,
    pub service_account_id: Option<String>,
    /// Candidate ids (`secret_id IN ...`).
    pub secret_ids: Vec<String>,
    pub provider: Option<String>,
}

impl SecretFilter {
    pub fn to_query(&self) -> SecretQuery {
        let mut filter = Vec::new();
        let mut push = |k: &str, v: Value, o: Operator| {
            filter.push(Condition {
                k: k.to_string(),
                v,
                o,
            })
        };

        if !self.schemas.is_empty() {
            push("schema", strings(&self.schemas), Operator::In);
        }
        if let Some(secret_id) = &self.secret_id {
            push("secret_id", Value::from(secret_id.as_str()), Operator::Eq);
        }
        if let Some(account) = &self.service_account_id {
            push("service_account_id", Value::from(account.as_str()), Operator::Eq);
        }
        if !self.secret_ids.is_empty() {
            push("secret_id", strings(&self.secret_ids), Operator::In);
        }
        if let Some(provider) = &self.provider {
            push("provider", Value::from(provider.as_str()), Operator::Eq);
        }

        SecretQuery { filter }
    }
}

fn strings(values: &[String]) -> Value {
    Value::Array(values.iter().map(|v| Value::from(v.as_str())).collect())
}
