// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of [`CredentialStore`].

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use strata_config::ConnectorConfig;
use strata_core::traits::{Connector, CredentialStore};
use strata_core::types::{NewCredential, SecretList, SecretQuery};
use strata_core::{ConnectorType, JsonMap, StrataError};
use strata_plugin::endpoint::single_endpoint;
use strata_plugin::transport::{JsonClient, Reply};

#[derive(Deserialize)]
struct CreateResponse {
    secret_id: String,
}

#[derive(Serialize)]
struct ListRequest<'a> {
    query: &'a SecretQuery,
    domain_id: &'a str,
}

#[derive(Serialize)]
struct GetDataRequest<'a> {
    secret_id: &'a str,
    domain_id: &'a str,
}

#[derive(Deserialize)]
struct GetDataResponse {
    #[serde(default)]
    data: JsonMap,
}

#[derive(Debug, Clone)]
pub struct HttpCredentialStore {
    http: JsonClient,
}

impl HttpCredentialStore {
    pub fn new(config: &ConnectorConfig) -> Result<Self, StrataError> {
        let uri = single_endpoint("SecretConnector", &config.endpoint)?;
        Ok(Self {
            http: JsonClient::new("secret", uri, config.timeout_secs)?,
        })
    }
}

impl Connector for HttpCredentialStore {
    fn name(&self) -> &str {
        "http"
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::CredentialStore
    }
}

#[async_trait]
impl CredentialStore for HttpCredentialStore {
    async fn create(&self, credential: NewCredential) -> Result<String, StrataError> {
        let response: CreateResponse = self.http.post_ok("/secret/create", &credential).await?;
        Ok(response.secret_id)
    }

    async fn list(&self, query: &SecretQuery, domain_id: &str) -> Result<SecretList, StrataError> {
        self.http
            .post_ok("/secret/list", &ListRequest { query, domain_id })
            .await
    }

    async fn get_data(
        &self,
        secret_id: &str,
        domain_id: &str,
    ) -> Result<Option<JsonMap>, StrataError> {
        let request = GetDataRequest {
            secret_id,
            domain_id,
        };
        match self.http.post("/secret/get-data", &request).await? {
            Reply::Ok(GetDataResponse { data }) => Ok(Some(data)),
            Reply::Rejected { status, .. } if status == StatusCode::NOT_FOUND => Ok(None),
            Reply::Rejected { status, message } => Err(StrataError::Transport {
                service: self.http.service().to_string(),
                message: format!("get-data returned {status}: {message}"),
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use serde_json::json;
    use strata_test_utils::json_map;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> HttpCredentialStore {
        let config = ConnectorConfig {
            endpoint: BTreeMap::from([("v1".to_string(), server.uri())]),
            timeout_secs: 5,
        };
        HttpCredentialStore::new(&config).unwrap()
    }

    #[test]
    fn requires_an_endpoint() {
        let err = HttpCredentialStore::new(&ConnectorConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StrataError::ConnectorConfiguration { ref backend, .. } if backend == "SecretConnector"
        ));
    }

    #[tokio::test]
    async fn create_returns_secret_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secret/create"))
            .and(body_json(json!({
                "name": "sec",
                "data": {"key": "v"},
                "secret_type": "CREDENTIALS",
                "domain_id": "dom-1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"secret_id": "secret-1"})))
            .mount(&server)
            .await;

        let id = store(&server)
            .create(NewCredential {
                name: "sec".into(),
                data: json_map(json!({"key": "v"})),
                secret_type: "CREDENTIALS".into(),
                domain_id: "dom-1".into(),
                schema: None,
            })
            .await
            .unwrap();
        assert_eq!(id, "secret-1");
    }

    #[tokio::test]
    async fn list_sends_query_and_domain() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secret/list"))
            .and(body_json(json!({
                "query": {"filter": [{"k": "provider", "v": "aws", "o": "eq"}]},
                "domain_id": "dom-1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"secret_id": "s1", "name": "n", "schema": "aws_access_key"}],
                "total_count": 1
            })))
            .mount(&server)
            .await;

        let query = crate::SecretFilter {
            provider: Some("aws".into()),
            ..Default::default()
        }
        .to_query();
        let list = store(&server).list(&query, "dom-1").await.unwrap();
        assert_eq!(list.total_count, 1);
        assert_eq!(list.results[0].schema.as_deref(), Some("aws_access_key"));
    }

    #[tokio::test]
    async fn get_data_maps_not_found_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secret/get-data"))
            .and(body_json(json!({"secret_id": "s1", "domain_id": "dom-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"k": 1}})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/secret/get-data"))
            .and(body_json(json!({"secret_id": "s9", "domain_id": "dom-1"})))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "no such secret"})))
            .mount(&server)
            .await;

        let store = store(&server);
        assert_eq!(
            store.get_data("s1", "dom-1").await.unwrap(),
            Some(json_map(json!({"k": 1})))
        );
        assert_eq!(store.get_data("s9", "dom-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = store(&server).get_data("s1", "dom-1").await.unwrap_err();
        assert!(matches!(err, StrataError::Transport { .. }));
    }
}
