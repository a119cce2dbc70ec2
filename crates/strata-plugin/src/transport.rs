// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-over-HTTP plumbing shared by the connectors.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use strata_core::StrataError;
use tracing::debug;

/// Outcome of a call that reached the remote service.
#[derive(Debug)]
pub enum Reply<T> {
    Ok(T),
    /// Non-2xx status. `message` is the body's `message` field when present,
    /// otherwise the raw body text.
    Rejected { status: StatusCode, message: String },
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

/// POSTs JSON bodies to `{base_url}{path}` with a per-request timeout.
#[derive(Debug, Clone)]
pub struct JsonClient {
    client: reqwest::Client,
    base_url: String,
    service: &'static str,
}

impl JsonClient {
    pub fn new(
        service: &'static str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, StrataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StrataError::Transport {
                service: service.to_string(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<Reply<T>, StrataError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport(format!("HTTP request to {url} failed: {e}"), e))?;

        let status = response.status();
        debug!(service = self.service, %url, status = %status, "response received");

        let text = response
            .text()
            .await
            .map_err(|e| self.transport(format!("failed to read response body: {e}"), e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or_else(|_| format!("{status}: {text}"));
            return Ok(Reply::Rejected { status, message });
        }

        // Some endpoints answer 2xx with an empty body.
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        let value = serde_json::from_str(text)
            .map_err(|e| self.transport(format!("failed to parse response: {e}"), e))?;
        Ok(Reply::Ok(value))
    }

    /// Like [`JsonClient::post`], but treats any rejection as a transport error.
    pub async fn post_ok<B, T>(&self, path: &str, body: &B) -> Result<T, StrataError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match self.post(path, body).await? {
            Reply::Ok(value) => Ok(value),
            Reply::Rejected { status, message } => Err(StrataError::Transport {
                service: self.service.to_string(),
                message: format!("{path} returned {status}: {message}"),
                source: None,
            }),
        }
    }

    fn transport<E>(&self, message: String, source: E) -> StrataError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StrataError::Transport {
            service: self.service.to_string(),
            message,
            source: Some(Box::new(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_json_and_decodes_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(body_json(json!({"a": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"b": 2})))
            .mount(&server)
            .await;

        let client = JsonClient::new("test", &format!("{}/", server.uri()), 5).unwrap();
        let reply: Value = client.post_ok("/echo", &json!({"a": 1})).await.unwrap();
        assert_eq!(reply, json!({"b": 2}));
    }

    #[tokio::test]
    async fn rejection_carries_message_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "bad options"})),
            )
            .mount(&server)
            .await;

        let client = JsonClient::new("test", &server.uri(), 5).unwrap();
        match client.post::<_, Value>("/x", &json!({})).await.unwrap() {
            Reply::Rejected { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "bad options");
            }
            Reply::Ok(_) => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn empty_success_body_decodes_as_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = JsonClient::new("test", &server.uri(), 5).unwrap();
        let reply: Value = client.post_ok("/x", &json!({})).await.unwrap();
        assert_eq!(reply, json!({}));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = JsonClient::new("test", &server.uri(), 1).unwrap();
        let err = client.post_ok::<_, Value>("/x", &json!({})).await.unwrap_err();
        assert_eq!(err.code(), "ERROR_TRANSPORT");
    }
}
