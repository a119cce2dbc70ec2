// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests.
//!
//! The first group drives the orchestrator over the in-memory harness. The
//! second runs the `strata` binary against a wiremock server standing in for
//! the plugin registry, repository, plugin, and credential store, with a
//! temporary SQLite database.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};
use strata_core::{StorageState, StrataError};
use strata_service::{
    Collaborators, RegisterRequest, RegistrationOrchestrator, StorageRef, UpdatePluginRequest,
};
use strata_test_utils::{TestHarness, json_map};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn orchestrator(h: &TestHarness) -> RegistrationOrchestrator {
    RegistrationOrchestrator::new(Collaborators {
        repository: h.repository.clone(),
        registry: h.registry.clone(),
        plugin_connector: h.plugin.clone(),
        credentials: h.credentials.clone(),
    })
}

fn register_body() -> Value {
    json!({
        "name": "s1",
        "domain_id": "dom-1",
        "user_id": "u-1",
        "plugin_info": {
            "plugin_id": "plugin-abc",
            "version": "1.1",
            "options": {},
            "secret_data": {
                "name": "s1-secret",
                "schema": "aws_access_key",
                "data": {"access_key_id": "AKIA0000"}
            }
        }
    })
}

// ---- Scenario 1: register, then reject an unpublished version ----

#[tokio::test]
async fn register_then_update_to_unpublished_version() {
    let h = TestHarness::builder()
        .with_plugin("plugin-abc", "1.1")
        .with_metadata(json_map(json!({"capability": {"supported_schema": ["aws_access_key"]}})))
        .with_sqlite()
        .build()
        .await
        .unwrap();
    let orchestrator = orchestrator(&h);

    let request: RegisterRequest = serde_json::from_value(register_body()).unwrap();
    let stored = orchestrator.register(request).await.unwrap();
    assert_eq!(stored.state, StorageState::Enabled);
    assert!(stored.plugin_info.credential_id.is_some());

    let err = orchestrator
        .update_plugin(UpdatePluginRequest {
            storage_id: stored.storage_id.clone(),
            domain_id: "dom-1".into(),
            version: Some("2.0".into()),
            options: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StrataError::InvalidPluginVersion { .. }));
    assert_eq!(err.code(), "ERROR_INVALID_PLUGIN_VERSION");

    let reloaded = orchestrator
        .get(&StorageRef::new(&stored.storage_id, "dom-1"))
        .await
        .unwrap();
    assert_eq!(reloaded.plugin_info.version, "1.1");
    assert_eq!(reloaded.plugin_info.metadata, stored.plugin_info.metadata);

    h.shutdown().await.unwrap();
}

// ---- Scenario 2: full lifecycle ----

#[tokio::test]
async fn full_lifecycle_in_memory() {
    let h = TestHarness::builder()
        .with_plugin("plugin-abc", "1.1")
        .with_plugin("plugin-abc", "1.2")
        .with_metadata(json_map(json!({"capability": {"supported_schema": ["aws_access_key"]}})))
        .build()
        .await
        .unwrap();
    let orchestrator = orchestrator(&h);

    let request: RegisterRequest = serde_json::from_value(register_body()).unwrap();
    let stored = orchestrator.register(request).await.unwrap();
    let target = StorageRef::new(&stored.storage_id, "dom-1");

    let upgraded = orchestrator
        .update_plugin(UpdatePluginRequest {
            storage_id: stored.storage_id.clone(),
            domain_id: "dom-1".into(),
            version: Some("1.2".into()),
            options: Some(json_map(json!({"bucket": "archive"}))),
        })
        .await
        .unwrap();
    assert_eq!(upgraded.plugin_info.version, "1.2");

    orchestrator.verify_plugin(&target).await.unwrap();
    assert_eq!(
        h.plugin.verify_calls()[0].options,
        json_map(json!({"bucket": "archive"}))
    );

    orchestrator.disable(&target).await.unwrap();
    let err = orchestrator.deregister(&target).await.unwrap_err();
    assert_eq!(err.code(), "ERROR_ALREADY_DISABLED");

    orchestrator.enable(&target).await.unwrap();
    orchestrator.deregister(&target).await.unwrap();
    assert_eq!(
        orchestrator.get(&target).await.unwrap_err().code(),
        "ERROR_NOT_FOUND"
    );
}

// ---- Scenario 3: the binary against HTTP collaborators ----

async fn mock_services() -> MockServer {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("POST"))
        .and(path("/plugin/get-endpoint"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"endpoint": uri})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/plugin/get-versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": ["1.1"]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/plugin/init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"capability": {"supported_schema": ["aws_access_key"]}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/secret/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"secret_id": "secret-1"})))
        .mount(&server)
        .await;

    server
}

fn write_config(dir: &Path, service_uri: &str) -> std::path::PathBuf {
    let db = dir.join("strata.db");
    let config = format!(
        r#"
[service]
log_level = "warn"

[storage]
database_path = "{db}"

[connectors.plugin]
endpoint = {{ v1 = "{service_uri}" }}
timeout_secs = 5

[connectors.repository]
endpoint = {{ v1 = "{service_uri}" }}

[connectors.secret]
endpoint = {{ v1 = "{service_uri}" }}
"#,
        db = db.display()
    );
    let path = dir.join("strata.toml");
    std::fs::write(&path, config).unwrap();
    path
}

async fn strata(dir: &Path, args: Vec<String>) -> Output {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_strata"))
            .args(&args)
            .current_dir(&dir)
            .env_clear()
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn args(config: &Path, command: &str, body: Value) -> Vec<String> {
    vec![
        "--config".to_string(),
        config.display().to_string(),
        command.to_string(),
        "--json".to_string(),
        body.to_string(),
    ]
}

#[tokio::test(flavor = "multi_thread")]
async fn binary_registers_and_rejects_unpublished_version() {
    let server = mock_services().await;
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_config(dir.path(), &server.uri());

    let out = strata(dir.path(), args(&config, "register", register_body())).await;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stored: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(stored["state"], "ENABLED");
    assert_eq!(stored["plugin_info"]["credential_id"], "secret-1");
    assert!(stored["plugin_info"].get("secret_data").is_none());
    let storage_id = stored["storage_id"].as_str().unwrap().to_string();

    let out = strata(
        dir.path(),
        args(
            &config,
            "update-plugin",
            json!({"storage_id": storage_id, "domain_id": "dom-1", "version": "2.0"}),
        ),
    )
    .await;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("ERROR_INVALID_PLUGIN_VERSION"));

    let out = strata(
        dir.path(),
        args(&config, "get", json!({"storage_id": storage_id, "domain_id": "dom-1"})),
    )
    .await;
    assert!(out.status.success());
    let reloaded: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(reloaded["plugin_info"]["version"], "1.1");

    let out = strata(dir.path(), args(&config, "list", json!({"domain_id": "dom-1"}))).await;
    let listed: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(listed["total_count"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn binary_reports_config_errors() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("strata.toml");
    std::fs::write(&config, "[service]\nsecret_tpye = \"CREDENTIALS\"\n").unwrap();

    let out = strata(
        dir.path(),
        vec![
            "--config".into(),
            config.display().to_string(),
            "config".into(),
            "check".into(),
        ],
    )
    .await;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown_key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn binary_requires_connector_endpoints() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("strata.toml");
    std::fs::write(
        &config,
        format!(
            "[storage]\ndatabase_path = \"{}\"\n",
            dir.path().join("strata.db").display()
        ),
    )
    .unwrap();

    let out = strata(
        dir.path(),
        args(&config, "get", json!({"storage_id": "sto-1", "domain_id": "dom-1"})),
    )
    .await;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("ERROR_CONNECTOR_CONFIGURATION"));
    assert!(!dir.path().join("strata.db").exists());
}
