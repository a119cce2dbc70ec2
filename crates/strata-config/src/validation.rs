// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Collects every violation instead of failing on the first one.

use std::collections::BTreeMap;

use crate::diagnostic::ConfigError;
use crate::model::StrataConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &StrataConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.service.name.trim().is_empty() {
        errors.push(validation("service.name must not be empty"));
    }

    let level = config.service.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(validation(format!(
            "service.log_level `{}` is not one of {}",
            config.service.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.service.secret_type.trim().is_empty() {
        errors.push(validation("service.secret_type must not be empty"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(validation("storage.database_path must not be empty"));
    }

    let plugin = &config.connectors.plugin;
    check_connector(
        "connectors.plugin",
        &plugin.endpoint,
        plugin.timeout_secs,
        &mut errors,
    );
    if let Some(uri) = &plugin.static_endpoint {
        check_uri("connectors.plugin.static_endpoint", uri, &mut errors);
    }

    let repository = &config.connectors.repository;
    check_connector(
        "connectors.repository",
        &repository.endpoint,
        repository.timeout_secs,
        &mut errors,
    );

    let secret = &config.connectors.secret;
    check_connector(
        "connectors.secret",
        &secret.endpoint,
        secret.timeout_secs,
        &mut errors,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validation(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

/// An empty endpoint map is allowed here (the connector is simply not
/// configured); more than one entry is always a mistake.
fn check_connector(
    section: &str,
    endpoint: &BTreeMap<String, String>,
    timeout_secs: u64,
    errors: &mut Vec<ConfigError>,
) {
    if endpoint.len() > 1 {
        errors.push(validation(format!(
            "{section}.endpoint must have exactly one entry, found {}",
            endpoint.len()
        )));
    }
    for (version, uri) in endpoint {
        check_uri(&format!("{section}.endpoint.{version}"), uri, errors);
    }
    if timeout_secs == 0 {
        errors.push(validation(format!(
            "{section}.timeout_secs must be greater than zero"
        )));
    }
}

fn check_uri(key: &str, uri: &str, errors: &mut Vec<ConfigError>) {
    match url::Url::parse(uri) {
        Ok(parsed) if parsed.host_str().is_some() => {}
        Ok(_) => errors.push(validation(format!("{key} `{uri}` has no host"))),
        Err(e) => errors.push(validation(format!("{key} `{uri}` is not a valid URI: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &StrataConfig) -> Vec<String> {
        match validate_config(config) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&StrataConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = StrataConfig::default();
        config.service.log_level = "loud".into();
        config.storage.database_path = "  ".into();
        config.connectors.secret.timeout_secs = 0;

        let msgs = messages(&config);
        assert_eq!(msgs.len(), 3, "got: {msgs:?}");
        assert!(msgs.iter().any(|m| m.contains("service.log_level")));
        assert!(msgs.iter().any(|m| m.contains("storage.database_path")));
        assert!(msgs.iter().any(|m| m.contains("connectors.secret.timeout_secs")));
    }

    #[test]
    fn rejects_multiple_endpoints() {
        let mut config = StrataConfig::default();
        config
            .connectors
            .repository
            .endpoint
            .insert("v1".into(), "http://repo-a:50051".into());
        config
            .connectors
            .repository
            .endpoint
            .insert("v2".into(), "http://repo-b:50051".into());

        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("exactly one entry"));
    }

    #[test]
    fn rejects_unparseable_uris() {
        let mut config = StrataConfig::default();
        config
            .connectors
            .secret
            .endpoint
            .insert("v1".into(), "not a uri".into());
        config.connectors.plugin.static_endpoint = Some("mailto:someone".into());

        let msgs = messages(&config);
        assert_eq!(msgs.len(), 2, "got: {msgs:?}");
        assert!(msgs.iter().any(|m| m.contains("connectors.secret.endpoint.v1")));
        assert!(msgs.iter().any(|m| m.contains("has no host")));
    }

    #[test]
    fn parsed_static_endpoint_is_checked() {
        let config: StrataConfig = toml::from_str(
            r#"
[connectors.plugin]
static_endpoint = "http://plugin.local:8080"
timeout_secs = 0
"#,
        )
        .unwrap();

        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1, "got: {msgs:?}");
        assert!(msgs[0].contains("connectors.plugin.timeout_secs"));
    }
}
