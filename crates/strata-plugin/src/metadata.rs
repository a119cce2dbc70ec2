// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural validation of plugin-asserted metadata.

use serde_json::Value;
use strata_core::{Capability, JsonMap, StrataError};

/// Metadata that passed [`validate_plugin_metadata`].
#[derive(Debug, Clone, PartialEq)]
pub struct PluginMetadata {
    pub raw: JsonMap,
    pub capability: Option<Capability>,
}

impl PluginMetadata {
    /// The `capability` object as stored on a resource.
    pub fn capability_map(&self) -> Option<JsonMap> {
        match self.raw.get("capability") {
            Some(Value::Object(map)) => Some(map.clone()),
            _ => None,
        }
    }
}

/// Require a metadata payload to be a JSON object.
pub fn metadata_from_value(value: Value) -> Result<JsonMap, StrataError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(invalid(format!(
            "metadata must be an object, got {}",
            kind(&other)
        ))),
    }
}

/// Check the metadata returned by a plugin's `initialize` call.
///
/// When present, `capability` must be an object whose `supported_schema` is
/// an array of strings and whose `use_resource_secret` is a boolean.
pub fn validate_plugin_metadata(metadata: JsonMap) -> Result<PluginMetadata, StrataError> {
    let capability = match metadata.get("capability") {
        None | Some(Value::Null) => None,
        Some(Value::Object(cap)) => {
            if let Some(schemas) = cap.get("supported_schema") {
                let Value::Array(items) = schemas else {
                    return Err(invalid(format!(
                        "capability.supported_schema must be an array, got {}",
                        kind(schemas)
                    )));
                };
                if let Some(bad) = items.iter().find(|v| !v.is_string()) {
                    return Err(invalid(format!(
                        "capability.supported_schema entries must be strings, got {}",
                        kind(bad)
                    )));
                }
            }
            if let Some(flag) = cap.get("use_resource_secret")
                && !flag.is_boolean()
            {
                return Err(invalid(format!(
                    "capability.use_resource_secret must be a boolean, got {}",
                    kind(flag)
                )));
            }
            Some(Capability::from_map(Some(cap)))
        }
        Some(other) => {
            return Err(invalid(format!(
                "capability must be an object, got {}",
                kind(other)
            )));
        }
    };

    Ok(PluginMetadata {
        raw: metadata,
        capability,
    })
}

fn invalid(reason: String) -> StrataError {
    StrataError::InvalidPluginOptions { reason }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> JsonMap {
        metadata_from_value(value).unwrap()
    }

    #[test]
    fn accepts_metadata_without_capability() {
        let meta = validate_plugin_metadata(map(json!({"supported_features": ["x"]}))).unwrap();
        assert!(meta.capability.is_none());
        assert!(meta.capability_map().is_none());
    }

    #[test]
    fn extracts_capability() {
        let meta = validate_plugin_metadata(map(json!({
            "capability": {
                "supported_schema": ["aws_access_key"],
                "use_resource_secret": false,
                "storage_class": "standard"
            }
        })))
        .unwrap();
        let cap = meta.capability.clone().unwrap();
        assert_eq!(cap.supported_schema, vec!["aws_access_key"]);
        assert!(!cap.use_resource_secret);
        assert_eq!(
            meta.capability_map().unwrap().get("storage_class"),
            Some(&json!("standard"))
        );
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = metadata_from_value(json!(["a"])).unwrap_err();
        assert_eq!(err.code(), "ERROR_INVALID_PLUGIN_OPTIONS");
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn rejects_malformed_capability() {
        let cases = [
            (json!({"capability": "yes"}), "capability must be an object"),
            (
                json!({"capability": {"supported_schema": "aws"}}),
                "supported_schema must be an array",
            ),
            (
                json!({"capability": {"supported_schema": ["aws", 1]}}),
                "entries must be strings",
            ),
            (
                json!({"capability": {"use_resource_secret": "true"}}),
                "use_resource_secret must be a boolean",
            ),
        ];
        for (value, expected) in cases {
            let err = validate_plugin_metadata(map(value)).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "expected `{expected}` in `{err}`"
            );
        }
    }
}
