// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint URI parsing and connector endpoint selection.

use std::collections::BTreeMap;

use strata_core::{PluginEndpoint, StrataError};

/// Parse `scheme://host:port` into a [`PluginEndpoint`].
///
/// The port may be omitted for schemes with a well-known default
/// (`http`, `https`). Paths and query strings are ignored.
pub fn parse_endpoint(uri: &str) -> Result<PluginEndpoint, String> {
    let parsed = url::Url::parse(uri.trim()).map_err(|e| format!("`{uri}` is not a valid URI: {e}"))?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| format!("`{uri}` has no host"))?;
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| format!("`{uri}` has no port"))?;

    Ok(PluginEndpoint {
        scheme: parsed.scheme().to_string(),
        host: host.to_string(),
        port,
    })
}

/// Pick the one configured endpoint of a connector.
///
/// Connectors are configured as a `{version = uri}` map; anything other than
/// exactly one entry is a configuration error.
pub fn single_endpoint<'a>(
    backend: &str,
    endpoints: &'a BTreeMap<String, String>,
) -> Result<&'a str, StrataError> {
    let mut values = endpoints.values();
    match (values.next(), values.next()) {
        (Some(uri), None) => Ok(uri.as_str()),
        (None, _) => Err(StrataError::connector_config(
            backend,
            "endpoint is not configured",
        )),
        (Some(_), Some(_)) => Err(StrataError::connector_config(
            backend,
            format!("expected exactly one endpoint, found {}", endpoints.len()),
        )),
    }
}
