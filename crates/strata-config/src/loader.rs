// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based loader.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/strata/strata.toml`
//! 3. `~/.config/strata/strata.toml`
//! 4. `./strata.toml`
//! 5. `STRATA_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::StrataConfig;

pub const SYSTEM_CONFIG: &str = "/etc/strata/strata.toml";
pub const LOCAL_CONFIG: &str = "strata.toml";

/// Section prefixes recognised in environment variable names, longest first.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("connectors_repository_", "connectors.repository."),
    ("connectors_plugin_", "connectors.plugin."),
    ("connectors_secret_", "connectors.secret."),
    ("service_", "service."),
    ("storage_", "storage."),
];

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("strata").join("strata.toml"))
}

pub fn load_config() -> Result<StrataConfig, figment::Error> {
    build_figment().extract()
}

/// Load from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<StrataConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrataConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StrataConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrataConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StrataConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
///
/// Only the section prefix is converted; underscores inside key names stay,
/// so `connectors_plugin_static_endpoint` becomes
/// `connectors.plugin.static_endpoint`.
pub fn env_key_path(key: &str) -> String {
    for (prefix, section) in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{section}{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("STRATA_").map(|key| env_key_path(key.as_str()).into())
}
