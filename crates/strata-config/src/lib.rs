// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Strata storage service.
//!
//! TOML files are layered with `figment` (system, XDG user, local directory)
//! and overridden by `STRATA_*` environment variables. Every section rejects
//! unknown keys, and failures are reported as `miette` diagnostics with typo
//! suggestions.
//!
//! ```no_run
//! match strata_config::load_and_validate() {
//!     Ok(config) => println!("database: {}", config.storage.database_path),
//!     Err(errors) => strata_config::render_errors(&errors),
//! }
//! ```

use std::path::{Path, PathBuf};

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ConnectorConfig, PluginConnectorConfig, StrataConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Diagnostics point into whichever of the layered files holds the
/// offending key.
pub fn load_and_validate() -> Result<StrataConfig, Vec<ConfigError>> {
    checked(loader::load_config(), layered_sources)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<StrataConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<StrataConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![(INLINE_SOURCE.to_string(), toml_content.to_string())]
    })
}

const INLINE_SOURCE: &str = "<inline>";

/// Run semantic checks on a parsed config, or turn a parse failure into
/// diagnostics against the sources produced by `sources`.
fn checked(
    loaded: Result<StrataConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<StrataConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config).map(|()| config)
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    Some((path.display().to_string(), content))
}

/// The layered files in precedence order. The local file is named by its
/// absolute path so figment's file metadata matches it.
fn layered_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|dir| dir.join(loader::LOCAL_CONFIG))
        .unwrap_or_else(|_| PathBuf::from(loader::LOCAL_CONFIG));
    [Some(local), loader::user_config_path(), Some(PathBuf::from(loader::SYSTEM_CONFIG))]
        .into_iter()
        .flatten()
        .filter_map(|path| read_source(&path))
        .collect()
}
