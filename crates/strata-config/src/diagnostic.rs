// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Figment reports problems as a chain of errors carrying a key path. Each
//! one is mapped to a [`ConfigError`]; when the offending key can be located
//! in a TOML source the diagnostic points at it, and misspelled keys carry
//! the nearest accepted name.

#![allow(unused_assignments)]

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

const SIMILARITY_CUTOFF: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a recognized configuration key")]
    #[diagnostic(
        code(strata::config::unknown_key),
        help("{}", unknown_key_hint(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Accepted keys of the enclosing table, comma separated.
        valid_keys: String,
        #[label("unrecognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type ({detail})")]
    #[diagnostic(code(strata::config::invalid_type), help("use a value of type {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` is required")]
    #[diagnostic(code(strata::config::missing_key), help("set `{key}` in strata.toml"))]
    MissingKey { key: String },

    #[error("{message}")]
    #[diagnostic(code(strata::config::validation))]
    Validation { message: String },

    #[error("{0}")]
    #[diagnostic(code(strata::config::other))]
    Other(String),
}

fn unknown_key_hint(suggestion: Option<&str>, valid_keys: &str) -> String {
    let accepted = if valid_keys.is_empty() {
        "this table accepts no keys".to_string()
    } else {
        format!("accepted keys: {valid_keys}")
    };
    match suggestion {
        Some(name) => format!("perhaps `{name}` was meant; {accepted}"),
        None => accepted,
    }
}

/// A source span resolved for one diagnostic.
struct Located {
    span: SourceSpan,
    src: NamedSource<String>,
}

impl Located {
    fn split(found: Option<Located>) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        match found {
            Some(Located { span, src }) => (Some(span), Some(src)),
            None => (None, None),
        }
    }
}

/// The TOML documents a figment was built from, as `(name, content)` pairs.
struct Sources<'a>(&'a [(String, String)]);

impl<'a> Sources<'a> {
    /// The document an error came from. Inline strings carry no file name,
    /// so they resolve only when there is a single document.
    fn origin(&self, error: &figment::Error) -> Option<&'a (String, String)> {
        let file = error.metadata.as_ref().and_then(|meta| match meta.source.as_ref()? {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
        match (file, self.0) {
            (Some(file), docs) => docs.iter().find(|(name, _)| *name == file),
            (None, [only]) => Some(only),
            (None, _) => None,
        }
    }

    fn locate(&self, error: &figment::Error, table: &[String], key: &str) -> Option<Located> {
        let (name, content) = self.origin(error)?;
        let offset = find_key_offset(content, table, key)?;
        Some(Located {
            span: SourceSpan::new(offset.into(), key.len()),
            src: NamedSource::new(name, content.clone()),
        })
    }
}

/// Map every error carried by a figment failure to a diagnostic.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    let sources = Sources(toml_sources);
    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(key, accepted) => {
                    let (span, src) = Located::split(sources.locate(&error, &path, key));
                    ConfigError::UnknownKey {
                        key: key.clone(),
                        suggestion: suggest_key(key, accepted),
                        valid_keys: accepted.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(key) => ConfigError::MissingKey {
                    key: key.to_string(),
                },
                Kind::InvalidType(found, expected) => {
                    let located = path
                        .split_last()
                        .and_then(|(key, table)| sources.locate(&error, table, key));
                    let (span, src) = Located::split(located);
                    ConfigError::InvalidType {
                        key: path.join("."),
                        detail: format!("got {found}"),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Byte offset of `key` inside the `[table]` section of a TOML document.
///
/// An empty `table` means the document root. Only the lines up to the next
/// table header are searched.
pub fn find_key_offset(content: &str, table: &[String], key: &str) -> Option<usize> {
    let body_start = if table.is_empty() {
        0
    } else {
        let header = format!("[{}]", table.join("."));
        content.find(&header)? + header.len()
    };

    let mut line_start = body_start;
    for (index, line) in content[body_start..].split_inclusive('\n').enumerate() {
        let text = line.trim_start();
        if index > 0 && text.starts_with('[') {
            break;
        }
        let follows_key = text
            .strip_prefix(key)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c == '=' || (c.is_whitespace() && c != '\n'));
        if follows_key {
            return Some(line_start + (line.len() - text.len()));
        }
        line_start += line.len();
    }
    None
}

/// The accepted key most similar to `unknown`, if any clears the cutoff.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for &candidate in valid_keys {
        let score = strsim::jaro_winkler(unknown, candidate);
        if score > SIMILARITY_CUTOFF && best.is_none_or(|(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.map(|(name, _)| name.to_string())
}

/// Write each diagnostic to stderr with source snippets.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("config error: {error}"),
        }
    }
}
