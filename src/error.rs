// src/error.rs

//! Error types for rust2rpm

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a spec file
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed version requirement expression
    #[error("Failed to parse version requirement '{expr}': {reason}")]
    Parse { expr: String, reason: String },

    /// Requirement shape the generator cannot express as RPM bounds
    #[error("Unsupported version requirement '{expr}': {reason}")]
    Unsupported { expr: String, reason: String },

    /// Feature activation cycle in the manifest
    #[error("Feature activation cycle detected at feature '{feature}'")]
    Cycle { feature: String },

    /// Activation token naming a feature or dependency absent from the manifest
    #[error("Feature list references unknown {kind} '{name}'")]
    UnknownReference { kind: &'static str, name: String },

    /// Structurally invalid manifest
    #[error("Invalid manifest: {0}")]
    Manifest(String),

    /// Manifest TOML syntax error
    #[error("Failed to parse Cargo.toml: {0}")]
    Toml(#[from] toml::de::Error),

    /// crates.io API or download failure
    #[error("crates.io request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Unexpected crates.io API response shape
    #[error("Unexpected crates.io response: {0}")]
    Registry(String),

    /// Unsafe path inside a crate archive
    #[error("Archive entry '{0}' escapes the extraction directory")]
    UnsafePath(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Editor could not be determined or launched
    #[error("Editor error: {0}")]
    Editor(String),

    /// Host environment problem (cache directory, terminal)
    #[error("Environment error: {0}")]
    Environment(String),
}

impl Error {
    /// Build a parse error for a requirement substring
    pub fn parse(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    /// Build an unsupported-requirement error
    pub fn unsupported(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Unsupported {
            expr: expr.into(),
            reason: reason.into(),
        }
    }
}
