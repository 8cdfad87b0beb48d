// src/metadata/parser.rs

//! Serde shapes for raw Cargo.toml manifests.
//!
//! These structs mirror the manifest syntax only; validation and the
//! conversion into the typed [`Metadata`](super::Metadata) model happen
//! in the parent module.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A raw Cargo.toml manifest as written on disk
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawManifest {
    pub package: RawPackage,

    #[serde(default)]
    pub dependencies: BTreeMap<String, RawDependency>,

    #[serde(default)]
    pub build_dependencies: BTreeMap<String, RawDependency>,

    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, RawDependency>,

    /// Platform-specific dependency tables ([target.'cfg(...)'.dependencies])
    #[serde(default)]
    pub target: BTreeMap<String, RawTargetTables>,

    #[serde(default)]
    pub features: BTreeMap<String, Vec<String>>,

    pub lib: Option<RawLib>,

    #[serde(default)]
    pub bin: Vec<RawBin>,
}

/// The [package] section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawPackage {
    pub name: String,
    pub version: String,
    pub license: Option<String>,
    pub license_file: Option<String>,
    pub description: Option<String>,
}

/// A dependency entry: either a bare requirement string or a table
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDependency {
    Requirement(String),
    Table(RawDependencyTable),
}

/// The table form of a dependency entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawDependencyTable {
    pub version: Option<String>,

    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub features: Vec<String>,

    pub default_features: Option<bool>,

    /// Real registry name when the dependency is renamed locally
    pub package: Option<String>,
}

/// Dependency tables nested under a [target.<cfg>] selector
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawTargetTables {
    #[serde(default)]
    pub dependencies: BTreeMap<String, RawDependency>,

    #[serde(default)]
    pub build_dependencies: BTreeMap<String, RawDependency>,

    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, RawDependency>,
}

/// The [lib] section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawLib {
    pub name: Option<String>,

    #[serde(default)]
    pub proc_macro: bool,

    #[serde(default)]
    pub crate_type: Vec<String>,
}

/// A [[bin]] section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawBin {
    pub name: Option<String>,
}

impl RawManifest {
    /// Parse manifest text
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
