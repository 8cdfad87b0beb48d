// src/metadata/mod.rs

//! Typed crate manifest model
//!
//! The manifest is parsed once into an immutable snapshot: package
//! identity, dependency buckets, the declared feature map, and build
//! targets. All structural validation happens here so the dependency
//! normalizer can assume a well-formed model.

pub mod parser;

use crate::error::{Error, Result};
use crate::version::VersionRange;
use parser::{RawDependency, RawManifest};
use semver::Version;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Name and version of the crate being packaged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    pub name: String,
    pub version: Version,
}

/// Which manifest table a dependency was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// [dependencies]
    Normal,
    /// [build-dependencies]
    Build,
    /// [dev-dependencies]
    Dev,
}

/// A single declared dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Registry name of the depended-upon crate
    pub name: String,
    /// Parsed version requirement; the "any" range when none was given
    pub range: VersionRange,
    /// Only activated through a feature
    pub optional: bool,
    /// Features this dependency enables on its own target
    pub features: Vec<String>,
    /// Whether the target's default feature set is enabled
    pub uses_default_features: bool,
    pub kind: DependencyKind,
}

/// One entry in a feature's activation list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureActivation {
    /// Enables another locally-defined feature
    Feature(String),
    /// Activates a dependency, optionally enabling one of its features
    /// (the `dep/feat` and `dep:name` token forms)
    Dependency {
        name: String,
        feature: Option<String>,
    },
}

/// Kind of build artifact a target produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Lib,
    Bin,
    ProcMacro,
    Cdylib,
    Other,
}

/// A build target declared in (or inferred for) the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub kind: TargetKind,
}

impl Target {
    /// True for targets that install library source consumers build against
    pub fn is_library(&self) -> bool {
        matches!(self.kind, TargetKind::Lib | TargetKind::ProcMacro)
    }
}

/// Immutable snapshot of a parsed crate manifest
#[derive(Debug, Clone)]
pub struct Metadata {
    pub package: PackageIdentity,
    pub license: Option<String>,
    pub license_file: Option<String>,
    pub description: Option<String>,
    /// All dependency buckets, each entry tagged with its kind
    pub dependencies: Vec<Dependency>,
    /// Declared features only; the implicit features that optional
    /// dependencies define are resolved on the fly, not stored
    pub features: BTreeMap<String, Vec<FeatureActivation>>,
    pub targets: Vec<Target>,
}

impl Metadata {
    /// Parse and validate manifest text
    ///
    /// When no [lib] or [[bin]] section is present the manifest relies
    /// on cargo's source autodiscovery; without a manifest directory to
    /// inspect, a library target is assumed (the common crates.io case).
    pub fn from_str(text: &str) -> Result<Self> {
        Self::build(RawManifest::parse(text)?, None)
    }

    /// Parse and validate a manifest file, inferring autodiscovered
    /// targets from the sibling src/ directory
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::build(RawManifest::parse(&text)?, path.parent())
    }

    fn build(raw: RawManifest, manifest_dir: Option<&Path>) -> Result<Self> {
        if raw.package.name.is_empty() {
            return Err(Error::Manifest("package name is empty".into()));
        }
        let version = Version::parse(&raw.package.version).map_err(|e| {
            Error::Manifest(format!(
                "invalid package version '{}': {e}",
                raw.package.version
            ))
        })?;

        let mut dependencies = Vec::new();
        let push_bucket = |bucket: &BTreeMap<String, RawDependency>,
                               kind: DependencyKind,
                               out: &mut Vec<Dependency>|
         -> Result<()> {
            for (name, raw_dep) in bucket {
                out.push(convert_dependency(name, raw_dep, kind)?);
            }
            Ok(())
        };

        push_bucket(&raw.dependencies, DependencyKind::Normal, &mut dependencies)?;
        push_bucket(
            &raw.build_dependencies,
            DependencyKind::Build,
            &mut dependencies,
        )?;
        push_bucket(&raw.dev_dependencies, DependencyKind::Dev, &mut dependencies)?;
        for tables in raw.target.values() {
            push_bucket(&tables.dependencies, DependencyKind::Normal, &mut dependencies)?;
            push_bucket(
                &tables.build_dependencies,
                DependencyKind::Build,
                &mut dependencies,
            )?;
            push_bucket(&tables.dev_dependencies, DependencyKind::Dev, &mut dependencies)?;
        }

        let features = convert_features(&raw, &dependencies)?;
        let targets = discover_targets(&raw, manifest_dir);
        debug!(
            name = %raw.package.name,
            deps = dependencies.len(),
            features = features.len(),
            targets = targets.len(),
            "parsed manifest"
        );

        Ok(Self {
            package: PackageIdentity {
                name: raw.package.name,
                version,
            },
            license: raw.package.license,
            license_file: raw.package.license_file,
            description: raw.package.description,
            dependencies,
            features,
            targets,
        })
    }

    /// Dependencies in the given bucket
    pub fn dependencies_of_kind(
        &self,
        kind: DependencyKind,
    ) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(move |d| d.kind == kind)
    }

    /// Look up a non-dev dependency by registry name
    pub fn find_dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|d| d.kind != DependencyKind::Dev && d.name == name)
    }

    /// True if any target installs library source
    pub fn has_library(&self) -> bool {
        self.targets.iter().any(Target::is_library)
    }

    /// The executable targets
    pub fn binaries(&self) -> Vec<&Target> {
        self.targets
            .iter()
            .filter(|t| t.kind == TargetKind::Bin)
            .collect()
    }
}

fn convert_dependency(
    local_name: &str,
    raw: &RawDependency,
    kind: DependencyKind,
) -> Result<Dependency> {
    let (requirement, optional, features, default_features, package) = match raw {
        RawDependency::Requirement(req) => (Some(req.clone()), false, Vec::new(), None, None),
        RawDependency::Table(table) => (
            table.version.clone(),
            table.optional,
            table.features.clone(),
            table.default_features,
            table.package.clone(),
        ),
    };

    let range = match requirement {
        Some(req) => VersionRange::parse(&req)?,
        // path/git-only dependency: any version
        None => VersionRange::any(),
    };

    Ok(Dependency {
        name: package.unwrap_or_else(|| local_name.to_string()),
        range,
        optional,
        features,
        uses_default_features: default_features.unwrap_or(true),
        kind,
    })
}

/// Classify feature list tokens against the declared features and
/// dependency names, rejecting danglers at the boundary
fn convert_features(
    raw: &RawManifest,
    dependencies: &[Dependency],
) -> Result<BTreeMap<String, Vec<FeatureActivation>>> {
    let is_dependency = |name: &str| {
        dependencies
            .iter()
            .any(|d| d.kind != DependencyKind::Dev && d.name == name)
    };

    let mut features = BTreeMap::new();
    for (feature, tokens) in &raw.features {
        let mut activations = Vec::with_capacity(tokens.len());
        for token in tokens {
            activations.push(classify_token(token, &raw.features, &is_dependency)?);
        }
        features.insert(feature.clone(), activations);
    }
    Ok(features)
}

fn classify_token(
    token: &str,
    declared: &BTreeMap<String, Vec<String>>,
    is_dependency: &dyn Fn(&str) -> bool,
) -> Result<FeatureActivation> {
    // `dep:name` always names a dependency
    if let Some(name) = token.strip_prefix("dep:") {
        if !is_dependency(name) {
            return Err(Error::UnknownReference {
                kind: "dependency",
                name: name.to_string(),
            });
        }
        return Ok(FeatureActivation::Dependency {
            name: name.to_string(),
            feature: None,
        });
    }

    // `dep/feat` and the weak `dep?/feat` form enable a dependency feature
    if let Some((dep, feat)) = token.split_once('/') {
        let dep = dep.strip_suffix('?').unwrap_or(dep);
        if !is_dependency(dep) {
            return Err(Error::UnknownReference {
                kind: "dependency",
                name: dep.to_string(),
            });
        }
        return Ok(FeatureActivation::Dependency {
            name: dep.to_string(),
            feature: Some(feat.to_string()),
        });
    }

    if declared.contains_key(token) {
        return Ok(FeatureActivation::Feature(token.to_string()));
    }
    if is_dependency(token) {
        return Ok(FeatureActivation::Dependency {
            name: token.to_string(),
            feature: None,
        });
    }
    Err(Error::UnknownReference {
        kind: "feature or dependency",
        name: token.to_string(),
    })
}

fn discover_targets(raw: &RawManifest, manifest_dir: Option<&Path>) -> Vec<Target> {
    let crate_name = raw.package.name.replace('-', "_");
    let mut targets = Vec::new();

    if let Some(lib) = &raw.lib {
        let kind = if lib.proc_macro {
            TargetKind::ProcMacro
        } else if lib.crate_type.iter().any(|t| t == "cdylib") {
            TargetKind::Cdylib
        } else {
            TargetKind::Lib
        };
        targets.push(Target {
            name: lib.name.clone().unwrap_or_else(|| crate_name.clone()),
            kind,
        });
    }
    for bin in &raw.bin {
        targets.push(Target {
            name: bin.name.clone().unwrap_or_else(|| raw.package.name.clone()),
            kind: TargetKind::Bin,
        });
    }

    if !targets.is_empty() {
        return targets;
    }

    // No explicit targets: mirror cargo's autodiscovery when the source
    // tree is available, otherwise assume a library crate
    match manifest_dir {
        Some(dir) => {
            if dir.join("src/lib.rs").is_file() {
                targets.push(Target {
                    name: crate_name.clone(),
                    kind: TargetKind::Lib,
                });
            }
            if dir.join("src/main.rs").is_file() {
                targets.push(Target {
                    name: raw.package.name.clone(),
                    kind: TargetKind::Bin,
                });
            }
            if let Ok(entries) = fs::read_dir(dir.join("src/bin")) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().is_some_and(|e| e == "rs") {
                        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                            targets.push(Target {
                                name: stem.to_string(),
                                kind: TargetKind::Bin,
                            });
                        }
                    }
                }
            }
            if targets.is_empty() {
                targets.push(Target {
                    name: crate_name,
                    kind: TargetKind::Lib,
                });
            }
        }
        None => {
            targets.push(Target {
                name: crate_name,
                kind: TargetKind::Lib,
            });
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_manifest() {
        let md = Metadata::from_str(
            r#"
            [package]
            name = "hello"
            version = "0.0.0"
            "#,
        )
        .unwrap();
        assert_eq!(md.package.name, "hello");
        assert_eq!(md.package.version, Version::new(0, 0, 0));
        assert!(md.dependencies.is_empty());
        assert!(md.features.is_empty());
        assert!(md.has_library());
    }

    #[test]
    fn test_dependency_forms() {
        let md = Metadata::from_str(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            foo = "^1.2"
            bar = { version = "0.3", optional = true, features = ["extra"] }
            baz = { path = "../baz" }

            [build-dependencies]
            cc = "1.0"

            [dev-dependencies]
            quickcheck = "0.9"
            "#,
        )
        .unwrap();

        assert_eq!(md.dependencies.len(), 5);
        let foo = md.find_dependency("foo").unwrap();
        assert_eq!(foo.kind, DependencyKind::Normal);
        assert!(!foo.optional);

        let bar = md.find_dependency("bar").unwrap();
        assert!(bar.optional);
        assert_eq!(bar.features, vec!["extra"]);

        let baz = md.find_dependency("baz").unwrap();
        assert!(baz.range.is_any());

        assert_eq!(md.dependencies_of_kind(DependencyKind::Dev).count(), 1);
        assert_eq!(md.dependencies_of_kind(DependencyKind::Build).count(), 1);
    }

    #[test]
    fn test_renamed_dependency_uses_registry_name() {
        let md = Metadata::from_str(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            local-name = { version = "1", package = "registry-name" }
            "#,
        )
        .unwrap();
        assert!(md.find_dependency("registry-name").is_some());
        assert!(md.find_dependency("local-name").is_none());
    }

    #[test]
    fn test_target_specific_dependencies_merged() {
        let md = Metadata::from_str(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [target.'cfg(unix)'.dependencies]
            libc = "0.2"
            "#,
        )
        .unwrap();
        assert!(md.find_dependency("libc").is_some());
    }

    #[test]
    fn test_feature_token_classification() {
        let md = Metadata::from_str(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            serde = { version = "1", optional = true }

            [features]
            default = ["std"]
            std = []
            derive = ["serde", "serde/derive", "dep:serde"]
            "#,
        )
        .unwrap();

        let derive = &md.features["derive"];
        assert_eq!(
            derive[0],
            FeatureActivation::Dependency {
                name: "serde".into(),
                feature: None
            }
        );
        assert_eq!(
            derive[1],
            FeatureActivation::Dependency {
                name: "serde".into(),
                feature: Some("derive".into())
            }
        );
        assert_eq!(
            derive[2],
            FeatureActivation::Dependency {
                name: "serde".into(),
                feature: None
            }
        );
        assert_eq!(md.features["default"][0], FeatureActivation::Feature("std".into()));
    }

    #[test]
    fn test_unknown_feature_reference_rejected() {
        let err = Metadata::from_str(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [features]
            broken = ["no-such-thing"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownReference { .. }));
    }

    #[test]
    fn test_malformed_requirement_is_fatal() {
        let err = Metadata::from_str(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            foo = "not-a-version"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. } | Error::Parse { .. }));
    }

    #[test]
    fn test_explicit_targets() {
        let md = Metadata::from_str(
            r#"
            [package]
            name = "hello-tool"
            version = "1.0.0"

            [lib]
            name = "hello"

            [[bin]]
            name = "hello-cli"
            "#,
        )
        .unwrap();
        assert!(md.has_library());
        let bins = md.binaries();
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].name, "hello-cli");
    }

    #[test]
    fn test_invalid_package_version() {
        let err = Metadata::from_str(
            r#"
            [package]
            name = "hello"
            version = "not.a.version"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }
}
