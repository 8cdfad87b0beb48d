// src/dependencies/mod.rs

//! Dependency normalization
//!
//! Translates a manifest snapshot into the categorized RPM dependency
//! declarations embedded in the generated spec file. Every declaration
//! uses the `crate(name)` capability namespace:
//! `crate(serde)`, `crate(serde/derive) >= 1.0.0`.
//!
//! Output categories are `BTreeSet<String>`, which gives the two
//! invariants the spec template relies on for free: no duplicates and
//! lexicographic order.

pub mod features;

use crate::error::Result;
use crate::metadata::{Dependency, DependencyKind, Metadata};
use std::collections::BTreeSet;
use tracing::debug;

pub use features::{resolve_activations, resolve_feature, Activation};

/// How dependency declarations reach the final package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The distribution's cargo dependency generator emits runtime
    /// Requires/Provides; only build and test declarations are produced
    Layered,
    /// No external generator: runtime Requires, Conflicts, and Provides
    /// are emitted directly
    Flat,
}

/// Categorized, sorted, de-duplicated dependency declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTags {
    pub build_requires: BTreeSet<String>,
    pub build_conflicts: BTreeSet<String>,
    pub test_requires: BTreeSet<String>,
    pub test_conflicts: BTreeSet<String>,
    pub requires: BTreeSet<String>,
    pub conflicts: BTreeSet<String>,
    pub provides: BTreeSet<String>,
}

/// Normalize a manifest into RPM dependency declarations
///
/// Optional dependencies are included only when the default feature set
/// activates them. Failure is all-or-nothing: no partial tag set is
/// returned.
pub fn normalize(metadata: &Metadata, mode: Mode) -> Result<DependencyTags> {
    let activations = features::resolve_activations(metadata, true)?;

    let activated: BTreeSet<&str> = activations
        .iter()
        .map(|a| a.dependency.as_str())
        .collect();

    let mut tags = DependencyTags::default();
    for dep in &metadata.dependencies {
        if dep.optional && !activated.contains(dep.name.as_str()) {
            continue;
        }
        // Features requested for this dependency by activated features,
        // beyond the ones its own declaration lists
        let extra: BTreeSet<&str> = activations
            .iter()
            .filter(|a| a.dependency == dep.name)
            .filter_map(|a| a.feature.as_deref())
            .collect();
        let encoded = encode_dependency(dep, &extra);

        match dep.kind {
            DependencyKind::Normal => {
                if mode == Mode::Flat {
                    tags.requires.extend(encoded.iter().cloned());
                }
                tags.build_requires.extend(encoded);
            }
            DependencyKind::Build => {
                tags.build_requires.extend(encoded);
            }
            DependencyKind::Dev => {
                tags.test_requires.extend(encoded);
            }
        }
    }

    // Conflicts stay empty: every accepted requirement reduces to
    // conjoined lower/upper bounds, which the RPM resolver handles
    // without negative declarations. Requirement shapes that would need
    // one are rejected by the parser.

    if mode == Mode::Flat {
        let version = &metadata.package.version;
        tags.provides
            .insert(format!("crate({}) = {}", metadata.package.name, version));
        for feature in metadata.features.keys() {
            tags.provides.insert(format!(
                "crate({}/{}) = {}",
                metadata.package.name, feature, version
            ));
        }
    }

    debug!(
        build_requires = tags.build_requires.len(),
        test_requires = tags.test_requires.len(),
        requires = tags.requires.len(),
        provides = tags.provides.len(),
        "normalized dependencies"
    );
    Ok(tags)
}

/// Encode one dependency as capability strings: the bare capability plus
/// one per enabled feature, each bounded by the requirement's bounds
fn encode_dependency(dep: &Dependency, extra_features: &BTreeSet<&str>) -> Vec<String> {
    let mut feature_names: BTreeSet<Option<&str>> = BTreeSet::new();
    feature_names.insert(None);
    feature_names.extend(dep.features.iter().map(|f| Some(f.as_str())));
    feature_names.extend(extra_features.iter().copied().map(Some));

    let mut encoded = Vec::new();
    for feature in feature_names {
        let capability = match feature {
            Some(f) => format!("crate({}/{})", dep.name, f),
            None => format!("crate({})", dep.name),
        };
        if dep.range.is_any() {
            encoded.push(capability);
        } else {
            for bound in dep.range.bounds() {
                encoded.push(format!("{} {}", capability, bound));
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;

    fn tags(toml: &str, mode: Mode) -> DependencyTags {
        normalize(&Metadata::from_str(toml).unwrap(), mode).unwrap()
    }

    #[test]
    fn test_empty_manifest_provides_only_itself() {
        let t = tags(
            r#"
            [package]
            name = "hello"
            version = "0.0.0"
            "#,
            Mode::Flat,
        );
        assert_eq!(
            t.provides.iter().collect::<Vec<_>>(),
            vec!["crate(hello) = 0.0.0"]
        );
        assert!(t.build_requires.is_empty());
        assert!(t.requires.is_empty());
    }

    #[test]
    fn test_features_advertised_as_provides() {
        let t = tags(
            r#"
            [package]
            name = "hello"
            version = "1.2.3"

            [features]
            color = []
            "#,
            Mode::Flat,
        );
        assert_eq!(
            t.provides.iter().collect::<Vec<_>>(),
            vec!["crate(hello) = 1.2.3", "crate(hello/color) = 1.2.3"]
        );
    }

    #[test]
    fn test_caret_requirement_emits_bound_pair() {
        let t = tags(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            foo = "^1.2"
            "#,
            Mode::Layered,
        );
        assert_eq!(
            t.build_requires.iter().collect::<Vec<_>>(),
            vec!["crate(foo) < 2.0.0", "crate(foo) >= 1.2.0"]
        );
        assert!(t.requires.is_empty());
    }

    #[test]
    fn test_flat_mode_routes_runtime_requires() {
        let t = tags(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            foo = "=1.2.3"

            [build-dependencies]
            cc = "1.0.0"
            "#,
            Mode::Flat,
        );
        assert!(t.requires.contains("crate(foo) = 1.2.3"));
        assert!(!t.requires.contains("crate(cc) >= 1.0.0"));
        assert!(t.build_requires.contains("crate(foo) = 1.2.3"));
        assert!(t.build_requires.contains("crate(cc) >= 1.0.0"));
        assert!(t.build_requires.contains("crate(cc) < 2.0.0"));
    }

    #[test]
    fn test_dev_dependencies_route_to_test_requires() {
        let t = tags(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dev-dependencies]
            quickcheck = "=0.9.2"
            "#,
            Mode::Layered,
        );
        assert_eq!(
            t.test_requires.iter().collect::<Vec<_>>(),
            vec!["crate(quickcheck) = 0.9.2"]
        );
        assert!(t.build_requires.is_empty());
    }

    #[test]
    fn test_any_version_emits_bare_capability() {
        let t = tags(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            anything = "*"
            "#,
            Mode::Layered,
        );
        assert_eq!(
            t.build_requires.iter().collect::<Vec<_>>(),
            vec!["crate(anything)"]
        );
    }

    #[test]
    fn test_optional_dependency_gated_on_default_feature() {
        let without = tags(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            serde = { version = "=1.0.0", optional = true }
            "#,
            Mode::Layered,
        );
        assert!(without.build_requires.is_empty());

        let with = tags(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            serde = { version = "=1.0.0", optional = true }

            [features]
            default = ["serde"]
            "#,
            Mode::Layered,
        );
        assert_eq!(
            with.build_requires.iter().collect::<Vec<_>>(),
            vec!["crate(serde) = 1.0.0"]
        );
    }

    #[test]
    fn test_dependency_features_emit_capability_suffixes() {
        let t = tags(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            serde = { version = "=1.0.0", features = ["derive"] }
            "#,
            Mode::Layered,
        );
        assert_eq!(
            t.build_requires.iter().collect::<Vec<_>>(),
            vec!["crate(serde) = 1.0.0", "crate(serde/derive) = 1.0.0"]
        );
    }

    #[test]
    fn test_activated_dependency_feature_from_feature_graph() {
        let t = tags(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            serde = { version = "=1.0.0", optional = true }

            [features]
            default = ["serde/derive"]
            "#,
            Mode::Layered,
        );
        assert!(t.build_requires.contains("crate(serde) = 1.0.0"));
        assert!(t.build_requires.contains("crate(serde/derive) = 1.0.0"));
    }

    #[test]
    fn test_idempotent_and_sorted() {
        let toml = r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            zlib = "^1"
            alpha = "~0.4"

            [dev-dependencies]
            alpha = "~0.4"
        "#;
        let first = tags(toml, Mode::Flat);
        let second = tags(toml, Mode::Flat);
        assert_eq!(first, second);

        let listed: Vec<&String> = first.build_requires.iter().collect();
        let mut sorted = listed.clone();
        sorted.sort();
        assert_eq!(listed, sorted);

        // Same dependency in two buckets is normalized per bucket
        assert!(first.build_requires.contains("crate(alpha) >= 0.4.0"));
        assert!(first.test_requires.contains("crate(alpha) >= 0.4.0"));
    }

    #[test]
    fn test_conflicts_stay_empty() {
        let t = tags(
            r#"
            [package]
            name = "hello"
            version = "1.0.0"

            [dependencies]
            foo = ">=1.0, <2.0"
            "#,
            Mode::Flat,
        );
        assert!(t.build_conflicts.is_empty());
        assert!(t.test_conflicts.is_empty());
        assert!(t.conflicts.is_empty());
    }
}
