// src/dependencies/features.rs

//! Feature activation resolution
//!
//! Expands the feature graph of a manifest into the set of activated
//! optional dependencies (and dependency features). Expansion is an
//! explicit depth-first walk with a path set, so activation cycles are
//! detected and reported instead of overflowing the stack.

use crate::error::{Error, Result};
use crate::metadata::{FeatureActivation, Metadata};
use std::collections::BTreeSet;
use tracing::trace;

/// An activated dependency, optionally with one of its features
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Activation {
    pub dependency: String,
    pub feature: Option<String>,
}

/// Resolve the activations in effect for a build
///
/// Every declared feature is walked once so cycles anywhere in the graph
/// are rejected, then the `default` feature's transitive activations are
/// returned (empty when `default_enabled` is false or the manifest
/// declares no default feature).
pub fn resolve_activations(
    metadata: &Metadata,
    default_enabled: bool,
) -> Result<BTreeSet<Activation>> {
    // Validate the whole graph up front; a cyclic feature map is a
    // malformed manifest even if the cycle is not reachable from default
    for feature in metadata.features.keys() {
        let mut sink = BTreeSet::new();
        expand(metadata, feature, &mut Vec::new(), &mut sink)?;
    }

    let mut activations = BTreeSet::new();
    if default_enabled && metadata.features.contains_key("default") {
        expand(metadata, "default", &mut Vec::new(), &mut activations)?;
    }
    trace!(count = activations.len(), "resolved feature activations");
    Ok(activations)
}

/// Expand a single declared feature into its transitive activation set
pub fn resolve_feature(metadata: &Metadata, feature: &str) -> Result<BTreeSet<Activation>> {
    if !metadata.features.contains_key(feature) {
        return Err(Error::UnknownReference {
            kind: "feature",
            name: feature.to_string(),
        });
    }
    let mut activations = BTreeSet::new();
    expand(metadata, feature, &mut Vec::new(), &mut activations)?;
    Ok(activations)
}

fn expand(
    metadata: &Metadata,
    feature: &str,
    path: &mut Vec<String>,
    out: &mut BTreeSet<Activation>,
) -> Result<()> {
    if path.iter().any(|f| f == feature) {
        return Err(Error::Cycle {
            feature: feature.to_string(),
        });
    }
    let Some(activations) = metadata.features.get(feature) else {
        // Token classification at the manifest boundary guarantees this
        return Err(Error::UnknownReference {
            kind: "feature",
            name: feature.to_string(),
        });
    };

    path.push(feature.to_string());
    for activation in activations {
        match activation {
            FeatureActivation::Feature(name) => expand(metadata, name, path, out)?,
            FeatureActivation::Dependency { name, feature } => {
                out.insert(Activation {
                    dependency: name.clone(),
                    feature: feature.clone(),
                });
            }
        }
    }
    path.pop();
    Ok(())
}
