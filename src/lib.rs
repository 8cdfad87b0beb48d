// src/lib.rs

//! rust2rpm
//!
//! Generates RPM spec files from crates.io package metadata.
//!
//! # Architecture
//!
//! - `metadata`: typed, validated manifest model (parsed once, immutable)
//! - `version`: cargo requirement expressions → RPM version bounds
//! - `dependencies`: the normalization core — categorized, sorted,
//!   de-duplicated `crate(...)` dependency declarations
//! - `registry` / `archive`: crates.io download cache and safe extraction
//! - `spec`: packaging shape and spec file rendering
//!
//! The normalization core is pure: it consumes an immutable [`metadata::Metadata`]
//! snapshot and produces fresh output on every call, with no I/O.

pub mod archive;
pub mod cli;
pub mod dependencies;
pub mod editor;
mod error;
pub mod licensing;
pub mod metadata;
pub mod registry;
pub mod spec;
pub mod version;

pub use dependencies::{normalize, Activation, DependencyTags, Mode};
pub use error::{Error, Result};
pub use metadata::{Dependency, DependencyKind, Metadata, PackageIdentity, Target, TargetKind};
pub use spec::{render_spec, DistroTarget, PackageShape, SpecOptions};
pub use version::{Bound, CmpOp, VersionRange};
