// src/cli.rs
//! CLI definitions for rust2rpm
//!
//! This module contains the command-line interface definition using clap.
//! The actual implementation is in the `commands` module.

use crate::spec::DistroTarget;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rust2rpm")]
#[command(version)]
#[command(about = "Generate RPM spec files from crates.io package metadata", long_about = None)]
pub struct Cli {
    /// crates.io crate name, or a path to a local Cargo.toml
    pub crate_name: String,

    /// crates.io version (defaults to the latest published version)
    pub version: Option<String>,

    /// Distribution target
    #[arg(short, long, value_enum, default_value = "fedora")]
    pub target: DistroTarget,

    /// Edit the extracted Cargo.toml before generation and ship the
    /// change as Patch0
    #[arg(short, long)]
    pub patch: bool,

    /// Print the spec (and patch) to stdout instead of writing files
    #[arg(short, long)]
    pub stdout: bool,

    /// Directory for cached .crate downloads
    /// (default: <user cache dir>/rust2rpm)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}
