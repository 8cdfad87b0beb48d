// src/spec/mod.rs

//! Spec file generation
//!
//! Decides the packaging shape (main package for executables, a noarch
//! `-devel` subpackage for library source) and renders the final spec
//! text. Rendering is a plain writer over the normalized dependency
//! tags; output is byte-stable for a given manifest and options.

use crate::dependencies::{DependencyTags, Mode};
use crate::error::{Error, Result};
use crate::licensing;
use crate::metadata::Metadata;
use clap::ValueEnum;
use std::fmt::Write;

/// Distribution target the spec is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DistroTarget {
    /// Fedora: the cargo dependency generator emits runtime deps
    Fedora,
    /// Plain RPM: all dependency declarations written into the spec
    Plain,
    /// EPEL 7: like plain, no dependency generator available
    #[value(name = "epel-7")]
    Epel7,
}

impl DistroTarget {
    /// Dependency emission mode for this target
    pub fn mode(self) -> Mode {
        match self {
            DistroTarget::Fedora => Mode::Layered,
            DistroTarget::Plain | DistroTarget::Epel7 => Mode::Flat,
        }
    }

    /// Whether license tags are mapped to Fedora short names
    pub fn fedora_licensing(self) -> bool {
        matches!(self, DistroTarget::Fedora | DistroTarget::Epel7)
    }
}

/// Packaging shape derived from the manifest's build targets
#[derive(Debug, Clone)]
pub struct PackageShape {
    /// Base name of the generated spec file (without `.spec`)
    pub spec_basename: String,
    /// Value of the `Name:` tag
    pub name: String,
    /// `%package` argument for the devel subpackage, if any
    pub devel: Option<String>,
    /// Emit a main `%files` section with the binaries
    pub include_main: bool,
    /// Keep the debuginfo package (binaries present)
    pub include_debug: bool,
    /// Names of executable targets
    pub bins: Vec<String>,
}

impl PackageShape {
    /// Decide the shape from the manifest's targets
    pub fn from_metadata(metadata: &Metadata) -> Result<Self> {
        let bins: Vec<String> = metadata
            .binaries()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        let is_lib = metadata.has_library();

        if !bins.is_empty() {
            Ok(Self {
                spec_basename: metadata.package.name.clone(),
                name: "%{crate}".to_string(),
                devel: is_lib.then(|| "-n rust-%{crate}-devel".to_string()),
                include_main: true,
                include_debug: true,
                bins,
            })
        } else if is_lib {
            Ok(Self {
                spec_basename: format!("rust-{}", metadata.package.name),
                name: "rust-%{crate}".to_string(),
                devel: Some("devel".to_string()),
                include_main: false,
                include_debug: false,
                bins,
            })
        } else {
            Err(Error::Manifest(
                "manifest declares no library or binary targets".into(),
            ))
        }
    }
}

/// Everything the renderer needs besides the manifest and tags
#[derive(Debug, Clone)]
pub struct SpecOptions {
    pub target: DistroTarget,
    /// Filename of the metadata patch referenced as Patch0
    pub patch_file: Option<String>,
    /// Changelog author, `Name <email>` form
    pub packager: Option<String>,
    /// Changelog date, `Day Mon DD YYYY` form
    pub date: String,
}

const DEFAULT_PACKAGER: &str = "rust2rpm <nobody@fedoraproject.org>";

/// Render the complete spec file text
pub fn render_spec(
    metadata: &Metadata,
    tags: &DependencyTags,
    shape: &PackageShape,
    options: &SpecOptions,
) -> String {
    let mut out = String::new();
    // Infallible writes into a String
    let _ = render(&mut out, metadata, tags, shape, options);
    out
}

fn render(
    out: &mut String,
    metadata: &Metadata,
    tags: &DependencyTags,
    shape: &PackageShape,
    options: &SpecOptions,
) -> std::fmt::Result {
    let crate_name = &metadata.package.name;
    let flat = options.target.mode() == Mode::Flat;

    writeln!(out, "# Generated by rust2rpm")?;
    writeln!(out, "%bcond_without check")?;
    if !shape.include_debug {
        writeln!(out, "%global debug_package %{{nil}}")?;
    }
    writeln!(out)?;
    writeln!(out, "%global crate {crate_name}")?;
    writeln!(out)?;
    writeln!(out, "Name:           {}", shape.name)?;
    writeln!(out, "Version:        {}", metadata.package.version)?;
    writeln!(out, "Release:        1%{{?dist}}")?;
    match &metadata.description {
        Some(description) => {
            let summary = description.split_whitespace().collect::<Vec<_>>().join(" ");
            writeln!(out, "Summary:        {summary}")?;
        }
        None => writeln!(out, "Summary:        # FIXME")?,
    }
    writeln!(out)?;

    match &metadata.license {
        Some(license) => {
            let (license, comments) =
                licensing::translate_license(options.target.fedora_licensing(), license);
            if let Some(comments) = comments {
                out.push_str(&comments);
            }
            writeln!(out, "License:        {license}")?;
        }
        None => writeln!(out, "License:        # FIXME")?,
    }
    writeln!(out, "URL:            https://crates.io/crates/{crate_name}")?;
    writeln!(
        out,
        "Source0:        https://crates.io/api/v1/crates/%{{crate}}/%{{version}}/download#/%{{crate}}-%{{version}}.crate"
    )?;
    if let Some(patch_file) = &options.patch_file {
        writeln!(out, "# Initial patched metadata")?;
        writeln!(out, "Patch0:         {patch_file}")?;
    }
    writeln!(out)?;
    writeln!(out, "ExclusiveArch:  %{{rust_arches}}")?;
    writeln!(out)?;
    writeln!(out, "BuildRequires:  rust")?;
    writeln!(out, "BuildRequires:  cargo")?;

    if !tags.build_requires.is_empty() {
        writeln!(out, "# [dependencies]")?;
        for req in &tags.build_requires {
            writeln!(out, "BuildRequires:  {req}")?;
        }
    }
    for conflict in &tags.build_conflicts {
        writeln!(out, "BuildConflicts: {conflict}")?;
    }
    if !tags.test_requires.is_empty() || !tags.test_conflicts.is_empty() {
        writeln!(out, "%if %{{with check}}")?;
        writeln!(out, "# [dev-dependencies]")?;
        for req in &tags.test_requires {
            writeln!(out, "BuildRequires:  {req}")?;
        }
        for conflict in &tags.test_conflicts {
            writeln!(out, "BuildConflicts: {conflict}")?;
        }
        writeln!(out, "%endif")?;
    }
    writeln!(out)?;
    writeln!(out, "%description")?;
    writeln!(out, "%{{summary}}.")?;
    writeln!(out)?;

    if let Some(devel) = &shape.devel {
        writeln!(out, "%package        {devel}")?;
        writeln!(out, "Summary:        %{{summary}}")?;
        writeln!(out, "BuildArch:      noarch")?;
        if flat {
            for provide in &tags.provides {
                writeln!(out, "Provides:       {provide}")?;
            }
            for req in &tags.requires {
                writeln!(out, "Requires:       {req}")?;
            }
            for conflict in &tags.conflicts {
                writeln!(out, "Conflicts:      {conflict}")?;
            }
        }
        writeln!(out)?;
        writeln!(out, "%description    {devel}")?;
        match &metadata.description {
            Some(description) => writeln!(out, "{}", description.trim())?,
            None => writeln!(out, "%{{summary}}.")?,
        }
        writeln!(out)?;
        writeln!(
            out,
            "This package contains library source intended for building other packages"
        )?;
        writeln!(out, "which use %{{crate}} from crates.io.")?;
        writeln!(out)?;
    }

    writeln!(out, "%prep")?;
    writeln!(out, "%autosetup -n %{{crate}}-%{{version}} -p1")?;
    writeln!(out, "%cargo_prep")?;
    writeln!(out)?;
    writeln!(out, "%build")?;
    writeln!(out, "%cargo_build")?;
    writeln!(out)?;
    writeln!(out, "%install")?;
    writeln!(out, "%cargo_install")?;
    writeln!(out)?;
    writeln!(out, "%if %{{with check}}")?;
    writeln!(out, "%check")?;
    writeln!(out, "%cargo_test")?;
    writeln!(out, "%endif")?;
    writeln!(out)?;

    if shape.include_main {
        writeln!(out, "%files")?;
        if let Some(license_file) = &metadata.license_file {
            writeln!(out, "%license {license_file}")?;
        }
        for bin in &shape.bins {
            writeln!(out, "%{{_bindir}}/{bin}")?;
        }
        writeln!(out)?;
    }
    if let Some(devel) = &shape.devel {
        writeln!(out, "%files          {devel}")?;
        if let Some(license_file) = &metadata.license_file {
            writeln!(out, "%license {license_file}")?;
        }
        writeln!(out, "%{{cargo_registry}}/%{{crate}}-%{{version}}/")?;
        writeln!(out)?;
    }

    writeln!(out, "%changelog")?;
    writeln!(
        out,
        "* {} {} - {}-1",
        options.date,
        options.packager.as_deref().unwrap_or(DEFAULT_PACKAGER),
        metadata.package.version
    )?;
    writeln!(out, "- Initial package")?;
    Ok(())
}
