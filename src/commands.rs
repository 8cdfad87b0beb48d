// src/commands.rs
//! Command implementation for the rust2rpm CLI

use anyhow::{Context, Result};
use rust2rpm::archive;
use rust2rpm::cli::Cli;
use rust2rpm::dependencies::normalize;
use rust2rpm::editor;
use rust2rpm::metadata::Metadata;
use rust2rpm::registry::{CrateCache, RegistryClient};
use rust2rpm::spec::{render_spec, PackageShape, SpecOptions};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Generate a spec file (and optional metadata patch) for a crate
pub fn generate(args: &Cli) -> Result<()> {
    let local_manifest = Path::new(&args.crate_name);
    let (metadata, diff) = if local_manifest.is_file() {
        if args.patch {
            anyhow::bail!("--patch only applies to crates fetched from crates.io");
        }
        info!("Reading local manifest {}", local_manifest.display());
        (Metadata::from_path(local_manifest)?, None)
    } else {
        fetch_and_parse(args)?
    };

    let tags = normalize(&metadata, args.target.mode())?;
    let shape = PackageShape::from_metadata(&metadata)?;

    let patch_file = diff
        .as_ref()
        .map(|_| format!("{}-{}-fix-metadata.diff", metadata.package.name, metadata.package.version));
    let options = SpecOptions {
        target: args.target,
        patch_file: patch_file.clone(),
        packager: editor::detect_packager(),
        date: chrono::Local::now().format("%a %b %d %Y").to_string(),
    };
    let spec = render_spec(&metadata, &tags, &shape, &options);
    let spec_file = format!("{}.spec", shape.spec_basename);

    if args.stdout {
        println!("# {spec_file}");
        print!("{spec}");
        if let (Some(patch_file), Some(diff)) = (&patch_file, &diff) {
            println!("# {patch_file}");
            print!("{diff}");
        }
    } else {
        fs::write(&spec_file, &spec).with_context(|| format!("writing {spec_file}"))?;
        info!("Wrote {}", spec_file);
        if let (Some(patch_file), Some(diff)) = (&patch_file, &diff) {
            fs::write(patch_file, diff).with_context(|| format!("writing {patch_file}"))?;
            info!("Wrote {}", patch_file);
        }
    }
    Ok(())
}

/// Download (or reuse from cache), extract, optionally patch, and parse
fn fetch_and_parse(args: &Cli) -> Result<(Metadata, Option<String>)> {
    let name = &args.crate_name;
    let client = RegistryClient::new()?;
    let version = match &args.version {
        Some(version) => version.clone(),
        None => {
            let latest = client.latest_version(name)?;
            info!("Latest version of {} is {}", name, latest);
            latest
        }
    };

    let cache = match &args.cache_dir {
        Some(dir) => CrateCache::new(dir),
        None => CrateCache::default_location()?,
    };
    let crate_file = cache.fetch(&client, name, &version)?;

    let tmpdir = tempfile::tempdir()?;
    let manifest = archive::extract_crate(&crate_file, tmpdir.path(), name, &version)?;

    let diff = if args.patch {
        editor::patch_manifest(&manifest, &format!("{name}-{version}/Cargo.toml"))?
    } else {
        None
    };

    let metadata = Metadata::from_path(&manifest)?;
    if &metadata.package.name != name {
        warn!(
            "Manifest package name '{}' differs from requested crate '{}'",
            metadata.package.name, name
        );
    }
    Ok((metadata, diff))
}
