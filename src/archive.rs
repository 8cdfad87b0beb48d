// src/archive.rs

//! Safe extraction of downloaded .crate archives
//!
//! A .crate file is a gzip-compressed tar with a single
//! `<name>-<version>/` top-level directory. Every entry path is
//! validated before extraction; anything that would escape the target
//! directory aborts the whole extraction.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::debug;

/// Extract a .crate archive into `dest_dir`
///
/// Returns the path to the extracted `Cargo.toml`.
pub fn extract_crate(crate_file: &Path, dest_dir: &Path, name: &str, version: &str) -> Result<PathBuf> {
    let file = File::open(crate_file)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        validate_entry_path(&path)?;
        // unpack_in re-checks containment and creates parent directories
        entry.unpack_in(dest_dir)?;
    }
    debug!("Extracted {} into {}", crate_file.display(), dest_dir.display());

    let manifest = dest_dir.join(format!("{name}-{version}")).join("Cargo.toml");
    if !manifest.is_file() {
        return Err(Error::Manifest(format!(
            "archive {} does not contain {}-{}/Cargo.toml",
            crate_file.display(),
            name,
            version
        )));
    }
    Ok(manifest)
}

/// Reject absolute paths and any `..` component
fn validate_entry_path(path: &Path) -> Result<()> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafePath(path.display().to_string()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn build_crate_archive(entries: &[(&str, &str)]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let encoder = GzEncoder::new(file.reopen().unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, contents.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap().flush().unwrap();
        file
    }

    #[test]
    fn test_extracts_manifest() {
        let archive = build_crate_archive(&[
            ("hello-1.0.0/Cargo.toml", "[package]\nname = \"hello\"\nversion = \"1.0.0\"\n"),
            ("hello-1.0.0/src/lib.rs", "pub fn hello() {}\n"),
        ]);
        let dest = tempfile::tempdir().unwrap();
        let manifest = extract_crate(archive.path(), dest.path(), "hello", "1.0.0").unwrap();
        assert!(manifest.ends_with("hello-1.0.0/Cargo.toml"));
        assert!(manifest.is_file());
    }

    #[test]
    fn test_rejects_path_traversal() {
        // tar::Builder refuses to create `..` paths, so write the header
        // name bytes directly
        let file = tempfile::NamedTempFile::new().unwrap();
        let encoder = GzEncoder::new(file.reopen().unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let contents = b"pwned";
        let mut header = tar::Header::new_gnu();
        let name = b"../evil.txt";
        header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name);
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, &contents[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap().flush().unwrap();
        let archive = file;
        let dest = tempfile::tempdir().unwrap();
        let err = extract_crate(archive.path(), dest.path(), "hello", "1.0.0").unwrap_err();
        assert!(matches!(err, Error::UnsafePath(_)));
        assert!(!dest.path().parent().unwrap().join("evil.txt").exists());
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let archive = build_crate_archive(&[("hello-1.0.0/README.md", "hi")]);
        let dest = tempfile::tempdir().unwrap();
        let err = extract_crate(archive.path(), dest.path(), "hello", "1.0.0").unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }
}
