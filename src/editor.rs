// src/editor.rs

//! Interactive metadata patching
//!
//! Lets the packager edit the extracted Cargo.toml before dependency
//! normalization, and turns the edit into a unified diff shipped as
//! Patch0 next to the generated spec.

use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

const DEFAULT_EDITOR: &str = "vi";

/// Pick the editor to launch, honoring $VISUAL and $EDITOR
///
/// $VISUAL is only considered on a capable terminal; on a dumb terminal
/// an unset $EDITOR is an error rather than a silent fallback.
pub fn detect_editor() -> Result<String> {
    let terminal_is_dumb = env::var("TERM").map(|t| t == "dumb").unwrap_or(true);

    if !terminal_is_dumb {
        if let Ok(visual) = env::var("VISUAL") {
            if !visual.is_empty() {
                return Ok(visual);
            }
        }
    }
    if let Ok(editor) = env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }
    if terminal_is_dumb {
        return Err(Error::Environment(
            "terminal is dumb, but EDITOR is unset".into(),
        ));
    }
    Ok(DEFAULT_EDITOR.to_string())
}

/// Figure out the `Name <email>` changelog author
///
/// Tries `rpmdev-packager`, then git configuration. Returns None when
/// neither is available; the renderer falls back to a placeholder.
pub fn detect_packager() -> Option<String> {
    if let Ok(tool) = which::which("rpmdev-packager") {
        if let Some(output) = run_for_stdout(&mut Command::new(tool)) {
            return Some(output);
        }
    }

    if let Ok(git) = which::which("git") {
        let name = run_for_stdout(Command::new(&git).args(["config", "user.name"]))?;
        let email = run_for_stdout(Command::new(&git).args(["config", "user.email"]))?;
        return Some(format!("{name} <{email}>"));
    }

    warn!("Could not detect packager identity");
    None
}

fn run_for_stdout(command: &mut Command) -> Option<String> {
    let output = command.output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Open the manifest in the packager's editor and capture the change
///
/// Returns the unified diff with `rel_path` headers, or None when the
/// file was left untouched.
pub fn patch_manifest(manifest: &Path, rel_path: &str) -> Result<Option<String>> {
    let editor = detect_editor()?;
    let before = fs::read_to_string(manifest)?;

    debug!("Launching editor '{}' on {}", editor, manifest.display());
    let status = Command::new(&editor)
        .arg(manifest)
        .status()
        .map_err(|e| Error::Editor(format!("failed to launch '{editor}': {e}")))?;
    if !status.success() {
        return Err(Error::Editor(format!("'{editor}' exited with {status}")));
    }

    let after = fs::read_to_string(manifest)?;
    if before == after {
        return Ok(None);
    }
    Ok(Some(unified_diff(&before, &after, rel_path)))
}

/// Unified diff with both headers set to the in-archive path, so the
/// result applies with `%autosetup -p1`
pub fn unified_diff(before: &str, after: &str, rel_path: &str) -> String {
    let patch = diffy::create_patch(before, after);
    let rendered = patch.to_string();

    // diffy hardcodes "original"/"modified" in the file headers
    let mut lines = rendered.lines();
    let mut out = String::new();
    if lines.next().is_some() {
        out.push_str(&format!("--- {rel_path}\n"));
    }
    if lines.next().is_some() {
        out.push_str(&format!("+++ {rel_path}\n"));
    }
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_diff_headers() {
        let diff = unified_diff(
            "[package]\nname = \"hello\"\n",
            "[package]\nname = \"goodbye\"\n",
            "hello-1.0.0/Cargo.toml",
        );
        assert!(diff.starts_with("--- hello-1.0.0/Cargo.toml\n+++ hello-1.0.0/Cargo.toml\n"));
        assert!(diff.contains("-name = \"hello\""));
        assert!(diff.contains("+name = \"goodbye\""));
    }

    #[test]
    fn test_unified_diff_hunk_markers() {
        let diff = unified_diff("a\nb\nc\n", "a\nx\nc\n", "f");
        assert!(diff.contains("@@"));
    }
}
