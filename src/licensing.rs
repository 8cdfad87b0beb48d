// src/licensing.rs

//! License tag translation
//!
//! Crate manifests carry SPDX expressions (and, historically,
//! slash-separated lists). Fedora spec files want the distribution's
//! short names, so known SPDX tags are mapped and unknown ones are kept
//! with a FIXME comment for the packager.

use tracing::warn;

/// SPDX identifier → Fedora short name, for the tags that actually show
/// up on crates.io. An empty short name means the license is not on
/// Fedora's good-license list.
const SPDX_TO_FEDORA: &[(&str, &str)] = &[
    ("Apache-2.0", "ASL 2.0"),
    ("BSD-2-Clause", "BSD"),
    ("BSD-3-Clause", "BSD"),
    ("BSL-1.0", "Boost"),
    ("CC0-1.0", "CC0"),
    ("GPL-2.0-only", "GPLv2"),
    ("GPL-2.0-or-later", "GPLv2+"),
    ("GPL-3.0-only", "GPLv3"),
    ("GPL-3.0-or-later", "GPLv3+"),
    ("ISC", "ISC"),
    ("LGPL-2.1-only", "LGPLv2"),
    ("LGPL-2.1-or-later", "LGPLv2+"),
    ("LGPL-3.0-only", "LGPLv3"),
    ("LGPL-3.0-or-later", "LGPLv3+"),
    ("MIT", "MIT"),
    ("MPL-2.0", "MPLv2.0"),
    ("Unlicense", "Unlicense"),
    ("Zlib", "zlib"),
];

fn fedora_short_name(tag: &str) -> Option<&'static str> {
    SPDX_TO_FEDORA
        .iter()
        .find(|(spdx, _)| *spdx == tag)
        .map(|(_, fedora)| *fedora)
}

/// Replace the deprecated `/` separator with `OR`
pub fn translate_slashes(license: &str) -> String {
    let split: Vec<&str> = license.split('/').map(str::trim).collect();
    if split.len() > 1 {
        warn!("Upstream uses deprecated '/' license syntax, replacing with 'OR'");
    }
    split.join(" OR ")
}

/// Translate a license expression for a distribution target
///
/// Returns the translated expression plus FIXME comment lines for tags
/// that could not be mapped. Non-Fedora targets keep the expression
/// as-is (modulo slash normalization).
pub fn translate_license(fedora_style: bool, license: &str) -> (String, Option<String>) {
    let license = translate_slashes(license);
    if !fedora_style {
        return (license, None);
    }

    let mut comments = String::new();
    let mut translated = Vec::new();
    for tag in license.split_whitespace() {
        if tag.eq_ignore_ascii_case("OR") {
            translated.push("or".to_string());
        } else if tag.eq_ignore_ascii_case("AND") {
            translated.push("and".to_string());
        } else {
            match fedora_short_name(tag) {
                Some(mapped) => {
                    if mapped != tag {
                        warn!("Upstream license tag {} translated to {}", tag, mapped);
                    }
                    translated.push(mapped.to_string());
                }
                None => {
                    comments.push_str(&format!("# FIXME: Upstream uses unknown SPDX tag {tag}!\n"));
                    translated.push(tag.to_string());
                }
            }
        }
    }

    let comments = if comments.is_empty() {
        None
    } else {
        Some(comments)
    };
    (translated.join(" "), comments)
}
