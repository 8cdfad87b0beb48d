// src/version/mod.rs

//! Version requirement parsing for crate dependencies
//!
//! This module parses cargo-style version requirement expressions
//! (caret, tilde, wildcard, and explicit comparator forms) into a
//! normalized list of RPM-expressible version bounds.

use crate::error::{Error, Result};
use semver::Version;
use std::fmt;

/// Comparison operator usable in an RPM dependency declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Equal => "=",
            CmpOp::Greater => ">",
            CmpOp::GreaterOrEqual => ">=",
            CmpOp::Less => "<",
            CmpOp::LessOrEqual => "<=",
        };
        write!(f, "{}", s)
    }
}

/// A single version bound, e.g. `>= 1.2.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub op: CmpOp,
    pub version: Version,
}

impl Bound {
    fn new(op: CmpOp, version: Version) -> Self {
        Self { op, version }
    }

    /// Check whether a version satisfies this bound
    pub fn satisfies(&self, version: &Version) -> bool {
        match self.op {
            CmpOp::Equal => version == &self.version,
            CmpOp::Greater => version > &self.version,
            CmpOp::GreaterOrEqual => version >= &self.version,
            CmpOp::Less => version < &self.version,
            CmpOp::LessOrEqual => version <= &self.version,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.version)
    }
}

/// A normalized version range: the conjunction of zero or more bounds
///
/// An empty bound list means "any version". Caret, tilde, and wildcard
/// requirements expand to a lower bound plus an exclusive ceiling; each
/// bound later becomes one RPM dependency string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionRange {
    bounds: Vec<Bound>,
}

/// A version with possibly-missing trailing components, as written in a
/// requirement expression (`1`, `1.2`, `1.2.3`, `1.2.*`)
struct PartialVersion {
    major: u64,
    minor: Option<u64>,
    patch: Option<u64>,
    wildcard: bool,
}

impl PartialVersion {
    fn parse(expr: &str, text: &str) -> Result<Self> {
        if text.contains('+') {
            return Err(Error::unsupported(expr, "build metadata in requirement"));
        }
        if text.contains('-') {
            return Err(Error::unsupported(expr, "pre-release requirement"));
        }

        let mut components = [None::<u64>; 3];
        let mut saw_wildcard = false;
        for (idx, part) in text.split('.').enumerate() {
            if idx >= 3 {
                return Err(Error::parse(expr, "too many version components"));
            }
            if saw_wildcard {
                return Err(Error::parse(expr, "component after wildcard"));
            }
            if part == "*" {
                // A wildcard component behaves like a missing one
                saw_wildcard = true;
                continue;
            }
            let value = part
                .parse::<u64>()
                .map_err(|_| Error::parse(expr, format!("invalid version component '{part}'")))?;
            components[idx] = Some(value);
        }

        let major = components[0]
            .ok_or_else(|| Error::parse(expr, "missing major version component"))?;

        Ok(Self {
            major,
            minor: components[1],
            patch: components[2],
            wildcard: saw_wildcard,
        })
    }

    fn is_full(&self) -> bool {
        self.minor.is_some() && self.patch.is_some()
    }

    /// Coerce missing components to zero
    fn floor(&self) -> Version {
        Version::new(self.major, self.minor.unwrap_or(0), self.patch.unwrap_or(0))
    }

    fn next_major(&self) -> Version {
        Version::new(self.major + 1, 0, 0)
    }

    fn next_minor(&self) -> Version {
        Version::new(self.major, self.minor.unwrap_or(0) + 1, 0)
    }

    fn next_patch(&self) -> Version {
        Version::new(
            self.major,
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0) + 1,
        )
    }
}

/// Operator prefixes, two-character forms first so `>=` never parses as `>`
const OPERATORS: &[(&str, ReqKind)] = &[
    (">=", ReqKind::GreaterOrEqual),
    ("<=", ReqKind::LessOrEqual),
    (">", ReqKind::Greater),
    ("<", ReqKind::Less),
    ("=", ReqKind::Equal),
    ("^", ReqKind::Caret),
    ("~", ReqKind::Tilde),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReqKind {
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Caret,
    Tilde,
    /// No operator written: caret semantics for full versions, wildcard
    /// expansion for partial ones
    Bare,
}

impl VersionRange {
    /// Parse a requirement expression into a normalized range
    ///
    /// The expression is a comma-separated list of comparators; the
    /// resulting bounds are intersected. An empty expression or `*`
    /// yields the "any version" range.
    pub fn parse(expr: &str) -> Result<Self> {
        let trimmed = expr.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(Self::any());
        }

        let mut bounds = Vec::new();
        for comparator in trimmed.split(',') {
            let comparator = comparator.trim();
            if comparator.is_empty() {
                return Err(Error::parse(expr, "empty comparator"));
            }
            bounds.extend(Self::parse_comparator(comparator)?);
        }
        Ok(Self { bounds })
    }

    /// The range accepting every version
    pub fn any() -> Self {
        Self { bounds: Vec::new() }
    }

    /// True if this range accepts any version (no bounds)
    pub fn is_any(&self) -> bool {
        self.bounds.is_empty()
    }

    /// The individual bounds, in emission order
    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    /// Check whether a version satisfies every bound of this range
    pub fn satisfies(&self, version: &Version) -> bool {
        self.bounds.iter().all(|b| b.satisfies(version))
    }

    fn parse_comparator(comparator: &str) -> Result<Vec<Bound>> {
        let mut kind = ReqKind::Bare;
        let mut rest = comparator;
        for (prefix, op_kind) in OPERATORS {
            if let Some(stripped) = comparator.strip_prefix(prefix) {
                kind = *op_kind;
                rest = stripped.trim_start();
                break;
            }
        }

        if rest == "*" {
            // `*` is only meaningful on its own
            return if kind == ReqKind::Bare {
                Ok(Vec::new())
            } else {
                Err(Error::parse(comparator, "wildcard with explicit operator"))
            };
        }

        let partial = PartialVersion::parse(comparator, rest)?;
        if partial.wildcard && kind != ReqKind::Bare {
            return Err(Error::parse(comparator, "wildcard with explicit operator"));
        }
        if !partial.is_full() && !matches!(kind, ReqKind::Bare | ReqKind::Caret | ReqKind::Tilde) {
            if kind == ReqKind::Equal {
                // `=1.2` pins the given components and wildcards the rest
                return Ok(Self::wildcard_bounds(&partial));
            }
            // Relational operators coerce missing components to zero
        }

        let bounds = match kind {
            ReqKind::Caret => Self::caret_bounds(&partial),
            ReqKind::Tilde => Self::tilde_bounds(&partial),
            ReqKind::Bare => {
                if partial.is_full() {
                    Self::caret_bounds(&partial)
                } else {
                    Self::wildcard_bounds(&partial)
                }
            }
            ReqKind::Equal => vec![Bound::new(CmpOp::Equal, partial.floor())],
            ReqKind::Greater => vec![Bound::new(CmpOp::Greater, partial.floor())],
            ReqKind::GreaterOrEqual => vec![Bound::new(CmpOp::GreaterOrEqual, partial.floor())],
            ReqKind::Less => vec![Bound::new(CmpOp::Less, partial.floor())],
            ReqKind::LessOrEqual => vec![Bound::new(CmpOp::LessOrEqual, partial.floor())],
        };
        Ok(bounds)
    }

    /// Caret: compatible within the leftmost non-zero component
    fn caret_bounds(partial: &PartialVersion) -> Vec<Bound> {
        let ceiling = if partial.major > 0 {
            partial.next_major()
        } else if let Some(minor) = partial.minor {
            if minor != 0 || partial.patch.is_none() {
                partial.next_minor()
            } else {
                partial.next_patch()
            }
        } else {
            partial.next_major()
        };
        vec![
            Bound::new(CmpOp::GreaterOrEqual, partial.floor()),
            Bound::new(CmpOp::Less, ceiling),
        ]
    }

    /// Tilde: same minor when minor is given, else same major
    fn tilde_bounds(partial: &PartialVersion) -> Vec<Bound> {
        let ceiling = if partial.minor.is_some() {
            partial.next_minor()
        } else {
            partial.next_major()
        };
        vec![
            Bound::new(CmpOp::GreaterOrEqual, partial.floor()),
            Bound::new(CmpOp::Less, ceiling),
        ]
    }

    /// Missing trailing components wildcard the remainder
    fn wildcard_bounds(partial: &PartialVersion) -> Vec<Bound> {
        let ceiling = if partial.minor.is_none() {
            partial.next_major()
        } else {
            partial.next_minor()
        };
        vec![
            Bound::new(CmpOp::GreaterOrEqual, partial.floor()),
            Bound::new(CmpOp::Less, ceiling),
        ]
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bounds.is_empty() {
            return write!(f, "*");
        }
        for (idx, bound) in self.bounds.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", bound)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn bounds_of(expr: &str) -> Vec<String> {
        VersionRange::parse(expr)
            .unwrap()
            .bounds()
            .iter()
            .map(|b| b.to_string())
            .collect()
    }

    #[test]
    fn test_any() {
        let r = VersionRange::parse("*").unwrap();
        assert!(r.is_any());
        assert!(r.satisfies(&v("99.99.99")));

        let r = VersionRange::parse("").unwrap();
        assert!(r.is_any());
    }

    #[test]
    fn test_caret_full() {
        assert_eq!(bounds_of("^1.2.3"), vec![">= 1.2.3", "< 2.0.0"]);
        let r = VersionRange::parse("^1.2.3").unwrap();
        assert!(r.satisfies(&v("1.9.9")));
        assert!(!r.satisfies(&v("2.0.0")));
        assert!(!r.satisfies(&v("1.2.2")));
    }

    #[test]
    fn test_caret_zero_major() {
        assert_eq!(bounds_of("^0.2.3"), vec![">= 0.2.3", "< 0.3.0"]);
        assert_eq!(bounds_of("^0.0.3"), vec![">= 0.0.3", "< 0.0.4"]);
        assert_eq!(bounds_of("^0.0"), vec![">= 0.0.0", "< 0.1.0"]);
        assert_eq!(bounds_of("^0"), vec![">= 0.0.0", "< 1.0.0"]);
    }

    #[test]
    fn test_caret_partial() {
        assert_eq!(bounds_of("^1.2"), vec![">= 1.2.0", "< 2.0.0"]);
        assert_eq!(bounds_of("^1"), vec![">= 1.0.0", "< 2.0.0"]);
    }

    #[test]
    fn test_tilde() {
        assert_eq!(bounds_of("~1.2.3"), vec![">= 1.2.3", "< 1.3.0"]);
        assert_eq!(bounds_of("~1.2"), vec![">= 1.2.0", "< 1.3.0"]);
        assert_eq!(bounds_of("~1"), vec![">= 1.0.0", "< 2.0.0"]);
        let r = VersionRange::parse("~1.2.3").unwrap();
        assert!(r.satisfies(&v("1.2.9")));
        assert!(!r.satisfies(&v("1.3.0")));
    }

    #[test]
    fn test_bare_full_is_caret() {
        assert_eq!(bounds_of("1.2.3"), vec![">= 1.2.3", "< 2.0.0"]);
    }

    #[test]
    fn test_bare_partial_is_wildcard() {
        assert_eq!(bounds_of("1.2"), vec![">= 1.2.0", "< 1.3.0"]);
        assert_eq!(bounds_of("1"), vec![">= 1.0.0", "< 2.0.0"]);
    }

    #[test]
    fn test_component_wildcards() {
        assert_eq!(bounds_of("1.*"), vec![">= 1.0.0", "< 2.0.0"]);
        assert_eq!(bounds_of("1.2.*"), vec![">= 1.2.0", "< 1.3.0"]);
    }

    #[test]
    fn test_explicit_operators() {
        assert_eq!(bounds_of("=1.2.3"), vec!["= 1.2.3"]);
        assert_eq!(bounds_of(">1.2.3"), vec!["> 1.2.3"]);
        assert_eq!(bounds_of(">=1.2"), vec![">= 1.2.0"]);
        assert_eq!(bounds_of("<2"), vec!["< 2.0.0"]);
        assert_eq!(bounds_of("<=1.4.1"), vec!["<= 1.4.1"]);
    }

    #[test]
    fn test_equal_partial_wildcards() {
        assert_eq!(bounds_of("=1.2"), vec![">= 1.2.0", "< 1.3.0"]);
    }

    #[test]
    fn test_intersection() {
        assert_eq!(bounds_of(">=1.0, <2.0"), vec![">= 1.0.0", "< 2.0.0"]);
        let r = VersionRange::parse(">= 1.0.0, < 2.0.0").unwrap();
        assert!(r.satisfies(&v("1.5.0")));
        assert!(!r.satisfies(&v("2.0.0")));
        assert!(!r.satisfies(&v("0.9.0")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            VersionRange::parse("abc"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            VersionRange::parse(">=1.0,"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            VersionRange::parse("1.2.3.4"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            VersionRange::parse("1.*.3"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            VersionRange::parse(">=1.*"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_unsupported_requirements() {
        assert!(matches!(
            VersionRange::parse("1.0.0-alpha"),
            Err(Error::Unsupported { .. })
        ));
        assert!(matches!(
            VersionRange::parse("1.0.0+build5"),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        let r = VersionRange::parse("^1.2.3").unwrap();
        assert_eq!(r.to_string(), ">= 1.2.3, < 2.0.0");
        assert_eq!(VersionRange::any().to_string(), "*");
    }
}
