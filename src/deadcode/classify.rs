//! Confidence and reason classification for dead-code findings.
//!
//! An ordered, hand-tuned rule table. The categories are the stable part:
//! high/medium/low confidence, "never imported" vs. cluster membership vs.
//! plausibly-implicit invocation. The substring patterns are project-tuned
//! and expected to be adjusted.

use serde::Serialize;

/// How certain the detector is that a finding is removable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Classify an unreachable module.
#[must_use]
pub fn classify_module(path: &str, cluster_size: usize) -> (Confidence, String) {
    if path.ends_with("__init__.py") || path.ends_with("/mod.rs") {
        return (
            Confidence::Low,
            "package marker (may be imported for side effects)".to_string(),
        );
    }
    if path.contains("migration") || path.contains("alembic") {
        return (
            Confidence::Medium,
            "migration script (may be an external entry)".to_string(),
        );
    }
    if cluster_size > 1 {
        return (
            Confidence::High,
            format!("part of zombie cluster ({cluster_size} files)"),
        );
    }
    (Confidence::High, "never imported".to_string())
}

/// Classify an uncalled symbol within a live module.
#[must_use]
pub fn classify_symbol(name: &str, kind: &str) -> (Confidence, String) {
    if name.starts_with("__") && name.ends_with("__") {
        return (
            Confidence::Low,
            "magic method (invoked implicitly)".to_string(),
        );
    }
    if name.starts_with("test_") {
        return (
            Confidence::Low,
            "test function (invoked by test runner)".to_string(),
        );
    }
    if name.starts_with('_') {
        return (
            Confidence::Medium,
            format!("private {kind} (may be internal API)"),
        );
    }
    (Confidence::High, format!("{kind} defined but never called"))
}
