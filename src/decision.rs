// src/decision.rs
//! Quality gate: the final call on whether and how an edition is published.
//!
//! An unattended pipeline must never silently send an empty or garbage
//! digest, nor silently fail without record. Critical warnings carry the
//! `CRITICAL:` prefix and always reach the operator channel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Edition {
    Full,
    Degraded,
    Suppressed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditionDecision {
    pub should_publish: bool,
    pub edition: Edition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EditionDecision {
    pub fn has_critical_warning(&self) -> bool {
        self.warnings.iter().any(|w| w.starts_with("CRITICAL:"))
    }
}

/// Per-category publication inputs, resolved by the pipeline.
#[derive(Debug, Clone)]
pub struct SectionStatus {
    pub category: String,
    pub records: usize,
    pub used_fallback: bool,
}

impl SectionStatus {
    fn is_real(&self) -> bool {
        self.records > 0 && !self.used_fallback
    }
}

/// Decide the edition from aggregate section state plus the optional
/// auxiliary manual content.
pub fn decide(sections: &[SectionStatus], has_manual_content: bool) -> EditionDecision {
    let real = sections.iter().filter(|s| s.is_real()).count();
    let any_content = has_manual_content || sections.iter().any(|s| s.records > 0);

    let mut warnings = Vec::new();
    for s in sections {
        if s.used_fallback && s.records > 0 {
            warnings.push(format!(
                "category `{}` carries fallback summaries instead of analysis",
                s.category
            ));
        }
    }

    if real >= 1 {
        if real == 1 {
            warnings.push("only one category produced full analysis".to_string());
        }
        return EditionDecision {
            should_publish: true,
            edition: Edition::Full,
            warnings,
        };
    }

    if any_content {
        warnings.push(
            "CRITICAL: no category produced full analysis; publishing degraded edition".to_string(),
        );
        return EditionDecision {
            should_publish: true,
            edition: Edition::Degraded,
            warnings,
        };
    }

    warnings.push("CRITICAL: no publishable content in any category; edition suppressed".to_string());
    EditionDecision {
        should_publish: false,
        edition: Edition::Suppressed,
        warnings,
    }
}
