// Severity classification
//
// An ordered rule table, evaluated top to bottom; the first rule whose
// predicate matches decides the severity. No match means OK.

use crate::config::AuditConfig;
use crate::model::{PageFinding, Severity};

pub type RulePredicate = fn(&PageFinding, &AuditConfig) -> bool;

pub struct SeverityRule {
    pub name: &'static str,
    pub severity: Severity,
    pub applies: RulePredicate,
}

pub const SEVERITY_RULES: &[SeverityRule] = &[
    SeverityRule {
        name: "fetch-failed",
        severity: Severity::Error,
        applies: |f, _| f.fetch_failed(),
    },
    SeverityRule {
        name: "missing-title-or-h1",
        severity: Severity::Error,
        applies: |f, _| f.title.is_none() || f.h1_count == 0,
    },
    SeverityRule {
        name: "content-quality",
        severity: Severity::Warn,
        applies: |f, c| {
            f.meta_description.is_none()
                || !c.description_in_range(f.meta_description_length)
                || c.is_thin(f.word_count)
                || f.missing_alt_count > 0
        },
    },
    SeverityRule {
        name: "canonical",
        severity: Severity::Warn,
        applies: |f, _| f.canonical_state.is_issue(),
    },
    SeverityRule {
        name: "minor-markup",
        severity: Severity::Warn,
        applies: |f, c| {
            !c.title_in_range(f.title_length) || f.h1_count > 1 || f.broken_anchors > 0
        },
    },
];

/// First rule matching `finding`, if any.
pub fn matching_rule(finding: &PageFinding, config: &AuditConfig) -> Option<&'static SeverityRule> {
    SEVERITY_RULES
        .iter()
        .find(|rule| (rule.applies)(finding, config))
}

/// Overall severity of a finding. Pure: depends only on its arguments.
pub fn classify(finding: &PageFinding, config: &AuditConfig) -> Severity {
    matching_rule(finding, config)
        .map(|rule| rule.severity)
        .unwrap_or(Severity::Ok)
}
