//! Static checks over a whole ruleset.
//!
//! Pairwise checks run for every `i < j` in ruleset order, then per-rule
//! checks. Subsumption is a textual heuristic on class patterns only: it
//! reports when one stripped pattern is a literal substring of a later one,
//! which is neither necessary nor sufficient for one regex language to
//! contain the other.

use std::fmt;

use serde::Serialize;

use super::error::try_push;
use super::rule::strip_anchors;
use super::{Matcher, Result, Rule, Ruleset, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    ExactDuplicate,
    Subsumed,
    ConflictingActions,
    Orphaned,
    InvalidPattern,
}

impl IssueKind {
    pub fn severity(self) -> Severity {
        match self {
            IssueKind::ExactDuplicate | IssueKind::InvalidPattern => Severity::Error,
            IssueKind::Subsumed | IssueKind::ConflictingActions => Severity::Warning,
            IssueKind::Orphaned => Severity::Info,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::ExactDuplicate => "exact-duplicate",
            IssueKind::Subsumed => "subsumed",
            IssueKind::ConflictingActions => "conflicting-actions",
            IssueKind::Orphaned => "orphaned",
            IssueKind::InvalidPattern => "invalid-pattern",
        };
        write!(f, "{s}")
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub suggestion: String,
    /// Indices of the rules involved, in ruleset order
    pub rules: Vec<usize>,
}

impl Issue {
    fn new(kind: IssueKind, rules: Vec<usize>, description: String, suggestion: &str) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            description,
            suggestion: suggestion.to_string(),
            rules,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}\n    help: {}",
            self.severity, self.kind, self.description, self.suggestion
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub issues: Vec<Issue>,
    pub counts: SeverityCounts,
}

impl Report {
    /// Counts only move once the issue is stored.
    fn push(&mut self, issue: Issue) -> Result<()> {
        let severity = issue.severity;
        try_push(&mut self.issues, issue)?;
        match severity {
            Severity::Error => self.counts.errors += 1,
            Severity::Warning => self.counts.warnings += 1,
            Severity::Info => self.counts.infos += 1,
        }
        Ok(())
    }

    pub fn errors(&self) -> usize {
        self.counts.errors
    }

    pub fn warnings(&self) -> usize {
        self.counts.warnings
    }

    pub fn infos(&self) -> usize {
        self.counts.infos
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    #[cfg(test)]
    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        write!(
            f,
            "{} error(s), {} warning(s), {} info",
            self.counts.errors, self.counts.warnings, self.counts.infos
        )
    }
}

/// Run every check. Orphan detection only runs when a window snapshot is given.
pub fn analyze(ruleset: &Ruleset, windows: Option<&[Window]>, matcher: &Matcher) -> Result<Report> {
    let mut report = Report::default();
    let rules = ruleset.rules();

    for (i, a) in rules.iter().enumerate() {
        for (j, b) in rules.iter().enumerate().skip(i + 1) {
            check_pair(&mut report, (i, a), (j, b))?;
        }
    }

    for (i, rule) in rules.iter().enumerate() {
        check_patterns(&mut report, i, rule, matcher)?;
        if let Some(windows) = windows {
            if !windows.iter().any(|window| matcher.matches(rule, window)) {
                report.push(Issue::new(
                    IssueKind::Orphaned,
                    vec![i],
                    format!(
                        "rule {} ({}) matches none of the {} open window(s)",
                        i,
                        rule.display_name(i),
                        windows.len()
                    ),
                    "remove the rule, or check its patterns against the live window list",
                ))?;
            }
        }
    }

    tracing::debug!(
        "Analyzed {} rule(s): {} error(s), {} warning(s), {} info",
        rules.len(),
        report.errors(),
        report.warnings(),
        report.infos()
    );
    Ok(report)
}

fn non_empty_class(rule: &Rule) -> Option<&str> {
    rule.matcher.class.as_deref().filter(|class| !class.is_empty())
}

fn check_pair(report: &mut Report, (i, a): (usize, &Rule), (j, b): (usize, &Rule)) -> Result<()> {
    if a.matcher.class == b.matcher.class && a.matcher.title == b.matcher.title {
        report.push(Issue::new(
            IssueKind::ExactDuplicate,
            vec![i, j],
            format!(
                "rules {} ({}) and {} ({}) have identical class and title patterns",
                i,
                a.display_name(i),
                j,
                b.display_name(j)
            ),
            "merge the two rules into one, or delete the redundant rule",
        ))?;
    }

    let (Some(class_a), Some(class_b)) = (non_empty_class(a), non_empty_class(b)) else {
        return Ok(());
    };

    if strip_anchors(class_b).contains(strip_anchors(class_a)) {
        report.push(Issue::new(
            IssueKind::Subsumed,
            vec![i, j],
            format!(
                "class pattern {:?} of rule {} is contained in {:?} of rule {}",
                class_a, i, class_b, j
            ),
            "anchor the broader pattern or confirm both rules are still needed",
        ))?;
    }

    if class_a == class_b {
        let disagreements = conflicting_fields(a, b);
        if !disagreements.is_empty() {
            report.push(Issue::new(
                IssueKind::ConflictingActions,
                vec![i, j],
                format!(
                    "rules {} and {} match class {:?} but disagree on {}",
                    i,
                    j,
                    class_a,
                    disagreements.join(", ")
                ),
                "keep a single value; the later rule currently wins",
            ))?;
        }
    }

    Ok(())
}

fn conflicting_fields(a: &Rule, b: &Rule) -> Vec<&'static str> {
    fn differs<T: PartialEq>(x: &Option<T>, y: &Option<T>) -> bool {
        matches!((x, y), (Some(x), Some(y)) if x != y)
    }

    let mut fields = Vec::new();
    if differs(&a.actions.workspace, &b.actions.workspace) {
        fields.push("workspace");
    }
    if differs(&a.actions.tag, &b.actions.tag) {
        fields.push("tag");
    }
    if differs(&a.actions.float, &b.actions.float) {
        fields.push("float");
    }
    fields
}

fn check_patterns(report: &mut Report, i: usize, rule: &Rule, matcher: &Matcher) -> Result<()> {
    for (field, pattern) in rule.matcher.patterns() {
        if !matcher.is_valid(pattern) {
            report.push(Issue::new(
                IssueKind::InvalidPattern,
                vec![i],
                format!(
                    "rule {} ({}) has an invalid {} pattern {:?}",
                    i,
                    rule.display_name(i),
                    field.key(),
                    pattern
                ),
                "fix the regular expression; as written the rule never matches",
            ))?;
        }
    }
    Ok(())
}
