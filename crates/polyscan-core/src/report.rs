//! Aggregated results of one runner invocation.
//!
//! A [`Report`] is built once per run and read-only after: the issues in
//! visitation order, any per-analyzer failures, summary aggregates, and
//! optional timing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::document::{Document, Language};
use crate::issue::{Category, Issue, Severity};

/// Summary of the analyzed document carried inside the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    pub node_count: usize,
}

impl DocumentInfo {
    pub fn from_document(document: &Document) -> Self {
        Self {
            language: document.language().clone(),
            source_path: document.metadata().source_path.clone(),
            node_count: document.node_count(),
        }
    }
}

/// Which contract call an analyzer failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Before,
    Analyze,
    After,
}

/// A recorded analyzer failure. The run continues (or halts, under
/// `halt_on_error`) but the failure is always part of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerFailure {
    pub analyzer_id: String,
    pub phase: RunPhase,
    pub message: String,
}

/// Aggregates over the issue list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_issues: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_category: BTreeMap<Category, usize>,
    pub by_analyzer: BTreeMap<String, usize>,
}

impl ReportSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut summary = Self {
            total_issues: issues.len(),
            ..Self::default()
        };
        for issue in issues {
            *summary.by_severity.entry(issue.severity).or_default() += 1;
            *summary.by_category.entry(issue.category).or_default() += 1;
            *summary
                .by_analyzer
                .entry(issue.analyzer_id.clone())
                .or_default() += 1;
        }
        summary
    }
}

/// Wall-clock timing, collected only when requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTiming {
    pub total: Duration,
    /// Time spent inside each analyzer's contract calls, accumulated.
    pub per_analyzer: BTreeMap<String, Duration>,
}

/// The sole output artifact of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub document: DocumentInfo,
    /// Ids of the analyzers that took part, in dispatch order.
    pub analyzers: Vec<String>,
    /// Issues in visitation order; per node, in analyzer dispatch order.
    pub issues: Vec<Issue>,
    pub failures: Vec<AnalyzerFailure>,
    pub summary: ReportSummary,
    /// Whether visitation stopped early (issue cap or halt-on-error).
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<ReportTiming>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }

    pub fn issues_for(&self, analyzer_id: &str) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.analyzer_id == analyzer_id)
    }
}
