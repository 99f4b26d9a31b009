//! Analyzer contract: the plugin boundary every analysis implements.
//!
//! An analyzer is stateless. It describes itself through [`AnalyzerInfo`],
//! examines one node at a time through [`Analyzer::analyze`], and may opt
//! into whole-tree work through the two-phase [`Analyzer::run_before`] /
//! [`Analyzer::run_after`] hooks. Anything it wants to remember between
//! node visits lives in its private scope map on the
//! [`AnalysisContext`], which is confined to a single run.

pub mod context;
pub mod registry;

use crate::ast::MetaNode;
use crate::issue::{Category, Issue, Severity};

pub use context::{AnalysisContext, ScopeMap};
pub use registry::AnalyzerRegistry;

/// Failure raised by an analyzer during any contract call. The runner
/// isolates these per analyzer; one faulty plugin never blanks a report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyzerError {
    #[error("invalid configuration for '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },
    #[error("{0}")]
    Failed(String),
}

impl AnalyzerError {
    pub fn failed(message: impl Into<String>) -> Self {
        AnalyzerError::Failed(message.into())
    }
}

/// Static description of an analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub default_severity: Severity,
    pub configurable: bool,
}

/// Outcome of [`Analyzer::run_before`]: proceed with the run, or sit this
/// document out with a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preflight {
    Proceed,
    Skip(String),
}

/// The contract every analysis implements. These four functions are the
/// only boundary between the traversal engine and any analysis, built-in
/// or third-party.
pub trait Analyzer: Send + Sync {
    /// Metadata describing this analyzer.
    fn info(&self) -> &AnalyzerInfo;

    /// Examine one node. Called once per visited node per run.
    fn analyze(
        &self,
        node: &MetaNode,
        ctx: &mut AnalysisContext,
    ) -> Result<Vec<Issue>, AnalyzerError>;

    /// Called exactly once per run, before the first node visit. Analyses
    /// needing a full pass before emitting anything prime their scope here.
    fn run_before(&self, _ctx: &mut AnalysisContext) -> Result<Preflight, AnalyzerError> {
        Ok(Preflight::Proceed)
    }

    /// Called exactly once per run, after the traversal completes. Receives
    /// the issues this analyzer emitted so far and returns the final list.
    fn run_after(
        &self,
        _ctx: &mut AnalysisContext,
        issues: Vec<Issue>,
    ) -> Result<Vec<Issue>, AnalyzerError> {
        Ok(issues)
    }
}

/// Declare an analyzer struct with its [`AnalyzerInfo`] in one place.
#[macro_export]
macro_rules! declare_analyzer {
    (
        $name:ident,
        id = $id:literal,
        name = $analyzer_name:literal,
        description = $desc:literal,
        category = $cat:ident,
        severity = $sev:ident
        $(, configurable = $configurable:literal)?
    ) => {
        pub struct $name {
            info: $crate::analyzer::AnalyzerInfo,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    info: $crate::analyzer::AnalyzerInfo {
                        id: $id,
                        name: $analyzer_name,
                        description: $desc,
                        category: $crate::issue::Category::$cat,
                        default_severity: $crate::issue::Severity::$sev,
                        configurable: declare_analyzer!(@configurable $($configurable)?),
                    },
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
    (@configurable $configurable:literal) => { $configurable };
    (@configurable) => { false };
}
