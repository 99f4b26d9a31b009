//! Cross-language static analysis over a shared meta-AST.
//!
//! Language adapters lower their native syntax trees into the closed
//! [`ast::MetaNode`] vocabulary; everything downstream of that boundary is
//! language-agnostic. The pipeline:
//!
//! 1. Build a [`document::Document`], which validates conformance.
//! 2. Register [`analyzer::Analyzer`] implementations in an
//!    [`analyzer::AnalyzerRegistry`].
//! 3. Hand both to a [`runner::Runner`] and collect the [`report::Report`].
//!
//! [`fingerprint`] is an independent surface: pure structural digests and
//! clone classification, usable without a runner.

pub mod analyzer;
pub mod analyzers;
pub mod ast;
pub mod config;
pub mod document;
pub mod fingerprint;
pub mod issue;
pub mod report;
pub mod runner;

pub use analyzer::{
    AnalysisContext, Analyzer, AnalyzerError, AnalyzerInfo, AnalyzerRegistry, Preflight, ScopeMap,
};
pub use ast::{ConformanceError, MetaNode, conforms, validate};
pub use config::{AnalyzerConfig, Config, ConfigError, find_config_file, load_config};
pub use document::{Document, DocumentMetadata, Language};
pub use fingerprint::{CloneReport, CloneType, DetectionConfig, Digest};
pub use issue::{Category, Issue, NodePath, Severity, Suggestion};
pub use report::{AnalyzerFailure, Report, ReportSummary};
pub use runner::{RunOptions, Runner};
