//! The traversal engine: one pre-order walk, every analyzer at every node.
//!
//! `run` is single-threaded and synchronous; it blocks until the report is
//! complete. The registry is snapshotted at the start of each run, so
//! concurrent runs over independent documents are unaffected by later
//! registry mutation and by each other.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::analyzer::{AnalysisContext, Analyzer, AnalyzerRegistry, Preflight, ScopeMap};
use crate::analyzers;
use crate::ast::MetaNode;
use crate::config::AnalyzerConfig;
use crate::document::Document;
use crate::issue::{Category, Issue, NodePath, Severity};
use crate::report::{AnalyzerFailure, DocumentInfo, Report, ReportSummary, ReportTiming, RunPhase};

/// Options for one runner invocation. All fields are optional in spirit:
/// the default is every registered analyzer, no config, no cap, continue
/// past errors, no timing.
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Explicit analyzer id list; `None` means all registered analyzers.
    pub analyzers: Option<Vec<String>>,
    /// Per-analyzer configuration, keyed by analyzer id.
    pub config: HashMap<String, AnalyzerConfig>,
    /// Soft issue cap, checked between top-level siblings.
    pub max_issues: Option<usize>,
    /// Stop visiting further nodes after the first analyzer failure.
    pub halt_on_error: bool,
    /// Collect wall-clock timing into the report.
    pub track_timing: bool,
    /// Analyzer ids or names to leave out of the run.
    pub disabled: Vec<String>,
    /// Severity rewrites applied to emitted issues, keyed by id or name.
    pub severity_overrides: HashMap<String, Severity>,
    /// Whole categories to leave out of the run.
    pub disabled_categories: HashSet<Category>,
}

impl RunOptions {
    pub fn with_analyzers(mut self, ids: Vec<String>) -> Self {
        self.analyzers = Some(ids);
        self
    }

    pub fn with_config(mut self, analyzer_id: impl Into<String>, config: AnalyzerConfig) -> Self {
        self.config.insert(analyzer_id.into(), config);
        self
    }

    pub fn with_max_issues(mut self, cap: usize) -> Self {
        self.max_issues = Some(cap);
        self
    }

    pub fn with_halt_on_error(mut self, halt: bool) -> Self {
        self.halt_on_error = halt;
        self
    }

    pub fn with_timing(mut self, track: bool) -> Self {
        self.track_timing = track;
        self
    }
}

/// The analysis engine: a registry plus the traversal algorithm.
pub struct Runner {
    registry: AnalyzerRegistry,
}

impl Runner {
    pub fn new(registry: AnalyzerRegistry) -> Self {
        Self { registry }
    }

    /// A runner with every built-in analyzer registered.
    pub fn with_defaults() -> Self {
        Self::new(analyzers::default_registry())
    }

    pub fn registry(&self) -> &AnalyzerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AnalyzerRegistry {
        &mut self.registry
    }

    /// Walk the document once and produce a report.
    pub fn run(&self, document: &Document, options: &RunOptions) -> Report {
        let started = Instant::now();
        let selected = self.select_analyzers(options);
        debug!(
            analyzers = selected.len(),
            nodes = document.node_count(),
            "starting analysis run"
        );

        let mut walk = Walk {
            document,
            options,
            default_config: AnalyzerConfig::default(),
            actives: selected
                .into_iter()
                .map(|analyzer| Active {
                    analyzer,
                    scope: ScopeMap::new(),
                    failed: false,
                    skipped: false,
                })
                .collect(),
            issues: Vec::new(),
            owners: Vec::new(),
            failures: Vec::new(),
            halted: false,
            truncated: false,
            per_analyzer_timing: BTreeMap::new(),
        };

        walk.run_before_phase();

        if !walk.halted {
            if walk.cap_reached() {
                // A cap of zero: nothing to collect, skip visitation.
                walk.truncated = true;
            } else {
                let mut ancestors: Vec<&MetaNode> = Vec::new();
                walk.visit(document.tree(), 0, NodePath::root(), &mut ancestors);
            }
        } else {
            walk.truncated = true;
        }

        let issues = walk.run_after_phase();

        let analyzers_run: Vec<String> = walk
            .actives
            .iter()
            .filter(|a| !a.skipped)
            .map(|a| a.analyzer.info().id.to_string())
            .collect();

        let timing = options.track_timing.then(|| ReportTiming {
            total: started.elapsed(),
            per_analyzer: walk.per_analyzer_timing.clone(),
        });

        let summary = ReportSummary::from_issues(&issues);
        debug!(
            issues = summary.total_issues,
            failures = walk.failures.len(),
            truncated = walk.truncated,
            "analysis run finished"
        );

        Report {
            document: DocumentInfo::from_document(document),
            analyzers: analyzers_run,
            issues,
            failures: walk.failures,
            summary,
            truncated: walk.truncated,
            timing,
        }
    }

    /// Snapshot the registry and apply the option filters, keeping
    /// registration order.
    fn select_analyzers(&self, options: &RunOptions) -> Vec<Arc<dyn Analyzer>> {
        self.registry
            .snapshot()
            .into_iter()
            .filter(|analyzer| {
                let info = analyzer.info();
                if let Some(ids) = &options.analyzers {
                    if !ids.iter().any(|id| id == info.id || id == info.name) {
                        return false;
                    }
                }
                if options.disabled_categories.contains(&info.category) {
                    return false;
                }
                !options
                    .disabled
                    .iter()
                    .any(|id| id == info.id || id == info.name)
            })
            .collect()
    }
}

struct Active {
    analyzer: Arc<dyn Analyzer>,
    scope: ScopeMap,
    failed: bool,
    skipped: bool,
}

struct Walk<'a, 'opt> {
    document: &'a Document,
    options: &'opt RunOptions,
    default_config: AnalyzerConfig,
    actives: Vec<Active>,
    issues: Vec<Issue>,
    /// Index into `actives`, parallel to `issues`.
    owners: Vec<usize>,
    failures: Vec<AnalyzerFailure>,
    halted: bool,
    truncated: bool,
    per_analyzer_timing: BTreeMap<String, Duration>,
}

impl<'a> Walk<'a, '_> {
    fn cap_reached(&self) -> bool {
        self.options
            .max_issues
            .is_some_and(|cap| self.issues.len() >= cap)
    }

    fn record_time(&mut self, id: &str, elapsed: Duration) {
        if self.options.track_timing {
            *self
                .per_analyzer_timing
                .entry(id.to_string())
                .or_default() += elapsed;
        }
    }

    /// `run_before`, exactly once per analyzer per run, before any node.
    fn run_before_phase(&mut self) {
        let root_path = NodePath::root();
        let ancestors: Vec<&MetaNode> = Vec::new();
        for index in 0..self.actives.len() {
            let active = &mut self.actives[index];
            let info = active.analyzer.info();
            let id = info.id;
            let config = self
                .options
                .config
                .get(id)
                .unwrap_or(&self.default_config);
            let mut ctx = AnalysisContext::new(
                self.document,
                config,
                &ancestors,
                0,
                &root_path,
                &mut active.scope,
            );

            let start = Instant::now();
            let outcome = active.analyzer.run_before(&mut ctx);
            let elapsed = start.elapsed();

            match outcome {
                Ok(Preflight::Proceed) => {}
                Ok(Preflight::Skip(reason)) => {
                    debug!(analyzer = id, reason = %reason, "analyzer skipped run");
                    active.skipped = true;
                }
                Err(err) => {
                    warn!(analyzer = id, error = %err, "analyzer failed in run_before");
                    active.failed = true;
                    self.failures.push(AnalyzerFailure {
                        analyzer_id: id.to_string(),
                        phase: RunPhase::Before,
                        message: err.to_string(),
                    });
                    if self.options.halt_on_error {
                        self.halted = true;
                    }
                }
            }
            self.record_time(id, elapsed);
            if self.halted {
                break;
            }
        }
    }

    /// Pre-order, depth-first, single-threaded visitation.
    fn visit(
        &mut self,
        node: &'a MetaNode,
        depth: usize,
        path: NodePath,
        ancestors: &mut Vec<&'a MetaNode>,
    ) {
        self.dispatch(node, depth, &path, ancestors);
        if self.halted {
            return;
        }

        ancestors.push(node);
        for (index, child) in node.children().into_iter().enumerate() {
            // The soft cap is advisory and only consulted between
            // top-level siblings.
            if depth == 0 && self.cap_reached() {
                self.truncated = true;
                break;
            }
            self.visit(child, depth + 1, path.child(index), ancestors);
            if self.halted {
                break;
            }
        }
        ancestors.pop();
    }

    /// One node, every active analyzer, in registration order.
    fn dispatch(
        &mut self,
        node: &'a MetaNode,
        depth: usize,
        path: &NodePath,
        ancestors: &[&'a MetaNode],
    ) {
        trace!(kind = node.kind(), depth, "visiting node");
        for index in 0..self.actives.len() {
            if self.actives[index].failed || self.actives[index].skipped {
                continue;
            }
            let active = &mut self.actives[index];
            let info = active.analyzer.info();
            let id = info.id;
            let name = info.name;
            let config = self
                .options
                .config
                .get(id)
                .unwrap_or(&self.default_config);
            let mut ctx = AnalysisContext::new(
                self.document,
                config,
                ancestors,
                depth,
                path,
                &mut active.scope,
            );

            let start = Instant::now();
            let outcome = active.analyzer.analyze(node, &mut ctx);
            let elapsed = start.elapsed();

            match outcome {
                Ok(mut emitted) => {
                    self.apply_severity_override(id, name, &mut emitted);
                    for issue in emitted {
                        self.issues.push(issue);
                        self.owners.push(index);
                    }
                }
                Err(err) => {
                    warn!(analyzer = id, error = %err, "analyzer failed; isolating it");
                    self.actives[index].failed = true;
                    self.failures.push(AnalyzerFailure {
                        analyzer_id: id.to_string(),
                        phase: RunPhase::Analyze,
                        message: err.to_string(),
                    });
                    if self.options.halt_on_error {
                        self.halted = true;
                        self.truncated = true;
                    }
                }
            }
            self.record_time(id, elapsed);
            if self.halted {
                // Finish nothing further; issues collected so far survive.
                break;
            }
        }
    }

    fn apply_severity_override(&self, id: &str, name: &str, issues: &mut [Issue]) {
        let override_severity = self
            .options
            .severity_overrides
            .get(id)
            .or_else(|| self.options.severity_overrides.get(name));
        if let Some(severity) = override_severity {
            for issue in issues.iter_mut() {
                issue.severity = *severity;
            }
        }
    }

    /// `run_after`, exactly once per surviving analyzer, even after a
    /// truncated traversal. Each analyzer transforms its own issues; slots
    /// in the global visitation order are preserved positionally and any
    /// extra issues are appended.
    fn run_after_phase(&mut self) -> Vec<Issue> {
        let owners = std::mem::take(&mut self.owners);
        let collected = std::mem::take(&mut self.issues);
        let mut slots: Vec<Option<Issue>> = collected.into_iter().map(Some).collect();
        let mut tail: Vec<Issue> = Vec::new();

        let root_path = NodePath::root();
        let ancestors: Vec<&MetaNode> = Vec::new();

        for index in 0..self.actives.len() {
            if self.actives[index].failed || self.actives[index].skipped {
                continue;
            }

            let my_slots: Vec<usize> = owners
                .iter()
                .enumerate()
                .filter(|(_, owner)| **owner == index)
                .map(|(slot, _)| slot)
                .collect();
            let my_issues: Vec<Issue> = my_slots
                .iter()
                .filter_map(|&slot| slots[slot].clone())
                .collect();

            let active = &mut self.actives[index];
            let info = active.analyzer.info();
            let id = info.id;
            let config = self
                .options
                .config
                .get(id)
                .unwrap_or(&self.default_config);
            let mut ctx = AnalysisContext::new(
                self.document,
                config,
                &ancestors,
                0,
                &root_path,
                &mut active.scope,
            );

            let start = Instant::now();
            let outcome = active.analyzer.run_after(&mut ctx, my_issues);
            let elapsed = start.elapsed();

            match outcome {
                Ok(out) => {
                    let mut replacements = out.into_iter();
                    for &slot in &my_slots {
                        slots[slot] = replacements.next();
                    }
                    tail.extend(replacements);
                }
                Err(err) => {
                    // Original issues stay in their slots; only the
                    // transformation is lost.
                    warn!(analyzer = id, error = %err, "analyzer failed in run_after");
                    self.failures.push(AnalyzerFailure {
                        analyzer_id: id.to_string(),
                        phase: RunPhase::After,
                        message: err.to_string(),
                    });
                }
            }
            self.record_time(id, elapsed);
        }

        slots.into_iter().flatten().chain(tail).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AnalyzerError, AnalyzerInfo};
    use crate::ast::LiteralKind;
    use crate::document::{DocumentMetadata, Language};

    struct EmitEverywhere {
        info: AnalyzerInfo,
    }

    impl EmitEverywhere {
        fn new(id: &'static str) -> Arc<dyn Analyzer> {
            Arc::new(Self {
                info: AnalyzerInfo {
                    id,
                    name: id,
                    description: "emits one issue per node",
                    category: Category::Quality,
                    default_severity: Severity::Info,
                    configurable: false,
                },
            })
        }
    }

    impl Analyzer for EmitEverywhere {
        fn info(&self) -> &AnalyzerInfo {
            &self.info
        }

        fn analyze(
            &self,
            node: &MetaNode,
            ctx: &mut AnalysisContext,
        ) -> Result<Vec<Issue>, AnalyzerError> {
            Ok(vec![Issue::new(
                self.info.id,
                self.info.category,
                self.info.default_severity,
                format!("visited {}", node.kind()),
                node.kind(),
                ctx.path().clone(),
            )])
        }
    }

    struct FailsOnVariable {
        info: AnalyzerInfo,
    }

    impl FailsOnVariable {
        fn new() -> Arc<dyn Analyzer> {
            Arc::new(Self {
                info: AnalyzerInfo {
                    id: "FAIL",
                    name: "fails-on-variable",
                    description: "fails the first time it sees a variable",
                    category: Category::Quality,
                    default_severity: Severity::Warning,
                    configurable: false,
                },
            })
        }
    }

    impl Analyzer for FailsOnVariable {
        fn info(&self) -> &AnalyzerInfo {
            &self.info
        }

        fn analyze(
            &self,
            node: &MetaNode,
            _ctx: &mut AnalysisContext,
        ) -> Result<Vec<Issue>, AnalyzerError> {
            if matches!(node, MetaNode::Variable { .. }) {
                Err(AnalyzerError::failed("cannot handle variables"))
            } else {
                Ok(Vec::new())
            }
        }
    }

    struct SkipsEverything {
        info: AnalyzerInfo,
    }

    impl SkipsEverything {
        fn new() -> Arc<dyn Analyzer> {
            Arc::new(Self {
                info: AnalyzerInfo {
                    id: "SKIP",
                    name: "skips",
                    description: "opts out of every run",
                    category: Category::Quality,
                    default_severity: Severity::Hint,
                    configurable: false,
                },
            })
        }
    }

    impl Analyzer for SkipsEverything {
        fn info(&self) -> &AnalyzerInfo {
            &self.info
        }

        fn run_before(&self, _ctx: &mut AnalysisContext) -> Result<Preflight, AnalyzerError> {
            Ok(Preflight::Skip("nothing to do here".into()))
        }

        fn analyze(
            &self,
            _node: &MetaNode,
            _ctx: &mut AnalysisContext,
        ) -> Result<Vec<Issue>, AnalyzerError> {
            Err(AnalyzerError::failed("analyze must not run after a skip"))
        }
    }

    /// Counts nodes via its scope during traversal, emits once in run_after.
    struct CountsNodes {
        info: AnalyzerInfo,
    }

    impl CountsNodes {
        fn new() -> Arc<dyn Analyzer> {
            Arc::new(Self {
                info: AnalyzerInfo {
                    id: "COUNT",
                    name: "counts-nodes",
                    description: "whole-tree analysis behind the two-phase hooks",
                    category: Category::Quality,
                    default_severity: Severity::Info,
                    configurable: false,
                },
            })
        }
    }

    impl Analyzer for CountsNodes {
        fn info(&self) -> &AnalyzerInfo {
            &self.info
        }

        fn run_before(&self, ctx: &mut AnalysisContext) -> Result<Preflight, AnalyzerError> {
            ctx.scope_mut().insert("count".into(), serde_json::json!(0));
            Ok(Preflight::Proceed)
        }

        fn analyze(
            &self,
            _node: &MetaNode,
            ctx: &mut AnalysisContext,
        ) -> Result<Vec<Issue>, AnalyzerError> {
            let count = ctx
                .scope()
                .get("count")
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            ctx.scope_mut()
                .insert("count".into(), serde_json::json!(count + 1));
            Ok(Vec::new())
        }

        fn run_after(
            &self,
            ctx: &mut AnalysisContext,
            mut issues: Vec<Issue>,
        ) -> Result<Vec<Issue>, AnalyzerError> {
            let count = ctx
                .scope()
                .get("count")
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            issues.push(Issue::new(
                self.info.id,
                self.info.category,
                self.info.default_severity,
                format!("saw {count} nodes"),
                "block",
                NodePath::root(),
            ));
            Ok(issues)
        }
    }

    fn document_with_statements(count: usize) -> Document {
        let statements = (0..count)
            .map(|i| {
                MetaNode::assign(
                    MetaNode::variable(format!("v{i}")),
                    MetaNode::literal(LiteralKind::Integer, i.to_string()),
                )
            })
            .collect();
        Document::new(
            MetaNode::block(statements),
            Language::Python,
            DocumentMetadata::default(),
        )
        .expect("conformant")
    }

    fn runner_with(analyzers: Vec<Arc<dyn Analyzer>>) -> Runner {
        let mut registry = AnalyzerRegistry::new();
        for analyzer in analyzers {
            registry.register(analyzer);
        }
        Runner::new(registry)
    }

    #[test]
    fn run_visits_every_node_once() {
        let runner = runner_with(vec![EmitEverywhere::new("A1")]);
        let document = document_with_statements(2);

        let report = runner.run(&document, &RunOptions::default());

        // block + 2 * (assignment + variable + literal)
        assert_eq!(report.issues.len(), 7);
        assert_eq!(report.summary.total_issues, 7);
        assert!(!report.truncated);
    }

    #[test]
    fn issues_from_one_node_follow_registration_order() {
        let runner = runner_with(vec![EmitEverywhere::new("A1"), EmitEverywhere::new("A2")]);
        let document = document_with_statements(1);

        let report = runner.run(&document, &RunOptions::default());

        assert_eq!(report.issues[0].analyzer_id, "A1");
        assert_eq!(report.issues[1].analyzer_id, "A2");
        // Same path: both came from the root node.
        assert_eq!(report.issues[0].path, report.issues[1].path);
    }

    #[test]
    fn explicit_analyzer_list_limits_the_run() {
        let runner = runner_with(vec![EmitEverywhere::new("A1"), EmitEverywhere::new("A2")]);
        let document = document_with_statements(1);

        let options = RunOptions::default().with_analyzers(vec!["A2".into()]);
        let report = runner.run(&document, &options);

        assert_eq!(report.analyzers, vec!["A2".to_string()]);
        assert!(report.issues.iter().all(|i| i.analyzer_id == "A2"));
    }

    #[test]
    fn soft_cap_stops_between_top_level_siblings() {
        let runner = runner_with(vec![EmitEverywhere::new("A1")]);
        let document = document_with_statements(5);

        let options = RunOptions::default().with_max_issues(1);
        let report = runner.run(&document, &options);

        assert!(report.truncated);
        assert!(!report.issues.is_empty());
        // Root emits 1; the cap is reached before the first top-level
        // sibling is visited, so no assignment nodes appear.
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].node_kind, "block");
    }

    #[test]
    fn cap_does_not_interrupt_a_single_nodes_analyzers() {
        let analyzers: Vec<Arc<dyn Analyzer>> = vec![
            EmitEverywhere::new("A1"),
            EmitEverywhere::new("A2"),
            EmitEverywhere::new("A3"),
        ];
        let runner = runner_with(analyzers);
        let document = document_with_statements(3);

        let options = RunOptions::default().with_max_issues(2);
        let report = runner.run(&document, &options);

        // All three analyzers get to see the root even though the cap is 2.
        assert_eq!(report.issues.len(), 3);
        assert!(report.truncated);
    }

    #[test]
    fn zero_cap_skips_visitation_entirely() {
        let runner = runner_with(vec![EmitEverywhere::new("A1")]);
        let document = document_with_statements(3);

        let report = runner.run(&document, &RunOptions::default().with_max_issues(0));

        assert!(report.issues.is_empty());
        assert!(report.truncated);
    }

    #[test]
    fn failing_analyzer_is_isolated_by_default() {
        let runner = runner_with(vec![FailsOnVariable::new(), EmitEverywhere::new("A1")]);
        let document = document_with_statements(2);

        let report = runner.run(&document, &RunOptions::default());

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].analyzer_id, "FAIL");
        assert_eq!(report.failures[0].phase, RunPhase::Analyze);
        // The healthy analyzer still covered the whole tree.
        assert_eq!(report.issues_for("A1").count(), 7);
        assert!(!report.truncated);
    }

    #[test]
    fn halt_on_error_keeps_collected_issues() {
        let runner = runner_with(vec![EmitEverywhere::new("A1"), FailsOnVariable::new()]);
        let document = document_with_statements(3);

        let options = RunOptions::default().with_halt_on_error(true);
        let report = runner.run(&document, &options);

        assert!(report.truncated);
        assert_eq!(report.failures.len(), 1);
        // Partial, not discarded: A1 emitted for the nodes visited before
        // the failure (block, first assignment, first variable).
        let collected = report.issues_for("A1").count();
        assert!(collected >= 1, "issues before the failure must survive");
        assert!(collected < 10, "visitation must have stopped early");
    }

    #[test]
    fn skip_in_run_before_excludes_analyzer() {
        let runner = runner_with(vec![SkipsEverything::new(), EmitEverywhere::new("A1")]);
        let document = document_with_statements(1);

        let report = runner.run(&document, &RunOptions::default());

        // The skipping analyzer never ran analyze (it would have failed).
        assert!(report.failures.is_empty());
        assert_eq!(report.analyzers, vec!["A1".to_string()]);
    }

    #[test]
    fn run_after_converts_scope_state_into_issues() {
        let runner = runner_with(vec![CountsNodes::new()]);
        let document = document_with_statements(2);

        let report = runner.run(&document, &RunOptions::default());

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].message, "saw 7 nodes");
    }

    #[test]
    fn scope_does_not_leak_across_runs() {
        let runner = runner_with(vec![CountsNodes::new()]);
        let document = document_with_statements(2);

        let first = runner.run(&document, &RunOptions::default());
        let second = runner.run(&document, &RunOptions::default());

        assert_eq!(first.issues[0].message, second.issues[0].message);
    }

    #[test]
    fn severity_override_rewrites_emitted_issues() {
        let runner = runner_with(vec![EmitEverywhere::new("A1")]);
        let document = document_with_statements(1);

        let mut options = RunOptions::default();
        options
            .severity_overrides
            .insert("A1".into(), Severity::Error);
        let report = runner.run(&document, &options);

        assert!(report.issues.iter().all(|i| i.severity == Severity::Error));
        assert!(report.has_errors());
    }

    #[test]
    fn disabled_list_and_categories_filter_analyzers() {
        let runner = runner_with(vec![EmitEverywhere::new("A1"), EmitEverywhere::new("A2")]);
        let document = document_with_statements(1);

        let mut options = RunOptions::default();
        options.disabled.push("A1".into());
        let report = runner.run(&document, &options);
        assert_eq!(report.analyzers, vec!["A2".to_string()]);

        let mut options = RunOptions::default();
        options.disabled_categories.insert(Category::Quality);
        let report = runner.run(&document, &options);
        assert!(report.analyzers.is_empty());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn timing_present_only_when_requested() {
        let runner = runner_with(vec![EmitEverywhere::new("A1")]);
        let document = document_with_statements(1);

        let untimed = runner.run(&document, &RunOptions::default());
        assert!(untimed.timing.is_none());

        let timed = runner.run(&document, &RunOptions::default().with_timing(true));
        let timing = timed.timing.expect("timing requested");
        assert!(timing.per_analyzer.contains_key("A1"));
    }

    #[test]
    fn report_document_info_reflects_source() {
        let runner = runner_with(vec![EmitEverywhere::new("A1")]);
        let document = Document::new(
            MetaNode::block(vec![]),
            Language::Go,
            DocumentMetadata::for_path("pkg/main.go"),
        )
        .expect("conformant");

        let report = runner.run(&document, &RunOptions::default());

        assert_eq!(report.document.language, Language::Go);
        assert_eq!(report.document.source_path.as_deref(), Some("pkg/main.go"));
        assert_eq!(report.document.node_count, 1);
    }

    #[test]
    fn registry_snapshot_isolates_run_from_mutation() {
        let mut runner = runner_with(vec![EmitEverywhere::new("A1")]);
        let document = document_with_statements(1);

        let report = runner.run(&document, &RunOptions::default());
        assert!(!report.issues.is_empty());

        runner.registry_mut().clear();
        let report = runner.run(&document, &RunOptions::default());
        assert!(report.issues.is_empty());
        assert!(report.analyzers.is_empty());
    }
}
