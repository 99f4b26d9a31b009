//! duplication analyzer (D201): duplicated function bodies within one
//! document.
//!
//! A two-phase analyzer: during traversal it records a fingerprint record
//! for each function definition in its scope; in `run_after` it classifies
//! every pair and reports the later function of each duplicate pair.

use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisContext, Analyzer, AnalyzerError, AnalyzerInfo, Preflight};
use crate::ast::MetaNode;
use crate::declare_analyzer;
use crate::fingerprint::{self, CloneType, Digest, token_similarity};
use crate::issue::{Issue, NodePath};

const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
const DEFAULT_MIN_TOKENS: usize = 10;
const SCOPE_KEY: &str = "functions";

declare_analyzer!(
    Duplication,
    id = "D201",
    name = "duplication",
    description = "Detect duplicated function bodies via structural fingerprints",
    category = Duplication,
    severity = Warning,
    configurable = true
);

#[derive(Serialize, Deserialize)]
struct FunctionRecord {
    name: String,
    path: NodePath,
    exact: Digest,
    normalized: Digest,
    tokens: Vec<String>,
}

impl Analyzer for Duplication {
    fn info(&self) -> &AnalyzerInfo {
        &self.info
    }

    fn run_before(&self, ctx: &mut AnalysisContext) -> Result<Preflight, AnalyzerError> {
        if let Some(value) = ctx.config().get("similarity_threshold") {
            let valid = value.as_f64().is_some_and(|v| v > 0.0 && v <= 1.0);
            if !valid {
                return Err(AnalyzerError::InvalidConfig {
                    key: "similarity_threshold".into(),
                    reason: "expected a number in (0, 1]".into(),
                });
            }
        }
        if let Some(value) = ctx.config().get("min_tokens") {
            if value.as_u64().is_none() {
                return Err(AnalyzerError::InvalidConfig {
                    key: "min_tokens".into(),
                    reason: "expected a non-negative integer".into(),
                });
            }
        }

        ctx.scope_mut()
            .insert(SCOPE_KEY.into(), serde_json::json!([]));
        Ok(Preflight::Proceed)
    }

    fn analyze(
        &self,
        node: &MetaNode,
        ctx: &mut AnalysisContext,
    ) -> Result<Vec<Issue>, AnalyzerError> {
        let MetaNode::FunctionDef { name, .. } = node else {
            return Ok(Vec::new());
        };

        let min_tokens = ctx
            .config()
            .get_usize("min_tokens")
            .unwrap_or(DEFAULT_MIN_TOKENS);
        let tokens = fingerprint::tokens(node);
        if tokens.len() < min_tokens {
            return Ok(Vec::new());
        }

        let record = FunctionRecord {
            name: name.clone(),
            path: ctx.path().clone(),
            exact: fingerprint::exact(node),
            normalized: fingerprint::normalized(node),
            tokens,
        };
        let value = serde_json::to_value(&record)
            .map_err(|e| AnalyzerError::failed(format!("fingerprint record: {e}")))?;

        let records = ctx
            .scope_mut()
            .entry(SCOPE_KEY.to_string())
            .or_insert_with(|| serde_json::json!([]));
        if let serde_json::Value::Array(records) = records {
            records.push(value);
        }

        Ok(Vec::new())
    }

    fn run_after(
        &self,
        ctx: &mut AnalysisContext,
        mut issues: Vec<Issue>,
    ) -> Result<Vec<Issue>, AnalyzerError> {
        let threshold = ctx
            .config()
            .get_f64("similarity_threshold")
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);

        let records: Vec<FunctionRecord> = match ctx.scope().get(SCOPE_KEY) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AnalyzerError::failed(format!("fingerprint records: {e}")))?,
            None => Vec::new(),
        };

        for (i, earlier) in records.iter().enumerate() {
            for later in records.iter().skip(i + 1) {
                let Some((clone_type, similarity)) = classify(earlier, later, threshold) else {
                    continue;
                };

                issues.push(
                    Issue::new(
                        self.info.id,
                        self.info.category,
                        self.info.default_severity,
                        format!(
                            "Function '{}' duplicates '{}' ({} clone)",
                            later.name,
                            earlier.name,
                            clone_label(clone_type)
                        ),
                        "function_def",
                        later.path.clone(),
                    )
                    .with_metadata("clone_type", serde_json::json!(clone_type))
                    .with_metadata("similarity", serde_json::json!(similarity))
                    .with_metadata("duplicate_of", serde_json::json!(earlier.name))
                    .with_metadata(
                        "duplicate_of_path",
                        serde_json::json!(earlier.path.to_string()),
                    ),
                );
            }
        }

        Ok(issues)
    }
}

fn classify(a: &FunctionRecord, b: &FunctionRecord, threshold: f64) -> Option<(CloneType, f64)> {
    if a.exact == b.exact {
        return Some((CloneType::TypeOne, 1.0));
    }
    if a.normalized == b.normalized {
        return Some((CloneType::TypeTwo, 1.0));
    }
    let similarity = token_similarity(&a.tokens, &b.tokens);
    (similarity >= threshold).then_some((CloneType::TypeThree, similarity))
}

fn clone_label(clone_type: CloneType) -> &'static str {
    match clone_type {
        CloneType::TypeOne => "type I",
        CloneType::TypeTwo => "type II",
        CloneType::TypeThree => "type III",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LiteralKind, Parameter};
    use crate::config::AnalyzerConfig;
    use crate::document::{Document, DocumentMetadata, Language};
    use crate::runner::{RunOptions, Runner};

    fn run_analyzer(tree: MetaNode, options: RunOptions) -> Vec<Issue> {
        let mut registry = crate::analyzer::AnalyzerRegistry::new();
        registry.register(std::sync::Arc::new(Duplication::new()));
        let runner = Runner::new(registry);
        let document =
            Document::new(tree, Language::Ruby, DocumentMetadata::default()).expect("conformant");
        runner.run(&document, &options).issues
    }

    /// A function with enough tokens to clear the default minimum.
    fn worker(name: &str, a: &str, b: &str) -> MetaNode {
        MetaNode::function(
            name,
            vec![Parameter::named(a), Parameter::named(b)],
            MetaNode::block(vec![
                MetaNode::assign(
                    MetaNode::variable("total"),
                    MetaNode::binary("+", MetaNode::variable(a), MetaNode::variable(b)),
                ),
                MetaNode::call(MetaNode::variable("audit"), vec![MetaNode::variable("total")]),
                MetaNode::ret(Some(MetaNode::variable("total"))),
            ]),
        )
    }

    #[test]
    fn renamed_functions_are_type_two_clones() {
        let tree = MetaNode::block(vec![worker("sum", "a", "b"), worker("total", "x", "y")]);
        let issues = run_analyzer(tree, RunOptions::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].analyzer_id, "D201");
        assert!(issues[0].message.contains("'total' duplicates 'sum'"));
        assert_eq!(
            issues[0].metadata["clone_type"],
            serde_json::json!("type_two")
        );
        assert_eq!(issues[0].metadata["similarity"], serde_json::json!(1.0));
    }

    #[test]
    fn identical_functions_are_type_one_clones() {
        let tree = MetaNode::block(vec![worker("sum", "a", "b"), worker("sum", "a", "b")]);
        let issues = run_analyzer(tree, RunOptions::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].metadata["clone_type"],
            serde_json::json!("type_one")
        );
    }

    #[test]
    fn issue_points_at_later_function() {
        let tree = MetaNode::block(vec![worker("first", "a", "b"), worker("second", "x", "y")]);
        let issues = run_analyzer(tree, RunOptions::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path.indices(), &[1]);
        assert_eq!(
            issues[0].metadata["duplicate_of_path"],
            serde_json::json!("root.0")
        );
    }

    #[test]
    fn distinct_functions_are_not_flagged() {
        let other = MetaNode::function(
            "loop",
            vec![Parameter::named("items")],
            MetaNode::block(vec![MetaNode::Loop {
                kind: crate::ast::LoopKind::Iterator,
                binding: Some(crate::ast::Pattern::Binding("item".into())),
                subject: Box::new(MetaNode::variable("items")),
                body: Box::new(MetaNode::block(vec![MetaNode::call(
                    MetaNode::variable("emit"),
                    vec![MetaNode::variable("item")],
                )])),
            }]),
        );
        let tree = MetaNode::block(vec![worker("sum", "a", "b"), other]);
        let issues = run_analyzer(tree, RunOptions::default());

        assert!(issues.is_empty());
    }

    #[test]
    fn small_functions_are_below_min_tokens() {
        let tiny = |name: &str| {
            MetaNode::function(
                name,
                Vec::<Parameter>::new(),
                MetaNode::block(vec![MetaNode::ret(Some(MetaNode::literal(
                    LiteralKind::Integer,
                    "1",
                )))]),
            )
        };
        let tree = MetaNode::block(vec![tiny("a"), tiny("b")]);
        let issues = run_analyzer(tree, RunOptions::default());

        assert!(issues.is_empty());
    }

    #[test]
    fn min_tokens_is_configurable() {
        let tiny = |name: &str| {
            MetaNode::function(
                name,
                Vec::<Parameter>::new(),
                MetaNode::block(vec![MetaNode::ret(Some(MetaNode::literal(
                    LiteralKind::Integer,
                    "1",
                )))]),
            )
        };
        let tree = MetaNode::block(vec![tiny("a"), tiny("b")]);
        let options = RunOptions::default().with_config(
            "D201",
            AnalyzerConfig::new().set("min_tokens", serde_json::json!(2)),
        );
        let issues = run_analyzer(tree, options);

        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn near_misses_respect_threshold() {
        let longer = MetaNode::function(
            "augmented",
            vec![Parameter::named("a"), Parameter::named("b")],
            MetaNode::block(vec![
                MetaNode::assign(
                    MetaNode::variable("total"),
                    MetaNode::binary("+", MetaNode::variable("a"), MetaNode::variable("b")),
                ),
                MetaNode::call(MetaNode::variable("audit"), vec![MetaNode::variable("total")]),
                MetaNode::call(MetaNode::variable("log"), vec![MetaNode::variable("total")]),
                MetaNode::ret(Some(MetaNode::variable("total"))),
            ]),
        );
        let tree = MetaNode::block(vec![worker("sum", "a", "b"), longer]);

        let lenient = run_analyzer(
            tree.clone(),
            RunOptions::default().with_config(
                "D201",
                AnalyzerConfig::new().set("similarity_threshold", serde_json::json!(0.5)),
            ),
        );
        assert_eq!(lenient.len(), 1);
        assert_eq!(
            lenient[0].metadata["clone_type"],
            serde_json::json!("type_three")
        );

        let strict = run_analyzer(
            tree,
            RunOptions::default().with_config(
                "D201",
                AnalyzerConfig::new().set("similarity_threshold", serde_json::json!(0.99)),
            ),
        );
        assert!(strict.is_empty());
    }

    #[test]
    fn invalid_threshold_fails_preflight() {
        let mut registry = crate::analyzer::AnalyzerRegistry::new();
        registry.register(std::sync::Arc::new(Duplication::new()));
        let runner = Runner::new(registry);
        let document = Document::new(
            MetaNode::block(vec![]),
            Language::Ruby,
            DocumentMetadata::default(),
        )
        .expect("conformant");

        let options = RunOptions::default().with_config(
            "D201",
            AnalyzerConfig::new().set("similarity_threshold", serde_json::json!(1.5)),
        );
        let report = runner.run(&document, &options);

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("similarity_threshold"));
    }

    #[test]
    fn three_clones_report_every_pair() {
        let tree = MetaNode::block(vec![
            worker("one", "a", "b"),
            worker("two", "c", "d"),
            worker("three", "e", "f"),
        ]);
        let issues = run_analyzer(tree, RunOptions::default());

        assert_eq!(issues.len(), 3);
    }
}
