//! complexity analyzer (Q110): decision-point count per function.

use crate::analyzer::{AnalysisContext, Analyzer, AnalyzerError, AnalyzerInfo, Preflight};
use crate::ast::MetaNode;
use crate::declare_analyzer;
use crate::issue::Issue;

const DEFAULT_MAX_COMPLEXITY: usize = 10;

declare_analyzer!(
    Complexity,
    id = "Q110",
    name = "complexity",
    description = "Enforce a maximum cyclomatic complexity per function",
    category = Quality,
    severity = Warning,
    configurable = true
);

impl Analyzer for Complexity {
    fn info(&self) -> &AnalyzerInfo {
        &self.info
    }

    fn run_before(&self, ctx: &mut AnalysisContext) -> Result<Preflight, AnalyzerError> {
        if let Some(value) = ctx.config().get("max_complexity") {
            if value.as_u64().is_none_or(|v| v == 0) {
                return Err(AnalyzerError::InvalidConfig {
                    key: "max_complexity".into(),
                    reason: "expected a positive integer".into(),
                });
            }
        }
        Ok(Preflight::Proceed)
    }

    fn analyze(
        &self,
        node: &MetaNode,
        ctx: &mut AnalysisContext,
    ) -> Result<Vec<Issue>, AnalyzerError> {
        let MetaNode::FunctionDef { name, body, .. } = node else {
            return Ok(Vec::new());
        };

        let threshold = ctx
            .config()
            .get_usize("max_complexity")
            .unwrap_or(DEFAULT_MAX_COMPLEXITY);
        let complexity = 1 + decision_points(body);
        if complexity <= threshold {
            return Ok(Vec::new());
        }

        Ok(vec![
            Issue::new(
                self.info.id,
                self.info.category,
                self.info.default_severity,
                format!(
                    "Function '{name}' has a cyclomatic complexity of {complexity} (max: {threshold})"
                ),
                node.kind(),
                ctx.path().clone(),
            )
            .with_metadata("complexity", serde_json::json!(complexity))
            .with_metadata("threshold", serde_json::json!(threshold)),
        ])
    }
}

/// Decision points in a subtree. Nested function definitions are scored on
/// their own visit, not against the enclosing function.
fn decision_points(node: &MetaNode) -> usize {
    if matches!(node, MetaNode::FunctionDef { .. }) {
        return 0;
    }

    let own = match node {
        MetaNode::Conditional { .. } | MetaNode::Loop { .. } => 1,
        MetaNode::Match { arms, .. } => {
            arms.len() + arms.iter().filter(|arm| arm.guard.is_some()).count()
        }
        MetaNode::TryCatch { handlers, .. } => handlers.len(),
        MetaNode::BinaryOp { op, .. } if is_short_circuit(op) => 1,
        _ => 0,
    };

    own + node
        .children()
        .into_iter()
        .map(decision_points)
        .sum::<usize>()
}

fn is_short_circuit(op: &str) -> bool {
    matches!(op, "&&" | "||" | "??" | "and" | "or")
}
