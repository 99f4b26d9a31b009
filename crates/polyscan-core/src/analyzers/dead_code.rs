//! dead-code analyzer (Q101): statements after a terminating statement can
//! never execute.

use crate::analyzer::{AnalysisContext, Analyzer, AnalyzerError, AnalyzerInfo};
use crate::ast::MetaNode;
use crate::declare_analyzer;
use crate::issue::{Issue, Suggestion};

declare_analyzer!(
    DeadCode,
    id = "Q101",
    name = "dead-code",
    description = "Detect statements that follow an unconditional return",
    category = Quality,
    severity = Warning
);

impl Analyzer for DeadCode {
    fn info(&self) -> &AnalyzerInfo {
        &self.info
    }

    fn analyze(
        &self,
        node: &MetaNode,
        ctx: &mut AnalysisContext,
    ) -> Result<Vec<Issue>, AnalyzerError> {
        let MetaNode::Block { statements } = node else {
            return Ok(Vec::new());
        };

        let Some(terminator) = statements.iter().position(terminates) else {
            return Ok(Vec::new());
        };

        let issues = statements
            .iter()
            .enumerate()
            .skip(terminator + 1)
            // Definitions after a terminator are hoisted in enough
            // languages that flagging them is noise.
            .filter(|(_, stmt)| !is_definition(stmt))
            .map(|(index, stmt)| {
                Issue::new(
                    self.info.id,
                    self.info.category,
                    self.info.default_severity,
                    "Unreachable code detected",
                    stmt.kind(),
                    ctx.path().child(index),
                )
                .with_suggestion(Suggestion::Remove)
                .with_metadata("terminator_index", serde_json::json!(terminator))
            })
            .collect();

        Ok(issues)
    }
}

/// Whether control flow never continues past this statement.
fn terminates(node: &MetaNode) -> bool {
    match node {
        MetaNode::Return { .. } => true,
        MetaNode::Block { statements } => statements.iter().any(terminates),
        MetaNode::Conditional {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => terminates(then_branch) && terminates(else_branch),
        MetaNode::Match { arms, .. } => {
            !arms.is_empty() && arms.iter().all(|arm| terminates(&arm.body))
        }
        MetaNode::TryCatch {
            body,
            handlers,
            finally,
        } => {
            if finally.as_deref().is_some_and(terminates) {
                return true;
            }
            terminates(body) && handlers.iter().all(|handler| terminates(&handler.body))
        }
        _ => false,
    }
}

fn is_definition(node: &MetaNode) -> bool {
    matches!(
        node,
        MetaNode::FunctionDef { .. } | MetaNode::Container { .. }
    )
}
