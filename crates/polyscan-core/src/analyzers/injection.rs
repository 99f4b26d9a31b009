//! injection analyzer (S105): dynamic data flowing into code-execution
//! sinks.

use crate::analyzer::{AnalysisContext, Analyzer, AnalyzerError, AnalyzerInfo};
use crate::ast::MetaNode;
use crate::declare_analyzer;
use crate::issue::Issue;

/// Callee names treated as code-execution sinks, whether called directly
/// or as an attribute (`os.system`, `subprocess.popen`).
const CODE_EXECUTION_SINKS: &[&str] = &["eval", "exec", "execfile", "system", "popen", "spawn"];

declare_analyzer!(
    Injection,
    id = "S105",
    name = "injection",
    description = "Disallow passing dynamic data to code-execution sinks",
    category = Security,
    severity = Error
);

impl Analyzer for Injection {
    fn info(&self) -> &AnalyzerInfo {
        &self.info
    }

    fn analyze(
        &self,
        node: &MetaNode,
        ctx: &mut AnalysisContext,
    ) -> Result<Vec<Issue>, AnalyzerError> {
        let MetaNode::Call { callee, args } = node else {
            return Ok(Vec::new());
        };
        let Some(sink) = sink_name(callee) else {
            return Ok(Vec::new());
        };

        let issues = args
            .iter()
            .enumerate()
            .filter(|(_, arg)| !is_static(arg))
            .map(|(index, arg)| {
                Issue::new(
                    self.info.id,
                    self.info.category,
                    self.info.default_severity,
                    format!(
                        "Dynamic {} passed to code-execution sink '{sink}'; \
                         use static code or a function reference instead",
                        arg.kind()
                    ),
                    node.kind(),
                    ctx.path().clone(),
                )
                .with_metadata("sink", serde_json::json!(sink))
                .with_metadata("argument_index", serde_json::json!(index))
            })
            .collect();

        Ok(issues)
    }
}

fn sink_name(callee: &MetaNode) -> Option<&str> {
    match callee {
        MetaNode::Variable { name } if CODE_EXECUTION_SINKS.contains(&name.as_str()) => Some(name),
        MetaNode::AttributeAccess { attribute, .. }
            if CODE_EXECUTION_SINKS.contains(&attribute.as_str()) =>
        {
            Some(attribute)
        }
        _ => None,
    }
}

/// Whether an argument is known at rest: literals, compositions of
/// literals, or a function value rather than a code string.
fn is_static(node: &MetaNode) -> bool {
    match node {
        MetaNode::Literal { .. } | MetaNode::Lambda { .. } => true,
        MetaNode::ListLiteral { elements } => elements.iter().all(is_static),
        MetaNode::MapLiteral { entries } => entries
            .iter()
            .all(|entry| is_static(&entry.key) && is_static(&entry.value)),
        MetaNode::BinaryOp { left, right, .. } => is_static(left) && is_static(right),
        MetaNode::UnaryOp { operand, .. } => is_static(operand),
        _ => false,
    }
}
