//! Token sequences for coarse structural similarity.
//!
//! A tree flattens into an ordered list of structural markers in pre-order:
//! the variant tag plus whatever distinguishes structure at that node
//! (operator symbol, literal kind, visibility, loop/collection-op/container
//! kind). Value *kinds* survive; values themselves never do, so `x + 1` and
//! `y + 2` tokenize identically while `x - 1` does not.

use crate::ast::{MetaNode, Pattern};

/// Flatten a tree into its structural token sequence.
pub fn tokens(tree: &MetaNode) -> Vec<String> {
    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

fn walk(node: &MetaNode, out: &mut Vec<String>) {
    out.push(marker(node));

    if let MetaNode::Match { arms, .. } = node {
        for arm in arms {
            out.push(pattern_marker(&arm.pattern));
        }
    }

    for child in node.children() {
        walk(child, out);
    }
}

fn marker(node: &MetaNode) -> String {
    match node {
        MetaNode::Literal { kind, .. } => format!("lit:{}", kind.as_str()),
        MetaNode::Variable { .. } => "var".to_string(),
        MetaNode::ListLiteral { .. } => "list".to_string(),
        MetaNode::MapLiteral { .. } => "map".to_string(),
        MetaNode::BinaryOp { op, .. } => format!("bin:{op}"),
        MetaNode::UnaryOp { op, .. } => format!("un:{op}"),
        MetaNode::Call { .. } => "call".to_string(),
        MetaNode::Conditional { else_branch, .. } => {
            if else_branch.is_some() {
                "cond:else".to_string()
            } else {
                "cond".to_string()
            }
        }
        MetaNode::Return { value } => {
            if value.is_some() {
                "return:value".to_string()
            } else {
                "return:void".to_string()
            }
        }
        MetaNode::Block { .. } => "block".to_string(),
        MetaNode::Assignment { .. } => "assign".to_string(),
        MetaNode::Destructure { pattern, .. } => {
            format!("destructure:{}", pattern_marker(pattern))
        }
        MetaNode::Loop { kind, .. } => format!("loop:{}", kind.as_str()),
        MetaNode::Lambda { params, .. } => format!("lambda/{}", params.len()),
        MetaNode::CollectionOp { kind, .. } => format!("collect:{}", kind.as_str()),
        MetaNode::Match { arms, .. } => format!("match/{}", arms.len()),
        MetaNode::TryCatch {
            handlers, finally, ..
        } => format!(
            "try/{}{}",
            handlers.len(),
            if finally.is_some() { "+finally" } else { "" }
        ),
        MetaNode::Async { .. } => "async".to_string(),
        MetaNode::Container { kind, .. } => format!("container:{}", kind.as_str()),
        MetaNode::FunctionDef {
            visibility, params, ..
        } => format!("fn:{}/{}", visibility.as_str(), params.len()),
        MetaNode::AttributeAccess { .. } => "attr".to_string(),
        MetaNode::CompoundAssignment { op, .. } => format!("assign:{op}"),
        MetaNode::Property {
            getter, setter, ..
        } => format!(
            "prop:{}{}",
            if getter.is_some() { "g" } else { "" },
            if setter.is_some() { "s" } else { "" }
        ),
        MetaNode::Foreign { language, hint, .. } => format!("foreign:{language}:{hint}"),
    }
}

fn pattern_marker(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Binding(_) => "pat:bind".to_string(),
        Pattern::Wildcard => "pat:wild".to_string(),
        Pattern::Tuple(parts) => format!("pat:tuple/{}", parts.len()),
        Pattern::Literal { kind, .. } => format!("pat:lit:{}", kind.as_str()),
    }
}
