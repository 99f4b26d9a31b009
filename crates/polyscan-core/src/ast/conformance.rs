//! Conformance: is a value a legal instance of the meta-AST shape grammar?
//!
//! The closed `MetaNode` enum already rules out unknown tags at compile
//! time; what remains to check are the shape constraints the type system
//! cannot express (non-empty names, binding arity per loop kind, accumulator
//! presence per collection op, and so on), recursively over the whole tree.
//!
//! [`conforms`] is the single source of truth for "is this tree legal". It
//! is pure, never panics, and rejects anything it does not recognize.
//! [`validate`] is the same predicate with a structured reject: it reports
//! the first failing subtree and why.

use crate::ast::{CollectionOpKind, LiteralKind, LoopKind, MetaNode, Parameter, Pattern};
use crate::issue::NodePath;

/// Structured conformance failure: the first offending subtree, where it
/// sits, and what was wrong with it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("non-conformant {} at {path}: {reason}", offending.kind())]
pub struct ConformanceError {
    pub reason: String,
    pub path: NodePath,
    pub offending: MetaNode,
}

/// Pure conformance predicate. `true` iff the value matches exactly one
/// defined shape and every child, transitively, does too.
pub fn conforms(tree: &MetaNode) -> bool {
    validate(tree).is_ok()
}

/// Conformance with the first failing subtree attached.
pub fn validate(tree: &MetaNode) -> Result<(), ConformanceError> {
    check_node(tree, &NodePath::root())
}

fn check_node(node: &MetaNode, path: &NodePath) -> Result<(), ConformanceError> {
    check_local(node, path)?;
    for (index, child) in node.children().into_iter().enumerate() {
        check_node(child, &path.child(index))?;
    }
    Ok(())
}

fn check_local(node: &MetaNode, path: &NodePath) -> Result<(), ConformanceError> {
    let reject = |reason: &str| {
        Err(ConformanceError {
            reason: reason.to_string(),
            path: path.clone(),
            offending: node.clone(),
        })
    };

    match node {
        MetaNode::Literal { kind, value } => match kind {
            LiteralKind::Boolean if value != "true" && value != "false" => {
                reject("boolean literal value must be 'true' or 'false'")
            }
            LiteralKind::Null if !value.is_empty() => {
                reject("null literal must carry an empty value")
            }
            _ => Ok(()),
        },
        MetaNode::Variable { name } => {
            if name.is_empty() {
                reject("variable name must not be empty")
            } else {
                Ok(())
            }
        }
        MetaNode::BinaryOp { op, .. } | MetaNode::UnaryOp { op, .. } => {
            if op.is_empty() {
                reject("operator symbol must not be empty")
            } else {
                Ok(())
            }
        }
        MetaNode::Assignment { target, .. } => check_assignable(node, target, path),
        MetaNode::CompoundAssignment { op, target, .. } => {
            if op.is_empty() {
                return reject("compound assignment operator must not be empty");
            }
            check_assignable(node, target, path)
        }
        MetaNode::Destructure { pattern, .. } => check_pattern(node, pattern, path),
        MetaNode::Loop { kind, binding, .. } => match (kind, binding) {
            (LoopKind::While, Some(_)) => {
                reject("while loop must not carry an iteration binding")
            }
            (LoopKind::Iterator, None) => {
                reject("iterator loop requires an iteration binding")
            }
            (LoopKind::Iterator, Some(pattern)) => check_pattern(node, pattern, path),
            (LoopKind::While, None) => Ok(()),
        },
        MetaNode::Lambda { params, .. } => check_params(node, params, path),
        MetaNode::CollectionOp { kind, initial, .. } => match (kind, initial) {
            (CollectionOpKind::Reduce, None) => {
                reject("reduce requires an initial accumulator")
            }
            (CollectionOpKind::Map | CollectionOpKind::Filter, Some(_)) => {
                reject("map/filter must not carry an initial accumulator")
            }
            _ => Ok(()),
        },
        MetaNode::Match { arms, .. } => {
            if arms.is_empty() {
                return reject("match requires at least one arm");
            }
            for arm in arms {
                check_pattern(node, &arm.pattern, path)?;
            }
            Ok(())
        }
        MetaNode::TryCatch {
            handlers, finally, ..
        } => {
            if handlers.is_empty() && finally.is_none() {
                return reject("exception handler requires a catch clause or a finally block");
            }
            for handler in handlers {
                if matches!(&handler.exception_type, Some(t) if t.is_empty()) {
                    return reject("catch clause exception type must not be empty");
                }
                if matches!(&handler.binding, Some(b) if b.is_empty()) {
                    return reject("catch clause binding must not be empty");
                }
            }
            Ok(())
        }
        MetaNode::Container {
            name,
            parent,
            interfaces,
            ..
        } => {
            if name.is_empty() {
                return reject("container name must not be empty");
            }
            if matches!(parent, Some(p) if p.is_empty()) {
                return reject("container parent must not be empty");
            }
            if interfaces.iter().any(|i| i.is_empty()) {
                return reject("container interface names must not be empty");
            }
            Ok(())
        }
        MetaNode::FunctionDef {
            name,
            params,
            return_type,
            decorators,
            ..
        } => {
            if name.is_empty() {
                return reject("function name must not be empty");
            }
            if matches!(return_type, Some(t) if t.is_empty()) {
                return reject("function return type must not be empty");
            }
            if decorators.iter().any(|d| d.is_empty()) {
                return reject("function decorator names must not be empty");
            }
            check_params(node, params, path)
        }
        MetaNode::AttributeAccess { attribute, .. } => {
            if attribute.is_empty() {
                reject("attribute name must not be empty")
            } else {
                Ok(())
            }
        }
        MetaNode::Property {
            name,
            getter,
            setter,
        } => {
            if name.is_empty() {
                return reject("property name must not be empty");
            }
            if getter.is_none() && setter.is_none() {
                return reject("property requires a getter or a setter");
            }
            Ok(())
        }
        MetaNode::Foreign { language, .. } => {
            if language.is_empty() {
                reject("foreign node requires a source language tag")
            } else {
                Ok(())
            }
        }
        MetaNode::ListLiteral { .. }
        | MetaNode::MapLiteral { .. }
        | MetaNode::Call { .. }
        | MetaNode::Conditional { .. }
        | MetaNode::Return { .. }
        | MetaNode::Block { .. }
        | MetaNode::Async { .. } => Ok(()),
    }
}

fn check_assignable(
    node: &MetaNode,
    target: &MetaNode,
    path: &NodePath,
) -> Result<(), ConformanceError> {
    match target {
        MetaNode::Variable { .. } | MetaNode::AttributeAccess { .. } => Ok(()),
        other => Err(ConformanceError {
            reason: format!("assignment target must be a variable or attribute access, got {}", other.kind()),
            path: path.clone(),
            offending: node.clone(),
        }),
    }
}

fn check_params(
    node: &MetaNode,
    params: &[Parameter],
    path: &NodePath,
) -> Result<(), ConformanceError> {
    for param in params {
        if matches!(&param.type_hint, Some(t) if t.is_empty()) {
            return Err(ConformanceError {
                reason: "parameter type hint must not be empty".to_string(),
                path: path.clone(),
                offending: node.clone(),
            });
        }
        check_pattern(node, &param.pattern, path)?;
    }
    Ok(())
}

fn check_pattern(
    node: &MetaNode,
    pattern: &Pattern,
    path: &NodePath,
) -> Result<(), ConformanceError> {
    let reject = |reason: &str| {
        Err(ConformanceError {
            reason: reason.to_string(),
            path: path.clone(),
            offending: node.clone(),
        })
    };

    match pattern {
        Pattern::Binding(name) => {
            if name.is_empty() {
                reject("pattern binding name must not be empty")
            } else {
                Ok(())
            }
        }
        Pattern::Wildcard | Pattern::Literal { .. } => Ok(()),
        Pattern::Tuple(parts) => {
            if parts.is_empty() {
                return reject("destructuring pattern must not be empty");
            }
            for part in parts {
                check_pattern(node, part, path)?;
            }
            Ok(())
        }
    }
}
