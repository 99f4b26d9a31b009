//! Bottom-up normalization for Type II clone detection.
//!
//! Rewrites a tree so that everything nameable digests to a wildcard while
//! every structural feature survives: variable names become `_`, literal
//! values become empty (kind kept), function/attribute/container/property
//! names become `_` (arity, visibility and parameter-pattern shape kept),
//! and the escape wrapper collapses to its language and hint. The rewrite
//! is total and idempotent; a shape it has no rule for passes through with
//! its structure intact rather than aborting digest computation.

use crate::ast::{CatchClause, MapEntry, MatchArm, MetaNode, Parameter, Pattern};

const WILDCARD: &str = "_";

/// Rewrite a tree into its normalized form.
pub fn normalize(node: &MetaNode) -> MetaNode {
    match node {
        MetaNode::Literal { kind, .. } => MetaNode::Literal {
            kind: *kind,
            value: String::new(),
        },
        MetaNode::Variable { .. } => MetaNode::Variable {
            name: WILDCARD.to_string(),
        },
        MetaNode::ListLiteral { elements } => MetaNode::ListLiteral {
            elements: elements.iter().map(normalize).collect(),
        },
        MetaNode::MapLiteral { entries } => MetaNode::MapLiteral {
            entries: entries
                .iter()
                .map(|e| MapEntry {
                    key: normalize(&e.key),
                    value: normalize(&e.value),
                })
                .collect(),
        },
        MetaNode::BinaryOp { op, left, right } => MetaNode::BinaryOp {
            op: op.clone(),
            left: Box::new(normalize(left)),
            right: Box::new(normalize(right)),
        },
        MetaNode::UnaryOp { op, operand } => MetaNode::UnaryOp {
            op: op.clone(),
            operand: Box::new(normalize(operand)),
        },
        MetaNode::Call { callee, args } => MetaNode::Call {
            callee: Box::new(normalize(callee)),
            args: args.iter().map(normalize).collect(),
        },
        MetaNode::Conditional {
            condition,
            then_branch,
            else_branch,
        } => MetaNode::Conditional {
            condition: Box::new(normalize(condition)),
            then_branch: Box::new(normalize(then_branch)),
            else_branch: else_branch.as_deref().map(|e| Box::new(normalize(e))),
        },
        MetaNode::Return { value } => MetaNode::Return {
            value: value.as_deref().map(|v| Box::new(normalize(v))),
        },
        MetaNode::Block { statements } => MetaNode::Block {
            statements: statements.iter().map(normalize).collect(),
        },
        MetaNode::Assignment { target, value } => MetaNode::Assignment {
            target: Box::new(normalize(target)),
            value: Box::new(normalize(value)),
        },
        MetaNode::Destructure { pattern, value } => MetaNode::Destructure {
            pattern: normalize_pattern(pattern),
            value: Box::new(normalize(value)),
        },
        MetaNode::Loop {
            kind,
            binding,
            subject,
            body,
        } => MetaNode::Loop {
            kind: *kind,
            binding: binding.as_ref().map(normalize_pattern),
            subject: Box::new(normalize(subject)),
            body: Box::new(normalize(body)),
        },
        MetaNode::Lambda { params, body } => MetaNode::Lambda {
            params: params.iter().map(normalize_param).collect(),
            body: Box::new(normalize(body)),
        },
        MetaNode::CollectionOp {
            kind,
            target,
            operation,
            initial,
        } => MetaNode::CollectionOp {
            kind: *kind,
            target: Box::new(normalize(target)),
            operation: Box::new(normalize(operation)),
            initial: initial.as_deref().map(|i| Box::new(normalize(i))),
        },
        MetaNode::Match { subject, arms } => MetaNode::Match {
            subject: Box::new(normalize(subject)),
            arms: arms
                .iter()
                .map(|arm| MatchArm {
                    pattern: normalize_pattern(&arm.pattern),
                    guard: arm.guard.as_ref().map(normalize),
                    body: normalize(&arm.body),
                })
                .collect(),
        },
        MetaNode::TryCatch {
            body,
            handlers,
            finally,
        } => MetaNode::TryCatch {
            body: Box::new(normalize(body)),
            handlers: handlers
                .iter()
                .map(|h| CatchClause {
                    exception_type: h.exception_type.clone(),
                    binding: h.binding.as_ref().map(|_| WILDCARD.to_string()),
                    body: normalize(&h.body),
                })
                .collect(),
            finally: finally.as_deref().map(|f| Box::new(normalize(f))),
        },
        MetaNode::Async { inner } => MetaNode::Async {
            inner: Box::new(normalize(inner)),
        },
        MetaNode::Container {
            kind,
            name: _,
            parent,
            interfaces,
            members,
        } => MetaNode::Container {
            kind: *kind,
            name: WILDCARD.to_string(),
            parent: parent.as_ref().map(|_| WILDCARD.to_string()),
            interfaces: interfaces.iter().map(|_| WILDCARD.to_string()).collect(),
            members: members.iter().map(normalize).collect(),
        },
        MetaNode::FunctionDef {
            name: _,
            visibility,
            params,
            return_type,
            decorators,
            body,
        } => MetaNode::FunctionDef {
            name: WILDCARD.to_string(),
            visibility: *visibility,
            params: params.iter().map(normalize_param).collect(),
            return_type: return_type.clone(),
            decorators: decorators.clone(),
            body: Box::new(normalize(body)),
        },
        MetaNode::AttributeAccess { object, .. } => MetaNode::AttributeAccess {
            object: Box::new(normalize(object)),
            attribute: WILDCARD.to_string(),
        },
        MetaNode::CompoundAssignment { op, target, value } => MetaNode::CompoundAssignment {
            op: op.clone(),
            target: Box::new(normalize(target)),
            value: Box::new(normalize(value)),
        },
        MetaNode::Property {
            name: _,
            getter,
            setter,
        } => MetaNode::Property {
            name: WILDCARD.to_string(),
            getter: getter.as_deref().map(|g| Box::new(normalize(g))),
            setter: setter.as_deref().map(|s| Box::new(normalize(s))),
        },
        MetaNode::Foreign {
            language, hint, ..
        } => MetaNode::Foreign {
            language: language.clone(),
            hint: hint.clone(),
            payload: serde_json::Value::Null,
        },
    }
}

fn normalize_param(param: &Parameter) -> Parameter {
    Parameter {
        pattern: normalize_pattern(&param.pattern),
        default: param.default.as_ref().map(normalize),
        type_hint: param.type_hint.clone(),
    }
}

fn normalize_pattern(pattern: &Pattern) -> Pattern {
    match pattern {
        Pattern::Binding(_) => Pattern::Binding(WILDCARD.to_string()),
        Pattern::Wildcard => Pattern::Wildcard,
        Pattern::Tuple(parts) => Pattern::Tuple(parts.iter().map(normalize_pattern).collect()),
        Pattern::Literal { kind, .. } => Pattern::Literal {
            kind: *kind,
            value: String::new(),
        },
    }
}
