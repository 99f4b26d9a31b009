//! The meta-AST: a unified, language-agnostic tree representation.
//!
//! Source programs from any supported language are lifted into this closed
//! set of node shapes by per-language adapters. Everything downstream
//! (analyzers, fingerprinting, the runner) operates on `MetaNode` alone and
//! never sees concrete syntax.

pub mod conformance;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use conformance::{ConformanceError, conforms, validate};

/// Subtype tag for literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Boolean,
    Null,
    Symbol,
}

impl LiteralKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiteralKind::Integer => "integer",
            LiteralKind::Float => "float",
            LiteralKind::String => "string",
            LiteralKind::Boolean => "boolean",
            LiteralKind::Null => "null",
            LiteralKind::Symbol => "symbol",
        }
    }
}

/// Loop flavor: condition-driven or iterator-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    While,
    Iterator,
}

impl LoopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopKind::While => "while",
            LoopKind::Iterator => "iterator",
        }
    }
}

/// Collection transform flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionOpKind {
    Map,
    Filter,
    Reduce,
}

impl CollectionOpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionOpKind::Map => "map",
            CollectionOpKind::Filter => "filter",
            CollectionOpKind::Reduce => "reduce",
        }
    }
}

/// Organizational container flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Module,
    Class,
    Namespace,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Module => "module",
            ContainerKind::Class => "class",
            ContainerKind::Namespace => "namespace",
        }
    }
}

/// Declared visibility of a function or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
        }
    }
}

/// Binding pattern used by parameters, destructuring and match arms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Bind a single name.
    Binding(String),
    /// Match anything, bind nothing.
    Wildcard,
    /// Positional destructuring of sub-patterns.
    Tuple(Vec<Pattern>),
    /// Match a literal value (match arms only).
    Literal { kind: LiteralKind, value: String },
}

impl Pattern {
    /// All names bound by this pattern, in declaration order.
    pub fn bound_names(&self) -> Vec<&str> {
        match self {
            Pattern::Binding(name) => vec![name.as_str()],
            Pattern::Wildcard | Pattern::Literal { .. } => Vec::new(),
            Pattern::Tuple(parts) => parts.iter().flat_map(|p| p.bound_names()).collect(),
        }
    }
}

/// A formal parameter: pattern, optional default, optional type annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<MetaNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
}

impl Parameter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            pattern: Pattern::Binding(name.into()),
            default: None,
            type_hint: None,
        }
    }
}

/// One key/value pair of a map literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: MetaNode,
    pub value: MetaNode,
}

/// One arm of a multi-arm pattern match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<MetaNode>,
    pub body: MetaNode,
}

/// One handler of an exception-handling construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    pub body: MetaNode,
}

/// A node of the meta-AST.
///
/// The enum is closed: every expressible construct is one of these shapes,
/// and anything a source language cannot map onto them is boxed into
/// [`MetaNode::Foreign`] with a semantic hint. Nodes are immutable once
/// built; analyses read them by reference only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaNode {
    // ---- universal tier ----
    Literal {
        kind: LiteralKind,
        value: String,
    },
    Variable {
        name: String,
    },
    ListLiteral {
        elements: Vec<MetaNode>,
    },
    MapLiteral {
        entries: Vec<MapEntry>,
    },
    BinaryOp {
        op: String,
        left: Box<MetaNode>,
        right: Box<MetaNode>,
    },
    UnaryOp {
        op: String,
        operand: Box<MetaNode>,
    },
    Call {
        callee: Box<MetaNode>,
        args: Vec<MetaNode>,
    },
    Conditional {
        condition: Box<MetaNode>,
        then_branch: Box<MetaNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_branch: Option<Box<MetaNode>>,
    },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Box<MetaNode>>,
    },
    Block {
        statements: Vec<MetaNode>,
    },
    Assignment {
        target: Box<MetaNode>,
        value: Box<MetaNode>,
    },
    Destructure {
        pattern: Pattern,
        value: Box<MetaNode>,
    },

    // ---- common-pattern tier ----
    Loop {
        kind: LoopKind,
        /// Iteration binding; present iff `kind` is [`LoopKind::Iterator`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        binding: Option<Pattern>,
        /// The condition (while) or the iterable (iterator).
        subject: Box<MetaNode>,
        body: Box<MetaNode>,
    },
    Lambda {
        params: Vec<Parameter>,
        body: Box<MetaNode>,
    },
    CollectionOp {
        kind: CollectionOpKind,
        target: Box<MetaNode>,
        operation: Box<MetaNode>,
        /// Initial accumulator; present iff `kind` is [`CollectionOpKind::Reduce`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial: Option<Box<MetaNode>>,
    },
    Match {
        subject: Box<MetaNode>,
        arms: Vec<MatchArm>,
    },
    TryCatch {
        body: Box<MetaNode>,
        handlers: Vec<CatchClause>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finally: Option<Box<MetaNode>>,
    },
    Async {
        inner: Box<MetaNode>,
    },

    // ---- organizational tier ----
    Container {
        kind: ContainerKind,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        interfaces: Vec<String>,
        members: Vec<MetaNode>,
    },
    FunctionDef {
        name: String,
        #[serde(default)]
        visibility: Visibility,
        params: Vec<Parameter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        decorators: Vec<String>,
        body: Box<MetaNode>,
    },
    AttributeAccess {
        object: Box<MetaNode>,
        attribute: String,
    },
    CompoundAssignment {
        op: String,
        target: Box<MetaNode>,
        value: Box<MetaNode>,
    },
    Property {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        getter: Option<Box<MetaNode>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        setter: Option<Box<MetaNode>>,
    },

    // ---- escape hatch ----
    /// Wrapper for constructs the unified model cannot express. The payload
    /// is never interpreted by the core.
    Foreign {
        language: String,
        hint: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
}

impl MetaNode {
    /// Stable tag name for this node's variant.
    pub fn kind(&self) -> &'static str {
        match self {
            MetaNode::Literal { .. } => "literal",
            MetaNode::Variable { .. } => "variable",
            MetaNode::ListLiteral { .. } => "list_literal",
            MetaNode::MapLiteral { .. } => "map_literal",
            MetaNode::BinaryOp { .. } => "binary_op",
            MetaNode::UnaryOp { .. } => "unary_op",
            MetaNode::Call { .. } => "call",
            MetaNode::Conditional { .. } => "conditional",
            MetaNode::Return { .. } => "return",
            MetaNode::Block { .. } => "block",
            MetaNode::Assignment { .. } => "assignment",
            MetaNode::Destructure { .. } => "destructure",
            MetaNode::Loop { .. } => "loop",
            MetaNode::Lambda { .. } => "lambda",
            MetaNode::CollectionOp { .. } => "collection_op",
            MetaNode::Match { .. } => "match",
            MetaNode::TryCatch { .. } => "try_catch",
            MetaNode::Async { .. } => "async",
            MetaNode::Container { .. } => "container",
            MetaNode::FunctionDef { .. } => "function_def",
            MetaNode::AttributeAccess { .. } => "attribute_access",
            MetaNode::CompoundAssignment { .. } => "compound_assignment",
            MetaNode::Property { .. } => "property",
            MetaNode::Foreign { .. } => "foreign",
        }
    }

    /// Direct children in a fixed, documented order. This is the single
    /// traversal seam shared by conformance checking, fingerprinting and
    /// the runner.
    pub fn children(&self) -> Vec<&MetaNode> {
        match self {
            MetaNode::Literal { .. } | MetaNode::Variable { .. } | MetaNode::Foreign { .. } => {
                Vec::new()
            }
            MetaNode::ListLiteral { elements } => elements.iter().collect(),
            MetaNode::MapLiteral { entries } => entries
                .iter()
                .flat_map(|e| [&e.key, &e.value])
                .collect(),
            MetaNode::BinaryOp { left, right, .. } => vec![left, right],
            MetaNode::UnaryOp { operand, .. } => vec![operand],
            MetaNode::Call { callee, args } => {
                let mut out: Vec<&MetaNode> = vec![callee];
                out.extend(args.iter());
                out
            }
            MetaNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut out: Vec<&MetaNode> = vec![condition, then_branch];
                if let Some(e) = else_branch {
                    out.push(e);
                }
                out
            }
            MetaNode::Return { value } => value.iter().map(|v| v.as_ref()).collect(),
            MetaNode::Block { statements } => statements.iter().collect(),
            MetaNode::Assignment { target, value }
            | MetaNode::CompoundAssignment { target, value, .. } => vec![target, value],
            MetaNode::Destructure { value, .. } => vec![value],
            MetaNode::Loop { subject, body, .. } => vec![subject, body],
            MetaNode::Lambda { params, body } => {
                let mut out: Vec<&MetaNode> =
                    params.iter().filter_map(|p| p.default.as_ref()).collect();
                out.push(body);
                out
            }
            MetaNode::CollectionOp {
                target,
                operation,
                initial,
                ..
            } => {
                let mut out: Vec<&MetaNode> = vec![target, operation];
                if let Some(init) = initial {
                    out.push(init);
                }
                out
            }
            MetaNode::Match { subject, arms } => {
                let mut out: Vec<&MetaNode> = vec![subject];
                for arm in arms {
                    if let Some(g) = &arm.guard {
                        out.push(g);
                    }
                    out.push(&arm.body);
                }
                out
            }
            MetaNode::TryCatch {
                body,
                handlers,
                finally,
            } => {
                let mut out: Vec<&MetaNode> = vec![body];
                out.extend(handlers.iter().map(|h| &h.body));
                if let Some(f) = finally {
                    out.push(f);
                }
                out
            }
            MetaNode::Async { inner } => vec![inner],
            MetaNode::Container { members, .. } => members.iter().collect(),
            MetaNode::FunctionDef { params, body, .. } => {
                let mut out: Vec<&MetaNode> =
                    params.iter().filter_map(|p| p.default.as_ref()).collect();
                out.push(body);
                out
            }
            MetaNode::AttributeAccess { object, .. } => vec![object],
            MetaNode::Property { getter, setter, .. } => {
                let mut out = Vec::new();
                if let Some(g) = getter {
                    out.push(g.as_ref());
                }
                if let Some(s) = setter {
                    out.push(s.as_ref());
                }
                out
            }
        }
    }

    /// Total number of nodes in this subtree, the root included.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Name of this container, if the node is one.
    pub fn container_name(&self) -> Option<&str> {
        match self {
            MetaNode::Container { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Name of this function definition, if the node is one.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            MetaNode::FunctionDef { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Declared visibility, for nodes that carry one.
    pub fn visibility(&self) -> Option<Visibility> {
        match self {
            MetaNode::FunctionDef { visibility, .. } => Some(*visibility),
            _ => None,
        }
    }

    /// Whether this subtree mutates state anywhere (plain or compound
    /// assignment, at any depth).
    pub fn has_mutable_state(&self) -> bool {
        match self {
            MetaNode::Assignment { .. } | MetaNode::CompoundAssignment { .. } => true,
            _ => self.children().iter().any(|c| c.has_mutable_state()),
        }
    }
}

/// Every variable name referenced or bound anywhere in the subtree.
pub fn collect_variables(tree: &MetaNode) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect_into(tree, &mut names);
    names
}

fn collect_into(node: &MetaNode, names: &mut BTreeSet<String>) {
    match node {
        MetaNode::Variable { name } => {
            names.insert(name.clone());
        }
        MetaNode::Destructure { pattern, .. } => collect_pattern(pattern, names),
        MetaNode::Loop {
            binding: Some(pattern),
            ..
        } => collect_pattern(pattern, names),
        MetaNode::Lambda { params, .. } | MetaNode::FunctionDef { params, .. } => {
            for param in params {
                collect_pattern(&param.pattern, names);
            }
        }
        MetaNode::Match { arms, .. } => {
            for arm in arms {
                collect_pattern(&arm.pattern, names);
            }
        }
        MetaNode::TryCatch { handlers, .. } => {
            for handler in handlers {
                if let Some(binding) = &handler.binding {
                    names.insert(binding.clone());
                }
            }
        }
        _ => {}
    }
    for child in node.children() {
        collect_into(child, names);
    }
}

fn collect_pattern(pattern: &Pattern, names: &mut BTreeSet<String>) {
    for name in pattern.bound_names() {
        names.insert(name.to_string());
    }
}

// Convenience constructors used heavily by adapters and tests.
impl MetaNode {
    pub fn literal(kind: LiteralKind, value: impl Into<String>) -> Self {
        MetaNode::Literal {
            kind,
            value: value.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        MetaNode::Variable { name: name.into() }
    }

    pub fn block(statements: Vec<MetaNode>) -> Self {
        MetaNode::Block { statements }
    }

    pub fn binary(op: impl Into<String>, left: MetaNode, right: MetaNode) -> Self {
        MetaNode::BinaryOp {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(callee: MetaNode, args: Vec<MetaNode>) -> Self {
        MetaNode::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn ret(value: Option<MetaNode>) -> Self {
        MetaNode::Return {
            value: value.map(Box::new),
        }
    }

    pub fn assign(target: MetaNode, value: MetaNode) -> Self {
        MetaNode::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn conditional(
        condition: MetaNode,
        then_branch: MetaNode,
        else_branch: Option<MetaNode>,
    ) -> Self {
        MetaNode::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn function(name: impl Into<String>, params: Vec<Parameter>, body: MetaNode) -> Self {
        MetaNode::FunctionDef {
            name: name.into(),
            visibility: Visibility::Public,
            params,
            return_type: None,
            decorators: Vec::new(),
            body: Box::new(body),
        }
    }
}
