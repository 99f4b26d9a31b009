//! Structural fingerprinting and clone detection.
//!
//! Pure functions over a meta-AST, independent of documents and the runner:
//!
//! - [`exact`]: cryptographic digest of the full structure. Equal digests
//!   imply structurally and literally identical trees.
//! - [`normalized`]: digest after rewriting identifiers and literal values
//!   to wildcards, shape kept — equal digests mean a Type II clone.
//! - [`tokens`]: flattened structural markers for coarse similarity.
//! - [`detect`]: pairwise clone classification (Type I / II / III).

mod normalize;
mod tokens;

use serde::{Deserialize, Serialize, de};
use sha2::{Digest as _, Sha256};
use std::fmt;

use crate::ast::{MetaNode, Parameter, Pattern};

pub use normalize::normalize;
pub use tokens::tokens;

/// A fixed-size structural digest (SHA-256).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        if hex.len() != 64 {
            return Err(de::Error::custom("digest must be 64 hex characters"));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk).map_err(de::Error::custom)?;
            bytes[i] = u8::from_str_radix(s, 16).map_err(de::Error::custom)?;
        }
        Ok(Digest(bytes))
    }
}

/// Digest of the full structure: tags, attributes, values, children,
/// recursively, over an unambiguous canonical byte form.
pub fn exact(tree: &MetaNode) -> Digest {
    let mut buf = Vec::new();
    write_canonical(tree, &mut buf);
    let mut hasher = Sha256::new();
    hasher.update(&buf);
    Digest(hasher.finalize().into())
}

/// Digest after normalization: renamed identifiers and changed literal
/// values digest identically, anything structural does not.
pub fn normalized(tree: &MetaNode) -> Digest {
    exact(&normalize(tree))
}

// Canonical form: every string is length-prefixed (netstring style), every
// optional is marked present/absent, every list carries its length. No two
// distinct trees share a byte form; in particular an absent branch ('N')
// never collides with a present-but-empty one.
fn write_canonical(node: &MetaNode, out: &mut Vec<u8>) {
    out.extend_from_slice(node.kind().as_bytes());
    out.push(b'(');
    match node {
        MetaNode::Literal { kind, value } => {
            put_str(kind.as_str(), out);
            put_str(value, out);
        }
        MetaNode::Variable { name } => put_str(name, out),
        MetaNode::ListLiteral { elements } => put_nodes(elements.iter(), elements.len(), out),
        MetaNode::MapLiteral { entries } => {
            put_len(entries.len(), out);
            for entry in entries {
                write_canonical(&entry.key, out);
                write_canonical(&entry.value, out);
            }
        }
        MetaNode::BinaryOp { op, left, right } => {
            put_str(op, out);
            write_canonical(left, out);
            write_canonical(right, out);
        }
        MetaNode::UnaryOp { op, operand } => {
            put_str(op, out);
            write_canonical(operand, out);
        }
        MetaNode::Call { callee, args } => {
            write_canonical(callee, out);
            put_nodes(args.iter(), args.len(), out);
        }
        MetaNode::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            write_canonical(condition, out);
            write_canonical(then_branch, out);
            put_opt_node(else_branch.as_deref(), out);
        }
        MetaNode::Return { value } => put_opt_node(value.as_deref(), out),
        MetaNode::Block { statements } => put_nodes(statements.iter(), statements.len(), out),
        MetaNode::Assignment { target, value } => {
            write_canonical(target, out);
            write_canonical(value, out);
        }
        MetaNode::Destructure { pattern, value } => {
            write_pattern(pattern, out);
            write_canonical(value, out);
        }
        MetaNode::Loop {
            kind,
            binding,
            subject,
            body,
        } => {
            put_str(kind.as_str(), out);
            match binding {
                None => out.push(b'N'),
                Some(pattern) => {
                    out.push(b'S');
                    write_pattern(pattern, out);
                }
            }
            write_canonical(subject, out);
            write_canonical(body, out);
        }
        MetaNode::Lambda { params, body } => {
            put_params(params, out);
            write_canonical(body, out);
        }
        MetaNode::CollectionOp {
            kind,
            target,
            operation,
            initial,
        } => {
            put_str(kind.as_str(), out);
            write_canonical(target, out);
            write_canonical(operation, out);
            put_opt_node(initial.as_deref(), out);
        }
        MetaNode::Match { subject, arms } => {
            write_canonical(subject, out);
            put_len(arms.len(), out);
            for arm in arms {
                write_pattern(&arm.pattern, out);
                put_opt_node(arm.guard.as_ref(), out);
                write_canonical(&arm.body, out);
            }
        }
        MetaNode::TryCatch {
            body,
            handlers,
            finally,
        } => {
            write_canonical(body, out);
            put_len(handlers.len(), out);
            for handler in handlers {
                put_opt_str(handler.exception_type.as_deref(), out);
                put_opt_str(handler.binding.as_deref(), out);
                write_canonical(&handler.body, out);
            }
            put_opt_node(finally.as_deref(), out);
        }
        MetaNode::Async { inner } => write_canonical(inner, out),
        MetaNode::Container {
            kind,
            name,
            parent,
            interfaces,
            members,
        } => {
            put_str(kind.as_str(), out);
            put_str(name, out);
            put_opt_str(parent.as_deref(), out);
            put_len(interfaces.len(), out);
            for interface in interfaces {
                put_str(interface, out);
            }
            put_nodes(members.iter(), members.len(), out);
        }
        MetaNode::FunctionDef {
            name,
            visibility,
            params,
            return_type,
            decorators,
            body,
        } => {
            put_str(name, out);
            put_str(visibility.as_str(), out);
            put_params(params, out);
            put_opt_str(return_type.as_deref(), out);
            put_len(decorators.len(), out);
            for decorator in decorators {
                put_str(decorator, out);
            }
            write_canonical(body, out);
        }
        MetaNode::AttributeAccess { object, attribute } => {
            write_canonical(object, out);
            put_str(attribute, out);
        }
        MetaNode::CompoundAssignment { op, target, value } => {
            put_str(op, out);
            write_canonical(target, out);
            write_canonical(value, out);
        }
        MetaNode::Property {
            name,
            getter,
            setter,
        } => {
            put_str(name, out);
            put_opt_node(getter.as_deref(), out);
            put_opt_node(setter.as_deref(), out);
        }
        MetaNode::Foreign {
            language,
            hint,
            payload,
        } => {
            put_str(language, out);
            put_str(hint, out);
            // serde_json's default map is ordered, so this is canonical.
            let json = serde_json::to_string(payload).unwrap_or_default();
            put_str(&json, out);
        }
    }
    out.push(b')');
}

fn write_pattern(pattern: &Pattern, out: &mut Vec<u8>) {
    match pattern {
        Pattern::Binding(name) => {
            out.extend_from_slice(b"bind:");
            put_str(name, out);
        }
        Pattern::Wildcard => out.extend_from_slice(b"wild;"),
        Pattern::Tuple(parts) => {
            out.extend_from_slice(b"tuple:");
            put_len(parts.len(), out);
            for part in parts {
                write_pattern(part, out);
            }
        }
        Pattern::Literal { kind, value } => {
            out.extend_from_slice(b"lit:");
            put_str(kind.as_str(), out);
            put_str(value, out);
        }
    }
}

fn put_params(params: &[Parameter], out: &mut Vec<u8>) {
    put_len(params.len(), out);
    for param in params {
        write_pattern(&param.pattern, out);
        put_opt_node(param.default.as_ref(), out);
        put_opt_str(param.type_hint.as_deref(), out);
    }
}

fn put_nodes<'a>(
    nodes: impl Iterator<Item = &'a MetaNode>,
    len: usize,
    out: &mut Vec<u8>,
) {
    put_len(len, out);
    for node in nodes {
        write_canonical(node, out);
    }
}

fn put_opt_node(node: Option<&MetaNode>, out: &mut Vec<u8>) {
    match node {
        None => out.push(b'N'),
        Some(n) => {
            out.push(b'S');
            write_canonical(n, out);
        }
    }
}

fn put_str(s: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(s.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(s.as_bytes());
}

fn put_opt_str(s: Option<&str>, out: &mut Vec<u8>) {
    match s {
        None => out.push(b'N'),
        Some(s) => {
            out.push(b'S');
            put_str(s, out);
        }
    }
}

fn put_len(len: usize, out: &mut Vec<u8>) {
    out.push(b'#');
    out.extend_from_slice(len.to_string().as_bytes());
    out.push(b';');
}

/// Clone classification ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneType {
    /// Verbatim duplicate: identical structure and values.
    TypeOne,
    /// Renamed identifiers / changed literals over identical structure.
    TypeTwo,
    /// Near-miss: token similarity above the configured threshold.
    TypeThree,
}

/// Tunables for pairwise detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum token similarity for a Type III classification. The metric
    /// is the Sørensen–Dice coefficient over token multisets.
    pub similarity_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
        }
    }
}

impl DetectionConfig {
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}

/// Result of comparing two trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneReport {
    pub duplicate: bool,
    pub clone_type: Option<CloneType>,
    /// 1.0 for Type I/II; the token similarity score otherwise.
    pub similarity: f64,
    pub exact_digests: (Digest, Digest),
    pub normalized_digests: (Digest, Digest),
}

/// Classify a pair of trees.
pub fn detect(a: &MetaNode, b: &MetaNode, config: &DetectionConfig) -> CloneReport {
    let exact_digests = (exact(a), exact(b));
    let normalized_digests = (normalized(a), normalized(b));

    if exact_digests.0 == exact_digests.1 {
        return CloneReport {
            duplicate: true,
            clone_type: Some(CloneType::TypeOne),
            similarity: 1.0,
            exact_digests,
            normalized_digests,
        };
    }

    if normalized_digests.0 == normalized_digests.1 {
        return CloneReport {
            duplicate: true,
            clone_type: Some(CloneType::TypeTwo),
            similarity: 1.0,
            exact_digests,
            normalized_digests,
        };
    }

    let similarity = token_similarity(&tokens(a), &tokens(b));
    let near_miss = similarity >= config.similarity_threshold;
    CloneReport {
        duplicate: near_miss,
        clone_type: near_miss.then_some(CloneType::TypeThree),
        similarity,
        exact_digests,
        normalized_digests,
    }
}

/// Sørensen–Dice coefficient over token multisets:
/// `2 * |A ∩ B| / (|A| + |B|)`, in `[0, 1]`.
pub fn token_similarity(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut counts = std::collections::HashMap::<&str, isize>::new();
    for token in a {
        *counts.entry(token.as_str()).or_default() += 1;
    }
    let mut shared = 0usize;
    for token in b {
        let count = counts.entry(token.as_str()).or_default();
        if *count > 0 {
            shared += 1;
            *count -= 1;
        }
    }

    (2.0 * shared as f64) / ((a.len() + b.len()) as f64)
}
