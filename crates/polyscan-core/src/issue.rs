//! Issue reporting for analysis results.
//!
//! An [`Issue`] is one finding emitted by one analyzer at one node. Issues
//! are immutable once built and are never merged; the runner only appends
//! them to a report in visitation order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Severity ladder for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

/// Broad analysis category an analyzer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Quality,
    Security,
    Duplication,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Quality => "quality",
            Category::Security => "security",
            Category::Duplication => "duplication",
        }
    }
}

/// Position of a node within its tree: child indices from the root, in
/// [`crate::ast::MetaNode::children`] order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        NodePath(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }
        write!(f, "root")?;
        for index in &self.0 {
            write!(f, ".{index}")?;
        }
        Ok(())
    }
}

/// Source location, when the adapter recorded one for the offending node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Where an inserted fragment goes, relative to the offending node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Before,
    After,
}

/// A typed fix suggestion attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "action")]
pub enum Suggestion {
    Replace { with: String },
    Remove,
    Insert { what: String, position: InsertPosition },
}

/// One finding produced during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub analyzer_id: String,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    /// Variant tag of the offending node.
    pub node_kind: String,
    /// Position of the offending node within the document tree.
    pub path: NodePath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Issue {
    pub fn new(
        analyzer_id: impl Into<String>,
        category: Category,
        severity: Severity,
        message: impl Into<String>,
        node_kind: impl Into<String>,
        path: NodePath,
    ) -> Self {
        Self {
            analyzer_id: analyzer_id.into(),
            category,
            severity,
            message: message.into(),
            node_kind: node_kind.into(),
            path,
            location: None,
            suggestion: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.location = Some(Location { line, column });
        self
    }

    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
