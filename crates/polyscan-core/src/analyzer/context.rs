//! Analysis context threaded through a traversal.
//!
//! One context view is constructed per analyzer call. The document,
//! ancestor stack, depth and current path are shared facts of the
//! traversal; the config view and scope map belong to one analyzer alone.

use std::collections::HashMap;

use crate::ast::MetaNode;
use crate::config::AnalyzerConfig;
use crate::document::Document;
use crate::issue::NodePath;

/// Per-analyzer, per-run private state. Confined to a single runner
/// invocation; never leaks across runs.
pub type ScopeMap = HashMap<String, serde_json::Value>;

pub struct AnalysisContext<'a> {
    document: &'a Document,
    config: &'a AnalyzerConfig,
    ancestors: &'a [&'a MetaNode],
    depth: usize,
    path: &'a NodePath,
    scope: &'a mut ScopeMap,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        document: &'a Document,
        config: &'a AnalyzerConfig,
        ancestors: &'a [&'a MetaNode],
        depth: usize,
        path: &'a NodePath,
        scope: &'a mut ScopeMap,
    ) -> Self {
        Self {
            document,
            config,
            ancestors,
            depth,
            path,
            scope,
        }
    }

    /// The document being analyzed.
    pub fn document(&self) -> &Document {
        self.document
    }

    /// This analyzer's configuration for this run.
    pub fn config(&self) -> &AnalyzerConfig {
        self.config
    }

    /// Ancestor nodes of the current node, root first. Empty at the root.
    pub fn ancestors(&self) -> &[&MetaNode] {
        self.ancestors
    }

    /// Immediate parent of the current node, if any.
    pub fn parent(&self) -> Option<&MetaNode> {
        self.ancestors.last().copied()
    }

    /// Depth of the current node (root is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Path of the current node within the document tree.
    pub fn path(&self) -> &NodePath {
        self.path
    }

    /// This analyzer's private scope, read-only.
    pub fn scope(&self) -> &ScopeMap {
        self.scope
    }

    /// This analyzer's private scope, for recording traversal state.
    pub fn scope_mut(&mut self) -> &mut ScopeMap {
        self.scope
    }
}
