//! Immutable analysis documents.
//!
//! A [`Document`] wraps one conformant meta-AST together with its source
//! language tag and metadata. It is built once at the adapter boundary and
//! never mutated; every analysis reads it by reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ast::{ConformanceError, MetaNode, validate};

/// Source language a document was lifted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Ruby,
    JavaScript,
    TypeScript,
    Java,
    Go,
    Other(String),
}

impl Language {
    pub fn as_str(&self) -> &str {
        match self {
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Go => "go",
            Language::Other(name) => name,
        }
    }
}

/// Language detection from a file extension, for adapters that only know
/// the path they parsed.
pub fn detect_language(filename: &str) -> Language {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match ext.as_str() {
        "py" => Language::Python,
        "rb" => Language::Ruby,
        "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
        "ts" | "mts" | "cts" | "tsx" => Language::TypeScript,
        "java" => Language::Java,
        "go" => Language::Go,
        other => Language::Other(other.to_string()),
    }
}

/// Free-form metadata an adapter attaches to a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl DocumentMetadata {
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            source_path: Some(path.into()),
            attributes: BTreeMap::new(),
        }
    }
}

/// One conformant tree plus its provenance. Construction is the only place
/// conformance is enforced for analysis input; a `Document` in hand is a
/// legal tree by definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    tree: MetaNode,
    language: Language,
    metadata: DocumentMetadata,
}

impl Document {
    /// Build a document, validating the tree at the boundary. A
    /// non-conformant tree is rejected with the offending subtree attached,
    /// never coerced.
    pub fn new(
        tree: MetaNode,
        language: Language,
        metadata: DocumentMetadata,
    ) -> Result<Self, ConformanceError> {
        validate(&tree)?;
        Ok(Self {
            tree,
            language,
            metadata,
        })
    }

    pub fn tree(&self) -> &MetaNode {
        &self.tree
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }
}
