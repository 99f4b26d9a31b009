//! Registry of active analyzers.
//!
//! An explicit, injectable instance — never ambient global state. A runner
//! call takes a snapshot of the registry at start, so concurrent runs are
//! independent of later `register`/`unregister`/`clear` calls.

use std::sync::Arc;

use super::{Analyzer, AnalyzerInfo};

#[derive(Default)]
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self {
            analyzers: Vec::new(),
        }
    }

    /// Register an analyzer. Re-registering an id replaces the previous
    /// entry in place, keeping registration order stable.
    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) {
        let id = analyzer.info().id;
        if let Some(existing) = self
            .analyzers
            .iter_mut()
            .find(|a| a.info().id == id)
        {
            *existing = analyzer;
        } else {
            self.analyzers.push(analyzer);
        }
    }

    /// Remove the analyzer with this id. Returns whether one was present.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.analyzers.len();
        self.analyzers.retain(|a| a.info().id != id);
        self.analyzers.len() != before
    }

    /// Remove every registered analyzer. Called between independent runs
    /// when cross-run leakage must be ruled out.
    pub fn clear(&mut self) {
        self.analyzers.clear();
    }

    /// Info for every registered analyzer, in registration order.
    pub fn list(&self) -> Vec<&AnalyzerInfo> {
        self.analyzers.iter().map(|a| a.info()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Analyzer>> {
        self.analyzers.iter().find(|a| a.info().id == id)
    }

    /// Cheap copy of the currently registered analyzers, in registration
    /// order. This is what a run consumes.
    pub fn snapshot(&self) -> Vec<Arc<dyn Analyzer>> {
        self.analyzers.clone()
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}
