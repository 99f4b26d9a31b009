//! Built-in analyzers.
//!
//! Each one is an ordinary [`Analyzer`] implementation with no special
//! access to the runner; anything they do, a third-party analyzer can do.

pub mod complexity;
pub mod dead_code;
pub mod duplication;
pub mod injection;

use std::sync::Arc;

use crate::analyzer::{Analyzer, AnalyzerRegistry};

pub use complexity::Complexity;
pub use dead_code::DeadCode;
pub use duplication::Duplication;
pub use injection::Injection;

/// A registry with every built-in analyzer registered, in id order.
pub fn default_registry() -> AnalyzerRegistry {
    let mut registry = AnalyzerRegistry::new();
    registry.register(Arc::new(DeadCode::new()) as Arc<dyn Analyzer>);
    registry.register(Arc::new(Complexity::new()) as Arc<dyn Analyzer>);
    registry.register(Arc::new(Injection::new()) as Arc<dyn Analyzer>);
    registry.register(Arc::new(Duplication::new()) as Arc<dyn Analyzer>);
    registry
}
