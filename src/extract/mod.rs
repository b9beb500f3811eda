//! Fact extraction from loosely-structured source text.
//!
//! A [`FactSet`] is purely a function of the text it was extracted from. It
//! holds no reference back to the specification, so extraction for different
//! endpoints can run independently and in parallel.

pub mod block;
pub mod contract;
pub mod source;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub use contract::{extract_contract, ContractExtraction, Section};
pub use source::{
    event_names, exported_symbols, extract_logic, extract_tests, import_paths, normalize_test_name,
    test_names,
};

/// Normalized facts found in one artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactSet {
    /// Route string to handler name
    pub routes: BTreeMap<String, String>,
    pub imports: ImportFacts,
    pub exports: BTreeSet<String>,
    /// Test-case names as written, in declaration order
    pub tests: Vec<String>,
    pub helpers: Vec<String>,
    pub publishes: BTreeSet<String>,
    pub subscribes: BTreeSet<String>,
}

impl FactSet {
    /// Distinct handler names referenced by the route table
    pub fn handlers(&self) -> Vec<String> {
        let unique: BTreeSet<&String> = self.routes.values().collect();
        unique.into_iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportFacts {
    pub framework: BTreeSet<String>,
    pub external: BTreeSet<String>,
}

impl ImportFacts {
    /// Framework modules first, then external ones
    pub fn all(&self) -> Vec<String> {
        self.framework
            .iter()
            .chain(self.external.iter().filter(|m| !self.framework.contains(*m)))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.framework.is_empty() && self.external.is_empty()
    }
}
