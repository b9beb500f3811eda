use std::collections::BTreeMap;

use super::stage::ValidationStage;
use super::stages::{ComplianceStage, DimensionStage, TypeCheckStage};
use crate::errors::{Error, Result};

/// Static map from stage name to stage, built once at startup.
pub struct StageRegistry {
    stages: BTreeMap<&'static str, Box<dyn ValidationStage>>,
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl StageRegistry {
    pub fn empty() -> Self {
        Self {
            stages: BTreeMap::new(),
        }
    }

    /// `typecheck`, `lint`, `contract`, `test` and `compliance`
    pub fn standard() -> Self {
        Self::empty()
            .with(TypeCheckStage)
            .with(DimensionStage::lint())
            .with(DimensionStage::contract())
            .with(DimensionStage::test())
            .with(ComplianceStage)
    }

    /// Register a stage, replacing any stage with the same name
    pub fn with(mut self, stage: impl ValidationStage + 'static) -> Self {
        self.stages.insert(stage.name(), Box::new(stage));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn ValidationStage> {
        self.stages.get(name).map(|s| s.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.keys().copied().collect()
    }

    /// Look up every name, in order, before anything runs
    pub fn select(&self, names: &[String]) -> Result<Vec<&dyn ValidationStage>> {
        names
            .iter()
            .map(|name| {
                self.get(name.trim()).ok_or_else(|| {
                    Error::Configuration(format!(
                        "unknown stage '{}' (available: {})",
                        name,
                        self.names().join(", ")
                    ))
                })
            })
            .collect()
    }
}
