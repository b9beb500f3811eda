use crate::errors::{Result, ResultExt};
use crate::io::FileSystem;

use super::document::FeatureSpec;
use super::layout::ProjectLayout;

/// Directory-tree reader yielding named specification documents.
pub trait SpecSource: Send + Sync {
    /// Names of features that carry a specification document, sorted
    fn list_features(&self) -> Result<Vec<String>>;

    /// Load and parse one feature's specification
    fn load_feature(&self, feature: &str) -> Result<FeatureSpec>;
}

/// Reads `<features_dir>/<feature>/<feature><spec_suffix>` through a [`FileSystem`].
pub struct FsSpecSource<'a> {
    fs: &'a dyn FileSystem,
    layout: &'a ProjectLayout,
}

impl<'a> FsSpecSource<'a> {
    pub fn new(fs: &'a dyn FileSystem, layout: &'a ProjectLayout) -> Self {
        Self { fs, layout }
    }
}

impl SpecSource for FsSpecSource<'_> {
    fn list_features(&self) -> Result<Vec<String>> {
        let candidates = self.fs.list_dirs(&self.layout.features_root())?;
        Ok(candidates
            .into_iter()
            .filter(|feature| self.fs.is_file(&self.layout.spec_path(feature)))
            .collect())
    }

    fn load_feature(&self, feature: &str) -> Result<FeatureSpec> {
        let path = self.layout.spec_path(feature);
        let text = self.fs.read_to_string(&path)?;
        let spec = FeatureSpec::from_json_str(&text)
            .context(format!("feature '{}'", feature))?;
        tracing::debug!(
            feature,
            endpoints = spec.endpoints.len(),
            "Loaded specification"
        );
        Ok(spec)
    }
}
