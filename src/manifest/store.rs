use serde::Serialize;
use std::path::PathBuf;

use super::feature::FeatureReport;
use super::record::EndpointManifest;
use crate::errors::{Result, ResultExt};
use crate::io::FileSystem;
use crate::spec::ProjectLayout;

/// Writes manifests and feature reports under the configured manifest directory.
///
/// Every endpoint and every feature owns a distinct path, so concurrent
/// writers never touch the same file.
pub struct ManifestStore<'a> {
    fs: &'a dyn FileSystem,
    layout: &'a ProjectLayout,
}

impl<'a> ManifestStore<'a> {
    pub fn new(fs: &'a dyn FileSystem, layout: &'a ProjectLayout) -> Self {
        Self { fs, layout }
    }

    pub fn write_endpoint(&self, manifest: &EndpointManifest) -> Result<PathBuf> {
        let path = self
            .layout
            .manifest_path(&manifest.feature, &manifest.endpoint);
        self.write_json(&path, manifest)
            .context(format!("writing manifest for {}", manifest.key()))?;
        Ok(path)
    }

    pub fn write_feature(&self, report: &FeatureReport) -> Result<PathBuf> {
        let path = self.layout.feature_report_path(&report.feature);
        self.write_json(&path, report)
            .context(format!("writing report for feature '{}'", report.feature))?;
        Ok(path)
    }

    pub fn read_endpoint(&self, feature: &str, endpoint: &str) -> Result<EndpointManifest> {
        let text = self
            .fs
            .read_to_string(&self.layout.manifest_path(feature, endpoint))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write_json<T: Serialize>(&self, path: &std::path::Path, value: &T) -> Result<()> {
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');
        self.fs.write(path, &json)
    }
}
