use crate::config::FluxcheckConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::document::EndpointSpec;

/// The kinds of file an endpoint is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Contract,
    Logic,
    Test,
    Helper,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Logic => "logic",
            Self::Test => "test",
            Self::Helper => "helper",
        }
    }

    /// Classify `name.kind.ext` file names by their middle segment
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let mut parts = file_name.rsplitn(3, '.');
        let _ext = parts.next()?;
        let kind = parts.next()?;
        parts.next()?;
        match kind {
            "contract" => Some(Self::Contract),
            "logic" => Some(Self::Logic),
            "test" | "spec" => Some(Self::Test),
            "helper" | "helpers" => Some(Self::Helper),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a project keeps its features, specifications and manifests.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub features_dir: PathBuf,
    pub manifest_dir: PathBuf,
    pub spec_suffix: String,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>, config: &FluxcheckConfig) -> Self {
        Self {
            root: root.into(),
            features_dir: config.features_dir.clone(),
            manifest_dir: config.manifest_dir.clone(),
            spec_suffix: config.spec_suffix.clone(),
        }
    }

    pub fn features_root(&self) -> PathBuf {
        self.root.join(&self.features_dir)
    }

    pub fn feature_dir(&self, feature: &str) -> PathBuf {
        self.features_root().join(feature)
    }

    pub fn spec_path(&self, feature: &str) -> PathBuf {
        self.feature_dir(feature)
            .join(format!("{}{}", feature, self.spec_suffix))
    }

    pub fn endpoint_dir(&self, feature: &str, endpoint: &str, spec: &EndpointSpec) -> PathBuf {
        let folder = spec.folder.as_deref().unwrap_or(endpoint);
        self.feature_dir(feature).join(folder)
    }

    /// Resolve the artifact locations of one endpoint
    pub fn artifacts(&self, feature: &str, endpoint: &str, spec: &EndpointSpec) -> ArtifactPaths {
        let dir = self.endpoint_dir(feature, endpoint, spec);
        let named = |file: Option<&String>, kind: ArtifactKind| {
            file.map(|f| dir.join(f))
                .unwrap_or_else(|| dir.join(format!("{}.{}.ts", endpoint, kind)))
        };

        ArtifactPaths {
            contract: named(spec.contract.file.as_ref(), ArtifactKind::Contract),
            logic: named(spec.logic.file.as_ref(), ArtifactKind::Logic),
            test: named(
                spec.test.as_ref().and_then(|t| t.file.as_ref()),
                ArtifactKind::Test,
            ),
            endpoint_dir: dir,
        }
    }

    pub fn manifest_path(&self, feature: &str, endpoint: &str) -> PathBuf {
        self.root
            .join(&self.manifest_dir)
            .join(feature)
            .join(format!("{}.manifest.json", endpoint))
    }

    pub fn feature_report_path(&self, feature: &str) -> PathBuf {
        self.root
            .join(&self.manifest_dir)
            .join(feature)
            .join(format!("{}.report.json", feature))
    }

    /// Project-relative display path using forward slashes
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Resolved artifact paths of a single endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub endpoint_dir: PathBuf,
    pub contract: PathBuf,
    pub logic: PathBuf,
    pub test: PathBuf,
}

impl ArtifactPaths {
    /// Helper names without an extension follow the `<name>.helper.ts` convention
    pub fn helper(&self, name: &str) -> PathBuf {
        if name.contains('.') {
            self.endpoint_dir.join(name)
        } else {
            self.endpoint_dir.join(format!("{}.helper.ts", name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ProjectLayout {
        ProjectLayout::new("/project", &FluxcheckConfig::default())
    }

    #[test]
    fn test_default_artifact_names() {
        let paths = layout().artifacts("users", "get", &EndpointSpec::default());
        assert_eq!(
            paths.contract,
            PathBuf::from("/project/src/features/users/get/get.contract.ts")
        );
        assert_eq!(
            paths.test,
            PathBuf::from("/project/src/features/users/get/get.test.ts")
        );
        assert_eq!(
            paths.helper("format"),
            PathBuf::from("/project/src/features/users/get/format.helper.ts")
        );
    }

    #[test]
    fn test_folder_and_file_overrides() {
        let mut spec = EndpointSpec {
            folder: Some("by-id".to_string()),
            ..Default::default()
        };
        spec.logic.file = Some("handler.logic.ts".to_string());

        let paths = layout().artifacts("users", "get", &spec);
        assert_eq!(
            paths.logic,
            PathBuf::from("/project/src/features/users/by-id/handler.logic.ts")
        );
    }

    #[test]
    fn test_artifact_kind_from_file_name() {
        assert_eq!(
            ArtifactKind::from_file_name("get.logic.ts"),
            Some(ArtifactKind::Logic)
        );
        assert_eq!(
            ArtifactKind::from_file_name("get.contract.ts"),
            Some(ArtifactKind::Contract)
        );
        assert_eq!(ArtifactKind::from_file_name("get.ts"), None);
        assert_eq!(ArtifactKind::from_file_name("get.styles.ts"), None);
    }

    #[test]
    fn test_relative_and_manifest_paths() {
        let layout = layout();
        assert_eq!(
            layout.relative(Path::new("/project/src/features/users/get/get.logic.ts")),
            "src/features/users/get/get.logic.ts"
        );
        assert_eq!(
            layout.manifest_path("users", "get"),
            PathBuf::from("/project/.fluxcheck/manifests/users/get.manifest.json")
        );
        assert_eq!(
            layout.spec_path("users"),
            PathBuf::from("/project/src/features/users/users.spec.json")
        );
    }
}
