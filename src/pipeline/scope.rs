//! What a pipeline run covers.
//!
//! Scopes narrow strictly: `file ⊂ endpoint ⊂ feature ⊂ full`. The target
//! argument is parsed once and resolved against the specification documents
//! before the first stage runs; every stage sees the same [`ResolvedScope`].

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};
use crate::scoring::Dimension;
use crate::spec::{ArtifactKind, EndpointSpec, FeatureSpec, SpecSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationScope {
    Full,
    Feature {
        feature: String,
    },
    Endpoint {
        feature: String,
        endpoint: String,
    },
    File {
        feature: String,
        endpoint: String,
        file: String,
    },
}

impl ValidationScope {
    pub fn feature(&self) -> Option<&str> {
        match self {
            Self::Full => None,
            Self::Feature { feature }
            | Self::Endpoint { feature, .. }
            | Self::File { feature, .. } => Some(feature),
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Endpoint { endpoint, .. } | Self::File { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }

    /// The target argument that selects this scope again
    pub fn target(&self) -> String {
        match self {
            Self::Full => "all".to_string(),
            Self::Feature { feature } => feature.clone(),
            Self::Endpoint { feature, endpoint } => format!("{}/{}", feature, endpoint),
            Self::File { feature, file, .. } => format!("{}/{}", feature, file),
        }
    }

    /// Feature reports are only meaningful when every endpoint of a feature is visited
    pub fn covers_whole_features(&self) -> bool {
        matches!(self, Self::Full | Self::Feature { .. })
    }

    /// Artifact kind of a file-scoped run
    pub fn file_kind(&self) -> Option<ArtifactKind> {
        match self {
            Self::File { file, .. } => ArtifactKind::from_file_name(file),
            _ => None,
        }
    }

    /// Dimensions relevant to this scope
    pub fn dimensions(&self) -> Vec<Dimension> {
        match self.file_kind() {
            Some(ArtifactKind::Contract) | Some(ArtifactKind::Helper) => {
                vec![Dimension::ContractCompliance]
            }
            Some(ArtifactKind::Test) => vec![Dimension::TestValidation],
            Some(ArtifactKind::Logic) => vec![
                Dimension::TypesValidation,
                Dimension::LintValidation,
                Dimension::CodeQuality,
            ],
            None => Dimension::ALL.to_vec(),
        }
    }

    /// Resolve against the specification documents.
    pub fn resolve(&self, source: &dyn SpecSource) -> Result<ResolvedScope> {
        let features = match self {
            Self::Full => {
                let mut features = Vec::new();
                for name in source.list_features()? {
                    let spec = source.load_feature(&name)?;
                    features.push(FeatureScope::whole(name, spec));
                }
                features
            }
            Self::Feature { feature } => {
                let spec = source.load_feature(feature)?;
                vec![FeatureScope::whole(feature.clone(), spec)]
            }
            Self::Endpoint { feature, endpoint } | Self::File { feature, endpoint, .. } => {
                let spec = source.load_feature(feature)?;
                spec.endpoint(feature, endpoint)?;
                vec![FeatureScope {
                    name: feature.clone(),
                    endpoints: vec![endpoint.clone()],
                    spec,
                }]
            }
        };

        Ok(ResolvedScope {
            scope: self.clone(),
            features,
        })
    }
}

impl FromStr for ValidationScope {
    type Err = Error;

    /// `""`, `all`, `.`: full; `feature`; `feature/endpoint`;
    /// `feature/endpoint.kind.ext`: one file of an endpoint.
    fn from_str(target: &str) -> Result<Self> {
        let target = target.trim().trim_end_matches('/');
        if target.is_empty() || target == "all" || target == "." {
            return Ok(Self::Full);
        }

        let parts: Vec<&str> = target.split('/').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::Scope(format!("empty path segment in '{}'", target)));
        }

        match parts.as_slice() {
            [feature] => Ok(Self::Feature {
                feature: feature.to_string(),
            }),
            [feature, rest] => match rest.split_once('.') {
                None => Ok(Self::Endpoint {
                    feature: feature.to_string(),
                    endpoint: rest.to_string(),
                }),
                Some((endpoint, _)) => {
                    if ArtifactKind::from_file_name(rest).is_none() {
                        return Err(Error::Scope(format!(
                            "'{}' is not a contract, logic, test or helper file",
                            rest
                        )));
                    }
                    Ok(Self::File {
                        feature: feature.to_string(),
                        endpoint: endpoint.to_string(),
                        file: rest.to_string(),
                    })
                }
            },
            _ => Err(Error::Scope(format!(
                "expected feature, feature/endpoint or feature/endpoint.kind.ext, got '{}'",
                target
            ))),
        }
    }
}

impl fmt::Display for ValidationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("all features"),
            Self::Feature { feature } => write!(f, "{}", feature),
            Self::Endpoint { feature, endpoint } => write!(f, "{}/{}", feature, endpoint),
            Self::File { feature, file, .. } => write!(f, "{}/{}", feature, file),
        }
    }
}

/// One feature and the endpoints of it that are in scope.
#[derive(Debug, Clone)]
pub struct FeatureScope {
    pub name: String,
    pub spec: FeatureSpec,
    pub endpoints: Vec<String>,
}

impl FeatureScope {
    fn whole(name: String, spec: FeatureSpec) -> Self {
        Self {
            endpoints: spec.endpoints.keys().cloned().collect(),
            name,
            spec,
        }
    }

    /// In-scope endpoints with their specification entries
    pub fn endpoint_specs(&self) -> impl Iterator<Item = (&str, &EndpointSpec)> {
        self.endpoints
            .iter()
            .filter_map(|name| self.spec.endpoints.get(name).map(|spec| (name.as_str(), spec)))
    }
}

/// A scope resolved once, up front, and shared by every stage.
#[derive(Debug, Clone)]
pub struct ResolvedScope {
    pub scope: ValidationScope,
    pub features: Vec<FeatureScope>,
}

impl ResolvedScope {
    pub fn endpoint_count(&self) -> usize {
        self.features.iter().map(|f| f.endpoints.len()).sum()
    }

    pub fn dimensions(&self) -> Vec<Dimension> {
        self.scope.dimensions()
    }
}
