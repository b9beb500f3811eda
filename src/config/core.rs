use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = ".fluxcheck.toml";

/// Tool configuration loaded from `.fluxcheck.toml`.
///
/// Scoring weights and reliability thresholds are not configured here: they
/// belong to each feature's specification document (`validation_targets`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluxcheckConfig {
    /// Directory holding one sub-directory per feature, relative to the project root
    #[serde(default = "default_features_dir")]
    pub features_dir: PathBuf,

    /// Where endpoint manifests and feature reports are written
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,

    /// Suffix appended to the feature name to locate its specification document
    #[serde(default = "default_spec_suffix")]
    pub spec_suffix: String,

    /// Ordered stage names run by `fluxcheck check`
    #[serde(default = "default_stages")]
    pub stages: Vec<String>,

    /// Validate independent endpoints on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default)]
    pub typecheck: TypeCheckConfig,

    #[serde(default)]
    pub duplication: DuplicationConfig,
}

impl Default for FluxcheckConfig {
    fn default() -> Self {
        Self {
            features_dir: default_features_dir(),
            manifest_dir: default_manifest_dir(),
            spec_suffix: default_spec_suffix(),
            stages: default_stages(),
            parallel: default_parallel(),
            typecheck: TypeCheckConfig::default(),
            duplication: DuplicationConfig::default(),
        }
    }
}

impl FluxcheckConfig {
    /// Validate every section, reporting the first problem found
    pub fn validate(&self) -> Result<(), String> {
        if self.spec_suffix.trim().is_empty() {
            return Err("spec_suffix must not be empty".to_string());
        }
        if self.stages.is_empty() {
            return Err("at least one stage must be configured".to_string());
        }
        self.typecheck.validate()?;
        self.duplication.validate()
    }
}

/// External type-checker invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeCheckConfig {
    /// Program followed by its arguments
    #[serde(default = "default_typecheck_command")]
    pub command: Vec<String>,

    #[serde(default = "default_typecheck_timeout")]
    pub timeout_secs: u64,
}

impl Default for TypeCheckConfig {
    fn default() -> Self {
        Self {
            command: default_typecheck_command(),
            timeout_secs: default_typecheck_timeout(),
        }
    }
}

impl TypeCheckConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_empty() {
            return Err("typecheck.command must name a program".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("typecheck.timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Cross-endpoint duplication heuristics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicationConfig {
    /// Lines at or below this length are never compared
    #[serde(default = "default_min_line_length")]
    pub min_line_length: usize,

    /// A pair sharing more than this many long lines is problematic
    #[serde(default = "default_repeat_threshold")]
    pub repeat_threshold: usize,

    /// Points removed from the independence score per problematic pair
    #[serde(default = "default_penalty")]
    pub penalty: u8,

    /// Regexes for shared lines that are expected across endpoints
    #[serde(default = "default_acceptable_patterns")]
    pub acceptable_patterns: Vec<String>,
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            min_line_length: default_min_line_length(),
            repeat_threshold: default_repeat_threshold(),
            penalty: default_penalty(),
            acceptable_patterns: default_acceptable_patterns(),
        }
    }
}

impl DuplicationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.penalty > 100 {
            return Err(format!(
                "duplication.penalty must be between 0 and 100, got {}",
                self.penalty
            ));
        }
        for pattern in &self.acceptable_patterns {
            Regex::new(pattern)
                .map_err(|e| format!("invalid acceptable pattern '{}': {}", pattern, e))?;
        }
        Ok(())
    }

    /// Compile the allowlist. Invalid entries are skipped; `validate` reports them.
    pub fn compiled_patterns(&self) -> Vec<Regex> {
        self.acceptable_patterns
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    }
}

fn default_features_dir() -> PathBuf {
    PathBuf::from("src/features")
}
fn default_manifest_dir() -> PathBuf {
    PathBuf::from(".fluxcheck/manifests")
}
fn default_spec_suffix() -> String {
    ".spec.json".to_string()
}
fn default_stages() -> Vec<String> {
    ["typecheck", "lint", "contract", "test", "compliance"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_parallel() -> bool {
    true
}
fn default_typecheck_command() -> Vec<String> {
    ["npx", "tsc", "--noEmit"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_typecheck_timeout() -> u64 {
    60
}
fn default_min_line_length() -> usize {
    50
}
fn default_repeat_threshold() -> usize {
    3
}
fn default_penalty() -> u8 {
    20
}

pub fn default_acceptable_patterns() -> Vec<String> {
    [
        r"^import\s",
        r"^(const|let)\s+\w+\s*=\s*\w+\.(get|init|create)\(",
        r"\blogger\.(info|warn|error|debug)\(",
        r"\bres\.(status\(\d+\)\.)?json\(",
        r"\berror\.\w+\(",
        r"^[\s)\]};,]+$",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
