use std::path::{Path, PathBuf};

use super::core::{FluxcheckConfig, CONFIG_FILE_NAME};

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate config from a TOML string.
///
/// Invalid sections fall back to their defaults with a warning instead of
/// rejecting the whole file.
pub fn parse_and_validate_config(contents: &str) -> Result<FluxcheckConfig, String> {
    let mut config = toml::from_str::<FluxcheckConfig>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))?;

    if let Err(e) = config.typecheck.validate() {
        tracing::warn!("Invalid typecheck settings: {}. Using defaults.", e);
        config.typecheck = Default::default();
    }
    if let Err(e) = config.duplication.validate() {
        tracing::warn!("Invalid duplication settings: {}. Using defaults.", e);
        config.duplication = Default::default();
    }
    if config.stages.is_empty() {
        tracing::warn!("No stages configured. Using the default stage list.");
        config.stages = FluxcheckConfig::default().stages;
    }

    config.validate()?;
    Ok(config)
}

/// Config at exactly `config_path`, if it exists and parses
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<FluxcheckConfig> {
    let contents = match std::fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", config_path.display(), e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            tracing::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Find the nearest `.fluxcheck.toml` at or above `start`.
pub fn load_config(start: &Path) -> FluxcheckConfig {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            tracing::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            FluxcheckConfig::default()
        })
}

/// Contents written by `fluxcheck init`
pub fn default_config_toml() -> String {
    let body = toml::to_string_pretty(&FluxcheckConfig::default()).unwrap_or_default();
    format!("# fluxcheck configuration\n\n{}", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_and_validate_config(indoc! {r#"
            features_dir = "app/features"

            [duplication]
            repeat_threshold = 5
        "#})
        .unwrap();

        assert_eq!(config.features_dir, PathBuf::from("app/features"));
        assert_eq!(config.duplication.repeat_threshold, 5);
        assert_eq!(config.duplication.penalty, 20);
        assert_eq!(config.typecheck.timeout_secs, 60);
    }

    #[test]
    fn test_invalid_section_falls_back() {
        let config = parse_and_validate_config(indoc! {r#"
            [typecheck]
            command = []
        "#})
        .unwrap();
        assert_eq!(config.typecheck.command, vec!["npx", "tsc", "--noEmit"]);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(parse_and_validate_config("stages = [").is_err());
    }

    #[test]
    fn test_load_config_walks_up() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "spec_suffix = \".specification.json\"\n",
        )
        .unwrap();
        let nested = dir.path().join("src/features/users");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config(&nested);
        assert_eq!(config.spec_suffix, ".specification.json");
    }

    #[test]
    fn test_default_toml_round_trips() {
        let text = default_config_toml();
        assert_eq!(
            parse_and_validate_config(&text).unwrap(),
            FluxcheckConfig::default()
        );
    }

    #[test]
    fn test_directory_ancestors_respects_depth() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }
}
