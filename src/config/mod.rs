// Core configuration types
mod core;
mod loader;

pub use self::core::{
    default_acceptable_patterns, DuplicationConfig, FluxcheckConfig, TypeCheckConfig,
    CONFIG_FILE_NAME,
};
pub use loader::{
    default_config_toml, directory_ancestors, load_config, parse_and_validate_config,
};
