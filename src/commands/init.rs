use anyhow::Result;
use std::path::Path;

use crate::config::{default_config_toml, CONFIG_FILE_NAME};
use crate::io::{FileSystem, RealFileSystem};

pub fn init_config(root: &Path, force: bool) -> Result<()> {
    let config_path = root.join(CONFIG_FILE_NAME);
    let fs = RealFileSystem::new();

    if fs.exists(&config_path) && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    fs.write(&config_path, &default_config_toml())?;
    println!("Created {} configuration file", CONFIG_FILE_NAME);

    Ok(())
}
