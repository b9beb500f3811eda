use anyhow::Result;
use std::path::PathBuf;

use crate::config::load_config;
use crate::env::RealEnv;
use crate::pipeline::{PipelineRunner, ValidationScope};

/// Validate one endpoint with the compliance stage only and print the manifest path.
pub fn write_manifest(root: PathBuf, target: &str) -> Result<bool> {
    let scope: ValidationScope = target.parse()?;
    if !matches!(scope, ValidationScope::Endpoint { .. }) {
        anyhow::bail!("manifest expects feature/endpoint, got '{}'", target);
    }

    let env = RealEnv::new(&root, load_config(&root));
    let report = PipelineRunner::new(&env).run(&scope, &["compliance".to_string()])?;

    for path in &report.written {
        println!("{}", path.display());
    }
    if let Err(e) = report.ensure_success() {
        eprintln!("{}", e);
        return Ok(false);
    }
    Ok(true)
}
