use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::load_config;
use crate::env::{RealEnv, ValidationEnv};
use crate::output::{render_json, render_terminal, ColorMode, OutputFormat};
use crate::pipeline::{PipelineRunner, ValidationScope};

pub struct CheckConfig {
    pub root: PathBuf,
    pub target: String,
    pub stages: Option<Vec<String>>,
    pub format: OutputFormat,
    pub color: Option<ColorMode>,
    pub no_parallel: bool,
}

/// Run the pipeline and print the summary. Returns whether every stage passed.
pub fn run_check(config: CheckConfig) -> Result<bool> {
    let scope: ValidationScope = config.target.parse()?;
    let mut tool_config = load_config(&config.root);
    if config.no_parallel {
        tool_config.parallel = false;
    }

    let env = RealEnv::new(&config.root, tool_config);
    let stages = config
        .stages
        .unwrap_or_else(|| env.config().stages.clone());

    let report = PipelineRunner::new(&env)
        .run(&scope, &stages)
        .with_context(|| format!("Failed to validate {}", scope))?;

    match config.format {
        OutputFormat::Terminal => {
            config.color.unwrap_or_else(ColorMode::from_env).apply();
            print!("{}", render_terminal(&report));
        }
        OutputFormat::Json => println!("{}", render_json(&report)?),
    }

    Ok(report.success())
}
