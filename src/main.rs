use anyhow::Result;
use clap::Parser;
use fluxcheck::cli::{Cli, Commands};
use fluxcheck::commands::check::{run_check, CheckConfig};
use fluxcheck::observability::init_tracing;
use fluxcheck::pipeline::StageRegistry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let passed = match cli.command {
        Commands::Check {
            target,
            root,
            stages,
            format,
            color,
            no_parallel,
            verbosity,
            json_logs,
        } => {
            init_tracing(verbosity, json_logs);
            run_check(CheckConfig {
                root,
                target,
                stages,
                format,
                color,
                no_parallel,
            })?
        }
        Commands::Manifest {
            target,
            root,
            verbosity,
        } => {
            init_tracing(verbosity, false);
            fluxcheck::commands::manifest::write_manifest(root, &target)?
        }
        Commands::Stages => {
            let registry = StageRegistry::standard();
            for name in registry.names() {
                if let Some(stage) = registry.get(name) {
                    println!("{:<12} {}", name, stage.description());
                }
            }
            true
        }
        Commands::Init { root, force } => {
            fluxcheck::commands::init::init_config(&root, force)?;
            true
        }
    };

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}
