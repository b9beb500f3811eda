use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::{ColorMode, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "fluxcheck")]
#[command(about = "Cross-artifact consistency gate for generated endpoints", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the validation pipeline over a feature, endpoint or file
    Check {
        /// `all`, `feature`, `feature/endpoint` or `feature/endpoint.kind.ext`
        #[arg(default_value = "all")]
        target: String,

        /// Project root containing the features directory
        #[arg(long, default_value = ".", env = "FLUXCHECK_ROOT")]
        root: PathBuf,

        /// Stages to run, in order (defaults to the configured list)
        #[arg(long, value_delimiter = ',')]
        stages: Option<Vec<String>>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Color output (defaults to NO_COLOR/CLICOLOR detection)
        #[arg(long, value_enum)]
        color: Option<ColorMode>,

        /// Validate endpoints one at a time
        #[arg(long = "no-parallel")]
        no_parallel: bool,

        /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,

        /// Emit logs as JSON lines on stderr
        #[arg(long = "json-logs")]
        json_logs: bool,
    },

    /// Validate one endpoint and write its manifest
    Manifest {
        /// `feature/endpoint`
        target: String,

        #[arg(long, default_value = ".", env = "FLUXCHECK_ROOT")]
        root: PathBuf,

        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// List the available pipeline stages
    Stages,

    /// Initialize configuration file
    Init {
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults() {
        let cli = Cli::try_parse_from(["fluxcheck", "check"]).unwrap();
        match cli.command {
            Commands::Check {
                target,
                stages,
                format,
                color,
                no_parallel,
                verbosity,
                ..
            } => {
                assert_eq!(target, "all");
                assert!(stages.is_none());
                assert!(color.is_none());
                assert_eq!(format, OutputFormat::Terminal);
                assert!(!no_parallel);
                assert_eq!(verbosity, 0);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_check_with_stage_list() {
        let cli = Cli::try_parse_from([
            "fluxcheck",
            "check",
            "users/get",
            "--stages",
            "lint,contract",
            "--format",
            "json",
            "--color",
            "never",
            "-vv",
        ])
        .unwrap();
        match cli.command {
            Commands::Check {
                target,
                stages,
                format,
                color,
                verbosity,
                ..
            } => {
                assert_eq!(color, Some(ColorMode::Never));
                assert_eq!(target, "users/get");
                assert_eq!(stages.unwrap(), vec!["lint", "contract"]);
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(verbosity, 2);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_init_force() {
        let cli = Cli::try_parse_from(["fluxcheck", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Init { force, .. } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }
}
