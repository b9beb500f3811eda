pub mod formatting;
pub mod summary;

pub use formatting::{format_duration, ColorMode};
pub use summary::{next_step, render_json, render_terminal};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}
