use colored::*;
use std::env;
use std::io::IsTerminal;
use std::time::Duration;

use crate::pipeline::StageStatus;
use crate::scoring::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Honors `NO_COLOR`, `CLICOLOR` and `CLICOLOR_FORCE` before terminal detection
    pub fn from_env() -> Self {
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v == "1") {
            return Self::Always;
        }
        if env::var("NO_COLOR").is_ok() || env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return Self::Never;
        }
        Self::Auto
    }

    pub fn should_use_color(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => detect_color_support(),
        }
    }

    /// Apply the mode to the `colored` crate's global switch
    pub fn apply(&self) {
        colored::control::set_override(self.should_use_color());
    }
}

fn detect_color_support() -> bool {
    if env::var("TERM").is_ok_and(|t| t == "dumb") {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn paint_status(status: Status) -> ColoredString {
    let text = status.to_string();
    match status {
        Status::Pass => text.green(),
        Status::Warn => text.yellow(),
        Status::Fail => text.red().bold(),
    }
}

pub fn paint_stage(status: StageStatus) -> ColoredString {
    match status {
        StageStatus::Passed => "passed".green(),
        StageStatus::Failed => "FAILED".red().bold(),
        StageStatus::Crashed => "CRASHED".red().bold(),
        StageStatus::Skipped => "skipped".dimmed(),
    }
}

/// `850ms`, `1.25s`, `2m 03s`
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        let secs = d.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
