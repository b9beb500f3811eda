use once_cell::sync::Lazy;
use regex::Regex;

use super::EndpointView;
use crate::errors::Result;
use crate::extract::block::strip_comments;
use crate::scoring::{completion_ratio, DimensionScore, SoftViolation};

const MAX_LINE_LENGTH: usize = 120;

static DEBUGGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*debugger\s*;?\s*$").unwrap());
static CONSOLE_LOG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bconsole\.log\s*\(").unwrap());
static VAR_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bvar\s+[A-Za-z_$]").unwrap());

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LintCounts {
    debugger: usize,
    console_log: usize,
    var_decls: usize,
    long_lines: usize,
}

fn lint_text(text: &str) -> LintCounts {
    let code = strip_comments(text);
    LintCounts {
        debugger: DEBUGGER.find_iter(&code).count(),
        console_log: CONSOLE_LOG.find_iter(&code).count(),
        var_decls: VAR_DECL.find_iter(&code).count(),
        long_lines: text
            .lines()
            .filter(|l| l.chars().count() > MAX_LINE_LENGTH)
            .count(),
    }
}

/// Style heuristics over the contract and logic files.
pub fn check_lint(view: &EndpointView<'_>) -> Result<DimensionScore> {
    let files = [
        ("contract", view.sources.contract.as_str()),
        ("logic", view.sources.logic.as_str()),
    ];
    let mut score = DimensionScore::pass();
    let mut total = LintCounts::default();
    let mut clean_files = 0;
    let mut dirty = Vec::new();

    for (name, text) in files {
        let counts = lint_text(text);
        if counts.debugger == 0 {
            clean_files += 1;
        } else {
            dirty.push(name);
        }
        total.debugger += counts.debugger;
        total.console_log += counts.console_log;
        total.var_decls += counts.var_decls;
        total.long_lines += counts.long_lines;
    }

    score.metric("files_checked", files.len());
    score.metric("clean_files", format!("{}/{}", clean_files, files.len()));

    if !dirty.is_empty() {
        score.fail_with(
            completion_ratio(clean_files, files.len()),
            format!("debugger statement in {} file", dirty.join(", ")),
        );
    }
    if total.console_log > 0 {
        score.soft(
            SoftViolation::Notable,
            format!("{} console.log call(s); use the structured logger", total.console_log),
        );
    }
    if total.var_decls > 0 {
        score.soft(
            SoftViolation::Moderate,
            format!("{} `var` declaration(s)", total.var_decls),
        );
    }
    if total.long_lines > 0 {
        score.soft(
            SoftViolation::Minor,
            format!(
                "{} line(s) longer than {} characters",
                total.long_lines, MAX_LINE_LENGTH
            ),
        );
    }

    Ok(score)
}
