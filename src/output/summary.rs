//! Human-readable run summary.
//!
//! Every run ends with a per-stage table. Failed runs add the failing
//! subjects and one actionable next step.

use colored::*;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

use super::formatting::{format_duration, paint_stage, paint_status};
use crate::errors::Result;
use crate::pipeline::{PipelineReport, StageStatus};
use crate::scoring::Dimension;

const MAX_DETAILS: usize = 10;

pub fn render_terminal(report: &PipelineReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n\n",
        "fluxcheck".bold(),
        report.scope.to_string().cyan()
    ));

    out.push_str(&stage_table(report).to_string());
    out.push('\n');

    if !report.endpoints.is_empty() {
        out.push('\n');
        out.push_str(&endpoint_table(report).to_string());
        out.push('\n');
    }

    out.push('\n');
    match report.failed_stage() {
        None => out.push_str(&format!(
            "{} {} stage(s) passed in {}\n",
            "✓".green(),
            report
                .stages
                .iter()
                .filter(|s| s.status == StageStatus::Passed)
                .count(),
            format_duration(report.total)
        )),
        Some(failed) => {
            out.push_str(&format!(
                "{} stage '{}' failed after {}: {}\n",
                "✗".red(),
                failed.name,
                format_duration(report.total),
                failed.summary
            ));
            for detail in failed.details.iter().take(MAX_DETAILS) {
                out.push_str(&format!("  - {}\n", detail));
            }
            if failed.details.len() > MAX_DETAILS {
                out.push_str(&format!(
                    "  ... and {} more\n",
                    failed.details.len() - MAX_DETAILS
                ));
            }
            if !report.not_run.is_empty() {
                out.push_str(&format!("  not run: {}\n", report.not_run.join(", ")));
            }
            if let Some(step) = next_step(report) {
                out.push_str(&format!("\n{} {}\n", "Next:".bold(), step));
            }
        }
    }
    out
}

fn stage_table(report: &PipelineReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Stage", "Result", "Duration", "Summary"]);
    for stage in &report.stages {
        table.add_row(vec![
            stage.name.clone(),
            paint_stage(stage.status).to_string(),
            format_duration(stage.duration),
            stage.summary.clone(),
        ]);
    }
    for name in &report.not_run {
        table.add_row(vec![
            name.clone(),
            "not run".dimmed().to_string(),
            String::new(),
            String::new(),
        ]);
    }
    table
}

fn endpoint_table(report: &PipelineReport) -> Table {
    let mut header = vec!["Endpoint".to_string()];
    header.extend(Dimension::ALL.iter().map(|d| d.label().to_string()));
    header.extend(["Score".to_string(), "Ready".to_string()]);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for record in &report.endpoints {
        let mut row = vec![record.key()];
        row.extend(Dimension::ALL.iter().map(|d| match record.dimension(*d) {
            Some(score) => format!("{} {}", paint_status(score.status), score.score),
            None => "-".to_string(),
        }));
        row.push(format!("{}%", record.reliability_score));
        row.push(if record.overall_reliable {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        });
        table.add_row(row);
    }
    table
}

/// Rerun hint: the failed stage and the narrowest target that still fails
pub fn next_step(report: &PipelineReport) -> Option<String> {
    let failed = report.failed_stage()?;
    if failed.status == StageStatus::Crashed {
        return Some(format!(
            "inspect the '{}' stage error, then rerun `fluxcheck check {} --stages {} -v`",
            failed.name,
            report.scope.target(),
            failed.name
        ));
    }

    let narrower = failed
        .details
        .iter()
        .filter_map(|d| d.split_once(": ").map(|(subject, _)| subject))
        .find(|subject| subject.contains('/'))
        .filter(|_| report.scope.endpoint().is_none())
        .map(str::to_string)
        .unwrap_or_else(|| report.scope.target());

    let mut stages = vec![failed.name.clone()];
    stages.extend(report.not_run.iter().cloned());
    Some(format!(
        "fix the issues above, then rerun `fluxcheck check {} --stages {}`",
        narrower,
        stages.join(",")
    ))
}

pub fn render_json(report: &PipelineReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ValidationEnv;
    use crate::pipeline::PipelineRunner;
    use crate::testkit::{fixtures, TestEnv};

    fn failing_report() -> PipelineReport {
        let env = TestEnv::new()
            .with_files(fixtures::users_feature_files())
            .with_file("src/features/users/list/list.test.ts", "");
        let stages: Vec<String> = ["contract", "test", "compliance"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        PipelineRunner::new(&env)
            .run(&"users".parse().unwrap(), &stages)
            .unwrap()
    }

    #[test]
    fn test_next_step_narrows_to_failing_endpoint() {
        let report = failing_report();
        assert_eq!(
            next_step(&report).unwrap(),
            "fix the issues above, then rerun `fluxcheck check users/list --stages test,compliance`"
        );
    }

    #[test]
    fn test_terminal_summary_lists_failure() {
        colored::control::set_override(false);
        let text = render_terminal(&failing_report());
        assert!(text.contains("stage 'test' failed"));
        assert!(text.contains("users/list: test not implemented: lists users"));
        assert!(text.contains("not run: compliance"));
    }

    #[test]
    fn test_successful_run_has_no_next_step() {
        let env = TestEnv::new().with_files(fixtures::users_feature_files());
        let report = PipelineRunner::new(&env)
            .run(&"users/get".parse().unwrap(), &env.config().stages)
            .unwrap();
        assert!(next_step(&report).is_none());

        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(json["scope"]["kind"], "endpoint");
        assert_eq!(json["endpoints"][0]["feature"], "users");
        assert_eq!(json["stages"].as_array().unwrap().len(), 5);
    }
}
