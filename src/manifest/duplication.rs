//! Cross-endpoint duplication analysis.
//!
//! Endpoints of one feature are expected to be independent. Long lines that
//! appear in two logic files are collected per pair; lines matching the
//! acceptable-pattern allowlist (imports, logger calls, response helpers)
//! never count against the pair.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::DuplicationConfig;

/// Lines two endpoints have in common.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SharedCode {
    /// Shared lines are framework boilerplate or few enough to tolerate
    Acceptable {
        endpoints: [String; 2],
        lines: Vec<String>,
    },
    /// More unexplained shared lines than the repeat threshold allows
    Problematic {
        endpoints: [String; 2],
        lines: Vec<String>,
    },
}

impl SharedCode {
    pub fn endpoints(&self) -> &[String; 2] {
        match self {
            Self::Acceptable { endpoints, .. } | Self::Problematic { endpoints, .. } => endpoints,
        }
    }

    pub fn is_problematic(&self) -> bool {
        matches!(self, Self::Problematic { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationAnalysis {
    pub independence_score: u8,
    pub problematic_pairs: usize,
    pub shared_code: Vec<SharedCode>,
}

impl Default for DuplicationAnalysis {
    fn default() -> Self {
        Self {
            independence_score: 100,
            problematic_pairs: 0,
            shared_code: Vec::new(),
        }
    }
}

/// Trimmed lines longer than the configured minimum
fn long_lines(text: &str, min_len: usize) -> BTreeSet<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| l.chars().count() > min_len)
        .collect()
}

fn is_acceptable(line: &str, allowlist: &[Regex]) -> bool {
    allowlist.iter().any(|re| re.is_match(line))
}

/// Compare every pair of endpoint logic texts.
///
/// `sources` holds `(endpoint, logic text)`; pairs are visited in input order.
pub fn analyze_duplication(sources: &[(String, String)], config: &DuplicationConfig) -> DuplicationAnalysis {
    let allowlist = config.compiled_patterns();
    let lines: Vec<BTreeSet<&str>> = sources
        .iter()
        .map(|(_, text)| long_lines(text, config.min_line_length))
        .collect();

    let mut analysis = DuplicationAnalysis::default();
    for i in 0..sources.len() {
        for j in (i + 1)..sources.len() {
            let shared: Vec<&str> = lines[i].intersection(&lines[j]).copied().collect();
            if shared.is_empty() {
                continue;
            }
            let endpoints = [sources[i].0.clone(), sources[j].0.clone()];
            let unexplained: Vec<String> = shared
                .iter()
                .filter(|l| !is_acceptable(l, &allowlist))
                .map(|l| l.to_string())
                .collect();

            let finding = if unexplained.len() > config.repeat_threshold {
                SharedCode::Problematic {
                    endpoints,
                    lines: unexplained,
                }
            } else {
                SharedCode::Acceptable {
                    endpoints,
                    lines: shared.iter().map(|l| l.to_string()).collect(),
                }
            };
            analysis.shared_code.push(finding);
        }
    }

    analysis.problematic_pairs = analysis
        .shared_code
        .iter()
        .filter(|s| s.is_problematic())
        .count();
    let penalty = analysis.problematic_pairs.saturating_mul(usize::from(config.penalty));
    analysis.independence_score = 100usize.saturating_sub(penalty) as u8;
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::fixtures;

    fn copied_block(n: usize) -> String {
        (0..n)
            .map(|i| format!("const computedValue{} = someService.compute(input, options, {});", i, i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_fixture_endpoints_are_independent() {
        let sources = vec![
            ("get".to_string(), fixtures::LOGIC.to_string()),
            ("list".to_string(), fixtures::LIST_LOGIC.to_string()),
        ];
        let analysis = analyze_duplication(&sources, &DuplicationConfig::default());
        assert_eq!(analysis.independence_score, 100);
        assert_eq!(analysis.problematic_pairs, 0);
        assert!(analysis.shared_code.iter().all(|s| !s.is_problematic()));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let config = DuplicationConfig::default();
        let at_threshold = vec![
            ("a".to_string(), copied_block(3)),
            ("b".to_string(), copied_block(3)),
        ];
        assert_eq!(analyze_duplication(&at_threshold, &config).problematic_pairs, 0);

        let over = vec![
            ("a".to_string(), copied_block(4)),
            ("b".to_string(), copied_block(4)),
        ];
        let analysis = analyze_duplication(&over, &config);
        assert_eq!(analysis.problematic_pairs, 1);
        assert_eq!(analysis.independence_score, 80);
        assert_eq!(analysis.shared_code[0].endpoints(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_independence_floors_at_zero() {
        let block = copied_block(5);
        let sources: Vec<(String, String)> =
            (0..5).map(|i| (format!("e{}", i), block.clone())).collect();
        let analysis = analyze_duplication(&sources, &DuplicationConfig::default());
        assert_eq!(analysis.problematic_pairs, 10);
        assert_eq!(analysis.independence_score, 0);
    }

    #[test]
    fn test_allowlisted_lines_do_not_count() {
        let text = (0..6)
            .map(|i| format!("logger.info('step {} finished for the current request', {{ requestId }});", i))
            .collect::<Vec<_>>()
            .join("\n");
        let sources = vec![("a".to_string(), text.clone()), ("b".to_string(), text)];
        let analysis = analyze_duplication(&sources, &DuplicationConfig::default());
        assert_eq!(analysis.problematic_pairs, 0);
        assert!(matches!(&analysis.shared_code[0], SharedCode::Acceptable { lines, .. } if lines.len() == 6));
    }
}
