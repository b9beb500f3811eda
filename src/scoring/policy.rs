use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::dimension::{Dimension, DimensionScore, Status};
use crate::spec::ValidationTargets;

/// Per-dimension bar in strict mode, and the default configurable minimum
pub const DEFAULT_MINIMUM: u8 = 90;

/// Relative weight of each dimension in the reliability score.
///
/// Weights need not sum to 100; the mean is normalized by the total weight
/// of the dimensions actually scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_contract_weight")]
    pub contract_compliance: f64,

    #[serde(default = "default_test_weight")]
    pub test_validation: f64,

    #[serde(default = "default_types_weight")]
    pub types_validation: f64,

    #[serde(default = "default_lint_weight")]
    pub lint_validation: f64,

    #[serde(default = "default_quality_weight")]
    pub code_quality: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            contract_compliance: default_contract_weight(),
            test_validation: default_test_weight(),
            types_validation: default_types_weight(),
            lint_validation: default_lint_weight(),
            code_quality: default_quality_weight(),
        }
    }
}

impl ScoringWeights {
    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::ContractCompliance => self.contract_compliance,
            Dimension::TestValidation => self.test_validation,
            Dimension::TypesValidation => self.types_validation,
            Dimension::LintValidation => self.lint_validation,
            Dimension::CodeQuality => self.code_quality,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for dimension in Dimension::ALL {
            let weight = self.weight(dimension);
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("{} weight must be a non-negative number", dimension));
            }
        }
        if Dimension::ALL.iter().map(|d| self.weight(*d)).sum::<f64>() <= 0.0 {
            return Err("scoring weights must not all be zero".to_string());
        }
        Ok(())
    }

    /// Weighted mean of the given dimension scores, rounded to the nearest integer
    pub fn weighted_mean<'a, I>(&self, scores: I) -> u8
    where
        I: IntoIterator<Item = (Dimension, &'a DimensionScore)>,
    {
        let (total, weight) = scores
            .into_iter()
            .fold((0.0, 0.0), |(total, weight), (dimension, score)| {
                let w = self.weight(dimension);
                (total + w * f64::from(score.score), weight + w)
            });
        if weight <= 0.0 {
            return 0;
        }
        (total / weight).round().clamp(0.0, 100.0) as u8
    }
}

fn default_contract_weight() -> f64 {
    25.0
}
fn default_test_weight() -> f64 {
    25.0
}
fn default_types_weight() -> f64 {
    20.0
}
fn default_lint_weight() -> f64 {
    15.0
}
fn default_quality_weight() -> f64 {
    15.0
}

/// How dimension scores turn into a deployability verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringPolicy {
    /// Weighted mean compared against a minimum, both from the specification
    Configurable { weights: ScoringWeights, minimum: u8 },
    /// Every dimension must reach 90 on its own
    StrictAllPass,
}

impl ScoringPolicy {
    /// Configurable when the feature supplies weights or thresholds, strict otherwise
    pub fn from_targets(targets: &ValidationTargets) -> Self {
        if targets.scoring_weights.is_none() && targets.reliability_thresholds.is_none() {
            return Self::StrictAllPass;
        }

        let weights = match &targets.scoring_weights {
            Some(weights) => match weights.validate() {
                Ok(()) => weights.clone(),
                Err(e) => {
                    tracing::warn!("Invalid scoring weights: {}. Using defaults.", e);
                    ScoringWeights::default()
                }
            },
            None => ScoringWeights::default(),
        };
        let minimum = targets
            .reliability_thresholds
            .as_ref()
            .and_then(|t| t.overall_reliability_minimum)
            .map(|m| m.min(100) as u8)
            .unwrap_or(DEFAULT_MINIMUM);

        Self::Configurable { weights, minimum }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Configurable { .. } => "configurable",
            Self::StrictAllPass => "strict_all_pass",
        }
    }

    fn weights(&self) -> ScoringWeights {
        match self {
            Self::Configurable { weights, .. } => weights.clone(),
            Self::StrictAllPass => ScoringWeights::default(),
        }
    }

    /// Score a WARN dimension must reach to keep its issues out of the blocking list
    pub fn dimension_bar(&self) -> u8 {
        match self {
            Self::Configurable { minimum, .. } => *minimum,
            Self::StrictAllPass => DEFAULT_MINIMUM,
        }
    }

    pub fn reliability_score(&self, dimensions: &BTreeMap<Dimension, DimensionScore>) -> u8 {
        self.weights()
            .weighted_mean(dimensions.iter().map(|(d, s)| (*d, s)))
    }

    pub fn is_reliable(
        &self,
        reliability_score: u8,
        dimensions: &BTreeMap<Dimension, DimensionScore>,
    ) -> bool {
        if dimensions.is_empty() {
            return false;
        }
        match self {
            Self::Configurable { minimum, .. } => reliability_score >= *minimum,
            Self::StrictAllPass => dimensions
                .values()
                .all(|s| !s.is_fail() && s.score >= DEFAULT_MINIMUM),
        }
    }

    /// Issues of failed dimensions plus those of warning dimensions under the bar
    pub fn blocking_issues(&self, dimensions: &BTreeMap<Dimension, DimensionScore>) -> Vec<String> {
        let bar = self.dimension_bar();
        dimensions
            .iter()
            .filter(|(_, s)| match s.status {
                Status::Fail => true,
                Status::Warn => s.score < bar,
                Status::Pass => false,
            })
            .flat_map(|(dimension, s)| {
                s.issues
                    .iter()
                    .map(move |issue| format!("{}: {}", dimension.label(), issue))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::SoftViolation;
    use crate::spec::ReliabilityThresholds;
    use proptest::prelude::*;

    fn scored(values: [u8; 5]) -> BTreeMap<Dimension, DimensionScore> {
        Dimension::ALL
            .iter()
            .zip(values)
            .map(|(d, score)| {
                (
                    *d,
                    DimensionScore {
                        score,
                        ..DimensionScore::pass()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_weighted_mean_with_default_weights() {
        let dims = scored([80, 100, 90, 70, 100]);
        let weights = ScoringWeights::default();
        assert_eq!(weights.weighted_mean(dims.iter().map(|(d, s)| (*d, s))), 89);
    }

    #[test]
    fn test_policy_selection() {
        assert_eq!(
            ScoringPolicy::from_targets(&ValidationTargets::default()),
            ScoringPolicy::StrictAllPass
        );

        let targets = ValidationTargets {
            reliability_thresholds: Some(ReliabilityThresholds {
                overall_reliability_minimum: Some(85),
            }),
            ..Default::default()
        };
        let policy = ScoringPolicy::from_targets(&targets);
        assert_eq!(policy.mode_name(), "configurable");
        assert_eq!(policy.dimension_bar(), 85);
    }

    #[test]
    fn test_strict_requires_every_dimension() {
        let dims = scored([100, 100, 100, 100, 85]);
        let strict = ScoringPolicy::StrictAllPass;
        let score = strict.reliability_score(&dims);
        assert_eq!(score, 98);
        assert!(!strict.is_reliable(score, &dims));

        let configurable = ScoringPolicy::Configurable {
            weights: ScoringWeights::default(),
            minimum: 90,
        };
        assert!(configurable.is_reliable(score, &dims));
    }

    #[test]
    fn test_blocking_issues_respect_bar() {
        let mut dims = scored([100, 100, 100, 100, 100]);
        if let Some(lint) = dims.get_mut(&Dimension::LintValidation) {
            lint.soft(SoftViolation::Minor, "line too long");
        }
        if let Some(quality) = dims.get_mut(&Dimension::CodeQuality) {
            quality.soft(SoftViolation::Notable, "no logger");
        }

        let blocking = ScoringPolicy::StrictAllPass.blocking_issues(&dims);
        assert_eq!(blocking, vec!["quality: no logger".to_string()]);
    }

    #[test]
    fn test_empty_dimensions_are_never_reliable() {
        let policy = ScoringPolicy::StrictAllPass;
        assert!(!policy.is_reliable(0, &BTreeMap::new()));
        assert_eq!(policy.reliability_score(&BTreeMap::new()), 0);
    }

    proptest! {
        #[test]
        fn prop_reliability_score_is_bounded(
            values in prop::array::uniform5(0u8..=100),
            weights in prop::array::uniform5(0.0f64..50.0),
        ) {
            let dims = scored(values);
            let weights = ScoringWeights {
                contract_compliance: weights[0],
                test_validation: weights[1],
                types_validation: weights[2],
                lint_validation: weights[3],
                code_quality: weights[4],
            };
            let total: f64 = Dimension::ALL.iter().map(|d| weights.weight(*d)).sum();
            let policy = ScoringPolicy::Configurable { weights, minimum: 90 };
            let score = policy.reliability_score(&dims);
            prop_assert!(score <= 100);
            if total > 0.0 {
                let lowest = values.iter().copied().min().unwrap_or(0);
                let highest = values.iter().copied().max().unwrap_or(100);
                prop_assert!(score >= lowest && score <= highest);
            }
        }
    }
}
