use serde::Serialize;

/// Severity tiers for advisory violations.
///
/// Each tier clamps the dimension score to a fixed ceiling; more severe
/// violations get lower ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SoftViolation {
    Minor,
    Moderate,
    Notable,
    Significant,
    Serious,
    Severe,
}

impl SoftViolation {
    pub fn ceiling(&self) -> u8 {
        match self {
            Self::Minor => 90,
            Self::Moderate => 85,
            Self::Notable => 80,
            Self::Significant => 75,
            Self::Serious => 70,
            Self::Severe => 60,
        }
    }

    /// Tier for a pattern-compliance ratio below 100
    pub fn for_compliance_ratio(ratio: u8) -> Self {
        match ratio {
            80.. => Self::Minor,
            60..=79 => Self::Notable,
            _ => Self::Severe,
        }
    }
}

/// `round(matched / expected * 100)`, with an empty expectation counting as
/// fully satisfied.
pub fn completion_ratio(matched: usize, expected: usize) -> u8 {
    if expected == 0 {
        return 100;
    }
    let ratio = (matched.min(expected) as f64 / expected as f64) * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}
