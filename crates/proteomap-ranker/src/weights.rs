//! Multipliers for the opportunity and repurposing scores.

use serde::{Deserialize, Serialize};

use proteomap_common::{Maturity, WeightsConfig};

/// Gap-score multiplier per therapeutic maturity.
/// Less mature pairs leave more room for a new therapy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpportunityWeights {
    /// No therapy, or maturity not given.
    pub untreated: f64,
    pub in_trial: f64,
    pub approved: f64,
    /// Maturity label outside the closed set.
    pub unknown: f64,
}

impl Default for OpportunityWeights {
    fn default() -> Self {
        Self {
            untreated: 1.0,
            in_trial:  0.5,
            approved:  0.1,
            unknown:   0.8,
        }
    }
}

impl OpportunityWeights {
    pub fn for_maturity(&self, maturity: Maturity) -> f64 {
        match maturity {
            Maturity::None     => self.untreated,
            Maturity::Trial    => self.in_trial,
            Maturity::Approved => self.approved,
        }
    }

    /// Multiplier for a raw maturity label, which may be missing or unknown.
    pub fn for_label(&self, label: Option<&str>) -> f64 {
        match label.map(str::trim).filter(|l| !l.is_empty()) {
            None => self.untreated,
            Some(l) => Maturity::parse(l).map_or(self.unknown, |m| self.for_maturity(m)),
        }
    }

    /// Monotonic: untreated ≥ unknown ≥ in_trial ≥ approved ≥ 0.
    pub fn validate(&self) -> bool {
        self.untreated >= self.unknown
            && self.unknown >= self.in_trial
            && self.in_trial >= self.approved
            && self.approved >= 0.0
    }
}

impl From<&WeightsConfig> for OpportunityWeights {
    fn from(w: &WeightsConfig) -> Self {
        Self {
            untreated: w.untreated,
            in_trial: w.in_trial,
            approved: w.approved,
            unknown: w.unknown,
        }
    }
}

/// Repurposing constants. Scores can exceed 1.0; they are a ranking
/// signal, not a probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepurposingWeights {
    /// Applied when the new indication has no therapy at all.
    pub untreated_bonus: f64,
    /// Flat factor for repurposing being lower-risk than a novel target.
    pub risk_factor: f64,
}

impl Default for RepurposingWeights {
    fn default() -> Self {
        Self { untreated_bonus: 1.5, risk_factor: 1.2 }
    }
}

impl From<&WeightsConfig> for RepurposingWeights {
    fn from(w: &WeightsConfig) -> Self {
        Self { untreated_bonus: w.repurposing_bonus, risk_factor: w.risk_factor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_defaults() {
        let config = WeightsConfig::default();
        assert_eq!(OpportunityWeights::from(&config), OpportunityWeights::default());
        assert_eq!(RepurposingWeights::from(&config), RepurposingWeights::default());
    }

    #[test]
    fn test_label_multipliers() {
        let w = OpportunityWeights::default();
        assert_eq!(w.for_label(None), 1.0);
        assert_eq!(w.for_label(Some("")), 1.0);
        assert_eq!(w.for_label(Some("none")), 1.0);
        assert_eq!(w.for_label(Some("trial")), 0.5);
        assert_eq!(w.for_label(Some("approved")), 0.1);
        assert_eq!(w.for_label(Some("phase 2")), 0.8);
    }

    #[test]
    fn test_default_weights_monotonic() {
        assert!(OpportunityWeights::default().validate());
        let broken = OpportunityWeights { approved: 0.9, ..Default::default() };
        assert!(!broken.validate());
    }
}
