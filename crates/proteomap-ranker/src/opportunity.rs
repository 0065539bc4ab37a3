//! Therapeutic opportunity (gap) scoring.
//!
//! gap_score = s × b × m
//!   s = clamp01(strength, fallback 0.3)
//!   b = clamp01(burden, fallback 0.5)
//!   m = maturity multiplier (see [`OpportunityWeights`])
//!
//! Purely multiplicative: any zero factor zeroes the score.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use proteomap_common::{Association, Disease, Maturity, Protein};
use proteomap_ingestion::normalise::clamp01;

use crate::weights::OpportunityWeights;

pub const STRENGTH_FALLBACK: f64 = 0.3;
pub const BURDEN_FALLBACK: f64 = 0.5;

const HIGH: f64 = 0.7;
const MODERATE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub disease_id: String,
    pub protein_id: String,
    pub gap_score: f64,
    pub rationale: String,
    pub disease_name: String,
    pub protein_name: String,
    pub maturity: Maturity,
}

/// Gap score with the default multipliers.
pub fn gap_score(strength: Option<f64>, burden: Option<f64>, maturity: Option<&str>) -> f64 {
    gap_score_with(&OpportunityWeights::default(), strength, burden, maturity)
}

pub fn gap_score_with(
    weights: &OpportunityWeights,
    strength: Option<f64>,
    burden: Option<f64>,
    maturity: Option<&str>,
) -> f64 {
    let s = clamp01(strength, STRENGTH_FALLBACK);
    let b = clamp01(burden, BURDEN_FALLBACK);
    s * b * weights.for_label(maturity)
}

fn percent(x: f64) -> String {
    format!("{:.0}%", x * 100.0)
}

/// Deterministic explanation of a gap score.
pub fn generate_rationale(
    protein: &str,
    disease: &str,
    strength: f64,
    burden: f64,
    maturity: Maturity,
    score: f64,
) -> String {
    let mut out = format!("Therapeutic opportunity for {protein} in {disease}. ");

    if strength > HIGH {
        out.push_str(&format!("Strong association ({}) between target and disease. ", percent(strength)));
    } else if strength > MODERATE {
        out.push_str(&format!("Moderate association ({}) between target and disease. ", percent(strength)));
    } else {
        out.push_str(&format!("Association ({}) identified between target and disease. ", percent(strength)));
    }

    if burden > HIGH {
        out.push_str("High disease burden indicates significant unmet need. ");
    } else if burden > MODERATE {
        out.push_str("Moderate disease burden suggests therapeutic value. ");
    }

    out.push_str(match maturity {
        Maturity::None     => "No approved therapies currently target this protein-disease pair. ",
        Maturity::Trial    => "Therapies are in development but not yet approved. ",
        Maturity::Approved => "Approved therapies exist but may have limitations. ",
    });

    out.push_str(&format!("Opportunity score: {}.", percent(score)));
    out
}

/// Ranked opportunities over associations without an approved therapy.
pub fn calculate_opportunities(
    associations: &[Association],
    diseases: &[Disease],
    proteins: &[Protein],
    limit: usize,
) -> Vec<Opportunity> {
    calculate_opportunities_with(&OpportunityWeights::default(), associations, diseases, proteins, limit)
}

/// As [`calculate_opportunities`] with explicit weights. Associations
/// whose disease or protein is missing are skipped. Ties keep association
/// order.
pub fn calculate_opportunities_with(
    weights: &OpportunityWeights,
    associations: &[Association],
    diseases: &[Disease],
    proteins: &[Protein],
    limit: usize,
) -> Vec<Opportunity> {
    let disease_by_id: HashMap<&str, &Disease> = diseases.iter().map(|d| (d.id.as_str(), d)).collect();
    let protein_by_id: HashMap<&str, &Protein> = proteins.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut out: Vec<Opportunity> = Vec::new();
    for a in associations.iter().filter(|a| a.maturity.is_gap()) {
        let (Some(d), Some(p)) = (
            disease_by_id.get(a.disease_id.as_str()),
            protein_by_id.get(a.protein_id.as_str()),
        ) else {
            debug!(id = %a.id, "Skipping association with unresolved endpoint");
            continue;
        };

        let strength = clamp01(Some(a.association_strength), STRENGTH_FALLBACK);
        let burden = clamp01(Some(d.burden_score), BURDEN_FALLBACK);
        let score = gap_score_with(weights, Some(strength), Some(burden), Some(a.maturity.as_str()));

        out.push(Opportunity {
            disease_id: d.id.clone(),
            protein_id: p.id.clone(),
            gap_score: score,
            rationale: generate_rationale(p.label(), &d.name, strength, burden, a.maturity, score),
            disease_name: d.name.clone(),
            protein_name: p.label().to_string(),
            maturity: a.maturity,
        });
    }

    out.sort_by(|a, b| b.gap_score.total_cmp(&a.gap_score));
    out.truncate(limit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proteomap_test_utils::{association, disease, protein, sample_canonical_set};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_gap_score_untreated() {
        assert!((gap_score(Some(0.8), Some(0.9), Some("none")) - 0.72).abs() < EPS);
    }

    #[test]
    fn test_gap_score_approved_penalty() {
        assert!((gap_score(Some(0.8), Some(0.9), Some("approved")) - 0.072).abs() < EPS);
    }

    #[test]
    fn test_gap_score_fallbacks_and_unknown() {
        assert!((gap_score(None, None, None) - 0.15).abs() < EPS);
        assert!((gap_score(Some(1.0), Some(1.0), Some("phase 2")) - 0.8).abs() < EPS);
        assert_eq!(gap_score(Some(0.0), Some(0.9), Some("none")), 0.0);
        assert!((gap_score(Some(2.0), Some(-1.0), Some("trial"))).abs() < EPS);
    }

    #[test]
    fn test_gap_score_bounded_and_monotonic() {
        let grid = [0.0, 0.1, 0.3, 0.5, 0.7, 0.9, 1.0];
        for m in ["none", "trial", "approved"] {
            for s in grid {
                for b in grid {
                    let g = gap_score(Some(s), Some(b), Some(m));
                    assert!((0.0..=1.0).contains(&g));
                    assert!(gap_score(Some((s + 0.05).min(1.0)), Some(b), Some(m)) >= g);
                }
            }
        }
    }

    #[test]
    fn test_rationale_template() {
        let text = generate_rationale("APP", "Alzheimer disease", 0.8, 0.9, Maturity::None, 0.72);
        assert_eq!(
            text,
            "Therapeutic opportunity for APP in Alzheimer disease. \
             Strong association (80%) between target and disease. \
             High disease burden indicates significant unmet need. \
             No approved therapies currently target this protein-disease pair. \
             Opportunity score: 72%."
        );

        let text = generate_rationale("MAPT", "Huntington disease", 0.5, 0.4, Maturity::Trial, 0.1);
        assert_eq!(
            text,
            "Therapeutic opportunity for MAPT in Huntington disease. \
             Association (50%) identified between target and disease. \
             Therapies are in development but not yet approved. \
             Opportunity score: 10%."
        );
    }

    #[test]
    fn test_opportunities_exclude_approved_and_sort() {
        let set = sample_canonical_set();
        let ops = calculate_opportunities(&set.associations, &set.diseases, &set.proteins, 20);
        let pairs: Vec<(&str, &str)> = ops.iter().map(|o| (o.disease_id.as_str(), o.protein_id.as_str())).collect();
        // ALZ-APP 0.72, ALZ-MAPT 0.315, PARK-APP 0.30, HD-MAPT 0.20
        assert_eq!(pairs, vec![("ALZ", "APP"), ("ALZ", "MAPT"), ("PARK", "APP"), ("HD", "MAPT")]);
        for w in ops.windows(2) {
            assert!(w[0].gap_score >= w[1].gap_score);
        }
        assert!(ops.iter().all(|o| o.maturity != Maturity::Approved));
    }

    #[test]
    fn test_opportunities_limit_and_stable_ties() {
        let diseases = vec![disease("D1", "One", 0.5), disease("D2", "Two", 0.5)];
        let proteins = vec![protein("P1", "P1"), protein("P2", "P2")];
        let assoc = vec![
            association("D2", "P2", 0.6, Maturity::None),
            association("D1", "P1", 0.6, Maturity::None),
            association("D1", "P2", 0.6, Maturity::None),
            association("D1", "GHOST", 0.9, Maturity::None),
        ];
        let ops = calculate_opportunities(&assoc, &diseases, &proteins, 2);
        let pairs: Vec<(&str, &str)> = ops.iter().map(|o| (o.disease_id.as_str(), o.protein_id.as_str())).collect();
        assert_eq!(pairs, vec![("D2", "P2"), ("D1", "P1")]);
    }
}
