//! Drug repurposing candidates: approved therapies whose target protein
//! is strongly associated with a disease the therapy is not indicated for.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use proteomap_common::{Association, Disease, Maturity, Protein, Therapy};

use crate::weights::RepurposingWeights;

/// Used for strength or burden when the value is missing, zero or not finite.
pub const SIGNAL_FALLBACK: f64 = 0.5;

fn signal_or_default(x: Option<f64>) -> f64 {
    x.filter(|v| v.is_finite() && *v != 0.0).unwrap_or(SIGNAL_FALLBACK)
}

/// strength × burden × bonus × risk_factor, with the bonus applied when the
/// new indication is untreated (maturity none or missing). A zero strength
/// or burden counts as unknown. Not clamped.
pub fn repurposing_score(strength: Option<f64>, burden: Option<f64>, maturity: Option<Maturity>) -> f64 {
    repurposing_score_with(&RepurposingWeights::default(), strength, burden, maturity)
}

pub fn repurposing_score_with(
    weights: &RepurposingWeights,
    strength: Option<f64>,
    burden: Option<f64>,
    maturity: Option<Maturity>,
) -> f64 {
    let bonus = match maturity {
        None | Some(Maturity::None) => weights.untreated_bonus,
        Some(_) => 1.0,
    };
    signal_or_default(strength) * signal_or_default(burden) * bonus * weights.risk_factor
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepurposingCandidate {
    pub therapy_id: String,
    pub therapy_name: String,
    /// Label of the therapy's target protein.
    pub target_protein: String,
    pub current_indications: Vec<String>,
    pub new_disease: String,
    pub new_disease_id: String,
    pub association_strength: f64,
    pub evidence: Option<String>,
    pub repurposing_score: f64,
}

fn already_indicated(therapy: &Therapy, disease: &Disease) -> bool {
    therapy.indications.iter().any(|ind| {
        let ind = ind.trim();
        ind.eq_ignore_ascii_case(&disease.id) || ind.eq_ignore_ascii_case(&disease.name)
    })
}

pub fn find_repurposing_opportunities(
    therapies: &[Therapy],
    associations: &[Association],
    diseases: &[Disease],
    proteins: &[Protein],
    min_strength: f64,
) -> Vec<RepurposingCandidate> {
    find_repurposing_opportunities_with(
        &RepurposingWeights::default(),
        therapies,
        associations,
        diseases,
        proteins,
        min_strength,
    )
}

/// For each approved therapy, every association on its target with
/// strength ≥ `min_strength` to a disease outside its indications.
/// Indications match a disease by id or name, case-insensitively.
/// Sorted by score descending; ties keep discovery order.
pub fn find_repurposing_opportunities_with(
    weights: &RepurposingWeights,
    therapies: &[Therapy],
    associations: &[Association],
    diseases: &[Disease],
    proteins: &[Protein],
    min_strength: f64,
) -> Vec<RepurposingCandidate> {
    let disease_by_id: HashMap<&str, &Disease> = diseases.iter().map(|d| (d.id.as_str(), d)).collect();
    let protein_by_id: HashMap<&str, &Protein> = proteins.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut out = Vec::new();
    for therapy in therapies.iter().filter(|t| t.is_approved()) {
        let target = therapy.target_protein_id.as_str();
        let target_label = protein_by_id.get(target).map_or(target, |p| p.label());

        for a in associations.iter().filter(|a| a.protein_id == target) {
            if a.association_strength < min_strength {
                continue;
            }
            let Some(disease) = disease_by_id.get(a.disease_id.as_str()) else {
                debug!(id = %a.id, "Skipping association to unknown disease");
                continue;
            };
            if already_indicated(therapy, disease) {
                continue;
            }

            out.push(RepurposingCandidate {
                therapy_id: therapy.id.clone(),
                therapy_name: therapy.name.clone(),
                target_protein: target_label.to_string(),
                current_indications: therapy.indications.clone(),
                new_disease: disease.name.clone(),
                new_disease_id: disease.id.clone(),
                association_strength: a.association_strength,
                evidence: a.evidence_text.clone(),
                repurposing_score: repurposing_score_with(
                    weights,
                    Some(a.association_strength),
                    Some(disease.burden_score),
                    Some(a.maturity),
                ),
            });
        }
    }

    out.sort_by(|a, b| b.repurposing_score.total_cmp(&a.repurposing_score));
    out
}

// ── Multi-indication targets ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiIndicationTarget {
    pub protein_id: String,
    pub protein_name: String,
    pub therapy_count: usize,
    pub indication_count: usize,
    pub indications: Vec<String>,
    /// Therapy names.
    pub therapies: Vec<String>,
}

/// Proteins whose approved therapies together cover at least
/// `min_indications` distinct indications. Proteins not in `proteins` are
/// skipped. Sorted by indication count descending, ties in first-seen order.
pub fn find_multi_indication_proteins(
    therapies: &[Therapy],
    proteins: &[Protein],
    min_indications: usize,
) -> Vec<MultiIndicationTarget> {
    let protein_by_id: HashMap<&str, &Protein> = proteins.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, (Vec<String>, Vec<String>)> = HashMap::new();
    for t in therapies.iter().filter(|t| t.is_approved()) {
        let key = t.target_protein_id.as_str();
        let (names, indications) = grouped.entry(key).or_insert_with(|| {
            order.push(key);
            (Vec::new(), Vec::new())
        });
        names.push(t.name.clone());
        for ind in &t.indications {
            if !indications.contains(ind) {
                indications.push(ind.clone());
            }
        }
    }

    let mut out: Vec<MultiIndicationTarget> = order
        .into_iter()
        .filter_map(|id| {
            let protein = protein_by_id.get(id)?;
            let (names, indications) = grouped.remove(id)?;
            (indications.len() >= min_indications).then(|| MultiIndicationTarget {
                protein_id: protein.id.clone(),
                protein_name: protein.label().to_string(),
                therapy_count: names.len(),
                indication_count: indications.len(),
                indications,
                therapies: names,
            })
        })
        .collect();

    out.sort_by(|a, b| b.indication_count.cmp(&a.indication_count));
    out
}
