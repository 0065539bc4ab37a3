//! Read-only detail views and search over a [`KnowledgeStore`].

use serde::Serialize;

use proteomap_common::{Association, ClinicalTrial, Disease, EntityKind, Protein, Therapy};

use crate::store::KnowledgeStore;

pub const MIN_QUERY_LEN: usize = 2;
const PREFIX_SCORE: f64 = 1.0;
const SUBSTRING_SCORE: f64 = 0.5;

// ── Disease detail ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedProtein {
    pub association: Association,
    pub protein: Option<Protein>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseDetail {
    pub disease: Disease,
    pub associations: Vec<LinkedProtein>,
}

pub fn disease_detail(store: &dyn KnowledgeStore, disease_id: &str) -> Option<DiseaseDetail> {
    let disease = store.disease(disease_id)?;
    let associations = store
        .associations_for_disease(disease_id)
        .into_iter()
        .map(|a| {
            let protein = store.protein(&a.protein_id);
            LinkedProtein { association: a, protein }
        })
        .collect();
    Some(DiseaseDetail { disease, associations })
}

// ── Protein context ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedDisease {
    pub association: Association,
    pub disease: Option<Disease>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProteinContext {
    pub protein: Protein,
    pub associations: Vec<LinkedDisease>,
    pub therapies: Vec<Therapy>,
    pub trials: Vec<ClinicalTrial>,
}

/// A protein with its disease links, therapies and trials.
pub fn protein_context(store: &dyn KnowledgeStore, protein_id: &str) -> Option<ProteinContext> {
    let protein = store.protein(protein_id)?;
    let associations = store
        .associations_for_protein(protein_id)
        .into_iter()
        .map(|a| {
            let disease = store.disease(&a.disease_id);
            LinkedDisease { association: a, disease }
        })
        .collect();
    Some(ProteinContext {
        protein,
        associations,
        therapies: store.therapies_for_protein(protein_id),
        trials: store.trials_for_protein(protein_id),
    })
}

// ── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub kind: EntityKind,
    pub id: String,
    pub label: String,
    pub score: f64,
}

/// Best match score of `query` (already lower-cased) against the fields.
fn match_score<'a>(query: &str, fields: impl IntoIterator<Item = &'a str>) -> Option<f64> {
    let mut best: Option<f64> = None;
    for field in fields {
        let field = field.to_lowercase();
        let score = if field.starts_with(query) {
            PREFIX_SCORE
        } else if field.contains(query) {
            SUBSTRING_SCORE
        } else {
            continue;
        };
        best = Some(best.map_or(score, |b: f64| b.max(score)));
    }
    best
}

/// Case-insensitive search over disease name/category and protein
/// symbol/name/UniProt id. Diseases are listed before proteins at equal
/// score. Queries under two characters return nothing.
pub fn search(store: &dyn KnowledgeStore, query: &str, limit: usize) -> Vec<SearchResult> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_LEN {
        return vec![];
    }

    let mut results = Vec::new();
    for d in store.diseases() {
        if let Some(score) = match_score(&query, [d.name.as_str(), d.category.as_str()]) {
            results.push(SearchResult { kind: EntityKind::Disease, id: d.id.clone(), label: d.name.clone(), score });
        }
    }
    for p in store.proteins() {
        let fields = [p.symbol.as_deref(), p.name.as_deref(), Some(p.uniprot_id.as_str())];
        if let Some(score) = match_score(&query, fields.into_iter().flatten()) {
            results.push(SearchResult {
                kind: EntityKind::Protein,
                id: p.id.clone(),
                label: p.label().to_string(),
                score,
            });
        }
    }

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use proteomap_test_utils::sample_canonical_set;

    fn store() -> InMemoryStore {
        InMemoryStore::from_canonical(sample_canonical_set())
    }

    #[test]
    fn test_disease_detail_resolves_proteins() {
        let detail = disease_detail(&store(), "ALZ").unwrap();
        assert_eq!(detail.disease.name, "Alzheimer disease");
        let proteins: Vec<&str> = detail
            .associations
            .iter()
            .filter_map(|l| l.protein.as_ref().map(|p| p.id.as_str()))
            .collect();
        assert_eq!(proteins, vec!["APP", "MAPT"]);
        assert!(disease_detail(&store(), "NOPE").is_none());
    }

    #[test]
    fn test_protein_context() {
        let ctx = protein_context(&store(), "APP").unwrap();
        assert_eq!(ctx.associations.len(), 2);
        assert_eq!(ctx.therapies.len(), 1);
        assert!(ctx.trials.is_empty());
        assert_eq!(ctx.associations[1].disease.as_ref().map(|d| d.id.as_str()), Some("PARK"));
    }

    #[test]
    fn test_search_scores_prefix_over_substring() {
        let s = store();
        let results = search(&s, "disease", 10);
        let hd = results.iter().find(|r| r.id == "HD").unwrap();
        assert_eq!(hd.score, SUBSTRING_SCORE);

        let results = search(&s, "rare", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "HD");
        assert_eq!(results[0].score, PREFIX_SCORE);

        let results = search(&s, "ap", 10);
        assert_eq!(results[0].id, "APP");
        assert_eq!(results[0].score, PREFIX_SCORE);
    }

    #[test]
    fn test_search_short_query_and_limit() {
        let s = store();
        assert!(search(&s, "a", 10).is_empty());
        assert!(search(&s, "  ", 10).is_empty());
        assert_eq!(search(&s, "disease", 2).len(), 2);
    }
}
