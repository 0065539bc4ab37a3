//! Shared fixtures for proteomap tests.
//!
//! Builders return fully-populated canonical entities with neutral
//! defaults; tests override the fields they care about.

use proteomap_common::{
    Association, CanonicalSet, ClinicalTrial, Disease, DiseaseCategory, Maturity, Protein, Therapy,
};
use serde_json::{json, Value};

pub use pretty_assertions;

/// Install a test subscriber once; honours RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Entity builders ──────────────────────────────────────────────────────────

pub fn disease(id: &str, name: &str, burden_score: f64) -> Disease {
    Disease {
        id: id.to_string(),
        name: name.to_string(),
        category: DiseaseCategory::Other,
        burden_score,
        sources: vec![],
    }
}

pub fn disease_in(id: &str, name: &str, burden_score: f64, category: DiseaseCategory) -> Disease {
    Disease { category, ..disease(id, name, burden_score) }
}

pub fn protein(id: &str, symbol: &str) -> Protein {
    Protein {
        id: id.to_string(),
        uniprot_id: format!("UP-{id}"),
        symbol: (!symbol.is_empty()).then(|| symbol.to_string()),
        name: None,
        family: None,
        pathways: vec![],
        sources: vec![],
    }
}

pub fn association(disease_id: &str, protein_id: &str, strength: f64, maturity: Maturity) -> Association {
    Association {
        id: Association::edge_id(disease_id, protein_id),
        disease_id: disease_id.to_string(),
        protein_id: protein_id.to_string(),
        association_strength: strength,
        evidence_text: None,
        maturity,
        citations: vec![],
        sources: vec![],
        last_updated: None,
    }
}

pub fn therapy(name: &str, target_protein_id: &str, status: Maturity, indications: &[&str]) -> Therapy {
    Therapy {
        id: name.to_lowercase().replace(' ', "_"),
        name: name.to_string(),
        target_protein_id: target_protein_id.to_string(),
        status,
        drugbank_id: None,
        chembl_id: None,
        indications: indications.iter().map(|s| s.to_string()).collect(),
        sources: vec![],
    }
}

pub fn trial(nct_id: &str, target_protein_id: Option<&str>) -> ClinicalTrial {
    ClinicalTrial {
        id: nct_id.to_lowercase(),
        nct_id: nct_id.to_string(),
        phase: Some("Phase 2".to_string()),
        status: Some("Recruiting".to_string()),
        condition: None,
        target_protein_id: target_protein_id.map(str::to_string),
        start_date: None,
        link: format!("https://clinicaltrials.gov/study/{nct_id}"),
        sources: vec![],
    }
}

// ── Sample sets ──────────────────────────────────────────────────────────────

/// Small neurodegeneration graph:
/// ALZ–APP (0.8, none), ALZ–MAPT (0.7, trial), PARK–APP (0.6, none),
/// PARK–SNCA (0.9, approved), HD–MAPT (0.5, none); Donepezil-like
/// DrugX approved on APP for ALZ.
pub fn sample_canonical_set() -> CanonicalSet {
    CanonicalSet {
        diseases: vec![
            disease_in("ALZ", "Alzheimer disease", 0.9, DiseaseCategory::Neurodegenerative),
            disease_in("PARK", "Parkinson disease", 0.5, DiseaseCategory::Neurodegenerative),
            disease_in("HD", "Huntington disease", 0.4, DiseaseCategory::RareDisease),
        ],
        proteins: vec![protein("APP", "APP"), protein("MAPT", "MAPT"), protein("SNCA", "SNCA")],
        associations: vec![
            association("ALZ", "APP", 0.8, Maturity::None),
            association("ALZ", "MAPT", 0.7, Maturity::Trial),
            association("PARK", "APP", 0.6, Maturity::None),
            association("PARK", "SNCA", 0.9, Maturity::Approved),
            association("HD", "MAPT", 0.5, Maturity::None),
        ],
        therapies: vec![therapy("DrugX", "APP", Maturity::Approved, &["ALZ"])],
        trials: vec![trial("NCT00000001", Some("MAPT"))],
    }
}

/// Candidate batches for a generation run, as an acquisition source would
/// hand them over. Two sources disagree on some fields; the first wins.
pub fn sample_batches_value() -> Value {
    json!({
        "diseases": [
            {"source": "llm", "records": [
                {"id": "ALZ", "name": "Alzheimer disease", "category": "Neurodegenerative", "burden_score": 0.9},
                {"id": "PARK", "name": "Parkinson disease", "category": "neurodegenerative"},
                {"id": "ALZ", "name": "Early-onset Alzheimer disease", "category": "Brain", "burden_score": 1.3},
                "not a record"
            ]},
            {"source": "curated", "records": [
                {"id": "ALZ-X", "name": "ALZHEIMER DISEASE", "category": "Cancer", "burden_score": 0.1},
                {"name": "Missing id disease"}
            ]}
        ],
        "proteins": [
            {"source": "llm", "records": [
                {"uniprot_id": "P05067", "symbol": " app ", "name": ""},
                {"uniprot_id": "P37840", "symbol": "snca"},
                {"symbol": "NOUNIPROT"}
            ]},
            {"source": "uniprot", "records": [
                {"uniprot_id": "P05067", "symbol": "APP2", "name": "Amyloid-beta precursor protein", "family": "APP family"}
            ]}
        ],
        "associations": [
            {"source": "llm", "records": [
                {"disease_id": "ALZ", "protein_id": "APP", "association_strength": 0.8, "maturity": "none"},
                {"disease_id": "PARK", "protein_id": "APP", "association_strength": 0.6, "maturity": "Phase 2"},
                {"disease_id": "PARK", "protein_id": "SNCA", "association_strength": 0.1},
                {"disease_id": "GHOST", "protein_id": "APP", "association_strength": 0.9}
            ]},
            {"source": "opentargets", "records": [
                {"disease_id": "ALZ", "protein_id": "APP", "association_strength": 0.2, "evidence_text": "GWAS"}
            ]}
        ],
        "therapies": [
            {"source": "llm", "records": [
                {"name": "DrugX", "target_protein_id": "APP", "status": "approved", "indications": ["ALZ"]},
                {"name": "Orphanib", "target_protein_id": "NOPE"}
            ]},
            {"source": "drugbank", "records": [
                {"name": "drugx", "target_protein_id": "APP", "indications": ["Alzheimer disease"], "drugbank_id": "DB00001"}
            ]}
        ],
        "trials": [
            {"source": "ctgov", "records": [
                {"nct_id": "NCT00000001", "phase": "Phase 3", "target_protein_id": "APP"},
                {"id": "alz-open-label", "phase": "Phase 1"}
            ]}
        ]
    })
}

pub fn sample_batches_json() -> String {
    sample_batches_value().to_string()
}
