//! Core entity types of the disease–protein–therapy knowledge graph.
//! These are the canonical, validated shapes; loosely-typed candidate
//! records only exist inside the ingestion crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Closed enums
// ---------------------------------------------------------------------------

/// Therapeutic development status of an association or therapy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maturity {
    Approved,
    Trial,
    #[default]
    None,
}

impl Maturity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Maturity::Approved => "approved",
            Maturity::Trial    => "trial",
            Maturity::None     => "none",
        }
    }

    /// Exact membership in the closed set; anything else is `None` (the Option).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Maturity::Approved),
            "trial"    => Some(Maturity::Trial),
            "none"     => Some(Maturity::None),
            _          => None,
        }
    }

    /// True when no approved therapy exists for the pair.
    pub fn is_gap(&self) -> bool {
        matches!(self, Maturity::None | Maturity::Trial)
    }
}

impl std::fmt::Display for Maturity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed disease category set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiseaseCategory {
    Cancer,
    Cardiovascular,
    Metabolic,
    Neurodegenerative,
    Autoimmune,
    Infectious,
    Respiratory,
    Kidney,
    Liver,
    #[serde(rename = "Mental Health")]
    MentalHealth,
    #[serde(rename = "Rare Disease")]
    RareDisease,
    #[default]
    Other,
}

impl DiseaseCategory {
    pub const ALL: [DiseaseCategory; 12] = [
        DiseaseCategory::Cancer,
        DiseaseCategory::Cardiovascular,
        DiseaseCategory::Metabolic,
        DiseaseCategory::Neurodegenerative,
        DiseaseCategory::Autoimmune,
        DiseaseCategory::Infectious,
        DiseaseCategory::Respiratory,
        DiseaseCategory::Kidney,
        DiseaseCategory::Liver,
        DiseaseCategory::MentalHealth,
        DiseaseCategory::RareDisease,
        DiseaseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiseaseCategory::Cancer            => "Cancer",
            DiseaseCategory::Cardiovascular    => "Cardiovascular",
            DiseaseCategory::Metabolic         => "Metabolic",
            DiseaseCategory::Neurodegenerative => "Neurodegenerative",
            DiseaseCategory::Autoimmune        => "Autoimmune",
            DiseaseCategory::Infectious        => "Infectious",
            DiseaseCategory::Respiratory       => "Respiratory",
            DiseaseCategory::Kidney            => "Kidney",
            DiseaseCategory::Liver             => "Liver",
            DiseaseCategory::MentalHealth      => "Mental Health",
            DiseaseCategory::RareDisease       => "Rare Disease",
            DiseaseCategory::Other             => "Other",
        }
    }

    /// Case-insensitive label lookup. Unknown labels are `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for DiseaseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity types flowing through the pipeline, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Disease,
    Protein,
    Association,
    Therapy,
    Trial,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Disease     => "disease",
            EntityKind::Protein     => "protein",
            EntityKind::Association => "association",
            EntityKind::Therapy     => "therapy",
            EntityKind::Trial       => "trial",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Disease
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub category: DiseaseCategory,
    /// Always within [0, 1]; 0.5 when the source gave nothing usable.
    pub burden_score: f64,
    #[serde(default)]
    pub sources: Vec<String>,
}

// ---------------------------------------------------------------------------
// Protein
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protein {
    pub id: String,
    pub uniprot_id: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub family: Option<String>,
    #[serde(default)]
    pub pathways: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Protein {
    /// Display label: symbol, else name, else id.
    pub fn label(&self) -> &str {
        self.symbol
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(self.id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Association (disease–protein edge)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    /// `{disease_id}-{protein_id}`
    pub id: String,
    pub disease_id: String,
    pub protein_id: String,
    pub association_strength: f64,
    pub evidence_text: Option<String>,
    pub maturity: Maturity,
    #[serde(default)]
    pub citations: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Association {
    pub fn edge_id(disease_id: &str, protein_id: &str) -> String {
        format!("{disease_id}-{protein_id}")
    }
}

// ---------------------------------------------------------------------------
// Therapy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Therapy {
    pub id: String,
    pub name: String,
    pub target_protein_id: String,
    pub status: Maturity,
    pub drugbank_id: Option<String>,
    pub chembl_id: Option<String>,
    /// Disease names (or ids) the therapy is indicated for.
    #[serde(default)]
    pub indications: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Therapy {
    pub fn is_approved(&self) -> bool {
        self.status == Maturity::Approved
    }
}

// ---------------------------------------------------------------------------
// Clinical trial
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalTrial {
    pub id: String,
    pub nct_id: String,
    pub phase: Option<String>,
    pub status: Option<String>,
    pub condition: Option<String>,
    pub target_protein_id: Option<String>,
    pub start_date: Option<String>,
    pub link: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

// ---------------------------------------------------------------------------
// Canonical set
// ---------------------------------------------------------------------------

/// Output of one generation run: the deduplicated, validated entity and
/// edge lists handed to the storage collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSet {
    pub diseases: Vec<Disease>,
    pub proteins: Vec<Protein>,
    pub associations: Vec<Association>,
    pub therapies: Vec<Therapy>,
    pub trials: Vec<ClinicalTrial>,
}

impl CanonicalSet {
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

// ---------------------------------------------------------------------------
// Enrichment (shallow merge, existing non-empty fields win)
// ---------------------------------------------------------------------------

/// Supplementary enrichment of an already-canonical record.
pub trait Enrich {
    /// Fill empty fields of `self` from `other`. Returns the number of fields filled.
    fn enrich_with(&mut self, other: &Self) -> usize;
}

fn fill_opt(slot: &mut Option<String>, other: &Option<String>) -> usize {
    let empty = slot.as_deref().map_or(true, str::is_empty);
    match other {
        Some(v) if empty && !v.is_empty() => {
            *slot = Some(v.clone());
            1
        }
        _ => 0,
    }
}

fn fill_vec(slot: &mut Vec<String>, other: &[String]) -> usize {
    if slot.is_empty() && !other.is_empty() {
        *slot = other.to_vec();
        1
    } else {
        0
    }
}

impl Enrich for Disease {
    fn enrich_with(&mut self, other: &Self) -> usize {
        let mut filled = fill_vec(&mut self.sources, &other.sources);
        if self.category == DiseaseCategory::Other && other.category != DiseaseCategory::Other {
            self.category = other.category;
            filled += 1;
        }
        filled
    }
}

impl Enrich for Protein {
    fn enrich_with(&mut self, other: &Self) -> usize {
        fill_opt(&mut self.symbol, &other.symbol)
            + fill_opt(&mut self.name, &other.name)
            + fill_opt(&mut self.family, &other.family)
            + fill_vec(&mut self.pathways, &other.pathways)
            + fill_vec(&mut self.sources, &other.sources)
    }
}

impl Enrich for Association {
    fn enrich_with(&mut self, other: &Self) -> usize {
        let mut filled = fill_opt(&mut self.evidence_text, &other.evidence_text)
            + fill_vec(&mut self.citations, &other.citations)
            + fill_vec(&mut self.sources, &other.sources);
        if self.last_updated.is_none() && other.last_updated.is_some() {
            self.last_updated = other.last_updated;
            filled += 1;
        }
        filled
    }
}

impl Enrich for Therapy {
    fn enrich_with(&mut self, other: &Self) -> usize {
        fill_opt(&mut self.drugbank_id, &other.drugbank_id)
            + fill_opt(&mut self.chembl_id, &other.chembl_id)
            + fill_vec(&mut self.indications, &other.indications)
            + fill_vec(&mut self.sources, &other.sources)
    }
}

impl Enrich for ClinicalTrial {
    fn enrich_with(&mut self, other: &Self) -> usize {
        fill_opt(&mut self.phase, &other.phase)
            + fill_opt(&mut self.status, &other.status)
            + fill_opt(&mut self.condition, &other.condition)
            + fill_opt(&mut self.target_protein_id, &other.target_protein_id)
            + fill_opt(&mut self.start_date, &other.start_date)
            + fill_vec(&mut self.sources, &other.sources)
    }
}
