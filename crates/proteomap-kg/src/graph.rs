//! Bipartite disease–protein graph assembly.
//!
//! Order of operations matters for the protein degree:
//!   1. diseases filtered by category
//!   2. associations filtered by disease membership, protein existence
//!      and maturity
//!   3. degree = associations per protein over that set
//!   4. optional hub filter using the degree from step 3
//!
//! Every emitted edge has both endpoints in the node list.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use proteomap_common::{Association, Disease, DiseaseCategory, Maturity, Protein};

use crate::store::KnowledgeStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphFilters {
    /// Category label, matched case-insensitively. Blank means no filter.
    pub category: Option<String>,
    pub maturity: Option<Maturity>,
    /// Proteins with fewer associations are dropped. `None` or 0 keeps all.
    pub hub_min_degree: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GraphNode {
    Disease {
        id: String,
        label: String,
        category: DiseaseCategory,
        burden: f64,
    },
    Protein {
        id: String,
        label: String,
        degree: usize,
    },
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            GraphNode::Disease { id, .. } | GraphNode::Protein { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub strength: f64,
    pub maturity: Maturity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphResult {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

fn category_matches(disease: &Disease, wanted: Option<&str>) -> bool {
    match wanted.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => disease.category.as_str().eq_ignore_ascii_case(c),
        None => true,
    }
}

pub fn build_graph(
    diseases: &[Disease],
    associations: &[Association],
    proteins: &[Protein],
    filters: &GraphFilters,
) -> GraphResult {
    let kept_diseases: Vec<&Disease> = diseases
        .iter()
        .filter(|d| category_matches(d, filters.category.as_deref()))
        .collect();
    let disease_ids: HashSet<&str> = kept_diseases.iter().map(|d| d.id.as_str()).collect();
    let protein_by_id: HashMap<&str, &Protein> =
        proteins.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut edges: Vec<&Association> = associations
        .iter()
        .filter(|a| disease_ids.contains(a.disease_id.as_str()))
        .filter(|a| protein_by_id.contains_key(a.protein_id.as_str()))
        .filter(|a| filters.maturity.map_or(true, |m| a.maturity == m))
        .collect();

    let mut degree: HashMap<&str, usize> = HashMap::new();
    for a in &edges {
        *degree.entry(a.protein_id.as_str()).or_insert(0) += 1;
    }

    if let Some(min) = filters.hub_min_degree.filter(|m| *m > 0) {
        edges.retain(|a| degree.get(a.protein_id.as_str()).copied().unwrap_or(0) >= min);
    }

    let mut nodes: Vec<GraphNode> = kept_diseases
        .iter()
        .map(|d| GraphNode::Disease {
            id: d.id.clone(),
            label: d.name.clone(),
            category: d.category,
            burden: d.burden_score,
        })
        .collect();

    // Protein nodes in order of first appearance among surviving edges.
    let mut emitted: HashSet<&str> = HashSet::new();
    for a in &edges {
        let pid = a.protein_id.as_str();
        if !emitted.insert(pid) {
            continue;
        }
        if let Some(p) = protein_by_id.get(pid) {
            nodes.push(GraphNode::Protein {
                id: p.id.clone(),
                label: p.label().to_string(),
                degree: degree.get(pid).copied().unwrap_or(0),
            });
        }
    }

    let edges: Vec<GraphEdge> = edges
        .into_iter()
        .map(|a| GraphEdge {
            source: a.disease_id.clone(),
            target: a.protein_id.clone(),
            strength: a.association_strength,
            maturity: a.maturity,
        })
        .collect();

    debug!(nodes = nodes.len(), edges = edges.len(), "Graph assembled");
    GraphResult { nodes, edges }
}

/// Assemble the graph from a store snapshot.
pub fn graph_from_store(store: &dyn KnowledgeStore, filters: &GraphFilters) -> GraphResult {
    build_graph(&store.diseases(), &store.associations(), &store.proteins(), filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proteomap_common::CanonicalSet;
    use proteomap_test_utils::{association, disease, protein, sample_canonical_set};

    fn graph(set: &CanonicalSet, filters: &GraphFilters) -> GraphResult {
        build_graph(&set.diseases, &set.associations, &set.proteins, filters)
    }

    fn assert_no_dangling(g: &GraphResult) {
        let ids: HashSet<&str> = g.nodes.iter().map(GraphNode::id).collect();
        for e in &g.edges {
            assert!(ids.contains(e.source.as_str()), "missing source {}", e.source);
            assert!(ids.contains(e.target.as_str()), "missing target {}", e.target);
        }
    }

    #[test]
    fn test_unfiltered_graph() {
        let set = sample_canonical_set();
        let g = graph(&set, &GraphFilters::default());
        assert_eq!(g.edges.len(), 5);
        assert_eq!(g.nodes.len(), 6);
        let app = g.nodes.iter().find(|n| n.id() == "APP").unwrap();
        assert_eq!(
            app,
            &GraphNode::Protein { id: "APP".into(), label: "APP".into(), degree: 2 }
        );
        assert_no_dangling(&g);
    }

    #[test]
    fn test_hub_filter_uses_prefilter_degree() {
        let set = sample_canonical_set();
        let g = graph(&set, &GraphFilters { hub_min_degree: Some(2), ..Default::default() });
        let proteins: Vec<&str> = g
            .nodes
            .iter()
            .filter(|n| matches!(n, GraphNode::Protein { .. }))
            .map(GraphNode::id)
            .collect();
        assert_eq!(proteins, vec!["APP", "MAPT"]);
        assert_eq!(g.edges.len(), 4);
        assert_no_dangling(&g);
    }

    #[test]
    fn test_maturity_then_hub_degree() {
        let set = sample_canonical_set();
        // none-only edges: ALZ-APP, PARK-APP, HD-MAPT → APP degree 2, MAPT degree 1
        let g = graph(
            &set,
            &GraphFilters { maturity: Some(Maturity::None), hub_min_degree: Some(2), ..Default::default() },
        );
        let targets: Vec<&str> = g.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["APP", "APP"]);
        assert_no_dangling(&g);
    }

    #[test]
    fn test_category_filter_case_insensitive() {
        let set = sample_canonical_set();
        let g = graph(&set, &GraphFilters { category: Some("rare disease".into()), ..Default::default() });
        let ids: Vec<&str> = g.nodes.iter().map(GraphNode::id).collect();
        assert_eq!(ids, vec!["HD", "MAPT"]);
        // degree counts only the edges left after the category filter
        assert!(matches!(g.nodes[1], GraphNode::Protein { degree: 1, .. }));

        let none = graph(&set, &GraphFilters { category: Some("Oncology".into()), ..Default::default() });
        assert!(none.nodes.is_empty());
        assert!(none.edges.is_empty());
    }

    #[test]
    fn test_dangling_associations_never_emitted() {
        let set = CanonicalSet {
            diseases: vec![disease("ALZ", "Alzheimer", 0.9)],
            proteins: vec![protein("APP", "APP")],
            associations: vec![
                association("ALZ", "APP", 0.8, Maturity::None),
                association("ALZ", "GHOST", 0.8, Maturity::None),
                association("NOPE", "APP", 0.8, Maturity::None),
            ],
            ..Default::default()
        };
        for hub in [None, Some(0), Some(1), Some(3)] {
            for maturity in [None, Some(Maturity::None), Some(Maturity::Approved)] {
                let g = graph(&set, &GraphFilters { category: None, maturity, hub_min_degree: hub });
                assert_no_dangling(&g);
            }
        }
        let g = graph(&set, &GraphFilters::default());
        assert_eq!(g.edges.len(), 1);
    }

    #[test]
    fn test_node_serialises_with_type_tag() {
        let node = GraphNode::Protein { id: "APP".into(), label: "APP".into(), degree: 2 };
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["type"], "protein");
        assert_eq!(v["degree"], 2);
    }
}
