//! Protein hubs and disease clusters over the association set.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use proteomap_common::{Association, Protein};

/// Average strength reported for a hub with no associations.
pub const DEFAULT_AVG_STRENGTH: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubRecord {
    pub protein_id: String,
    pub disease_count: usize,
}

/// Proteins with at least `min_diseases` associations, most connected first,
/// ties by protein id.
///
/// Counts associations rather than distinct diseases. The two agree while
/// there is at most one association per disease–protein pair, which the
/// `{disease_id}-{protein_id}` id convention enforces.
pub fn identify_hubs(associations: &[Association], min_diseases: usize) -> Vec<HubRecord> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for a in associations {
        *counts.entry(a.protein_id.as_str()).or_insert(0) += 1;
    }

    let mut hubs: Vec<HubRecord> = counts
        .into_iter()
        .filter(|(_, n)| *n >= min_diseases)
        .map(|(id, n)| HubRecord { protein_id: id.to_string(), disease_count: n })
        .collect();
    hubs.sort_by(|a, b| {
        b.disease_count
            .cmp(&a.disease_count)
            .then_with(|| a.protein_id.cmp(&b.protein_id))
    });
    hubs
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterRecord {
    /// Always sorts before `disease2_id`.
    pub disease1_id: String,
    pub disease2_id: String,
    pub shared_count: usize,
    /// Sorted ascending.
    pub shared_proteins: Vec<String>,
}

/// Disease pairs sharing at least `min_shared_proteins` proteins.
///
/// Compares every unordered pair once, so this is O(D²) in the number of
/// diseases. Fine for a few hundred diseases. Output is sorted by shared
/// count descending, then `(disease1_id, disease2_id)` ascending.
pub fn find_disease_clusters(associations: &[Association], min_shared_proteins: usize) -> Vec<ClusterRecord> {
    let mut adjacency: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for a in associations {
        adjacency
            .entry(a.disease_id.as_str())
            .or_default()
            .insert(a.protein_id.as_str());
    }

    let diseases: Vec<(&str, &BTreeSet<&str>)> = adjacency.iter().map(|(d, p)| (*d, p)).collect();
    let mut clusters = Vec::new();
    for (i, (d1, p1)) in diseases.iter().enumerate() {
        for (d2, p2) in &diseases[i + 1..] {
            let shared: Vec<String> = p1.intersection(p2).map(|p| p.to_string()).collect();
            if shared.len() >= min_shared_proteins {
                clusters.push(ClusterRecord {
                    disease1_id: d1.to_string(),
                    disease2_id: d2.to_string(),
                    shared_count: shared.len(),
                    shared_proteins: shared,
                });
            }
        }
    }

    clusters.sort_by(|a, b| {
        b.shared_count
            .cmp(&a.shared_count)
            .then_with(|| a.disease1_id.cmp(&b.disease1_id))
            .then_with(|| a.disease2_id.cmp(&b.disease2_id))
    });
    clusters
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubDetail {
    pub protein_id: String,
    pub label: String,
    pub family: Option<String>,
    pub disease_count: usize,
    pub disease_ids: Vec<String>,
    pub avg_strength: f64,
}

/// Summary of one protein's disease links. `None` if the protein is unknown.
pub fn hub_details(protein_id: &str, proteins: &[Protein], associations: &[Association]) -> Option<HubDetail> {
    let protein = proteins.iter().find(|p| p.id == protein_id)?;
    let linked: Vec<&Association> = associations.iter().filter(|a| a.protein_id == protein_id).collect();

    let avg_strength = if linked.is_empty() {
        DEFAULT_AVG_STRENGTH
    } else {
        linked.iter().map(|a| a.association_strength).sum::<f64>() / linked.len() as f64
    };

    Some(HubDetail {
        protein_id: protein.id.clone(),
        label: protein.label().to_string(),
        family: protein.family.clone(),
        disease_count: linked.len(),
        disease_ids: linked.iter().map(|a| a.disease_id.clone()).collect(),
        avg_strength,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proteomap_common::Maturity;
    use proteomap_test_utils::{association, protein};

    fn edges(pairs: &[(&str, &str)]) -> Vec<Association> {
        pairs.iter().map(|(d, p)| association(d, p, 0.5, Maturity::None)).collect()
    }

    #[test]
    fn test_hubs_threshold() {
        let assoc = edges(&[("D1", "P1"), ("D2", "P1"), ("D3", "P1"), ("D1", "P2")]);
        let hubs = identify_hubs(&assoc, 2);
        assert_eq!(hubs, vec![HubRecord { protein_id: "P1".into(), disease_count: 3 }]);
    }

    #[test]
    fn test_hubs_ties_by_id() {
        let assoc = edges(&[("D1", "B"), ("D2", "B"), ("D1", "A"), ("D2", "A"), ("D1", "C")]);
        let ids: Vec<String> = identify_hubs(&assoc, 1).into_iter().map(|h| h.protein_id).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_clusters_unique_pairs_and_order() {
        let assoc = edges(&[
            ("D2", "P1"), ("D2", "P2"), ("D2", "P3"),
            ("D1", "P1"), ("D1", "P2"), ("D1", "P3"),
            ("D3", "P1"), ("D3", "P2"),
        ]);
        let clusters = find_disease_clusters(&assoc, 2);
        let pairs: Vec<(&str, &str, usize)> = clusters
            .iter()
            .map(|c| (c.disease1_id.as_str(), c.disease2_id.as_str(), c.shared_count))
            .collect();
        assert_eq!(pairs, vec![("D1", "D2", 3), ("D1", "D3", 2), ("D2", "D3", 2)]);
        assert_eq!(clusters[0].shared_proteins, vec!["P1", "P2", "P3"]);
        for c in &clusters {
            assert!(c.disease1_id < c.disease2_id);
        }
    }

    #[test]
    fn test_clusters_below_threshold_excluded() {
        let assoc = edges(&[("D1", "P1"), ("D2", "P1"), ("D2", "P2")]);
        assert!(find_disease_clusters(&assoc, 2).is_empty());
        assert_eq!(find_disease_clusters(&assoc, 1).len(), 1);
    }

    #[test]
    fn test_hub_details() {
        let proteins = vec![protein("APP", "APP"), protein("LONE", "")];
        let assoc = vec![
            association("ALZ", "APP", 0.8, Maturity::None),
            association("PARK", "APP", 0.6, Maturity::Trial),
        ];
        let detail = hub_details("APP", &proteins, &assoc).unwrap();
        assert_eq!(detail.disease_count, 2);
        assert_eq!(detail.disease_ids, vec!["ALZ", "PARK"]);
        assert!((detail.avg_strength - 0.7).abs() < 1e-9);

        let lone = hub_details("LONE", &proteins, &assoc).unwrap();
        assert_eq!(lone.label, "LONE");
        assert_eq!(lone.avg_strength, DEFAULT_AVG_STRENGTH);
        assert!(hub_details("GHOST", &proteins, &assoc).is_none());
    }
}
