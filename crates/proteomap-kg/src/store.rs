//! Storage access used by the graph and scoring layers.
//!
//! `KnowledgeStore` covers the simple equality lookups the core needs.
//! `InMemoryStore` is the reference implementation: one `RwLock` per
//! entity type, so loading or enriching one type is a critical section
//! for that type only while readers of the others proceed.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use proteomap_common::{
    Association, CanonicalSet, ClinicalTrial, Disease, Enrich, Protein, Therapy,
};

/// Read access to the canonical entity set.
pub trait KnowledgeStore: Send + Sync {
    fn diseases(&self) -> Vec<Disease>;
    fn proteins(&self) -> Vec<Protein>;
    fn associations(&self) -> Vec<Association>;
    fn therapies(&self) -> Vec<Therapy>;
    fn trials(&self) -> Vec<ClinicalTrial>;

    fn disease(&self, id: &str) -> Option<Disease>;
    fn protein(&self, id: &str) -> Option<Protein>;

    fn associations_for_disease(&self, disease_id: &str) -> Vec<Association>;
    fn associations_for_protein(&self, protein_id: &str) -> Vec<Association>;
    fn therapies_for_protein(&self, protein_id: &str) -> Vec<Therapy>;
    fn trials_for_protein(&self, protein_id: &str) -> Vec<ClinicalTrial>;

    fn approved_therapies_for_protein(&self, protein_id: &str) -> Vec<Therapy> {
        self.therapies_for_protein(protein_id)
            .into_iter()
            .filter(Therapy::is_approved)
            .collect()
    }

    /// Owned copy of everything, for the slice-based scorers.
    fn snapshot(&self) -> CanonicalSet {
        CanonicalSet {
            diseases: self.diseases(),
            proteins: self.proteins(),
            associations: self.associations(),
            therapies: self.therapies(),
            trials: self.trials(),
        }
    }
}

// ── In-memory store ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryStore {
    diseases: RwLock<Vec<Disease>>,
    proteins: RwLock<Vec<Protein>>,
    associations: RwLock<Vec<Association>>,
    therapies: RwLock<Vec<Therapy>>,
    trials: RwLock<Vec<ClinicalTrial>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn filtered<T: Clone>(lock: &RwLock<Vec<T>>, pred: impl Fn(&T) -> bool) -> Vec<T> {
    read(lock).iter().filter(|x| pred(x)).cloned().collect()
}

/// Shallow-merge `updates` into the records with matching ids.
/// Updates for unknown ids are ignored. Returns fields filled.
fn enrich_all<T: Enrich>(lock: &RwLock<Vec<T>>, updates: &[T], id: fn(&T) -> &str) -> usize {
    let mut guard = write(lock);
    let mut filled = 0usize;
    for update in updates {
        match guard.iter_mut().find(|existing| id(existing) == id(update)) {
            Some(existing) => filled += existing.enrich_with(update),
            None => debug!(id = id(update), "Enrichment for unknown id ignored"),
        }
    }
    filled
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_canonical(set: CanonicalSet) -> Self {
        let store = Self::new();
        store.load(set);
        store
    }

    /// Replace every entity list with the contents of `set`.
    ///
    /// Each type is swapped under its own write lock, in dependency order.
    /// The swap is not atomic across types: a concurrent reader can see new
    /// diseases next to old associations until `load` returns.
    pub fn load(&self, set: CanonicalSet) {
        info!(
            diseases = set.diseases.len(),
            proteins = set.proteins.len(),
            associations = set.associations.len(),
            therapies = set.therapies.len(),
            trials = set.trials.len(),
            "Loading canonical set"
        );
        *write(&self.diseases) = set.diseases;
        *write(&self.proteins) = set.proteins;
        *write(&self.associations) = set.associations;
        *write(&self.therapies) = set.therapies;
        *write(&self.trials) = set.trials;
    }

    pub fn enrich_diseases(&self, updates: &[Disease]) -> usize {
        enrich_all(&self.diseases, updates, |d| d.id.as_str())
    }

    pub fn enrich_proteins(&self, updates: &[Protein]) -> usize {
        enrich_all(&self.proteins, updates, |p| p.id.as_str())
    }

    pub fn enrich_associations(&self, updates: &[Association]) -> usize {
        enrich_all(&self.associations, updates, |a| a.id.as_str())
    }

    pub fn enrich_therapies(&self, updates: &[Therapy]) -> usize {
        enrich_all(&self.therapies, updates, |t| t.id.as_str())
    }

    pub fn enrich_trials(&self, updates: &[ClinicalTrial]) -> usize {
        enrich_all(&self.trials, updates, |t| t.id.as_str())
    }
}

impl KnowledgeStore for InMemoryStore {
    fn diseases(&self) -> Vec<Disease> {
        read(&self.diseases).clone()
    }

    fn proteins(&self) -> Vec<Protein> {
        read(&self.proteins).clone()
    }

    fn associations(&self) -> Vec<Association> {
        read(&self.associations).clone()
    }

    fn therapies(&self) -> Vec<Therapy> {
        read(&self.therapies).clone()
    }

    fn trials(&self) -> Vec<ClinicalTrial> {
        read(&self.trials).clone()
    }

    fn disease(&self, id: &str) -> Option<Disease> {
        read(&self.diseases).iter().find(|d| d.id == id).cloned()
    }

    fn protein(&self, id: &str) -> Option<Protein> {
        read(&self.proteins).iter().find(|p| p.id == id).cloned()
    }

    fn associations_for_disease(&self, disease_id: &str) -> Vec<Association> {
        filtered(&self.associations, |a| a.disease_id == disease_id)
    }

    fn associations_for_protein(&self, protein_id: &str) -> Vec<Association> {
        filtered(&self.associations, |a| a.protein_id == protein_id)
    }

    fn therapies_for_protein(&self, protein_id: &str) -> Vec<Therapy> {
        filtered(&self.therapies, |t| t.target_protein_id == protein_id)
    }

    fn trials_for_protein(&self, protein_id: &str) -> Vec<ClinicalTrial> {
        filtered(&self.trials, |t| t.target_protein_id.as_deref() == Some(protein_id))
    }
}
