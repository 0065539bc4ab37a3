//! Identifier derivation and collision handling.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

const TRIAL_LINK_BASE: &str = "https://clinicaltrials.gov/study/";

/// Deterministic NCT identifier for a trial that arrived without one.
/// `NCT` followed by 8 digits taken from the SHA-256 digest of the trial id.
pub fn synthesize_nct_id(trial_id: &str) -> String {
    let digest = Sha256::digest(trial_id.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let n = u64::from_be_bytes(head) % 100_000_000;
    format!("NCT{n:08}")
}

pub fn trial_link(nct_id: &str) -> String {
    format!("{TRIAL_LINK_BASE}{nct_id}")
}

/// `"Donepezil Hydrochloride"` → `"donepezil_hydrochloride"`.
pub fn therapy_id_from_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Hands out unique identifiers in input order.
///
/// The first record to claim an id keeps it. Later claimants get
/// `{id}_{n}` where `n` starts at the number of ids seen so far and
/// increments until the result is unused.
#[derive(Debug, Default)]
pub struct IdAllocator {
    seen: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the assigned id and whether it differs from the requested one.
    pub fn assign(&mut self, id: &str) -> (String, bool) {
        if self.seen.insert(id.to_string()) {
            return (id.to_string(), false);
        }
        let mut n = self.seen.len();
        loop {
            let candidate = format!("{id}_{n}");
            if self.seen.insert(candidate.clone()) {
                return (candidate, true);
            }
            n += 1;
        }
    }
}
