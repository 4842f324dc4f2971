use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::common::{CandidateId, Identity};

use super::error::{ElectionError, Result};

/// A single candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Sequential ID, assigned once and never reused.
    pub id: CandidateId,
    pub name: String,
    pub description: String,
    pub vote_count: u64,
    /// Nothing currently deactivates a candidate; the flag is kept for inactive-candidate checks.
    pub is_active: bool,
}

/// All candidates ever registered in an election, in ID order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRegistry {
    candidates: Vec<Candidate>,
    /// Every name ever used, including those of deactivated candidates.
    names: HashSet<String>,
    /// Every identity that has stood as a candidate.
    registrants: HashSet<Identity>,
}

impl CandidateRegistry {
    /// Number of candidates ever registered; also the next ID to be issued.
    pub fn count(&self) -> u32 {
        // IDs are u32 and issued from this length, so it always fits.
        self.candidates.len() as u32
    }

    pub fn get(&self, id: CandidateId) -> Result<&Candidate> {
        self.candidates
            .get(id as usize)
            .ok_or_else(|| ElectionError::not_found(format!("candidate with ID {id}")))
    }

    /// A candidate that may currently receive votes.
    pub fn votable(&self, id: CandidateId) -> Result<&Candidate> {
        let candidate = self.get(id)?;
        if !candidate.is_active {
            return Err(ElectionError::validation(format!(
                "candidate {id} is not active"
            )));
        }
        Ok(candidate)
    }

    /// All candidates in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// Active candidates in ascending ID order.
    pub fn active(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|candidate| candidate.is_active)
    }

    /// Check that a new candidacy would be accepted, without recording it.
    pub fn check_new(&self, name: &str, registrant: &Identity) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ElectionError::validation("candidate name must not be empty"));
        }
        if self.names.contains(name) {
            return Err(ElectionError::validation(format!(
                "candidate name {name:?} is already in use"
            )));
        }
        if self.registrants.contains(registrant) {
            return Err(ElectionError::already_done(format!(
                "{registrant} already holds a candidacy"
            )));
        }
        Ok(())
    }

    /// Record a new candidacy and return its ID.
    /// Callers must have run [`Self::check_new`] first.
    pub(super) fn insert(
        &mut self,
        name: String,
        description: String,
        registrant: Identity,
    ) -> CandidateId {
        let id = self.count();
        self.names.insert(name.clone());
        self.registrants.insert(registrant);
        self.candidates.push(Candidate {
            id,
            name,
            description,
            vote_count: 0,
            is_active: true,
        });
        id
    }

    /// Count one vote. Callers must have run [`Self::votable`] first.
    pub(super) fn record_vote(&mut self, id: CandidateId) {
        if let Some(candidate) = self.candidates.get_mut(id as usize) {
            candidate.vote_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str) -> Identity {
        Identity::new(name).unwrap()
    }

    fn registry_with(names: &[&str]) -> CandidateRegistry {
        let mut registry = CandidateRegistry::default();
        for name in names {
            let registrant = identity(&format!("{name}-registrant"));
            registry.check_new(name, &registrant).unwrap();
            registry.insert(name.to_string(), String::new(), registrant);
        }
        registry
    }

    #[test]
    fn ids_are_sequential() {
        let registry = registry_with(&["Alice", "Bob", "Carol"]);
        assert_eq!(registry.count(), 3);
        let ids = registry.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(registry.get(1).unwrap().name, "Bob");
        assert!(matches!(registry.get(3), Err(ElectionError::NotFound(_))));
    }

    #[test]
    fn names_and_registrants_are_unique() {
        let registry = registry_with(&["Alice"]);

        assert!(matches!(
            registry.check_new("Alice", &identity("someone-else")),
            Err(ElectionError::Validation(_))
        ));
        assert!(matches!(
            registry.check_new("", &identity("someone-else")),
            Err(ElectionError::Validation(_))
        ));
        assert!(matches!(
            registry.check_new(" \t ", &identity("someone-else")),
            Err(ElectionError::Validation(_))
        ));
        assert!(registry.check_new(" Bob ", &identity("someone-else")).is_ok());
        assert!(matches!(
            registry.check_new("Alicia", &identity("Alice-registrant")),
            Err(ElectionError::AlreadyDone(_))
        ));
        assert!(registry.check_new("Alicia", &identity("someone-else")).is_ok());
    }

    #[test]
    fn deactivated_names_stay_reserved() {
        let mut registry = registry_with(&["Alice"]);
        registry.candidates[0].is_active = false;

        assert!(matches!(
            registry.votable(0),
            Err(ElectionError::Validation(_))
        ));
        assert_eq!(registry.active().count(), 0);
        assert!(matches!(
            registry.check_new("Alice", &identity("newcomer")),
            Err(ElectionError::Validation(_))
        ));
    }

    #[test]
    fn votes_accumulate() {
        let mut registry = registry_with(&["Alice", "Bob"]);
        registry.record_vote(1);
        registry.record_vote(1);
        registry.record_vote(0);
        assert_eq!(registry.get(0).unwrap().vote_count, 1);
        assert_eq!(registry.get(1).unwrap().vote_count, 2);
        assert_eq!(registry.iter().map(|c| c.vote_count).sum::<u64>(), 3);
    }
}
