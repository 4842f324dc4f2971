use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::common::Identity;

/// Per-identity voting status. Each flag only ever moves from false to true,
/// except that the owner may strike an identity off the whitelist before voting opens.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub is_eligible: bool,
    pub has_registered_to_vote: bool,
    pub has_voted: bool,
}

/// Voter records plus running counters.
/// The counters are maintained on every transition and never recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRegistry {
    records: HashMap<Identity, VoterRecord>,
    total_eligible_voters: u64,
    total_registered_voters: u64,
}

impl VoterRegistry {
    /// The record for `identity`; identities never seen have an all-false record.
    pub fn record(&self, identity: &Identity) -> VoterRecord {
        self.records.get(identity).copied().unwrap_or_default()
    }

    pub fn is_eligible(&self, identity: &Identity) -> bool {
        self.record(identity).is_eligible
    }

    pub fn total_eligible_voters(&self) -> u64 {
        self.total_eligible_voters
    }

    pub fn total_registered_voters(&self) -> u64 {
        self.total_registered_voters
    }

    /// Number of identities that have voted.
    pub fn voted_count(&self) -> u64 {
        self.records.values().filter(|record| record.has_voted).count() as u64
    }

    /// Mark `identity` eligible. Returns whether this was a real transition.
    pub(super) fn grant(&mut self, identity: &Identity) -> bool {
        let record = self.records.entry(identity.clone()).or_default();
        if record.is_eligible {
            return false;
        }
        record.is_eligible = true;
        self.total_eligible_voters += 1;
        true
    }

    /// Strike `identity` off the eligible list. Returns whether this was a real transition.
    pub(super) fn revoke(&mut self, identity: &Identity) -> bool {
        match self.records.get_mut(identity) {
            Some(record) if record.is_eligible => {
                record.is_eligible = false;
                self.total_eligible_voters -= 1;
                true
            }
            _ => false,
        }
    }

    /// Mark `identity` eligible (if not already) and registered.
    pub(super) fn register(&mut self, identity: &Identity) {
        self.grant(identity);
        let record = self.records.entry(identity.clone()).or_default();
        if !record.has_registered_to_vote {
            record.has_registered_to_vote = true;
            self.total_registered_voters += 1;
        }
    }

    pub(super) fn mark_voted(&mut self, identity: &Identity) {
        self.records.entry(identity.clone()).or_default().has_voted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str) -> Identity {
        Identity::new(name).unwrap()
    }

    #[test]
    fn unknown_identities_have_empty_records() {
        let registry = VoterRegistry::default();
        assert_eq!(registry.record(&identity("nobody")), VoterRecord::default());
        assert!(!registry.is_eligible(&identity("nobody")));
    }

    #[test]
    fn counters_move_only_on_transitions() {
        let mut registry = VoterRegistry::default();
        let alice = identity("alice");

        assert!(registry.grant(&alice));
        assert!(!registry.grant(&alice));
        assert_eq!(registry.total_eligible_voters(), 1);

        assert!(registry.revoke(&alice));
        assert!(!registry.revoke(&alice));
        assert!(!registry.revoke(&identity("stranger")));
        assert_eq!(registry.total_eligible_voters(), 0);
    }

    #[test]
    fn registration_grants_and_counts_once() {
        let mut registry = VoterRegistry::default();
        let alice = identity("alice");
        let bob = identity("bob");

        registry.grant(&alice);
        registry.register(&alice);
        registry.register(&bob);

        assert_eq!(registry.total_eligible_voters(), 2);
        assert_eq!(registry.total_registered_voters(), 2);
        assert_eq!(
            registry.record(&bob),
            VoterRecord {
                is_eligible: true,
                has_registered_to_vote: true,
                has_voted: false,
            }
        );
    }

    #[test]
    fn voting_is_recorded() {
        let mut registry = VoterRegistry::default();
        let alice = identity("alice");
        registry.register(&alice);
        registry.mark_voted(&alice);
        assert!(registry.record(&alice).has_voted);
        assert_eq!(registry.voted_count(), 1);
    }
}
