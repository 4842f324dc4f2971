use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ElectionId, Identity},
    election::{Election, ElectionConfig, EligibilityPolicy, EmergencyState, Phase},
};

/// A full description of an election as it stands at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    /// Election unique ID.
    pub id: ElectionId,
    /// Election owner.
    pub owner: Identity,
    /// Registry logic version the election was created under.
    pub logic_version: u32,
    pub config: ElectionConfig,
    pub eligibility: EligibilityPolicy,
    /// Phase at the time of the request.
    pub status: Phase,
    /// Last instant a commitment may be revealed, for commit-reveal elections.
    pub reveal_deadline: Option<DateTime<Utc>>,
    pub reveal_phase_started: bool,
    pub emergency: EmergencyState,
    pub candidate_count: u32,
    pub total_eligible_voters: u64,
    pub total_registered_voters: u64,
    pub total_votes: u64,
}

impl ElectionDescription {
    pub fn new(election: &Election, logic_version: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: election.id(),
            owner: election.owner().clone(),
            logic_version,
            config: election.config().clone(),
            eligibility: election.eligibility().clone(),
            status: election.status(now),
            reveal_deadline: election.reveal_deadline(),
            reveal_phase_started: election.reveal_phase_started(),
            emergency: election.emergency().clone(),
            candidate_count: election.candidate_count(),
            total_eligible_voters: election.total_eligible_voters(),
            total_registered_voters: election.total_registered_voters(),
            total_votes: election.total_votes(),
        }
    }
}

/// A summary of an election, shorter than the full `ElectionDescription`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub id: ElectionId,
    pub owner: Identity,
    pub title: String,
    pub logic_version: u32,
}

impl ElectionSummary {
    pub fn new(election: &Election, logic_version: u32) -> Self {
        Self {
            id: election.id(),
            owner: election.owner().clone(),
            title: election.config().title.clone(),
            logic_version,
        }
    }
}
