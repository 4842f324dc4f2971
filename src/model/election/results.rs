use serde::{Deserialize, Serialize};

use crate::model::common::CandidateId;

use super::candidates::Candidate;
use super::config::{ElectionConfig, Phase};
use super::emergency::EmergencyState;

/// Public view of one candidate's tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
}

impl From<&Candidate> for CandidateTally {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            vote_count: candidate.vote_count,
        }
    }
}

/// Current results of an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResults {
    /// Active candidates in ascending ID order.
    pub candidates: Vec<CandidateTally>,
    pub total_votes: u64,
    /// Whole percentage of eligible voters who voted, rounded down.
    pub participation_rate: u64,
}

/// `floor(total_votes * 100 / total_eligible)`, or 0 when nobody is eligible.
pub fn participation_rate(total_votes: u64, total_eligible: u64) -> u64 {
    if total_eligible == 0 {
        0
    } else {
        total_votes.saturating_mul(100) / total_eligible
    }
}

/// The first candidate in ID order with the highest vote count.
pub fn winner<'a>(candidates: impl IntoIterator<Item = &'a Candidate>) -> Option<CandidateTally> {
    let mut best: Option<&Candidate> = None;
    for candidate in candidates {
        match best {
            // Strictly greater: ties keep the earlier (lower) ID.
            Some(current) if candidate.vote_count <= current.vote_count => {}
            _ => best = Some(candidate),
        }
    }
    best.map(CandidateTally::from)
}

/// Candidates by vote count descending, ties broken by ascending ID.
pub fn leaderboard<'a>(candidates: impl IntoIterator<Item = &'a Candidate>) -> Vec<CandidateTally> {
    let mut board = candidates
        .into_iter()
        .map(CandidateTally::from)
        .collect::<Vec<_>>();
    board.sort_by(|a, b| b.vote_count.cmp(&a.vote_count).then(a.id.cmp(&b.id)));
    board
}

/// Are results visible to this caller right now?
pub fn results_visible(
    config: &ElectionConfig,
    phase: Phase,
    emergency: &EmergencyState,
    caller_is_owner: bool,
) -> bool {
    caller_is_owner
        || config.results_public
        || (phase == Phase::Ongoing && config.live_results_enabled)
        || (phase == Phase::Ended && !emergency.is_emergency_stopped)
        || (emergency.is_emergency_stopped && emergency.allow_results_after_emergency)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: CandidateId, vote_count: u64) -> Candidate {
        Candidate {
            id,
            name: format!("Candidate {id}"),
            description: String::new(),
            vote_count,
            is_active: true,
        }
    }

    #[test]
    fn participation_rounds_down() {
        assert_eq!(participation_rate(0, 0), 0);
        assert_eq!(participation_rate(5, 0), 0);
        assert_eq!(participation_rate(1, 3), 33);
        assert_eq!(participation_rate(2, 3), 66);
        assert_eq!(participation_rate(3, 3), 100);
    }

    #[test]
    fn winner_tie_goes_to_lowest_id() {
        let candidates = vec![candidate(0, 1), candidate(1, 1)];
        assert_eq!(winner(&candidates).unwrap().id, 0);

        let candidates = vec![candidate(0, 1), candidate(1, 3), candidate(2, 3)];
        assert_eq!(winner(&candidates).unwrap().id, 1);

        let candidates = vec![candidate(0, 0), candidate(1, 0)];
        assert_eq!(winner(&candidates).unwrap().id, 0);

        assert_eq!(winner(&Vec::<Candidate>::new()), None);
    }

    #[test]
    fn leaderboard_is_deterministic() {
        let candidates = vec![
            candidate(0, 2),
            candidate(1, 5),
            candidate(2, 2),
            candidate(3, 7),
            candidate(4, 5),
        ];
        let order = leaderboard(&candidates)
            .into_iter()
            .map(|tally| tally.id)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![3, 1, 4, 0, 2]);
    }

    #[test]
    fn visibility_gate() {
        let private = ElectionConfig::example();
        let running = EmergencyState::default();
        let stopped = EmergencyState {
            is_emergency_stopped: true,
            ..Default::default()
        };
        let stopped_visible = EmergencyState {
            is_emergency_stopped: true,
            allow_results_after_emergency: true,
            ..Default::default()
        };

        assert!(!results_visible(&private, Phase::NotStarted, &running, false));
        assert!(!results_visible(&private, Phase::Ongoing, &running, false));
        assert!(results_visible(&private, Phase::Ended, &running, false));
        assert!(!results_visible(&private, Phase::Ended, &stopped, false));
        assert!(results_visible(&private, Phase::Ended, &stopped_visible, false));
        assert!(results_visible(&private, Phase::Ongoing, &running, true));
        assert!(results_visible(&private, Phase::Ended, &stopped, true));

        let live = ElectionConfig {
            live_results_enabled: true,
            ..ElectionConfig::example()
        };
        assert!(results_visible(&live, Phase::Ongoing, &running, false));
        assert!(!results_visible(&live, Phase::NotStarted, &running, false));

        let public = ElectionConfig {
            results_public: true,
            ..ElectionConfig::example()
        };
        assert!(results_visible(&public, Phase::NotStarted, &running, false));
        assert!(results_visible(&public, Phase::Ended, &stopped, false));
    }
}
