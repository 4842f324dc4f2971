use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::{CandidateId, Identity};

/// A state-change notification, stamped with the time of the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    ElectionCreated { owner: Identity, title: String },
    SettingsUpdated { owner: Identity },
    CandidateRegistered { candidate_id: CandidateId, name: String, registrant: Identity },
    VoterEligibilityChanged { voter: Identity, eligible: bool },
    VoterRegistered { voter: Identity },
    /// Ballot contents are never part of a notification.
    VoteCast { voter: Identity },
    VoteCommitted { voter: Identity },
    VoteRevealed { voter: Identity },
    RevealPhaseStarted { owner: Identity },
    EmergencyStopped { owner: Identity },
    ResultsVisibilityChanged { visible: bool },
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElectionCreated { owner, title } => {
                write!(f, "election {title:?} created by {owner}")
            }
            Self::SettingsUpdated { owner } => write!(f, "settings updated by {owner}"),
            Self::CandidateRegistered {
                candidate_id,
                name,
                registrant,
            } => write!(
                f,
                "candidate {candidate_id} ({name:?}) registered by {registrant}"
            ),
            Self::VoterEligibilityChanged { voter, eligible } => {
                write!(f, "eligibility of {voter} set to {eligible}")
            }
            Self::VoterRegistered { voter } => write!(f, "voter {voter} registered"),
            Self::VoteCast { voter } => write!(f, "{voter} cast a vote"),
            Self::VoteCommitted { voter } => write!(f, "{voter} committed a vote"),
            Self::VoteRevealed { voter } => write!(f, "{voter} revealed a vote"),
            Self::RevealPhaseStarted { owner } => write!(f, "reveal phase started by {owner}"),
            Self::EmergencyStopped { owner } => write!(f, "emergency stop by {owner}"),
            Self::ResultsVisibilityChanged { visible } => {
                write!(f, "post-emergency results visibility set to {visible}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::{serde_json, Value};

    use super::*;
    use crate::model::election::config::examples::t;

    #[test]
    fn events_serialize_flat() {
        let event = ElectionEvent {
            at: t(50),
            kind: EventKind::VoteCast {
                voter: Identity::new("alice").unwrap(),
            },
        };
        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "vote_cast");
        assert_eq!(value["voter"], "alice");
        assert!(value.get("candidate_id").is_none());
        assert!(value["at"].is_string());
    }
}
