use serde::{Deserialize, Serialize};

use crate::model::{
    common::Identity,
    election::{Election, VoteCommit, VoterRecord},
};

/// Everything an election knows about one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterView {
    pub identity: Identity,
    #[serde(flatten)]
    pub record: VoterRecord,
    /// Only present for commit-reveal elections in which this identity has committed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<VoteCommit>,
}

impl VoterView {
    pub fn new(election: &Election, identity: Identity) -> Self {
        Self {
            record: election.voter(&identity),
            commitment: election.commitment(&identity).copied(),
            identity,
        }
    }
}
