use serde::{Deserialize, Serialize};

use crate::model::{common::CandidateId, election::CommitHash};

/// A direct vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub candidate_id: CandidateId,
}

/// A sealed ballot: the hex digest of `(candidate_id, nonce, voter)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub commit_hash: CommitHash,
}

/// The opening of a previously committed ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealRequest {
    pub candidate_id: CandidateId,
    pub nonce: u128,
}
