use serde::{Deserialize, Serialize};

use crate::model::{common::CandidateId, election::Candidate};

/// A candidate as seen by one caller.
///
/// `vote_count` is only present while that caller may see results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateView {
    pub id: CandidateId,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
}

impl CandidateView {
    pub fn new(candidate: &Candidate, show_count: bool) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            description: candidate.description.clone(),
            is_active: candidate.is_active,
            vote_count: show_count.then_some(candidate.vote_count),
        }
    }
}
