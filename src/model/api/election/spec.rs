use serde::{Deserialize, Serialize};

use crate::model::{
    common::Identity,
    election::{ElectionConfig, EligibilityPolicy},
};

/// An election specification, used both to create an election and to replace its settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSpec {
    /// Times, tally mode and visibility flags.
    pub config: ElectionConfig,
    /// Who may register to vote.
    pub eligibility: EligibilityPolicy,
}

/// A request to stand as a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A batch of identities to add to or strike off the whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistUpdate {
    pub voters: Vec<Identity>,
}
