use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::model::common::{CandidateId, Identity};

use super::error::{ElectionError, Result};

/// A SHA-256 commitment to a ballot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CommitHash([u8; 32]);

impl CommitHash {
    /// Commit to `candidate_id` under `nonce`, bound to `voter`.
    ///
    /// The preimage is the candidate ID (4 bytes, big-endian), then the nonce
    /// (16 bytes, big-endian), then the voter identity's UTF-8 bytes.
    pub fn compute(candidate_id: CandidateId, nonce: u128, voter: &Identity) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(candidate_id.to_be_bytes());
        hasher.update(nonce.to_be_bytes());
        hasher.update(voter.as_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for CommitHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Display for CommitHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&HEXLOWER.encode(&self.0))
    }
}

impl FromStr for CommitHash {
    type Err = ElectionError;

    /// Parse hex in either case, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = HEXLOWER_PERMISSIVE
            .decode(digits.as_bytes())
            .map_err(|e| ElectionError::validation(format!("commitment is not valid hex: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            ElectionError::validation(format!(
                "commitment must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for CommitHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CommitHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// One voter's commitment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCommit {
    pub commit_hash: CommitHash,
    pub has_committed: bool,
    pub has_revealed: bool,
}

impl VoteCommit {
    /// Does `(candidate_id, nonce, voter)` open this commitment?
    pub fn opens_to(&self, candidate_id: CandidateId, nonce: u128, voter: &Identity) -> bool {
        CommitHash::compute(candidate_id, nonce, voter) == self.commit_hash
    }
}

/// All commitments made in an election.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitBook {
    commits: HashMap<Identity, VoteCommit>,
    /// Informational only; reveals are gated by the reveal deadline.
    reveal_phase_started: bool,
}

impl CommitBook {
    pub fn get(&self, voter: &Identity) -> Option<&VoteCommit> {
        self.commits.get(voter)
    }

    pub fn has_committed(&self, voter: &Identity) -> bool {
        self.commits
            .get(voter)
            .map_or(false, |commit| commit.has_committed)
    }

    pub fn reveal_phase_started(&self) -> bool {
        self.reveal_phase_started
    }

    /// The caller's commitment, provided it has not been revealed yet.
    pub fn pending(&self, voter: &Identity) -> Result<&VoteCommit> {
        let commit = self
            .commits
            .get(voter)
            .filter(|commit| commit.has_committed)
            .ok_or_else(|| ElectionError::state(format!("{voter} has no commitment to reveal")))?;
        if commit.has_revealed {
            return Err(ElectionError::already_done(format!(
                "{voter} has already revealed their vote"
            )));
        }
        Ok(commit)
    }

    pub(super) fn commit(&mut self, voter: &Identity, commit_hash: CommitHash) {
        self.commits.insert(
            voter.clone(),
            VoteCommit {
                commit_hash,
                has_committed: true,
                has_revealed: false,
            },
        );
    }

    pub(super) fn mark_revealed(&mut self, voter: &Identity) {
        if let Some(commit) = self.commits.get_mut(voter) {
            commit.has_revealed = true;
        }
    }

    pub(super) fn start_reveal_phase(&mut self) {
        self.reveal_phase_started = true;
    }
}
