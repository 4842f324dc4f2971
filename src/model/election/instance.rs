use chrono::{DateTime, Utc};

use crate::model::common::{ElectionId, Identity};

use super::config::ElectionConfig;
use super::election_core::Election;
use super::eligibility::EligibilityPolicy;
use super::error::{ElectionError, Result};

/// A slot in the registry holding at most one election.
///
/// The slot is created empty and initialized exactly once; every other
/// operation is rejected until then.
#[derive(Debug)]
pub struct ElectionInstance {
    id: ElectionId,
    logic_version: u32,
    election: Option<Election>,
}

impl ElectionInstance {
    pub fn new(id: ElectionId, logic_version: u32) -> Self {
        Self {
            id,
            logic_version,
            election: None,
        }
    }

    pub fn id(&self) -> ElectionId {
        self.id
    }

    /// The registry logic version this instance was created under.
    pub fn logic_version(&self) -> u32 {
        self.logic_version
    }

    pub fn is_initialized(&self) -> bool {
        self.election.is_some()
    }

    /// Create the election held by this instance, owned by `owner`.
    pub fn initialize(
        &mut self,
        owner: Identity,
        config: ElectionConfig,
        eligibility: EligibilityPolicy,
        now: DateTime<Utc>,
    ) -> Result<&Election> {
        if self.election.is_some() {
            return Err(ElectionError::already_done(format!(
                "election {} is already initialized",
                self.id
            )));
        }
        let election = Election::new(self.id, owner, config, eligibility, now)?;
        Ok(self.election.insert(election))
    }

    pub fn election(&self) -> Result<&Election> {
        let id = self.id;
        self.election
            .as_ref()
            .ok_or_else(|| ElectionError::state(format!("election {id} is not initialized")))
    }

    pub fn election_mut(&mut self) -> Result<&mut Election> {
        let id = self.id;
        self.election
            .as_mut()
            .ok_or_else(|| ElectionError::state(format!("election {id} is not initialized")))
    }
}
