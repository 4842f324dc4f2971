use std::collections::BTreeMap;
use std::sync::Arc;

use rocket::tokio::sync::{Mutex, RwLock};

use crate::clock::Clock;
use crate::model::api::election::{ElectionSpec, ElectionSummary};
use crate::model::common::{ElectionId, Identity};
use crate::model::election::{ElectionError, ElectionInstance, Result};

/// A single election instance, behind its own lock.
/// Holding the guard is the exclusive-access scope for one operation.
pub type InstanceHandle = Arc<Mutex<ElectionInstance>>;

struct Entry {
    creator: Identity,
    instance: InstanceHandle,
}

/// Creates and tracks election instances.
pub struct ElectionRegistry {
    instances: RwLock<BTreeMap<ElectionId, Entry>>,
    logic_version: RwLock<u32>,
    upgrade_authority: Identity,
}

impl ElectionRegistry {
    pub fn new(upgrade_authority: Identity) -> Self {
        Self {
            instances: RwLock::new(BTreeMap::new()),
            logic_version: RwLock::new(1),
            upgrade_authority,
        }
    }

    /// Create and initialize a new instance owned by `creator`.
    ///
    /// Ids are sequential and only consumed by a successful initialization.
    pub async fn create_instance(
        &self,
        creator: &Identity,
        spec: ElectionSpec,
        clock: &Clock,
    ) -> Result<ElectionId> {
        let mut instances = self.instances.write().await;
        let id = instances
            .keys()
            .next_back()
            .map_or(0, |last| last + 1);
        let mut instance = ElectionInstance::new(id, *self.logic_version.read().await);
        instance.initialize(creator.clone(), spec.config, spec.eligibility, clock.now())?;

        instances.insert(
            id,
            Entry {
                creator: creator.clone(),
                instance: Arc::new(Mutex::new(instance)),
            },
        );
        info!("Election {id} created by {creator}");
        Ok(id)
    }

    pub async fn instance(&self, id: ElectionId) -> Result<InstanceHandle> {
        self.instances
            .read()
            .await
            .get(&id)
            .map(|entry| entry.instance.clone())
            .ok_or_else(|| ElectionError::not_found(format!("election {id}")))
    }

    /// Summaries of every instance, in id order.
    pub async fn list_instances(&self) -> Vec<ElectionSummary> {
        self.summaries(|_| true).await
    }

    /// Summaries of the instances created by `creator`, in id order.
    pub async fn instances_by_creator(&self, creator: &Identity) -> Vec<ElectionSummary> {
        self.summaries(|entry| &entry.creator == creator).await
    }

    pub async fn logic_version(&self) -> u32 {
        *self.logic_version.read().await
    }

    pub fn authorize_upgrade(&self, caller: &Identity) -> Result<()> {
        if caller != &self.upgrade_authority {
            return Err(ElectionError::unauthorized(format!(
                "{caller} is not the upgrade authority"
            )));
        }
        Ok(())
    }

    /// Move the logic version used for new instances forward to `version`.
    pub async fn upgrade_logic(&self, caller: &Identity, version: u32) -> Result<u32> {
        self.authorize_upgrade(caller)?;
        let mut current = self.logic_version.write().await;
        if version <= *current {
            return Err(ElectionError::validation(format!(
                "logic version must increase beyond {}",
                *current
            )));
        }
        *current = version;
        warn!("Election logic upgraded to version {version} by {caller}");
        Ok(version)
    }

    async fn summaries(&self, mut filter: impl FnMut(&Entry) -> bool) -> Vec<ElectionSummary> {
        let handles = self
            .instances
            .read()
            .await
            .values()
            .filter(|&entry| filter(entry))
            .map(|entry| entry.instance.clone())
            .collect::<Vec<_>>();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let instance = handle.lock().await;
            if let Ok(election) = instance.election() {
                summaries.push(ElectionSummary::new(election, instance.logic_version()));
            }
        }
        summaries
    }
}
