use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::Result;
use crate::model::{
    api::election::ElectionDescription,
    common::ElectionId,
    election::{self, Election},
    registry::ElectionRegistry,
};

/// Run a read-only operation against one election.
///
/// The clock is read only once the election's lock is held, so every
/// operation on an election sees a time no earlier than the one before it.
pub async fn read_election<T>(
    registry: &ElectionRegistry,
    clock: &Clock,
    election_id: ElectionId,
    op: impl FnOnce(&Election, DateTime<Utc>) -> election::Result<T>,
) -> Result<T> {
    let handle = registry.instance(election_id).await?;
    let instance = handle.lock().await;
    let election = instance.election()?;
    Ok(op(election, clock.now())?)
}

/// Run a mutating operation against one election, under its lock.
pub async fn update_election<T>(
    registry: &ElectionRegistry,
    clock: &Clock,
    election_id: ElectionId,
    op: impl FnOnce(&mut Election, DateTime<Utc>) -> election::Result<T>,
) -> Result<T> {
    let handle = registry.instance(election_id).await?;
    let mut instance = handle.lock().await;
    let election = instance.election_mut()?;
    Ok(op(election, clock.now())?)
}

/// Describe one election as it stands now.
pub async fn describe_election(
    registry: &ElectionRegistry,
    clock: &Clock,
    election_id: ElectionId,
) -> Result<ElectionDescription> {
    let handle = registry.instance(election_id).await?;
    let instance = handle.lock().await;
    let election = instance.election()?;
    Ok(ElectionDescription::new(
        election,
        instance.logic_version(),
        clock.now(),
    ))
}
