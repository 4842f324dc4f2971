use rocket::{serde::json::Json, Route, State};

use crate::clock::Clock;
use crate::error::Result;
use crate::model::{
    api::{
        auth::AuthToken,
        ballot::{CommitRequest, RevealRequest, VoteRequest},
        candidate::CandidateView,
        election::CandidateSpec,
    },
    common::ElectionId,
    oracle::SharedOracle,
    registry::ElectionRegistry,
};

use super::common::{read_election, update_election};

pub fn routes() -> Vec<Route> {
    routes![register_candidate, register_to_vote, vote, commit_vote, reveal_vote]
}

#[post("/elections/<election_id>/candidates", data = "<candidate>", format = "json")]
async fn register_candidate(
    token: AuthToken,
    election_id: ElectionId,
    candidate: Json<CandidateSpec>,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<CandidateView>> {
    let CandidateSpec { name, description } = candidate.into_inner();
    let candidate = update_election(registry, clock, election_id, |election, now| {
        let candidate_id = election.register_candidate(&token.id, name, description, now)?;
        let show_count = election.results_visible_to(Some(&token.id), now);
        Ok(CandidateView::new(election.candidate(candidate_id)?, show_count))
    })
    .await?;
    Ok(Json(candidate))
}

/// Holdings-based elections consult the balance oracle without holding the
/// election's lock; the registration is then re-checked under the lock.
#[post("/elections/<election_id>/register")]
async fn register_to_vote(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
    oracle: &State<SharedOracle>,
) -> Result<()> {
    let asset = read_election(registry, clock, election_id, |election, now| {
        election.check_can_register(&token.id, now)
    })
    .await?;

    let holdings = match &asset {
        Some(asset) => Some(oracle.balance_of(&token.id, asset).await?),
        None => None,
    };

    update_election(registry, clock, election_id, |election, now| {
        election.confirm_holdings_asset(asset.as_ref())?;
        election.register_to_vote(&token.id, holdings, now)
    })
    .await
}

#[post("/elections/<election_id>/vote", data = "<ballot>", format = "json")]
async fn vote(
    token: AuthToken,
    election_id: ElectionId,
    ballot: Json<VoteRequest>,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<()> {
    update_election(registry, clock, election_id, |election, now| {
        election.vote(&token.id, ballot.candidate_id, now)
    })
    .await
}

#[post("/elections/<election_id>/commit", data = "<commitment>", format = "json")]
async fn commit_vote(
    token: AuthToken,
    election_id: ElectionId,
    commitment: Json<CommitRequest>,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<()> {
    update_election(registry, clock, election_id, |election, now| {
        election.commit_vote(&token.id, commitment.commit_hash, now)
    })
    .await
}

#[post("/elections/<election_id>/reveal", data = "<opening>", format = "json")]
async fn reveal_vote(
    token: AuthToken,
    election_id: ElectionId,
    opening: Json<RevealRequest>,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<()> {
    update_election(registry, clock, election_id, |election, now| {
        election.reveal_vote(&token.id, opening.candidate_id, opening.nonce, now)
    })
    .await
}
