use rocket::{serde::json::Json, Route, State};

use crate::clock::Clock;
use crate::error::Result;
use crate::model::{
    api::{
        auth::AuthToken, candidate::CandidateView, election::ElectionDescription,
        voter::VoterView,
    },
    common::{CandidateId, ElectionId, Identity},
    election::{CandidateTally, ElectionEvent, ElectionResults, Phase},
    registry::ElectionRegistry,
};

use super::common::{describe_election, read_election};

pub fn routes() -> Vec<Route> {
    routes![
        election,
        election_status,
        candidates,
        candidate,
        voter,
        results,
        winner,
        leaderboard,
        events,
    ]
}

#[get("/elections/<election_id>")]
async fn election(
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<ElectionDescription>> {
    Ok(Json(describe_election(registry, clock, election_id).await?))
}

#[get("/elections/<election_id>/status")]
async fn election_status(
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<Phase>> {
    let phase = read_election(registry, clock, election_id, |election, now| {
        Ok(election.status(now))
    })
    .await?;
    Ok(Json(phase))
}

/// Every candidate, including withdrawn ones, in ID order.
///
/// Vote counts are included only for callers who may see results.
#[get("/elections/<election_id>/candidates")]
async fn candidates(
    token: Option<AuthToken>,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<Vec<CandidateView>>> {
    let caller = token.map(|token| token.id);
    let candidates = read_election(registry, clock, election_id, |election, now| {
        let show_counts = election.results_visible_to(caller.as_ref(), now);
        Ok(election
            .candidates()
            .map(|candidate| CandidateView::new(candidate, show_counts))
            .collect())
    })
    .await?;
    Ok(Json(candidates))
}

#[get("/elections/<election_id>/candidates/<candidate_id>")]
async fn candidate(
    token: Option<AuthToken>,
    election_id: ElectionId,
    candidate_id: CandidateId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<CandidateView>> {
    let caller = token.map(|token| token.id);
    let candidate = read_election(registry, clock, election_id, |election, now| {
        let show_count = election.results_visible_to(caller.as_ref(), now);
        Ok(CandidateView::new(election.candidate(candidate_id)?, show_count))
    })
    .await?;
    Ok(Json(candidate))
}

#[get("/elections/<election_id>/voters/<identity>")]
async fn voter(
    election_id: ElectionId,
    identity: Identity,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<VoterView>> {
    let view = read_election(registry, clock, election_id, |election, _| {
        Ok(VoterView::new(election, identity))
    })
    .await?;
    Ok(Json(view))
}

/// Signed-in owners always see results; everyone else is subject to the visibility rules.
#[get("/elections/<election_id>/results")]
async fn results(
    token: Option<AuthToken>,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<ElectionResults>> {
    let caller = token.map(|token| token.id);
    let results = read_election(registry, clock, election_id, |election, now| {
        election.results(caller.as_ref(), now)
    })
    .await?;
    Ok(Json(results))
}

#[get("/elections/<election_id>/winner")]
async fn winner(
    token: Option<AuthToken>,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<CandidateTally>> {
    let caller = token.map(|token| token.id);
    let winner = read_election(registry, clock, election_id, |election, now| {
        election.winner(caller.as_ref(), now)
    })
    .await?;
    Ok(Json(winner))
}

#[get("/elections/<election_id>/leaderboard")]
async fn leaderboard(
    token: Option<AuthToken>,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<Vec<CandidateTally>>> {
    let caller = token.map(|token| token.id);
    let board = read_election(registry, clock, election_id, |election, now| {
        election.leaderboard(caller.as_ref(), now)
    })
    .await?;
    Ok(Json(board))
}

/// Notifications from index `since` onwards.
#[get("/elections/<election_id>/events?<since>")]
async fn events(
    election_id: ElectionId,
    since: Option<usize>,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<Vec<ElectionEvent>>> {
    let events = read_election(registry, clock, election_id, |election, _| {
        let events = election.events();
        let from = since.unwrap_or_default().min(events.len());
        Ok(events[from..].to_vec())
    })
    .await?;
    Ok(Json(events))
}
