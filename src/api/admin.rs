use rocket::{serde::json::Json, Route, State};

use crate::clock::Clock;
use crate::error::Result;
use crate::model::{
    api::{
        auth::AuthToken,
        election::{ElectionDescription, ElectionSpec, WhitelistUpdate},
    },
    common::ElectionId,
    registry::ElectionRegistry,
};

use super::common::{describe_election, update_election};

pub fn routes() -> Vec<Route> {
    routes![
        update_settings,
        add_to_whitelist,
        remove_from_whitelist,
        start_reveal_phase,
        emergency_stop,
        enable_results_after_emergency,
        disable_results_after_emergency,
    ]
}

#[put("/elections/<election_id>/settings", data = "<spec>", format = "json")]
async fn update_settings(
    token: AuthToken,
    election_id: ElectionId,
    spec: Json<ElectionSpec>,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<ElectionDescription>> {
    let ElectionSpec {
        config,
        eligibility,
    } = spec.into_inner();
    update_election(registry, clock, election_id, |election, now| {
        election.update_settings(&token.id, config, eligibility, now)
    })
    .await?;
    Ok(Json(describe_election(registry, clock, election_id).await?))
}

/// Returns how many identities were newly whitelisted.
#[post("/elections/<election_id>/whitelist", data = "<update>", format = "json")]
async fn add_to_whitelist(
    token: AuthToken,
    election_id: ElectionId,
    update: Json<WhitelistUpdate>,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<usize>> {
    let added = update_election(registry, clock, election_id, |election, now| {
        election.add_eligible_voters(&token.id, &update.voters, now)
    })
    .await?;
    Ok(Json(added))
}

/// Returns how many identities were actually struck off.
#[delete("/elections/<election_id>/whitelist", data = "<update>", format = "json")]
async fn remove_from_whitelist(
    token: AuthToken,
    election_id: ElectionId,
    update: Json<WhitelistUpdate>,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<usize>> {
    let removed = update_election(registry, clock, election_id, |election, now| {
        election.remove_eligible_voters(&token.id, &update.voters, now)
    })
    .await?;
    Ok(Json(removed))
}

#[post("/elections/<election_id>/reveal-phase")]
async fn start_reveal_phase(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<()> {
    update_election(registry, clock, election_id, |election, now| {
        election.start_reveal_phase(&token.id, now)
    })
    .await
}

#[post("/elections/<election_id>/emergency-stop")]
async fn emergency_stop(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<()> {
    update_election(registry, clock, election_id, |election, now| {
        election.emergency_stop(&token.id, now)
    })
    .await
}

#[post("/elections/<election_id>/emergency/results/enable")]
async fn enable_results_after_emergency(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<()> {
    update_election(registry, clock, election_id, |election, now| {
        election.enable_results_after_emergency(&token.id, now)
    })
    .await
}

#[post("/elections/<election_id>/emergency/results/disable")]
async fn disable_results_after_emergency(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<()> {
    update_election(registry, clock, election_id, |election, now| {
        election.disable_results_after_emergency(&token.id, now)
    })
    .await
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::clock::ManualClock;
    use crate::model::{
        api::{ballot::VoteRequest, voter::VoterView},
        election::{ElectionResults, EligibilityPolicy, Phase},
    };

    use super::super::common::testing::{
        create_election, get_as, identity, json_body, login, post_as, register_candidate,
        register_voter,
    };
    use super::*;

    async fn whitelist(
        client: &Client,
        method: &str,
        as_user: &str,
        election_id: ElectionId,
        voters: &[&str],
    ) -> (Status, Option<usize>) {
        let body = WhitelistUpdate {
            voters: voters.iter().map(|v| identity(v)).collect(),
        };
        let uri = format!("/elections/{election_id}/whitelist");
        let request = match method {
            "add" => client.post(uri),
            _ => client.delete(uri),
        };
        let response = request
            .header(ContentType::JSON)
            .cookie(login(client, as_user))
            .body(serde_json::to_string(&body).unwrap())
            .dispatch()
            .await;
        let status = response.status();
        let changed = if status == Status::Ok {
            Some(json_body(response).await)
        } else {
            None
        };
        (status, changed)
    }

    async fn voter_view(client: &Client, election_id: ElectionId, voter: &str) -> VoterView {
        let response = get_as(
            client,
            None,
            format!("/elections/{election_id}/voters/{voter}"),
        )
        .await;
        assert_eq!(response.status(), Status::Ok);
        json_body(response).await
    }

    #[backend_test]
    async fn whitelist_gates_registration(client: Client) {
        let election =
            create_election(&client, "owner", &ElectionSpec::whitelist_example()).await;

        let (status, _) = whitelist(&client, "add", "mallory", election.id, &["a"]).await;
        assert_eq!(status, Status::Forbidden);

        let (status, added) = whitelist(&client, "add", "owner", election.id, &["a", "b", "a"]).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(added, Some(2));

        let (_, removed) = whitelist(&client, "remove", "owner", election.id, &["b", "z"]).await;
        assert_eq!(removed, Some(1));

        register_voter(&client, election.id, "a").await;
        let response = post_as(
            &client,
            Some("b"),
            format!("/elections/{}/register", election.id),
            &(),
        )
        .await;
        assert_eq!(response.status(), Status::Forbidden);

        let view = voter_view(&client, election.id, "a").await;
        assert!(view.record.is_eligible);
        assert!(view.record.has_registered_to_vote);
        assert!(!view.record.has_voted);
        assert!(!voter_view(&client, election.id, "b").await.record.is_eligible);

        let description = describe(&client, election.id).await;
        assert_eq!(description.total_eligible_voters, 1);
        assert_eq!(description.total_registered_voters, 1);
    }

    #[backend_test]
    async fn whitelist_requires_whitelist_mode(client: Client) {
        let election = create_election(&client, "owner", &ElectionSpec::example()).await;
        let (status, _) = whitelist(&client, "add", "owner", election.id, &["a"]).await;
        assert_eq!(status, Status::UnprocessableEntity);
    }

    #[backend_test]
    async fn settings_can_change_until_voting_opens(client: Client, clock: ManualClock) {
        let election = create_election(&client, "owner", &ElectionSpec::example()).await;
        let uri = format!("/elections/{}/settings", election.id);
        let mut spec = ElectionSpec::whitelist_example();
        spec.config.title = "Renamed".to_string();
        spec.config.use_commit_reveal = true;

        let put = |name: &'static str, spec: &ElectionSpec| {
            client
                .put(uri.clone())
                .header(ContentType::JSON)
                .cookie(login(&client, name))
                .body(serde_json::to_string(spec).unwrap())
                .dispatch()
        };

        assert_eq!(put("mallory", &spec).await.status(), Status::Forbidden);

        let response = put("owner", &spec).await;
        assert_eq!(response.status(), Status::Ok);
        let updated: ElectionDescription = json_body(response).await;
        assert_eq!(updated.config.title, "Renamed");
        assert_eq!(updated.eligibility, EligibilityPolicy::Whitelist);
        assert_eq!(
            updated.reveal_deadline,
            Some(spec.config.end_time + Duration::days(1))
        );

        clock.set(spec.config.start_time);
        assert_eq!(put("owner", &spec).await.status(), Status::UnprocessableEntity);
    }

    #[backend_test]
    async fn emergency_stop_controls_visibility(client: Client, clock: ManualClock) {
        let election = create_election(&client, "owner", &ElectionSpec::example()).await;
        let id = election.id;
        register_candidate(&client, id, "owner", "A").await;
        register_voter(&client, id, "v1").await;

        clock.set(election.config.start_time + Duration::seconds(10));
        let response = post_as(
            &client,
            Some("v1"),
            format!("/elections/{id}/vote"),
            &VoteRequest { candidate_id: 0 },
        )
        .await;
        assert_eq!(response.status(), Status::Ok);

        let stop_uri = format!("/elections/{id}/emergency-stop");
        let enable_uri = format!("/elections/{id}/emergency/results/enable");
        let disable_uri = format!("/elections/{id}/emergency/results/disable");

        let response = post_as(&client, Some("owner"), enable_uri.clone(), &()).await;
        assert_eq!(response.status(), Status::UnprocessableEntity);
        let response = post_as(&client, Some("v1"), stop_uri.clone(), &()).await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = post_as(&client, Some("owner"), stop_uri.clone(), &()).await;
        assert_eq!(response.status(), Status::Ok);
        let response = post_as(&client, Some("owner"), stop_uri, &()).await;
        assert_eq!(response.status(), Status::Conflict);

        let description = describe(&client, id).await;
        assert_eq!(description.status, Phase::Ended);
        assert!(description.emergency.is_emergency_stopped);
        assert_eq!(description.config.end_time, clock.now());

        let results_uri = format!("/elections/{id}/results");
        let response = get_as(&client, Some("v1"), results_uri.clone()).await;
        assert_eq!(response.status(), Status::Forbidden);
        let response = get_as(&client, Some("owner"), results_uri.clone()).await;
        assert_eq!(response.status(), Status::Ok);

        let response = post_as(&client, Some("owner"), enable_uri, &()).await;
        assert_eq!(response.status(), Status::Ok);
        let response = get_as(&client, None, results_uri.clone()).await;
        assert_eq!(response.status(), Status::Ok);
        let results: ElectionResults = json_body(response).await;
        assert_eq!(results.total_votes, 1);
        assert_eq!(results.participation_rate, 100);

        let response = post_as(&client, Some("owner"), disable_uri, &()).await;
        assert_eq!(response.status(), Status::Ok);
        let response = get_as(&client, None, results_uri).await;
        assert_eq!(response.status(), Status::Forbidden);
    }

    #[backend_test]
    async fn reveal_phase_is_owner_only_and_once(client: Client, clock: ManualClock) {
        let election =
            create_election(&client, "owner", &ElectionSpec::commit_reveal_example()).await;
        let uri = format!("/elections/{}/reveal-phase", election.id);

        let response = post_as(&client, Some("owner"), uri.clone(), &()).await;
        assert_eq!(response.status(), Status::UnprocessableEntity);

        clock.set(election.config.end_time + Duration::seconds(1));
        let response = post_as(&client, Some("someone"), uri.clone(), &()).await;
        assert_eq!(response.status(), Status::Forbidden);
        let response = post_as(&client, Some("owner"), uri.clone(), &()).await;
        assert_eq!(response.status(), Status::Ok);
        let response = post_as(&client, Some("owner"), uri, &()).await;
        assert_eq!(response.status(), Status::Conflict);

        assert!(describe(&client, election.id).await.reveal_phase_started);
    }

    #[backend_test]
    async fn unknown_elections_are_not_found(client: Client) {
        let response = post_as(
            &client,
            Some("owner"),
            "/elections/7/emergency-stop".to_string(),
            &(),
        )
        .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    async fn describe(client: &Client, election_id: ElectionId) -> ElectionDescription {
        let response = get_as(client, None, format!("/elections/{election_id}")).await;
        assert_eq!(response.status(), Status::Ok);
        json_body(response).await
    }
}
