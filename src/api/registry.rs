use rocket::{serde::json::Json, Route, State};

use crate::clock::Clock;
use crate::error::Result;
use crate::model::{
    api::{
        auth::AuthToken,
        election::{ElectionDescription, ElectionSpec, ElectionSummary},
        registry::LogicVersion,
    },
    common::Identity,
    registry::ElectionRegistry,
};

use super::common::describe_election;

pub fn routes() -> Vec<Route> {
    routes![create_election, list_elections, logic_version, upgrade_logic]
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    token: AuthToken,
    spec: Json<ElectionSpec>,
    registry: &State<ElectionRegistry>,
    clock: &State<Clock>,
) -> Result<Json<ElectionDescription>> {
    let election_id = registry
        .create_instance(&token.id, spec.into_inner(), clock)
        .await?;
    Ok(Json(describe_election(registry, clock, election_id).await?))
}

#[get("/elections?<creator>")]
async fn list_elections(
    creator: Option<Identity>,
    registry: &State<ElectionRegistry>,
) -> Json<Vec<ElectionSummary>> {
    let summaries = match creator {
        Some(creator) => registry.instances_by_creator(&creator).await,
        None => registry.list_instances().await,
    };
    Json(summaries)
}

#[get("/registry/logic-version")]
async fn logic_version(registry: &State<ElectionRegistry>) -> Json<LogicVersion> {
    Json(LogicVersion {
        version: registry.logic_version().await,
    })
}

#[put("/registry/logic-version", data = "<target>", format = "json")]
async fn upgrade_logic(
    token: AuthToken,
    target: Json<LogicVersion>,
    registry: &State<ElectionRegistry>,
) -> Result<Json<LogicVersion>> {
    let version = registry.upgrade_logic(&token.id, target.version).await?;
    Ok(Json(LogicVersion { version }))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::model::election::{ElectionConfig, EligibilityPolicy, Phase};

    use super::super::common::testing::{create_election, get_as, identity, json_body, login, post_as};
    use super::*;

    #[backend_test]
    async fn create_and_list(client: Client) {
        let first = create_election(&client, "alice", &ElectionSpec::example()).await;
        assert_eq!(first.id, 0);
        assert_eq!(first.owner, identity("alice"));
        assert_eq!(first.status, Phase::NotStarted);
        assert_eq!(first.logic_version, 1);
        assert_eq!(first.total_votes, 0);
        assert_eq!(first.candidate_count, 0);

        let second = create_election(&client, "bob", &ElectionSpec::whitelist_example()).await;
        assert_eq!(second.id, 1);
        assert_eq!(second.eligibility, EligibilityPolicy::Whitelist);

        let response = get_as(&client, None, "/elections".to_string()).await;
        assert_eq!(response.status(), Status::Ok);
        let all: Vec<ElectionSummary> = json_body(response).await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].title, ElectionConfig::example().title);

        let response = get_as(&client, None, "/elections?creator=bob".to_string()).await;
        let bobs: Vec<ElectionSummary> = json_body(response).await;
        assert_eq!(bobs.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);
    }

    #[backend_test]
    async fn create_requires_a_valid_token(client: Client) {
        let response = post_as(&client, None, "/elections".to_string(), &ElectionSpec::example()).await;
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client
            .post("/elections")
            .header(ContentType::JSON)
            .cookie(rocket::http::Cookie::new("auth_token", "forged"))
            .body(serde_json::to_string(&ElectionSpec::example()).unwrap())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[backend_test]
    async fn create_rejects_bad_ordering(client: Client) {
        let mut spec = ElectionSpec::example();
        spec.config.end_time = spec.config.start_time;
        let response = post_as(&client, Some("alice"), "/elections".to_string(), &spec).await;
        assert_eq!(response.status(), Status::BadRequest);

        // The failed attempt did not consume an id.
        let created = create_election(&client, "alice", &ElectionSpec::example()).await;
        assert_eq!(created.id, 0);
    }

    #[backend_test]
    async fn logic_upgrade(client: Client) {
        let upgrade = |name: &'static str, version: u32| {
            client
                .put(uri!(upgrade_logic))
                .header(ContentType::JSON)
                .cookie(login(&client, name))
                .body(serde_json::to_string(&LogicVersion { version }).unwrap())
                .dispatch()
        };

        assert_eq!(upgrade("alice", 2).await.status(), Status::Forbidden);
        assert_eq!(upgrade("root", 1).await.status(), Status::BadRequest);
        assert_eq!(upgrade("root", 3).await.status(), Status::Ok);

        let response = get_as(&client, None, uri!(logic_version).to_string()).await;
        let current: LogicVersion = json_body(response).await;
        assert_eq!(current.version, 3);

        let created = create_election(&client, "alice", &ElectionSpec::example()).await;
        assert_eq!(created.logic_version, 3);
    }
}
