use std::sync::Arc;

use chrono::Duration;
use reqwest::Url;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    common::Identity,
    oracle::{HttpOracle, SharedOracle, UnconfiguredOracle},
    registry::ElectionRegistry,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    upgrade_authority: Identity,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to sign and verify JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// The only identity allowed to upgrade the registry's logic version.
    pub fn upgrade_authority(&self) -> &Identity {
        &self.upgrade_authority
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that creates the empty election registry and places it into
/// managed state. Must be attached after [`ConfigFairing`].
pub struct RegistryFairing;

#[rocket::async_trait]
impl Fairing for RegistryFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election registry",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let authority = match rocket.state::<Config>() {
            Some(config) => config.upgrade_authority().clone(),
            None => {
                error!("Election registry needs the application config");
                return Err(rocket);
            }
        };
        info!("Election registry online, upgrade authority is {authority}");
        Ok(rocket.manage(ElectionRegistry::new(authority)))
    }
}

/// Configuration for the balance oracle.
/// `oracle_url` is the base URL of an HTTP oracle, and `oracle_timeout` bounds
/// each query in seconds.
#[derive(Deserialize)]
struct OracleConfig {
    oracle_url: Option<String>,
    #[serde(default = "default_oracle_timeout")]
    oracle_timeout: u64,
}

fn default_oracle_timeout() -> u64 {
    5
}

/// A fairing that loads the oracle config and places a [`SharedOracle`]
/// into managed state. Without an `oracle_url`, holdings-based registration
/// reports the oracle as unavailable.
pub struct OracleFairing;

#[rocket::async_trait]
impl Fairing for OracleFairing {
    fn info(&self) -> Info {
        Info {
            name: "Balance oracle",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<OracleConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load oracle config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let oracle: SharedOracle = match config.oracle_url {
            Some(raw) => {
                let timeout = std::time::Duration::from_secs(config.oracle_timeout);
                let oracle = Url::parse(&raw)
                    .map_err(|e| e.to_string())
                    .and_then(|url| HttpOracle::new(url, timeout).map_err(|e| e.to_string()));
                match oracle {
                    Ok(oracle) => {
                        info!(
                            "Using balance oracle at {raw} with a {}s timeout",
                            config.oracle_timeout
                        );
                        Arc::new(oracle)
                    }
                    Err(e) => {
                        error!("Invalid `oracle_url` {raw:?}: {e}");
                        return Err(rocket);
                    }
                }
            }
            None => {
                warn!("No `oracle_url` configured; holdings-based registration is unavailable");
                Arc::new(UnconfiguredOracle)
            }
        };

        // Manage the state.
        Ok(rocket.manage(oracle))
    }
}
