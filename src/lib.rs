#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{figment::Figment, Build, Rocket};

use crate::clock::Clock;
use crate::config::{ConfigFairing, OracleFairing, RegistryFairing};
use crate::logging::LoggerFairing;
use crate::model::oracle::SharedOracle;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

/// Build the server from `Rocket.toml` and the environment, using the system
/// clock and the configured balance oracle.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .manage(Clock::system())
        .attach(LoggerFairing { quiet_rocket: true })
        .attach(ConfigFairing)
        .attach(RegistryFairing)
        .attach(OracleFairing)
}

/// Build the server with an explicit configuration, clock and oracle.
pub fn rocket_for_clock_and_oracle(
    figment: Figment,
    clock: Clock,
    oracle: SharedOracle,
) -> Rocket<Build> {
    rocket::custom(figment)
        .mount("/", api::routes())
        .manage(clock)
        .manage(oracle)
        .attach(LoggerFairing {
            quiet_rocket: false,
        })
        .attach(ConfigFairing)
        .attach(RegistryFairing)
}

/// Configuration used by the endpoint tests.
#[cfg(test)]
fn test_figment() -> Figment {
    rocket::Config::figment()
        .merge(("auth_ttl", 3600))
        .merge(("upgrade_authority", "root"))
        .merge(("jwt_secret", "test-secret"))
        .merge(("log_level", "off"))
}
