use rocket::Route;

mod admin;
mod common;
mod public;
mod registry;
mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(registry::routes());
    routes.extend(admin::routes());
    routes.extend(voter::routes());
    routes.extend(public::routes());
    routes
}
