use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
    Catcher, Request, Route,
};

use crate::error::ErrorBody;

mod admin;
pub(crate) mod auth;
mod public;
mod updates;

pub fn routes() -> Vec<Route> {
    let mut routes = routes![health];
    routes.extend(admin::routes());
    routes.extend(public::routes());
    routes.extend(auth::routes());
    routes.extend(updates::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

#[get("/health")]
fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Answer every unhandled error (bad paths, failed guards, malformed bodies)
/// with the same JSON shape as handler errors.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> (Status, Json<ErrorBody>) {
    let detail = status.reason().unwrap_or("Unknown error").to_string();
    (status, Json(ErrorBody { detail }))
}
