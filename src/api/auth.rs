use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::auth::{AdminCredentials, AdminIdentity, LoginResponse},
        auth::{AuthToken, AUTH_TOKEN_COOKIE},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![login, verify, logout]
}

/// Log in as the configured admin. The token is both returned and set as a
/// cookie, so scripts and browsers can each use whichever suits them.
#[post("/api/auth/login", data = "<credentials>", format = "json")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    config: &State<Config>,
) -> Result<Json<LoginResponse>> {
    if !config.admin_matches(&credentials.username, &credentials.password) {
        warn!("Failed admin login as {:?}", credentials.username);
        return Err(Error::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let token = AuthToken::new(&credentials.username);
    let signed = token.encode(config)?;
    cookies.add(AuthToken::cookie(signed.clone(), config));
    info!("Admin {} logged in", token.username());

    Ok(Json(LoginResponse {
        token: signed,
        username: token.username().to_string(),
    }))
}

#[get("/api/auth/verify")]
pub fn verify(token: AuthToken) -> Json<AdminIdentity> {
    Json(AdminIdentity {
        username: token.username().to_string(),
    })
}

#[delete("/api/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
