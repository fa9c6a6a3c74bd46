use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use model::admin::AdminView;
use serde::Deserialize;
use serde_json::json;

use crate::{
    context::{Principal, AUTH_COOKIE},
    error::ApiError,
    AppState,
};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = state.roster.db.start_session().await?;
    let (key, user) = state
        .roster
        .admins
        .login(&mut session, &request.email, &request.password)
        .await?;

    let mut cookie = Cookie::build((AUTH_COOKIE, key.key))
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/");
    if !state.config.cookie_domain.is_empty() {
        cookie = cookie.domain(state.config.cookie_domain.clone());
    }
    let jar = jar.add(cookie);
    Ok((jar, Json(json!({ "success": true, "user": user }))))
}

pub async fn me(Principal(admin): Principal) -> Json<serde_json::Value> {
    let user = AdminView::from((*admin).clone());
    Json(json!({ "success": true, "user": user }))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        let mut session = state.roster.db.start_session().await?;
        state
            .roster
            .admins
            .logout(&mut session, cookie.value())
            .await?;
    }
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    Ok((jar, Json(json!({ "success": true }))))
}
