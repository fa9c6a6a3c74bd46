use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use log::warn;
use model::admin::AdminUser;

use crate::{error::ApiError, AppState};

pub const AUTH_COOKIE: &str = "auth";

/// The authenticated admin, or None for anonymous requests. Resolved once
/// per request by `load_principal`.
#[derive(Clone, Default)]
pub struct CurrentAdmin(pub Option<Arc<AdminUser>>);

/// Extractor for admin-only handlers; rejects with 401 when the request
/// carries no valid session.
#[derive(Clone)]
pub struct Principal(pub Arc<AdminUser>);

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentAdmin>()
            .and_then(|current| current.0.clone())
            .map(Principal)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Resolves the `auth` cookie against the server-side session store and
/// stashes the result; handlers never touch the cookie themselves.
pub async fn load_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut current = CurrentAdmin::default();
    if let Some(cookie) = CookieJar::from_headers(request.headers()).get(AUTH_COOKIE) {
        match authenticate(&state, cookie.value()).await {
            Ok(Some(admin)) => current = CurrentAdmin(Some(Arc::new(admin))),
            Ok(None) => {}
            Err(err) => warn!("Failed to authenticate session cookie: {:?}", err),
        }
    }
    request.extensions_mut().insert(current);
    next.run(request).await
}

async fn authenticate(state: &AppState, key: &str) -> Result<Option<AdminUser>, roster::Error> {
    let mut session = state.roster.db.start_session().await?;
    state.roster.admins.authenticate(&mut session, key).await
}
