use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use eyre::{Context as _, Result};
use roster::Roster;

mod auth;
mod classes;
mod clients;
mod context;
mod error;
mod export;
mod method_override;
mod registrations;
mod requests;
mod users;

pub use context::Principal;
pub use error::ApiError;

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub cookie_domain: String,
    pub cookie_secure: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub roster: Roster,
    pub config: Arc<ApiConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth", post(auth::login).get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/classes", get(classes::list).post(classes::create))
        .route(
            "/classes/:id",
            axum::routing::put(classes::update).delete(classes::remove),
        )
        .route("/classes/:id/public", get(classes::public_view))
        .route("/clients", post(clients::register).get(clients::list))
        .route(
            "/clients/:id",
            axum::routing::put(clients::update).delete(clients::remove),
        )
        .route("/registrations", delete(registrations::remove))
        .route(
            "/registrations/:id",
            axum::routing::put(registrations::set_status),
        )
        .route("/group-requests", post(requests::submit).get(requests::list))
        .route("/group-requests/:id", axum::routing::put(requests::update))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:id",
            axum::routing::put(users::update).delete(users::remove),
        )
        .route("/export/group-requests", get(export::group_requests))
        .route("/export/roster/:id", get(export::roster))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            context::load_principal,
        ))
        .layer(middleware::from_fn(method_override::middleware))
        .with_state(state)
}

pub async fn serve(roster: Roster, config: ApiConfig) -> Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        roster,
        config: Arc::new(config),
    };
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    log::info!("listening on {}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
