use std::env;

use admin_api::ApiConfig;
use dotenv::dotenv;
use eyre::Context;
use log::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Err(err) = dotenv() {
        info!("Failed to load .env file: {}", err);
    }
    pretty_env_logger::init();
    color_eyre::install()?;

    info!("connecting to mongo");
    let mongo_url = env::var("MONGO_URL").context("Failed to get MONGO_URL from env")?;
    let storage = storage::Storage::new(&mongo_url)
        .await
        .context("Failed to create storage")?;
    let roster = roster::Roster::new(storage);

    bootstrap_admin(&roster).await?;

    let config = ApiConfig {
        bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        cookie_domain: env::var("COOKIE_DOMAIN").unwrap_or_default(),
        cookie_secure: env::var("COOKIE_SECURE").map(|v| v == "1").unwrap_or(false),
    };
    info!("Starting admin api...");
    admin_api::serve(roster, config).await?;

    Ok(())
}

/// Seeds the first admin from env when the directory is empty, so a fresh
/// deployment can log in without poking the database by hand.
async fn bootstrap_admin(roster: &roster::Roster) -> eyre::Result<()> {
    let (email, password) = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
        (Ok(email), Ok(password)) => (email, password),
        _ => return Ok(()),
    };
    let mut session = roster
        .db
        .start_session()
        .await
        .context("Failed to start session")?;
    roster
        .admins
        .bootstrap(&mut session, &email, &password)
        .await
        .context("Failed to bootstrap admin")?;
    Ok(())
}
