//! Storefront service binary.

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::http::{self, AppState};
use storefront::notify::Mailer;
use storefront::payments::gateway::Gateway;
use storefront::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    // One bounded-wait client shared by the gateway and the mail sink.
    let outbound = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    let gateway = Gateway::new(outbound.clone(), config.gateway.clone());
    let mailer = Mailer::new(outbound, config.mailgun.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState { db, config: Arc::new(config), gateway, mailer };
    let app = http::router(state);

    tracing::info!("storefront listening on {addr}");
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
