use anyhow::Context;
use axum::Router;
use prc_markets::api::rest;
use prc_markets::config::Config;
use prc_markets::ledger::Ledger;
use prc_markets::AppState;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let config = Config::load().context("failed to load configuration")?;
    let bind_addr = config.bind_addr.clone();

    log::info!("connecting to {}", config.database_url);
    let ledger = Ledger::connect(&config.database_url, config.max_lock_retries)
        .await
        .context("failed to connect to the ledger")?;
    log::info!("migrations applied");

    let state = AppState::new(ledger.clone(), config);

    let scheduler = prc_markets::scheduler::start(ledger, state.leaderboard_cache.clone())
        .await
        .context("failed to start the scheduler")?;

    let app = Router::new()
        .merge(rest::create_rest())
        .with_state(state)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    log::info!("prc-markets listening on http://{bind_addr}");
    log::info!("OpenAPI docs at http://{bind_addr}/api/docs");

    axum::serve(listener, app)
        .await
        .context("server error")?;

    drop(scheduler);
    Ok(())
}
