use runboard::config::Config;
use runboard::http::ApiClient;
use runboard::query::{QueryCache, QueryClient};
use runboard::render::{coop_card, run_card, stats_line};
use runboard::run::service::ServiceRunBoard;
use std::error::Error;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("loading service runs from {}", config.base_url);
    let transport = ApiClient::new(&config)?;
    let client = QueryClient::new(Arc::new(transport), QueryCache::default());

    let mut board = ServiceRunBoard::new(client);
    board.load().await;
    if let Some(status) = std::env::args().nth(1) {
        board.set_status_filter(Some(status.as_str())).await;
    }

    if let Some(message) = board.runs().error() {
        error!("service runs failed to load: {}", message);
    }
    println!("{}\n", stats_line(&board.stats()));
    for run in board.runs().data().into_iter().flatten() {
        println!("{}", run_card(run));
    }
    for coop in board.coop_runs().data().into_iter().flatten() {
        println!("{}", coop_card(coop));
    }
    board.teardown();
    Ok(())
}
