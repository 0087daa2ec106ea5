use clap::Parser;
use tokio::net::TcpListener;

use fintrack_api::app::{build_app, services::build_services};
use fintrack_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    fintrack_observability::init_with_filter(&config.log_level);

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET is unset; using the insecure compiled-in default");
    }

    let listen = config.listen;
    let services = build_services(config).await?;
    let app = build_app(services);

    let listener = TcpListener::bind(listen).await?;
    tracing::info!(%listen, "fintrack-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
