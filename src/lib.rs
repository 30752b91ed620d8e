pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod services;
pub mod web;

use clap::Parser;
use tokio::signal;

use cli::{Cli, Commands};
pub use config::Config;
use db::Store;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    match cli.command {
        Some(Commands::InitDb) => run_init_db(config).await,
        Some(Commands::Serve) | None => run_serve(config).await,
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    info!("Blogr v{} starting...", env!("CARGO_PKG_VERSION"));

    if config.server.secret_key == config::DEV_SECRET_KEY {
        warn!("secret_key is still \"dev\"; override it for any real deployment");
    }

    config.ensure_instance_dir()?;

    let port = config.server.port;
    let state = web::create_app_state(config).await?;
    let app = web::router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Serving at http://{addr} (Ctrl+C to stop)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn run_init_db(config: Config) -> anyhow::Result<()> {
    config.ensure_instance_dir()?;

    let store = Store::new(&config.database_url()).await?;
    store.reset().await?;

    println!("Initialized the database.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Error listening for shutdown: {}", e);
    }
}
