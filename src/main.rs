use tracing::{error, info};

use subfeed::web::{AppState, WebServer};
use subfeed::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = subfeed::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        subfeed::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> subfeed::Result<()> {
    config.validate()?;

    info!("subfeed starting");
    info!(
        "Feed refresh at {:?} ({})",
        config.schedule.update_hours, config.schedule.timezone
    );

    let db = Database::open(&config.database.path).await?;
    let state = AppState::from_config(db, &config)?;
    info!(
        "Next feed refresh at {}",
        state.aggregator.next_update_at().to_rfc3339()
    );

    let server = WebServer::new(&config.server, state)?;
    server.run_until(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
