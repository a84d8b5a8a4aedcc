use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use charitable::backend::config::CharitableConfig;
use charitable::backend::domain::addons::builtin_addons;
use charitable::backend::{create_router, initialize_backend};

#[derive(Parser)]
#[command(name = "charitable")]
#[command(about = "Donation and donor management backend")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "CHARITABLE_CONFIG", default_value = "charitable.yaml")]
    config: PathBuf,

    /// Activate an addon before the active addons are loaded (repeatable)
    #[arg(long = "activate-addon", value_name = "SLUG")]
    activate_addons: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CharitableConfig::load_from(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!("Starting charitable backend");
    info!("Config file: {:?}", cli.config);

    let app_state = initialize_backend(&config, builtin_addons(), &cli.activate_addons).await?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(config.listen).await?;
    info!("Listening on {}", config.listen);

    axum::serve(listener, app).await?;

    Ok(())
}
