//! Subscription ledger: CLI server
//!
//! ```sh
//! # Run with default config (~/.config/subscription-ledger/config.toml)
//! subscription-ledger
//!
//! # Custom config path and port
//! subscription-ledger --config /etc/subscription-ledger/config.toml --port 9090
//!
//! # Validate config without starting
//! subscription-ledger --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use subscription_ledger::config::{default_config_path, AppConfig, CONFIG_ENV_VAR};
use subscription_ledger::infrastructure::database::redact_url;
use subscription_ledger::server::{init_tracing, ServerHandle, ServerOptions};

/// REST service tracking recurring subscriptions and their cost.
#[derive(Parser, Debug)]
#[command(
    name = "subscription-ledger",
    version,
    about = "Subscription bookkeeping and cost reporting service",
    long_about = "REST API for recording user subscriptions and computing \
                  their spend over a range of months.\n\n\
                  Default config: ~/.config/subscription-ledger/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Override the HTTP listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let loaded = AppConfig::load(&config_path);

    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if cli.check {
        if let Err(e) = &loaded {
            eprintln!("Configuration is invalid: {}", e);
            std::process::exit(1);
        }
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Backend     : {:?}", config.database.backend);
        println!("   Database    : {}", redact_url(&config.database.connection_url()));
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    match loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => {
            error!("Failed to load config: {}", e);
            error!("Using default configuration.");
        }
    }
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
