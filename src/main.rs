//! Main entry point for the Map Room lobby service
//!
//! This is the production entry point that initializes and runs the
//! lobby orchestration service with proper error handling, logging,
//! discovery registration and graceful shutdown.

use anyhow::Result;
use clap::Parser;
use map_room::config::AppConfig;
use map_room::service::{AppState, ShutdownCoordinator};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Map Room Lobby Service - game session orchestration for load-balanced fleets
#[derive(Parser)]
#[command(
    name = "map-room",
    version,
    about = "A lobby and game-session orchestration microservice",
    long_about = "Map Room is a Rust-based lobby service that lets clients discover, create, \
                 join, leave and progress multiplayer game lobbies, and registers each running \
                 instance with a discovery endpoint so a fleet of stateless instances can be \
                 load-balanced."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override lobby API port")]
    http_port: Option<u16>,

    /// Discovery URL override
    #[arg(long, value_name = "URL", help = "Override discovery endpoint URL")]
    discovery_url: Option<String>,

    /// Skip discovery registration
    #[arg(long, help = "Do not register this instance with the discovery endpoint")]
    no_register: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🚀 Map Room Lobby Service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   HTTP port: {}", config.service.http_port);
    info!("   Discovery: {}", config.discovery.url);
    info!(
        "   Register on startup: {}",
        config.discovery.register_on_startup
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    // Start with environment-based config
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    if let Some(discovery_url) = &args.discovery_url {
        config.discovery.url = discovery_url.clone();
    }

    if args.no_register {
        config.discovery.register_on_startup = false;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    // Display startup information
    display_startup_banner(&config);

    // Initialize application state
    info!("Initializing service components...");
    let mut app_state = match AppState::new(config.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    // The coordinator guarantees deregistration on every exit path below
    let shutdown = ShutdownCoordinator::new(app_state.registry());

    // Start the service
    info!("Starting service...");
    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    // Register this instance with the discovery endpoint; a failure is
    // logged and the service keeps running unregistered
    if config.discovery.register_on_startup {
        app_state.registry().register_self().await;
    } else {
        info!("Discovery registration disabled - running unregistered");
    }

    info!("✅ Map Room Lobby Service is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    // Wait for shutdown signal
    ShutdownCoordinator::wait_for_signal().await;

    // Begin graceful shutdown
    info!("🛑 Shutdown signal received, beginning graceful shutdown...");

    // Release the discovery registration before stopping components
    shutdown.release().await;

    // Shutdown with timeout
    let shutdown_timeout = config.shutdown_timeout();
    match tokio::time::timeout(shutdown_timeout, app_state.shutdown()).await {
        Ok(Ok(())) => {
            info!("✅ Graceful shutdown completed successfully");
        }
        Ok(Err(e)) => {
            warn!("Shutdown completed with errors: {}", e);
        }
        Err(_) => {
            warn!("⚠️  Shutdown timeout exceeded, forcing exit");
        }
    }

    // Normal-exit path: a no-op if the signal path already released
    shutdown.release().await;

    info!("🛑 Map Room Lobby Service stopped");
    Ok(())
}
