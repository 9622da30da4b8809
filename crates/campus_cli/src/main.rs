//! `campus` server entry point.
//!
//! # Responsibility
//! - Resolve configuration and initialize logging before touching the store.
//! - Serve the HTTP surface until SIGINT/SIGTERM.

mod config;

use anyhow::{anyhow, Context};
use campus_http::{create_router, AppState};
use clap::{Parser, Subcommand};
use config::{Config, Overrides};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "campus", version, about = "University records API server")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Socket address to bind, e.g. 127.0.0.1:8080.
    #[arg(long, global = true)]
    listen: Option<String>,
    /// SQLite database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Print core linkage info and exit.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Some(Command::Ping) => {
            println!("campus_core ping={}", campus_core::ping());
            println!("campus_core version={}", campus_core::core_version());
            Ok(())
        }
        Some(Command::Serve) | None => {
            let overrides = Overrides {
                listen: cli.listen,
                database: cli.db,
                log_level: cli.log_level,
                log_dir: cli.log_dir,
            };
            let config = Config::load(cli.config.as_deref(), overrides)
                .context("failed to load configuration")?;
            serve(config).await
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    campus_core::init_logging(&config.logging)
        .map_err(|err| anyhow!(err))
        .context("failed to initialize logging")?;

    let conn = campus_core::open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.database_path.display()
        )
    })?;
    let state = AppState::new(conn).context("database is not ready")?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind TCP listener on {}", config.listen))?;
    info!(
        "event=server_start module=cli status=ok listen={} version={}",
        config.listen,
        campus_core::core_version()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("event=server_stop module=cli status=ok");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            warn!("event=signal_install module=cli status=error signal=SIGTERM error={err}");
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c() => {}
        _ = sigterm.recv() => {
            info!("event=shutdown_signal module=cli status=ok signal=SIGTERM");
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("event=shutdown_signal module=cli status=ok signal=SIGINT"),
        Err(err) => warn!("event=signal_install module=cli status=error signal=SIGINT error={err}"),
    }
}
