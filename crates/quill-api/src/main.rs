//! Quill CLI and REST API entry point.
//!
//! Binary name: `quill`
//!
//! Parses CLI arguments, initializes database and services, then either
//! starts the REST API server or runs a key-management command.

mod cli;
mod http;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, KeyCommands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,quill=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| state.config.bind_addr.clone());
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Quill API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Key { command } => match command {
            KeyCommands::New { owner, name } => {
                let key = http::extractors::auth::create_api_key(&state, &owner, &name).await?;
                println!();
                println!(
                    "  {} API key for '{}' (save this -- it won't be shown again):",
                    console::style("🔑").bold(),
                    console::style(&owner).cyan()
                );
                println!();
                println!("  {}", console::style(&key).yellow().bold());
                println!();
            }
        },
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
