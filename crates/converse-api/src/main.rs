//! Converse CLI and REST API entry point.
//!
//! Binary name: `converse`
//!
//! Parses CLI arguments, initializes the history database and Bedrock
//! client, then starts the REST API server, lists models, or handles a
//! single function event from stdin.

mod function;
mod http;
mod state;

use std::io::Read;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use converse_core::inference::InferenceClient;

use state::AppState;

#[derive(Parser)]
#[command(name = "converse", version, about = "Session-scoped conversation service over AWS Bedrock")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 8000, env = "PORT")]
        port: u16,
    },

    /// List the foundation models the backend can serve
    Models,

    /// Handle a single function event read from stdin
    Invoke,

    /// Generate shell completions
    Completions { shell: Shell },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,converse=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "converse", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (history DB, Bedrock client, registry)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Converse API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {} region {} · default model {}",
                console::style("✓").green(),
                state.registry.region(),
                state.registry.default_model()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Models => {
            let models = state.registry.inference().list_models().await?;
            let listing = serde_json::json!({
                "count": models.len(),
                "models": models,
                "current_default": state.registry.default_model(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }

        Commands::Invoke => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            let event: function::FunctionEvent = serde_json::from_str(&raw)?;

            let response = function::handle(&state.registry, event).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
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
