//! infraplan CLI and REST API entry point.
//!
//! Parses CLI arguments, loads configuration, wires the conversation engine,
//! then dispatches to the appropriate command handler or starts the REST API
//! server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use infraplan_infra::config::{load_config, load_dotenv, load_question_bank};
use infraplan_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::chat::loop_runner::ChatOptions;
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or tracing
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "infraplan", &mut std::io::stdout());
        return Ok(());
    }

    // Set up tracing based on verbosity; the server logs requests by default
    let serving = matches!(cli.command, Commands::Serve { .. });
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if serving => "info",
        0 => "warn",
        1 => "info,infraplan_core=debug,infraplan_infra=debug,infraplan_api=debug",
        _ => "trace",
    };
    install_tracing(filter, cli.otel)?;

    load_dotenv();
    let config = load_config(cli.config.as_deref()).await;

    let result = run(cli, config).await;
    shutdown_tracing();
    result
}

/// Install the global subscriber, surfacing failures as `anyhow` errors.
fn install_tracing(filter: &str, otel: bool) -> anyhow::Result<()> {
    init_tracing(filter, otel).map_err(|e| anyhow::anyhow!(e))
}

async fn run(cli: Cli, config: infraplan_types::config::AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Questions => {
            let bank = load_question_bank(config.questions_path.as_deref()).await?;
            cli::questions::list_questions(&bank, cli.json)?;
        }

        Commands::Chat { boq, save } => {
            let state = AppState::init(config).await?;
            cli::chat::loop_runner::run_chat_loop(&state, ChatOptions { save, boq }).await?;
        }

        Commands::Boq { summary, output } => {
            let state = AppState::init(config).await?;
            cli::boq::render_boq_file(&state, &summary, output, cli.json).await?;
        }

        Commands::Check => {
            let state = AppState::init(config).await?;
            cli::check::check_provider(&state, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let ttl_secs = config.session.ttl_secs;
            let state = AppState::init(config).await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} infraplan API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!(
                    "  {}",
                    console::style(format!("Sessions expire {ttl_secs}s after creation")).dim()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, model = state.provider.model(), "server started");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_tracing_install_reports_error() {
        let _ = install_tracing("warn", false);
        let err = install_tracing("warn", false).unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
