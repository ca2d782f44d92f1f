//! `infraplan check`: verify the configured LLM provider answers.

use anyhow::{Result, bail};
use console::style;

use infraplan_infra::llm::test_provider_connection;

use crate::state::AppState;

pub async fn check_provider(state: &AppState, json: bool) -> Result<()> {
    let name = state.provider.name().to_string();
    let model = state.provider.model().to_string();

    if !json {
        print!("  Testing connection to {} ({})... ", style(&name).cyan(), model);
        let _ = std::io::Write::flush(&mut std::io::stdout());
    }

    let result = test_provider_connection(&state.provider).await;

    if json {
        let report = serde_json::json!({
            "provider": name,
            "model": model,
            "connected": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match result {
        Ok(()) => {
            if !json {
                println!("{}", style("connected").green().bold());
            }
            Ok(())
        }
        Err(e) => {
            if !json {
                println!("{}", style("FAILED").red().bold());
                eprintln!("  {} Connection test failed: {e}", style("!").red().bold());
            }
            bail!("provider {name} is not reachable")
        }
    }
}
