//! `infraplan boq`: render a priced BOQ from a saved summary table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;

use crate::cli::chat::renderer::{ChatRenderer, thinking_spinner};
use crate::state::AppState;

/// Read a summary table from `summary_path` and render its BOQ.
pub async fn render_boq_file(
    state: &AppState,
    summary_path: &Path,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let summary = tokio::fs::read_to_string(summary_path)
        .await
        .with_context(|| format!("failed to read summary from {}", summary_path.display()))?;
    render_boq(state, &summary, output.as_deref(), json).await
}

/// Render a BOQ and print it, or write it to `output`.
pub async fn render_boq(
    state: &AppState,
    summary: &str,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let spinner = (!json).then(|| thinking_spinner("generating BOQ..."));
    let result = state.boq_renderer().render(summary).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let boq = result?;

    if let Some(path) = output {
        tokio::fs::write(path, &boq)
            .await
            .with_context(|| format!("failed to write BOQ to {}", path.display()))?;
    }

    if json {
        let body = serde_json::json!({
            "boq": boq,
            "output": output.map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else if let Some(path) = output {
        println!(
            "  {} BOQ saved to {}",
            style("*").cyan().bold(),
            style(path.display()).dim()
        );
    } else {
        println!("{}", ChatRenderer::new().render(&boq).trim_end());
        println!();
    }
    Ok(())
}
