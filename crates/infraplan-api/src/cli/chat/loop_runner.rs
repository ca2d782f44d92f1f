//! Interactive interview orchestration.
//!
//! Wires the terminal (readline input, spinner, markdown rendering) into the
//! core [`InteractiveDriver`] and handles what happens after the interview:
//! saving the summary table and optionally rendering the BOQ.

use std::path::PathBuf;

use anyhow::Context;
use console::style;
use indicatif::ProgressBar;

use infraplan_core::conversation::{
    ConversationDriver, InputEvent, InteractiveDriver, InteractiveIo, StepOutcome,
};
use infraplan_core::turn::TurnOutcome;
use infraplan_types::conversation::{ConversationMode, ConversationState};

use crate::cli::boq::render_boq;
use crate::state::AppState;

use super::banner::{print_aborted_footer, print_completed_footer, print_welcome_banner};
use super::input::ChatInput;
use super::renderer::{ChatRenderer, thinking_spinner};

/// What to do once the interview finishes.
#[derive(Debug, Default)]
pub struct ChatOptions {
    /// Write the final summary table here.
    pub save: Option<PathBuf>,
    /// Render the BOQ right after a completed interview.
    pub boq: bool,
}

/// Terminal implementation of the driver's input/output hooks.
struct TerminalIo {
    input: ChatInput,
    renderer: ChatRenderer,
    spinner: Option<ProgressBar>,
}

impl TerminalIo {
    fn new(input: ChatInput) -> Self {
        Self {
            input,
            renderer: ChatRenderer::new(),
            spinner: None,
        }
    }
}

impl InteractiveIo for TerminalIo {
    async fn read_line(&mut self) -> InputEvent {
        self.input.read_line().await
    }

    fn warn(&mut self, message: &str) {
        eprintln!("  {} {}", style("!").yellow().bold(), style(message).yellow());
    }

    fn show_turn(&mut self, turn: &TurnOutcome) {
        println!();
        if turn.degraded {
            eprintln!("  {} {}", style("!").red().bold(), turn.message);
            eprintln!("  {}", style("Answer again to retry.").dim());
        } else {
            println!("{}", self.renderer.render(&turn.message).trim_end());
        }
        println!();
        self.renderer.print_progress(turn.progress);
        println!();
    }

    fn model_call_started(&mut self) {
        self.spinner = Some(thinking_spinner("thinking..."));
    }

    fn model_call_finished(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Run the interactive requirements interview.
pub async fn run_chat_loop(state: &AppState, options: ChatOptions) -> anyhow::Result<()> {
    print_welcome_banner(
        state.provider.name(),
        state.provider.model(),
        state.questions.len(),
    );

    let prompt = format!("{} ", style(">").cyan().bold());
    let (input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let mut driver = InteractiveDriver::new(state.turn_processor(), TerminalIo::new(input));
    let mut conversation = ConversationState::new(ConversationMode::Interactive);
    let outcome = driver.advance(&mut conversation, None).await?;
    driver.into_io().input.finish();

    match outcome {
        StepOutcome::Completed(_) => {
            print_completed_footer();
            let summary = conversation.summary().unwrap_or_default();

            if let Some(path) = options.save {
                tokio::fs::write(&path, summary)
                    .await
                    .with_context(|| format!("failed to write summary to {}", path.display()))?;
                println!(
                    "  {} Summary saved to {}",
                    style("*").cyan().bold(),
                    style(path.display()).dim()
                );
                println!();
            }

            if options.boq {
                render_boq(state, summary, None, false).await?;
            }
        }
        StepOutcome::Aborted => print_aborted_footer(conversation.progress().value()),
        StepOutcome::Suspended(_) => {
            tracing::warn!("interactive driver returned control before the interview ended");
        }
    }

    Ok(())
}
