//! Terminal markdown rendering.
//!
//! Assistant turns are markdown: bold section labels while interviewing and
//! a pipe table at the end. `termimad` renders both.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use termimad::MadSkin;

use infraplan_types::conversation::Progress;

/// Terminal markdown renderer.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(termimad::crossterm::style::Color::Cyan);
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        Self { skin }
    }

    /// Render a complete markdown message.
    pub fn render(&self, markdown: &str) -> String {
        self.skin.term_text(markdown).to_string()
    }

    /// Print the progress footer after an assistant turn.
    ///
    /// Format: "| ######---- 42%"
    pub fn print_progress(&self, progress: Progress) {
        const WIDTH: usize = 20;
        let filled = usize::from(progress.value()) * WIDTH / 100;
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(WIDTH - filled));
        println!(
            "  {} {} {}",
            style("|").dim(),
            style(bar).cyan(),
            style(progress).dim()
        );
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Spinner shown while waiting on the model.
pub fn thinking_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(spinner_style);
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
