//! Interactive input collaborator.
//!
//! The interactive driver reads answers through [`InteractiveIo`] so the
//! source can be a terminal, a channel, or a test harness.

use std::future::Future;

use crate::turn::TurnOutcome;

/// Warning shown once when a blank answer is submitted.
pub const EMPTY_INPUT_WARNING: &str = "Empty input received. Please provide a response.";

/// Events produced by an input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// User submitted a line.
    Line(String),
    /// End of file (Ctrl+D) or the source closed.
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

/// Terminal-side hooks used by the interactive driver.
pub trait InteractiveIo: Send {
    /// Read one line of input.
    fn read_line(&mut self) -> impl Future<Output = InputEvent> + Send;

    /// Show a non-fatal warning (e.g. blank input).
    fn warn(&mut self, message: &str);

    /// Show an assistant turn that was just produced.
    fn show_turn(&mut self, turn: &TurnOutcome);

    /// Called right before a model call starts.
    fn model_call_started(&mut self) {}

    /// Called right after a model call returns.
    fn model_call_finished(&mut self) {}
}

/// Collect one answer.
///
/// A blank or whitespace-only line is rejected once with a warning and the
/// user is asked again; the second line is accepted as-is. Returns `None`
/// when the source reports EOF or an interrupt.
pub async fn acquire_answer<I: InteractiveIo>(io: &mut I) -> Option<String> {
    let first = match io.read_line().await {
        InputEvent::Line(line) => line,
        InputEvent::Eof | InputEvent::Interrupted => return None,
    };
    if !first.trim().is_empty() {
        return Some(first);
    }

    io.warn(EMPTY_INPUT_WARNING);
    match io.read_line().await {
        InputEvent::Line(line) => Some(line),
        InputEvent::Eof | InputEvent::Interrupted => None,
    }
}
