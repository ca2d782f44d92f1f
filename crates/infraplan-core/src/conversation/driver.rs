//! Conversation drivers: the two control-flow strategies of the state machine.
//!
//! Both run the [`TurnProcessor`] and differ only in what happens after a
//! model turn that is not `done`:
//!
//! - [`ProgrammaticDriver`] suspends and hands control back to the caller
//!   (one HTTP request = one step).
//! - [`InteractiveDriver`] collects the next answer inline and keeps going
//!   until the model declares `done` or the input source closes.

use std::future::Future;

use tracing::{debug, info};

use infraplan_types::conversation::{ConversationMode, ConversationState};
use infraplan_types::error::ConversationError;

use super::input::{InteractiveIo, acquire_answer};
use crate::turn::{TurnOutcome, TurnProcessor};

/// Where a call to [`ConversationDriver::advance`] left the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Waiting for the external caller to send the next message.
    Suspended(TurnOutcome),
    /// The model declared `done`; the turn carries the summary table.
    Completed(TurnOutcome),
    /// The interactive input source closed before completion.
    Aborted,
}

impl StepOutcome {
    pub fn turn(&self) -> Option<&TurnOutcome> {
        match self {
            StepOutcome::Suspended(turn) | StepOutcome::Completed(turn) => Some(turn),
            StepOutcome::Aborted => None,
        }
    }
}

/// Advance a conversation by one driver-defined step.
///
/// `input` is the pending user message, if any. It is appended as a user
/// turn before the model runs and is never stored anywhere else. Calling
/// `advance` on a terminal conversation fails with
/// [`ConversationError::AlreadyCompleted`], and a conversation created for the
/// other driver fails with [`ConversationError::ModeMismatch`]. Both leave the
/// state untouched.
pub trait ConversationDriver {
    fn advance(
        &mut self,
        state: &mut ConversationState,
        input: Option<String>,
    ) -> impl Future<Output = Result<StepOutcome, ConversationError>> + Send;
}

fn check_mode(
    state: &ConversationState,
    expected: ConversationMode,
) -> Result<(), ConversationError> {
    if state.mode() != expected {
        return Err(ConversationError::ModeMismatch {
            expected,
            actual: state.mode(),
        });
    }
    if state.is_terminal() {
        return Err(ConversationError::AlreadyCompleted);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Programmatic
// ---------------------------------------------------------------------------

/// One model turn per call, then suspend.
#[derive(Debug, Clone)]
pub struct ProgrammaticDriver {
    processor: TurnProcessor,
}

impl ProgrammaticDriver {
    pub fn new(processor: TurnProcessor) -> Self {
        Self { processor }
    }

    /// `&self` version of [`ConversationDriver::advance`]; the driver holds no
    /// per-conversation state.
    pub async fn step(
        &self,
        state: &mut ConversationState,
        input: Option<String>,
    ) -> Result<StepOutcome, ConversationError> {
        check_mode(state, ConversationMode::Programmatic)?;
        match input {
            Some(message) => state.push_user_turn(message)?,
            // Only the opening turn may run without a user message.
            None if !state.transcript().is_empty() => {
                return Err(ConversationError::MissingInput);
            }
            None => {}
        }

        let turn = self.processor.process(state).await?;
        if state.is_terminal() {
            info!(turns = state.transcript().len(), "conversation completed");
            Ok(StepOutcome::Completed(turn))
        } else {
            debug!(progress = turn.progress.value(), "conversation suspended for caller");
            Ok(StepOutcome::Suspended(turn))
        }
    }
}

impl ConversationDriver for ProgrammaticDriver {
    fn advance(
        &mut self,
        state: &mut ConversationState,
        input: Option<String>,
    ) -> impl Future<Output = Result<StepOutcome, ConversationError>> + Send {
        self.step(state, input)
    }
}

// ---------------------------------------------------------------------------
// Interactive
// ---------------------------------------------------------------------------

/// Loops model turns and inline input until the conversation ends.
pub struct InteractiveDriver<I: InteractiveIo> {
    processor: TurnProcessor,
    io: I,
}

impl<I: InteractiveIo> InteractiveDriver<I> {
    pub fn new(processor: TurnProcessor, io: I) -> Self {
        Self { processor, io }
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    pub fn into_io(self) -> I {
        self.io
    }

    async fn run_turn(
        &mut self,
        state: &mut ConversationState,
    ) -> Result<TurnOutcome, ConversationError> {
        self.io.model_call_started();
        let turn = self.processor.process(state).await;
        self.io.model_call_finished();
        let turn = turn?;
        self.io.show_turn(&turn);
        Ok(turn)
    }
}

impl<I: InteractiveIo> ConversationDriver for InteractiveDriver<I> {
    async fn advance(
        &mut self,
        state: &mut ConversationState,
        input: Option<String>,
    ) -> Result<StepOutcome, ConversationError> {
        check_mode(state, ConversationMode::Interactive)?;
        if let Some(message) = input {
            state.push_user_turn(message)?;
        }

        loop {
            let turn = self.run_turn(state).await?;
            if state.is_terminal() {
                info!(turns = state.transcript().len(), "interactive conversation completed");
                return Ok(StepOutcome::Completed(turn));
            }

            match acquire_answer(&mut self.io).await {
                Some(answer) => state.push_user_turn(answer)?,
                None => {
                    info!(
                        progress = state.progress().value(),
                        "interactive conversation aborted by user"
                    );
                    state.abort();
                    return Ok(StepOutcome::Aborted);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::conversation::input::tests::QueueIo;
    use crate::conversation::input::{EMPTY_INPUT_WARNING, InputEvent};
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::questions::QuestionBank;
    use crate::testing::ScriptedProvider;
    use infraplan_types::conversation::{
        Completion, CompletionStatus, ConversationMode, Progress, Role,
    };
    use infraplan_types::llm::LlmError;

    const TABLE: &str = "| Section | Question | User Response |\n| --- | --- | --- |\n| IP Telephony | Buildings | 3 |";

    fn processor(provider: &ScriptedProvider) -> TurnProcessor {
        TurnProcessor::new(
            Arc::new(BoxLlmProvider::new(provider.clone())),
            Arc::new(QuestionBank::builtin()),
        )
    }

    #[tokio::test]
    async fn programmatic_first_step_needs_no_input() {
        let provider = ScriptedProvider::new().with_turn(
            "not_done",
            "**IP Telephony - General Requirements** - How many buildings require IP telephony services?",
            0,
        );
        let mut driver = ProgrammaticDriver::new(processor(&provider));
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        let outcome = driver.advance(&mut state, None).await.unwrap();

        match outcome {
            StepOutcome::Suspended(turn) => {
                assert!(turn.message.starts_with("**IP Telephony - General Requirements**"));
                assert_eq!(turn.status, CompletionStatus::NotDone);
                assert_eq!(turn.progress, Progress::ZERO);
            }
            other => panic!("expected suspension, got {other:?}"),
        }
        assert_eq!(state.transcript().len(), 1);
    }

    #[tokio::test]
    async fn programmatic_step_appends_user_then_assistant() {
        let provider = ScriptedProvider::new()
            .with_turn("not_done", "q1", 0)
            .with_turn("not_done", "q2", 8);
        let driver = ProgrammaticDriver::new(processor(&provider));
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        driver.step(&mut state, None).await.unwrap();
        driver.step(&mut state, Some("3".to_string())).await.unwrap();

        let roles: Vec<Role> = state.transcript().turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(state.progress().value(), 8);
        assert!(provider.requests()[1].messages[0].content.contains("User: 3"));
    }

    #[tokio::test]
    async fn programmatic_empty_message_is_forwarded_to_model() {
        let provider = ScriptedProvider::new()
            .with_turn("not_done", "q1", 0)
            .with_turn("not_done", "q1 again", 0);
        let driver = ProgrammaticDriver::new(processor(&provider));
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        driver.step(&mut state, None).await.unwrap();
        driver.step(&mut state, Some(String::new())).await.unwrap();

        assert_eq!(state.transcript().len(), 3);
        assert_eq!(state.status(), CompletionStatus::NotDone);
        assert_eq!(state.progress(), Progress::ZERO);
    }

    #[tokio::test]
    async fn programmatic_missing_input_after_start_is_rejected() {
        let provider = ScriptedProvider::new().with_turn("not_done", "q1", 0);
        let driver = ProgrammaticDriver::new(processor(&provider));
        let mut state = ConversationState::new(ConversationMode::Programmatic);
        driver.step(&mut state, None).await.unwrap();

        let err = driver.step(&mut state, None).await.unwrap_err();
        assert_eq!(err, ConversationError::MissingInput);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn programmatic_completion_then_rejection() {
        let provider = ScriptedProvider::new()
            .with_turn("not_done", "q1", 0)
            .with_turn("done", TABLE, 100);
        let driver = ProgrammaticDriver::new(processor(&provider));
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        driver.step(&mut state, None).await.unwrap();
        let outcome = driver.step(&mut state, Some("done, proceed".into())).await.unwrap();
        assert!(matches!(outcome, StepOutcome::Completed(_)));
        assert_eq!(state.summary(), Some(TABLE));

        let before = state.clone();
        let err = driver.step(&mut state, Some("more".into())).await.unwrap_err();
        assert_eq!(err, ConversationError::AlreadyCompleted);
        assert_eq!(state, before);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn programmatic_degraded_turn_still_suspends() {
        let provider = ScriptedProvider::new().with_error(LlmError::AuthenticationFailed);
        let driver = ProgrammaticDriver::new(processor(&provider));
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        let outcome = driver.step(&mut state, None).await.unwrap();
        let turn = outcome.turn().unwrap();
        assert!(turn.degraded);
        assert_eq!(turn.message, "Error processing request: authentication failed");
        assert!(!state.is_terminal());
    }

    #[tokio::test]
    async fn interactive_runs_until_done() {
        let provider = ScriptedProvider::new()
            .with_turn("not_done", "q1", 0)
            .with_turn("not_done", "q2", 50)
            .with_turn("done", TABLE, 100);
        let io = QueueIo::lines(&["3", "yes"]);
        let mut driver = InteractiveDriver::new(processor(&provider), io);
        let mut state = ConversationState::new(ConversationMode::Interactive);

        let outcome = driver.advance(&mut state, None).await.unwrap();

        assert!(matches!(outcome, StepOutcome::Completed(_)));
        assert_eq!(state.transcript().len(), 5);
        assert_eq!(state.summary(), Some(TABLE));
        let io = driver.into_io();
        assert_eq!(io.shown.len(), 3);
        assert_eq!(io.model_calls, 3);
        assert_eq!(io.shown[2].progress, Progress::COMPLETE);
    }

    #[tokio::test]
    async fn interactive_blank_answer_warns_and_reprompts_once() {
        let provider = ScriptedProvider::new()
            .with_turn("not_done", "q1", 0)
            .with_turn("done", TABLE, 100);
        let io = QueueIo::lines(&["  ", "4"]);
        let mut driver = InteractiveDriver::new(processor(&provider), io);
        let mut state = ConversationState::new(ConversationMode::Interactive);

        driver.advance(&mut state, None).await.unwrap();

        assert_eq!(driver.io().warnings, vec![EMPTY_INPUT_WARNING.to_string()]);
        assert_eq!(state.transcript().turns()[1].content, "4");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn interactive_eof_aborts_without_summary() {
        let provider = ScriptedProvider::new()
            .with_turn("not_done", "q1", 0)
            .with_turn("not_done", "q2", 10);
        let io = QueueIo::lines(&["3"]).then(InputEvent::Interrupted);
        let mut driver = InteractiveDriver::new(processor(&provider), io);
        let mut state = ConversationState::new(ConversationMode::Interactive);

        let outcome = driver.advance(&mut state, None).await.unwrap();

        assert_eq!(outcome, StepOutcome::Aborted);
        assert_eq!(state.completion(), Some(Completion::Aborted));
        assert!(state.summary().is_none());
        assert_eq!(state.latest_message(), Some("q2"));
        assert_eq!(state.transcript().len(), 3);

        let err = driver.advance(&mut state, Some("late".into())).await.unwrap_err();
        assert_eq!(err, ConversationError::AlreadyCompleted);
    }

    #[tokio::test]
    async fn programmatic_driver_rejects_interactive_conversation() {
        let provider = ScriptedProvider::new().with_turn("not_done", "q1", 0);
        let driver = ProgrammaticDriver::new(processor(&provider));
        let mut state = ConversationState::new(ConversationMode::Interactive);

        let err = driver.step(&mut state, None).await.unwrap_err();

        assert_eq!(
            err,
            ConversationError::ModeMismatch {
                expected: ConversationMode::Programmatic,
                actual: ConversationMode::Interactive,
            }
        );
        assert!(state.transcript().is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn interactive_driver_rejects_programmatic_conversation() {
        let provider = ScriptedProvider::new().with_turn("not_done", "q1", 0);
        let mut driver = InteractiveDriver::new(processor(&provider), QueueIo::lines(&["3"]));
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        let err = driver.advance(&mut state, Some("hi".into())).await.unwrap_err();

        assert!(matches!(err, ConversationError::ModeMismatch { .. }));
        assert!(state.transcript().is_empty());
        assert_eq!(driver.io().model_calls, 0);
    }

    #[tokio::test]
    async fn interactive_degraded_turn_keeps_collecting_input() {
        let provider = ScriptedProvider::new()
            .with_error(LlmError::Overloaded("busy".into()))
            .with_turn("done", TABLE, 100);
        let io = QueueIo::lines(&["retry"]);
        let mut driver = InteractiveDriver::new(processor(&provider), io);
        let mut state = ConversationState::new(ConversationMode::Interactive);

        let outcome = driver.advance(&mut state, None).await.unwrap();

        assert!(matches!(outcome, StepOutcome::Completed(_)));
        assert!(driver.io().shown[0].degraded);
    }
}
