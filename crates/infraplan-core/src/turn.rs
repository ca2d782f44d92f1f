//! Turn processor: one model call per assistant turn.
//!
//! Builds the turn prompt, asks the model for a schema-constrained
//! [`TurnDecision`], and appends the resulting assistant turn to the
//! conversation. Model and decode failures never escape: they become a
//! degraded turn carrying an `Error processing request: ...` message, with
//! status `not_done` and progress 0. The only error surfaced is an attempt to
//! run a turn on a conversation that has already ended.

use std::sync::Arc;

use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info_span, warn};

use infraplan_types::conversation::{CompletionStatus, ConversationState, Progress, Transcript};
use infraplan_types::error::ConversationError;
use infraplan_types::llm::{
    CompletionRequest, LlmError, Message, OutputConfig, add_additional_properties_false,
};

use crate::llm::box_provider::BoxLlmProvider;
use crate::prompt::build_turn_prompt;
use crate::questions::QuestionBank;

/// Prefix of every degraded assistant turn.
pub const FALLBACK_PREFIX: &str = "Error processing request:";

const DEFAULT_MAX_TOKENS: u32 = 4096;

// ---------------------------------------------------------------------------
// Decoded reply
// ---------------------------------------------------------------------------

/// The three fields the model must return on every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TurnDecision {
    /// `"done"` once every question is answered, otherwise `"not_done"`.
    pub status: CompletionStatus,
    /// Next message for the user, or the final summary table when done.
    pub next_response: String,
    /// Completion percentage between 0 and 100.
    pub progress: i64,
}

/// Why a model reply could not be turned into a [`TurnDecision`].
#[derive(Debug, thiserror::Error)]
pub enum TurnFailure {
    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("could not decode model reply: {0}")]
    Decode(String),

    #[error("model returned an empty message")]
    EmptyMessage,
}

/// Outcome of one model call, with decode failure as an explicit variant.
#[derive(Debug)]
pub enum ModelReply {
    Decoded(TurnDecision),
    Failed(TurnFailure),
}

impl ModelReply {
    /// Decode raw model content into a reply.
    pub fn from_content(content: &str) -> Self {
        match serde_json::from_str::<TurnDecision>(content.trim()) {
            Ok(decision) if decision.next_response.trim().is_empty() => {
                ModelReply::Failed(TurnFailure::EmptyMessage)
            }
            Ok(decision) => ModelReply::Decoded(decision),
            Err(e) => ModelReply::Failed(TurnFailure::Decode(e.to_string())),
        }
    }
}

/// What one processed turn produced, as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub status: CompletionStatus,
    pub progress: Progress,
    pub message: String,
    /// True when the turn is a synthesized fallback rather than a model decision.
    pub degraded: bool,
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// JSON schema for [`TurnDecision`] in the shape strict structured output accepts.
pub fn turn_decision_schema() -> serde_json::Value {
    let schema = SchemaSettings::draft2020_12()
        .with(|s| s.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<TurnDecision>();
    let mut value = serde_json::to_value(schema).unwrap_or_default();
    strip_unsupported_keywords(&mut value);
    add_additional_properties_false(&mut value);
    value
}

/// Remove keywords strict mode rejects (`$schema`, `format`).
fn strip_unsupported_keywords(schema: &mut serde_json::Value) {
    match schema {
        serde_json::Value::Object(map) => {
            map.remove("$schema");
            if map.get("type").and_then(|t| t.as_str()) == Some("integer") {
                map.remove("format");
            }
            for value in map.values_mut() {
                strip_unsupported_keywords(value);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                strip_unsupported_keywords(item);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// TurnProcessor
// ---------------------------------------------------------------------------

/// Runs the model for one assistant turn.
#[derive(Debug, Clone)]
pub struct TurnProcessor {
    provider: Arc<BoxLlmProvider>,
    questions: Arc<QuestionBank>,
    max_tokens: u32,
    temperature: Option<f64>,
}

impl TurnProcessor {
    pub fn new(provider: Arc<BoxLlmProvider>, questions: Arc<QuestionBank>) -> Self {
        Self {
            provider,
            questions,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    fn request_for(&self, transcript: &Transcript) -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages: vec![Message::user(build_turn_prompt(transcript, &self.questions))],
            system: None,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            output_config: Some(OutputConfig::json_schema(
                "TurnDecision",
                turn_decision_schema(),
            )),
        }
    }

    /// Ask the model for the next decision without touching any state.
    pub async fn decide(&self, transcript: &Transcript) -> ModelReply {
        let request = self.request_for(transcript);
        let span = info_span!(
            "gen_ai.complete",
            gen_ai.operation.name = "conversation_turn",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %self.provider.model(),
            gen_ai.request.max_tokens = self.max_tokens,
            transcript.turns = transcript.len(),
        );

        async {
            match self.provider.complete(&request).await {
                Ok(response) => {
                    debug!(
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        "model turn received"
                    );
                    ModelReply::from_content(&response.content)
                }
                Err(e) => ModelReply::Failed(TurnFailure::Llm(e)),
            }
        }
        .instrument(span)
        .await
    }

    /// Run one model turn and append the assistant message to `state`.
    ///
    /// A failed call or undecodable reply is recorded as a degraded turn. A
    /// terminal conversation is rejected before the model is called.
    pub async fn process(
        &self,
        state: &mut ConversationState,
    ) -> Result<TurnOutcome, ConversationError> {
        if state.is_terminal() {
            return Err(ConversationError::AlreadyCompleted);
        }
        let reply = self.decide(state.transcript()).await;
        let (status, progress, message, degraded) = match reply {
            ModelReply::Decoded(decision) => (
                decision.status,
                Progress::clamped(decision.progress),
                decision.next_response,
                false,
            ),
            ModelReply::Failed(failure) => {
                warn!(error = %failure, "model turn failed, recording fallback turn");
                (
                    CompletionStatus::NotDone,
                    Progress::ZERO,
                    format!("{FALLBACK_PREFIX} {failure}"),
                    true,
                )
            }
        };

        state.record_assistant_turn(status, progress, message.clone())?;

        Ok(TurnOutcome {
            status: state.status(),
            progress: state.progress(),
            message,
            degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use infraplan_types::conversation::{Completion, ConversationMode};

    fn processor(provider: &ScriptedProvider) -> TurnProcessor {
        TurnProcessor::new(
            Arc::new(BoxLlmProvider::new(provider.clone())),
            Arc::new(QuestionBank::builtin()),
        )
    }

    #[test]
    fn schema_is_strict_and_lists_all_fields() {
        let schema = turn_decision_schema();
        assert_eq!(schema["additionalProperties"], false);
        assert!(schema.get("$schema").is_none());
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        for field in ["status", "next_response", "progress"] {
            assert!(required.contains(&field));
        }
        assert!(schema["properties"]["progress"].get("format").is_none());
    }

    #[test]
    fn from_content_rejects_unknown_status() {
        let reply = ModelReply::from_content(
            r#"{"status":"finished","next_response":"hi","progress":10}"#,
        );
        assert!(matches!(reply, ModelReply::Failed(TurnFailure::Decode(_))));
    }

    #[test]
    fn from_content_rejects_blank_message() {
        let reply =
            ModelReply::from_content(r#"{"status":"not_done","next_response":"  ","progress":10}"#);
        assert!(matches!(reply, ModelReply::Failed(TurnFailure::EmptyMessage)));
    }

    #[test]
    fn from_content_accepts_spaced_status() {
        let reply =
            ModelReply::from_content(r#"{"status":"not done","next_response":"next","progress":8}"#);
        match reply {
            ModelReply::Decoded(d) => assert_eq!(d.status, CompletionStatus::NotDone),
            other => panic!("expected decoded reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn process_appends_decoded_turn() {
        let provider = ScriptedProvider::new().with_turn(
            "not_done",
            "**IP Telephony - General Requirements** - How many buildings require IP telephony services?",
            0,
        );
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        let outcome = processor(&provider).process(&mut state).await.unwrap();

        assert!(!outcome.degraded);
        assert_eq!(outcome.status, CompletionStatus::NotDone);
        assert_eq!(outcome.progress, Progress::ZERO);
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.latest_message(), Some(outcome.message.as_str()));
        assert!(outcome.message.starts_with("**IP Telephony - General Requirements**"));
    }

    #[tokio::test]
    async fn process_sends_prompt_with_schema() {
        let provider = ScriptedProvider::new().with_turn("not_done", "q1", 0);
        let mut state = ConversationState::new(ConversationMode::Programmatic);
        processor(&provider).process(&mut state).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.messages[0].content.contains("No conversation yet."));
        let config = request.output_config.as_ref().unwrap();
        assert_eq!(config.format.json_schema.name, "TurnDecision");
        assert_eq!(config.format.json_schema.strict, Some(true));
    }

    #[tokio::test]
    async fn provider_error_becomes_fallback_turn() {
        let provider = ScriptedProvider::new().with_error(LlmError::RateLimited);
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        let outcome = processor(&provider).process(&mut state).await.unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.status, CompletionStatus::NotDone);
        assert_eq!(outcome.progress, Progress::ZERO);
        assert_eq!(outcome.message, "Error processing request: rate limited");
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_reply_becomes_fallback_turn() {
        let provider = ScriptedProvider::new().with_content("this is not json");
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        let outcome = processor(&provider).process(&mut state).await.unwrap();

        assert!(outcome.degraded);
        assert!(outcome.message.starts_with(FALLBACK_PREFIX));
        assert!(!state.is_terminal());
    }

    #[tokio::test]
    async fn done_reply_completes_with_full_progress() {
        let table = "| Section | Question | User Response |\n| --- | --- | --- |\n| A | B | C |";
        let provider = ScriptedProvider::new().with_turn("done", table, 85);
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        let outcome = processor(&provider).process(&mut state).await.unwrap();

        assert_eq!(outcome.status, CompletionStatus::Done);
        assert_eq!(outcome.progress, Progress::COMPLETE);
        assert_eq!(state.completion(), Some(Completion::Summary));
        assert_eq!(state.summary(), Some(table));
    }

    #[tokio::test]
    async fn completed_conversation_is_not_sent_to_model() {
        let provider = ScriptedProvider::new()
            .with_turn("done", "| table |", 100)
            .with_turn("not_done", "again?", 10);
        let processor = processor(&provider);
        let mut state = ConversationState::new(ConversationMode::Programmatic);
        processor.process(&mut state).await.unwrap();

        let err = processor.process(&mut state).await.unwrap_err();

        assert_eq!(err, ConversationError::AlreadyCompleted);
        assert_eq!(provider.calls(), 1);
        assert_eq!(state.summary(), Some("| table |"));
    }

    #[tokio::test]
    async fn out_of_range_progress_is_clamped() {
        let provider = ScriptedProvider::new()
            .with_turn("not_done", "q", -20)
            .with_turn("not_done", "q", 140);
        let processor = processor(&provider);
        let mut state = ConversationState::new(ConversationMode::Programmatic);

        assert_eq!(processor.process(&mut state).await.unwrap().progress.value(), 0);
        state.push_user_turn("a").unwrap();
        assert_eq!(processor.process(&mut state).await.unwrap().progress.value(), 99);
    }
}
