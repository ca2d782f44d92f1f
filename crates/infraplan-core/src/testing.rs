//! Scripted LLM provider for tests.
//!
//! Replies are queued up front and handed out in order; every request is
//! recorded so tests can assert on prompts and call counts. Clones share the
//! same script, so a test can keep a handle after boxing the provider.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use infraplan_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};

use crate::llm::provider::LlmProvider;

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<String, LlmError>>,
    requests: Vec<CompletionRequest>,
}

#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw content reply.
    pub fn with_content(self, content: impl Into<String>) -> Self {
        self.push(Ok(content.into()));
        self
    }

    /// Queue a structured turn reply.
    pub fn with_turn(self, status: &str, next_response: &str, progress: i64) -> Self {
        let body = serde_json::json!({
            "status": status,
            "next_response": next_response,
            "progress": progress,
        });
        self.with_content(body.to_string())
    }

    /// Queue a provider failure.
    pub fn with_error(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<String, LlmError>) {
        if let Ok(mut script) = self.script.lock() {
            script.replies.push_back(reply);
        }
    }

    /// Number of completion calls made so far.
    pub fn calls(&self) -> usize {
        self.script.lock().map(|s| s.requests.len()).unwrap_or(0)
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.script
            .lock()
            .map(|s| s.requests.clone())
            .unwrap_or_default()
    }

    /// Replies still queued.
    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.replies.len()).unwrap_or(0)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        let reply = match self.script.lock() {
            Ok(mut script) => {
                script.requests.push(request.clone());
                script.replies.pop_front().unwrap_or_else(|| {
                    Err(LlmError::Provider {
                        message: "script exhausted".to_string(),
                    })
                })
            }
            Err(_) => Err(LlmError::Provider {
                message: "script poisoned".to_string(),
            }),
        };

        async move {
            reply.map(|content| CompletionResponse {
                id: "scripted".to_string(),
                content,
                model: "scripted-model".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }
}
