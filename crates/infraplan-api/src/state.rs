//! Application state wiring the conversation engine together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! The conversation service is generic over its session store; AppState pins
//! it to the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use infraplan_core::boq::BoqRenderer;
use infraplan_core::conversation::ProgrammaticDriver;
use infraplan_core::llm::box_provider::BoxLlmProvider;
use infraplan_core::questions::QuestionBank;
use infraplan_core::service::conversation::ConversationService;
use infraplan_core::session::memory::InMemorySessionStore;
use infraplan_core::turn::TurnProcessor;
use infraplan_infra::config::load_question_bank;
use infraplan_infra::llm::{create_provider, resolve_api_key};
use infraplan_types::config::AppConfig;

pub type ConcreteConversationService = ConversationService<InMemorySessionStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<BoxLlmProvider>,
    pub questions: Arc<QuestionBank>,
    pub conversation_service: Arc<ConcreteConversationService>,
}

impl AppState {
    /// Initialize the application state: question bank, LLM provider, services.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let questions = load_question_bank(config.questions_path.as_deref())
            .await
            .context("failed to load question bank")?;

        let api_key = resolve_api_key(&config.llm);
        let provider = create_provider(&config.llm, api_key.as_deref())
            .context("failed to configure LLM provider")?;

        tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            questions = questions.len(),
            "application state initialized"
        );
        Ok(Self::from_parts(config, provider, questions))
    }

    /// Wire services around an already-built provider and question bank.
    pub fn from_parts(config: AppConfig, provider: BoxLlmProvider, questions: QuestionBank) -> Self {
        let provider = Arc::new(provider);
        let questions = Arc::new(questions);

        let store = InMemorySessionStore::new(Duration::from_secs(config.session.ttl_secs));
        let processor = build_processor(&config, &provider, &questions);
        let boq = build_boq_renderer(&config, &provider);
        let conversation_service =
            ConversationService::new(store, ProgrammaticDriver::new(processor), boq);

        Self {
            config: Arc::new(config),
            provider,
            questions,
            conversation_service: Arc::new(conversation_service),
        }
    }

    pub fn turn_processor(&self) -> TurnProcessor {
        build_processor(&self.config, &self.provider, &self.questions)
    }

    pub fn boq_renderer(&self) -> BoqRenderer {
        build_boq_renderer(&self.config, &self.provider)
    }
}

fn build_processor(
    config: &AppConfig,
    provider: &Arc<BoxLlmProvider>,
    questions: &Arc<QuestionBank>,
) -> TurnProcessor {
    TurnProcessor::new(Arc::clone(provider), Arc::clone(questions))
        .with_max_tokens(config.llm.max_tokens)
        .with_temperature(config.llm.temperature)
}

fn build_boq_renderer(config: &AppConfig, provider: &Arc<BoxLlmProvider>) -> BoqRenderer {
    BoqRenderer::new(Arc::clone(provider))
        .with_max_tokens(config.llm.max_tokens)
        .with_temperature(config.llm.temperature)
}
