//! LLM provider implementations.
//!
//! Provides a provider factory ([`create_provider`]) that constructs the
//! OpenAI or Azure OpenAI provider from an [`LlmConfig`], and a connection
//! test function ([`test_provider_connection`]) for verifying provider
//! connectivity.

pub mod openai_compat;

use secrecy::SecretString;

use infraplan_core::llm::box_provider::BoxLlmProvider;
use infraplan_types::config::LlmConfig;
use infraplan_types::error::ConfigError;
use infraplan_types::llm::{CompletionRequest, LlmError, Message, ProviderType};

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{OpenAiCompatConfig, azure_defaults, openai_defaults};

/// Read the API key named by [`LlmConfig::api_key_var`] from the environment.
pub fn resolve_api_key(config: &LlmConfig) -> Option<String> {
    std::env::var(config.api_key_var())
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Create a [`BoxLlmProvider`] from an [`LlmConfig`].
///
/// # Arguments
///
/// * `config` - Provider configuration (type, model, base URL, API version)
/// * `api_key` - The resolved API key, usually from [`resolve_api_key`]
///
/// # Errors
///
/// [`ConfigError::MissingApiKey`] when no key is provided, and
/// [`ConfigError::MissingEndpoint`] for Azure without a resource endpoint.
pub fn create_provider(
    config: &LlmConfig,
    api_key: Option<&str>,
) -> Result<BoxLlmProvider, ConfigError> {
    let key = api_key.ok_or_else(|| ConfigError::MissingApiKey(config.api_key_var().to_string()))?;
    let secret = SecretString::from(key.to_string());

    let oai_config = match config.provider {
        ProviderType::AzureOpenai => {
            let endpoint = config
                .base_url
                .as_deref()
                .ok_or_else(|| ConfigError::MissingEndpoint(config.provider.to_string()))?;
            azure_defaults(endpoint, secret, &config.model, &config.api_version)
        }
        ProviderType::Openai => match config.base_url.as_deref() {
            Some(base_url) => OpenAiCompatConfig {
                endpoint: openai_compat::config::Endpoint::OpenAi {
                    base_url: base_url.trim_end_matches('/').to_string(),
                },
                ..openai_defaults(secret, &config.model)
            },
            None => openai_defaults(secret, &config.model),
        },
    };

    tracing::debug!(
        provider = %oai_config.provider_name,
        model = %oai_config.model,
        "LLM provider configured"
    );
    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(oai_config)))
}

/// Test provider connectivity by sending a minimal completion request.
///
/// Sends a tiny "Hello" message with minimal token budget.
///
/// # Errors
///
/// Returns the LLM error if the provider fails to respond.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    let request = CompletionRequest {
        model: String::new(), // Provider uses its configured default
        messages: vec![Message::user("Hello")],
        system: None,
        max_tokens: 16,
        temperature: None,
        output_config: None,
    };
    provider.complete(&request).await?;
    Ok(())
}
