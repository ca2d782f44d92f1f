//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI and Azure OpenAI via
//! [`async_openai`], which handles request/response typing and the two
//! authentication schemes. Structured output is requested through
//! `response_format: json_schema` whenever the request carries an
//! [`infraplan_types::llm::OutputConfig`].

pub mod config;

use async_openai::Client;
use async_openai::config::{AzureConfig, OpenAIConfig};
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    CreateChatCompletionResponse, FinishReason, ResponseFormat, ResponseFormatJsonSchema,
};
use secrecy::ExposeSecret;

use infraplan_core::llm::provider::LlmProvider;
use infraplan_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, StopReason, Usage,
};

use self::config::{Endpoint, OpenAiCompatConfig};

/// The async-openai client is generic over its config type; one variant per flavour.
#[derive(Clone)]
enum ChatClient {
    OpenAi(Client<OpenAIConfig>),
    Azure(Client<AzureConfig>),
}

impl ChatClient {
    async fn create(
        &self,
        request: CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse, OpenAIError> {
        match self {
            ChatClient::OpenAi(client) => client.chat().create(request).await,
            ChatClient::Azure(client) => client.chat().create(request).await,
        }
    }
}

/// Unified provider for OpenAI and Azure OpenAI.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatibleProvider {
    client: ChatClient,
    provider_name: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider from a configuration.
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let api_key = config.api_key.expose_secret();
        let client = match &config.endpoint {
            Endpoint::OpenAi { base_url } => ChatClient::OpenAi(Client::with_config(
                OpenAIConfig::new()
                    .with_api_key(api_key)
                    .with_api_base(base_url),
            )),
            Endpoint::Azure {
                endpoint,
                deployment,
                api_version,
            } => ChatClient::Azure(Client::with_config(
                AzureConfig::new()
                    .with_api_base(endpoint)
                    .with_deployment_id(deployment)
                    .with_api_version(api_version)
                    .with_api_key(api_key),
            )),
        };

        Self {
            client,
            provider_name: config.provider_name,
            model: config.model,
        }
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if let Some(ref system) = request.system {
            messages.push(system_message(system.clone()));
        }

        for msg in &request.messages {
            let oai_msg = match msg.role {
                MessageRole::System => system_message(msg.content.clone()),
                MessageRole::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                                msg.content.clone(),
                            )),
                            refusal: None,
                            name: None,
                            audio: None,
                            tool_calls: None,
                            function_call: None,
                        },
                    )
                }
            };
            messages.push(oai_msg);
        }

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let response_format = request.output_config.as_ref().map(|output| {
            let schema = &output.format.json_schema;
            ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: schema.name.clone(),
                    schema: Some(schema.schema.clone()),
                    strict: schema.strict,
                },
            }
        });

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            response_format,
            ..Default::default()
        }
    }
}

fn system_message(content: String) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: ChatCompletionRequestSystemMessageContent::Text(content),
        name: None,
    })
}

fn map_finish_reason(reason: Option<&FinishReason>) -> StopReason {
    match reason {
        Some(FinishReason::Length) => StopReason::MaxTokens,
        Some(FinishReason::ContentFilter) => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let choice = response.choices.first().ok_or(LlmError::EmptyResponse)?;
        let content = choice.message.content.clone().unwrap_or_default();
        if content.is_empty() {
            if let Some(refusal) = choice.message.refusal.clone() {
                return Err(LlmError::Provider {
                    message: format!("model refused: {refusal}"),
                });
            }
            return Err(LlmError::EmptyResponse);
        }
        let stop_reason = map_finish_reason(choice.finish_reason.as_ref());

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: OpenAIError) -> LlmError {
    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || code == "401"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Access denied due to invalid subscription key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded"
                || code == "429"
                || error_type == "rate_limit_error"
            {
                LlmError::RateLimited
            } else if code == "context_length_exceeded"
                || api_err.message.contains("maximum context length")
            {
                LlmError::ContextLengthExceeded
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited,
            Some(503) | Some(529) => LlmError::Overloaded(err.to_string()),
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use infraplan_types::llm::{Message, OutputConfig};

    fn openai() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(config::openai_defaults(
            SecretString::from("sk-test"),
            "gpt-4o",
        ))
    }

    fn request(messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages,
            system: None,
            max_tokens: 1024,
            temperature: None,
            output_config: None,
        }
    }

    #[test]
    fn test_openai_factory() {
        let provider = openai();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4o");
    }

    #[test]
    fn test_azure_factory_uses_deployment_as_model() {
        let provider = OpenAiCompatibleProvider::new(config::azure_defaults(
            "https://example.openai.azure.com",
            SecretString::from("key"),
            "gpt-4o-prod",
            "2025-01-01-preview",
        ));
        assert_eq!(provider.name(), "azure_openai");
        assert_eq!(provider.model(), "gpt-4o-prod");
    }

    #[test]
    fn test_build_request_messages() {
        let provider = openai();
        let mut req = request(vec![Message::user("Hello")]);
        req.system = Some("Be precise".to_string());
        req.temperature = Some(0.2);

        let oai_req = provider.build_request(&req);
        assert_eq!(oai_req.model, "gpt-4o");
        // 1 system + 1 user
        assert_eq!(oai_req.messages.len(), 2);
        assert_eq!(oai_req.max_completion_tokens, Some(1024));
        assert!(oai_req.response_format.is_none());
    }

    #[test]
    fn test_build_request_explicit_model_wins() {
        let provider = openai();
        let mut req = request(vec![]);
        req.model = "gpt-4o-mini".to_string();
        assert_eq!(provider.build_request(&req).model, "gpt-4o-mini");
    }

    #[test]
    fn test_build_request_output_config_sets_json_schema() {
        let provider = openai();
        let mut req = request(vec![Message::user("Hi")]);
        req.output_config = Some(OutputConfig::json_schema(
            "TurnDecision",
            serde_json::json!({"type": "object"}),
        ));

        let oai_req = provider.build_request(&req);
        match oai_req.response_format {
            Some(ResponseFormat::JsonSchema { json_schema }) => {
                assert_eq!(json_schema.name, "TurnDecision");
                assert_eq!(json_schema.strict, Some(true));
                assert!(json_schema.schema.is_some());
            }
            other => panic!("expected json_schema response format, got {other:?}"),
        }
    }

    #[test]
    fn test_map_finish_reason() {
        assert_eq!(map_finish_reason(Some(&FinishReason::Length)), StopReason::MaxTokens);
        assert_eq!(
            map_finish_reason(Some(&FinishReason::ContentFilter)),
            StopReason::ContentFilter
        );
        assert_eq!(map_finish_reason(Some(&FinishReason::Stop)), StopReason::EndTurn);
        assert_eq!(map_finish_reason(None), StopReason::EndTurn);
    }

    #[test]
    fn test_map_openai_error_api_auth() {
        use async_openai::error::ApiError;
        let api_err = ApiError {
            message: "Incorrect API key provided".to_string(),
            r#type: Some("invalid_request_error".to_string()),
            param: None,
            code: Some("invalid_api_key".to_string()),
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_map_openai_error_rate_limit() {
        use async_openai::error::ApiError;
        let api_err = ApiError {
            message: "Rate limit exceeded".to_string(),
            r#type: Some("rate_limit_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::RateLimited));
    }

    #[test]
    fn test_map_openai_error_invalid_argument() {
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }
}
