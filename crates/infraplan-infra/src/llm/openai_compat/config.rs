//! Configuration types and defaults for OpenAI-compatible providers.
//!
//! Two flavours speak the chat completions protocol: OpenAI itself (base URL
//! plus bearer key) and Azure OpenAI (resource endpoint, deployment name and
//! API version, `api-key` header).

use secrecy::SecretString;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Where and how requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    OpenAi {
        base_url: String,
    },
    Azure {
        /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
        endpoint: String,
        deployment: String,
        api_version: String,
    },
}

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name ("openai", "azure_openai").
    pub provider_name: String,
    pub endpoint: Endpoint,
    /// API key for authentication.
    pub api_key: SecretString,
    /// Model identifier (deployment name on Azure).
    pub model: String,
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        endpoint: Endpoint::OpenAi {
            base_url: OPENAI_BASE_URL.into(),
        },
        api_key,
        model: model.into(),
    }
}

/// Azure OpenAI configuration for one deployment.
pub fn azure_defaults(
    endpoint: &str,
    api_key: SecretString,
    deployment: &str,
    api_version: &str,
) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "azure_openai".into(),
        endpoint: Endpoint::Azure {
            endpoint: endpoint.trim_end_matches('/').into(),
            deployment: deployment.into(),
            api_version: api_version.into(),
        },
        api_key,
        model: deployment.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_defaults_use_public_base_url() {
        let config = openai_defaults(SecretString::from("sk-test"), "gpt-4o");
        assert_eq!(config.provider_name, "openai");
        assert_eq!(
            config.endpoint,
            Endpoint::OpenAi {
                base_url: "https://api.openai.com/v1".into()
            }
        );
        assert_eq!(config.model, "gpt-4o");
    }

    #[test]
    fn azure_defaults_trim_trailing_slash() {
        let config = azure_defaults(
            "https://example.openai.azure.com/",
            SecretString::from("key"),
            "gpt-4o",
            "2025-01-01-preview",
        );
        assert_eq!(config.provider_name, "azure_openai");
        match config.endpoint {
            Endpoint::Azure {
                endpoint,
                deployment,
                api_version,
            } => {
                assert_eq!(endpoint, "https://example.openai.azure.com");
                assert_eq!(deployment, "gpt-4o");
                assert_eq!(api_version, "2025-01-01-preview");
            }
            other => panic!("expected azure endpoint, got {other:?}"),
        }
    }
}
