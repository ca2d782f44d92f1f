//! Configuration loader for infraplan.
//!
//! Reads `config.toml` and deserializes it into [`AppConfig`]. Falls back to
//! sensible defaults when the file is missing or malformed, then applies
//! environment overrides (including anything loaded from a `.env` file).

use std::path::{Path, PathBuf};

use infraplan_core::questions::QuestionBank;
use infraplan_types::config::AppConfig;
use infraplan_types::error::QuestionBankError;
use infraplan_types::llm::ProviderType;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "INFRAPLAN_CONFIG";

/// Load variables from a `.env` file in the working directory, if present.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!("Failed to load .env file: {err}"),
    }
}

/// Resolve which config file to read.
///
/// Priority:
/// 1. Explicit path (the `--config` flag)
/// 2. `$INFRAPLAN_CONFIG`
/// 3. `<config dir>/infraplan/config.toml`
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join("infraplan").join("config.toml"))
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config_file(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Apply environment overrides on top of file configuration.
///
/// `lookup` abstracts the environment so overrides are testable.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    let endpoint_var = match config.llm.provider {
        ProviderType::AzureOpenai => "AZURE_OPENAI_ENDPOINT",
        ProviderType::Openai => "OPENAI_BASE_URL",
    };
    if let Some(url) = get(endpoint_var) {
        config.llm.base_url = Some(url);
    }
    if let Some(model) = get("INFRAPLAN_MODEL") {
        config.llm.model = model;
    }
}

/// Resolve, load and finalize the application configuration.
pub async fn load_config(explicit: Option<&Path>) -> AppConfig {
    let mut config = match resolve_config_path(explicit) {
        Some(path) => load_config_file(&path).await,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config
}

/// Load the question bank: the file named by `questions_path`, or the built-in one.
///
/// Unlike the main config, a configured bank that fails to load is an error.
pub async fn load_question_bank(path: Option<&Path>) -> Result<QuestionBank, QuestionBankError> {
    let Some(path) = path else {
        return Ok(QuestionBank::builtin());
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| QuestionBankError::Io(format!("{}: {err}", path.display())))?;
    let bank = QuestionBank::from_toml_str(&content)?;
    tracing::debug!(questions = bank.len(), "Loaded question bank from {}", path.display());
    Ok(bank)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn explicit_path_wins() {
        let path = resolve_config_path(Some(Path::new("/tmp/custom.toml")));
        assert_eq!(path, Some(PathBuf::from("/tmp/custom.toml")));
    }

    #[tokio::test]
    async fn load_config_file_missing_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_file(&tmp.path().join("config.toml")).await;
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.session.ttl_secs, 3600);
    }

    #[tokio::test]
    async fn load_config_file_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
[llm]
provider = "openai"
model = "gpt-4o-mini"
temperature = 0.2

[server]
port = 9000
"#,
        )
        .await
        .unwrap();

        let config = load_config_file(&path).await;
        assert_eq!(config.llm.provider, ProviderType::Openai);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.temperature, Some(0.2));
        assert_eq!(config.server.port, 9000);
    }

    #[tokio::test]
    async fn load_config_file_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config_file(&path).await;
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn azure_endpoint_override() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com"),
                ("OPENAI_BASE_URL", "http://ignored"),
                ("INFRAPLAN_MODEL", "gpt-4o-prod"),
            ]),
        );
        assert_eq!(config.llm.base_url.as_deref(), Some("https://res.openai.azure.com"));
        assert_eq!(config.llm.model, "gpt-4o-prod");
    }

    #[test]
    fn openai_base_url_override() {
        let mut config = AppConfig::default();
        config.llm.provider = ProviderType::Openai;
        apply_env_overrides(&mut config, env(&[("OPENAI_BASE_URL", "http://localhost:1234/v1")]));
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:1234/v1"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.llm.base_url = Some("https://from-file".to_string());
        apply_env_overrides(&mut config, env(&[("AZURE_OPENAI_ENDPOINT", "  ")]));
        assert_eq!(config.llm.base_url.as_deref(), Some("https://from-file"));
    }

    #[tokio::test]
    async fn question_bank_defaults_to_builtin() {
        let bank = load_question_bank(None).await.unwrap();
        assert_eq!(bank.len(), QuestionBank::builtin().len());
    }

    #[tokio::test]
    async fn question_bank_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("questions.toml");
        tokio::fs::write(
            &path,
            r#"
[[questions]]
section = "Networking"
text = "How many access points are required?"
"#,
        )
        .await
        .unwrap();

        let bank = load_question_bank(Some(&path)).await.unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions()[0].section, "Networking");
    }

    #[tokio::test]
    async fn question_bank_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_question_bank(Some(&tmp.path().join("nope.toml")))
            .await
            .unwrap_err();
        assert!(matches!(err, QuestionBankError::Io(_)));
    }
}
