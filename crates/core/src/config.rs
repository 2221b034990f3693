//! Configuration management for PolicyQA.
//!
//! Configuration is layered from lowest to highest precedence:
//! - Built-in defaults
//! - Config file (`.policyqa/config.yaml` in the workspace, or `POLICYQA_CONFIG`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Provider names the LLM factory accepts, aliases included.
pub const KNOWN_PROVIDERS: [&str; 4] = ["ollama", "gemini", "googleai", "google"];

/// Map a provider name or alias to the name its settings are stored under.
pub fn canonical_provider(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "ollama" => Some("ollama"),
        "gemini" | "googleai" | "google" => Some("gemini"),
        _ => None,
    }
}

/// Split policy names accepted in configuration.
pub const KNOWN_SPLIT_POLICIES: [&str; 4] = ["line", "line-question-mark", "delimiter", "regex"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .policyqa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("ollama" or "gemini")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Explicit API key, takes precedence over provider `apiKeyEnv`
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format ("text" or "json")
    pub log_format: String,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Question answering settings
    pub answering: AnsweringConfig,

    /// HTTP server settings
    pub server: ServerConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
///
/// Gemini is listed first: it is the only variant with `apiKeyEnv`, so an
/// untagged match on an Ollama block falls through to the second arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Gemini {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::Gemini { model, .. } | ProviderConfig::Ollama { model, .. } => model,
        }
    }

    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::Gemini { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint),
        }
    }

    /// HTTP timeout in seconds, if any.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            ProviderConfig::Gemini { timeout, .. } | ProviderConfig::Ollama { timeout, .. } => {
                *timeout
            }
        }
    }
}

/// Question answering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweringConfig {
    /// Question splitting policy name
    #[serde(rename = "splitPolicy", default = "default_split_policy")]
    pub split_policy: String,

    /// Per-extraction timeout; `None` leaves each model call unbounded
    #[serde(rename = "extractionTimeoutSecs", default = "default_extraction_timeout")]
    pub extraction_timeout_secs: Option<u64>,

    /// Sampling temperature sent with each model call (0.0 - 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Output token cap sent with each model call
    #[serde(rename = "maxTokens", default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl AnsweringConfig {
    /// Per-call model timeout shared by extraction and verification.
    pub fn call_timeout(&self) -> Option<std::time::Duration> {
        self.extraction_timeout_secs.map(std::time::Duration::from_secs)
    }
}

fn default_split_policy() -> String {
    "line".to_string()
}

fn default_extraction_timeout() -> Option<u64> {
    Some(60)
}

impl Default for AnsweringConfig {
    fn default() -> Self {
        Self {
            split_policy: default_split_policy(),
            extraction_timeout_secs: default_extraction_timeout(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Environment variable holding the bearer token
    #[serde(rename = "authTokenEnv")]
    pub auth_token_env: String,

    /// Resolved bearer token (never read from YAML)
    #[serde(skip)]
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9002,
            auth_token_env: "POLICYQA_AUTH_TOKEN".to_string(),
            auth_token: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    answering: Option<AnsweringConfig>,
    server: Option<ServerFileConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerFileConfig {
    host: Option<String>,
    port: Option<u16>,
    #[serde(rename = "authTokenEnv")]
    auth_token_env: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            log_format: "text".to_string(),
            verbose: false,
            no_color: false,
            llm: None,
            answering: AnsweringConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file, environment and defaults.
    ///
    /// Environment variables:
    /// - `POLICYQA_WORKSPACE`: Override workspace path
    /// - `POLICYQA_CONFIG`: Path to config file
    /// - `POLICYQA_PROVIDER`: LLM provider
    /// - `POLICYQA_MODEL`: Model identifier
    /// - `POLICYQA_API_KEY`: API key
    /// - `POLICYQA_AUTH_TOKEN` (or the configured `authTokenEnv`): HTTP bearer token
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// `workspace` and `config_file` win over `POLICYQA_WORKSPACE` and
    /// `POLICYQA_CONFIG`. Both are resolved before any file is read, so the
    /// merged `.policyqa/config.yaml` is the chosen workspace's.
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("POLICYQA_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        if let Ok(config_file) = std::env::var("POLICYQA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }
        if let Some(config_file) = config_file {
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.policyqa_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        if let Ok(provider) = std::env::var("POLICYQA_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("POLICYQA_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("POLICYQA_API_KEY").ok();
        config.server.auth_token = std::env::var(&config.server.auth_token_env).ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        if let Some(answering) = config_file.answering {
            result.answering = answering;
        }

        if let Some(server) = config_file.server {
            if let Some(host) = server.host {
                result.server.host = host;
            }
            if let Some(port) = server.port {
                result.server.port = port;
            }
            if let Some(env) = server.auth_token_env {
                result.server.auth_token_env = env;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            result.llm = Some(llm);

            let model = result
                .get_provider_config(&result.provider)
                .map(|pc| pc.model().to_string());
            if let Some(model) = model {
                result.model = model;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .policyqa directory.
    pub fn policyqa_dir(&self) -> PathBuf {
        self.workspace.join(".policyqa")
    }

    /// Get the configuration block for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        let key = canonical_provider(provider).unwrap_or(provider);
        self.llm.as_ref().and_then(|llm| llm.providers.get(key))
    }

    /// Resolve the API key for a provider.
    ///
    /// `POLICYQA_API_KEY` wins; otherwise the provider's `apiKeyEnv` is read.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider) {
            Some(ProviderConfig::Gemini { api_key_env, .. }) => std::env::var(api_key_env).ok(),
            _ => None,
        }
    }

    /// Validate configuration for the active provider and answering settings.
    pub fn validate(&self) -> AppResult<()> {
        let provider = canonical_provider(&self.provider).ok_or_else(|| {
            AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            ))
        })?;

        if provider == "gemini" && self.resolve_api_key(provider).is_none() {
            return Err(AppError::Config(
                "Gemini provider requires an API key (POLICYQA_API_KEY or apiKeyEnv)".to_string(),
            ));
        }

        let policy = self.answering.split_policy.to_lowercase();
        if !KNOWN_SPLIT_POLICIES.contains(&policy.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown split policy: {}. Supported: {}",
                self.answering.split_policy,
                KNOWN_SPLIT_POLICIES.join(", ")
            )));
        }

        if let Some(temperature) = self.answering.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(AppError::Config(format!(
                    "temperature must be between 0.0 and 2.0, got {}",
                    temperature
                )));
            }
        }

        Ok(())
    }

    /// Validate settings required to run the HTTP server.
    pub fn validate_server(&self) -> AppResult<()> {
        self.validate()?;

        match self.server.auth_token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(()),
            _ => Err(AppError::Config(format!(
                "HTTP server requires a bearer token in ${}",
                self.server.auth_token_env
            ))),
        }
    }
}
