pub mod deepseek;
pub mod openai;
pub mod prompts;

use serde::{Deserialize, Serialize};

use crate::config::AiConfig;

// ── Types ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    DeepSeek,
}

impl Provider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "deepseek" => Some(Self::DeepSeek),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRequest {
    pub system: String,
    pub prompt: String,
    #[serde(default)]
    pub provider: Provider,
    /// Falls back to the provider's configured default model.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AiError {
    /// Missing credential or unusable settings; raised before any request.
    Config(String),
    /// The provider answered with a non-success status.
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
    },
    /// Network failure, timeout or an unreadable response body.
    Transport(String),
}

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "{}", msg),
            Self::Provider {
                provider,
                status,
                message,
            } => write!(f, "{} returned {}: {}", provider, status, message),
            Self::Transport(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AiError {}

impl AiError {
    /// What the client gets to see. Provider bodies and transport details stay
    /// in the server log.
    pub fn public_message(&self) -> String {
        match self {
            Self::Config(msg) => msg.clone(),
            Self::Provider { provider, status, .. } => {
                format!("AI provider {} returned an error (status {})", provider, status)
            }
            Self::Transport(_) => "Could not reach the AI provider".to_string(),
        }
    }
}

// ── Gateway ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: &'static str,
    pub configured: bool,
    pub default_model: String,
}

/// One outbound chat-completion call per [`AiGateway::complete`]. There is no
/// retry and no failover between providers; callers decide what to do with an
/// error.
#[derive(Debug, Clone)]
pub struct AiGateway {
    config: AiConfig,
}

impl AiGateway {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn complete(&self, req: &AiRequest) -> Result<AiResponse, AiError> {
        log::info!(
            "[ai] {} request (model: {})",
            req.provider.name(),
            req.model.as_deref().unwrap_or("default")
        );
        let result = match req.provider {
            Provider::OpenAi => openai::call(&self.config, req),
            Provider::DeepSeek => deepseek::call(&self.config, req),
        };
        if let Err(e) = &result {
            log::warn!("AI provider {} failed: {}", req.provider.name(), e);
        }
        result
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        let key = match provider {
            Provider::OpenAi => &self.config.openai_api_key,
            Provider::DeepSeek => &self.config.deepseek_api_key,
        };
        key.as_deref().map(|k| !k.trim().is_empty()).unwrap_or(false)
    }

    pub fn status(&self) -> Vec<ProviderStatus> {
        vec![
            ProviderStatus {
                provider: Provider::OpenAi.name(),
                configured: self.is_configured(Provider::OpenAi),
                default_model: self.config.openai_model.clone(),
            },
            ProviderStatus {
                provider: Provider::DeepSeek.name(),
                configured: self.is_configured(Provider::DeepSeek),
                default_model: self.config.deepseek_model.clone(),
            },
        ]
    }
}

/// Pick the request model or the configured default.
fn resolve_model(requested: Option<&str>, default: &str) -> String {
    requested
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(default)
        .to_string()
}
