use super::openai::chat_completion;
use super::{resolve_model, AiError, AiRequest, AiResponse};
use crate::config::AiConfig;

/// `deepseek_api_url` is the full chat-completions endpoint, not a base URL.
pub fn call(config: &AiConfig, req: &AiRequest) -> Result<AiResponse, AiError> {
    let api_key = config.deepseek_api_key.as_deref().unwrap_or_default().trim();
    if api_key.is_empty() {
        return Err(AiError::Config(
            "DeepSeek API key not configured (DEEPSEEK_API_KEY)".into(),
        ));
    }

    let url = config.deepseek_api_url.trim();
    if url.is_empty() {
        return Err(AiError::Config("DeepSeek API URL is empty".into()));
    }

    let model = resolve_model(req.model.as_deref(), &config.deepseek_model);
    chat_completion("deepseek", url, api_key, &model, config.timeout_secs, req)
}
