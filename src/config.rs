use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "vanguardista.toml";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_DEEPSEEK_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";

// ── AI Provider Settings ──────────────────────────────

/// Everything the AI gateway needs. Built once at startup and handed to
/// [`crate::ai::AiGateway::new`]; nothing downstream reads the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub deepseek_api_key: Option<String>,
    pub deepseek_api_url: String,
    pub deepseek_model: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            deepseek_api_key: None,
            deepseek_api_url: DEFAULT_DEEPSEEK_API_URL.to_string(),
            deepseek_model: "deepseek-chat".to_string(),
            timeout_secs: 120,
        }
    }
}

// ── Application Settings ──────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub ai: AiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            ai: AiConfig::default(),
        }
    }
}

/// On-disk shape of `vanguardista.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    data_dir: Option<String>,
    ai: FileAiConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileAiConfig {
    openai_api_key: Option<String>,
    openai_base_url: Option<String>,
    openai_model: Option<String>,
    deepseek_api_key: Option<String>,
    deepseek_api_url: Option<String>,
    deepseek_model: Option<String>,
    timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Read the config file (`VANGUARDISTA_CONFIG`, else `vanguardista.toml`
    /// if it exists) and overlay process environment variables.
    pub fn load() -> Result<Self, String> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let path = env
            .get("VANGUARDISTA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let text = match fs::read_to_string(&path) {
            Ok(t) => {
                log::info!("Loaded config from {}", path.display());
                Some(t)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if env.contains_key("VANGUARDISTA_CONFIG") {
                    return Err(format!("Config file {} not found", path.display()));
                }
                None
            }
            Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
        };

        Self::from_sources(text.as_deref(), &env)
    }

    /// Build from optional TOML text and an environment map. Non-empty
    /// environment values win over the file.
    pub fn from_sources(toml_text: Option<&str>, env: &HashMap<String, String>) -> Result<Self, String> {
        let file: FileConfig = match toml_text {
            Some(t) => toml::from_str(t).map_err(|e| format!("Invalid config file: {}", e))?,
            None => FileConfig::default(),
        };

        let env_var = |key: &str| {
            env.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let defaults = AiConfig::default();
        let ai = AiConfig {
            openai_api_key: env_var("OPENAI_API_KEY").or(non_empty(file.ai.openai_api_key)),
            openai_base_url: non_empty(file.ai.openai_base_url).unwrap_or(defaults.openai_base_url),
            openai_model: non_empty(file.ai.openai_model).unwrap_or(defaults.openai_model),
            deepseek_api_key: env_var("DEEPSEEK_API_KEY").or(non_empty(file.ai.deepseek_api_key)),
            deepseek_api_url: env_var("DEEPSEEK_API_URL")
                .or(non_empty(file.ai.deepseek_api_url))
                .unwrap_or(defaults.deepseek_api_url),
            deepseek_model: non_empty(file.ai.deepseek_model).unwrap_or(defaults.deepseek_model),
            timeout_secs: file.ai.timeout_secs.unwrap_or(defaults.timeout_secs),
        };

        let data_dir = env_var("VANGUARDISTA_DATA_DIR")
            .or(non_empty(file.data_dir))
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            ai,
        })
    }

    /// Server-side keyword store.
    pub fn keywords_file(&self) -> PathBuf {
        self.data_dir.join("keywords.json")
    }

    /// Directory backing the client-side blob store.
    pub fn local_dir(&self) -> PathBuf {
        self.data_dir.join("local")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
