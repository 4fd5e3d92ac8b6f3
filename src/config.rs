use serde::Deserialize;

use crate::planner::client::SamplingParams;

const DEFAULT_MODEL: &str = "Qwen/QwQ-32B-Preview";
const DEFAULT_CHAT_URL: &str = "https://api-inference.huggingface.co/v1/chat/completions";
const DEFAULT_TEXT_URL: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Which wire protocol the generation backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    Chat,
    Text,
}

impl LlmBackend {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "text" => Ok(Self::Text),
            other => anyhow::bail!("unknown LLM_BACKEND {other:?}, expected chat or text"),
        }
    }

    fn default_url(self, model: &str) -> String {
        match self {
            Self::Chat => DEFAULT_CHAT_URL.to_string(),
            Self::Text => format!("{}/{}", DEFAULT_TEXT_URL, model),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: Option<f32>,
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            repetition_penalty: self.repetition_penalty,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub llm: LlmConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fitplan".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fitplan-users".into()),
        };

        let backend = match std::env::var("LLM_BACKEND") {
            Ok(v) => LlmBackend::parse(&v)?,
            Err(_) => LlmBackend::Chat,
        };
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let llm = LlmConfig {
            backend,
            api_url: std::env::var("LLM_API_URL").unwrap_or_else(|_| backend.default_url(&model)),
            api_key: std::env::var("LLM_API_KEY")?,
            model,
            max_tokens: env_parse("LLM_MAX_TOKENS").unwrap_or(1024),
            temperature: env_parse("LLM_TEMPERATURE").unwrap_or(0.8),
            top_p: env_parse("LLM_TOP_P").unwrap_or(0.9),
            repetition_penalty: env_parse("LLM_REPETITION_PENALTY"),
            timeout_secs: env_parse("LLM_TIMEOUT_SECS").unwrap_or(120),
        };

        Ok(Self {
            database_url,
            jwt,
            llm,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
