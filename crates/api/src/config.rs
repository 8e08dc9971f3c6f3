use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub neo4j: Neo4jConfig,
    pub llm: LlmConfig,
    pub cache_max_entries: usize,
}

#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub extraction_model: String,
    pub chat_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the environment. Only the API key has no
    /// default.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;

        Ok(Self {
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            neo4j: Neo4jConfig {
                uri: var_or("NEO4J_URI", "bolt://localhost:7687"),
                user: var_or("NEO4J_USER", "neo4j"),
                password: var_or("NEO4J_PASSWORD", "neo4j"),
            },
            llm: LlmConfig {
                base_url: var_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                api_key,
                extraction_model: var_or("EXTRACTION_MODEL", "gpt-4o-mini"),
                chat_model: var_or("CHAT_MODEL", "gpt-4o-mini"),
                tts_model: var_or("TTS_MODEL", "tts-1"),
                tts_voice: var_or("TTS_VOICE", "nova"),
                timeout: Duration::from_secs(parse_or("LLM_TIMEOUT_SECS", 60)),
            },
            cache_max_entries: parse_or("CACHE_MAX_ENTRIES", 10000) as usize,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_var_falls_back_to_default() {
        assert_eq!(var_or("DEFINITELY_NOT_SET_ANYWHERE", "fallback"), "fallback");
        assert_eq!(parse_or("DEFINITELY_NOT_SET_ANYWHERE", 42), 42);
    }
}
