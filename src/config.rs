//! Process configuration from the environment (optionally seeded by `.env`).

use std::env;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog;
use crate::translate::{DEFAULT_MAX_MESSAGE_LENGTH, DEFAULT_MAX_OUTPUT_TOKENS};

pub const DEFAULT_BASE_URL: &str = "https://api.z.ai/api/paas/v4";
pub const DEFAULT_MODEL: &str = "glm-4.5-flash";

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+:[A-Za-z0-9_-]+$").expect("token pattern compiles"));

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not found in environment or .env file")]
    Missing(&'static str),
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub telegram_token: String,
    pub completion: CompletionConfig,
    pub max_message_length: usize,
    pub max_output_tokens: u32,
    pub default_language: String,
    pub stats_enabled: bool,
    pub admin_id: Option<u64>,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; real environment variables still apply.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram_token = get("TELEGRAM_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;
        if !TOKEN_PATTERN.is_match(telegram_token.trim()) {
            return Err(ConfigError::Invalid {
                key: "TELEGRAM_TOKEN",
                value: redact(&telegram_token),
                reason: "expected <bot id>:<secret>".into(),
            });
        }
        let api_key = get("ZAI_API_KEY").ok_or(ConfigError::Missing("ZAI_API_KEY"))?;

        let default_language = get("DEFAULT_LANGUAGE").unwrap_or_else(|| "vi".to_string());
        if catalog::get_language(&default_language).is_none() {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_LANGUAGE",
                value: default_language,
                reason: "not a supported language code".into(),
            });
        }

        let admin_id = match get("ADMIN_USER_ID") {
            Some(raw) => Some(parse_value("ADMIN_USER_ID", &raw)?),
            None => None,
        };

        Ok(Self {
            telegram_token: telegram_token.trim().to_string(),
            completion: CompletionConfig {
                api_key: api_key.trim().to_string(),
                base_url: get("ZAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: get("ZAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                timeout_secs: parse_or("ZAI_TIMEOUT_SECS", get("ZAI_TIMEOUT_SECS"), 60)?,
            },
            max_message_length: parse_or(
                "MAX_MESSAGE_LENGTH",
                get("MAX_MESSAGE_LENGTH"),
                DEFAULT_MAX_MESSAGE_LENGTH,
            )?,
            max_output_tokens: parse_or(
                "MAX_OUTPUT_TOKENS",
                get("MAX_OUTPUT_TOKENS"),
                DEFAULT_MAX_OUTPUT_TOKENS,
            )?,
            default_language,
            stats_enabled: get("ENABLE_STATS")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            admin_id,
            cache_capacity: parse_or(
                "TRANSLATION_CACHE_CAPACITY",
                get("TRANSLATION_CACHE_CAPACITY"),
                256,
            )?,
            cache_ttl_secs: parse_or(
                "TRANSLATION_CACHE_TTL_SECS",
                get("TRANSLATION_CACHE_TTL_SECS"),
                600,
            )?,
        })
    }

    pub fn is_admin(&self, caller: u64) -> bool {
        self.admin_id == Some(caller)
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

/// Keep only the bot id part of a token for error messages.
fn redact(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) => format!("{id}:***"),
        None => "***".to_string(),
    }
}
