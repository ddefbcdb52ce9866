use anyhow::{Context, Result};
use std::{env, str::FromStr};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Currency label used in rendered invoice messages
    pub currency: String,

    // Remote analytics oracle
    pub inference_url: String,
    pub inference_api_key: Option<String>,
    pub external_models: Vec<String>,
    pub analysis_refresh_secs: u64,

    // Outbound messaging (WhatsApp gateway)
    pub messaging_url: String,
    pub messaging_token: Option<String>,

    pub log_dir: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Splits a comma separated list, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed_or("ACCESS_TOKEN_TTL", 900)?, // 15 min

            rate_login_per_min: parsed_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            currency: env::var("CURRENCY").unwrap_or_else(|_| "USD".to_string()),

            inference_url: optional("INFERENCE_URL").unwrap_or_default(),
            inference_api_key: optional("INFERENCE_API_KEY"),
            external_models: optional("EXTERNAL_MODELS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            analysis_refresh_secs: parsed_or("ANALYSIS_REFRESH_SECS", 300)?,

            messaging_url: optional("MESSAGING_URL").unwrap_or_default(),
            messaging_token: optional("MESSAGING_TOKEN"),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }

    pub fn analytics_enabled(&self) -> bool {
        !self.inference_url.is_empty()
    }
}
