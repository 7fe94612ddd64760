use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration loaded from environment variables.
///
/// `groq_api_key` is optional at startup: the server runs without it and
/// every batch submission is rejected with a configuration error instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub groq_api_url: String,
    pub model: String,
    pub port: u16,
    pub rust_log: String,
    pub scan_concurrency: usize,
    pub max_upload_bytes: usize,
    pub scan_temp_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let scan_concurrency = parse_env("SCAN_CONCURRENCY", 1usize)?;
        if scan_concurrency == 0 {
            bail!("SCAN_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            groq_api_key: optional_env("GROQ_API_KEY"),
            groq_api_url: optional_env("GROQ_API_URL")
                .unwrap_or_else(|| DEFAULT_GROQ_API_URL.to_string()),
            model: optional_env("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            scan_concurrency,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            scan_temp_dir: optional_env("SCAN_TEMP_DIR").map(PathBuf::from),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            groq_api_url: DEFAULT_GROQ_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            scan_concurrency: 1,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            scan_temp_dir: None,
        }
    }
}

/// Blank values count as unset, so `GROQ_API_KEY=` in a .env file behaves
/// like a missing key.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
