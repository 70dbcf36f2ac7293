//! Env-driven configuration for the service and library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Credentials have no default: a missing `API_KEY` or
//! `FB_ACCESS_TOKEN` only surfaces as a configuration error when an operation
//! that needs it runs.
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_GRAPH_API_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 60;

#[derive(Clone, Debug)]
pub struct Config {
    pub genai_api_key: Option<String>,
    pub genai_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub video_model: String,
    pub poll_interval: Duration,
    /// `None` polls until upstream reports completion.
    pub poll_max_attempts: Option<u32>,
    pub graph_access_token: Option<String>,
    pub graph_api_url: String,
    pub api_host: String,
    pub api_port: String,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Self {
        let poll_interval_secs = parse_or("VIDEO_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS);
        let poll_max_attempts = parse_or("VIDEO_POLL_MAX_ATTEMPTS", DEFAULT_POLL_MAX_ATTEMPTS);
        Config {
            genai_api_key: secret("API_KEY"),
            genai_base_url: env::var("GENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_GENAI_BASE_URL.to_string()),
            text_model: env::var("GENAI_TEXT_MODEL").unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string()),
            image_model: env::var("GENAI_IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            video_model: env::var("GENAI_VIDEO_MODEL").unwrap_or_else(|_| DEFAULT_VIDEO_MODEL.to_string()),
            poll_interval: Duration::from_secs(poll_interval_secs),
            poll_max_attempts: (poll_max_attempts > 0).then_some(poll_max_attempts),
            graph_access_token: secret("FB_ACCESS_TOKEN"),
            graph_api_url: env::var("GRAPH_API_URL").unwrap_or_else(|_| DEFAULT_GRAPH_API_URL.to_string()),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            api_port: env::var("API_PORT").unwrap_or_else(|_| "3000".to_string()),
        }
    }

    /// Log the effective configuration. Secrets are reported as set/unset only.
    pub fn log_env_vars(&self) {
        tracing::info!("API_KEY: {}", mask(&self.genai_api_key));
        tracing::info!("GENAI_BASE_URL: {}", self.genai_base_url);
        tracing::info!(
            "models: text={} image={} video={}",
            self.text_model, self.image_model, self.video_model
        );
        tracing::info!(
            "video polling: every {:?}, max attempts {}",
            self.poll_interval,
            self.poll_max_attempts.map(|n| n.to_string()).unwrap_or_else(|| "unbounded".to_string())
        );
        tracing::info!("FB_ACCESS_TOKEN: {}", mask(&self.graph_access_token));
        tracing::info!("GRAPH_API_URL: {}", self.graph_api_url);
        tracing::info!("API_HOST: {} API_PORT: {}", self.api_host, self.api_port);
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            genai_api_key: None,
            genai_base_url: DEFAULT_GENAI_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            poll_max_attempts: Some(DEFAULT_POLL_MAX_ATTEMPTS),
            graph_access_token: None,
            graph_api_url: DEFAULT_GRAPH_API_URL.to_string(),
            api_host: "127.0.0.1".to_string(),
            api_port: "3000".to_string(),
        }
    }
}

fn secret(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_value<T: FromStr + Copy + std::fmt::Display>(name: &str, raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid {} '{}', falling back to {}", name, raw, default);
        default
    })
}

fn mask(value: &Option<String>) -> &'static str {
    if value.is_some() { "<set>" } else { "<unset>" }
}
