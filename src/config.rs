use crate::{
    endpoint::{ModelClassifier, Upstream, UpstreamTarget},
    error::AppError,
};
use dotenv::dotenv;
use std::env;

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Startup configuration, built once and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    pub openai: UpstreamTarget,
    pub ollama: UpstreamTarget,
    /// Shared bearer secret. `None` disables authentication.
    pub api_key: Option<String>,
    pub classifier: ModelClassifier,
    /// Take the outbound `Host` from the chosen upstream instead of always
    /// using the Ollama endpoint's host.
    pub host_header_from_target: bool,
}

impl AppConfig {
    pub fn new(
        openai_endpoint: &str,
        ollama_endpoint: &str,
        api_key: Option<String>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            openai: UpstreamTarget::parse(Upstream::OpenAi, openai_endpoint)?,
            ollama: UpstreamTarget::parse(Upstream::Ollama, ollama_endpoint)?,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            classifier: ModelClassifier::default(),
            host_header_from_target: false,
        })
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let openai = env::var("OPENAI_ENDPOINT").unwrap_or_else(|_| DEFAULT_OPENAI_ENDPOINT.to_string());
        let ollama = env::var("OLLAMA_ENDPOINT").unwrap_or_else(|_| DEFAULT_OLLAMA_ENDPOINT.to_string());
        let mut config = Self::new(&openai, &ollama, env::var("OPENAI_API_KEY").ok())?;

        if let Ok(port) = env::var("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("PORT must be a number, got {:?}", port)))?;
        }
        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(prefixes) = env::var("OPENAI_MODEL_PREFIXES") {
            config.classifier = ModelClassifier::from_list(&prefixes);
        }
        if let Ok(flag) = env::var("HOST_HEADER_FROM_TARGET") {
            config.host_header_from_target = parse_flag(&flag)?;
        }

        Ok(config)
    }

    pub fn with_classifier(mut self, classifier: ModelClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_host_header_from_target(mut self, enabled: bool) -> Self {
        self.host_header_from_target = enabled;
        self
    }

    pub fn auth_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Picks the upstream for a POST body's model.
    pub fn select_endpoint(&self, model: &str) -> &UpstreamTarget {
        self.classifier.select(model, &self.openai, &self.ollama)
    }

    /// Value forced into the outbound `Host` header when forwarding to `target`.
    pub fn host_header_for(&self, target: &UpstreamTarget) -> String {
        if self.host_header_from_target {
            target.authority()
        } else {
            self.ollama.authority()
        }
    }
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!(
            "HOST_HEADER_FROM_TARGET must be a boolean, got {:?}",
            other
        ))),
    }
}
