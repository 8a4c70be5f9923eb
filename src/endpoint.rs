//! Upstream roles and the model-based endpoint selector.

use crate::error::AppError;
use reqwest::Url;
use std::fmt;

/// Model-name prefixes that identify OpenAI-hosted model families.
pub const DEFAULT_OPENAI_MODEL_PREFIXES: [&str; 13] = [
    "gpt-",
    "chatgpt-",
    "o1",
    "o3",
    "o4",
    "text-embedding-",
    "text-moderation-",
    "omni-moderation-",
    "davinci",
    "babbage",
    "dall-e-",
    "whisper-",
    "tts-",
];

/// The two upstream roles the proxy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    OpenAi,
    Ollama,
}

impl Upstream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured upstream base URL. Only scheme, host and port are meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    role: Upstream,
    base: Url,
}

impl UpstreamTarget {
    pub fn parse(role: Upstream, raw: &str) -> Result<Self, AppError> {
        let base = Url::parse(raw.trim())
            .map_err(|e| AppError::InvalidUrl(format!("{} endpoint {:?}: {}", role, raw, e)))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::InvalidUrl(format!(
                "{} endpoint {:?}: scheme must be http or https",
                role, raw
            )));
        }
        if base.host_str().map_or(true, str::is_empty) {
            return Err(AppError::InvalidUrl(format!(
                "{} endpoint {:?}: missing host",
                role, raw
            )));
        }

        Ok(Self { role, base })
    }

    pub fn role(&self) -> Upstream {
        self.role
    }

    pub fn scheme(&self) -> &str {
        self.base.scheme()
    }

    /// `host[:port]`, with the port omitted when it is the scheme default.
    pub fn authority(&self) -> String {
        // host_str() keeps the brackets around IPv6 literals
        let host = self.base.host_str().unwrap_or_default();
        match self.base.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// `scheme://host[:port]` without any path.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme(), self.authority())
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.origin())
    }
}

/// Decides which upstream serves a model.
///
/// A model routes to OpenAI when its lowercased name starts with one of the
/// configured prefixes. Names carrying an Ollama tag (`llama3:8b`,
/// `gpt-oss:20b`) always stay local. Everything else goes to Ollama, so the
/// classification is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelClassifier {
    openai_prefixes: Vec<String>,
}

impl Default for ModelClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_OPENAI_MODEL_PREFIXES)
    }
}

impl ModelClassifier {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let openai_prefixes = prefixes
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { openai_prefixes }
    }

    /// Parses a comma separated prefix list such as `gpt-,o1,my-proxy-`.
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.openai_prefixes
    }

    pub fn classify(&self, model: &str) -> Upstream {
        let model = model.trim().to_lowercase();
        if model.contains(':') {
            return Upstream::Ollama;
        }
        if self
            .openai_prefixes
            .iter()
            .any(|prefix| model.starts_with(prefix.as_str()))
        {
            Upstream::OpenAi
        } else {
            Upstream::Ollama
        }
    }

    /// Picks exactly one of the two targets for `model`.
    pub fn select<'a>(
        &self,
        model: &str,
        openai: &'a UpstreamTarget,
        ollama: &'a UpstreamTarget,
    ) -> &'a UpstreamTarget {
        match self.classify(model) {
            Upstream::OpenAi => openai,
            Upstream::Ollama => ollama,
        }
    }
}
