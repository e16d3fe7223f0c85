//! Startup configuration.
//!
//! Everything process-wide is resolved once in `main` into [`Settings`] and
//! [`Credentials`] and then passed to the components that need it.
//!
//! Credentials come from a chain of [`SecretStore`]s; the first store holding a
//! non-empty value wins. The binary consults an optional JSON secrets file first and
//! the process environment (after loading `.env`) second.

use crate::agent::DEFAULT_MAX_ITERATIONS;
use crate::error::{Result, Simple3Error};
use crate::llm::gateways::GEMINI_OPENAI_BASE_URL;
use crate::speech::{VoiceConfig, DEFAULT_PLAYER_COMMAND};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const MURF_API_KEY: &str = "MURF_API_KEY";
pub const SECRETS_FILE_VAR: &str = "SIMPLE3_SECRETS_FILE";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_HISTORY_TURNS: usize = 10;

/// A named source of secret values
pub trait SecretStore {
    fn name(&self) -> &str;

    /// The secret, if present and non-empty
    fn get(&self, key: &str) -> Option<String>;
}

/// Secrets read from process environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Secrets read from a flat JSON object file, e.g. `{"MURF_API_KEY": "..."}`
#[derive(Debug, Clone, Default)]
pub struct FileSecrets {
    values: HashMap<String, String>,
}

impl FileSecrets {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let values: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            Simple3Error::ConfigError(format!("invalid secrets file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), count = values.len(), "Loaded secrets file");
        Ok(Self { values })
    }

    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl SecretStore for FileSecrets {
    fn name(&self) -> &str {
        "secrets file"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }
}

/// Look `key` up through `stores` in order
pub fn lookup_secret(stores: &[&dyn SecretStore], key: &str) -> Option<String> {
    stores.iter().find_map(|store| {
        let value = store.get(key)?;
        debug!(key = key, source = store.name(), "Resolved secret");
        Some(value)
    })
}

/// API credentials for the model and speech providers
#[derive(Clone)]
pub struct Credentials {
    /// May be empty; the model provider then rejects requests
    pub google_api_key: String,
    pub murf_api_key: String,
}

impl Credentials {
    /// Resolve both keys. A missing speech key is fatal, a missing model key is not.
    pub fn resolve(stores: &[&dyn SecretStore]) -> Result<Self> {
        let murf_api_key = lookup_secret(stores, MURF_API_KEY).ok_or_else(|| {
            Simple3Error::ConfigError(
                "MURF_API_KEY not found. Please set it in your secrets file or your .env file."
                    .to_string(),
            )
        })?;

        let google_api_key = lookup_secret(stores, GOOGLE_API_KEY).unwrap_or_else(|| {
            tracing::warn!("GOOGLE_API_KEY not found; model requests will likely be rejected");
            String::new()
        });

        Ok(Self {
            google_api_key,
            murf_api_key,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("google_api_key", &mask(&self.google_api_key))
            .field("murf_api_key", &mask(&self.murf_api_key))
            .finish()
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model: String,
    pub llm_base_url: String,
    pub max_iterations: usize,
    /// Completed exchanges kept as conversation history; 0 disables history
    pub history_turns: usize,
    pub save_dir: PathBuf,
    /// External player command line; `None` disables playback
    pub player_command: Option<String>,
    /// Speak the raw text when a JSON-looking answer fails to parse
    pub speak_on_parse_failure: bool,
    pub http_timeout: Option<Duration>,
    pub secrets_file: Option<PathBuf>,
    pub voice: VoiceConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            llm_base_url: GEMINI_OPENAI_BASE_URL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            history_turns: DEFAULT_HISTORY_TURNS,
            save_dir: PathBuf::from("."),
            player_command: Some(DEFAULT_PLAYER_COMMAND.to_string()),
            speak_on_parse_failure: false,
            http_timeout: None,
            secrets_file: None,
            voice: VoiceConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from a variable lookup, starting from the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(model) = get("SIMPLE3_MODEL") {
            settings.model = model;
        }
        if let Some(url) = get("SIMPLE3_LLM_BASE_URL") {
            settings.llm_base_url = url;
        }
        if let Some(raw) = get("SIMPLE3_MAX_ITERATIONS") {
            settings.max_iterations = parse_usize("SIMPLE3_MAX_ITERATIONS", &raw)?;
            if settings.max_iterations == 0 {
                return Err(Simple3Error::ConfigError(
                    "SIMPLE3_MAX_ITERATIONS must be at least 1".to_string(),
                ));
            }
        }
        if let Some(raw) = get("SIMPLE3_HISTORY_TURNS") {
            settings.history_turns = parse_usize("SIMPLE3_HISTORY_TURNS", &raw)?;
        }
        if let Some(dir) = get("SIMPLE3_SAVE_DIR") {
            settings.save_dir = PathBuf::from(dir);
        }
        if let Some(player) = get("SIMPLE3_PLAYER") {
            settings.player_command = match player.to_lowercase().as_str() {
                "none" | "off" => None,
                _ => Some(player),
            };
        }
        if let Some(raw) = get("SIMPLE3_SPEAK_ON_PARSE_FAILURE") {
            settings.speak_on_parse_failure = parse_bool("SIMPLE3_SPEAK_ON_PARSE_FAILURE", &raw)?;
        }
        if let Some(raw) = get("SIMPLE3_HTTP_TIMEOUT_SECS") {
            let secs = parse_usize("SIMPLE3_HTTP_TIMEOUT_SECS", &raw)?;
            settings.http_timeout = (secs > 0).then(|| Duration::from_secs(secs as u64));
        }
        if let Some(path) = get(SECRETS_FILE_VAR) {
            settings.secrets_file = Some(PathBuf::from(path));
        }

        Ok(settings)
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize> {
    raw.parse().map_err(|_| {
        Simple3Error::ConfigError(format!("{} must be a non-negative integer, got '{}'", key, raw))
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Simple3Error::ConfigError(format!(
            "{} must be true or false, got '{}'",
            key, raw
        ))),
    }
}
