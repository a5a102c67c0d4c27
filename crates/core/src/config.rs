use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub assistant: AssistantConfig,
    pub submission: SubmissionConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantConfig {
    pub greeting: String,
    pub typing_delay_ms: u64,
    pub transcript_cap: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionConfig {
    /// Endpoint the lead payload is POSTed to. Unset means leads cannot be
    /// delivered and every submission degrades to the retained-data path.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory for durable state. Unset means in-memory only: the
    /// conversation works but does not survive a restart.
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub transcript_cap: Option<usize>,
    pub typing_delay_ms: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assistant: AssistantConfig {
                greeting: "Hi! I'm AutoBot, the assistant for our managed IT team. Ask me \
                           about services, pricing, or support."
                    .to_string(),
                typing_delay_ms: 600,
                transcript_cap: 300,
            },
            submission: SubmissionConfig { endpoint: None, timeout_secs: 10 },
            storage: StorageConfig { data_dir: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

/// On-disk representation: every section and key is optional and fills in
/// over the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    assistant: Option<FileAssistant>,
    submission: Option<FileSubmission>,
    storage: Option<FileStorage>,
    logging: Option<FileLogging>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileAssistant {
    greeting: Option<String>,
    typing_delay_ms: Option<u64>,
    transcript_cap: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSubmission {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileStorage {
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    /// Precedence, lowest to highest: built-in defaults, TOML file,
    /// `AUTOBOT_*` environment variables, programmatic overrides.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = resolve_config_path(&options)? {
            let raw = fs::read_to_string(&path)
                .map_err(|source| ConfigError::ReadFile { path: path.clone(), source })?;
            let file: FileConfig = toml::from_str(&raw)
                .map_err(|source| ConfigError::ParseFile { path: path.clone(), source })?;
            config.apply_file(file);
        }

        config.apply_env()?;
        config.apply_overrides(options.overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(assistant) = file.assistant {
            if let Some(greeting) = assistant.greeting {
                self.assistant.greeting = greeting;
            }
            if let Some(delay) = assistant.typing_delay_ms {
                self.assistant.typing_delay_ms = delay;
            }
            if let Some(cap) = assistant.transcript_cap {
                self.assistant.transcript_cap = cap;
            }
        }
        if let Some(submission) = file.submission {
            if submission.endpoint.is_some() {
                self.submission.endpoint = submission.endpoint;
            }
            if let Some(timeout) = submission.timeout_secs {
                self.submission.timeout_secs = timeout;
            }
        }
        if let Some(storage) = file.storage {
            if storage.data_dir.is_some() {
                self.storage.data_dir = storage.data_dir;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(endpoint) = env::var("AUTOBOT_SUBMIT_URL") {
            self.submission.endpoint = Some(endpoint);
        }
        if let Ok(value) = env::var("AUTOBOT_SUBMIT_TIMEOUT_SECS") {
            self.submission.timeout_secs = parse_env("AUTOBOT_SUBMIT_TIMEOUT_SECS", &value)?;
        }
        if let Ok(dir) = env::var("AUTOBOT_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(level) = env::var("AUTOBOT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(value) = env::var("AUTOBOT_TRANSCRIPT_CAP") {
            self.assistant.transcript_cap = parse_env("AUTOBOT_TRANSCRIPT_CAP", &value)?;
        }
        if let Ok(value) = env::var("AUTOBOT_TYPING_DELAY_MS") {
            self.assistant.typing_delay_ms = parse_env("AUTOBOT_TYPING_DELAY_MS", &value)?;
        }
        if let Ok(value) = env::var("AUTOBOT_LOG_FORMAT") {
            self.logging.format = match value.as_str() {
                "compact" => LogFormat::Compact,
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidEnvOverride {
                        key: "AUTOBOT_LOG_FORMAT".to_owned(),
                        value,
                    })
                }
            };
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if overrides.endpoint.is_some() {
            self.submission.endpoint = overrides.endpoint;
        }
        if overrides.data_dir.is_some() {
            self.storage.data_dir = overrides.data_dir;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(cap) = overrides.transcript_cap {
            self.assistant.transcript_cap = cap;
        }
        if let Some(delay) = overrides.typing_delay_ms {
            self.assistant.typing_delay_ms = delay;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.assistant.transcript_cap == 0 {
            return Err(ConfigError::Validation(
                "assistant.transcript_cap must be at least 1".to_owned(),
            ));
        }
        if self.submission.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "submission.timeout_secs must be at least 1".to_owned(),
            ));
        }
        if let Some(endpoint) = &self.submission.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "submission.endpoint must be an http(s) URL, got `{endpoint}`"
                )));
            }
        }
        Ok(())
    }
}

fn resolve_config_path(options: &LoadOptions) -> Result<Option<PathBuf>, ConfigError> {
    match &options.config_path {
        Some(path) => {
            if path.exists() {
                Ok(Some(path.clone()))
            } else if options.require_file {
                Err(ConfigError::MissingConfigFile(path.clone()))
            } else {
                Ok(None)
            }
        }
        None => {
            let default_path = PathBuf::from("autobot.toml");
            Ok(default_path.exists().then_some(default_path))
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}
